pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::daily::{BatchReport, DailyOrchestrator};
use crate::application::policies::policy_for;
use crate::application::runner::{AgentRunner, RunReport};
use crate::config::CouncilConfig;
use crate::domain::entities::account::Account;
use crate::domain::entities::agent_run::AgentRunRecord;
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::DomainError;
use crate::domain::ports::alert::AlertSink;
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::ports::persistence::{PersistenceStore, TransactionFilter};
use crate::domain::values::persona::Persona;
use crate::infrastructure::alerts::log_sink::LogAlertSink;
use crate::infrastructure::market::cached::CachedProvider;
use crate::infrastructure::market::yahoo::YahooProvider;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::store::SqliteStore;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct PositionSummary {
    pub symbol: String,
    pub shares: f64,
    pub avg_cost: f64,
    pub last_price: f64,
    pub market_value: f64,
    pub gain_loss: f64,
    pub gain_loss_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct PortfolioSummary {
    pub account_id: String,
    pub persona: Persona,
    pub total_value: f64,
    pub cash: f64,
    pub num_positions: usize,
    pub positions: Vec<PositionSummary>,
}

/// Facade wiring the ports to the use cases. The CLI and any host application
/// talk to this; tests swap the providers through [`Council::with_providers`].
pub struct Council {
    store: Arc<dyn PersistenceStore>,
    runner: AgentRunner,
    orchestrator: DailyOrchestrator,
}

impl Council {
    /// Open (or create) the sqlite database and wire the live Yahoo provider
    /// behind a TTL cache.
    pub fn new(db_path: &str, config: CouncilConfig) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Persistence(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Persistence(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;

        let store: Arc<dyn PersistenceStore> = Arc::new(SqliteStore::new(conn));
        let yahoo = Arc::new(YahooProvider::new(Duration::from_secs(
            config.request_timeout_secs,
        )));
        let market: Arc<dyn MarketDataProvider> = Arc::new(CachedProvider::new(
            yahoo,
            Duration::from_secs(config.quote_ttl_minutes * 60),
        ));
        let alerts: Arc<dyn AlertSink> = Arc::new(LogAlertSink);

        Ok(Self::with_providers(store, market, alerts, config))
    }

    pub fn with_providers(
        store: Arc<dyn PersistenceStore>,
        market: Arc<dyn MarketDataProvider>,
        alerts: Arc<dyn AlertSink>,
        config: CouncilConfig,
    ) -> Self {
        Self {
            runner: AgentRunner::new(store.clone(), market.clone(), config.clone()),
            orchestrator: DailyOrchestrator::new(store.clone(), market, alerts, config),
            store,
        }
    }

    /// Run every persona against every account.
    pub async fn run_daily(&self) -> Result<BatchReport, DomainError> {
        self.orchestrator.run_all().await
    }

    /// Run one persona against one account.
    pub async fn run_persona(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<RunReport, DomainError> {
        if self.store.get_account(account_id)?.is_none() {
            return Err(DomainError::NotFound(format!("Account: {account_id}")));
        }
        let policy = policy_for(persona);
        self.runner.run(policy.as_ref(), account_id).await
    }

    /// Current portfolio state at last observed prices. Pure read.
    pub fn portfolio_summary(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<PortfolioSummary, DomainError> {
        let portfolio = self
            .store
            .load_portfolio(account_id, persona)?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Portfolio: {account_id}/{persona}"))
            })?;

        let positions = portfolio
            .positions
            .iter()
            .map(|p| PositionSummary {
                symbol: p.symbol.clone(),
                shares: p.shares,
                avg_cost: p.avg_cost,
                last_price: p.last_price,
                market_value: p.market_value(),
                gain_loss: p.gain_loss(),
                gain_loss_pct: p.gain_loss_pct(),
            })
            .collect();

        Ok(PortfolioSummary {
            account_id: portfolio.account_id.clone(),
            persona,
            total_value: portfolio.total_value(),
            cash: portfolio.cash,
            num_positions: portfolio.positions.len(),
            positions,
        })
    }

    pub fn transactions(
        &self,
        account_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, DomainError> {
        self.store.list_transactions(account_id, filter)
    }

    pub fn latest_run(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<Option<AgentRunRecord>, DomainError> {
        self.store.load_latest_run_record(account_id, persona)
    }

    pub fn add_account(
        &self,
        id: &str,
        email: &str,
        alerts_enabled: bool,
    ) -> Result<Account, DomainError> {
        let mut account = Account::new(id, email);
        account.alerts_enabled = alerts_enabled;
        self.store.create_account(&account)?;
        Ok(account)
    }

    pub fn accounts(&self) -> Result<Vec<Account>, DomainError> {
        self.store.list_accounts()
    }
}
