//! Shared test helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use council::config::CouncilConfig;
use council::domain::entities::account::Account;
use council::domain::entities::agent_run::AgentRunRecord;
use council::domain::entities::portfolio::{Portfolio, Position};
use council::domain::entities::transaction::Transaction;
use council::domain::error::DomainError;
use council::domain::ports::alert::{AlertSink, RunSummary};
use council::domain::ports::market_data::MarketDataProvider;
use council::domain::ports::persistence::{PersistenceStore, TransactionFilter};
use council::domain::values::persona::Persona;
use council::domain::values::snapshot::{MarketSnapshot, MarketView};
use council::infrastructure::sqlite::migrations::run_migrations;
use council::infrastructure::sqlite::store::SqliteStore;
use council::Council;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn sqlite_store() -> Arc<SqliteStore> {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    Arc::new(SqliteStore::new(conn))
}

/// Snapshot with only a price; tests fill in the fields they screen on.
pub fn snap(symbol: &str, price: f64) -> MarketSnapshot {
    MarketSnapshot::new(symbol, price)
}

pub fn view_of(snapshots: Vec<MarketSnapshot>) -> MarketView {
    view_at(chrono::Utc::now(), snapshots)
}

pub fn view_at(as_of: chrono::DateTime<chrono::Utc>, snapshots: Vec<MarketSnapshot>) -> MarketView {
    let map: HashMap<String, MarketSnapshot> = snapshots
        .into_iter()
        .map(|s| (s.symbol.clone(), s))
        .collect();
    MarketView::new(as_of, map)
}

pub fn position(symbol: &str, shares: f64, avg_cost: f64, last_price: f64) -> Position {
    Position {
        symbol: symbol.into(),
        shares,
        avg_cost,
        last_price,
    }
}

pub fn portfolio_with(persona: Persona, cash: f64, positions: Vec<Position>) -> Portfolio {
    let mut portfolio = Portfolio::new("acct-1", persona, cash);
    portfolio.positions = positions;
    portfolio
}

/// Fixed-quote market data provider.
pub struct StaticProvider {
    snapshots: HashMap<String, MarketSnapshot>,
}

impl StaticProvider {
    pub fn new(snapshots: Vec<MarketSnapshot>) -> Self {
        Self {
            snapshots: snapshots
                .into_iter()
                .map(|s| (s.symbol.clone(), s))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn snapshot(&self, symbol: &str) -> Option<MarketSnapshot> {
        self.snapshots.get(symbol).cloned()
    }
}

/// Alert sink that records every notification, optionally failing each call.
pub struct RecordingAlertSink {
    pub notified: Mutex<Vec<(String, usize)>>,
    pub fail: bool,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self {
            notified: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            notified: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl AlertSink for RecordingAlertSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, account: &Account, summaries: &[RunSummary]) -> Result<(), DomainError> {
        let trades: usize = summaries.iter().map(|s| s.executed_trade_count).sum();
        self.notified
            .lock()
            .unwrap()
            .push((account.id.clone(), trades));
        if self.fail {
            return Err(DomainError::DataUnavailable("sink offline".into()));
        }
        Ok(())
    }
}

/// Store wrapper with switchable failure points.
pub struct FlakyStore {
    inner: Arc<SqliteStore>,
    pub fail_run_record_saves: bool,
    pub fail_load_for: Option<Persona>,
    pub run_records_saved: AtomicUsize,
}

impl FlakyStore {
    pub fn wrapping(inner: Arc<SqliteStore>) -> Self {
        Self {
            inner,
            fail_run_record_saves: false,
            fail_load_for: None,
            run_records_saved: AtomicUsize::new(0),
        }
    }
}

impl PersistenceStore for FlakyStore {
    fn load_portfolio(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<Option<Portfolio>, DomainError> {
        if self.fail_load_for == Some(persona) {
            return Err(DomainError::Persistence("simulated outage".into()));
        }
        self.inner.load_portfolio(account_id, persona)
    }

    fn save_portfolio(&self, portfolio: &Portfolio) -> Result<(), DomainError> {
        self.inner.save_portfolio(portfolio)
    }

    fn append_transaction(&self, transaction: &Transaction) -> Result<(), DomainError> {
        self.inner.append_transaction(transaction)
    }

    fn list_transactions(
        &self,
        account_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, DomainError> {
        self.inner.list_transactions(account_id, filter)
    }

    fn save_run_record(&self, record: &AgentRunRecord) -> Result<(), DomainError> {
        if self.fail_run_record_saves {
            return Err(DomainError::Persistence("simulated outage".into()));
        }
        self.run_records_saved.fetch_add(1, Ordering::SeqCst);
        self.inner.save_run_record(record)
    }

    fn load_latest_run_record(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<Option<AgentRunRecord>, DomainError> {
        self.inner.load_latest_run_record(account_id, persona)
    }

    fn create_account(&self, account: &Account) -> Result<(), DomainError> {
        self.inner.create_account(account)
    }

    fn get_account(&self, account_id: &str) -> Result<Option<Account>, DomainError> {
        self.inner.get_account(account_id)
    }

    fn list_accounts(&self) -> Result<Vec<Account>, DomainError> {
        self.inner.list_accounts()
    }
}

/// Council wired to an in-memory store, fixed quotes, and a recording sink.
pub fn council_with(
    quotes: Vec<MarketSnapshot>,
    alerts: Arc<RecordingAlertSink>,
) -> (Council, Arc<SqliteStore>) {
    let store = sqlite_store();
    let council = Council::with_providers(
        store.clone(),
        Arc::new(StaticProvider::new(quotes)),
        alerts,
        CouncilConfig::default(),
    );
    (council, store)
}
