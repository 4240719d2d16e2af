//! Daily batch over every (persona, account) pair.
//!
//! Failure isolation is absolute: one pair's error is recorded in its summary
//! and the batch moves on. Pairs are processed sequentially, so no two
//! mutators ever hold the same (account, persona) portfolio at once.

use crate::application::policies::all_policies;
use crate::application::runner::AgentRunner;
use crate::config::CouncilConfig;
use crate::domain::entities::account::Account;
use crate::domain::error::DomainError;
use crate::domain::ports::alert::{AlertSink, RunStatus, RunSummary};
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::ports::persistence::PersistenceStore;
use crate::domain::ports::policy::StrategyPolicy;
use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Serialize)]
pub struct AccountReport {
    pub account_id: String,
    pub summaries: Vec<RunSummary>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub accounts_processed: usize,
    pub runs_completed: usize,
    pub runs_failed: usize,
    pub trades_executed: usize,
    pub accounts: Vec<AccountReport>,
}

pub struct DailyOrchestrator {
    runner: AgentRunner,
    store: Arc<dyn PersistenceStore>,
    alerts: Arc<dyn AlertSink>,
    policies: Vec<Box<dyn StrategyPolicy>>,
}

impl DailyOrchestrator {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        market: Arc<dyn MarketDataProvider>,
        alerts: Arc<dyn AlertSink>,
        config: CouncilConfig,
    ) -> Self {
        Self {
            runner: AgentRunner::new(store.clone(), market, config),
            store,
            alerts,
            policies: all_policies(),
        }
    }

    /// Run every persona against every known account and aggregate a report.
    pub async fn run_all(&self) -> Result<BatchReport, DomainError> {
        let started_at = Utc::now();
        let clock = std::time::Instant::now();

        let accounts = self.store.list_accounts()?;
        info!(accounts = accounts.len(), "starting daily batch");

        let mut reports = Vec::with_capacity(accounts.len());
        let mut runs_completed = 0;
        let mut runs_failed = 0;
        let mut trades_executed = 0;

        for account in &accounts {
            let summaries = self.run_account(account).await;

            let account_trades: usize = summaries.iter().map(|s| s.executed_trade_count).sum();
            runs_completed += summaries
                .iter()
                .filter(|s| s.status == RunStatus::Completed)
                .count();
            runs_failed += summaries
                .iter()
                .filter(|s| s.status == RunStatus::Failed)
                .count();
            trades_executed += account_trades;

            if account_trades > 0 && account.alerts_enabled {
                // Fire-and-forget: a sink failure never fails the batch.
                if let Err(e) = self.alerts.notify(account, &summaries).await {
                    warn!(account = %account.id, error = %e, "alert delivery failed");
                }
            }

            reports.push(AccountReport {
                account_id: account.id.clone(),
                summaries,
            });
        }

        let report = BatchReport {
            started_at,
            duration_seconds: clock.elapsed().as_secs_f64(),
            accounts_processed: accounts.len(),
            runs_completed,
            runs_failed,
            trades_executed,
            accounts: reports,
        };
        info!(
            accounts = report.accounts_processed,
            completed = report.runs_completed,
            failed = report.runs_failed,
            trades = report.trades_executed,
            "daily batch finished"
        );
        Ok(report)
    }

    /// Run all six personas against one account, isolating each failure.
    pub async fn run_account(&self, account: &Account) -> Vec<RunSummary> {
        let mut summaries = Vec::with_capacity(self.policies.len());
        for policy in &self.policies {
            let persona = policy.persona();
            match self.runner.run(policy.as_ref(), &account.id).await {
                Ok(report) => summaries.push(report.summary),
                Err(e) => {
                    error!(account = %account.id, persona = %persona, error = %e, "run failed");
                    summaries.push(RunSummary {
                        persona,
                        status: RunStatus::Failed,
                        executed_trade_count: 0,
                        value_before: 0.0,
                        value_after: 0.0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        summaries
    }
}

/// Weekday gate applied by the scheduling shell; weekends produce no batch.
pub fn is_market_day(date: DateTime<Utc>) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_is_market_day() {
        // 2024-06-03 is a Monday, 2024-06-08 a Saturday.
        let monday = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap();
        let saturday = Utc.with_ymd_and_hms(2024, 6, 8, 14, 0, 0).unwrap();
        assert!(is_market_day(monday));
        assert!(!is_market_day(saturday));
    }
}
