use crate::domain::entities::account::Account;
use crate::domain::error::DomainError;
use crate::domain::ports::alert::{AlertSink, RunSummary};
use async_trait::async_trait;
use tracing::info;

/// Default notification sink: writes the daily summary to the log. Outbound
/// delivery (email and the like) lives outside this crate behind the same
/// trait.
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, account: &Account, summaries: &[RunSummary]) -> Result<(), DomainError> {
        for summary in summaries {
            info!(
                account = %account.id,
                persona = %summary.persona,
                status = ?summary.status,
                trades = summary.executed_trade_count,
                value_before = summary.value_before,
                value_after = summary.value_after,
                "daily summary"
            );
        }
        Ok(())
    }
}
