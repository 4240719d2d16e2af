use crate::domain::entities::account::Account;
use crate::domain::error::DomainError;
use crate::domain::values::persona::Persona;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// Per-(account, persona) outcome exposed to collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub persona: Persona,
    pub status: RunStatus,
    pub executed_trade_count: usize,
    pub value_before: f64,
    pub value_after: f64,
    /// Present when status is Failed.
    pub error: Option<String>,
}

/// Outbound notification collaborator. Fire-and-forget: a sink failure is
/// logged by the caller and never fails the run or the batch.
#[async_trait]
pub trait AlertSink: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, account: &Account, summaries: &[RunSummary]) -> Result<(), DomainError>;
}
