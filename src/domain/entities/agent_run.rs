use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one persona did to one account in one cycle: the narrative it wrote,
/// every recommendation it considered, and the ids of the transactions that
/// actually executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRunRecord {
    pub id: String,
    pub account_id: String,
    pub persona: Persona,
    pub run_date: DateTime<Utc>,
    pub analysis: String,
    pub recommendations: Vec<TradeRecommendation>,
    /// Transaction ids, in execution order.
    pub executed_trades: Vec<String>,
    pub value_before: f64,
    pub value_after: f64,
    pub duration_seconds: f64,
}

impl AgentRunRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: impl Into<String>,
        persona: Persona,
        run_date: DateTime<Utc>,
        analysis: String,
        recommendations: Vec<TradeRecommendation>,
        executed_trades: Vec<String>,
        value_before: f64,
        value_after: f64,
        duration_seconds: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.into(),
            persona,
            run_date,
            analysis,
            recommendations,
            executed_trades,
            value_before,
            value_after,
            duration_seconds,
        }
    }
}
