use crate::domain::values::persona::Persona;
use crate::domain::values::trade_action::TradeAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of an executed trade. Append-only audit trail; rows are
/// never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub account_id: String,
    pub persona: Persona,
    pub action: TradeAction,
    pub symbol: String,
    pub shares: f64,
    pub price: f64,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        portfolio_id: &str,
        account_id: &str,
        persona: Persona,
        action: TradeAction,
        symbol: &str,
        shares: f64,
        price: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            account_id: account_id.to_string(),
            persona,
            action,
            symbol: symbol.to_string(),
            shares,
            price,
            reasoning: reasoning.into(),
            created_at: Utc::now(),
        }
    }

    pub fn total_value(&self) -> f64 {
        self.shares * self.price
    }
}
