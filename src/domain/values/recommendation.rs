use crate::domain::values::confidence::Confidence;
use crate::domain::values::trade_action::TradeAction;
use serde::{Deserialize, Serialize};

/// A trade suggested by a policy. Never mutates state itself; the runner
/// decides whether it is eligible for execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecommendation {
    pub action: TradeAction,
    pub symbol: String,
    /// Requested share count. May be fractional; execution floors it.
    pub shares: f64,
    pub reasoning: String,
    pub confidence: Confidence,
}

impl TradeRecommendation {
    pub fn buy(symbol: &str, shares: f64, reasoning: String, confidence: f64) -> Self {
        Self {
            action: TradeAction::Buy,
            symbol: symbol.to_string(),
            shares,
            reasoning,
            confidence: Confidence::clamped(confidence),
        }
    }

    pub fn sell(symbol: &str, shares: f64, reasoning: String, confidence: f64) -> Self {
        Self {
            action: TradeAction::Sell,
            symbol: symbol.to_string(),
            shares,
            reasoning,
            confidence: Confidence::clamped(confidence),
        }
    }
}
