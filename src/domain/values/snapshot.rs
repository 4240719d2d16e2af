//! Point-in-time market data for the decision policies.
//!
//! A [`MarketSnapshot`] carries the price plus the valuation, quality, and
//! growth figures a policy screens on. Every ratio field is optional; a
//! policy that needs an absent field must treat the candidate as failing the
//! screen rather than guessing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub price: f64,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub market_cap: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub current_ratio: Option<f64>,
    /// Debt to equity, expressed as a percentage (e.g. 80.0 for 0.8x).
    pub debt_to_equity: Option<f64>,
    /// Year-over-year revenue growth as a fraction (0.25 = 25%).
    pub revenue_growth: Option<f64>,
    /// Year-over-year earnings growth as a fraction.
    pub earnings_growth: Option<f64>,
    pub profit_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub sector: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// A snapshot with only a price; every screen field starts absent.
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            pe_ratio: None,
            pb_ratio: None,
            peg_ratio: None,
            market_cap: None,
            dividend_yield: None,
            current_ratio: None,
            debt_to_equity: None,
            revenue_growth: None,
            earnings_growth: None,
            profit_margin: None,
            return_on_equity: None,
            beta: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            sector: None,
            fetched_at: Utc::now(),
        }
    }

    /// Trailing earnings per share, derived from price and P/E.
    pub fn eps(&self) -> Option<f64> {
        match self.pe_ratio {
            Some(pe) if pe > 0.0 && self.price > 0.0 => Some(self.price / pe),
            _ => None,
        }
    }
}

/// Immutable bundle of snapshots handed to a policy for one run.
///
/// Policies read prices and screens from here and nowhere else, which keeps
/// `analyze`/`recommend` pure. The batch timestamp drives calendar-based
/// triggers so two runs over the same view always decide the same way.
#[derive(Debug, Clone)]
pub struct MarketView {
    as_of: DateTime<Utc>,
    snapshots: HashMap<String, MarketSnapshot>,
}

impl MarketView {
    pub fn new(as_of: DateTime<Utc>, snapshots: HashMap<String, MarketSnapshot>) -> Self {
        Self { as_of, snapshots }
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn get(&self, symbol: &str) -> Option<&MarketSnapshot> {
        self.snapshots.get(symbol)
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.snapshots.get(symbol).map(|s| s.price)
    }

    /// Symbols present in the view, sorted so iteration order is stable.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.snapshots.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
