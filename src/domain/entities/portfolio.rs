use crate::domain::values::persona::Persona;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single holding inside a portfolio.
///
/// Present iff `shares > 0`; the ledger removes the position the moment its
/// share count reaches zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub shares: f64,
    /// Weighted-average cost basis per share.
    pub avg_cost: f64,
    /// Last observed market price; refreshed from snapshots, never from trades
    /// after the position exists.
    pub last_price: f64,
}

impl Position {
    pub fn market_value(&self) -> f64 {
        self.shares * self.last_price
    }

    pub fn gain_loss(&self) -> f64 {
        (self.last_price - self.avg_cost) * self.shares
    }

    pub fn gain_loss_pct(&self) -> f64 {
        if self.avg_cost == 0.0 {
            return 0.0;
        }
        (self.last_price - self.avg_cost) / self.avg_cost
    }
}

/// One persona's paper-trading account state.
///
/// Mutated only through the ledger functions; everything else reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: String,
    pub account_id: String,
    pub persona: Persona,
    pub cash: f64,
    pub positions: Vec<Position>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(account_id: impl Into<String>, persona: Persona, starting_cash: f64) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.into(),
            persona,
            cash: starting_cash,
            positions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    pub fn position_mut(&mut self, symbol: &str) -> Option<&mut Position> {
        self.positions.iter_mut().find(|p| p.symbol == symbol)
    }

    pub fn holds(&self, symbol: &str) -> bool {
        self.position(symbol).is_some()
    }

    /// Cash plus the market value of every position, at last observed prices.
    /// Pure read; recomputable at any time.
    pub fn total_value(&self) -> f64 {
        self.cash + self.positions.iter().map(Position::market_value).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio_with(positions: Vec<Position>, cash: f64) -> Portfolio {
        let mut p = Portfolio::new("acct-1", Persona::ValueQuality, cash);
        p.positions = positions;
        p
    }

    #[test]
    fn test_total_value_sums_cash_and_positions() {
        let portfolio = portfolio_with(
            vec![
                Position {
                    symbol: "AAPL".into(),
                    shares: 10.0,
                    avg_cost: 100.0,
                    last_price: 150.0,
                },
                Position {
                    symbol: "KO".into(),
                    shares: 5.0,
                    avg_cost: 60.0,
                    last_price: 50.0,
                },
            ],
            1000.0,
        );
        assert_eq!(portfolio.total_value(), 1000.0 + 1500.0 + 250.0);
    }

    #[test]
    fn test_empty_portfolio_value_is_cash() {
        let portfolio = portfolio_with(vec![], 100_000.0);
        assert_eq!(portfolio.total_value(), 100_000.0);
    }

    #[test]
    fn test_gain_loss_pct() {
        let position = Position {
            symbol: "TSLA".into(),
            shares: 4.0,
            avg_cost: 200.0,
            last_price: 150.0,
        };
        assert_eq!(position.gain_loss(), -200.0);
        assert_eq!(position.gain_loss_pct(), -0.25);

        let free = Position {
            symbol: "GIFT".into(),
            shares: 1.0,
            avg_cost: 0.0,
            last_price: 10.0,
        };
        assert_eq!(free.gain_loss_pct(), 0.0);
    }

    #[test]
    fn test_position_lookup() {
        let portfolio = portfolio_with(
            vec![Position {
                symbol: "VTI".into(),
                shares: 2.0,
                avg_cost: 220.0,
                last_price: 230.0,
            }],
            0.0,
        );
        assert!(portfolio.holds("VTI"));
        assert!(!portfolio.holds("BND"));
        assert_eq!(portfolio.position("VTI").unwrap().shares, 2.0);
    }
}
