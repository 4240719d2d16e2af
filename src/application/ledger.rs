//! Portfolio mutation arithmetic.
//!
//! Every change to cash or positions flows through these functions; policies
//! and the runner never touch the fields directly. Invariants upheld here:
//! cash never goes negative, a position exists iff its share count is
//! positive, buys blend the weighted-average cost basis, and executed share
//! counts are always whole (fractional requests are floored).

use crate::domain::entities::portfolio::{Portfolio, Position};
use crate::domain::error::DomainError;
use crate::domain::values::trade_action::TradeAction;
use chrono::Utc;

/// Outcome of a ledger mutation, ready to become a transaction row.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub action: TradeAction,
    pub symbol: String,
    /// Whole number of shares actually executed. May be less than requested
    /// for a clamped buy or a partial sell.
    pub shares: f64,
    pub price: f64,
}

/// Buy up to `requested_shares` of `symbol` at `price`.
///
/// Requests the portfolio cannot fully afford are clamped to
/// `floor(cash / price)` shares; if not even one share is affordable the buy
/// fails with `InsufficientFunds` and the portfolio is untouched.
pub fn apply_buy(
    portfolio: &mut Portfolio,
    symbol: &str,
    requested_shares: f64,
    price: f64,
) -> Result<Fill, DomainError> {
    validate_price(symbol, price)?;
    let requested = floor_shares(symbol, requested_shares)?;

    let mut shares = requested;
    if shares * price > portfolio.cash {
        shares = (portfolio.cash / price).floor();
    }
    // The floored quotient can still round against us at the float boundary.
    while shares >= 1.0 && shares * price > portfolio.cash {
        shares -= 1.0;
    }
    if shares < 1.0 {
        return Err(DomainError::InsufficientFunds(format!(
            "cannot afford one share of {symbol} at {price:.2} with cash {:.2}",
            portfolio.cash
        )));
    }

    let cost = shares * price;
    portfolio.cash -= cost;

    match portfolio.position_mut(symbol) {
        Some(position) => {
            let total_shares = position.shares + shares;
            let total_invested = position.shares * position.avg_cost + cost;
            position.avg_cost = total_invested / total_shares;
            position.shares = total_shares;
            position.last_price = price;
        }
        None => portfolio.positions.push(Position {
            symbol: symbol.to_string(),
            shares,
            avg_cost: price,
            last_price: price,
        }),
    }
    portfolio.updated_at = Utc::now();

    Ok(Fill {
        action: TradeAction::Buy,
        symbol: symbol.to_string(),
        shares,
        price,
    })
}

/// Sell up to `requested_shares` of `symbol` at `price`.
///
/// Executes `min(requested, held)` shares and removes the position the
/// moment its share count reaches zero. Fails with `NoPosition` when the
/// symbol is not held.
pub fn apply_sell(
    portfolio: &mut Portfolio,
    symbol: &str,
    requested_shares: f64,
    price: f64,
) -> Result<Fill, DomainError> {
    validate_price(symbol, price)?;
    let requested = floor_shares(symbol, requested_shares)?;

    let held = portfolio
        .position(symbol)
        .map(|p| p.shares)
        .ok_or_else(|| DomainError::NoPosition(format!("no position in {symbol} to sell")))?;

    let shares = requested.min(held);
    portfolio.cash += shares * price;

    if let Some(position) = portfolio.position_mut(symbol) {
        position.shares -= shares;
        position.last_price = price;
    }
    portfolio.positions.retain(|p| p.shares > 0.0);
    portfolio.updated_at = Utc::now();

    Ok(Fill {
        action: TradeAction::Sell,
        symbol: symbol.to_string(),
        shares,
        price,
    })
}

/// Update `last_price` on every held position that has a quote. Positions
/// without one keep their previous price; cash and cost basis are never
/// touched.
pub fn refresh_prices<F>(portfolio: &mut Portfolio, lookup: F)
where
    F: Fn(&str) -> Option<f64>,
{
    for position in &mut portfolio.positions {
        if let Some(price) = lookup(&position.symbol) {
            position.last_price = price;
        }
    }
}

fn validate_price(symbol: &str, price: f64) -> Result<(), DomainError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DomainError::Validation(format!(
            "invalid price {price} for {symbol}"
        )));
    }
    Ok(())
}

fn floor_shares(symbol: &str, requested: f64) -> Result<f64, DomainError> {
    if !requested.is_finite() || requested.floor() < 1.0 {
        return Err(DomainError::Validation(format!(
            "share request {requested} for {symbol} rounds to zero"
        )));
    }
    Ok(requested.floor())
}
