//! Strategy policy port.
//!
//! Defines the [`StrategyPolicy`] trait implemented once per persona. A
//! policy is a pure decision function: given a market view and a portfolio it
//! produces a narrative and an ordered list of trade recommendations, and
//! never touches storage or the network itself.
//!
//! # Contract
//!
//! - `analyze` and `recommend` are deterministic for a given view; calendar
//!   logic reads the view's `as_of` timestamp, never the wall clock.
//! - A screen that needs a field the snapshot does not carry fails closed:
//!   the candidate is skipped, nothing is guessed.
//! - No division by zero: ratios are only derived from strictly positive
//!   denominators.

use crate::domain::entities::portfolio::Portfolio;
use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use crate::domain::values::snapshot::MarketView;

/// One persona's decision rules.
///
/// # Example
///
/// ```ignore
/// struct CashHoarder;
///
/// impl StrategyPolicy for CashHoarder {
///     fn persona(&self) -> Persona { Persona::PassiveIndex }
///     fn universe(&self) -> Vec<String> { vec![] }
///     fn analyze(&self, _view: &MarketView) -> String {
///         "Cash is a position.".into()
///     }
///     fn recommend(&self, _portfolio: &Portfolio, _view: &MarketView) -> Vec<TradeRecommendation> {
///         vec![]
///     }
/// }
/// ```
pub trait StrategyPolicy: Send + Sync {
    fn persona(&self) -> Persona;

    /// Symbols this policy wants quoted before a run. The runner unions this
    /// with the portfolio's held symbols when building the market view.
    fn universe(&self) -> Vec<String>;

    /// Summarize current conditions through this persona's lens.
    fn analyze(&self, view: &MarketView) -> String;

    /// Produce trade recommendations. Emit order is preserved in the run
    /// record; execution order is decided by the runner.
    fn recommend(&self, portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation>;
}
