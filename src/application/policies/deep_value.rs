//! Deep-value policy: statistical bargains with a margin of safety.
//!
//! A hard quantitative screen (cheap earnings, cheap book, liquid balance
//! sheet, low leverage) feeds an intrinsic-value estimate; only names priced
//! at a deep discount to that estimate are bought, spread across many small
//! positions.

use crate::domain::entities::portfolio::Portfolio;
use crate::domain::ports::policy::StrategyPolicy;
use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use crate::domain::values::snapshot::{MarketSnapshot, MarketView};

const SCREEN_LIST: [&str; 36] = [
    "VZ", "T", "CVX", "XOM", "COP", "MRO", "F", "GM", "STLA", "C", "BAC", "WFC", "USB", "PNC",
    "TFC", "MET", "PRU", "AIG", "ALL", "PFE", "BMY", "GILD", "MRK", "DOW", "LYB", "NUE", "STLD",
    "X", "MOS", "CF", "IP", "WRK", "KSS", "M", "FL", "GPS",
];

const MAX_PE: f64 = 15.0;
const MAX_PB: f64 = 1.5;
const MIN_CURRENT_RATIO: f64 = 2.0;
const MAX_DEBT_EQUITY: f64 = 50.0;
const MIN_MARGIN_OF_SAFETY: f64 = 0.25;
const SELL_PE: f64 = 20.0;
const TARGET_POSITIONS: usize = 20;
const MAX_BUYS_PER_RUN: usize = 3;
const MAX_POSITION_PCT: f64 = 0.05;
const CASH_FRACTION: f64 = 0.8;

/// Default growth assumption (percent) when no estimate is available, and the
/// clamp applied to reported growth before it enters the valuation.
const DEFAULT_GROWTH_PCT: f64 = 5.0;
const MAX_GROWTH_PCT: f64 = 15.0;

/// Intrinsic value per share: `EPS x (8.5 + 2g)`, g in percent.
pub fn intrinsic_value(eps: f64, growth_pct: f64) -> f64 {
    eps * (8.5 + 2.0 * growth_pct)
}

pub struct DeepValuePolicy;

impl DeepValuePolicy {
    fn passes_screen(snap: &MarketSnapshot) -> bool {
        let Some(pe) = snap.pe_ratio else {
            return false;
        };
        if pe <= 0.0 || pe > MAX_PE {
            return false;
        }
        if !snap.pb_ratio.is_some_and(|pb| pb <= MAX_PB) {
            return false;
        }
        if !snap.current_ratio.is_some_and(|cr| cr >= MIN_CURRENT_RATIO) {
            return false;
        }
        if !snap.debt_to_equity.is_some_and(|de| de <= MAX_DEBT_EQUITY) {
            return false;
        }
        true
    }

    /// Fractional discount of price below intrinsic value, floored at zero.
    fn margin_of_safety(snap: &MarketSnapshot) -> Option<f64> {
        let eps = snap.eps()?;
        let growth_pct = snap
            .earnings_growth
            .map(|g| (g * 100.0).clamp(0.0, MAX_GROWTH_PCT))
            .unwrap_or(DEFAULT_GROWTH_PCT);
        let intrinsic = intrinsic_value(eps, growth_pct);
        if intrinsic <= 0.0 || snap.price <= 0.0 {
            return None;
        }
        Some(((intrinsic - snap.price) / intrinsic).max(0.0))
    }

    fn position_size(portfolio: &Portfolio, price: f64) -> f64 {
        let max_position_value = portfolio.total_value() * MAX_POSITION_PCT;
        let available_cash = portfolio.cash * CASH_FRACTION;
        (max_position_value.min(available_cash) / price).floor()
    }

    fn bargains(view: &MarketView) -> Vec<(&MarketSnapshot, f64)> {
        let mut bargains: Vec<(&MarketSnapshot, f64)> = SCREEN_LIST
            .iter()
            .filter_map(|symbol| view.get(symbol))
            .filter(|snap| Self::passes_screen(snap))
            .filter_map(|snap| Self::margin_of_safety(snap).map(|margin| (snap, margin)))
            .filter(|(_, margin)| *margin > MIN_MARGIN_OF_SAFETY)
            .collect();
        bargains.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.symbol.cmp(&b.0.symbol))
        });
        bargains
    }
}

impl StrategyPolicy for DeepValuePolicy {
    fn persona(&self) -> Persona {
        Persona::DeepValue
    }

    fn universe(&self) -> Vec<String> {
        SCREEN_LIST.iter().map(|s| s.to_string()).collect()
    }

    fn analyze(&self, view: &MarketView) -> String {
        let bargains = Self::bargains(view);

        let mut analysis = format!(
            "Date: {}\nPhilosophy: buy one-dollar bills for fifty cents.\n\n\
             Screen: P/E <= {MAX_PE}, P/B <= {MAX_PB}, current ratio >= {MIN_CURRENT_RATIO}, \
             debt/equity <= {MAX_DEBT_EQUITY}%\nBargains found: {}\n",
            view.as_of().date_naive(),
            bargains.len()
        );
        for (snap, margin) in bargains.iter().take(5) {
            let pb = snap
                .pb_ratio
                .map(|pb| format!("{pb:.2}"))
                .unwrap_or_else(|| "N/A".into());
            analysis.push_str(&format!(
                "- {}: {:.0}% margin of safety, P/E {:.1}, P/B {pb}\n",
                snap.symbol,
                margin * 100.0,
                snap.pe_ratio.unwrap_or(0.0),
            ));
        }
        analysis
    }

    fn recommend(&self, portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation> {
        let mut recommendations = Vec::new();

        for position in &portfolio.positions {
            let Some(snap) = view.get(&position.symbol) else {
                continue;
            };
            if !Self::passes_screen(snap) {
                recommendations.push(TradeRecommendation::sell(
                    &position.symbol,
                    position.shares,
                    "No longer meets the value screen".to_string(),
                    0.75,
                ));
            } else if snap.pe_ratio.is_some_and(|pe| pe > SELL_PE) {
                recommendations.push(TradeRecommendation::sell(
                    &position.symbol,
                    position.shares,
                    format!(
                        "P/E expanded to {:.1}, take profits",
                        snap.pe_ratio.unwrap_or(0.0)
                    ),
                    0.7,
                ));
            }
        }

        if portfolio.positions.len() < TARGET_POSITIONS {
            for (snap, margin) in Self::bargains(view)
                .into_iter()
                .filter(|(snap, _)| !portfolio.holds(&snap.symbol))
                .take(MAX_BUYS_PER_RUN)
            {
                let shares = Self::position_size(portfolio, snap.price);
                if shares >= 1.0 {
                    recommendations.push(TradeRecommendation::buy(
                        &snap.symbol,
                        shares,
                        format!("Bargain: {:.0}% margin of safety", margin * 100.0),
                        (0.5 + margin).min(0.9),
                    ));
                }
            }
        }

        recommendations
    }
}
