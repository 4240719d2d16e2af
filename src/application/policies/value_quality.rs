//! Value-quality policy: durable franchises at fair prices.
//!
//! Screens a fixed large-cap watchlist for a "moat" (at least two of strong
//! returns on equity, fat margins, modest leverage, growing revenue), scores
//! quality on banded fundamentals, and concentrates the book in a handful of
//! high-conviction names.

use crate::domain::entities::portfolio::Portfolio;
use crate::domain::ports::policy::StrategyPolicy;
use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use crate::domain::values::snapshot::{MarketSnapshot, MarketView};

const WATCHLIST: [&str; 20] = [
    "AAPL", "KO", "AXP", "BAC", "CVX", "OXY", "KHC", "MCO", "DVA", "VRSN", "V", "MA", "JNJ", "PG",
    "WMT", "COST", "HD", "UNH", "JPM", "BRK-B",
];

const MAX_POSITIONS: usize = 10;
const MAX_BUYS_PER_RUN: usize = 2;
const MIN_SCORE: f64 = 0.6;
const MAX_BUY_PE: f64 = 30.0;
const SELL_PE: f64 = 50.0;
const MAX_POSITION_PCT: f64 = 0.15;
const CASH_FRACTION: f64 = 0.5;

pub struct ValueQualityPolicy;

impl ValueQualityPolicy {
    /// At least two independent signals of a durable advantage.
    fn has_moat(snap: &MarketSnapshot) -> bool {
        let mut signals = 0;
        if snap.return_on_equity.is_some_and(|roe| roe > 0.15) {
            signals += 1;
        }
        if snap.profit_margin.is_some_and(|margin| margin > 0.10) {
            signals += 1;
        }
        if snap.debt_to_equity.is_some_and(|de| de < 100.0) {
            signals += 1;
        }
        if snap.revenue_growth.is_some_and(|growth| growth > 0.0) {
            signals += 1;
        }
        signals >= 2
    }

    /// Banded quality score in [0, 1], averaged over the fields present.
    fn quality_score(snap: &MarketSnapshot) -> f64 {
        let mut score = 0.0;
        let mut factors = 0u32;

        if let Some(pe) = snap.pe_ratio {
            score += if pe < 15.0 {
                1.0
            } else if pe < 20.0 {
                0.7
            } else if pe < 25.0 {
                0.4
            } else {
                0.1
            };
            factors += 1;
        }
        if let Some(roe) = snap.return_on_equity {
            score += if roe > 0.20 {
                1.0
            } else if roe > 0.15 {
                0.7
            } else if roe > 0.10 {
                0.4
            } else {
                0.0
            };
            factors += 1;
        }
        if let Some(margin) = snap.profit_margin {
            score += if margin > 0.20 {
                1.0
            } else if margin > 0.10 {
                0.6
            } else {
                0.0
            };
            factors += 1;
        }
        if let Some(de) = snap.debt_to_equity {
            score += if de < 50.0 {
                1.0
            } else if de < 100.0 {
                0.6
            } else if de < 200.0 {
                0.3
            } else {
                0.0
            };
            factors += 1;
        }
        if let Some(cr) = snap.current_ratio {
            score += if cr > 1.5 {
                0.8
            } else if cr > 1.0 {
                0.5
            } else {
                0.0
            };
            factors += 1;
        }

        score / factors.max(1) as f64
    }

    fn is_buy_candidate(snap: &MarketSnapshot) -> bool {
        if !Self::has_moat(snap) {
            return false;
        }
        if Self::quality_score(snap) < MIN_SCORE {
            return false;
        }
        match snap.pe_ratio {
            Some(pe) => pe <= MAX_BUY_PE,
            None => false,
        }
    }

    fn should_sell(snap: &MarketSnapshot) -> bool {
        !Self::has_moat(snap) || snap.pe_ratio.is_some_and(|pe| pe > SELL_PE)
    }

    fn position_size(portfolio: &Portfolio, price: f64) -> f64 {
        let max_position_value = portfolio.total_value() * MAX_POSITION_PCT;
        let available_cash = portfolio.cash * CASH_FRACTION;
        (max_position_value.min(available_cash) / price).floor()
    }

    fn buy_reasoning(snap: &MarketSnapshot, score: f64) -> String {
        let mut reasons = Vec::new();
        if let Some(roe) = snap.return_on_equity.filter(|roe| *roe > 0.15) {
            reasons.push(format!("strong ROE of {:.1}%", roe * 100.0));
        }
        if let Some(margin) = snap.profit_margin.filter(|m| *m > 0.10) {
            reasons.push(format!("healthy margins of {:.1}%", margin * 100.0));
        }
        if let Some(pe) = snap.pe_ratio.filter(|pe| *pe < 20.0) {
            reasons.push(format!("reasonable P/E of {pe:.1}"));
        }
        if snap.debt_to_equity.is_some_and(|de| de < 100.0) {
            reasons.push("conservative debt levels".to_string());
        }
        if reasons.is_empty() {
            format!("Quality score {score:.2}")
        } else {
            format!("Quality score {score:.2}. {}", reasons.join("; "))
        }
    }
}

impl StrategyPolicy for ValueQualityPolicy {
    fn persona(&self) -> Persona {
        Persona::ValueQuality
    }

    fn universe(&self) -> Vec<String> {
        WATCHLIST.iter().map(|s| s.to_string()).collect()
    }

    fn analyze(&self, view: &MarketView) -> String {
        let mut opportunities: Vec<(&str, f64, &MarketSnapshot)> = WATCHLIST
            .iter()
            .filter_map(|symbol| view.get(symbol))
            .filter(|snap| Self::has_moat(snap))
            .map(|snap| (snap.symbol.as_str(), Self::quality_score(snap), snap))
            .filter(|(_, score, _)| *score >= MIN_SCORE)
            .collect();
        opportunities.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let mut analysis = format!(
            "Date: {}\nPhilosophy: wonderful companies at fair prices.\n\nMarket scan results:\n",
            view.as_of().date_naive()
        );
        for (symbol, score, snap) in opportunities.iter().take(5) {
            let pe = snap
                .pe_ratio
                .map(|pe| format!("{pe:.1}"))
                .unwrap_or_else(|| "N/A".into());
            let roe = snap
                .return_on_equity
                .map(|roe| format!("{:.1}%", roe * 100.0))
                .unwrap_or_else(|| "N/A".into());
            analysis.push_str(&format!("- {symbol}: score {score:.2}, P/E {pe}, ROE {roe}\n"));
        }
        if opportunities.is_empty() {
            analysis.push_str("No compelling opportunities today. Cash is a position.\n");
        }
        analysis
    }

    fn recommend(&self, portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation> {
        let mut recommendations = Vec::new();

        for position in &portfolio.positions {
            if let Some(snap) = view.get(&position.symbol) {
                if Self::should_sell(snap) {
                    recommendations.push(TradeRecommendation::sell(
                        &position.symbol,
                        position.shares,
                        "Moat deterioration or extreme overvaluation".to_string(),
                        0.8,
                    ));
                }
            }
        }

        if portfolio.positions.len() < MAX_POSITIONS {
            let mut candidates: Vec<(&MarketSnapshot, f64)> = WATCHLIST
                .iter()
                .filter(|symbol| !portfolio.holds(symbol))
                .filter_map(|symbol| view.get(symbol))
                .filter(|snap| Self::is_buy_candidate(snap))
                .map(|snap| (snap, Self::quality_score(snap)))
                .collect();
            candidates.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.symbol.cmp(&b.0.symbol))
            });

            let mut buys = 0;
            for (snap, score) in candidates {
                if buys >= MAX_BUYS_PER_RUN {
                    break;
                }
                let shares = Self::position_size(portfolio, snap.price);
                if shares >= 1.0 {
                    recommendations.push(TradeRecommendation::buy(
                        &snap.symbol,
                        shares,
                        Self::buy_reasoning(snap, score),
                        score.min(0.95),
                    ));
                    buys += 1;
                }
            }
        }

        recommendations
    }
}
