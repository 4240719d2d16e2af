//! Momentum-growth policy: concentrated bets on disruptive themes.
//!
//! Scores candidates on revenue growth, small size, and volatility; buys the
//! highest-scoring unheld names and adds to existing positions that have sold
//! off hard while the thesis is unchanged.

use crate::domain::entities::portfolio::{Portfolio, Position};
use crate::domain::ports::policy::StrategyPolicy;
use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use crate::domain::values::snapshot::{MarketSnapshot, MarketView};

const THEME_STOCKS: [(&str, &[&str]); 6] = [
    (
        "artificial intelligence",
        &["NVDA", "MSFT", "GOOGL", "PLTR", "PATH", "SNOW"],
    ),
    ("robotics and automation", &["ISRG", "ABB", "ROK", "TER"]),
    ("energy storage", &["TSLA", "ENPH", "SEDG", "RUN", "PLUG"]),
    ("genomics", &["CRSP", "BEAM", "NTLA", "EDIT", "PACB"]),
    ("blockchain", &["COIN", "SQ", "MSTR", "RIOT", "MARA"]),
    (
        "autonomous mobility",
        &["TSLA", "UBER", "LYFT", "APTV", "LAZR"],
    ),
];

const MIN_SCORE: f64 = 0.5;
const MAX_BUYS_PER_RUN: usize = 3;
const BASE_POSITION_PCT: f64 = 0.03;
const SCORE_POSITION_PCT: f64 = 0.04;
const TOP_POSITION_PCT: f64 = 0.10;
const CASH_FRACTION: f64 = 0.3;

const DIP_DRAWDOWN: f64 = 0.30;
const DIP_UNREALIZED_LOSS: f64 = -0.20;
const DIP_SCORE: f64 = 0.7;

pub struct MomentumGrowthPolicy;

impl MomentumGrowthPolicy {
    /// Innovation score in [0, 1]: growth band, inverse market-cap band, and
    /// volatility band averaged over whichever are present.
    fn innovation_score(snap: &MarketSnapshot) -> f64 {
        let mut score = 0.0;
        let mut factors = 0u32;

        if let Some(growth) = snap.revenue_growth {
            score += if growth > 0.30 {
                1.0
            } else if growth > 0.20 {
                0.8
            } else if growth > 0.10 {
                0.5
            } else {
                0.0
            };
            factors += 1;
        }
        if let Some(cap) = snap.market_cap {
            score += if cap < 10e9 {
                0.8
            } else if cap < 50e9 {
                0.6
            } else {
                0.3
            };
            factors += 1;
        }
        if let Some(beta) = snap.beta {
            score += if beta > 1.5 {
                0.7
            } else if beta > 1.2 {
                0.5
            } else {
                0.0
            };
            factors += 1;
        }

        score / factors.max(1) as f64
    }

    fn themes_for(symbol: &str) -> Vec<&'static str> {
        THEME_STOCKS
            .iter()
            .filter(|(_, stocks)| stocks.contains(&symbol))
            .map(|(theme, _)| *theme)
            .collect()
    }

    fn all_symbols() -> Vec<&'static str> {
        let mut symbols: Vec<&'static str> = THEME_STOCKS
            .iter()
            .flat_map(|(_, stocks)| stocks.iter().copied())
            .collect();
        symbols.sort_unstable();
        symbols.dedup();
        symbols
    }

    fn position_size(portfolio: &Portfolio, price: f64, score: f64) -> f64 {
        let conviction_pct = (BASE_POSITION_PCT + score * SCORE_POSITION_PCT).min(TOP_POSITION_PCT);
        let max_position_value = portfolio.total_value() * conviction_pct;
        let available_cash = portfolio.cash * CASH_FRACTION;
        (max_position_value.min(available_cash) / price).floor()
    }

    /// Deep drawdown from the 52-week high plus a large unrealized loss.
    fn is_dip_add(snap: &MarketSnapshot, position: &Position) -> bool {
        let Some(high) = snap.fifty_two_week_high.filter(|h| *h > 0.0) else {
            return false;
        };
        if snap.price <= 0.0 {
            return false;
        }
        let drawdown = (high - snap.price) / high;
        drawdown > DIP_DRAWDOWN && position.gain_loss_pct() < DIP_UNREALIZED_LOSS
    }
}

impl StrategyPolicy for MomentumGrowthPolicy {
    fn persona(&self) -> Persona {
        Persona::MomentumGrowth
    }

    fn universe(&self) -> Vec<String> {
        Self::all_symbols().iter().map(|s| s.to_string()).collect()
    }

    fn analyze(&self, view: &MarketView) -> String {
        let mut analysis = format!(
            "Date: {}\nPhilosophy: own the platforms of the next decade.\n\nTheme scan:\n",
            view.as_of().date_naive()
        );

        for (theme, stocks) in THEME_STOCKS {
            analysis.push_str(&format!("\n{theme}:\n"));
            for symbol in stocks.iter().take(2) {
                if let Some(snap) = view.get(symbol) {
                    let growth = snap.revenue_growth.unwrap_or(0.0) * 100.0;
                    analysis.push_str(&format!("  - {symbol}: revenue growth {growth:.0}%\n"));
                }
            }
        }

        analysis
    }

    fn recommend(&self, portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation> {
        let mut recommendations = Vec::new();

        let mut candidates: Vec<(&MarketSnapshot, f64)> = Self::all_symbols()
            .into_iter()
            .filter(|symbol| !portfolio.holds(symbol))
            .filter_map(|symbol| view.get(symbol))
            .map(|snap| (snap, Self::innovation_score(snap)))
            .filter(|(_, score)| *score > MIN_SCORE)
            .collect();
        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.symbol.cmp(&b.0.symbol))
        });

        for (snap, score) in candidates.into_iter().take(MAX_BUYS_PER_RUN) {
            let shares = Self::position_size(portfolio, snap.price, score);
            if shares >= 1.0 {
                let themes = Self::themes_for(&snap.symbol).join(", ");
                recommendations.push(TradeRecommendation::buy(
                    &snap.symbol,
                    shares,
                    format!("Innovation play ({themes}), score {score:.2}"),
                    score.min(0.9),
                ));
            }
        }

        for position in &portfolio.positions {
            let Some(snap) = view.get(&position.symbol) else {
                continue;
            };
            if Self::is_dip_add(snap, position) {
                let shares = Self::position_size(portfolio, snap.price, DIP_SCORE);
                if shares >= 1.0 {
                    recommendations.push(TradeRecommendation::buy(
                        &position.symbol,
                        shares,
                        "Adding on weakness, conviction unchanged".to_string(),
                        0.75,
                    ));
                }
            }
        }

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_innovation_score_bands() {
        let mut snap = MarketSnapshot::new("PLTR", 20.0);
        snap.revenue_growth = Some(0.35);
        snap.market_cap = Some(8e9);
        snap.beta = Some(1.8);
        // (1.0 + 0.8 + 0.7) / 3
        let score = MomentumGrowthPolicy::innovation_score(&snap);
        assert!((score - 2.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_innovation_score_no_data_is_zero() {
        let snap = MarketSnapshot::new("PLTR", 20.0);
        assert_eq!(MomentumGrowthPolicy::innovation_score(&snap), 0.0);
    }

    #[test]
    fn test_dip_add_requires_both_signals() {
        let mut snap = MarketSnapshot::new("COIN", 60.0);
        snap.fifty_two_week_high = Some(100.0);
        let losing = Position {
            symbol: "COIN".into(),
            shares: 10.0,
            avg_cost: 90.0,
            last_price: 60.0,
        };
        assert!(MomentumGrowthPolicy::is_dip_add(&snap, &losing));

        // Drawdown without an unrealized loss: no add.
        let winning = Position {
            symbol: "COIN".into(),
            shares: 10.0,
            avg_cost: 50.0,
            last_price: 60.0,
        };
        assert!(!MomentumGrowthPolicy::is_dip_add(&snap, &winning));

        // Missing 52-week high fails closed.
        let no_high = MarketSnapshot::new("COIN", 60.0);
        assert!(!MomentumGrowthPolicy::is_dip_add(&no_high, &losing));
    }
}
