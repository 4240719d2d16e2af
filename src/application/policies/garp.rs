//! Growth-at-a-reasonable-price policy.
//!
//! Classifies each name by its earnings-growth band, then buys fast growers
//! and stalwarts whose PEG ratio says the growth is not already paid for.

use crate::domain::entities::portfolio::Portfolio;
use crate::domain::ports::policy::StrategyPolicy;
use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use crate::domain::values::snapshot::{MarketSnapshot, MarketView};

const WATCHLIST: [&str; 27] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "HD", "NKE", "SBUX", "MCD", "DIS",
    "TGT", "COST", "WMT", "LULU", "CMG", "NFLX", "CRM", "ADBE", "NOW", "SHOP", "SQ", "PYPL", "V",
    "MA", "AXP",
];

const MAX_PEG: f64 = 1.5;
const SELL_PEG: f64 = 2.5;
const MAX_POSITIONS: usize = 15;
const MAX_BUYS_PER_RUN: usize = 2;
const MAX_POSITION_PCT: f64 = 0.10;
const CASH_FRACTION: f64 = 0.4;

const CYCLICAL_SECTORS: [&str; 3] = ["Energy", "Materials", "Industrials"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthClass {
    FastGrower,
    Stalwart,
    SlowGrower,
    Turnaround,
    AssetPlay,
    Cyclical,
}

impl GrowthClass {
    pub fn label(&self) -> &'static str {
        match self {
            GrowthClass::FastGrower => "fast grower",
            GrowthClass::Stalwart => "stalwart",
            GrowthClass::SlowGrower => "slow grower",
            GrowthClass::Turnaround => "turnaround",
            GrowthClass::AssetPlay => "asset play",
            GrowthClass::Cyclical => "cyclical",
        }
    }
}

pub struct GarpPolicy;

impl GarpPolicy {
    /// PEG ratio: the quoted figure when present, otherwise P/E divided by
    /// growth percent. Needs a positive P/E and positive growth.
    fn peg(snap: &MarketSnapshot) -> Option<f64> {
        let pe = snap.pe_ratio.filter(|pe| *pe > 0.0)?;
        if let Some(peg) = snap.peg_ratio {
            return Some(peg);
        }
        let growth = snap.earnings_growth.filter(|g| *g > 0.0)?;
        Some(pe / (growth * 100.0))
    }

    pub fn classify(snap: &MarketSnapshot) -> GrowthClass {
        let growth_pct = snap.earnings_growth.unwrap_or(0.0) * 100.0;

        if growth_pct > 20.0 {
            return GrowthClass::FastGrower;
        }
        if growth_pct > 10.0 {
            return GrowthClass::Stalwart;
        }
        if growth_pct > 0.0 {
            return GrowthClass::SlowGrower;
        }
        if growth_pct < -10.0 {
            return GrowthClass::Turnaround;
        }
        if snap.pb_ratio.is_some_and(|pb| pb < 1.0) {
            return GrowthClass::AssetPlay;
        }
        if snap
            .sector
            .as_deref()
            .is_some_and(|sector| CYCLICAL_SECTORS.contains(&sector))
        {
            return GrowthClass::Cyclical;
        }
        GrowthClass::Stalwart
    }

    fn position_size(portfolio: &Portfolio, price: f64) -> f64 {
        let max_position_value = portfolio.total_value() * MAX_POSITION_PCT;
        let available_cash = portfolio.cash * CASH_FRACTION;
        (max_position_value.min(available_cash) / price).floor()
    }
}

impl StrategyPolicy for GarpPolicy {
    fn persona(&self) -> Persona {
        Persona::Garp
    }

    fn universe(&self) -> Vec<String> {
        WATCHLIST.iter().map(|s| s.to_string()).collect()
    }

    fn analyze(&self, view: &MarketView) -> String {
        let mut analysis = format!(
            "Date: {}\nPhilosophy: growth at a reasonable price. PEG under 1 is a bargain.\n\nClassifications:\n",
            view.as_of().date_naive()
        );

        for class in [GrowthClass::FastGrower, GrowthClass::Stalwart] {
            let mut members: Vec<(&str, f64, f64)> = WATCHLIST
                .iter()
                .filter_map(|symbol| view.get(symbol))
                .filter(|snap| Self::classify(snap) == class)
                .filter_map(|snap| {
                    Self::peg(snap).filter(|peg| *peg > 0.0).map(|peg| {
                        (
                            snap.symbol.as_str(),
                            peg,
                            snap.earnings_growth.unwrap_or(0.0) * 100.0,
                        )
                    })
                })
                .collect();
            members.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            });

            analysis.push_str(&format!("\n{}s:\n", class.label()));
            for (symbol, peg, growth) in members.iter().take(3) {
                analysis.push_str(&format!("  - {symbol}: PEG {peg:.2}, growth {growth:.0}%\n"));
            }
        }

        analysis
    }

    fn recommend(&self, portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation> {
        let mut recommendations = Vec::new();

        for position in &portfolio.positions {
            let Some(snap) = view.get(&position.symbol) else {
                continue;
            };
            if let Some(peg) = Self::peg(snap).filter(|peg| *peg > SELL_PEG) {
                recommendations.push(TradeRecommendation::sell(
                    &position.symbol,
                    position.shares,
                    format!("PEG expanded to {peg:.2}, overvalued"),
                    0.75,
                ));
            }
        }

        if portfolio.positions.len() < MAX_POSITIONS {
            let mut candidates: Vec<(&MarketSnapshot, f64, GrowthClass)> = WATCHLIST
                .iter()
                .filter(|symbol| !portfolio.holds(symbol))
                .filter_map(|symbol| view.get(symbol))
                .filter_map(|snap| Self::peg(snap).map(|peg| (snap, peg, Self::classify(snap))))
                .filter(|(_, peg, class)| {
                    *peg > 0.0
                        && *peg < MAX_PEG
                        && matches!(class, GrowthClass::FastGrower | GrowthClass::Stalwart)
                })
                .collect();
            candidates.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.symbol.cmp(&b.0.symbol))
            });

            for (snap, peg, class) in candidates.into_iter().take(MAX_BUYS_PER_RUN) {
                let shares = Self::position_size(portfolio, snap.price);
                if shares >= 1.0 {
                    recommendations.push(TradeRecommendation::buy(
                        &snap.symbol,
                        shares,
                        format!("{}: PEG {peg:.2}", class.label()),
                        (1.0 - peg / 2.0).min(0.9),
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

    fn snap_with_growth(symbol: &str, growth: Option<f64>) -> MarketSnapshot {
        let mut snap = MarketSnapshot::new(symbol, 100.0);
        snap.earnings_growth = growth;
        snap
    }

    #[test]
    fn test_classify_growth_bands() {
        assert_eq!(
            GarpPolicy::classify(&snap_with_growth("A", Some(0.25))),
            GrowthClass::FastGrower
        );
        assert_eq!(
            GarpPolicy::classify(&snap_with_growth("B", Some(0.15))),
            GrowthClass::Stalwart
        );
        assert_eq!(
            GarpPolicy::classify(&snap_with_growth("C", Some(0.05))),
            GrowthClass::SlowGrower
        );
        assert_eq!(
            GarpPolicy::classify(&snap_with_growth("D", Some(-0.2))),
            GrowthClass::Turnaround
        );
    }

    #[test]
    fn test_classify_asset_play_and_cyclical() {
        let mut snap = snap_with_growth("E", None);
        snap.pb_ratio = Some(0.8);
        assert_eq!(GarpPolicy::classify(&snap), GrowthClass::AssetPlay);

        let mut snap = snap_with_growth("F", None);
        snap.sector = Some("Energy".into());
        assert_eq!(GarpPolicy::classify(&snap), GrowthClass::Cyclical);

        let snap = snap_with_growth("G", None);
        assert_eq!(GarpPolicy::classify(&snap), GrowthClass::Stalwart);
    }

    #[test]
    fn test_peg_derivation() {
        let mut snap = snap_with_growth("H", Some(0.20));
        snap.pe_ratio = Some(30.0);
        // 30 / 20 = 1.5
        assert_eq!(GarpPolicy::peg(&snap), Some(1.5));

        // Quoted PEG wins over the derived one.
        snap.peg_ratio = Some(1.1);
        assert_eq!(GarpPolicy::peg(&snap), Some(1.1));

        // No growth, no quoted PEG: fail closed.
        let mut snap = snap_with_growth("I", None);
        snap.pe_ratio = Some(30.0);
        assert_eq!(GarpPolicy::peg(&snap), None);
    }
}
