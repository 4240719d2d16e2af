//! Risk-parity policy: a fixed all-weather basket held at target weights.
//!
//! No security selection at all; the only decisions are closing weight drift
//! against the target allocation and putting idle cash to work.

use crate::domain::entities::portfolio::Portfolio;
use crate::domain::ports::policy::StrategyPolicy;
use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use crate::domain::values::snapshot::MarketView;

/// Target weights: stocks 30, long bonds 40, intermediate bonds 15, gold 7.5,
/// commodities 7.5 (percent).
const TARGET_ALLOCATION: [(&str, f64); 5] = [
    ("VTI", 0.30),
    ("TLT", 0.40),
    ("IEI", 0.15),
    ("GLD", 0.075),
    ("DBC", 0.075),
];

const DRIFT_THRESHOLD: f64 = 0.05;
const CASH_DEPLOY_TRIGGER: f64 = 0.10;
const DEPLOY_FRACTION: f64 = 0.90;

pub struct RiskParityPolicy;

impl RiskParityPolicy {
    fn current_weight(portfolio: &Portfolio, symbol: &str, total: f64) -> f64 {
        if total <= 0.0 {
            return 0.0;
        }
        portfolio
            .position(symbol)
            .map(|p| p.market_value() / total)
            .unwrap_or(0.0)
    }

    fn rebalance(portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation> {
        let total = portfolio.total_value();
        let mut recommendations = Vec::new();
        if total <= 0.0 {
            return recommendations;
        }

        for (symbol, target_weight) in TARGET_ALLOCATION {
            let current_weight = Self::current_weight(portfolio, symbol, total);
            let drift = (current_weight - target_weight).abs();
            if drift <= DRIFT_THRESHOLD {
                continue;
            }
            let Some(price) = view.price(symbol).filter(|p| *p > 0.0) else {
                continue;
            };

            let reasoning = format!(
                "Rebalance: {:.1}% -> {:.1}%",
                current_weight * 100.0,
                target_weight * 100.0
            );

            if current_weight < target_weight {
                let value_to_buy = (target_weight - current_weight) * total;
                let shares = (value_to_buy / price).floor();
                if shares >= 1.0 && value_to_buy <= portfolio.cash {
                    recommendations.push(TradeRecommendation::buy(symbol, shares, reasoning, 0.85));
                }
            } else {
                let value_to_sell = (current_weight - target_weight) * total;
                let shares = (value_to_sell / price).floor();
                let held = portfolio.position(symbol).map(|p| p.shares).unwrap_or(0.0);
                if shares >= 1.0 && held >= shares {
                    recommendations.push(TradeRecommendation::sell(
                        symbol, shares, reasoning, 0.85,
                    ));
                }
            }
        }

        recommendations
    }

    /// Spread most of the idle cash across the basket at target weights.
    fn deploy_cash(portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation> {
        let deployable = portfolio.cash * DEPLOY_FRACTION;
        let mut recommendations = Vec::new();

        for (symbol, weight) in TARGET_ALLOCATION {
            let Some(price) = view.price(symbol).filter(|p| *p > 0.0) else {
                continue;
            };
            let shares = (deployable * weight / price).floor();
            if shares >= 1.0 {
                recommendations.push(TradeRecommendation::buy(
                    symbol,
                    shares,
                    format!("Initial allocation: {:.1}% of portfolio", weight * 100.0),
                    0.9,
                ));
            }
        }

        recommendations
    }
}

impl StrategyPolicy for RiskParityPolicy {
    fn persona(&self) -> Persona {
        Persona::RiskParity
    }

    fn universe(&self) -> Vec<String> {
        TARGET_ALLOCATION
            .iter()
            .map(|(symbol, _)| symbol.to_string())
            .collect()
    }

    fn analyze(&self, view: &MarketView) -> String {
        let mut analysis = format!(
            "Date: {}\nPhilosophy: balance risk across economic environments.\n\nTarget allocation:\n",
            view.as_of().date_naive()
        );
        for (symbol, weight) in TARGET_ALLOCATION {
            analysis.push_str(&format!("  - {symbol}: {:.1}%\n", weight * 100.0));
        }
        analysis.push_str(
            "\nQuadrants:\n\
             - growth rising + inflation rising: commodities\n\
             - growth rising + inflation falling: stocks\n\
             - growth falling + inflation rising: gold\n\
             - growth falling + inflation falling: bonds\n",
        );
        analysis
    }

    fn recommend(&self, portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation> {
        let mut recommendations = Self::rebalance(portfolio, view);

        if portfolio.cash > portfolio.total_value() * CASH_DEPLOY_TRIGGER {
            recommendations.extend(Self::deploy_cash(portfolio, view));
        }

        recommendations
    }
}
