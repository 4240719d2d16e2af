//! Passive-indexing policy: two funds, a target split, and patience.
//!
//! Acts only in the first days of a month (deploying accumulated cash) or
//! when the invested stock/bond split has drifted well off target. Every
//! other day it recommends nothing at all.

use crate::domain::entities::portfolio::Portfolio;
use crate::domain::ports::policy::StrategyPolicy;
use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use crate::domain::values::snapshot::MarketView;
use chrono::Datelike;

const STOCK_FUND: &str = "VTI";
const BOND_FUND: &str = "BND";

const TARGET_STOCK_PCT: f64 = 0.70;
const REBALANCE_THRESHOLD: f64 = 0.05;
const MIN_CASH_TO_DEPLOY: f64 = 1_000.0;
/// Calendar trigger: the monthly contribution window covers day 1 through 5.
const DEPLOY_WINDOW_LAST_DAY: u32 = 5;

pub struct PassiveIndexPolicy;

impl PassiveIndexPolicy {
    fn allocate_cash(cash: f64, view: &MarketView) -> Vec<TradeRecommendation> {
        let mut recommendations = Vec::new();

        let stock_allocation = cash * TARGET_STOCK_PCT;
        let bond_allocation = cash * (1.0 - TARGET_STOCK_PCT);

        if let Some(price) = view.price(STOCK_FUND).filter(|p| *p > 0.0) {
            let shares = (stock_allocation / price).floor();
            if shares >= 1.0 {
                recommendations.push(TradeRecommendation::buy(
                    STOCK_FUND,
                    shares,
                    "Monthly allocation to the total market index".to_string(),
                    0.95,
                ));
            }
        }
        if let Some(price) = view.price(BOND_FUND).filter(|p| *p > 0.0) {
            let shares = (bond_allocation / price).floor();
            if shares >= 1.0 {
                recommendations.push(TradeRecommendation::buy(
                    BOND_FUND,
                    shares,
                    "Monthly allocation to the total bond index".to_string(),
                    0.95,
                ));
            }
        }

        recommendations
    }

    fn rebalance(
        portfolio: &Portfolio,
        view: &MarketView,
        current_stock_pct: f64,
    ) -> Vec<TradeRecommendation> {
        let mut recommendations = Vec::new();

        let total_value = portfolio.total_value();
        let target_stock_value = total_value * TARGET_STOCK_PCT;
        let current_stock_value = portfolio
            .position(STOCK_FUND)
            .map(|p| p.market_value())
            .unwrap_or(0.0);

        let Some(price) = view.price(STOCK_FUND).filter(|p| *p > 0.0) else {
            return recommendations;
        };

        if current_stock_pct > TARGET_STOCK_PCT {
            let excess = current_stock_value - target_stock_value;
            let shares = (excess / price).floor();
            if shares >= 1.0 {
                recommendations.push(TradeRecommendation::sell(
                    STOCK_FUND,
                    shares,
                    format!(
                        "Rebalance: stocks over target ({:.1}% vs {:.1}%)",
                        current_stock_pct * 100.0,
                        TARGET_STOCK_PCT * 100.0
                    ),
                    0.85,
                ));
            }
        } else {
            let deficit = target_stock_value - current_stock_value;
            if portfolio.cash >= deficit {
                let shares = (deficit / price).floor();
                if shares >= 1.0 {
                    recommendations.push(TradeRecommendation::buy(
                        STOCK_FUND,
                        shares,
                        format!(
                            "Rebalance: stocks under target ({:.1}% vs {:.1}%)",
                            current_stock_pct * 100.0,
                            TARGET_STOCK_PCT * 100.0
                        ),
                        0.85,
                    ));
                }
            }
        }

        recommendations
    }
}

impl StrategyPolicy for PassiveIndexPolicy {
    fn persona(&self) -> Persona {
        Persona::PassiveIndex
    }

    fn universe(&self) -> Vec<String> {
        vec![STOCK_FUND.to_string(), BOND_FUND.to_string()]
    }

    fn analyze(&self, view: &MarketView) -> String {
        let in_window = view.as_of().day() <= DEPLOY_WINDOW_LAST_DAY;
        format!(
            "Date: {}\nPhilosophy: time in the market beats timing the market.\n\
             Action: {}\nTarget allocation: {:.0}% stocks / {:.0}% bonds\n",
            view.as_of().date_naive(),
            if in_window {
                "monthly investment day, deploying new capital"
            } else {
                "stay the course"
            },
            TARGET_STOCK_PCT * 100.0,
            (1.0 - TARGET_STOCK_PCT) * 100.0,
        )
    }

    fn recommend(&self, portfolio: &Portfolio, view: &MarketView) -> Vec<TradeRecommendation> {
        let mut recommendations = Vec::new();

        if portfolio.cash > MIN_CASH_TO_DEPLOY && view.as_of().day() <= DEPLOY_WINDOW_LAST_DAY {
            recommendations.extend(Self::allocate_cash(portfolio.cash, view));
        }

        let stock_value = portfolio
            .position(STOCK_FUND)
            .map(|p| p.market_value())
            .unwrap_or(0.0);
        let bond_value = portfolio
            .position(BOND_FUND)
            .map(|p| p.market_value())
            .unwrap_or(0.0);
        let total_invested = stock_value + bond_value;

        if total_invested > 0.0 {
            let current_stock_pct = stock_value / total_invested;
            if (current_stock_pct - TARGET_STOCK_PCT).abs() > REBALANCE_THRESHOLD {
                recommendations.extend(Self::rebalance(portfolio, view, current_stock_pct));
            }
        }

        recommendations
    }
}
