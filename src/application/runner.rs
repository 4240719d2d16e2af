//! One persona's cycle against one account.
//!
//! The runner composes a policy, the market-data port, and the persistence
//! port; it owns no decision logic and no arithmetic of its own. A cycle is:
//! load or initialize the portfolio, quote the policy's universe plus held
//! symbols, refresh prices, analyze, recommend, execute the eligible
//! recommendations, refresh prices again, persist.

use crate::application::ledger;
use crate::config::CouncilConfig;
use crate::domain::entities::agent_run::AgentRunRecord;
use crate::domain::entities::portfolio::Portfolio;
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::DomainError;
use crate::domain::ports::alert::{RunStatus, RunSummary};
use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::ports::persistence::PersistenceStore;
use crate::domain::ports::policy::StrategyPolicy;
use crate::domain::values::recommendation::TradeRecommendation;
use crate::domain::values::snapshot::MarketView;
use crate::domain::values::trade_action::TradeAction;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a finished run produces: the persisted record plus the summary
/// handed to collaborators.
#[derive(Debug)]
pub struct RunReport {
    pub record: AgentRunRecord,
    pub summary: RunSummary,
}

pub struct AgentRunner {
    store: Arc<dyn PersistenceStore>,
    market: Arc<dyn MarketDataProvider>,
    config: CouncilConfig,
}

impl AgentRunner {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        market: Arc<dyn MarketDataProvider>,
        config: CouncilConfig,
    ) -> Self {
        Self {
            store,
            market,
            config,
        }
    }

    /// Execute one full cycle. A persistence failure anywhere after the first
    /// ledger mutation leaves those mutations in effect; the run is reported
    /// failed and the next scheduled run is the retry.
    pub async fn run(
        &self,
        policy: &dyn StrategyPolicy,
        account_id: &str,
    ) -> Result<RunReport, DomainError> {
        let clock = std::time::Instant::now();
        let run_date = Utc::now();
        let persona = policy.persona();
        info!(account = account_id, persona = %persona, "starting run");

        let mut portfolio = match self.store.load_portfolio(account_id, persona)? {
            Some(portfolio) => portfolio,
            None => {
                let portfolio = Portfolio::new(account_id, persona, self.config.starting_cash);
                self.store.save_portfolio(&portfolio)?;
                info!(
                    account = account_id,
                    persona = %persona,
                    cash = self.config.starting_cash,
                    "initialized new portfolio"
                );
                portfolio
            }
        };

        let view = self.build_view(policy, &portfolio).await;
        ledger::refresh_prices(&mut portfolio, |symbol| view.price(symbol));
        let value_before = portfolio.total_value();

        let analysis = policy.analyze(&view);
        let recommendations = policy.recommend(&portfolio, &view);
        info!(count = recommendations.len(), "generated recommendations");

        let mut executed_trades = Vec::new();
        for recommendation in eligible(&recommendations, self.config.confidence_threshold) {
            if let Some(id) = self.execute(&mut portfolio, recommendation, &view)? {
                executed_trades.push(id);
            }
        }

        // Re-quote whatever is held now; buys during execution may have added
        // symbols the first fetch never saw.
        let held: Vec<String> = portfolio
            .positions
            .iter()
            .map(|p| p.symbol.clone())
            .collect();
        let requoted = self.market.snapshots(&held).await;
        ledger::refresh_prices(&mut portfolio, |symbol| {
            requoted.get(symbol).map(|snap| snap.price)
        });
        let value_after = portfolio.total_value();

        self.store.save_portfolio(&portfolio)?;
        let record = AgentRunRecord::new(
            account_id,
            persona,
            run_date,
            analysis,
            recommendations,
            executed_trades,
            value_before,
            value_after,
            clock.elapsed().as_secs_f64(),
        );
        self.store.save_run_record(&record)?;

        info!(
            account = account_id,
            persona = %persona,
            trades = record.executed_trades.len(),
            value_before,
            value_after,
            "run complete"
        );

        let summary = RunSummary {
            persona,
            status: RunStatus::Completed,
            executed_trade_count: record.executed_trades.len(),
            value_before,
            value_after,
            error: None,
        };
        Ok(RunReport { record, summary })
    }

    async fn build_view(&self, policy: &dyn StrategyPolicy, portfolio: &Portfolio) -> MarketView {
        let mut symbols = policy.universe();
        for position in &portfolio.positions {
            if !symbols.contains(&position.symbol) {
                symbols.push(position.symbol.clone());
            }
        }
        let snapshots = self.market.snapshots(&symbols).await;
        if snapshots.len() < symbols.len() {
            warn!(
                requested = symbols.len(),
                quoted = snapshots.len(),
                provider = self.market.name(),
                "some symbols had no quote"
            );
        }
        MarketView::new(Utc::now(), snapshots)
    }

    /// Apply one recommendation to the ledger. Returns the transaction id, or
    /// `None` when the recommendation was dropped for a non-fatal reason.
    fn execute(
        &self,
        portfolio: &mut Portfolio,
        recommendation: &TradeRecommendation,
        view: &MarketView,
    ) -> Result<Option<String>, DomainError> {
        let symbol = recommendation.symbol.as_str();
        let Some(price) = view.price(symbol) else {
            warn!(symbol, "no quote at execution time, skipping");
            return Ok(None);
        };

        let fill = match recommendation.action {
            TradeAction::Buy => ledger::apply_buy(portfolio, symbol, recommendation.shares, price),
            TradeAction::Sell => {
                ledger::apply_sell(portfolio, symbol, recommendation.shares, price)
            }
        };
        let fill = match fill {
            Ok(fill) => fill,
            Err(DomainError::InsufficientFunds(msg)) => {
                warn!(symbol, %msg, "buy dropped");
                return Ok(None);
            }
            Err(DomainError::NoPosition(msg)) => {
                warn!(symbol, %msg, "sell dropped");
                return Ok(None);
            }
            Err(DomainError::Validation(msg)) => {
                warn!(symbol, %msg, "recommendation dropped");
                return Ok(None);
            }
            Err(other) => return Err(other),
        };

        let transaction = Transaction::new(
            &portfolio.id,
            &portfolio.account_id,
            portfolio.persona,
            fill.action,
            &fill.symbol,
            fill.shares,
            fill.price,
            recommendation.reasoning.clone(),
        );
        self.store.append_transaction(&transaction)?;
        info!(
            action = %fill.action,
            symbol,
            shares = fill.shares,
            price = fill.price,
            "executed trade"
        );
        Ok(Some(transaction.id))
    }
}

/// Recommendations at or above the confidence threshold, highest confidence
/// first. The sort is stable, so equal confidences keep the policy's emit
/// order; when two recommendations compete for the same cash the more
/// confident one always executes first.
fn eligible(
    recommendations: &[TradeRecommendation],
    threshold: f64,
) -> Vec<&TradeRecommendation> {
    let mut eligible: Vec<&TradeRecommendation> = recommendations
        .iter()
        .filter(|r| r.confidence.value() >= threshold)
        .collect();
    eligible.sort_by(|a, b| {
        b.confidence
            .value()
            .partial_cmp(&a.confidence.value())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_filters_and_orders_by_confidence() {
        let recommendations = vec![
            TradeRecommendation::buy("A", 1.0, "low".into(), 0.6),
            TradeRecommendation::buy("B", 1.0, "high".into(), 0.9),
            TradeRecommendation::sell("C", 1.0, "mid".into(), 0.75),
            TradeRecommendation::buy("D", 1.0, "tie".into(), 0.9),
        ];

        let ordered: Vec<&str> = eligible(&recommendations, 0.7)
            .iter()
            .map(|r| r.symbol.as_str())
            .collect();
        // B before D: stable sort keeps emit order on ties.
        assert_eq!(ordered, vec!["B", "D", "C"]);
    }
}
