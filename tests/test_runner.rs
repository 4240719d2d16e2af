//! Runner cycle tests: lazy portfolio init, eligibility, execution order,
//! non-fatal drops, and at-least-once persistence semantics.

mod common;

use common::{snap, sqlite_store, FlakyStore, StaticProvider};
use council::application::runner::AgentRunner;
use council::config::CouncilConfig;
use council::domain::entities::portfolio::Portfolio;
use council::domain::error::DomainError;
use council::domain::ports::persistence::{PersistenceStore, TransactionFilter};
use council::domain::ports::policy::StrategyPolicy;
use council::domain::values::persona::Persona;
use council::domain::values::recommendation::TradeRecommendation;
use council::domain::values::snapshot::MarketView;
use std::sync::Arc;

/// Emits a fixed list of recommendations regardless of the view.
struct ScriptedPolicy {
    universe: Vec<String>,
    recommendations: Vec<TradeRecommendation>,
}

impl ScriptedPolicy {
    fn new(universe: &[&str], recommendations: Vec<TradeRecommendation>) -> Self {
        Self {
            universe: universe.iter().map(|s| s.to_string()).collect(),
            recommendations,
        }
    }
}

impl StrategyPolicy for ScriptedPolicy {
    fn persona(&self) -> Persona {
        Persona::ValueQuality
    }

    fn universe(&self) -> Vec<String> {
        self.universe.clone()
    }

    fn analyze(&self, _view: &MarketView) -> String {
        "scripted analysis".to_string()
    }

    fn recommend(&self, _portfolio: &Portfolio, _view: &MarketView) -> Vec<TradeRecommendation> {
        self.recommendations.clone()
    }
}

fn runner_with(
    store: Arc<dyn PersistenceStore>,
    quotes: Vec<council::domain::values::snapshot::MarketSnapshot>,
) -> AgentRunner {
    AgentRunner::new(
        store,
        Arc::new(StaticProvider::new(quotes)),
        CouncilConfig::default(),
    )
}

#[tokio::test]
async fn test_first_run_initializes_portfolio_with_starting_cash() {
    let store = sqlite_store();
    let runner = runner_with(store.clone(), vec![]);
    let policy = ScriptedPolicy::new(&[], vec![]);

    let report = runner.run(&policy, "acct-1").await.unwrap();

    assert_eq!(report.record.value_before, 100_000.0);
    assert_eq!(report.record.value_after, 100_000.0);
    assert!(report.record.executed_trades.is_empty());
    assert_eq!(report.record.analysis, "scripted analysis");

    let portfolio = store
        .load_portfolio("acct-1", Persona::ValueQuality)
        .unwrap()
        .expect("portfolio should have been created");
    assert_eq!(portfolio.cash, 100_000.0);

    let latest = store
        .load_latest_run_record("acct-1", Persona::ValueQuality)
        .unwrap()
        .expect("run record should have been saved");
    assert_eq!(latest.id, report.record.id);
}

#[tokio::test]
async fn test_only_recommendations_above_threshold_execute() {
    let store = sqlite_store();
    let runner = runner_with(
        store.clone(),
        vec![snap("AAPL", 100.0), snap("MSFT", 100.0)],
    );
    let policy = ScriptedPolicy::new(
        &["AAPL", "MSFT"],
        vec![
            TradeRecommendation::buy("AAPL", 10.0, "conviction".into(), 0.9),
            TradeRecommendation::buy("MSFT", 10.0, "a hunch".into(), 0.5),
        ],
    );

    let report = runner.run(&policy, "acct-1").await.unwrap();

    assert_eq!(report.record.executed_trades.len(), 1);
    // Both recommendations are preserved in the record either way.
    assert_eq!(report.record.recommendations.len(), 2);

    let portfolio = store
        .load_portfolio("acct-1", Persona::ValueQuality)
        .unwrap()
        .unwrap();
    assert!(portfolio.holds("AAPL"));
    assert!(!portfolio.holds("MSFT"));
}

#[tokio::test]
async fn test_higher_confidence_wins_the_cash_pool() {
    let store = sqlite_store();
    let runner = runner_with(store.clone(), vec![snap("AAA", 100.0), snap("BBB", 100.0)]);
    // Emitted low-confidence first; each wants 60% of the cash.
    let policy = ScriptedPolicy::new(
        &["AAA", "BBB"],
        vec![
            TradeRecommendation::buy("AAA", 600.0, "decent setup".into(), 0.75),
            TradeRecommendation::buy("BBB", 600.0, "great setup".into(), 0.9),
        ],
    );

    let report = runner.run(&policy, "acct-1").await.unwrap();
    assert_eq!(report.record.executed_trades.len(), 2);

    let portfolio = store
        .load_portfolio("acct-1", Persona::ValueQuality)
        .unwrap()
        .unwrap();
    // BBB executed first at full size; AAA was clamped to the remaining cash.
    assert_eq!(portfolio.position("BBB").unwrap().shares, 600.0);
    assert_eq!(portfolio.position("AAA").unwrap().shares, 400.0);
    assert!(portfolio.cash.abs() < 1e-9);

    let transactions = store
        .list_transactions("acct-1", &TransactionFilter::default())
        .unwrap();
    assert_eq!(transactions.len(), 2);
}

#[tokio::test]
async fn test_unquoted_symbol_is_skipped_not_fatal() {
    let store = sqlite_store();
    let runner = runner_with(store.clone(), vec![]);
    let policy = ScriptedPolicy::new(
        &["GHOST"],
        vec![TradeRecommendation::buy(
            "GHOST",
            10.0,
            "phantom".into(),
            0.9,
        )],
    );

    let report = runner.run(&policy, "acct-1").await.unwrap();
    assert!(report.record.executed_trades.is_empty());
    assert_eq!(report.summary.executed_trade_count, 0);
}

#[tokio::test]
async fn test_sell_without_position_is_dropped() {
    let store = sqlite_store();
    let runner = runner_with(store.clone(), vec![snap("AAPL", 100.0)]);
    let policy = ScriptedPolicy::new(
        &["AAPL"],
        vec![TradeRecommendation::sell(
            "AAPL",
            10.0,
            "lighten up".into(),
            0.9,
        )],
    );

    let report = runner.run(&policy, "acct-1").await.unwrap();
    assert!(report.record.executed_trades.is_empty());

    let portfolio = store
        .load_portfolio("acct-1", Persona::ValueQuality)
        .unwrap()
        .unwrap();
    assert_eq!(portfolio.cash, 100_000.0);
    assert!(store
        .list_transactions("acct-1", &TransactionFilter::default())
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_persistence_failure_fails_run_but_keeps_mutations() {
    let inner = sqlite_store();
    let mut flaky = FlakyStore::wrapping(inner.clone());
    flaky.fail_run_record_saves = true;
    let store: Arc<dyn PersistenceStore> = Arc::new(flaky);

    let runner = runner_with(store, vec![snap("AAPL", 100.0)]);
    let policy = ScriptedPolicy::new(
        &["AAPL"],
        vec![TradeRecommendation::buy("AAPL", 10.0, "buy it".into(), 0.9)],
    );

    let err = runner.run(&policy, "acct-1").await.unwrap_err();
    assert!(matches!(err, DomainError::Persistence(_)));

    // The ledger mutation and its transaction were already durable; only the
    // run record is missing. The next scheduled run is the retry.
    let portfolio = inner
        .load_portfolio("acct-1", Persona::ValueQuality)
        .unwrap()
        .unwrap();
    assert_eq!(portfolio.position("AAPL").unwrap().shares, 10.0);
    assert_eq!(portfolio.cash, 99_000.0);
    assert_eq!(
        inner
            .list_transactions("acct-1", &TransactionFilter::default())
            .unwrap()
            .len(),
        1
    );
    assert!(inner
        .load_latest_run_record("acct-1", Persona::ValueQuality)
        .unwrap()
        .is_none());
}
