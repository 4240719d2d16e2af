//! Daily batch tests: full persona x account coverage, per-pair failure
//! isolation, and fire-and-forget alerting.

mod common;

use common::{council_with, snap, sqlite_store, FlakyStore, RecordingAlertSink, StaticProvider};
use council::config::CouncilConfig;
use council::domain::ports::alert::RunStatus;
use council::domain::values::persona::Persona;
use council::Council;
use std::sync::Arc;

fn basket_quotes() -> Vec<council::domain::values::snapshot::MarketSnapshot> {
    // Quotes only for the risk-parity sleeves, so exactly one persona trades.
    vec![
        snap("VTI", 200.0),
        snap("TLT", 100.0),
        snap("IEI", 120.0),
        snap("GLD", 180.0),
        snap("DBC", 25.0),
    ]
}

#[tokio::test]
async fn test_batch_covers_every_persona_for_every_account() {
    let alerts = Arc::new(RecordingAlertSink::new());
    let (council, _store) = council_with(basket_quotes(), alerts.clone());
    council.add_account("alice", "alice@example.com", true).unwrap();
    council.add_account("bob", "bob@example.com", true).unwrap();

    let report = council.run_daily().await.unwrap();

    assert_eq!(report.accounts_processed, 2);
    assert_eq!(report.runs_completed, 12);
    assert_eq!(report.runs_failed, 0);
    for account in &report.accounts {
        assert_eq!(account.summaries.len(), Persona::ALL.len());
        let personas: Vec<Persona> = account.summaries.iter().map(|s| s.persona).collect();
        assert_eq!(personas, Persona::ALL.to_vec());
    }
    // Risk parity deployed cash for both fresh accounts.
    assert!(report.trades_executed > 0);
}

#[tokio::test]
async fn test_accounts_with_trades_get_notified() {
    let alerts = Arc::new(RecordingAlertSink::new());
    let (council, _store) = council_with(basket_quotes(), alerts.clone());
    council.add_account("alice", "alice@example.com", true).unwrap();
    council.add_account("mute", "mute@example.com", false).unwrap();

    council.run_daily().await.unwrap();

    let notified = alerts.notified.lock().unwrap();
    // Alice traded and has alerts on; mute traded but opted out.
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].0, "alice");
    assert!(notified[0].1 > 0);
}

#[tokio::test]
async fn test_quiet_day_sends_no_alerts() {
    let alerts = Arc::new(RecordingAlertSink::new());
    // No quotes at all: nobody can trade.
    let (council, _store) = council_with(vec![], alerts.clone());
    council.add_account("alice", "alice@example.com", true).unwrap();

    let report = council.run_daily().await.unwrap();
    assert_eq!(report.trades_executed, 0);
    assert!(alerts.notified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_alert_sink_failure_does_not_fail_the_batch() {
    let alerts = Arc::new(RecordingAlertSink::failing());
    let (council, _store) = council_with(basket_quotes(), alerts.clone());
    council.add_account("alice", "alice@example.com", true).unwrap();

    let report = council.run_daily().await.unwrap();
    assert_eq!(report.runs_failed, 0);
    // The sink was invoked and its failure swallowed.
    assert_eq!(alerts.notified.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_one_pair_failure_is_isolated() {
    let inner = sqlite_store();
    let mut flaky = FlakyStore::wrapping(inner);
    flaky.fail_load_for = Some(Persona::Garp);

    let alerts = Arc::new(RecordingAlertSink::new());
    let council = Council::with_providers(
        Arc::new(flaky),
        Arc::new(StaticProvider::new(basket_quotes())),
        alerts,
        CouncilConfig::default(),
    );
    council.add_account("alice", "alice@example.com", true).unwrap();

    let report = council.run_daily().await.unwrap();

    assert_eq!(report.runs_failed, 1);
    assert_eq!(report.runs_completed, 5);

    let summaries = &report.accounts[0].summaries;
    for summary in summaries {
        if summary.persona == Persona::Garp {
            assert_eq!(summary.status, RunStatus::Failed);
            assert!(summary.error.as_deref().unwrap().contains("outage"));
        } else {
            assert_eq!(summary.status, RunStatus::Completed);
            assert!(summary.error.is_none());
        }
    }
}
