use crate::domain::values::snapshot::MarketSnapshot;
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of point-in-time market snapshots.
///
/// A provider that cannot quote a symbol returns `None` for it; callers treat
/// the symbol as missing and move on. Implementations are expected to bound
/// every external call with a timeout so a slow upstream degrades to "skip
/// this candidate" rather than stalling a run.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    async fn snapshot(&self, symbol: &str) -> Option<MarketSnapshot>;

    /// Fetch snapshots for a batch of symbols. Symbols without a quote are
    /// simply absent from the result.
    async fn snapshots(&self, symbols: &[String]) -> HashMap<String, MarketSnapshot> {
        let mut out = HashMap::new();
        for symbol in symbols {
            if let Some(snap) = self.snapshot(symbol).await {
                out.insert(symbol.clone(), snap);
            }
        }
        out
    }
}
