//! TTL cache in front of a live market-data provider.
//!
//! Purely a performance layer: a stale entry is refetched, a fetch miss stays
//! a miss, and nothing here can affect ledger arithmetic.

use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::values::snapshot::MarketSnapshot;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct CacheEntry {
    snapshot: MarketSnapshot,
    fetched: Instant,
}

pub struct CachedProvider {
    inner: Arc<dyn MarketDataProvider>,
    ttl: Duration,
    name: String,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn MarketDataProvider>, ttl: Duration) -> Self {
        let name = format!("cached_{}", inner.name());
        Self {
            inner,
            ttl,
            name,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn lookup(&self, symbol: &str) -> Option<MarketSnapshot> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(symbol)
            .filter(|entry| entry.fetched.elapsed() < self.ttl)
            .map(|entry| entry.snapshot.clone())
    }

    fn insert(&self, symbol: &str, snapshot: &MarketSnapshot) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                symbol.to_string(),
                CacheEntry {
                    snapshot: snapshot.clone(),
                    fetched: Instant::now(),
                },
            );
        }
    }
}

#[async_trait]
impl MarketDataProvider for CachedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn snapshot(&self, symbol: &str) -> Option<MarketSnapshot> {
        if let Some(hit) = self.lookup(symbol) {
            return Some(hit);
        }
        let fresh = self.inner.snapshot(symbol).await?;
        self.insert(symbol, &fresh);
        Some(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn snapshot(&self, symbol: &str) -> Option<MarketSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol == "MISS" {
                None
            } else {
                Some(MarketSnapshot::new(symbol, 100.0))
            }
        }
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedProvider::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.snapshot("AAPL").await.is_some());
        assert!(cached.snapshot("AAPL").await.is_some());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedProvider::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.snapshot("MISS").await.is_none());
        assert!(cached.snapshot("MISS").await.is_none());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedProvider::new(inner.clone(), Duration::from_millis(0));

        assert!(cached.snapshot("AAPL").await.is_some());
        assert!(cached.snapshot("AAPL").await.is_some());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
