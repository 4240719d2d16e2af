use serde::{Deserialize, Serialize};

/// Process-wide knobs, passed explicitly into the facade and orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Cash a fresh portfolio starts with.
    pub starting_cash: f64,
    /// Minimum recommendation confidence for execution.
    pub confidence_threshold: f64,
    /// How long a cached quote stays fresh.
    pub quote_ttl_minutes: u64,
    /// Timeout applied to each market-data HTTP request.
    pub request_timeout_secs: u64,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            starting_cash: 100_000.0,
            confidence_threshold: 0.7,
            quote_ttl_minutes: 15,
            request_timeout_secs: 10,
        }
    }
}

impl CouncilConfig {
    /// Defaults with `COUNCIL_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_parse("COUNCIL_STARTING_CASH") {
            config.starting_cash = v;
        }
        if let Some(v) = env_parse("COUNCIL_CONFIDENCE_THRESHOLD") {
            config.confidence_threshold = v;
        }
        if let Some(v) = env_parse("COUNCIL_QUOTE_TTL_MINUTES") {
            config.quote_ttl_minutes = v;
        }
        if let Some(v) = env_parse("COUNCIL_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = v;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
