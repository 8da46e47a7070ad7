use std::time::Duration;

/// Circuit state (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Per-dependency tunables (§4.3's configuration table).
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    pub threshold: u32,
    pub window: Duration,
    pub recovery: Duration,
    pub max_retries: u32,
}

impl BreakerConfig {
    /// Hardcoded defaults from §4.3, looked up by dependency name. Unknown
    /// names get the `persistence`-style conservative default rather than
    /// panicking, since new dependencies may be wired up without a config
    /// override yet.
    pub fn defaults_for(dependency: &str) -> Self {
        match dependency {
            "llm" => Self {
                threshold: 5,
                window: Duration::from_secs(60),
                recovery: Duration::from_secs(60),
                max_retries: 3,
            },
            "voice" => Self {
                threshold: 3,
                window: Duration::from_secs(30),
                recovery: Duration::from_secs(30),
                max_retries: 2,
            },
            "persistence" => Self {
                threshold: 10,
                window: Duration::from_secs(60),
                recovery: Duration::from_secs(30),
                max_retries: 3,
            },
            "cache" => Self {
                threshold: 20,
                window: Duration::from_secs(60),
                recovery: Duration::from_secs(10),
                max_retries: 1,
            },
            _ => Self {
                threshold: 10,
                window: Duration::from_secs(60),
                recovery: Duration::from_secs(30),
                max_retries: 3,
            },
        }
    }

    /// Apply a partial override loaded from `CoreConfig` on top of the
    /// dependency's hardcoded defaults.
    pub fn with_override(mut self, o: &sales_core::config::BreakerOverride) -> Self {
        if let Some(t) = o.threshold {
            self.threshold = t;
        }
        if let Some(w) = o.window_s {
            self.window = Duration::from_secs(w);
        }
        if let Some(r) = o.recovery_s {
            self.recovery = Duration::from_secs(r);
        }
        if let Some(m) = o.max_retries {
            self.max_retries = m;
        }
        self
    }
}

/// Lightweight call counters exposed for observability (§3 `CircuitState.metrics`).
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakerMetrics {
    pub total_calls: u64,
    pub total_successes: u64,
    pub total_failures: u64,
    pub total_fallbacks: u64,
}
