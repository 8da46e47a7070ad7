use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::types::{BreakerConfig, BreakerMetrics, BreakerState};

/// All mutable breaker state behind a single lock (§5: "safe for concurrent
/// readers and writers", "no torn state"). Field-level locks would let one
/// caller observe `state == Open` while another has already flipped
/// `half_open_probe_in_flight`, recreating the thundering-herd bug this
/// breaker exists to prevent.
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    window_start: Instant,
    opened_at: Option<Instant>,
    half_open_probe_in_flight: bool,
    metrics: BreakerMetrics,
}

/// One dependency's circuit breaker (§4.3).
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                window_start: Instant::now(),
                opened_at: None,
                half_open_probe_in_flight: false,
                metrics: BreakerMetrics::default(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn metrics(&self) -> BreakerMetrics {
        self.inner.lock().unwrap().metrics
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().unwrap().state
    }

    /// Decide whether a call is currently permitted, performing the
    /// OPEN -> HALF_OPEN transition if the recovery timeout has elapsed.
    /// When this returns `true` from `HalfOpen`, the caller IS the single
    /// permitted probe — `half_open_probe_in_flight` is already set before
    /// returning so no other concurrent caller can also become the probe.
    #[instrument(skip(self), fields(dependency = %self.name))]
    pub fn allow_call(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.metrics.total_calls += 1;
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.config.recovery {
                    debug!("recovery timeout elapsed, transitioning to half-open");
                    inner.state = BreakerState::HalfOpen;
                    inner.half_open_probe_in_flight = true;
                    true
                } else {
                    inner.metrics.total_fallbacks += 1;
                    false
                }
            }
            BreakerState::HalfOpen => {
                if inner.half_open_probe_in_flight {
                    inner.metrics.total_fallbacks += 1;
                    false
                } else {
                    inner.half_open_probe_in_flight = true;
                    true
                }
            }
        }
    }

    /// Record a successful call. CLOSED stays CLOSED (resets the failure
    /// streak); HALF_OPEN's probe succeeding closes the circuit.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.metrics.total_successes += 1;
        inner.consecutive_failures = 0;
        if inner.state == BreakerState::HalfOpen {
            debug!(dependency = %self.name, "probe succeeded, closing circuit");
            inner.state = BreakerState::Closed;
            inner.opened_at = None;
        }
        inner.half_open_probe_in_flight = false;
    }

    /// Record a failed call. CLOSED -> OPEN once `consecutive_failures`
    /// reaches `threshold` within `failure_window`; HALF_OPEN -> OPEN
    /// immediately, restarting the recovery timer (§4.3).
    #[instrument(skip(self), fields(dependency = %self.name))]
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.metrics.total_failures += 1;
        inner.half_open_probe_in_flight = false;

        match inner.state {
            BreakerState::HalfOpen => {
                warn!("probe failed, re-opening circuit");
                inner.state = BreakerState::Open;
                inner.opened_at = Some(Instant::now());
                inner.consecutive_failures = self.config.threshold;
            }
            BreakerState::Closed | BreakerState::Open => {
                // Stale failures outside the window don't accumulate.
                if inner.window_start.elapsed() >= self.config.window {
                    inner.window_start = Instant::now();
                    inner.consecutive_failures = 0;
                }
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.threshold
                    && inner.state == BreakerState::Closed
                {
                    warn!(
                        threshold = self.config.threshold,
                        "consecutive failure threshold reached, opening circuit"
                    );
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_breaker() -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            BreakerConfig {
                threshold: 3,
                window: Duration::from_secs(60),
                recovery: Duration::from_millis(20),
                max_retries: 3,
            },
        )
    }

    #[test]
    fn closed_allows_calls_until_threshold() {
        let b = fast_breaker();
        assert!(b.allow_call());
        b.record_failure();
        assert!(b.allow_call());
        b.record_failure();
        assert_eq!(b.state(), BreakerState::Closed);
        b.record_failure();
        assert_eq!(b.state(), BreakerState::Open);
    }

    #[test]
    fn open_blocks_until_recovery_then_single_probe() {
        let b = fast_breaker();
        for _ in 0..3 {
            b.record_failure();
        }
        assert_eq!(b.state(), BreakerState::Open);
        assert!(!b.allow_call(), "still within recovery window");

        std::thread::sleep(Duration::from_millis(30));
        assert!(b.allow_call(), "recovery elapsed, probe allowed");
        assert_eq!(b.state(), BreakerState::HalfOpen);
        // A second concurrent caller must not also become a probe.
        assert!(!b.allow_call());
    }

    #[test]
    fn half_open_success_closes_circuit() {
        let b = fast_breaker();
        for _ in 0..3 {
            b.record_failure();
        }
        std::thread::sleep(Duration::from_millis(30));
        assert!(b.allow_call());
        b.record_success();
        assert_eq!(b.state(), BreakerState::Closed);
        assert!(b.allow_call());
    }

    #[test]
    fn half_open_failure_reopens_and_restarts_recovery() {
        let b = fast_breaker();
        for _ in 0..3 {
            b.record_failure();
        }
        std::thread::sleep(Duration::from_millis(30));
        assert!(b.allow_call());
        b.record_failure();
        assert_eq!(b.state(), BreakerState::Open);
        assert!(!b.allow_call(), "recovery timer restarted");
    }
}
