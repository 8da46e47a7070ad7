use crate::types::{BreakerMetrics, BreakerState};

/// Object-safe breaker interface (§9: "expose via an interface so tests can
/// inject a fault-injecting breaker"). Kept free of generics so it can be
/// used as `dyn Breaker` — the orchestrator drives the call/record
/// sequence itself via `call_with_breaker` rather than the breaker owning
/// the call.
pub trait Breaker: Send + Sync {
    fn name(&self) -> &str;
    fn state(&self) -> BreakerState;
    fn metrics(&self) -> BreakerMetrics;
    fn allow_call(&self) -> bool;
    fn record_success(&self);
    fn record_failure(&self);
}

impl Breaker for crate::breaker::CircuitBreaker {
    fn name(&self) -> &str {
        self.name()
    }
    fn state(&self) -> BreakerState {
        self.state()
    }
    fn metrics(&self) -> BreakerMetrics {
        self.metrics()
    }
    fn allow_call(&self) -> bool {
        self.allow_call()
    }
    fn record_success(&self) {
        self.record_success()
    }
    fn record_failure(&self) {
        self.record_failure()
    }
}

/// A breaker double that is always `Open` — for injecting "dependency X is
/// down" into a test without driving real failures through the threshold.
pub struct AlwaysOpenBreaker {
    name: String,
}

impl AlwaysOpenBreaker {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Breaker for AlwaysOpenBreaker {
    fn name(&self) -> &str {
        &self.name
    }
    fn state(&self) -> BreakerState {
        BreakerState::Open
    }
    fn metrics(&self) -> BreakerMetrics {
        BreakerMetrics::default()
    }
    fn allow_call(&self) -> bool {
        false
    }
    fn record_success(&self) {}
    fn record_failure(&self) {}
}

/// Outcome of `call_with_breaker` (§4.3: "breaker OPEN with a fallback is a
/// degraded success; without a fallback it surfaces as
/// `UPSTREAM_UNAVAILABLE`").
pub enum BreakerOutcome<T, F> {
    Success(T),
    Fallback(F),
}

/// Run `op` if the breaker permits it, recording the outcome; otherwise
/// (or on failure/timeout) return the fallback produced by `on_fallback`.
///
/// This is a free function rather than a method on `Breaker` so the trait
/// stays object-safe — `op` and `on_fallback` are generic per call site.
pub async fn call_with_breaker<T, F, Op, Fut, Fb>(
    breaker: &dyn Breaker,
    op: Op,
    on_fallback: Fb,
) -> BreakerOutcome<T, F>
where
    Op: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, ()>>,
    Fb: FnOnce() -> F,
{
    if !breaker.allow_call() {
        return BreakerOutcome::Fallback(on_fallback());
    }
    match op().await {
        Ok(value) => {
            breaker.record_success();
            BreakerOutcome::Success(value)
        }
        Err(()) => {
            breaker.record_failure();
            BreakerOutcome::Fallback(on_fallback())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_open_breaker_always_falls_back() {
        let breaker = AlwaysOpenBreaker::new("llm");
        let outcome = call_with_breaker(
            &breaker,
            || async { Ok::<_, ()>(42) },
            || "fallback",
        )
        .await;
        assert!(matches!(outcome, BreakerOutcome::Fallback("fallback")));
    }
}
