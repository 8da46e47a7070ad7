pub mod breaker;
pub mod registry;
pub mod traits;
pub mod types;

pub use breaker::CircuitBreaker;
pub use registry::BreakerRegistry;
pub use traits::{call_with_breaker, AlwaysOpenBreaker, Breaker, BreakerOutcome};
pub use types::{BreakerConfig, BreakerMetrics, BreakerState};
