use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Features, PredictorResult};

/// Common interface for the four predictor models (§4.4). Each instance
/// owns its own rule-based fallback, mirroring how a provider owns its
/// own default `send_stream` implementation — callers never construct a
/// fallback externally, they just ask the predictor for one.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Stable identifier used for dispatch and telemetry, e.g. `"objection-v1"`.
    fn model_id(&self) -> &str;

    /// Run the model path. Callers apply their own timeout; a predictor
    /// must not block indefinitely.
    async fn predict(&self, features: &Features) -> Result<PredictorResult>;

    /// Deterministic, dependency-free substitute used when the model path
    /// times out, the model's breaker is open, or `predict` returns an
    /// error. Always succeeds.
    fn fallback(&self, features: &Features) -> PredictorResult;
}
