use async_trait::async_trait;
use sales_empathy::SystemPrompt;

use crate::error::Result;
use crate::types::{LlmOutput, LlmParams};

/// Common interface for anything that can turn a composed prompt into
/// agent text (§4.8): one real implementation backed by HTTP, one canned
/// implementation used as the breaker-open/deadline-exceeded substitute.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &SystemPrompt, params: &LlmParams) -> Result<LlmOutput>;
}
