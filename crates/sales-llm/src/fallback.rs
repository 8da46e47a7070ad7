use async_trait::async_trait;
use sales_empathy::SystemPrompt;

use crate::error::Result;
use crate::trait_def::LlmGateway;
use crate::types::{FallbackBucket, LlmOutput, LlmParams};

const PRICE_FALLBACK: &str =
    "I want to make sure I get the pricing details exactly right for you — let me follow up on that shortly.";
const PRODUCT_FALLBACK: &str =
    "Let me pull together the specifics on that so I can give you a precise answer.";
const GENERAL_FALLBACK: &str =
    "Thanks for your patience — let's keep going, what matters most to you right now?";

/// Classifies which canned bucket fits the prompt being substituted for,
/// based on what the composer already baked into the prompt text.
fn classify_bucket(prompt: &SystemPrompt) -> FallbackBucket {
    let haystack = format!("{} {}", prompt.static_tier, prompt.customer_tier).to_lowercase();
    if haystack.contains("price") || haystack.contains("objection") {
        FallbackBucket::Price
    } else if haystack.contains("tier") || haystack.contains("recommended") {
        FallbackBucket::Product
    } else {
        FallbackBucket::General
    }
}

/// Breaker-open / deadline-exceeded substitute (§4.8): always succeeds,
/// answers from a small fixed set of canned replies bucketed by what the
/// prompt was about.
pub struct CannedFallbackProvider;

impl CannedFallbackProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn text_for(bucket: FallbackBucket) -> &'static str {
        match bucket {
            FallbackBucket::Price => PRICE_FALLBACK,
            FallbackBucket::Product => PRODUCT_FALLBACK,
            FallbackBucket::General => GENERAL_FALLBACK,
        }
    }
}

impl Default for CannedFallbackProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmGateway for CannedFallbackProvider {
    fn name(&self) -> &str {
        "canned-fallback"
    }

    async fn generate(&self, prompt: &SystemPrompt, _params: &LlmParams) -> Result<LlmOutput> {
        let bucket = classify_bucket(prompt);
        Ok(LlmOutput {
            text: Self::text_for(bucket).to_string(),
            tokens_used: 0,
            latency_ms: 0,
            degraded: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::types::Phase;

    #[tokio::test]
    async fn price_related_prompt_gets_price_fallback() {
        let provider = CannedFallbackProvider::new();
        let prompt = SystemPrompt {
            static_tier: "price_objection guidance".to_string(),
            customer_tier: String::new(),
            volatile_tier: String::new(),
        };
        let out = provider.generate(&prompt, &LlmParams::for_phase(Phase::Objection)).await.unwrap();
        assert!(out.degraded);
        assert_eq!(out.text, PRICE_FALLBACK);
    }
}
