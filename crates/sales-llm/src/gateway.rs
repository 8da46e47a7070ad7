use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sales_breaker::Breaker;
use sales_empathy::SystemPrompt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::trait_def::LlmGateway;
use crate::types::{LlmOutput, LlmParams};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
    tokens_used: u32,
}

/// HTTP-backed gateway to the generation model, guarded by the `llm`
/// circuit breaker the same way `AnthropicProvider::send` is a thin HTTP
/// wrapper with no retry/backoff logic of its own — that's the
/// breaker/orchestrator's job, not the gateway's.
pub struct HttpLlmGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    breaker: Arc<dyn Breaker>,
}

impl HttpLlmGateway {
    pub fn new(base_url: String, api_key: String, breaker: Arc<dyn Breaker>) -> Self {
        Self { client: reqwest::Client::new(), base_url, api_key, breaker }
    }

    async fn call_upstream(&self, prompt: &str, params: &LlmParams) -> Result<LlmOutput> {
        let started = Instant::now();
        let body = GenerateRequest { prompt, temperature: params.temperature, max_tokens: params.max_tokens };

        debug!(max_tokens = params.max_tokens, "sending request to generation model");

        let resp = self
            .client
            .post(format!("{}/v1/generate", self.base_url))
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(status, "generation model returned an error");
            return Err(LlmError::Upstream { status, message });
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(LlmOutput {
            text: parsed.text,
            tokens_used: parsed.tokens_used,
            latency_ms: started.elapsed().as_millis() as u64,
            degraded: false,
        })
    }
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    fn name(&self) -> &str {
        "llm"
    }

    async fn generate(&self, prompt: &SystemPrompt, params: &LlmParams) -> Result<LlmOutput> {
        if !self.breaker.allow_call() {
            return Err(LlmError::BreakerOpen(self.breaker.name().to_string()));
        }
        match self.call_upstream(&prompt.to_plain_text(), params).await {
            Ok(output) => {
                self.breaker.record_success();
                Ok(output)
            }
            Err(err) => {
                self.breaker.record_failure();
                Err(err)
            }
        }
    }
}
