use sales_core::types::Phase;

/// Generation parameters, phase-dependent (§4.8: "greeting uses higher
/// temperature and more tokens than price_objection; exact numeric
/// defaults are configuration, not contract").
#[derive(Debug, Clone, Copy)]
pub struct LlmParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl LlmParams {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Discovery => Self { temperature: 0.9, max_tokens: 400 },
            Phase::Analysis => Self { temperature: 0.7, max_tokens: 350 },
            Phase::Focused => Self { temperature: 0.6, max_tokens: 350 },
            Phase::Objection => Self { temperature: 0.4, max_tokens: 300 },
            Phase::Closing => Self { temperature: 0.5, max_tokens: 300 },
            Phase::Terminal => Self { temperature: 0.3, max_tokens: 150 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackBucket {
    Price,
    Product,
    General,
}

#[derive(Debug, Clone)]
pub struct LlmOutput {
    pub text: String,
    pub tokens_used: u32,
    pub latency_ms: u64,
    /// Set when this came from `CannedFallbackProvider` rather than a
    /// live model call (§4.9's `llm_degraded` event).
    pub degraded: bool,
}
