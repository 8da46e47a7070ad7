use sales_core::types::Phase;

/// Input to every predictor. Each predictor reads only the subset of
/// fields relevant to its own model — none of them read another
/// predictor's output (§4.4's independence rule).
#[derive(Debug, Clone)]
pub struct Features {
    /// Customer turns only, oldest first, capped to a recent window.
    pub recent_messages: Vec<String>,
    /// Full customer-turn transcript, oldest first — needed for
    /// cross-conversation need signals that a short window would miss.
    pub full_transcript: Vec<String>,
    pub phase: Phase,
    /// 0.0..=1.0, computed upstream from response latency/length trend.
    pub engagement_score: f64,
    pub history_turns: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NbaAction {
    Continue,
    Ask,
    Offer,
    Close,
    Transfer,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum PredictorOutput {
    Objections(Vec<String>),
    Needs(Vec<String>),
    Conversion(f64),
    NextBestAction(NbaAction),
}

#[derive(Debug, Clone)]
pub struct PredictorResult {
    pub output: PredictorOutput,
    pub confidence: f64,
    pub model_version: String,
    /// Set when this result came from a predictor's rule-based fallback
    /// rather than its model path (breaker-open, timeout, or model error).
    pub degraded: bool,
}

impl PredictorResult {
    pub fn model(output: PredictorOutput, confidence: f64, model_version: &str) -> Self {
        Self {
            output,
            confidence,
            model_version: model_version.to_string(),
            degraded: false,
        }
    }

    pub fn fallback(output: PredictorOutput, confidence: f64) -> Self {
        Self {
            output,
            confidence,
            model_version: "fallback".to_string(),
            degraded: true,
        }
    }
}
