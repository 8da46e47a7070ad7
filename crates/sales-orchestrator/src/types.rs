use sales_core::types::{Phase, Tier, VariantId};

/// `ml_insights` bundle returned from `SendMessage` (§6).
#[derive(Debug, Clone)]
pub struct MlInsights {
    pub predicted_objections: Vec<String>,
    pub predicted_needs: Vec<String>,
    pub conversion_probability: f64,
    pub variant_ids: Vec<VariantId>,
    /// True if any predictor or the LLM fell back during this turn.
    pub degraded: bool,
}

/// Result of `SendMessage` (§6).
#[derive(Debug, Clone)]
pub struct SendMessageResponse {
    pub agent_text: String,
    pub phase: Phase,
    pub tier: Option<Tier>,
    pub ml_insights: MlInsights,
}
