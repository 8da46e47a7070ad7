use std::collections::HashMap;

use sales_core::types::{ExperimentId, Outcome, Phase, VariantId};
use serde::{Deserialize, Serialize};

/// One predictor's contribution to a `MessageExchange` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub model_id: String,
    pub confidence: f64,
    pub degraded: bool,
}

/// Emitted once per orchestrator turn (§4.9 step 10 / §4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageExchangeEvent {
    pub session_id: String,
    /// Monotonic per-session sequence number, used for at-least-once dedup.
    pub event_seq: u64,
    pub variants_used: HashMap<ExperimentId, VariantId>,
    pub predictions: Vec<PredictionRecord>,
    pub empathy_score: f64,
    pub phase: Phase,
    pub latency_ms_per_stage: HashMap<String, u64>,
    pub ts: String,
}

/// Emitted once when a conversation ends (§4.10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationOutcomeEvent {
    pub session_id: String,
    pub event_seq: u64,
    pub outcome: Outcome,
    pub metrics: HashMap<String, f64>,
    pub ts: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrackingEvent {
    MessageExchange(MessageExchangeEvent),
    Outcome(ConversationOutcomeEvent),
}

impl TrackingEvent {
    pub fn dedupe_key(&self) -> (String, u64) {
        match self {
            TrackingEvent::MessageExchange(e) => (e.session_id.clone(), e.event_seq),
            TrackingEvent::Outcome(e) => (e.session_id.clone(), e.event_seq),
        }
    }
}
