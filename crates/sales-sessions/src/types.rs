use std::collections::HashMap;

use sales_core::types::{Archetype, ExperimentId, Phase, Role, SessionId, Tier, VariantId};
use serde::{Deserialize, Serialize};

/// One message in the append-only transcript (§3, I1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Monotonic sequence number within the session — the append order
    /// itself, independent of wall-clock timestamps.
    pub seq: u64,
    /// RFC3339 wall-clock timestamp.
    pub ts: String,
    pub tokens_estimated: u32,
}

/// The customer's stated profile at session start (§3).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerProfile {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub profession: Option<String>,
    pub budget_band: Option<String>,
    pub initial_goal: Option<String>,
    pub locale: Option<String>,
}

/// One entry in the append-only emotional journey (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalSnapshot {
    pub primary_emotion: String,
    pub intensity: f64,
    pub confidence: f64,
    pub ts: String,
}

/// The tier decision carried on the session, nullable until the first
/// decision is made (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierState {
    pub detected: Tier,
    pub confidence: f64,
    pub last_updated: String,
}

/// One entry in the bounded prediction log (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    pub model_id: String,
    pub inputs_hash: String,
    pub output: serde_json::Value,
    pub confidence: f64,
    pub ts: String,
}

/// Maximum number of entries retained in `predictions_log` before the
/// oldest are dropped (the "bounded window" from §3).
pub const PREDICTIONS_LOG_CAPACITY: usize = 200;

/// The aggregate root of a conversation (§3). Owned by exactly one
/// in-flight orchestrator invocation at a time, enforced by `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: SessionId,
    pub customer_profile: CustomerProfile,
    pub transcript: Vec<Message>,
    pub phase: Phase,
    pub emotional_journey: Vec<EmotionalSnapshot>,
    pub tier: Option<TierState>,
    pub archetype: Archetype,
    pub experiments_assigned: HashMap<ExperimentId, VariantId>,
    pub predictions_log: Vec<PredictionLogEntry>,
    pub version: u64,
    pub created_at: String,
    pub last_activity_at: String,
    pub terminated_at: Option<String>,
}

impl ConversationState {
    /// Construct a fresh session in the DISCOVERY phase.
    pub fn new(session_id: SessionId, customer_profile: CustomerProfile, now: &str) -> Self {
        Self {
            session_id,
            customer_profile,
            transcript: Vec::new(),
            phase: Phase::Discovery,
            emotional_journey: Vec::new(),
            tier: None,
            archetype: Archetype::Unknown,
            experiments_assigned: HashMap::new(),
            predictions_log: Vec::new(),
            version: 0,
            created_at: now.to_string(),
            last_activity_at: now.to_string(),
            terminated_at: None,
        }
    }

    /// Append a message, preserving I1 (append-only, never mutate history).
    pub fn append_message(&mut self, role: Role, text: impl Into<String>, ts: &str, tokens_estimated: u32) {
        let seq = self.transcript.len() as u64;
        self.transcript.push(Message {
            role,
            text: text.into(),
            seq,
            ts: ts.to_string(),
            tokens_estimated,
        });
    }

    /// Push a prediction onto the bounded log, evicting the oldest entry
    /// once `PREDICTIONS_LOG_CAPACITY` is exceeded.
    pub fn push_prediction(&mut self, entry: PredictionLogEntry) {
        self.predictions_log.push(entry);
        if self.predictions_log.len() > PREDICTIONS_LOG_CAPACITY {
            self.predictions_log.remove(0);
        }
    }

    /// Assign a variant for an experiment, honoring I2/B1: once set it is
    /// never overwritten, and re-assigning returns the existing value.
    pub fn assign_variant_if_absent(&mut self, experiment: ExperimentId, variant: VariantId) -> VariantId {
        self.experiments_assigned
            .entry(experiment)
            .or_insert(variant)
            .clone()
    }

    /// Attempt a phase transition, enforcing I3. Returns `false` (no-op) if
    /// the transition would move backward.
    pub fn try_transition_phase(&mut self, next: Phase) -> bool {
        if self.phase.can_transition_to(next) {
            self.phase = next;
            true
        } else {
            false
        }
    }

    /// Update the tier, enforcing I4: for the same detected tier, the new
    /// confidence must exceed the stored one by at least 0.05 to take
    /// effect; a tier switch always resets confidence to the new value.
    pub fn update_tier(&mut self, detected: Tier, confidence: f64, now: &str) {
        const MIN_CONFIDENCE_DELTA: f64 = 0.05;
        let should_update = match &self.tier {
            None => true,
            Some(current) if current.detected as u8 == detected as u8 => {
                confidence >= current.confidence + MIN_CONFIDENCE_DELTA
            }
            Some(_) => true, // tier switch always resets confidence (I4)
        };
        if should_update {
            self.tier = Some(TierState {
                detected,
                confidence,
                last_updated: now.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_assignment_is_idempotent() {
        let mut s = ConversationState::new(SessionId::new(), CustomerProfile::default(), "now");
        let e: ExperimentId = "greeting".into();
        let v1 = s.assign_variant_if_absent(e.clone(), "A".into());
        let v2 = s.assign_variant_if_absent(e, "B".into());
        assert_eq!(v1, v2);
        assert_eq!(v1, VariantId::from("A"));
    }

    #[test]
    fn tier_confidence_monotonic_same_tier() {
        let mut s = ConversationState::new(SessionId::new(), CustomerProfile::default(), "now");
        s.update_tier(Tier::Pro, 0.6, "t1");
        s.update_tier(Tier::Pro, 0.5, "t2"); // lower confidence, same tier: ignored
        assert_eq!(s.tier.as_ref().unwrap().confidence, 0.6);
        s.update_tier(Tier::Pro, 0.7, "t3");
        assert_eq!(s.tier.as_ref().unwrap().confidence, 0.7);
    }

    #[test]
    fn tier_update_below_delta_threshold_is_suppressed() {
        let mut s = ConversationState::new(SessionId::new(), CustomerProfile::default(), "now");
        s.update_tier(Tier::Pro, 0.6, "t1");
        s.update_tier(Tier::Pro, 0.64, "t2"); // +0.04, below the 0.05 threshold: ignored
        let t = s.tier.as_ref().unwrap();
        assert_eq!(t.confidence, 0.6);
        assert_eq!(t.last_updated, "t1");
    }

    #[test]
    fn tier_switch_resets_confidence() {
        let mut s = ConversationState::new(SessionId::new(), CustomerProfile::default(), "now");
        s.update_tier(Tier::Pro, 0.9, "t1");
        s.update_tier(Tier::Elite, 0.2, "t2");
        let t = s.tier.as_ref().unwrap();
        assert!(matches!(t.detected, Tier::Elite));
        assert_eq!(t.confidence, 0.2);
    }

    #[test]
    fn predictions_log_is_bounded() {
        let mut s = ConversationState::new(SessionId::new(), CustomerProfile::default(), "now");
        for i in 0..(PREDICTIONS_LOG_CAPACITY + 10) {
            s.push_prediction(PredictionLogEntry {
                model_id: "conversion".to_string(),
                inputs_hash: format!("h{i}"),
                output: serde_json::json!(null),
                confidence: 0.5,
                ts: "t".to_string(),
            });
        }
        assert_eq!(s.predictions_log.len(), PREDICTIONS_LOG_CAPACITY);
        assert_eq!(s.predictions_log.first().unwrap().inputs_hash, "h10");
    }
}
