use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, globally unique session identifier (UUIDv7 — time-sortable for
/// log correlation, same convention as the rest of this workspace).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifies one of the four predictor models or the LLM itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(pub String);

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifies an A/B experiment (process-wide, read-mostly per §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExperimentId(pub String);

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExperimentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifies one arm of an experiment. Lexicographic ordering is used to
/// break UCB1 ties deterministically (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantId(pub String);

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VariantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Conversation phase (§3). Ordered forward-only; TERMINAL is absorbing (I3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Discovery,
    Analysis,
    Focused,
    Objection,
    Closing,
    Terminal,
}

impl Phase {
    /// The ordinal used for forward-only comparison. TERMINAL is excluded
    /// from the ordinal chain and handled as a special absorbing case so
    /// that "terminal reached at most once" (P3) reads naturally as
    /// `phase == Terminal` rather than `rank(phase) == max`.
    fn rank(self) -> u8 {
        match self {
            Phase::Discovery => 0,
            Phase::Analysis => 1,
            Phase::Focused => 2,
            Phase::Objection => 3,
            Phase::Closing => 4,
            Phase::Terminal => 5,
        }
    }

    /// True if transitioning from `self` to `next` respects I3: phase only
    /// moves forward, or into TERMINAL from anywhere, and never leaves
    /// TERMINAL once entered.
    pub fn can_transition_to(self, next: Phase) -> bool {
        if self == Phase::Terminal {
            return next == Phase::Terminal;
        }
        next.rank() >= self.rank()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Discovery => "discovery",
            Phase::Analysis => "analysis",
            Phase::Focused => "focused",
            Phase::Objection => "objection",
            Phase::Closing => "closing",
            Phase::Terminal => "terminal",
        };
        f.write_str(s)
    }
}

/// Coarse customer profile category (§3 GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Prime,
    Longevity,
    Hybrid,
    Unknown,
}

impl Default for Archetype {
    fn default() -> Self {
        Archetype::Unknown
    }
}

/// Product tier recommendation (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Essential,
    Pro,
    Elite,
    Premium,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Essential => "essential",
            Tier::Pro => "pro",
            Tier::Elite => "elite",
            Tier::Premium => "premium",
        };
        f.write_str(s)
    }
}

/// The speaker of a transcript message (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
    System,
}

/// How a conversation ended (§4.10 `ConversationOutcome`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Converted,
    Lost,
    Transferred,
    Abandoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_forward_only() {
        assert!(Phase::Discovery.can_transition_to(Phase::Analysis));
        assert!(Phase::Discovery.can_transition_to(Phase::Discovery));
        assert!(!Phase::Objection.can_transition_to(Phase::Discovery));
        assert!(Phase::Closing.can_transition_to(Phase::Terminal));
    }

    #[test]
    fn terminal_is_absorbing() {
        assert!(Phase::Terminal.can_transition_to(Phase::Terminal));
        assert!(!Phase::Terminal.can_transition_to(Phase::Discovery));
    }

    #[test]
    fn variant_id_orders_lexicographically() {
        let mut v = vec![VariantId::from("b"), VariantId::from("a")];
        v.sort();
        assert_eq!(v, vec![VariantId::from("a"), VariantId::from("b")]);
    }
}
