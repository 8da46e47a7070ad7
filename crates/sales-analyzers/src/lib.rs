pub mod emotion;
pub mod tier;

pub use emotion::{EmotionAnalyzer, EmotionalSignal};
pub use tier::{TierAnalyzer, TierDecision, TierFeatures};
