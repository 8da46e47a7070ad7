use async_trait::async_trait;

use sales_core::types::Phase;

use crate::error::Result;
use crate::traits::Predictor;
use crate::types::{Features, PredictorOutput, PredictorResult};

fn phase_weight(phase: Phase) -> f64 {
    match phase {
        Phase::Discovery => 0.10,
        Phase::Analysis => 0.25,
        Phase::Focused => 0.45,
        Phase::Objection => 0.35,
        Phase::Closing => 0.75,
        Phase::Terminal => 0.0,
    }
}

/// The deterministic heuristic (phase weight × engagement) that doubles
/// as both the fallback and the base of the model path — per §4.4's
/// non-goal, conversion has no learned model beyond this combination.
fn base_probability(features: &Features) -> f64 {
    (phase_weight(features.phase) * features.engagement_score).clamp(0.0, 1.0)
}

pub struct ConversionPredictor;

impl ConversionPredictor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConversionPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Predictor for ConversionPredictor {
    fn model_id(&self) -> &str {
        "conversion-v1"
    }

    async fn predict(&self, features: &Features) -> Result<PredictorResult> {
        let turn_bonus = 0.01 * features.history_turns.min(10) as f64;
        let probability = (base_probability(features) + turn_bonus).clamp(0.0, 1.0);
        let confidence = 0.5 + 0.4 * features.engagement_score;
        Ok(PredictorResult::model(
            PredictorOutput::Conversion(probability),
            confidence.min(0.9),
            self.model_id(),
        ))
    }

    fn fallback(&self, features: &Features) -> PredictorResult {
        PredictorResult::fallback(PredictorOutput::Conversion(base_probability(features)), 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(phase: Phase, engagement: f64, turns: u32) -> Features {
        Features {
            recent_messages: vec![],
            full_transcript: vec![],
            phase,
            engagement_score: engagement,
            history_turns: turns,
        }
    }

    #[tokio::test]
    async fn closing_phase_outranks_discovery() {
        let predictor = ConversionPredictor::new();
        let closing = predictor
            .predict(&features(Phase::Closing, 0.8, 5))
            .await
            .unwrap();
        let discovery = predictor
            .predict(&features(Phase::Discovery, 0.8, 5))
            .await
            .unwrap();
        let (PredictorOutput::Conversion(a), PredictorOutput::Conversion(b)) =
            (closing.output, discovery.output)
        else {
            panic!("wrong output variant")
        };
        assert!(a > b);
    }

    #[test]
    fn fallback_matches_raw_heuristic() {
        let predictor = ConversionPredictor::new();
        let result = predictor.fallback(&features(Phase::Focused, 0.5, 3));
        match result.output {
            PredictorOutput::Conversion(p) => assert!((p - 0.225).abs() < 1e-9),
            _ => panic!("wrong output variant"),
        }
    }
}
