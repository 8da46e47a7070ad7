use async_trait::async_trait;

use sales_core::types::Phase;

use crate::error::Result;
use crate::traits::Predictor;
use crate::types::{Features, NbaAction, PredictorOutput, PredictorResult};

/// Picks the next conversational move from phase and engagement alone.
///
/// §4.4 lists this predictor's conceptual inputs as "all of the above"
/// (objection/needs/conversion), but §4.4 also states predictors must not
/// depend on another's output so all four can run concurrently behind one
/// fan-in barrier. We resolve that in favor of the concurrency invariant:
/// this predictor approximates the same decision from the features it is
/// given directly, not from the sibling predictors' results.
fn rule_based_action(features: &Features) -> (NbaAction, f64) {
    if features.engagement_score < 0.3 {
        return (NbaAction::Transfer, 0.7);
    }
    match features.phase {
        Phase::Closing if features.engagement_score >= 0.6 => (NbaAction::Close, 0.75),
        Phase::Closing => (NbaAction::Ask, 0.55),
        Phase::Objection => (NbaAction::Ask, 0.65),
        Phase::Focused | Phase::Analysis => (NbaAction::Offer, 0.6),
        Phase::Discovery => (NbaAction::Continue, 0.55),
        Phase::Terminal => (NbaAction::Continue, 0.5),
    }
}

pub struct NextBestActionPredictor;

impl NextBestActionPredictor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NextBestActionPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Predictor for NextBestActionPredictor {
    fn model_id(&self) -> &str {
        "nba-v1"
    }

    async fn predict(&self, features: &Features) -> Result<PredictorResult> {
        let (action, confidence) = rule_based_action(features);
        Ok(PredictorResult::model(
            PredictorOutput::NextBestAction(action),
            confidence,
            self.model_id(),
        ))
    }

    fn fallback(&self, _features: &Features) -> PredictorResult {
        PredictorResult::fallback(PredictorOutput::NextBestAction(NbaAction::Continue), 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(phase: Phase, engagement: f64) -> Features {
        Features {
            recent_messages: vec![],
            full_transcript: vec![],
            phase,
            engagement_score: engagement,
            history_turns: 1,
        }
    }

    #[tokio::test]
    async fn low_engagement_always_transfers() {
        let predictor = NextBestActionPredictor::new();
        let result = predictor
            .predict(&features(Phase::Closing, 0.1))
            .await
            .unwrap();
        assert!(matches!(
            result.output,
            PredictorOutput::NextBestAction(NbaAction::Transfer)
        ));
    }

    #[tokio::test]
    async fn engaged_closing_phase_closes() {
        let predictor = NextBestActionPredictor::new();
        let result = predictor
            .predict(&features(Phase::Closing, 0.8))
            .await
            .unwrap();
        assert!(matches!(
            result.output,
            PredictorOutput::NextBestAction(NbaAction::Close)
        ));
    }

    #[test]
    fn fallback_is_continue() {
        let predictor = NextBestActionPredictor::new();
        let result = predictor.fallback(&features(Phase::Discovery, 0.9));
        assert!(matches!(
            result.output,
            PredictorOutput::NextBestAction(NbaAction::Continue)
        ));
        assert_eq!(result.confidence, 0.5);
    }
}
