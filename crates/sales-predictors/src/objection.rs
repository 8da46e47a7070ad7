use async_trait::async_trait;

use crate::error::Result;
use crate::traits::Predictor;
use crate::types::{Features, PredictorOutput, PredictorResult};

/// Keyword vocabulary, English and Spanish variants mixed per tag rather
/// than split into separate language tables, so `score_tag` stays a single
/// substring pass regardless of which language the customer is writing in.
const TAGS: &[(&str, &[&str])] = &[
    (
        "price_too_high",
        &[
            "expensive", "too much", "can't afford", "cost a lot", "pricey", "budget is",
            "muy caro", "demasiado caro", "no puedo pagar", "cuesta mucho", "fuera de mi presupuesto",
        ],
    ),
    (
        "trust_concern",
        &[
            "scam", "is this legit", "don't trust", "skeptical", "sounds too good",
            "es un engaño", "no confío", "suena demasiado bueno", "parece una estafa",
        ],
    ),
    (
        "time_constraint",
        &[
            "don't have time", "too busy", "no time for", "maybe later",
            "no tengo tiempo", "demasiado ocupado", "tal vez después", "quizás más tarde",
        ],
    ),
    (
        "spouse_approval",
        &[
            "ask my wife", "ask my husband", "talk to my partner", "check with my spouse",
            "preguntarle a mi esposa", "preguntarle a mi esposo", "hablar con mi pareja", "consultarlo con mi pareja",
        ],
    ),
];

/// Weighted keyword score over `messages`, weighting later (more recent)
/// entries higher. Used by both the model path and the fallback so the
/// two only differ in how many messages they look at and how confidence
/// is derived, not in what counts as a signal.
fn score_tag(messages: &[String], keywords: &[&str]) -> f64 {
    let n = messages.len();
    if n == 0 {
        return 0.0;
    }
    let mut score = 0.0;
    for (i, msg) in messages.iter().enumerate() {
        let lower = msg.to_lowercase();
        let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
        if hits > 0 {
            let recency_weight = (i + 1) as f64 / n as f64;
            score += recency_weight * hits as f64;
        }
    }
    score
}

pub struct ObjectionPredictor;

impl ObjectionPredictor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ObjectionPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Predictor for ObjectionPredictor {
    fn model_id(&self) -> &str {
        "objection-v1"
    }

    async fn predict(&self, features: &Features) -> Result<PredictorResult> {
        let mut found = Vec::new();
        let mut best_confidence: f64 = 0.0;
        for (tag, keywords) in TAGS {
            let score = score_tag(&features.recent_messages, keywords);
            if score > 0.0 {
                found.push(tag.to_string());
                best_confidence = best_confidence.max((0.5 + 0.1 * score).min(0.95));
            }
        }
        let confidence = if found.is_empty() { 0.2 } else { best_confidence };
        Ok(PredictorResult::model(
            PredictorOutput::Objections(found),
            confidence,
            self.model_id(),
        ))
    }

    fn fallback(&self, features: &Features) -> PredictorResult {
        let mut found = Vec::new();
        for (tag, keywords) in TAGS {
            if score_tag(&features.recent_messages, keywords) > 0.0 {
                found.push(tag.to_string());
            }
        }
        let confidence = if found.is_empty() { 0.2 } else { 0.6 };
        PredictorResult::fallback(PredictorOutput::Objections(found), confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(messages: &[&str]) -> Features {
        Features {
            recent_messages: messages.iter().map(|s| s.to_string()).collect(),
            full_transcript: vec![],
            phase: sales_core::types::Phase::Objection,
            engagement_score: 0.5,
            history_turns: messages.len() as u32,
        }
    }

    #[tokio::test]
    async fn detects_price_objection_with_confidence_at_least_half() {
        let predictor = ObjectionPredictor::new();
        let result = predictor
            .predict(&features(&["honestly this feels too expensive for me"]))
            .await
            .unwrap();
        match result.output {
            PredictorOutput::Objections(tags) => {
                assert!(tags.contains(&"price_too_high".to_string()))
            }
            _ => panic!("wrong output variant"),
        }
        assert!(result.confidence >= 0.5);
    }

    #[tokio::test]
    async fn detects_price_objection_in_spanish() {
        let predictor = ObjectionPredictor::new();
        let result = predictor
            .predict(&features(&["Es muy caro para mí"]))
            .await
            .unwrap();
        match result.output {
            PredictorOutput::Objections(tags) => {
                assert!(tags.contains(&"price_too_high".to_string()))
            }
            _ => panic!("wrong output variant"),
        }
        assert!(result.confidence >= 0.5);
    }

    #[tokio::test]
    async fn no_signal_yields_empty_tags() {
        let predictor = ObjectionPredictor::new();
        let result = predictor
            .predict(&features(&["sounds great, tell me more"]))
            .await
            .unwrap();
        match result.output {
            PredictorOutput::Objections(tags) => assert!(tags.is_empty()),
            _ => panic!("wrong output variant"),
        }
    }

    #[test]
    fn fallback_is_marked_degraded() {
        let predictor = ObjectionPredictor::new();
        let result = predictor.fallback(&features(&["too expensive"]));
        assert!(result.degraded);
        assert_eq!(result.model_version, "fallback");
    }
}
