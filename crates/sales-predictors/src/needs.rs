use async_trait::async_trait;

use crate::error::Result;
use crate::traits::Predictor;
use crate::types::{Features, PredictorOutput, PredictorResult};

const TAGS: &[(&str, &[&str])] = &[
    ("productivity", &["save time", "more efficient", "get more done", "productivity"]),
    ("health", &["health", "wellness", "feel better", "energy"]),
    ("convenience", &["easier", "convenient", "simpler", "hassle"]),
    ("status", &["impress", "upgrade", "premium feel", "status"]),
    ("security", &["safe", "reliable", "guarantee", "secure"]),
    ("savings", &["save money", "discount", "cheaper", "deal"]),
    ("connection", &["my family", "my team", "for us", "together"]),
];

fn tag_hits(transcript: &[String], keywords: &[&str]) -> usize {
    transcript
        .iter()
        .map(|msg| msg.to_lowercase())
        .filter(|lower| keywords.iter().any(|k| lower.contains(k)))
        .count()
}

/// Surfaces which customer needs (§4.5 GLOSSARY) the transcript evidences,
/// ranked by how often their keywords recur across the conversation so
/// far — a single mention is a signal, repetition is a need.
pub struct NeedsPredictor;

impl NeedsPredictor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NeedsPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Predictor for NeedsPredictor {
    fn model_id(&self) -> &str {
        "needs-v1"
    }

    async fn predict(&self, features: &Features) -> Result<PredictorResult> {
        let mut ranked: Vec<(&str, usize)> = TAGS
            .iter()
            .map(|(tag, keywords)| (*tag, tag_hits(&features.full_transcript, keywords)))
            .filter(|(_, hits)| *hits > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        let total_hits: usize = ranked.iter().map(|(_, h)| h).sum();
        let confidence = if ranked.is_empty() {
            0.2
        } else {
            (0.4 + 0.1 * total_hits as f64).min(0.9)
        };
        let needs = ranked.into_iter().map(|(tag, _)| tag.to_string()).collect();
        Ok(PredictorResult::model(
            PredictorOutput::Needs(needs),
            confidence,
            self.model_id(),
        ))
    }

    fn fallback(&self, features: &Features) -> PredictorResult {
        let needs: Vec<String> = TAGS
            .iter()
            .filter(|(_, keywords)| tag_hits(&features.full_transcript, keywords) > 0)
            .map(|(tag, _)| tag.to_string())
            .collect();
        let confidence = if needs.is_empty() { 0.2 } else { 0.55 };
        PredictorResult::fallback(PredictorOutput::Needs(needs), confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(transcript: &[&str]) -> Features {
        Features {
            recent_messages: vec![],
            full_transcript: transcript.iter().map(|s| s.to_string()).collect(),
            phase: sales_core::types::Phase::Analysis,
            engagement_score: 0.5,
            history_turns: transcript.len() as u32,
        }
    }

    #[tokio::test]
    async fn ranks_repeated_need_first() {
        let predictor = NeedsPredictor::new();
        let result = predictor
            .predict(&features(&[
                "I really want to save time every morning",
                "efficiency matters a lot to me",
                "also I like a good deal",
            ]))
            .await
            .unwrap();
        match result.output {
            PredictorOutput::Needs(needs) => assert_eq!(needs.first().unwrap(), "productivity"),
            _ => panic!("wrong output variant"),
        }
    }

    #[tokio::test]
    async fn no_transcript_yields_no_needs() {
        let predictor = NeedsPredictor::new();
        let result = predictor.predict(&features(&[])).await.unwrap();
        match result.output {
            PredictorOutput::Needs(needs) => assert!(needs.is_empty()),
            _ => panic!("wrong output variant"),
        }
        assert_eq!(result.confidence, 0.2);
    }
}
