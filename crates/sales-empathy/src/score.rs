use crate::postprocess::ends_with_forward_question;

const VALIDATION_PHRASES: &[&str] =
    &["i hear you", "that makes sense", "i understand", "fair enough", "totally get"];
const HOPE_WORDS: &[&str] = &["looking forward", "excited", "great fit", "confident"];

/// Fixed rubric over the final agent text (§4.7 step 4): count of
/// validation phrases, personal-pronoun ratio, presence of a hope/
/// next-step signal. Score and `template_id` are emitted to telemetry by
/// the caller, not by this function.
pub fn score_empathy(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let validation_count = VALIDATION_PHRASES.iter().filter(|p| lower.contains(**p)).count();

    let words: Vec<&str> = text.split_whitespace().collect();
    let pronoun_count = words
        .iter()
        .filter(|w| {
            let cleaned = w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            matches!(cleaned.as_str(), "you" | "your" | "yours")
        })
        .count();
    let pronoun_ratio = if words.is_empty() { 0.0 } else { pronoun_count as f64 / words.len() as f64 };

    let has_hope = HOPE_WORDS.iter().any(|w| lower.contains(w));
    let has_next_step = ends_with_forward_question(text) || lower.contains("next step");

    let mut score = (validation_count as f64 * 2.0).min(4.0);
    score += (pronoun_ratio * 20.0).min(3.0);
    if has_hope {
        score += 1.5;
    }
    if has_next_step {
        score += 1.5;
    }
    score.clamp(0.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(score_empathy(""), 0.0);
    }

    #[test]
    fn validating_forward_looking_text_scores_high() {
        let text = "I hear you, and that makes sense given your budget. \
                     I'm confident this fits you — what feels like the right next step for you?";
        assert!(score_empathy(text) > 7.0);
    }

    #[test]
    fn flat_statement_scores_low() {
        assert!(score_empathy("The product has three tiers.") < 2.0);
    }
}
