use sales_analyzers::EmotionalSignal;
use sales_core::types::Phase;

/// Deterministic phase-transition function (§4.9 step 4). The forward-only
/// guarantee (I3) is enforced by `ConversationState::try_transition_phase`,
/// not here — this function only proposes a candidate, which is why it can
/// freely return a phase "behind" `current`: the caller's attempt is simply
/// a no-op in that case.
///
/// An open objection signal takes priority over everything else; short of
/// that, the phase advances with conversation depth and the predicted
/// conversion probability.
pub fn next_phase(
    current: Phase,
    emotion: &EmotionalSignal,
    predicted_objections: &[String],
    predicted_needs: &[String],
    conversion_probability: f64,
    turn_count: u32,
) -> Phase {
    if current == Phase::Terminal {
        return Phase::Terminal;
    }

    let has_open_objection = predicted_objections.iter().any(|o| o == "price_too_high")
        || matches!(emotion.primary_emotion.as_str(), "resistance" | "doubt");
    if has_open_objection {
        return Phase::Objection;
    }

    let ready_to_buy = emotion.combined_signals.iter().any(|s| s == "ready_to_buy");
    if conversion_probability >= 0.75 || ready_to_buy {
        return Phase::Closing;
    }

    if !predicted_needs.is_empty() || turn_count >= 3 {
        return Phase::Focused;
    }

    if turn_count >= 1 {
        return Phase::Analysis;
    }

    Phase::Discovery
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_signal() -> EmotionalSignal {
        EmotionalSignal {
            primary_emotion: "neutral".to_string(),
            intensity: 0.0,
            confidence: 0.3,
            combined_signals: Vec::new(),
        }
    }

    #[test]
    fn first_message_stays_in_discovery() {
        let phase = next_phase(Phase::Discovery, &neutral_signal(), &[], &[], 0.1, 0);
        assert_eq!(phase, Phase::Discovery);
    }

    #[test]
    fn price_objection_forces_objection_phase() {
        let objections = vec!["price_too_high".to_string()];
        let phase = next_phase(Phase::Focused, &neutral_signal(), &objections, &[], 0.3, 3);
        assert_eq!(phase, Phase::Objection);
    }

    #[test]
    fn terminal_is_absorbing() {
        let phase = next_phase(Phase::Terminal, &neutral_signal(), &[], &[], 0.9, 10);
        assert_eq!(phase, Phase::Terminal);
    }

    #[test]
    fn high_conversion_probability_moves_to_closing() {
        let phase = next_phase(Phase::Focused, &neutral_signal(), &[], &[], 0.9, 5);
        assert_eq!(phase, Phase::Closing);
    }
}
