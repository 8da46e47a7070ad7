use sales_core::types::Phase;

/// Filler phrases that read as robotic when repeated verbatim across
/// consecutive agent turns (§4.7 step 3).
const FILLER_PHRASES: &[&str] = &[
    "i understand your concern",
    "that's a great question",
    "as i mentioned",
    "i'm here to help",
];

/// Rejects `candidate` if it repeats a blacklisted filler phrase already
/// present in either of the last two agent messages. Returns `true` when
/// the candidate is acceptable as-is.
pub fn enforce_no_repetition(candidate: &str, last_two_agent_messages: &[&str]) -> bool {
    let lower = candidate.to_lowercase();
    let offending: Vec<&&str> = FILLER_PHRASES.iter().filter(|p| lower.contains(**p)).collect();
    if offending.is_empty() {
        return true;
    }
    !last_two_agent_messages
        .iter()
        .any(|prev| offending.iter().any(|p| prev.to_lowercase().contains(**p)))
}

/// Rewrites `text` so the customer's name appears at most once, replacing
/// later occurrences with nothing (collapsing the resulting double
/// spacing/punctuation left behind).
pub fn enforce_name_once(text: &str, name: &str) -> String {
    if name.is_empty() {
        return text.to_string();
    }
    let mut seen = false;
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let lower_name = name.to_lowercase();
    loop {
        let lower_rest = rest.to_lowercase();
        match lower_rest.find(&lower_name) {
            None => {
                out.push_str(rest);
                break;
            }
            Some(idx) => {
                out.push_str(&rest[..idx]);
                if !seen {
                    out.push_str(&rest[idx..idx + name.len()]);
                    seen = true;
                }
                rest = &rest[idx + name.len()..];
            }
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if `text` ends with a forward-moving question — required unless
/// `phase == Closing` (§4.7 step 3).
pub fn ends_with_forward_question(text: &str) -> bool {
    text.trim_end().ends_with('?')
}

/// Enforces the forward-question rule, appending a generic nudge when the
/// candidate doesn't already end with one and the phase requires it.
pub fn enforce_forward_question(text: &str, phase: Phase) -> String {
    if phase == Phase::Closing || ends_with_forward_question(text) {
        return text.to_string();
    }
    format!("{} What feels like the right next step for you?", text.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_repeated_filler_phrase() {
        let last_two = ["I understand your concern about pricing"];
        assert!(!enforce_no_repetition(
            "I understand your concern, let's continue",
            &last_two
        ));
    }

    #[test]
    fn allows_filler_phrase_when_not_recently_used() {
        assert!(enforce_no_repetition("That's a great question, let's dig in", &[]));
    }

    #[test]
    fn collapses_repeated_name() {
        let out = enforce_name_once("Hi Maria, Maria, are you still there Maria?", "Maria");
        assert_eq!(out.matches("Maria").count(), 1);
    }

    #[test]
    fn appends_forward_question_outside_closing() {
        let out = enforce_forward_question("Here's how it works.", Phase::Focused);
        assert!(out.ends_with('?'));
    }

    #[test]
    fn closing_phase_does_not_require_question() {
        let out = enforce_forward_question("Let's get you started.", Phase::Closing);
        assert_eq!(out, "Let's get you started.");
    }
}
