/// One entry in the closed-but-extensible signal vocabulary (§4.5).
/// English and Spanish phrasings are mixed into the same keyword slice
/// per signal rather than split by language.
const SIGNALS: &[(&str, &[&str])] = &[
    ("hesitation", &["not sure", "maybe", "i don't know", "hmm", "no estoy seguro", "no estoy segura", "tal vez", "no sé"]),
    ("urgency", &["right now", "asap", "urgently", "need this today", "ahora mismo", "urgente", "lo necesito hoy"]),
    ("doubt", &["i doubt", "not convinced", "does this really work", "lo dudo", "no estoy convencido", "esto realmente funciona"]),
    ("interest", &["interesting", "tell me more", "curious", "interesante", "cuéntame más", "tengo curiosidad"]),
    ("commitment", &["let's do it", "i'm ready", "sign me up", "hagámoslo", "estoy listo", "estoy lista", "apúntame"]),
    ("resistance", &["no thanks", "not interested", "won't", "no gracias", "no me interesa"]),
    ("openness", &["sure, why not", "i'm open to", "okay, go on", "claro, por qué no", "estoy abierto a", "estoy abierta a"]),
    ("fatigue", &["tired", "exhausted", "worn out", "cansado", "cansada", "agotado", "agotada"]),
    ("hope", &["i hope", "hopeful", "looking forward", "espero que", "con esperanza", "con ganas de"]),
    ("fear", &["afraid", "scared", "worried", "tengo miedo", "asustado", "asustada", "preocupado", "preocupada"]),
    ("frustration", &["frustrated", "annoyed", "this is ridiculous", "frustrado", "frustrada", "esto es ridículo"]),
    ("excitement", &["excited", "can't wait", "amazing", "emocionado", "emocionada", "no puedo esperar", "increíble"]),
    ("overwhelm", &["too much", "overwhelmed", "so much information", "es demasiado", "abrumado", "abrumada", "tanta información"]),
    ("trust_building", &["i trust", "i believe you", "confidence in", "confío", "te creo", "confianza en"]),
    ("price_concern", &["expensive", "the price", "the cost", "caro", "el precio", "el costo"]),
];

/// Derived from a base-signal co-occurrence (§4.5's "second-order
/// combinations such as burnout_risk and ready_to_buy").
const COMBINATIONS: &[(&str, &[&str])] = &[
    ("burnout_risk", &["fatigue", "resistance"]),
    ("ready_to_buy", &["interest", "commitment"]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct EmotionalSignal {
    pub primary_emotion: String,
    pub intensity: f64,
    pub confidence: f64,
    pub combined_signals: Vec<String>,
}

fn weighted_score(window: &[String], keywords: &[&str]) -> f64 {
    let n = window.len();
    if n == 0 {
        return 0.0;
    }
    let mut score = 0.0;
    for (i, msg) in window.iter().enumerate() {
        let lower = msg.to_lowercase();
        let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
        if hits > 0 {
            score += ((i + 1) as f64 / n as f64) * hits as f64;
        }
    }
    score
}

/// Derives an emotional profile from the latest user message plus a
/// sliding window of previous ones (§4.5). Pure function over owned
/// input — no shared state, safe to call concurrently per session.
pub struct EmotionAnalyzer;

impl EmotionAnalyzer {
    pub fn analyze(transcript_window: &[String]) -> EmotionalSignal {
        let mut scored: Vec<(&str, f64)> = SIGNALS
            .iter()
            .map(|(name, keywords)| (*name, weighted_score(transcript_window, keywords)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(b.0)));

        if scored.is_empty() {
            return EmotionalSignal {
                primary_emotion: "neutral".to_string(),
                intensity: 0.0,
                confidence: 0.3,
                combined_signals: Vec::new(),
            };
        }

        let detected: Vec<&str> = scored.iter().map(|(name, _)| *name).collect();
        let mut combined: Vec<String> = detected.iter().map(|s| s.to_string()).collect();
        for (combo, required) in COMBINATIONS {
            if required.iter().all(|r| detected.contains(r)) {
                combined.push(combo.to_string());
            }
        }

        let (primary, top_score) = scored[0];
        let intensity = top_score.min(1.0);
        let confidence = (0.4 + 0.1 * detected.len() as f64).min(0.95);

        EmotionalSignal {
            primary_emotion: primary.to_string(),
            intensity,
            confidence,
            combined_signals: combined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_when_no_signal_found() {
        let signal = EmotionAnalyzer::analyze(&["let's continue".to_string()]);
        assert_eq!(signal.primary_emotion, "neutral");
        assert!(signal.combined_signals.is_empty());
    }

    #[test]
    fn detects_price_concern() {
        let signal = EmotionAnalyzer::analyze(&["honestly the cost worries me".to_string()]);
        assert_eq!(signal.primary_emotion, "price_concern");
        assert!(signal.confidence > 0.3);
    }

    #[test]
    fn derives_ready_to_buy_combination() {
        let signal = EmotionAnalyzer::analyze(&[
            "this is so interesting".to_string(),
            "let's do it, i'm ready".to_string(),
        ]);
        assert!(signal.combined_signals.contains(&"ready_to_buy".to_string()));
    }
}
