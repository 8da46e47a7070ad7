use std::collections::HashMap;

/// Static template bodies, keyed by template id. Loaded once at startup
/// into an immutable map (§9), never mutated afterward — the empathy
/// composer only ever reads from it.
pub struct TemplateCatalogue {
    templates: HashMap<String, String>,
}

impl TemplateCatalogue {
    pub fn load() -> Self {
        let mut templates = HashMap::new();

        for (time_of_day, body) in [
            ("morning", "Good morning{name_clause}! I'd love to understand what brought you here today."),
            ("afternoon", "Good afternoon{name_clause}! Thanks for taking the time to chat."),
            ("evening", "Good evening{name_clause}! I appreciate you making time at the end of your day."),
        ] {
            for variant in ["A", "B"] {
                templates.insert(
                    format!("greeting_{time_of_day}_{variant}"),
                    body.to_string(),
                );
            }
        }

        for (subcategory, body_a, body_b) in [
            ("sticker_shock",
             "I hear you — the number can look big at first glance. Let's break down what's actually included.",
             "Totally fair reaction. Let's walk through exactly what's included so the number makes more sense."),
            ("budget_constraint",
             "Budget matters, and I want this to fit yours. Can you share a range you're comfortable with?",
             "Let's find something that actually fits your budget — what range were you hoping to stay within?"),
            ("value_questioning",
             "Fair question — let's look at what this actually does for you day to day.",
             "Good question to ask. Here's the concrete difference it makes day to day."),
            ("comparison_shopping",
             "Smart to compare. What stood out to you about the other option?",
             "Makes sense to shop around. What did the other option get right that we should match?"),
            ("financial_fear",
             "I understand wanting to be careful here. There's no pressure — let's go at your pace.",
             "It's okay to be cautious with money. No pressure at all — we'll move at whatever pace works for you."),
            ("timing_issue",
             "No rush at all. What would need to be true for the timing to work?",
             "Timing is everything, I get it. What would need to change for now to work instead?"),
            ("spouse_approval",
             "Of course — big decisions are often shared ones. What would help that conversation go well?",
             "Makes total sense to loop them in. What information would make that conversation easier?"),
        ] {
            templates.insert(format!("price_objection_{subcategory}_A"), body_a.to_string());
            templates.insert(format!("price_objection_{subcategory}_B"), body_b.to_string());
        }

        for (phase, body) in [
            ("discovery", "Tell me more about what you're looking for."),
            ("analysis", "Based on what you've shared, here's what stands out to me."),
            ("focused", "Let's zero in on the option that fits you best."),
            ("objection", "I want to make sure I'm addressing what's actually on your mind."),
            ("closing", "Here's what I'd suggest as the next step."),
        ] {
            templates.insert(format!("generic_{phase}"), body.to_string());
        }

        templates.insert(
            "generic_fallback".to_string(),
            "Let's keep going — what matters most to you right now?".to_string(),
        );

        Self { templates }
    }

    pub fn get(&self, template_id: &str) -> Option<&str> {
        self.templates.get(template_id).map(|s| s.as_str())
    }
}

impl Default for TemplateCatalogue {
    fn default() -> Self {
        Self::load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_price_objection_subcategory_has_a_template_per_variant() {
        let catalogue = TemplateCatalogue::load();
        for subcategory in [
            "sticker_shock",
            "budget_constraint",
            "value_questioning",
            "comparison_shopping",
            "financial_fear",
            "timing_issue",
            "spouse_approval",
        ] {
            for variant in ["A", "B"] {
                assert!(catalogue.get(&format!("price_objection_{subcategory}_{variant}")).is_some());
            }
        }
    }

    #[test]
    fn fallback_always_present() {
        assert!(TemplateCatalogue::load().get("generic_fallback").is_some());
    }
}
