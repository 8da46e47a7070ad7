use sales_core::types::{Archetype, Phase, Tier, VariantId};

use crate::catalogue::TemplateCatalogue;
use crate::types::{PriceObjectionSubCategory, SystemPrompt, TimeOfDay};

/// Everything the composer needs to assemble one turn's prompt (§4.7's
/// "Inputs" list), borrowed rather than owned since it's assembled fresh
/// from `ConversationState` on every call.
pub struct ComposerInput<'a> {
    pub phase: Phase,
    pub primary_emotion: &'a str,
    pub tier: Option<Tier>,
    pub archetype: Archetype,
    pub predicted_objections: &'a [String],
    pub predicted_needs: &'a [String],
    pub greeting_variant: Option<&'a VariantId>,
    pub price_objection_variant: Option<&'a VariantId>,
    pub last_customer_message: &'a str,
    pub turn_count: u32,
    pub hour_of_day: u32,
    pub timestamp: &'a str,
}

/// Assembles the phase/emotion/variant-driven system prompt (§4.7 steps
/// 1-2). Post-processing of the LLM's *output* lives in `postprocess`.
pub struct PromptComposer;

impl PromptComposer {
    /// Maps `(phase, primary_emotion, variant_id)` to a template id from
    /// the closed catalogue (§4.7 step 1).
    pub fn select_template_id(input: &ComposerInput) -> String {
        if input.phase == Phase::Discovery {
            let tod = TimeOfDay::from_hour(input.hour_of_day).as_str();
            let variant = input.greeting_variant.map(|v| v.0.as_str()).unwrap_or("A");
            return format!("greeting_{tod}_{variant}");
        }
        if input.predicted_objections.iter().any(|o| o == "price_too_high") {
            let subcategory = PriceObjectionSubCategory::classify(input.last_customer_message);
            let variant = input.price_objection_variant.map(|v| v.0.as_str()).unwrap_or("A");
            return format!("price_objection_{}_{variant}", subcategory.as_str());
        }
        format!("generic_{}", input.phase)
    }

    pub fn compose(catalogue: &TemplateCatalogue, input: &ComposerInput) -> SystemPrompt {
        let template_id = Self::select_template_id(input);
        let template_body = catalogue
            .get(&template_id)
            .or_else(|| catalogue.get("generic_fallback"))
            .unwrap_or("Let's continue.")
            .to_string();

        let static_tier = format!(
            "## Base guidance\n{template_body}\n\n## Style\nBe warm, concrete, and never robotic. \
             Validate the customer's emotion before moving the conversation forward."
        );

        let mut customer_tier = String::new();
        if let Some(tier) = input.tier {
            customer_tier.push_str(&format!("Recommended tier: {tier}.\n"));
        }
        if input.archetype != Archetype::Unknown {
            customer_tier.push_str(&format!("Customer archetype: {:?}.\n", input.archetype));
        }
        if !input.predicted_objections.is_empty() {
            customer_tier.push_str(&format!(
                "Active objections to address: {}.\n",
                input.predicted_objections.join(", ")
            ));
        }
        if !input.predicted_needs.is_empty() {
            customer_tier.push_str(&format!("Evidenced needs: {}.\n", input.predicted_needs.join(", ")));
        }

        let volatile_tier = format!(
            "[Phase: {} | Turn: {} | Time: {} | validate emotion: {}]",
            input.phase, input.turn_count, input.timestamp, input.primary_emotion
        );

        SystemPrompt { static_tier, customer_tier, volatile_tier }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(phase: Phase, objections: &'static [String], msg: &'static str) -> ComposerInput<'static> {
        ComposerInput {
            phase,
            primary_emotion: "interest",
            tier: Some(Tier::Pro),
            archetype: Archetype::Prime,
            predicted_objections: objections,
            predicted_needs: &[],
            greeting_variant: None,
            price_objection_variant: None,
            last_customer_message: msg,
            turn_count: 3,
            hour_of_day: 9,
            timestamp: "2026-01-01T09:00:00Z",
        }
    }

    #[test]
    fn discovery_phase_picks_morning_greeting() {
        let id = PromptComposer::select_template_id(&input(Phase::Discovery, &[], ""));
        assert_eq!(id, "greeting_morning_A");
    }

    #[test]
    fn price_objection_routes_to_subcategory_template() {
        let objections = vec!["price_too_high".to_string()];
        let objections: &'static [String] = Box::leak(objections.into_boxed_slice());
        let id = PromptComposer::select_template_id(&input(
            Phase::Objection,
            objections,
            "I can't afford this right now, my budget is tight",
        ));
        assert_eq!(id, "price_objection_budget_constraint_A");
    }

    #[test]
    fn price_objection_variant_b_routes_to_its_own_template() {
        let objections = vec!["price_too_high".to_string()];
        let objections: &'static [String] = Box::leak(objections.into_boxed_slice());
        let mut composer_input = input(
            Phase::Objection,
            objections,
            "I can't afford this right now, my budget is tight",
        );
        let variant_b = VariantId::from("B");
        composer_input.price_objection_variant = Some(&variant_b);
        let id = PromptComposer::select_template_id(&composer_input);
        assert_eq!(id, "price_objection_budget_constraint_B");
    }

    #[test]
    fn compose_includes_validation_instruction_in_volatile_tier() {
        let catalogue = TemplateCatalogue::load();
        let prompt = PromptComposer::compose(&catalogue, &input(Phase::Focused, &[], ""));
        assert!(prompt.volatile_tier.contains("validate emotion: interest"));
    }
}
