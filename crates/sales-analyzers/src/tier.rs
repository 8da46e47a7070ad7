use sales_core::config::{TierConfig, TierWeights};
use sales_core::types::Tier;

/// Inputs to tier scoring (§4.5: "age band, profession category, stated
/// budget, detected urgency, session engagement score").
#[derive(Debug, Clone, Default)]
pub struct TierFeatures {
    pub age: Option<u32>,
    pub profession: Option<String>,
    pub budget_band: Option<String>,
    /// 0.0..=1.0, typically the `urgency` signal's intensity from the
    /// emotion analyzer.
    pub detected_urgency: f64,
    pub engagement_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierDecision {
    pub tier: Tier,
    pub confidence: f64,
}

fn normalize_budget(band: Option<&str>) -> f64 {
    match band.map(|s| s.to_lowercase()) {
        Some(ref s) if s == "low" => 0.2,
        Some(ref s) if s == "medium" => 0.5,
        Some(ref s) if s == "high" => 0.8,
        Some(ref s) if s == "premium" => 1.0,
        _ => 0.4,
    }
}

fn normalize_age(age: Option<u32>) -> f64 {
    match age {
        Some(a) => (a as f64 / 80.0).clamp(0.0, 1.0),
        None => 0.5,
    }
}

const AFFLUENT_PROFESSIONS: &[&str] = &["executive", "director", "owner", "founder"];

fn profession_bonus(profession: Option<&str>) -> f64 {
    match profession.map(|s| s.to_lowercase()) {
        Some(p) if AFFLUENT_PROFESSIONS.contains(&p.as_str()) => 0.15,
        _ => 0.0,
    }
}

fn score(weights: &TierWeights, features: &TierFeatures) -> f64 {
    weights.budget * normalize_budget(features.budget_band.as_deref())
        + weights.urgency * features.detected_urgency.clamp(0.0, 1.0)
        + weights.engagement * features.engagement_score.clamp(0.0, 1.0)
        + weights.age * normalize_age(features.age)
        + profession_bonus(features.profession.as_deref())
}

/// Recommends a product tier from customer features (§4.5). Re-run on
/// every user message; callers apply I4 (confidence monotonicity) when
/// folding the result into `ConversationState`.
pub struct TierAnalyzer;

impl TierAnalyzer {
    pub fn analyze(config: &TierConfig, features: &TierFeatures) -> TierDecision {
        let mut ranked = vec![
            (Tier::Essential, score(&config.essential, features)),
            (Tier::Pro, score(&config.pro, features)),
            (Tier::Elite, score(&config.elite, features)),
            (Tier::Premium, score(&config.premium, features)),
        ];
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        let (mut chosen, top_score) = ranked[0];
        // If the next tier up scores within `tie_ratio` of the winner, bias
        // toward the higher tier (§4.5's tie-break rule).
        for (tier, s) in &ranked[1..] {
            if rank(*tier) > rank(chosen) && top_score > 0.0 && (top_score / s) < config.tie_ratio {
                chosen = *tier;
                break;
            }
        }

        let total: f64 = ranked.iter().map(|(_, s)| s).sum();
        let confidence = if total > 0.0 { (top_score / total).clamp(0.0, 1.0) } else { 0.25 };

        TierDecision { tier: chosen, confidence }
    }
}

fn rank(tier: Tier) -> u8 {
    match tier {
        Tier::Essential => 0,
        Tier::Pro => 1,
        Tier::Elite => 2,
        Tier::Premium => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_budget_low_engagement_picks_essential() {
        let decision = TierAnalyzer::analyze(
            &TierConfig::default(),
            &TierFeatures {
                age: Some(30),
                profession: None,
                budget_band: Some("low".to_string()),
                detected_urgency: 0.1,
                engagement_score: 0.1,
            },
        );
        assert_eq!(decision.tier, Tier::Essential);
    }

    #[test]
    fn high_everything_picks_premium() {
        let decision = TierAnalyzer::analyze(
            &TierConfig::default(),
            &TierFeatures {
                age: Some(45),
                profession: Some("founder".to_string()),
                budget_band: Some("premium".to_string()),
                detected_urgency: 0.9,
                engagement_score: 0.9,
            },
        );
        assert_eq!(decision.tier, Tier::Premium);
    }
}
