/// Three-tier system prompt, split so the cacheable parts never share a
/// prefix with the volatile ones: tier 1 is the immutable template
/// catalogue (cacheable across every customer), tier 2 is the customer's
/// profile/tier/archetype/objections (cacheable across turns of the same
/// customer), tier 3 is volatile per-turn state placed last so it never
/// breaks a cache prefix.
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    pub static_tier: String,
    pub customer_tier: String,
    pub volatile_tier: String,
}

impl SystemPrompt {
    pub fn to_plain_text(&self) -> String {
        let mut out = self.static_tier.clone();
        if !self.customer_tier.is_empty() {
            out.push_str("\n\n");
            out.push_str(&self.customer_tier);
        }
        if !self.volatile_tier.is_empty() {
            out.push_str("\n\n");
            out.push_str(&self.volatile_tier);
        }
        out
    }
}

/// Price-objection sub-category (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceObjectionSubCategory {
    StickerShock,
    BudgetConstraint,
    ValueQuestioning,
    ComparisonShopping,
    FinancialFear,
    TimingIssue,
    SpouseApproval,
}

impl PriceObjectionSubCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StickerShock => "sticker_shock",
            Self::BudgetConstraint => "budget_constraint",
            Self::ValueQuestioning => "value_questioning",
            Self::ComparisonShopping => "comparison_shopping",
            Self::FinancialFear => "financial_fear",
            Self::TimingIssue => "timing_issue",
            Self::SpouseApproval => "spouse_approval",
        }
    }

    /// Classify from the customer's own words. Falls back to
    /// `StickerShock` — the least specific, most common category — when
    /// no sharper signal is present.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("wife") || lower.contains("husband") || lower.contains("partner") || lower.contains("spouse") {
            Self::SpouseApproval
        } else if lower.contains("not right now") || lower.contains("later") || lower.contains("next month") {
            Self::TimingIssue
        } else if lower.contains("risk") || lower.contains("scared") || lower.contains("afford to lose") {
            Self::FinancialFear
        } else if lower.contains("other company") || lower.contains("compared to") || lower.contains("competitor") {
            Self::ComparisonShopping
        } else if lower.contains("worth it") || lower.contains("is it worth") {
            Self::ValueQuestioning
        } else if lower.contains("budget") || lower.contains("can't afford") || lower.contains("cannot afford") {
            Self::BudgetConstraint
        } else {
            Self::StickerShock
        }
    }
}

/// Time-of-day bucket for greeting templates (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    /// Bucket an hour-of-day (0..=23) the way a wall clock reads it.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }
}
