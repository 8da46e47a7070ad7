use sales_core::types::VariantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentStatus {
    Active,
    Completed,
}

/// Running statistics for one variant of one experiment. `reward_sum`
/// generalizes beyond a 0/1 conversion indicator, but the auto-deploy
/// significance test treats rewards as a conversion rate (§4.6 "target
/// metric"), the common case in this domain.
#[derive(Debug, Clone)]
pub struct VariantArm {
    pub variant_id: VariantId,
    pub impressions: u64,
    pub reward_sum: f64,
}

impl VariantArm {
    pub fn new(variant_id: VariantId) -> Self {
        Self { variant_id, impressions: 0, reward_sum: 0.0 }
    }

    pub fn mean_reward(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.reward_sum / self.impressions as f64
        }
    }
}

/// Static shape of an experiment, supplied at startup (§9: "loaded at
/// startup into an immutable map").
#[derive(Debug, Clone)]
pub struct ExperimentDefinition {
    pub experiment_id: sales_core::types::ExperimentId,
    pub control: VariantId,
    /// All candidate variants, including `control`.
    pub variants: Vec<VariantId>,
    pub min_sample_size: u64,
    pub confidence_level: f64,
}
