use sales_core::types::{ExperimentId, VariantId};

#[derive(Debug, thiserror::Error)]
pub enum BanditError {
    #[error("unknown experiment: {0}")]
    UnknownExperiment(ExperimentId),
    #[error("unknown variant {variant_id} for experiment {experiment_id}")]
    UnknownVariant { experiment_id: ExperimentId, variant_id: VariantId },
}

pub type Result<T> = std::result::Result<T, BanditError>;
