pub mod error;
pub mod experimenter;
pub mod stats;
pub mod types;

pub use error::{BanditError, Result};
pub use experimenter::Experimenter;
pub use types::{ExperimentDefinition, ExperimentStatus, VariantArm};
