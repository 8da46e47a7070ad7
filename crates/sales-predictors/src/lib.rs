pub mod conversion;
pub mod error;
pub mod nba;
pub mod needs;
pub mod objection;
pub mod registry;
pub mod traits;
pub mod types;

pub use conversion::ConversionPredictor;
pub use error::{PredictorError, Result};
pub use nba::NextBestActionPredictor;
pub use needs::NeedsPredictor;
pub use objection::ObjectionPredictor;
pub use registry::PredictorRegistry;
pub use traits::Predictor;
pub use types::{Features, NbaAction, PredictorOutput, PredictorResult};
