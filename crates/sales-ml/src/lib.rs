pub mod drift;
pub mod error;
pub mod pipeline;
pub mod retrain;
pub mod severity;
pub mod sink;
pub mod stats;
pub mod types;

pub use drift::{BaselineDistribution, DriftDetector, DriftReport};
pub use error::{MlError, Result};
pub use pipeline::{MlPipeline, ModelWindow, WindowSource};
pub use retrain::{RetrainQueue, RetrainRequest};
pub use severity::DriftSeverity;
pub use sink::{InMemoryTrackingSink, TrackingSink};
pub use types::{ConversationOutcomeEvent, MessageExchangeEvent, PredictionRecord, TrackingEvent};
