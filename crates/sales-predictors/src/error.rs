#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("unknown predictor model_id: {0}")]
    UnknownModel(String),
    #[error("predictor '{model_id}' failed: {reason}")]
    Inference { model_id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PredictorError>;
