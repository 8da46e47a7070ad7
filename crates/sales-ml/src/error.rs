#[derive(Debug, thiserror::Error)]
pub enum MlError {
    #[error("tracking sink unavailable: {0}")]
    SinkUnavailable(String),
    #[error("unknown model: {0}")]
    UnknownModel(String),
}

pub type Result<T> = std::result::Result<T, MlError>;
