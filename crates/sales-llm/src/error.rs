#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("response parsing failed: {0}")]
    Parse(String),
    #[error("breaker open for dependency '{0}'")]
    BreakerOpen(String),
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

pub type Result<T> = std::result::Result<T, LlmError>;
