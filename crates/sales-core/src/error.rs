use thiserror::Error;

/// Categorical error kinds surfaced to callers of the core (§7).
///
/// `Degraded` is deliberately absent here: a degraded outcome is not an
/// error, it rides along a successful response as a flag (§7 "User-visible
/// failure"). Everything else maps one-to-one onto an exit code from §6.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("session not found: {session_id}")]
    NotFound { session_id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient error, retry suggested: {0}")]
    Transient(String),

    #[error("upstream unavailable: {dependency}")]
    UpstreamUnavailable { dependency: String },

    #[error("overloaded: too many in-flight orchestrations")]
    Overloaded,

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The wire-level error code from §6's exit-code table.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::Transient(_) => "TRANSIENT",
            CoreError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            CoreError::Overloaded => "OVERLOADED",
            CoreError::Internal(_) => "INTERNAL",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
