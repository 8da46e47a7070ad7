use thiserror::Error;

/// Errors raised by the session store (§4.1).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {session_id}")]
    NotFound { session_id: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `Save` was called with a stale `expected_version` (§4.1, I5).
    #[error("version conflict for session {session_id}: expected {expected}, found {found}")]
    VersionConflict {
        session_id: String,
        expected: u64,
        found: u64,
    },

    /// The inbound message replays `(session_id, client_message_id)` that
    /// was already committed (§4.1, P6) but the original outcome could not
    /// be reconstructed (e.g. the transcript was externally truncated).
    #[error("idempotency replay could not be resolved for {session_id}/{client_message_id}")]
    ReplayUnresolved {
        session_id: String,
        client_message_id: String,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;
