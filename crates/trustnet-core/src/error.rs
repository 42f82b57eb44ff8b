use thiserror::Error;

/// Protocol-wide error types for the trustnet reputation service.
#[derive(Debug, Error)]
pub enum TrustNetError {
    /// Referenced entity or job id is unknown (or was deleted).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied data is invalid: stale update timestamp,
    /// degenerate pre-trust vector, malformed job spec.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A long-running compute was aborted by its caller.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage or resource failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for TrustNetError {
    fn from(e: serde_json::Error) -> Self {
        TrustNetError::Serialization(e.to_string())
    }
}
