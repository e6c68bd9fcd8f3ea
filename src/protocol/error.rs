//! Protocol error type.

use thiserror::Error;

/// Errors raised while talking to a Wyoming server.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event header exceeds {limit} bytes")]
    HeaderTooLong { limit: usize },

    #[error("event frame exceeds {limit} bytes")]
    FrameTooLong { limit: usize },

    #[error("invalid '{event_type}' event: {source}")]
    InvalidEvent {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}
