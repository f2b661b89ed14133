//! Error types for the protocol server.

use std::time::Duration;
use thiserror::Error;

/// Result alias for server operations.
pub type Result<T> = std::result::Result<T, StreamletError>;

/// Errors that can occur while serving a connection.
#[derive(Error, Debug)]
pub enum StreamletError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Unsupported operation: api_key {0}")]
    UnsupportedOperation(u16),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StreamletError {
    /// Transport-level failures: the socket or the framing on it is unusable.
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            StreamletError::Io(_) | StreamletError::FrameTooLarge { .. } | StreamletError::Timeout(_)
        )
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        StreamletError::MalformedRequest(msg.into())
    }
}
