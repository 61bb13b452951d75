//! Error types for edge identification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while identifying edges.
///
/// Payloads are plain strings so a failure can be written to the on-disk
/// cache and replayed later as an identical value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EdgeError {
    /// The authorizer could not evaluate a request
    #[error("Authorization evaluation failed: {0}")]
    Authorization(String),

    /// A checker failed while discovering edges
    #[error("Checker '{checker}' failed: {message}")]
    Checker { checker: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// (De)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage root could not be resolved or created
    #[error("Storage error: {0}")]
    Storage(String),

    /// A dispatched task panicked or was cancelled
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// The worker pool could not be built
    #[error("Worker pool error: {0}")]
    Pool(String),
}

impl EdgeError {
    /// Permanent failures replay the same way for the same input; everything
    /// else may succeed on a later attempt.
    pub fn is_permanent(&self) -> bool {
        matches!(self, EdgeError::Authorization(_) | EdgeError::Checker { .. })
    }

    pub fn checker(checker: impl Into<String>, message: impl Into<String>) -> Self {
        EdgeError::Checker {
            checker: checker.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for EdgeError {
    fn from(err: std::io::Error) -> Self {
        EdgeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EdgeError {
    fn from(err: serde_json::Error) -> Self {
        EdgeError::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for EdgeError {
    fn from(err: tokio::task::JoinError) -> Self {
        EdgeError::TaskFailed(err.to_string())
    }
}

/// Result type for edge identification
pub type Result<T> = std::result::Result<T, EdgeError>;
