//! Driver process error types.

use std::io;
use thiserror::Error;

/// Result type for driver process operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur while talking to the driver process.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Failed to spawn the driver process.
    #[error("failed to spawn driver process: {0}")]
    SpawnFailed(#[source] io::Error),

    /// Failed to write to driver stdin.
    #[error("failed to write to driver: {0}")]
    WriteFailed(#[source] io::Error),

    /// Failed to read from driver stdout.
    #[error("failed to read from driver: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// Driver process closed its stdout.
    #[error("driver process exited unexpectedly")]
    WorkerExited,

    /// Driver returned an error code with no dedicated variant.
    #[error("driver error: {message} (code: {code})")]
    Remote { code: String, message: String },

    #[error("warehouse driver not found: {0}")]
    DriverNotFound(String),

    #[error("warehouse connection failed: {0}")]
    ConnectionFailed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// The warehouse rejected or failed a statement.
    #[error("{0}")]
    QueryFailed(String),
}

impl WorkerError {
    /// Create a remote error from an error response.
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if this error indicates the driver has exited.
    pub fn is_worker_exited(&self) -> bool {
        matches!(self, Self::WorkerExited)
    }
}
