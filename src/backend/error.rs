//! Backend error types.

use thiserror::Error;

use crate::worker::WorkerError;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised by backend adapters.
#[derive(Error, Debug)]
pub enum BackendError {
    /// An operation needing a live connection ran while disconnected.
    #[error("not connected to {backend}")]
    NotConnected {
        /// Backend name.
        backend: &'static str,
    },

    /// Opening the connection failed; the driver error is logged at the
    /// point of failure.
    #[error("could not connect to {backend}")]
    ConnectionFailed {
        /// Backend name.
        backend: &'static str,
    },

    /// The driver rejected or failed a statement.
    #[error("query execution failed: {0}")]
    QueryExecution(#[source] DriverError),
}

impl BackendError {
    /// Check if this error means the adapter was disconnected.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected { .. })
    }
}

/// Failure reported by an underlying driver.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Worker(#[from] WorkerError),
}

impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        Self::QueryExecution(err.into())
    }
}

impl From<WorkerError> for BackendError {
    fn from(err: WorkerError) -> Self {
        Self::QueryExecution(err.into())
    }
}
