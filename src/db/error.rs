//! Score store failures.
//!
//! Every backend reports through [`StorageError`]: SQLite query and
//! connection failures, a blocking store task that died, and rows that
//! break the one-record-per-player rule in the in-memory store.

use derive_more::{Display, Error};
use tracing::instrument;

/// A score store operation failed. Carries the source location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Score store failure: {} ({}:{})", message, file, line)]
pub struct StorageError {
    /// What the store could not do.
    pub message: String,
    /// Line that raised the failure.
    pub line: u32,
    /// File that raised the failure.
    pub file: &'static str,
}

impl StorageError {
    /// Records a store failure at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for StorageError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(format!("SQLite query failed: {}", err))
    }
}

impl From<diesel::ConnectionError> for StorageError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("SQLite connection failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for StorageError {
    #[track_caller]
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(format!("Blocking store task did not finish: {}", err))
    }
}
