//! Error types for veld-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store access errors
///
/// Any failure raised by a graph view mid-scan. The validation engine treats
/// these as fail-closed: a scan failure aborts the validation pass and the
/// enclosing transaction is rejected.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Underlying storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// The store aborted the caller's transaction with a conflict
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// Invalid scan request
    #[error("Invalid scan: {0}")]
    InvalidScan(String),
}

impl StoreError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        StoreError::Storage(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        StoreError::Conflict(msg.into())
    }
}
