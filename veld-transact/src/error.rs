//! Transaction error types

use thiserror::Error;
use veld_shacl::ValidationReport;

/// Transaction errors
#[derive(Error, Debug)]
pub enum TransactError {
    /// Operation issued in the wrong transaction state
    #[error("Invalid transaction state: {0}")]
    InvalidState(&'static str),

    /// Commit-time validation found violations; the transaction rolled back
    #[error("Constraint validation failed with {} violation(s)", report.results().len())]
    Violation { report: ValidationReport },

    /// Concurrent commit detected under serializable isolation
    #[error("Commit conflict: expected head={expected}, found head={head}")]
    CommitConflict { expected: u64, head: u64 },

    /// Shape parsing or plan evaluation error
    #[error("SHACL error: {0}")]
    Shacl(#[from] veld_shacl::ShaclError),

    /// Core store error
    #[error("Store error: {0}")]
    Store(#[from] veld_core::StoreError),
}

/// Result type for transaction operations
pub type Result<T> = std::result::Result<T, TransactError>;
