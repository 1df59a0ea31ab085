//! SHACL error types

use thiserror::Error;
use veld_core::{StoreError, Term};

/// Result type for SHACL operations
pub type Result<T> = std::result::Result<T, ShaclError>;

/// SHACL compilation and validation errors
///
/// Note that a constraint violation is not an error here: violations are the
/// expected `Rejected` outcome and travel in a `ValidationReport`. Errors are
/// malformed shape declarations (fatal at store open) and store failures
/// mid-pass (fail-closed: the pass aborts and the transaction is rejected).
#[derive(Debug, Error)]
pub enum ShaclError {
    /// Malformed shape declaration encountered during catalog construction
    #[error("Failed to parse shape {shape}: {message}")]
    ShapeParse { shape: Term, message: String },

    /// Well-formed but unsupported constraint component
    #[error("Unsupported constraint on shape {shape}: {message}")]
    UnsupportedConstraint { shape: Term, message: String },

    /// Circular shape reference detected
    #[error("Circular shape reference detected involving {shape}")]
    CircularReference { shape: Term },

    /// The underlying store raised an error mid-scan
    #[error("Store error during validation: {0}")]
    Store(#[from] StoreError),
}

impl ShaclError {
    /// Create a shape parse error
    pub fn parse(shape: &Term, message: impl Into<String>) -> Self {
        ShaclError::ShapeParse {
            shape: shape.clone(),
            message: message.into(),
        }
    }

    /// Create an unsupported-constraint error
    pub fn unsupported(shape: &Term, message: impl Into<String>) -> Self {
        ShaclError::UnsupportedConstraint {
            shape: shape.clone(),
            message: message.into(),
        }
    }
}
