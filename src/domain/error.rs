//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree's structural rules.
///
/// Resolution misses are not errors: they surface as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid operation on '{path}': {reason}")]
    InvalidOperation { path: String, reason: String },
}

impl DomainError {
    pub fn invalid_operation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
