//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error taxonomy.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// ownership, conflicts). A denied permission check is **not** an error; it is
/// an `allowed = false` result. `CheckFailed` exists precisely so that callers
/// can never conflate "denied" with "evaluation blew up."
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced entity does not exist or is outside the expected parent scope.
    #[error("not found")]
    NotFound,

    /// Authenticated but lacking authority for the requested check or mutation.
    #[error("forbidden")]
    Forbidden,

    /// A `key` value failed the naming pattern.
    #[error("invalid key format: {0}")]
    InvalidFormat(String),

    /// A `key` collides with an existing sibling under the same parent.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A write references an entity outside its expected ownership chain.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Unexpected storage/provider failure during permission evaluation.
    ///
    /// Must surface as a 5xx at the HTTP boundary, never as a silent denial.
    #[error("permission check failed: {0}")]
    CheckFailed(String),
}

impl DomainError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_reference(msg: impl Into<String>) -> Self {
        Self::InvalidReference(msg.into())
    }

    pub fn check_failed(msg: impl Into<String>) -> Self {
        Self::CheckFailed(msg.into())
    }
}
