//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Covers deterministic business failures only: bad input, missing records,
/// illegal state transitions. IO and transport failures live in the layers
/// that produce them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation (an inverted range, an out-of-bounds budget).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The addressed record does not exist within the tenant.
    #[error("not found")]
    NotFound,

    /// The operation is illegal in the record's current state, e.g. retrying
    /// a dead message or claiming one that is already processing.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored data broke a structural invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The acting principal may not perform this operation.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
