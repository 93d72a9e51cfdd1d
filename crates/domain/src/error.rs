//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A JWT could not be decoded into its claims.
    #[error("malformed token: {0}")]
    MalformedToken(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
