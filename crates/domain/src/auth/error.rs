//! Authentication error taxonomy.

use thiserror::Error;

/// Errors raised by the identity provider and the session lifecycle.
///
/// Credential problems leave session state untouched (no session existed
/// yet); refresh failures always escalate to a full logout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The email/password pair was rejected.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account exists but has not confirmed its email yet.
    #[error("account is not confirmed")]
    NotConfirmed,

    /// Self-service registration is disabled on this deployment.
    #[error("registration is disabled")]
    RegistrationDisabled,

    /// The refresh token was rejected as invalid or expired.
    #[error("token refresh rejected: {0}")]
    RefreshRejected(String),

    /// A network-level failure while talking to the auth endpoints.
    #[error("auth network error: {0}")]
    Network(String),

    /// Any other auth endpoint failure, with the backend's message.
    #[error("auth request failed ({status}): {message}")]
    Rejected {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Error message from the response payload.
        message: String,
    },
}
