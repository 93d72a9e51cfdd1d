//! Application error types

use serde_json::Value;
use thiserror::Error;

use crate::ports::TransportError;

/// Errors surfaced by the authenticated request client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session could not be refreshed; the user must log in again.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message parsed from the error payload, or a generic fallback.
        message: String,
        /// The raw error payload, when it was parseable JSON.
        payload: Option<Value>,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The HTTP status carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
