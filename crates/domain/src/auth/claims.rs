//! JWT claim extraction.
//!
//! Tokens are never verified client-side; the only things read out of
//! them are the expiry timestamp and the identity claims used to build
//! the local [`super::User`]. Signature validation is the backend's job.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{DomainError, DomainResult};

/// The subset of JWT claims the client cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Subject: the unique user id.
    pub sub: Option<String>,
    /// Email address, present on Cognito ID tokens.
    pub email: Option<String>,
    /// Display name, when configured as a user attribute.
    pub name: Option<String>,
    /// Expiration as epoch seconds.
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// The expiry claim as a timestamp, if present and representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Decodes the payload segment of a JWT without verifying it.
///
/// # Errors
///
/// Returns [`DomainError::MalformedToken`] if the token is not three
/// dot-separated segments or the payload is not base64url-encoded JSON.
pub fn decode_claims(token: &str) -> DomainResult<TokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| DomainError::MalformedToken("missing payload segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DomainError::MalformedToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| DomainError::MalformedToken(format!("payload is not claim JSON: {e}")))
}

/// Extracts the expiry timestamp embedded in a JWT.
///
/// Returns `None` for malformed tokens or tokens without an `exp`
/// claim; callers fall back to a server-provided lifetime.
#[must_use]
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    decode_claims(token).ok().and_then(|c| c.expires_at())
}
