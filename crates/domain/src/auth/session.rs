//! Session and user types.
//!
//! A [`Session`] is the single source of truth for "who is logged in".
//! It is created on login or registration confirmation, mutated in place
//! on every token refresh, and destroyed on logout or an unrecoverable
//! refresh failure.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated user, derived from the ID token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier (the `sub` claim).
    pub id: String,
    /// The user's email address.
    pub email: String,
    /// Display name, falls back to the email when absent.
    pub name: String,
}

/// The current authenticated session.
///
/// `expires_at` is always derived from the token's embedded `exp` claim
/// or from a server-provided `expires_in`, never guessed. It is `None`
/// only when neither source was available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The authenticated user.
    pub user: User,
    /// Short-lived credential for API authorization scopes.
    pub access_token: String,
    /// Identity-claims credential; bearer-authenticates requests.
    pub id_token: String,
    /// Long-lived credential used solely to mint new access/ID tokens.
    pub refresh_token: String,
    /// When the access/ID tokens expire, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns true if the session has expired at `now`.
    ///
    /// A session with no known expiry is treated as expired, matching
    /// the conservative behaviour expected of the request pipeline.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| now >= expires_at)
    }

    /// Time remaining until expiry at `now`.
    ///
    /// Negative once the session has expired; `None` if the expiry is
    /// unknown.
    #[must_use]
    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at.map(|expires_at| expires_at - now)
    }

    /// Applies a token refresh in place.
    ///
    /// Replaces the access/ID tokens and the expiry; the refresh token
    /// and the user are untouched. When the update carries no ID token
    /// the access token doubles as one, mirroring the backend contract.
    pub fn apply_update(&mut self, update: TokenUpdate, now: DateTime<Utc>) {
        self.expires_at = update.expires_at(now);
        self.id_token = update
            .id_token
            .unwrap_or_else(|| update.access_token.clone());
        self.access_token = update.access_token;
    }
}

/// New tokens produced by a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUpdate {
    /// The new access token.
    pub access_token: String,
    /// The new ID token, when the server rotates it.
    pub id_token: Option<String>,
    /// Token lifetime in seconds, when the server reports one.
    pub expires_in: Option<u64>,
}

impl TokenUpdate {
    /// Resolves the new expiry timestamp.
    ///
    /// Prefers the server-provided `expires_in`, otherwise falls back to
    /// the `exp` claim embedded in the access token.
    #[must_use]
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map_or_else(
                || super::token_expiry(&self.access_token),
                |secs| Some(now + Duration::seconds(secs)),
            )
    }
}

/// The on-disk shape of a session.
///
/// Only the fields needed to resume a session survive a restart; no
/// transient state is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// The authenticated user, if any.
    pub user: Option<User>,
    /// Persisted access token.
    pub access_token: Option<String>,
    /// Persisted ID token.
    pub id_token: Option<String>,
    /// Persisted refresh token.
    pub refresh_token: Option<String>,
    /// Expiry as epoch milliseconds.
    pub token_expires_at: Option<i64>,
    /// Whether a session was active when persisted.
    pub is_authenticated: bool,
}

impl PersistedSession {
    /// Reconstructs the in-memory session, if one was persisted.
    ///
    /// Returns `None` when the persisted state was anonymous or is
    /// missing any of the required credentials.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        if !self.is_authenticated {
            return None;
        }
        Some(Session {
            user: self.user?,
            access_token: self.access_token?,
            id_token: self.id_token?,
            refresh_token: self.refresh_token?,
            expires_at: self
                .token_expires_at
                .and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    }
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            user: Some(session.user.clone()),
            access_token: Some(session.access_token.clone()),
            id_token: Some(session.id_token.clone()),
            refresh_token: Some(session.refresh_token.clone()),
            token_expires_at: session.expires_at.map(|t| t.timestamp_millis()),
            is_authenticated: true,
        }
    }
}
