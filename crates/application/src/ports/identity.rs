//! Identity provider port.
//!
//! The backend fronts Cognito behind a handful of `/auth` endpoints;
//! this port captures the slice of that surface the session lifecycle
//! needs. The refresh coordinator only ever calls [`IdentityProvider::refresh`].

use async_trait::async_trait;
use writeflow_domain::AuthError;

/// Tokens minted by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTokens {
    /// Short-lived access token.
    pub access_token: String,
    /// Identity token; carries the user claims.
    pub id_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Token lifetime in seconds, when reported.
    pub expires_in: Option<u64>,
}

/// Tokens minted by a refresh. The refresh token itself is not rotated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    /// The new access token.
    pub access_token: String,
    /// The new ID token, when the server rotates it.
    pub id_token: Option<String>,
    /// Token lifetime in seconds, when reported.
    pub expires_in: Option<u64>,
}

/// Port for the backend's authentication endpoints.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticates with email and password.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] for a rejected pair,
    /// [`AuthError::NotConfirmed`] when the account still needs its
    /// confirmation code, [`AuthError::Network`] when the endpoint was
    /// unreachable.
    async fn login(&self, email: &str, password: &str) -> Result<LoginTokens, AuthError>;

    /// Registers a new account; a confirmation code is emailed.
    ///
    /// # Errors
    ///
    /// [`AuthError::RegistrationDisabled`] when self-service signup is
    /// off, otherwise the generic auth failures.
    async fn register(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Confirms a registration with the emailed code.
    ///
    /// # Errors
    ///
    /// [`AuthError::Rejected`] with the backend's message for a wrong
    /// or expired code.
    async fn confirm(&self, email: &str, code: &str) -> Result<(), AuthError>;

    /// Re-sends the confirmation code.
    ///
    /// # Errors
    ///
    /// The generic auth failures.
    async fn resend_code(&self, email: &str) -> Result<(), AuthError>;

    /// Starts a password reset; a reset code is emailed. Succeeds even
    /// for unknown emails so account existence is not leaked.
    ///
    /// # Errors
    ///
    /// The generic auth failures.
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// Completes a password reset with the emailed code.
    ///
    /// # Errors
    ///
    /// [`AuthError::Rejected`] with the backend's message for a wrong or
    /// expired code.
    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Exchanges a refresh token for fresh access/ID tokens.
    ///
    /// # Errors
    ///
    /// [`AuthError::RefreshRejected`] for an invalid or expired refresh
    /// token, [`AuthError::Network`] for transport failures. Either way
    /// the caller treats it as fatal to the session.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, AuthError>;
}
