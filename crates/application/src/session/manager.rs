//! Session manager: the one object that owns the auth lifecycle.
//!
//! Constructed once at startup and passed by reference (or cloned; all
//! state is shared) to whatever needs it: the API client, the proactive
//! scheduler, the UI. Replaces the "global auth store" pattern with an
//! explicit instance.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use writeflow_domain::{AuthError, Session, User, decode_claims, token_expiry};

use crate::ports::{Clock, IdentityProvider, LoginTokens};
use crate::session::{RefreshCoordinator, SessionStore};

/// A read-only view of the current session for display purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The authenticated user.
    pub user: User,
    /// When the tokens expire, if known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the tokens have already expired.
    pub is_expired: bool,
}

/// Owns the session store, the refresh coordinator and the identity
/// endpoints, and exposes the login/logout flows.
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    identity: Arc<dyn IdentityProvider>,
    refresher: Arc<RefreshCoordinator>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Wires a manager over the given ports.
    pub fn new(
        store: SessionStore,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let refresher = Arc::new(RefreshCoordinator::new(store.clone(), identity.clone()));
        Self {
            store,
            identity,
            refresher,
            clock,
        }
    }

    /// The shared session store.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The shared refresh coordinator.
    #[must_use]
    pub fn refresher(&self) -> Arc<RefreshCoordinator> {
        self.refresher.clone()
    }

    /// Restores a previously persisted session. Call once at startup.
    pub async fn resume(&self) -> Option<User> {
        self.store.resume().await
    }

    /// Logs in and populates the session.
    ///
    /// The user identity is read from the ID token claims (`sub`,
    /// `email`, `name`), falling back to the login email. The expiry
    /// comes from the access token's `exp` claim or the server's
    /// `expires_in`.
    ///
    /// # Errors
    ///
    /// Propagates the identity provider's [`AuthError`]; the session
    /// state is untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let tokens = self.identity.login(email, password).await?;
        let session = self.session_from_login(email, tokens);
        let user = session.user.clone();
        self.store.set_session(session).await;
        tracing::info!(user = %user.email, "logged in");
        Ok(user)
    }

    /// Registers a new account; the user must then [`Self::confirm`].
    ///
    /// # Errors
    ///
    /// Propagates the identity provider's [`AuthError`].
    pub async fn register(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.identity.register(email, password).await
    }

    /// Confirms a registration with the emailed code.
    ///
    /// # Errors
    ///
    /// Propagates the identity provider's [`AuthError`].
    pub async fn confirm(&self, email: &str, code: &str) -> Result<(), AuthError> {
        self.identity.confirm(email, code).await
    }

    /// Re-sends the confirmation code.
    ///
    /// # Errors
    ///
    /// Propagates the identity provider's [`AuthError`].
    pub async fn resend_code(&self, email: &str) -> Result<(), AuthError> {
        self.identity.resend_code(email).await
    }

    /// Starts a password reset; a reset code is emailed.
    ///
    /// # Errors
    ///
    /// Propagates the identity provider's [`AuthError`].
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        self.identity.forgot_password(email).await
    }

    /// Completes a password reset with the emailed code. Does not log
    /// the user in; existing sessions elsewhere stay valid until their
    /// tokens expire.
    ///
    /// # Errors
    ///
    /// Propagates the identity provider's [`AuthError`].
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.identity.reset_password(email, code, new_password).await
    }

    /// Clears the session locally. Idempotent.
    pub async fn logout(&self) {
        self.store.clear().await;
        tracing::info!("logged out");
    }

    /// A display snapshot of the current session, if authenticated.
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let session = self.store.current().await?;
        let now = self.clock.now();
        Some(SessionSnapshot {
            is_expired: session.is_expired(now),
            expires_at: session.expires_at,
            user: session.user,
        })
    }

    fn session_from_login(&self, email: &str, tokens: LoginTokens) -> Session {
        let claims = decode_claims(&tokens.id_token).ok();
        let user = User {
            id: claims
                .as_ref()
                .and_then(|c| c.sub.clone())
                .unwrap_or_else(|| email.to_string()),
            email: claims
                .as_ref()
                .and_then(|c| c.email.clone())
                .unwrap_or_else(|| email.to_string()),
            name: claims
                .as_ref()
                .and_then(|c| c.name.clone().or_else(|| c.email.clone()))
                .unwrap_or_else(|| email.to_string()),
        };

        let expires_at = token_expiry(&tokens.access_token).or_else(|| {
            tokens
                .expires_in
                .and_then(|secs| i64::try_from(secs).ok())
                .map(|secs| self.clock.now() + Duration::seconds(secs))
        });

        Session {
            user,
            access_token: tokens.access_token,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
            expires_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::{RefreshedTokens, SessionStorage};
    use crate::testing::{ManualClock, MemoryStorage};
    use async_trait::async_trait;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct ResetLog {
        forgot: std::sync::atomic::AtomicUsize,
        reset: std::sync::atomic::AtomicUsize,
    }

    struct LoginIdentity {
        tokens: LoginTokens,
        resets: Arc<ResetLog>,
    }

    #[async_trait]
    impl IdentityProvider for LoginIdentity {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginTokens, AuthError> {
            Ok(self.tokens.clone())
        }

        async fn register(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
            Err(AuthError::RegistrationDisabled)
        }

        async fn confirm(&self, _email: &str, _code: &str) -> Result<(), AuthError> {
            Ok(())
        }

        async fn resend_code(&self, _email: &str) -> Result<(), AuthError> {
            Ok(())
        }

        async fn forgot_password(&self, _email: &str) -> Result<(), AuthError> {
            self.resets
                .forgot
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        async fn reset_password(
            &self,
            _email: &str,
            code: &str,
            _new_password: &str,
        ) -> Result<(), AuthError> {
            if code != "123456" {
                return Err(AuthError::Rejected {
                    status: 400,
                    message: "Invalid reset code".to_string(),
                });
            }
            self.resets
                .reset
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<RefreshedTokens, AuthError> {
            Err(AuthError::RefreshRejected("unused".to_string()))
        }
    }

    fn jwt(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.sig")
    }

    fn manager(tokens: LoginTokens, clock: Arc<ManualClock>) -> (SessionManager, SessionStore) {
        manager_with_resets(tokens, clock).0
    }

    fn manager_with_resets(
        tokens: LoginTokens,
        clock: Arc<ManualClock>,
    ) -> ((SessionManager, SessionStore), Arc<ResetLog>) {
        let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::default());
        let store = SessionStore::new(storage, clock.clone());
        let resets = Arc::new(ResetLog::default());
        let identity = Arc::new(LoginIdentity {
            tokens,
            resets: resets.clone(),
        });
        let manager = SessionManager::new(store.clone(), identity, clock);
        ((manager, store), resets)
    }

    #[tokio::test]
    async fn login_builds_the_user_from_id_token_claims() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let id_token = jwt(&serde_json::json!({
            "sub": "user-42",
            "email": "ada@example.com",
            "name": "Ada Lovelace",
        }));
        let access_token = jwt(&serde_json::json!({ "exp": 1_900_000_000 }));
        let (manager, store) = manager(
            LoginTokens {
                access_token,
                id_token,
                refresh_token: "refresh-1".to_string(),
                expires_in: None,
            },
            clock,
        );

        let user = manager.login("ada@example.com", "hunter2").await.unwrap();
        assert_eq!(user.id, "user-42");
        assert_eq!(user.name, "Ada Lovelace");

        let session = store.current().await.unwrap();
        assert_eq!(
            session.expires_at,
            DateTime::from_timestamp(1_900_000_000, 0)
        );
    }

    #[tokio::test]
    async fn login_falls_back_to_expires_in_for_opaque_tokens() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let (manager, store) = manager(
            LoginTokens {
                access_token: "opaque".to_string(),
                id_token: "also-opaque".to_string(),
                refresh_token: "refresh-1".to_string(),
                expires_in: Some(3600),
            },
            clock,
        );

        let user = manager.login("ada@example.com", "hunter2").await.unwrap();
        // No claims available at all: identity degrades to the email.
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.id, "ada@example.com");

        let session = store.current().await.unwrap();
        assert_eq!(session.expires_at, Some(now + Duration::seconds(3600)));
    }

    #[tokio::test]
    async fn logout_then_snapshot_is_none() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (manager, _) = manager(
            LoginTokens {
                access_token: "a".to_string(),
                id_token: "b".to_string(),
                refresh_token: "c".to_string(),
                expires_in: Some(60),
            },
            clock,
        );

        manager.login("ada@example.com", "pw").await.unwrap();
        assert!(manager.snapshot().await.is_some());

        manager.logout().await;
        manager.logout().await;
        assert_eq!(manager.snapshot().await, None);
    }

    #[tokio::test]
    async fn password_reset_flow_reaches_the_identity_endpoints() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let ((manager, store), resets) = manager_with_resets(
            LoginTokens {
                access_token: "a".to_string(),
                id_token: "b".to_string(),
                refresh_token: "c".to_string(),
                expires_in: Some(60),
            },
            clock,
        );

        manager.forgot_password("ada@example.com").await.unwrap();
        assert_eq!(resets.forgot.load(std::sync::atomic::Ordering::SeqCst), 1);

        let rejected = manager
            .reset_password("ada@example.com", "000000", "n3w-pass")
            .await;
        assert!(matches!(rejected, Err(AuthError::Rejected { status: 400, .. })));

        manager
            .reset_password("ada@example.com", "123456", "n3w-pass")
            .await
            .unwrap();
        assert_eq!(resets.reset.load(std::sync::atomic::Ordering::SeqCst), 1);
        // Resetting a password does not create a session.
        assert!(!store.is_authenticated().await);
    }
}
