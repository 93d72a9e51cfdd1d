//! In-memory session store with durable write-through.
//!
//! Single source of truth for the current [`Session`]. Every mutation is
//! written through to the [`SessionStorage`] port so a restart resumes
//! the session; a persistence failure is logged and does not fail the
//! mutation, since the in-memory state remains authoritative for the
//! running process.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;
use writeflow_domain::{PersistedSession, Session, TokenUpdate, User};

use crate::ports::{Clock, SessionStorage};

/// Thread-safe store for the current session.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Creates an empty (anonymous) store.
    pub fn new(storage: Arc<dyn SessionStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            storage,
            clock,
        }
    }

    /// Restores the session persisted by a previous run, if any.
    ///
    /// Call once at startup, before the store is shared. Unreadable
    /// persisted state is treated as anonymous.
    pub async fn resume(&self) -> Option<User> {
        let persisted = match self.storage.load().await {
            Ok(persisted) => persisted?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load persisted session");
                return None;
            }
        };
        let session = persisted.into_session()?;
        let user = session.user.clone();
        *self.session.write().await = Some(session);
        Some(user)
    }

    /// A clone of the current session, if authenticated.
    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// The current user, if authenticated.
    pub async fn user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    /// The current ID token, used as the bearer credential.
    pub async fn id_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.id_token.clone())
    }

    /// The current refresh token.
    pub async fn refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
    }

    /// Whether a session is present.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// True if there is no session or it has expired.
    pub async fn is_expired(&self) -> bool {
        let now = self.clock.now();
        self.session
            .read()
            .await
            .as_ref()
            .is_none_or(|s| s.is_expired(now))
    }

    /// Time until expiry: `None` without a session (or a known expiry),
    /// negative once expired.
    pub async fn time_until_expiry(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.time_until_expiry(now))
    }

    /// Replaces the session after login or registration confirmation.
    pub async fn set_session(&self, session: Session) {
        let persisted = PersistedSession::from(&session);
        *self.session.write().await = Some(session);
        self.persist(&persisted).await;
    }

    /// Applies refreshed tokens to the current session.
    ///
    /// A no-op when anonymous; a stale refresh landing after logout must
    /// not resurrect the session.
    pub async fn update_tokens(&self, update: TokenUpdate) {
        let now = self.clock.now();
        let persisted = {
            let mut guard = self.session.write().await;
            let Some(session) = guard.as_mut() else {
                return;
            };
            session.apply_update(update, now);
            PersistedSession::from(&*session)
        };
        self.persist(&persisted).await;
    }

    /// Clears the session (logout). Idempotent.
    pub async fn clear(&self) {
        *self.session.write().await = None;
        if let Err(e) = self.storage.clear().await {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
    }

    async fn persist(&self, persisted: &PersistedSession) {
        if let Err(e) = self.storage.save(persisted).await {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }
}
