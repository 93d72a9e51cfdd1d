//! Single-flight token refresh.
//!
//! At most one refresh network call is in flight at any time across the
//! process. Concurrent triggers (several 401s, the proactive timer
//! firing mid-request) collapse into one underlying call whose outcome
//! every waiter observes.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use writeflow_domain::TokenUpdate;

use crate::ports::IdentityProvider;
use crate::session::SessionStore;

/// Refresh state, guarded by a single mutex.
///
/// `InFlight` holds the receiving end of the outcome channel; late
/// callers subscribe to it instead of issuing their own network call.
enum RefreshState {
    Idle,
    InFlight(watch::Receiver<Option<bool>>),
}

/// Coordinates token renewal so that concurrent callers share one call.
pub struct RefreshCoordinator {
    store: SessionStore,
    identity: Arc<dyn IdentityProvider>,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    /// Creates a coordinator over the given store and identity endpoints.
    pub fn new(store: SessionStore, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            state: Mutex::new(RefreshState::Idle),
        }
    }

    /// Renews the session tokens, returning whether the session survived.
    ///
    /// - Joins the in-flight refresh when one exists, sharing its outcome.
    /// - Without a refresh token: logs out and returns `false`, no call.
    /// - On success: the store gets the new tokens and expiry, `true`.
    /// - On failure (rejected token, network error): the session is
    ///   cleared and the result is `false`. Hard failure, no retry here.
    pub async fn refresh(&self) -> bool {
        let outcome_tx = {
            let mut state = self.state.lock().await;
            match &*state {
                // Join the in-flight call. A dead channel means the
                // leader's future was dropped; fall through and take over.
                RefreshState::InFlight(rx) if rx.has_changed().is_ok() => {
                    let rx = rx.clone();
                    drop(state);
                    return Self::await_outcome(rx).await;
                }
                RefreshState::InFlight(_) | RefreshState::Idle => {
                    let (tx, rx) = watch::channel(None);
                    *state = RefreshState::InFlight(rx);
                    tx
                }
            }
        };

        let outcome = self.perform_refresh().await;

        *self.state.lock().await = RefreshState::Idle;
        // Waiters may already be gone; that's fine.
        let _ = outcome_tx.send(Some(outcome));
        outcome
    }

    /// True when no refresh is currently in flight.
    pub async fn is_idle(&self) -> bool {
        matches!(&*self.state.lock().await, RefreshState::Idle)
    }

    async fn await_outcome(mut rx: watch::Receiver<Option<bool>>) -> bool {
        loop {
            if let Some(outcome) = *rx.borrow() {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // Leader dropped without reporting; count it as failure.
                return false;
            }
        }
    }

    async fn perform_refresh(&self) -> bool {
        let Some(refresh_token) = self.store.refresh_token().await else {
            tracing::warn!("refresh requested without a refresh token, logging out");
            self.store.clear().await;
            return false;
        };

        match self.identity.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.store
                    .update_tokens(TokenUpdate {
                        access_token: tokens.access_token,
                        id_token: tokens.id_token,
                        expires_in: tokens.expires_in,
                    })
                    .await;
                tracing::debug!("session tokens refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, logging out");
                self.store.clear().await;
                false
            }
        }
    }
}
