//! Test doubles shared by the unit tests in this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, Notify, RwLock};
use writeflow_domain::{AuthError, PersistedSession, Session, User};

use crate::ports::{
    Clock, HttpTransport, IdentityProvider, LoginTokens, RefreshedTokens, SessionStorage,
    StorageError, TransportError, TransportRequest, TransportResponse,
};

/// A clock that only moves when told to.
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// In-memory stand-in for the durable session store.
#[derive(Default)]
pub struct MemoryStorage {
    saved: RwLock<Option<PersistedSession>>,
}

impl MemoryStorage {
    pub async fn saved(&self) -> Option<PersistedSession> {
        self.saved.read().await.clone()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        Ok(self.saved.read().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        *self.saved.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.saved.write().await = None;
        Ok(())
    }
}

/// Scripted identity provider that counts refresh calls.
///
/// When `gate` is armed, an in-flight refresh parks on the notify until
/// the test releases it, so concurrent callers can pile up
/// deterministically.
pub struct StubIdentity {
    refresh_outcome: Mutex<Result<RefreshedTokens, AuthError>>,
    refresh_calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl StubIdentity {
    pub fn refreshing_ok(tokens: RefreshedTokens) -> Self {
        Self {
            refresh_outcome: Mutex::new(Ok(tokens)),
            refresh_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn refreshing_err(error: AuthError) -> Self {
        Self {
            refresh_outcome: Mutex::new(Err(error)),
            refresh_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn login(&self, _email: &str, _password: &str) -> Result<LoginTokens, AuthError> {
        unimplemented!("not exercised by these tests")
    }

    async fn register(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn confirm(&self, _email: &str, _code: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn resend_code(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn forgot_password(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn reset_password(
        &self,
        _email: &str,
        _code: &str,
        _new_password: &str,
    ) -> Result<(), AuthError> {
        Ok(())
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshedTokens, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.refresh_outcome.lock().await.clone()
    }
}

/// Transport that replays a scripted list of responses and records every
/// request it saw.
pub struct ScriptedTransport {
    responses: Mutex<Vec<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<TransportResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(status: u16, body: &str) -> Self {
        Self::new(vec![Ok(TransportResponse {
            status,
            body: body.as_bytes().to_vec(),
        })])
    }

    pub async fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().await.push(request);
        let mut responses = self.responses.lock().await;
        assert!(!responses.is_empty(), "transport ran out of scripted responses");
        responses.remove(0)
    }
}

/// A session fixture with fixed credentials.
pub fn test_session(expires_at: Option<DateTime<Utc>>) -> Session {
    Session {
        user: User {
            id: "user-1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        },
        access_token: "access-1".to_string(),
        id_token: "id-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at,
    }
}
