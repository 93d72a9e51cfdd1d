//! Authenticated request client.
//!
//! Decorates a plain [`HttpTransport`] with the auth policy: attach the
//! bearer token, recover once from an expired access token via the
//! refresh coordinator, unwrap the backend's response envelope. The
//! policy layer never touches a socket, so it is tested against a
//! scripted transport.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::ports::{HttpTransport, Method, TransportRequest, TransportResponse};
use crate::session::{RefreshCoordinator, SessionStore};

/// HTTP client with automatic token handling.
///
/// Cheap to clone; clones share the transport, store and coordinator.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    store: SessionStore,
    refresher: Arc<RefreshCoordinator>,
    api_key: Option<String>,
}

impl ApiClient {
    /// Creates a client over the given transport and session machinery.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: SessionStore,
        refresher: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            store,
            refresher,
            api_key: None,
        }
    }

    /// Adds an `x-api-key` header to every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Authenticated GET.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::Get, path, None, false).await
    }

    /// Unauthenticated GET for public endpoints.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::Get, path, None, true).await
    }

    /// Authenticated POST with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Self::request`]; also [`ApiError::Decode`] if the body
    /// cannot be serialized.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        self.request(Method::Post, path, Some(to_value(body)?), false)
            .await
    }

    /// Authenticated PUT with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Self::post`].
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        self.request(Method::Put, path, Some(to_value(body)?), false)
            .await
    }

    /// Authenticated PATCH with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Self::post`].
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        self.request(Method::Patch, path, Some(to_value(body)?), false)
            .await
    }

    /// Authenticated DELETE.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::Delete, path, None, false).await
    }

    /// Issues a request with the full auth policy applied.
    ///
    /// Sequence: request, then on a 401 for an authenticated
    /// non-`/auth/` call, one refresh and at most one retry. A second
    /// 401 is terminal; there is deliberately no retry loop.
    ///
    /// # Errors
    ///
    /// [`ApiError::SessionExpired`] when a reactive refresh fails,
    /// [`ApiError::Status`] for any other non-2xx response,
    /// [`ApiError::Transport`]/[`ApiError::Decode`] for plumbing
    /// failures.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        skip_auth: bool,
    ) -> ApiResult<T> {
        let response = self.send_once(method, path, body.clone(), skip_auth).await?;

        let response = if response.status == 401 && refresh_retry_applies(skip_auth, path) {
            tracing::debug!(path, "got 401, attempting token refresh");
            if self.refresher.refresh().await {
                // Re-read the live store: the refresh just rewrote it.
                self.send_once(method, path, body, skip_auth).await?
            } else {
                return Err(ApiError::SessionExpired);
            }
        } else {
            response
        };

        decode_response(&response)
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        skip_auth: bool,
    ) -> ApiResult<TransportResponse> {
        let mut headers = Vec::new();
        if let Some(api_key) = &self.api_key {
            headers.push(("x-api-key".to_string(), api_key.clone()));
        }
        if !skip_auth
            && let Some(id_token) = self.store.id_token().await
        {
            headers.push(("Authorization".to_string(), format!("Bearer {id_token}")));
        }

        let response = self
            .transport
            .send(TransportRequest {
                method,
                path: path.to_string(),
                headers,
                body,
            })
            .await?;
        Ok(response)
    }
}

/// A 401 only triggers a refresh for calls that carried auth and are
/// not themselves auth endpoints (a 401 from `/auth/login` means bad
/// credentials, not a stale access token).
fn refresh_retry_applies(skip_auth: bool, path: &str) -> bool {
    !skip_auth && !path.starts_with("/auth/")
}

fn to_value(body: &impl Serialize) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decodes a response: 204 is an empty success, other 2xx bodies are
/// envelope-unwrapped, everything else becomes [`ApiError::Status`]
/// with the parsed payload.
fn decode_response<T: DeserializeOwned>(response: &TransportResponse) -> ApiResult<T> {
    if response.status == 204 {
        return serde_json::from_value(Value::Null)
            .map_err(|e| ApiError::Decode(format!("empty 204 response: {e}")));
    }

    if !response.is_success() {
        let payload: Option<Value> = serde_json::from_slice(&response.body).ok();
        let message = payload
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| format!("HTTP error {}", response.status));
        return Err(ApiError::Status {
            status: response.status,
            message,
            payload,
        });
    }

    let value: Value =
        serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
    serde_json::from_value(unwrap_envelope(value)).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pulls `data` out of `{ success, data }` wrappers; anything else is
/// passed through untouched.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(ref map) if map.contains_key("success") => match map.get("data") {
            Some(data) if !data.is_null() => data.clone(),
            // No data field (e.g. bare acknowledgements): keep the whole
            // object so callers can read `success`/`message`.
            _ => value,
        },
        other => other,
    }
}

fn error_message(payload: &Value) -> Option<String> {
    payload
        .get("error")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
