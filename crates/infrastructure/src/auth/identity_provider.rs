//! `IdentityProvider` implementation over the backend `/auth` endpoints.
//!
//! The backend fronts Cognito; this adapter never talks to Cognito
//! directly. It deliberately uses its own plain reqwest client rather
//! than the authenticated `ApiClient`: the refresh call must not run
//! through the 401-retry policy it exists to serve.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;
use writeflow_application::ports::{IdentityProvider, LoginTokens, RefreshedTokens};
use writeflow_domain::AuthError;

/// Request timeout for auth calls.
const AUTH_TIMEOUT: Duration = Duration::from_secs(30);

/// Login response payload (after envelope unwrapping).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Refresh response payload (after envelope unwrapping).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Identity provider backed by the WriteFlow auth endpoints.
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpIdentityProvider {
    /// Creates a provider against the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Network`] if the base URL is invalid or the
    /// client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        Url::parse(base_url).map_err(|e| AuthError::Network(format!("invalid base URL: {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("WriteFlow/", env!("CARGO_PKG_VERSION")))
            .timeout(AUTH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Adds an `x-api-key` header to every auth call.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// POSTs a JSON body and returns the status plus the parsed body
    /// (`Value::Null` for empty or non-JSON bodies).
    async fn post(&self, path: &str, body: &Value) -> Result<(u16, Value), AuthError> {
        let mut builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("x-api-key", api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok((status, value))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn login(&self, email: &str, password: &str) -> Result<LoginTokens, AuthError> {
        let (status, body) = self
            .post("/auth/login", &json!({ "email": email, "password": password }))
            .await?;

        if !is_success(status) {
            let message = error_message(&body);
            if message.to_lowercase().contains("not confirmed") {
                return Err(AuthError::NotConfirmed);
            }
            if status == 401 {
                return Err(AuthError::InvalidCredentials);
            }
            return Err(AuthError::Rejected { status, message });
        }

        let tokens: LoginResponse = parse_data(body)?;
        Ok(LoginTokens {
            id_token: tokens
                .id_token
                .unwrap_or_else(|| tokens.access_token.clone()),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        })
    }

    async fn register(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let (status, body) = self
            .post(
                "/auth/register",
                &json!({ "email": email, "password": password }),
            )
            .await?;
        check_ok(status, &body)
    }

    async fn confirm(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let (status, body) = self
            .post("/auth/confirm", &json!({ "email": email, "code": code }))
            .await?;
        check_ok(status, &body)
    }

    async fn resend_code(&self, email: &str) -> Result<(), AuthError> {
        let (status, body) = self
            .post("/auth/resend-code", &json!({ "email": email }))
            .await?;
        check_ok(status, &body)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let (status, body) = self
            .post("/auth/forgot-password", &json!({ "email": email }))
            .await?;
        check_ok(status, &body)
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let (status, body) = self
            .post(
                "/auth/reset-password",
                &json!({ "email": email, "code": code, "newPassword": new_password }),
            )
            .await?;
        check_ok(status, &body)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, AuthError> {
        let (status, body) = self
            .post("/auth/refresh", &json!({ "refreshToken": refresh_token }))
            .await?;

        if !is_success(status) {
            return Err(AuthError::RefreshRejected(error_message(&body)));
        }

        let tokens: RefreshResponse = parse_data(body)?;
        Ok(RefreshedTokens {
            access_token: tokens.access_token,
            id_token: tokens.id_token,
            expires_in: tokens.expires_in,
        })
    }
}

const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Registration-style endpoints: 403 means signup is disabled on this
/// deployment.
fn check_ok(status: u16, body: &Value) -> Result<(), AuthError> {
    if is_success(status) {
        return Ok(());
    }
    if status == 403 {
        return Err(AuthError::RegistrationDisabled);
    }
    Err(AuthError::Rejected {
        status,
        message: error_message(body),
    })
}

fn error_message(body: &Value) -> String {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("authentication request failed")
        .to_string()
}

/// Unwraps `{ success, data }` and deserializes the payload; tolerates
/// unwrapped bodies for compatibility.
fn parse_data<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, AuthError> {
    let data = match &body {
        Value::Object(map) if map.contains_key("data") && !map["data"].is_null() => {
            map["data"].clone()
        }
        _ => body,
    };
    serde_json::from_value(data)
        .map_err(|e| AuthError::Network(format!("unexpected auth response shape: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_enveloped_token_payloads() {
        let body = json!({
            "success": true,
            "data": {
                "accessToken": "a",
                "idToken": "b",
                "refreshToken": "c",
                "expiresIn": 3600
            }
        });
        let tokens: LoginResponse = parse_data(body).unwrap();
        assert_eq!(tokens.access_token, "a");
        assert_eq!(tokens.id_token.as_deref(), Some("b"));
        assert_eq!(tokens.expires_in, Some(3600));
    }

    #[test]
    fn parses_bare_token_payloads() {
        let body = json!({ "accessToken": "a", "expiresIn": 900 });
        let tokens: RefreshResponse = parse_data(body).unwrap();
        assert_eq!(tokens.access_token, "a");
        assert_eq!(tokens.id_token, None);
    }

    #[test]
    fn error_messages_fall_back_to_a_generic_string() {
        assert_eq!(error_message(&json!({ "error": "nope" })), "nope");
        assert_eq!(error_message(&json!({ "message": "hm" })), "hm");
        assert_eq!(error_message(&Value::Null), "authentication request failed");
    }

    #[test]
    fn forbidden_registration_maps_to_a_dedicated_error() {
        assert!(matches!(
            check_ok(403, &Value::Null),
            Err(AuthError::RegistrationDisabled)
        ));
        assert!(check_ok(200, &Value::Null).is_ok());
    }
}
