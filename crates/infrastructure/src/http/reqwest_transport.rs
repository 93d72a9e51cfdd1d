//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It only moves
//! bytes; all auth/retry/envelope policy lives in the application
//! layer's client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;
use writeflow_application::ports::{
    HttpTransport, Method, TransportError, TransportRequest, TransportResponse,
};

/// Request timeout for API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `HttpTransport` implementation backed by `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport against the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        // Validate eagerly so a bad WRITEFLOW_API_URL fails at startup,
        // not on the first request.
        Url::parse(base_url).map_err(|e| TransportError::Other(format!("invalid base URL: {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("WriteFlow/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a transport with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    const fn to_reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn map_error(error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout;
        }
        if error.is_connect() {
            return TransportError::Connect(error.to_string());
        }
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::trace!(method = request.method.as_str(), url, "sending request");
        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e))?
            .to_vec();

        tracing::trace!(status, bytes = body.len(), "received response");
        Ok(TransportResponse { status, body })
    }
}
