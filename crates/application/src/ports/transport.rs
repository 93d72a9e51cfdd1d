//! Plain HTTP transport port.
//!
//! The transport knows how to move a request to the backend and bring a
//! response back, nothing more. Authentication, retry and envelope
//! handling are layered on top by [`crate::ApiClient`], which keeps
//! that policy unit-testable against a scripted transport.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// HTTP methods used by the WriteFlow backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP PATCH
    Patch,
    /// HTTP DELETE
    Delete,
}

impl Method {
    /// The method name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// A request as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Endpoint path relative to the API base URL, query string included.
    pub path: String,
    /// Extra headers, e.g. `Authorization` or `x-api-key`.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

/// A raw response from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body; may be empty.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failures (the request never got a response).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Anything else reqwest or the OS reported.
    #[error("{0}")]
    Other(String),
}

/// Port for sending HTTP requests to the backend.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and returns the raw response.
    ///
    /// Non-2xx statuses are *not* errors at this layer; they come back
    /// as a normal [`TransportResponse`] for the client to interpret.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] only when no response was produced.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
