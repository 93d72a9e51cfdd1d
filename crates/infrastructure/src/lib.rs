//! WriteFlow Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer: reqwest-backed HTTP transport and identity
//! endpoints, file-based session persistence, and the system clock.

pub mod adapters;
pub mod auth;
pub mod http;
pub mod persistence;

pub use adapters::SystemClock;
pub use auth::HttpIdentityProvider;
pub use http::ReqwestTransport;
pub use persistence::FileSessionStore;
