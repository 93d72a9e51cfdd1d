//! WriteFlow Domain - Core business types
//!
//! This crate defines the domain model for the WriteFlow client.
//! All types here are pure Rust with no I/O dependencies.

pub mod api;
pub mod auth;
pub mod error;
pub mod post;

pub use api::Acknowledgement;
pub use auth::{
    PersistedSession, Session, TokenClaims, TokenUpdate, User, decode_claims, token_expiry,
};
pub use auth::error::AuthError;
pub use error::{DomainError, DomainResult};
pub use post::{CreatePostRequest, Post, PostList, PostStatus, UpdatePostRequest, slugify};
