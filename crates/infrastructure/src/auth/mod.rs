//! Identity provider adapter for the backend's `/auth` endpoints.

mod identity_provider;

pub use identity_provider::HttpIdentityProvider;
