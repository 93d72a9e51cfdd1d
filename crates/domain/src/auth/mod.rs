//! Authentication domain types
//!
//! Sessions, token claims and the auth error taxonomy. These types carry
//! no I/O; expiry math takes `now` as a parameter so callers can inject
//! a clock.

mod claims;
pub mod error;
mod session;

pub use claims::{TokenClaims, decode_claims, token_expiry};
pub use session::{PersistedSession, Session, TokenUpdate, User};
