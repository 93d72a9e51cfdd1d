//! Durable session persistence.

mod session_repository;

pub use session_repository::FileSessionStore;
