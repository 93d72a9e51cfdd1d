//! WriteFlow Application - Session and request coordination
//!
//! This crate owns the token lifecycle: the session store, the
//! single-flight refresh coordinator, the proactive refresh scheduler,
//! and the authenticating request client. External concerns (HTTP,
//! identity endpoints, durable storage, wall-clock time) are reached
//! through ports implemented in the infrastructure layer.

pub mod api;
pub mod error;
pub mod ports;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ListPostsQuery, PostsApi};
pub use error::{ApiError, ApiResult};
pub use session::{
    REFRESH_BUFFER_MS, RefreshCoordinator, RefreshScheduler, SchedulerState, SessionEvent,
    SessionManager, SessionSnapshot, SessionStore,
};
