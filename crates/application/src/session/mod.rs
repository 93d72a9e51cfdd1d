//! Session lifecycle: store, refresh coordination, proactive scheduling.

mod manager;
mod refresh;
mod scheduler;
mod store;

pub use manager::{SessionManager, SessionSnapshot};
pub use refresh::RefreshCoordinator;
pub use scheduler::{REFRESH_BUFFER_MS, RefreshScheduler, SchedulerState, SessionEvent};
pub use store::SessionStore;
