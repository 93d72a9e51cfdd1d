//! Proactive token renewal.
//!
//! A background task renews the session shortly before it expires so
//! requests never see a stale token in the happy path. Renewal is
//! delegated to the [`RefreshCoordinator`], which also serializes it
//! against any reactive (401-triggered) refresh happening at the same
//! time.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::session::{RefreshCoordinator, SessionStore};

/// How long before actual expiry a renewal is attempted: 5 minutes, so
/// a token with a 60-minute lifetime is renewed at the 55-minute mark.
pub const REFRESH_BUFFER_MS: i64 = 5 * 60 * 1000;

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Not authenticated, or stopped after a failed renewal.
    #[default]
    Idle,
    /// A renewal timer is armed.
    Scheduled,
    /// Waiting on the refresh coordinator.
    Refreshing,
}

/// Events the scheduler reports to whoever owns the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session could not be renewed; the user must log in again.
    Expired,
}

/// Handle to the background renewal task.
///
/// Dropping the handle (or calling [`RefreshScheduler::stop`]) aborts
/// the task, so no timer fires after teardown.
pub struct RefreshScheduler {
    handle: JoinHandle<()>,
    state: watch::Receiver<SchedulerState>,
}

impl RefreshScheduler {
    /// Starts the renewal loop with the default 5-minute buffer.
    #[must_use]
    pub fn start(
        store: SessionStore,
        coordinator: Arc<RefreshCoordinator>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self::start_with_buffer(store, coordinator, events, REFRESH_BUFFER_MS)
    }

    /// Starts the renewal loop with a custom buffer (tests use tiny ones).
    #[must_use]
    pub fn start_with_buffer(
        store: SessionStore,
        coordinator: Arc<RefreshCoordinator>,
        events: mpsc::Sender<SessionEvent>,
        buffer_ms: i64,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(SchedulerState::default());
        let handle = tokio::spawn(Self::run(store, coordinator, events, buffer_ms, state_tx));
        Self {
            handle,
            state: state_rx,
        }
    }

    /// The current scheduler state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Stops the scheduler, cancelling any pending timer.
    pub fn stop(self) {
        self.handle.abort();
    }

    async fn run(
        store: SessionStore,
        coordinator: Arc<RefreshCoordinator>,
        events: mpsc::Sender<SessionEvent>,
        buffer_ms: i64,
        state: watch::Sender<SchedulerState>,
    ) {
        loop {
            // Always read the live expiry: a reactive refresh may have
            // moved it since the last iteration.
            let Some(remaining) = store.time_until_expiry().await else {
                let _ = state.send(SchedulerState::Idle);
                return;
            };

            if let Some(delay) = renewal_delay(remaining.num_milliseconds(), buffer_ms) {
                let _ = state.send(SchedulerState::Scheduled);
                tracing::debug!(?delay, "renewal timer armed");
                tokio::time::sleep(delay).await;
            }

            // An explicit logout while the timer was armed is not an
            // expiry: stand down without refreshing or reporting.
            if !store.is_authenticated().await {
                let _ = state.send(SchedulerState::Idle);
                return;
            }

            let _ = state.send(SchedulerState::Refreshing);
            if coordinator.refresh().await {
                continue;
            }

            // Coordinator already cleared the session.
            let _ = state.send(SchedulerState::Idle);
            let _ = events.send(SessionEvent::Expired).await;
            return;
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Delay before the next renewal attempt, or `None` when the buffer is
/// already consumed and the renewal should run immediately.
#[must_use]
pub fn renewal_delay(remaining_ms: i64, buffer_ms: i64) -> Option<std::time::Duration> {
    let delay_ms = remaining_ms - buffer_ms;
    u64::try_from(delay_ms)
        .ok()
        .filter(|&ms| ms > 0)
        .map(std::time::Duration::from_millis)
}
