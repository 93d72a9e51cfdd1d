//! Wall-clock adapter for the `Clock` port.

use chrono::{DateTime, Utc};
use writeflow_application::ports::Clock;

/// Clock backed by the system time. Expiry math and refresh scheduling
/// take a [`Clock`] so tests can freeze time; production wiring uses this.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_tracks_wall_clock_time() {
        let clock = SystemClock::new();
        let before = Utc::now();
        assert!(clock.now() >= before);
    }
}
