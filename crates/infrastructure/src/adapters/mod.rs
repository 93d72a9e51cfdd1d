//! Small adapters for the application-layer ports.

mod system_clock;

pub use system_clock::SystemClock;
