//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod identity;
mod storage;
mod transport;

pub use clock::Clock;
pub use identity::{IdentityProvider, LoginTokens, RefreshedTokens};
pub use storage::{SessionStorage, StorageError};
pub use transport::{HttpTransport, Method, TransportError, TransportRequest, TransportResponse};
