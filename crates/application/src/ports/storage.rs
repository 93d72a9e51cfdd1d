//! Session persistence port.

use async_trait::async_trait;
use thiserror::Error;
use writeflow_domain::PersistedSession;

/// Errors from the durable session store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O failure while reading or writing the session file.
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted session could not be (de)serialized.
    #[error("session serialization error: {0}")]
    Serialization(String),
}

/// Port for persisting the session across restarts.
///
/// Written on every session mutation so a process restart resumes the
/// session without forcing a new login.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Loads the persisted session, `None` when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read or parsed.
    async fn load(&self) -> Result<Option<PersistedSession>, StorageError>;

    /// Saves the session, replacing any previous state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized or written.
    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;

    /// Removes any persisted session. A no-op when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared.
    async fn clear(&self) -> Result<(), StorageError>;
}
