//! File-based session storage.
//!
//! The session is stored as JSON, by default under the user config
//! directory (`~/.config/writeflow/session.json` on Linux). Only the
//! fields needed to resume a session are written; see
//! [`PersistedSession`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use writeflow_application::ports::{SessionStorage, StorageError};
use writeflow_domain::PersistedSession;

/// File-backed implementation of the `SessionStorage` port.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store over the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional per-user session file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("writeflow").join("session.json"))
    }

    /// The path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for FileSessionStore {
    async fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let session = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Some(session))
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use writeflow_domain::User;

    fn persisted() -> PersistedSession {
        PersistedSession {
            user: Some(User {
                id: "user-1".to_string(),
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
            }),
            access_token: Some("access".to_string()),
            id_token: Some("id".to_string()),
            refresh_token: Some("refresh".to_string()),
            token_expires_at: Some(1_900_000_000_000),
            is_authenticated: true,
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store.save(&persisted()).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, Some(persisted()));
    }

    #[tokio::test]
    async fn load_of_a_missing_file_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("missing.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_removes_the_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store.save(&persisted()).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        store.save(&persisted()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn corrupt_files_report_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let store = FileSessionStore::new(path);
        assert!(matches!(
            store.load().await,
            Err(StorageError::Serialization(_))
        ));
    }
}
