//! Savegame slots stored as JSON files.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use webstory_core::error::DomainError;
use webstory_core::snapshot::SnapshotStore;

/// File-backed snapshot store: one pretty-printed JSON file per slot,
/// `<directory>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    directory: PathBuf,
}

impl JsonFileSnapshotStore {
    /// Creates a store rooted at `directory`. The directory is created on the
    /// first save.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, DomainError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(DomainError::Validation(format!(
                "invalid savegame slot name '{key}'"
            )));
        }
        Ok(self.directory.join(format!("{key}.json")))
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, DomainError> {
        let path = self.slot_path(key)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Infrastructure(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };
        let value = serde_json::from_str(&contents).map_err(|e| {
            DomainError::Infrastructure(format!("corrupt savegame {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "savegame slot loaded");
        Ok(Some(value))
    }

    async fn save(&self, key: &str, snapshot: serde_json::Value) -> Result<(), DomainError> {
        let path = self.slot_path(key)?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| {
                DomainError::Infrastructure(format!(
                    "cannot create {}: {e}",
                    self.directory.display()
                ))
            })?;
        let contents = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            DomainError::Infrastructure(format!("snapshot serialization failed: {e}"))
        })?;
        tokio::fs::write(&path, contents).await.map_err(|e| {
            DomainError::Infrastructure(format!("cannot write {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "savegame slot written");
        Ok(())
    }
}
