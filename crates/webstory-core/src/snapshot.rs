//! Snapshot store abstraction.

use async_trait::async_trait;

use crate::error::DomainError;

/// Keyed storage for serialized asset snapshots (one savegame slot per key).
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been saved under the key.
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, DomainError>;

    /// Store `snapshot` under `key`, replacing any previous value.
    async fn save(&self, key: &str, snapshot: serde_json::Value) -> Result<(), DomainError>;
}
