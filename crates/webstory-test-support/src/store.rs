//! Test snapshot stores — mock `SnapshotStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use webstory_core::error::DomainError;
use webstory_core::snapshot::SnapshotStore;

/// A snapshot store backed by a map. Saves always succeed.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    slots: Mutex<HashMap<String, serde_json::Value>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one pre-populated slot.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_slot(key: &str, snapshot: serde_json::Value) -> Self {
        let store = Self::default();
        store
            .slots
            .lock()
            .unwrap()
            .insert(key.to_owned(), snapshot);
        store
    }

    /// Returns the raw value stored under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn slot(&self, key: &str) -> Option<serde_json::Value> {
        self.slots.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, DomainError> {
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, key: &str, snapshot: serde_json::Value) -> Result<(), DomainError> {
        self.slots.lock().unwrap().insert(key.to_owned(), snapshot);
        Ok(())
    }
}

/// A snapshot store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingSnapshotStore;

#[async_trait]
impl SnapshotStore for FailingSnapshotStore {
    async fn load(&self, _key: &str) -> Result<Option<serde_json::Value>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn save(&self, _key: &str, _snapshot: serde_json::Value) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
