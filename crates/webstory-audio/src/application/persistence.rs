//! Savegame handlers for the audio asset context.
//!
//! These functions orchestrate capture and restore against a snapshot store:
//! capture the logical state, serialize it under its asset-type tag, and
//! write it to a slot; or read a slot back and restore from it.

use tracing::{info, instrument};
use uuid::Uuid;
use webstory_core::error::DomainError;
use webstory_core::snapshot::SnapshotStore;

use crate::domain::asset::AudioAsset;
use crate::domain::snapshot::AudioSnapshot;

/// Captures the asset state and writes it to `key`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if serialization or the store write
/// fails.
#[instrument(skip(asset, store), fields(asset = %asset.name()))]
pub async fn save_asset(
    asset: &mut AudioAsset,
    key: &str,
    store: &dyn SnapshotStore,
    correlation_id: Uuid,
) -> Result<AudioSnapshot, DomainError> {
    let snapshot = asset.capture(correlation_id);
    store.save(key, snapshot.to_value()?).await?;
    info!(is_playing = snapshot.is_playing, "asset state saved");
    Ok(snapshot)
}

/// Reads the snapshot stored under `key` and restores the asset from it.
///
/// # Errors
///
/// Returns `DomainError::SnapshotNotFound` if nothing is stored under `key`,
/// `DomainError::SnapshotTypeMismatch` if the slot holds another asset type,
/// and `DomainError::Infrastructure` if the store read or deserialization
/// fails. The asset is left untouched on error.
#[instrument(skip(asset, store), fields(asset = %asset.name()))]
pub async fn load_asset(
    asset: &mut AudioAsset,
    key: &str,
    store: &dyn SnapshotStore,
    correlation_id: Uuid,
) -> Result<AudioSnapshot, DomainError> {
    let value = store
        .load(key)
        .await?
        .ok_or_else(|| DomainError::SnapshotNotFound(key.to_owned()))?;
    let snapshot = AudioSnapshot::from_value(value)?;
    asset.restore(&snapshot, correlation_id);
    info!(is_playing = snapshot.is_playing, "asset state loaded");
    Ok(snapshot)
}
