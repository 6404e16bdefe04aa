//! Persisted audio state.
//!
//! A snapshot holds logical intent only: whether the asset should be playing,
//! which track is current, the fade settings, and a playhead position taken
//! while the track was actually sounding. Mid-fade volume is never saved.

use serde::{Deserialize, Serialize};
use webstory_core::error::DomainError;

/// Asset type discriminator written into every audio snapshot.
pub const AUDIO_ASSET_TYPE: &str = "Audio";

const ASSET_TYPE_FIELD: &str = "asset_type";

/// Savegame data of one audio asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSnapshot {
    /// Logical playing intent.
    pub is_playing: bool,
    /// Whether play/stop fade by default.
    pub fade: bool,
    /// Default fade-in duration in milliseconds.
    pub fade_in_ms: u64,
    /// Default fade-out duration in milliseconds.
    pub fade_out_ms: u64,
    /// Logical current track.
    pub current_track: Option<String>,
    /// Playhead position, `0.0` unless the track was sounding at capture.
    pub position_seconds: f64,
}

/// Tagged wrapper so a savegame can tell asset kinds apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "asset_type")]
enum AssetSnapshot {
    Audio(AudioSnapshot),
}

impl AudioSnapshot {
    /// Serializes the snapshot under its asset-type tag.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, DomainError> {
        serde_json::to_value(AssetSnapshot::Audio(self.clone()))
            .map_err(|e| DomainError::Infrastructure(format!("snapshot serialization failed: {e}")))
    }

    /// Reads a tagged snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SnapshotTypeMismatch` if the value belongs to
    /// another asset type, and `DomainError::Infrastructure` if it cannot be
    /// deserialized.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DomainError> {
        let found = value
            .get(ASSET_TYPE_FIELD)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        if found != AUDIO_ASSET_TYPE {
            return Err(DomainError::SnapshotTypeMismatch {
                expected: AUDIO_ASSET_TYPE.to_owned(),
                found: found.to_owned(),
            });
        }
        let AssetSnapshot::Audio(snapshot) = serde_json::from_value(value).map_err(|e| {
            DomainError::Infrastructure(format!("snapshot deserialization failed: {e}"))
        })?;
        Ok(snapshot)
    }
}
