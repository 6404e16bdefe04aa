//! Notifications published by audio assets.

use serde::{Deserialize, Serialize};
use webstory_core::event::{DomainEvent, EventMetadata};

/// Event type identifier for [`AssetConstructed`].
pub const AUDIO_CONSTRUCTED_EVENT_TYPE: &str = "audio.constructed";

/// Event type identifier for [`PlayRequested`].
pub const AUDIO_PLAY_EVENT_TYPE: &str = "audio.play";

/// Event type identifier for [`StopRequested`].
pub const AUDIO_STOP_EVENT_TYPE: &str = "audio.stop";

/// Event type identifier for [`PauseRequested`].
pub const AUDIO_PAUSED_EVENT_TYPE: &str = "audio.paused";

/// Event type identifier for [`TrackSet`].
pub const AUDIO_SET_EVENT_TYPE: &str = "audio.set";

/// Event type identifier for [`StateSaved`].
pub const AUDIO_SAVE_EVENT_TYPE: &str = "audio.save";

/// Event type identifier for [`StateRestored`].
pub const AUDIO_RESTORE_EVENT_TYPE: &str = "audio.restore";

/// Event type identifier for [`Warning`].
pub const AUDIO_WARNING_EVENT_TYPE: &str = "audio.warning";

/// Event type identifier for [`TrackEnded`].
pub const AUDIO_TRACK_ENDED_EVENT_TYPE: &str = "audio.track_ended";

/// Emitted once an asset has been built from its declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConstructed {
    /// Asset name.
    pub asset_name: String,
    /// Titles of the tracks that survived validation.
    pub tracks: Vec<String>,
}

/// Emitted when playback is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayRequested {
    /// Asset name.
    pub asset_name: String,
    /// Track that will play.
    pub track: Option<String>,
    /// Fade-in duration applied.
    pub fade_in_ms: u64,
}

/// Emitted when a stop is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRequested {
    /// Asset name.
    pub asset_name: String,
    /// Track being stopped.
    pub track: Option<String>,
    /// Fade-out duration applied.
    pub fade_out_ms: u64,
}

/// Emitted when a pause is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseRequested {
    /// Asset name.
    pub asset_name: String,
    /// Track being paused.
    pub track: Option<String>,
}

/// Emitted when the current track changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSet {
    /// Asset name.
    pub asset_name: String,
    /// The new current track.
    pub track: String,
}

/// Emitted when the asset state is captured for a savegame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSaved {
    /// Asset name.
    pub asset_name: String,
    /// Captured logical playing flag.
    pub is_playing: bool,
    /// Captured current track.
    pub track: Option<String>,
    /// Captured playhead position.
    pub position_seconds: f64,
}

/// Emitted when the asset state is restored from a savegame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRestored {
    /// Asset name.
    pub asset_name: String,
    /// Restored logical playing flag.
    pub is_playing: bool,
    /// Restored current track.
    pub track: Option<String>,
}

/// Emitted for every non-fatal configuration or command problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    /// The offending declaration or directive.
    pub element: String,
    /// Human-readable explanation.
    pub message: String,
}

/// Emitted when the current track reaches its end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackEnded {
    /// Asset name.
    pub asset_name: String,
    /// The track that ended.
    pub track: Option<String>,
    /// Whether the track restarts.
    pub looped: bool,
}

/// Event payload variants for audio assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AudioEventKind {
    /// The asset was constructed.
    AssetConstructed(AssetConstructed),
    /// Playback was requested.
    PlayRequested(PlayRequested),
    /// A stop was requested.
    StopRequested(StopRequested),
    /// A pause was requested.
    PauseRequested(PauseRequested),
    /// The current track changed.
    TrackSet(TrackSet),
    /// State was captured.
    StateSaved(StateSaved),
    /// State was restored.
    StateRestored(StateRestored),
    /// Something was skipped.
    Warning(Warning),
    /// The current track ended.
    TrackEnded(TrackEnded),
}

impl AudioEventKind {
    /// Returns the event type identifier of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AssetConstructed(_) => AUDIO_CONSTRUCTED_EVENT_TYPE,
            Self::PlayRequested(_) => AUDIO_PLAY_EVENT_TYPE,
            Self::StopRequested(_) => AUDIO_STOP_EVENT_TYPE,
            Self::PauseRequested(_) => AUDIO_PAUSED_EVENT_TYPE,
            Self::TrackSet(_) => AUDIO_SET_EVENT_TYPE,
            Self::StateSaved(_) => AUDIO_SAVE_EVENT_TYPE,
            Self::StateRestored(_) => AUDIO_RESTORE_EVENT_TYPE,
            Self::Warning(_) => AUDIO_WARNING_EVENT_TYPE,
            Self::TrackEnded(_) => AUDIO_TRACK_ENDED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for audio assets.
#[derive(Debug, Clone)]
pub struct AudioEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: AudioEventKind,
}

impl DomainEvent for AudioEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("AudioEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
