//! Playback resource abstraction.
//!
//! A playback resource is one physical playback unit bound to a single media
//! source. The engine never implements one itself; hosts provide them through
//! a [`ResourceFactory`].

use std::fmt;

use thiserror::Error;

/// Encodings a track source may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// MPEG layer III.
    Mp3,
    /// Ogg Vorbis.
    Ogg,
}

impl AudioFormat {
    /// Parses a declared source type (`mp3`, `ogg`, or the matching MIME type).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mp3" | "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "ogg" | "audio/ogg" => Some(Self::Ogg),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp3 => f.write_str("mp3"),
            Self::Ogg => f.write_str("ogg"),
        }
    }
}

/// The media a resource instance plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    /// Location of the media file.
    pub href: String,
    /// Encoding of the media file.
    pub format: AudioFormat,
}

/// Errors raised by a playback resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource was already detached from its host.
    #[error("resource for {0} is already detached")]
    AlreadyDetached(String),
}

/// One physical playback unit.
///
/// Volume is always within `[0.0, 1.0]`; positions are in seconds.
pub trait PlaybackResource: Send + fmt::Debug {
    /// Starts or resumes playback.
    fn play(&mut self);

    /// Pauses playback, keeping the position.
    fn pause(&mut self);

    /// Moves the playhead.
    fn seek(&mut self, position_seconds: f64);

    /// Returns the playhead position.
    fn position(&self) -> f64;

    /// Returns the current volume.
    fn volume(&self) -> f64;

    /// Sets the volume.
    fn set_volume(&mut self, volume: f64);

    /// Configures in-place looping.
    fn set_looping(&mut self, looping: bool);

    /// Consumes a pending "ended" notification, returning whether one fired
    /// since the last call.
    fn take_ended(&mut self) -> bool;

    /// Detaches the resource from its host before it is dropped.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError` if the host refuses the removal, for instance
    /// because the resource was already detached.
    fn detach(&mut self) -> Result<(), ResourceError>;
}

/// Creates playback resources for a host environment.
pub trait ResourceFactory: Send + Sync + fmt::Debug {
    /// Returns whether the host can decode `format`.
    fn can_play(&self, format: AudioFormat) -> bool;

    /// Creates a fresh resource bound to `source`.
    fn create(&self, source: &MediaSource) -> Box<dyn PlaybackResource>;
}
