//! Simulated playback resources.
//!
//! The player has no audio device. A simulated resource keeps transport state
//! and a wall-clock playhead, and reports "ended" once the playhead passes
//! the configured track length. Like the hosts renewal exists for, it records
//! the loop flag but never restarts itself at the end. Playing an ended
//! resource starts it again from the beginning.

use std::time::{Duration, Instant};

use tracing::trace;
use webstory_core::resource::{
    AudioFormat, MediaSource, PlaybackResource, ResourceError, ResourceFactory,
};

/// A playback resource that only pretends to make sound.
#[derive(Debug)]
pub struct SimulatedResource {
    source: MediaSource,
    length: Option<Duration>,
    started_at: Option<Instant>,
    offset: Duration,
    volume: f64,
    looping: bool,
    ended: bool,
    detached: bool,
}

impl SimulatedResource {
    /// Creates a stopped resource. Without a `length` it never ends.
    #[must_use]
    pub fn new(source: MediaSource, length: Option<Duration>) -> Self {
        Self {
            source,
            length,
            started_at: None,
            offset: Duration::ZERO,
            volume: 1.0,
            looping: false,
            ended: false,
            detached: false,
        }
    }

    fn elapsed(&self) -> Duration {
        self.offset + self.started_at.map_or(Duration::ZERO, |at| at.elapsed())
    }

    /// Returns whether the loop flag is set.
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }
}

impl PlaybackResource for SimulatedResource {
    fn play(&mut self) {
        if self.started_at.is_none() {
            if self.length.is_some_and(|length| self.offset >= length) {
                self.offset = Duration::ZERO;
            }
            self.started_at = Some(Instant::now());
            trace!(href = %self.source.href, "simulated play");
        }
    }

    fn pause(&mut self) {
        self.offset = self.elapsed();
        self.started_at = None;
    }

    fn seek(&mut self, position_seconds: f64) {
        self.offset = Duration::try_from_secs_f64(position_seconds.max(0.0)).unwrap_or_default();
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    fn position(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn take_ended(&mut self) -> bool {
        if let Some(length) = self.length {
            if self.started_at.is_some() && self.elapsed() >= length {
                self.offset = length;
                self.started_at = None;
                self.ended = true;
            }
        }
        std::mem::take(&mut self.ended)
    }

    fn detach(&mut self) -> Result<(), ResourceError> {
        if self.detached {
            return Err(ResourceError::AlreadyDetached(self.source.href.clone()));
        }
        self.detached = true;
        self.started_at = None;
        Ok(())
    }
}

/// Builds [`SimulatedResource`]s.
#[derive(Debug, Clone)]
pub struct SimulatedResourceFactory {
    supports_mp3: bool,
    track_length: Option<Duration>,
}

impl SimulatedResourceFactory {
    /// A factory for a host that decodes both formats and whose tracks are
    /// `track_length` long (endless when `None`).
    #[must_use]
    pub fn new(track_length: Option<Duration>) -> Self {
        Self {
            supports_mp3: true,
            track_length,
        }
    }

    /// Restricts the simulated host to ogg.
    #[must_use]
    pub fn without_mp3(mut self) -> Self {
        self.supports_mp3 = false;
        self
    }
}

impl ResourceFactory for SimulatedResourceFactory {
    fn can_play(&self, format: AudioFormat) -> bool {
        match format {
            AudioFormat::Mp3 => self.supports_mp3,
            AudioFormat::Ogg => true,
        }
    }

    fn create(&self, source: &MediaSource) -> Box<dyn PlaybackResource> {
        Box::new(SimulatedResource::new(source.clone(), self.track_length))
    }
}
