//! Track deck: the controller-owned holder of playback resources.
//!
//! The deck owns one resource per track and a pointer to the current track.
//! It is the context every sequencer operation runs against, so operations
//! always reach the resource that is current when they run, including one
//! swapped in by renewal after they were queued.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use webstory_core::resource::{MediaSource, PlaybackResource, ResourceFactory};

use super::fade::VolumeControl;

#[derive(Debug)]
struct TrackSlot {
    source: MediaSource,
    resource: Box<dyn PlaybackResource>,
}

/// Playback resources of one audio asset.
#[derive(Debug)]
pub struct Deck {
    factory: Arc<dyn ResourceFactory>,
    looping: bool,
    tracks: HashMap<String, TrackSlot>,
    current: Option<String>,
    playing_physical: bool,
    ended_listener: bool,
    renewals: u64,
}

impl Deck {
    /// Creates an empty deck whose resources loop in place when `looping`.
    #[must_use]
    pub fn new(factory: Arc<dyn ResourceFactory>, looping: bool) -> Self {
        Self {
            factory,
            looping,
            tracks: HashMap::new(),
            current: None,
            playing_physical: false,
            ended_listener: false,
            renewals: 0,
        }
    }

    /// Registers a track, creating its resource. A later track with the same
    /// title replaces the earlier one.
    pub fn insert_track(&mut self, title: &str, source: MediaSource) {
        let resource = self.spawn(&source);
        let slot = TrackSlot { source, resource };
        if let Some(mut replaced) = self.tracks.insert(title.to_owned(), slot) {
            detach_logged(title, replaced.resource.as_mut());
        }
    }

    fn spawn(&self, source: &MediaSource) -> Box<dyn PlaybackResource> {
        let mut resource = self.factory.create(source);
        if self.looping {
            resource.set_looping(true);
        }
        resource
    }

    /// Returns whether a track with this title exists.
    #[must_use]
    pub fn has_track(&self, title: &str) -> bool {
        self.tracks.contains_key(title)
    }

    /// Returns all track titles, sorted.
    #[must_use]
    pub fn track_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.tracks.keys().cloned().collect();
        titles.sort();
        titles
    }

    /// Returns the title of the track the resource pointer is on.
    #[must_use]
    pub fn current_track(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Returns whether the current resource is actually sounding.
    #[must_use]
    pub fn is_playing_physical(&self) -> bool {
        self.playing_physical
    }

    /// Returns how many resources have been renewed.
    #[must_use]
    pub fn renewals(&self) -> u64 {
        self.renewals
    }

    /// Returns the playhead position of the current resource.
    #[must_use]
    pub fn current_position(&self) -> Option<f64> {
        self.current_slot().map(|slot| slot.resource.position())
    }

    fn current_slot(&self) -> Option<&TrackSlot> {
        self.current.as_deref().and_then(|title| self.tracks.get(title))
    }

    fn current_resource(&mut self) -> Option<&mut dyn PlaybackResource> {
        let title = self.current.as_deref()?;
        let slot = self.tracks.get_mut(title)?;
        Some(slot.resource.as_mut())
    }

    /// Moves the resource pointer to another track. The new track starts out
    /// physically stopped.
    pub fn select(&mut self, title: &str) {
        if self.tracks.contains_key(title) {
            debug!(track = title, "current track switched");
            self.current = Some(title.to_owned());
            self.playing_physical = false;
        } else {
            warn!(track = title, "cannot select unknown track");
        }
    }

    /// Starts the current resource.
    pub fn play_current(&mut self) {
        if let Some(resource) = self.current_resource() {
            resource.play();
            self.playing_physical = true;
        }
    }

    /// Pauses the current resource, keeping its position.
    pub fn pause_current(&mut self) {
        if let Some(resource) = self.current_resource() {
            resource.pause();
        }
        self.playing_physical = false;
    }

    /// Pauses every resource on the deck.
    pub fn pause_all(&mut self) {
        for slot in self.tracks.values_mut() {
            slot.resource.pause();
        }
        self.playing_physical = false;
    }

    /// Moves the playhead of the current resource.
    pub fn seek_current(&mut self, position_seconds: f64) {
        if let Some(resource) = self.current_resource() {
            resource.seek(position_seconds);
        }
    }

    /// Ends playback of the current resource: pause, rewind, renew.
    pub fn halt_current(&mut self) {
        if let Some(resource) = self.current_resource() {
            resource.pause();
            resource.seek(0.0);
        }
        self.renew_current();
        self.playing_physical = false;
        self.ended_listener = false;
    }

    /// Replaces the current resource with a fresh instance built from the
    /// same source. Only the loop flag carries over.
    pub fn renew_current(&mut self) {
        let Some(title) = self.current.clone() else {
            return;
        };
        let Some(source) = self.tracks.get(&title).map(|slot| slot.source.clone()) else {
            return;
        };
        let fresh = self.spawn(&source);
        if let Some(slot) = self.tracks.get_mut(&title) {
            let mut stale = std::mem::replace(&mut slot.resource, fresh);
            detach_logged(&title, stale.as_mut());
            self.renewals += 1;
            debug!(track = %title, href = %source.href, "resource renewed");
        }
    }

    /// Starts listening for "ended" notifications from the current resource.
    pub fn arm_ended_listener(&mut self) {
        self.ended_listener = true;
    }

    /// Consumes an "ended" notification from the current resource, if the
    /// listener is armed and one fired.
    pub fn take_ended(&mut self) -> bool {
        if !self.ended_listener {
            return false;
        }
        match self.current_resource() {
            Some(resource) => resource.take_ended(),
            None => false,
        }
    }

    /// Records that the current resource stopped on its own.
    pub(crate) fn mark_stopped(&mut self) {
        self.playing_physical = false;
    }
}

impl VolumeControl for Deck {
    fn volume(&self) -> Option<f64> {
        self.current_slot().map(|slot| slot.resource.volume())
    }

    fn set_volume(&mut self, volume: f64) {
        if let Some(resource) = self.current_resource() {
            resource.set_volume(volume.clamp(0.0, 1.0));
        }
    }
}

/// Detaches a resource that is being discarded. Removal failures are logged
/// and swallowed so a renewal never aborts the sequence it runs in.
fn detach_logged(title: &str, resource: &mut dyn PlaybackResource) {
    if let Err(err) = resource.detach() {
        warn!(track = title, error = %err, "failed to detach discarded resource");
    }
}
