//! Test playback resources — observable `PlaybackResource` fakes.
//!
//! Every resource the factory creates shares its state with a
//! [`FakeResource`] handle kept by the factory, so tests can inspect and drive
//! resources after the asset under test has taken ownership of them.

use std::sync::{Arc, Mutex};

use webstory_core::resource::{
    AudioFormat, MediaSource, PlaybackResource, ResourceError, ResourceFactory,
};

/// A transport-level call received by a fake resource.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    /// `play()` was called.
    Play,
    /// `pause()` was called.
    Pause,
    /// `seek()` was called with the given position.
    Seek(f64),
    /// `set_looping()` was called.
    SetLooping(bool),
    /// `detach()` was called.
    Detach,
}

#[derive(Debug)]
struct FakeState {
    playing: bool,
    volume: f64,
    position: f64,
    looping: bool,
    ended: bool,
    detached: bool,
    fail_detach: bool,
    calls: Vec<TransportCall>,
    volume_history: Vec<f64>,
}

/// Shared view of one resource created by [`FakeResourceFactory`].
#[derive(Debug, Clone)]
pub struct FakeResource {
    source: MediaSource,
    state: Arc<Mutex<FakeState>>,
}

impl FakeResource {
    fn new(source: MediaSource, fail_detach: bool) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(FakeState {
                playing: false,
                volume: 1.0,
                position: 0.0,
                looping: false,
                ended: false,
                detached: false,
                fail_detach,
                calls: Vec::new(),
                volume_history: Vec::new(),
            })),
        }
    }

    /// Returns the source this resource was created for.
    #[must_use]
    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    /// Returns whether the transport is playing.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    /// Returns the current volume.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn current_volume(&self) -> f64 {
        self.state.lock().unwrap().volume
    }

    /// Returns the playhead position in seconds.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn current_position(&self) -> f64 {
        self.state.lock().unwrap().position
    }

    /// Simulates playback progress by moving the playhead.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn advance_to(&self, position_seconds: f64) {
        self.state.lock().unwrap().position = position_seconds;
    }

    /// Returns whether in-place looping is configured.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_looping(&self) -> bool {
        self.state.lock().unwrap().looping
    }

    /// Returns whether the resource was detached from its host.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_detached(&self) -> bool {
        self.state.lock().unwrap().detached
    }

    /// Fires the "ended" notification and stops the transport.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap();
        state.playing = false;
        state.ended = true;
    }

    /// Returns every transport call received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Returns every volume value that was set, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn volume_history(&self) -> Vec<f64> {
        self.state.lock().unwrap().volume_history.clone()
    }
}

impl PlaybackResource for FakeResource {
    fn play(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.playing = true;
        state.calls.push(TransportCall::Play);
    }

    fn pause(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.playing = false;
        state.calls.push(TransportCall::Pause);
    }

    fn seek(&mut self, position_seconds: f64) {
        let mut state = self.state.lock().unwrap();
        state.position = position_seconds;
        state.calls.push(TransportCall::Seek(position_seconds));
    }

    fn position(&self) -> f64 {
        self.state.lock().unwrap().position
    }

    fn volume(&self) -> f64 {
        self.state.lock().unwrap().volume
    }

    fn set_volume(&mut self, volume: f64) {
        let mut state = self.state.lock().unwrap();
        state.volume = volume;
        state.volume_history.push(volume);
    }

    fn set_looping(&mut self, looping: bool) {
        let mut state = self.state.lock().unwrap();
        state.looping = looping;
        state.calls.push(TransportCall::SetLooping(looping));
    }

    fn take_ended(&mut self) -> bool {
        std::mem::take(&mut self.state.lock().unwrap().ended)
    }

    fn detach(&mut self) -> Result<(), ResourceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(TransportCall::Detach);
        if state.detached || state.fail_detach {
            return Err(ResourceError::AlreadyDetached(self.source.href.clone()));
        }
        state.detached = true;
        Ok(())
    }
}

/// A resource factory that hands out [`FakeResource`]s and remembers them.
#[derive(Debug)]
pub struct FakeResourceFactory {
    supports_mp3: bool,
    fail_detach: bool,
    created: Mutex<Vec<FakeResource>>,
}

impl Default for FakeResourceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeResourceFactory {
    /// A factory for a host that decodes both mp3 and ogg.
    #[must_use]
    pub fn new() -> Self {
        Self {
            supports_mp3: true,
            fail_detach: false,
            created: Mutex::new(Vec::new()),
        }
    }

    /// A factory for a host without mp3 support.
    #[must_use]
    pub fn without_mp3() -> Self {
        Self {
            supports_mp3: false,
            ..Self::new()
        }
    }

    /// A factory whose resources refuse to be detached.
    #[must_use]
    pub fn with_failing_detach() -> Self {
        Self {
            fail_detach: true,
            ..Self::new()
        }
    }

    /// Returns every resource created so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn created(&self) -> Vec<FakeResource> {
        self.created.lock().unwrap().clone()
    }

    /// Returns the most recently created resource for `href`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn latest(&self, href: &str) -> Option<FakeResource> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.source.href == href)
            .cloned()
    }

    /// Returns how many resources were created for `href`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn created_count(&self, href: &str) -> usize {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.source.href == href)
            .count()
    }
}

impl ResourceFactory for FakeResourceFactory {
    fn can_play(&self, format: AudioFormat) -> bool {
        match format {
            AudioFormat::Mp3 => self.supports_mp3,
            AudioFormat::Ogg => true,
        }
    }

    fn create(&self, source: &MediaSource) -> Box<dyn PlaybackResource> {
        let resource = FakeResource::new(source.clone(), self.fail_detach);
        self.created.lock().unwrap().push(resource.clone());
        Box::new(resource)
    }
}
