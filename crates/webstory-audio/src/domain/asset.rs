//! The audio asset controller.
//!
//! An audio asset owns a deck of tracks and decides what has to happen for
//! each command (fade out, switch track, fade in, ...). It never touches a
//! playback resource directly; it queues operations on its sequencer, which
//! runs them one per tick against the deck.
//!
//! The asset tracks two kinds of state. Logical state (`is_playing`,
//! `current_track`) changes as soon as a command arrives and is what gets
//! saved. Physical state lives on the deck and follows once the queued
//! operations have run.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use webstory_core::bus::{EventBus, PublishedEvent};
use webstory_core::clock::Clock;
use webstory_core::event::EventMetadata;
use webstory_core::resource::ResourceFactory;

use super::config::{AUTOPAUSE_FADE_MS, AudioDeclaration, AudioSettings};
use super::deck::Deck;
use super::directives::FadeOptions;
use super::events::{
    AssetConstructed, AudioEvent, AudioEventKind, PauseRequested, PlayRequested, StateRestored,
    StateSaved, StopRequested, TrackEnded, TrackSet, Warning,
};
use super::fade::{VolumeControl, fade_to};
use super::sequencer::{OperationHandle, Sequencer, TickOutcome};
use super::snapshot::AudioSnapshot;

/// Collaborators an asset is built with.
#[derive(Clone)]
pub struct AssetEnvironment {
    /// Creates playback resources for the host.
    pub factory: Arc<dyn ResourceFactory>,
    /// Receives every notification.
    pub bus: Arc<dyn EventBus>,
    /// Timestamps notifications.
    pub clock: Arc<dyn Clock>,
    /// Sequencer tick interval in milliseconds.
    pub tick_ms: u64,
}

/// Coarse playback state of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing queued and nothing sounding.
    Stopped,
    /// Nothing queued and the current track is sounding.
    Playing,
    /// Operations are queued; physical state may lag logical intent.
    Transitioning,
}

struct Notifier {
    asset_id: Uuid,
    sequence_number: i64,
    bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl Notifier {
    fn publish(&mut self, kind: AudioEventKind, correlation_id: Uuid) {
        self.sequence_number += 1;
        let event = AudioEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                asset_id: self.asset_id,
                sequence_number: self.sequence_number,
                correlation_id,
                occurred_at: self.clock.now(),
            },
            kind,
        };
        self.bus.publish(PublishedEvent::from_event(&event));
    }
}

/// An `<audio>` asset.
pub struct AudioAsset {
    id: Uuid,
    name: String,
    settings: AudioSettings,
    deck: Deck,
    sequencer: Sequencer<Deck>,
    current_track: Option<String>,
    playing: bool,
    pending_fade_in: Option<OperationHandle>,
    notifier: Notifier,
}

impl AudioAsset {
    /// Builds an asset from its declaration.
    ///
    /// Unusable tracks and sources are skipped with a warning; an asset with
    /// no tracks at all is still constructed.
    #[must_use]
    pub fn new(declaration: &AudioDeclaration, env: AssetEnvironment) -> Self {
        let settings = declaration.settings(env.tick_ms);
        let (tracks, warnings) = declaration.resolve_tracks(env.factory.as_ref());
        let mut deck = Deck::new(env.factory, settings.looping);
        for track in tracks {
            deck.insert_track(&track.title, track.source);
        }

        let id = Uuid::new_v4();
        let mut asset = Self {
            id,
            name: declaration.asset_name().to_owned(),
            settings,
            deck,
            sequencer: Sequencer::new(),
            current_track: None,
            playing: false,
            pending_fade_in: None,
            notifier: Notifier {
                asset_id: id,
                sequence_number: 0,
                bus: env.bus,
                clock: env.clock,
            },
        };

        let correlation_id = Uuid::new_v4();
        for warning in warnings {
            asset.report_warning(warning.element, warning.message, correlation_id);
        }

        let tracks = asset.deck.track_titles();
        info!(asset = %asset.name, asset_id = %id, tracks = tracks.len(), "audio asset constructed");
        asset.notifier.publish(
            AudioEventKind::AssetConstructed(AssetConstructed {
                asset_name: asset.name.clone(),
                tracks,
            }),
            correlation_id,
        );
        asset
    }

    /// Returns the asset identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the asset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current settings.
    #[must_use]
    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    /// Returns the logical current track.
    #[must_use]
    pub fn current_track(&self) -> Option<&str> {
        self.current_track.as_deref()
    }

    /// Returns the logical playing intent.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Returns whether the current resource is actually sounding.
    #[must_use]
    pub fn is_playing_physical(&self) -> bool {
        self.deck.is_playing_physical()
    }

    /// Returns the volume of the current resource.
    #[must_use]
    pub fn volume(&self) -> Option<f64> {
        self.deck.volume()
    }

    /// Returns the coarse playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        if !self.sequencer.is_empty() {
            PlaybackState::Transitioning
        } else if self.deck.is_playing_physical() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    /// Returns the number of queued operations.
    #[must_use]
    pub fn pending_operations(&self) -> usize {
        self.sequencer.len()
    }

    /// Returns the deck.
    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    fn fade_in_ms(&self, options: &FadeOptions) -> u64 {
        if options.fade.unwrap_or(self.settings.fade) {
            options.fade_in_ms.unwrap_or(self.settings.fade_in_ms)
        } else {
            0
        }
    }

    fn fade_out_ms(&self, options: &FadeOptions) -> u64 {
        if options.fade.unwrap_or(self.settings.fade) {
            options.fade_out_ms.unwrap_or(self.settings.fade_out_ms)
        } else {
            0
        }
    }

    fn submit_fade(&mut self, target: f64, duration_ms: u64) -> OperationHandle {
        let (action, is_complete) = fade_to::<Deck>(target, duration_ms, self.settings.tick_ms);
        self.sequencer.submit_until(action, is_complete)
    }

    /// Cancels a fade-in that is about to be reversed anyway.
    fn supersede_fade_in(&mut self) {
        if let Some(handle) = self.pending_fade_in.take() {
            if !handle.is_evicted() {
                debug!(asset = %self.name, operation_id = handle.id(), "fade-in superseded");
                handle.cancel();
            }
        }
    }

    /// Starts the current track. A track that is already playing is stopped
    /// first, then restarted.
    pub fn play(&mut self, options: &FadeOptions, correlation_id: Uuid) {
        let fade_in_ms = self.fade_in_ms(options);
        if self.playing {
            self.stop(options, correlation_id);
        }

        self.submit_fade(0.0, 0);
        self.sequencer.submit(Deck::arm_ended_listener);
        self.sequencer.submit(Deck::play_current);
        self.pending_fade_in = Some(self.submit_fade(1.0, fade_in_ms));
        self.playing = true;

        info!(asset = %self.name, track = ?self.current_track, fade_in_ms, "play requested");
        self.notifier.publish(
            AudioEventKind::PlayRequested(PlayRequested {
                asset_name: self.name.clone(),
                track: self.current_track.clone(),
                fade_in_ms,
            }),
            correlation_id,
        );
    }

    /// Fades the current track out, then pauses, rewinds and renews it.
    pub fn stop(&mut self, options: &FadeOptions, correlation_id: Uuid) {
        let fade_out_ms = self.fade_out_ms(options);
        self.supersede_fade_in();
        self.submit_fade(0.0, fade_out_ms);
        self.sequencer.submit(Deck::halt_current);
        self.playing = false;

        info!(asset = %self.name, track = ?self.current_track, fade_out_ms, "stop requested");
        self.notifier.publish(
            AudioEventKind::StopRequested(StopRequested {
                asset_name: self.name.clone(),
                track: self.current_track.clone(),
                fade_out_ms,
            }),
            correlation_id,
        );
    }

    /// Pauses the current track without changing the logical intent.
    pub fn pause(&mut self, correlation_id: Uuid) {
        self.supersede_fade_in();
        self.sequencer.submit(Deck::pause_current);

        info!(asset = %self.name, track = ?self.current_track, "pause requested");
        self.notifier.publish(
            AudioEventKind::PauseRequested(PauseRequested {
                asset_name: self.name.clone(),
                track: self.current_track.clone(),
            }),
            correlation_id,
        );
    }

    /// Switches to another track, restarting playback on it if the asset was
    /// playing. An unknown title only produces a warning.
    pub fn set_track(&mut self, title: &str, options: &FadeOptions, correlation_id: Uuid) {
        if !self.deck.has_track(title) {
            self.report_warning(
                format!("set[track={title}]"),
                format!("Unknown track '{title}' in audio element '{}'.", self.name),
                correlation_id,
            );
            return;
        }

        let was_playing = self.playing;
        if was_playing {
            self.stop(options, correlation_id);
        }

        let target = title.to_owned();
        self.sequencer
            .submit(move |deck: &mut Deck| deck.select(&target));
        self.current_track = Some(title.to_owned());

        if was_playing {
            self.play(options, correlation_id);
        }

        info!(asset = %self.name, track = title, "track set");
        self.notifier.publish(
            AudioEventKind::TrackSet(TrackSet {
                asset_name: self.name.clone(),
                track: title.to_owned(),
            }),
            correlation_id,
        );
    }

    /// Host window lost focus: fade out and pause if autopause is on.
    pub fn window_blurred(&mut self) {
        if !self.settings.autopause || !self.playing {
            return;
        }
        debug!(asset = %self.name, "window blurred, pausing");
        self.supersede_fade_in();
        self.submit_fade(0.0, AUTOPAUSE_FADE_MS);
        self.sequencer.submit(Deck::pause_current);
    }

    /// Host window regained focus: resume and fade in if autopause is on.
    pub fn window_focused(&mut self) {
        if !self.settings.autopause || !self.playing {
            return;
        }
        debug!(asset = %self.name, "window focused, resuming");
        self.sequencer.submit(Deck::play_current);
        self.pending_fade_in = Some(self.submit_fade(1.0, AUTOPAUSE_FADE_MS));
    }

    /// Advances the asset by one tick: runs at most one queued operation,
    /// then reacts to the current track having ended.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.sequencer.tick(&mut self.deck);
        if self.deck.take_ended() {
            self.on_track_ended();
        }
        outcome
    }

    fn on_track_ended(&mut self) {
        let looped = self.settings.looping;
        if looped {
            debug!(asset = %self.name, track = ?self.current_track, "track ended, restarting");
            self.sequencer.submit(|deck: &mut Deck| {
                deck.renew_current();
                deck.play_current();
            });
        } else {
            debug!(asset = %self.name, track = ?self.current_track, "track ended");
            self.deck.mark_stopped();
            if self.sequencer.is_empty() {
                self.playing = false;
            }
        }
        self.notifier.publish(
            AudioEventKind::TrackEnded(TrackEnded {
                asset_name: self.name.clone(),
                track: self.current_track.clone(),
                looped,
            }),
            Uuid::new_v4(),
        );
    }

    /// Captures the logical state for a savegame.
    ///
    /// The position is only recorded while the track is actually sounding.
    pub fn capture(&mut self, correlation_id: Uuid) -> AudioSnapshot {
        let position_seconds = if self.deck.is_playing_physical() {
            self.deck.current_position().unwrap_or(0.0)
        } else {
            0.0
        };
        let snapshot = AudioSnapshot {
            is_playing: self.playing,
            fade: self.settings.fade,
            fade_in_ms: self.settings.fade_in_ms,
            fade_out_ms: self.settings.fade_out_ms,
            current_track: self.current_track.clone(),
            position_seconds,
        };

        info!(asset = %self.name, is_playing = snapshot.is_playing, position_seconds, "state captured");
        self.notifier.publish(
            AudioEventKind::StateSaved(StateSaved {
                asset_name: self.name.clone(),
                is_playing: snapshot.is_playing,
                track: snapshot.current_track.clone(),
                position_seconds,
            }),
            correlation_id,
        );
        snapshot
    }

    /// Restores a captured state.
    ///
    /// Everything still queued is dropped, all tracks are silenced, the
    /// captured track is selected and positioned, and playback is started or
    /// stopped without fading.
    pub fn restore(&mut self, snapshot: &AudioSnapshot, correlation_id: Uuid) {
        let dropped = self.sequencer.clear();
        self.pending_fade_in = None;

        self.settings.fade = snapshot.fade;
        self.settings.fade_in_ms = snapshot.fade_in_ms;
        self.settings.fade_out_ms = snapshot.fade_out_ms;
        self.current_track = snapshot.current_track.clone();
        self.playing = false;

        if let Some(title) = snapshot.current_track.as_deref() {
            if !self.deck.has_track(title) {
                self.report_warning(
                    format!("audio[name={}]", self.name),
                    format!("Unknown track '{title}' in savegame for audio element '{}'.", self.name),
                    correlation_id,
                );
            }
        }

        let target = snapshot.current_track.clone();
        let position = snapshot.position_seconds;
        self.sequencer.submit(move |deck: &mut Deck| {
            deck.pause_all();
            if let Some(title) = target.as_deref() {
                deck.select(title);
            }
            deck.seek_current(position);
        });

        let fade = self.settings.fade;
        self.settings.fade = false;
        if snapshot.is_playing {
            self.play(&FadeOptions::default(), correlation_id);
        } else {
            self.stop(&FadeOptions::default(), correlation_id);
        }
        self.settings.fade = fade;

        info!(asset = %self.name, dropped, is_playing = snapshot.is_playing, "state restored");
        self.notifier.publish(
            AudioEventKind::StateRestored(StateRestored {
                asset_name: self.name.clone(),
                is_playing: snapshot.is_playing,
                track: snapshot.current_track.clone(),
            }),
            correlation_id,
        );
    }

    /// Logs and publishes a non-fatal problem.
    pub fn report_warning(&mut self, element: String, message: String, correlation_id: Uuid) {
        warn!(asset = %self.name, %element, %message, "audio warning");
        self.notifier.publish(
            AudioEventKind::Warning(Warning { element, message }),
            correlation_id,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use webstory_test_support::{FakeResourceFactory, FixedClock, RecordingEventBus};

    use crate::domain::events::{
        AUDIO_CONSTRUCTED_EVENT_TYPE, AUDIO_RESTORE_EVENT_TYPE, AUDIO_TRACK_ENDED_EVENT_TYPE,
        AUDIO_WARNING_EVENT_TYPE,
    };

    const TICK_MS: u64 = 10;

    const MUSIC: &str = r"
name: music
fade: true
fadein: 100
fadeout: 50
tracks:
  - title: theme
    sources:
      - href: theme.ogg
        type: ogg
  - title: battle
    sources:
      - href: battle.ogg
        type: ogg
";

    struct Harness {
        asset: AudioAsset,
        factory: Arc<FakeResourceFactory>,
        bus: Arc<RecordingEventBus>,
    }

    fn harness(yaml: &str) -> Harness {
        let factory = Arc::new(FakeResourceFactory::new());
        let bus = Arc::new(RecordingEventBus::new());
        let env = AssetEnvironment {
            factory: Arc::clone(&factory) as Arc<dyn ResourceFactory>,
            bus: Arc::clone(&bus) as Arc<dyn EventBus>,
            clock: Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            )),
            tick_ms: TICK_MS,
        };
        let declaration = AudioDeclaration::from_yaml(yaml).unwrap();
        Harness {
            asset: AudioAsset::new(&declaration, env),
            factory,
            bus,
        }
    }

    fn settle(asset: &mut AudioAsset) -> u32 {
        let mut ticks = 0;
        while asset.pending_operations() > 0 {
            asset.tick();
            ticks += 1;
            assert!(ticks < 10_000, "queue did not drain");
        }
        ticks
    }

    fn cid() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_notifications_are_stamped_by_the_environment_clock() {
        // Arrange
        let mut h = harness(MUSIC);

        // Act
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());

        // Assert
        let events = h.bus.events();
        assert!(events.len() >= 3);
        let stamp = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        assert!(events.iter().all(|event| event.occurred_at == stamp));
        let sequence: Vec<i64> = events.iter().map(|event| event.sequence_number).collect();
        assert!(sequence.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn test_new_publishes_constructed_event_with_tracks() {
        // Act
        let h = harness(MUSIC);

        // Assert
        let constructed = h.bus.events_of_type(AUDIO_CONSTRUCTED_EVENT_TYPE);
        assert_eq!(constructed.len(), 1);
        assert_eq!(constructed[0].asset_id, h.asset.id());
        assert_eq!(constructed[0].sequence_number, 1);
        let tracks = &constructed[0].payload["AssetConstructed"]["tracks"];
        assert_eq!(tracks, &serde_json::json!(["battle", "theme"]));
        assert_eq!(h.asset.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_new_without_tracks_is_usable() {
        // Arrange
        let mut h = harness("name: empty\n");

        // Act
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Assert
        assert_eq!(h.bus.events_of_type(AUDIO_WARNING_EVENT_TYPE).len(), 1);
        assert!(h.asset.is_playing());
        assert!(!h.asset.is_playing_physical());
        assert!(h.factory.created().is_empty());
    }

    #[test]
    fn test_play_starts_current_track_and_fades_in() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());

        // Act
        h.asset.play(&FadeOptions::default(), cid());
        assert_eq!(h.asset.state(), PlaybackState::Transitioning);
        settle(&mut h.asset);

        // Assert
        let theme = h.factory.latest("theme.ogg").unwrap();
        assert!(theme.is_playing());
        assert_eq!(theme.current_volume(), 1.0);
        let history = theme.volume_history();
        assert_eq!(history.first(), Some(&0.0));
        assert_eq!(history.len(), 1 + 10);
        assert!(history.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(h.asset.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_play_without_fade_attribute_override_is_immediate() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());

        // Act
        h.asset.play(&FadeOptions::without_fade(), cid());
        settle(&mut h.asset);

        // Assert
        let theme = h.factory.latest("theme.ogg").unwrap();
        assert_eq!(theme.volume_history(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_stop_fades_out_then_pauses_and_renews() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);
        let played = h.factory.latest("theme.ogg").unwrap();

        // Act
        h.asset.stop(&FadeOptions::default(), cid());
        assert!(!h.asset.is_playing());
        assert!(h.asset.is_playing_physical());
        settle(&mut h.asset);

        // Assert
        assert!(!played.is_playing());
        assert!(played.is_detached());
        assert_eq!(played.current_volume(), 0.0);
        assert_eq!(h.factory.created_count("theme.ogg"), 2);
        assert!(!h.asset.is_playing_physical());
        assert_eq!(h.asset.deck().renewals(), 1);
        assert_eq!(h.asset.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_set_unknown_track_warns_once_and_changes_nothing() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        settle(&mut h.asset);
        h.bus.clear();

        // Act
        h.asset.set_track("nonexistent", &FadeOptions::default(), cid());

        // Assert
        assert_eq!(h.asset.current_track(), Some("theme"));
        assert_eq!(h.asset.pending_operations(), 0);
        let events = h.bus.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, AUDIO_WARNING_EVENT_TYPE);
        assert_eq!(
            events[0].payload["Warning"]["message"],
            "Unknown track 'nonexistent' in audio element 'music'."
        );
        assert!(h.factory.created().iter().all(|r| r.calls().is_empty()));
    }

    #[test]
    fn test_set_while_playing_switches_tracks() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Act
        h.asset.set_track("battle", &FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Assert
        assert_eq!(h.asset.current_track(), Some("battle"));
        assert_eq!(h.asset.deck().current_track(), Some("battle"));
        assert!(h.asset.is_playing());
        assert!(h.factory.latest("battle.ogg").unwrap().is_playing());
        assert!(
            h.factory
                .created()
                .iter()
                .filter(|r| r.source().href == "theme.ogg")
                .all(|r| !r.is_playing())
        );
    }

    #[test]
    fn test_set_while_stopped_only_moves_pointer() {
        // Arrange
        let mut h = harness(MUSIC);

        // Act
        h.asset.set_track("battle", &FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Assert
        assert_eq!(h.asset.deck().current_track(), Some("battle"));
        assert!(!h.asset.is_playing());
        assert!(h.factory.created().iter().all(|r| r.calls().is_empty()));
    }

    #[test]
    fn test_rapid_replay_leaves_exactly_one_track_playing() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());

        // Act
        h.asset.play(&FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Assert
        let playing: Vec<_> = h
            .factory
            .created()
            .into_iter()
            .filter(|r| r.is_playing())
            .collect();
        assert_eq!(playing.len(), 1);
        let current = h.factory.latest("theme.ogg").unwrap();
        assert!(current.is_playing());
        assert_eq!(current.current_volume(), 1.0);
        assert!(h.asset.is_playing());

        // The first play's fade-in was superseded before it could run.
        let first = &h.factory.created()[0];
        assert!(first.volume_history().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_stop_during_fade_in_supersedes_the_ramp() {
        // Arrange
        let mut h = harness("name: music\nfade: true\nfadein: 1000\nfadeout: 1000\ntracks:\n  - title: theme\n    sources:\n      - href: theme.ogg\n        type: ogg\n");
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        for _ in 0..14 {
            h.asset.tick();
        }
        let theme = h.factory.latest("theme.ogg").unwrap();
        let reached = theme.current_volume();

        // Act
        h.asset.stop(&FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Assert
        assert!(reached > 0.0 && reached < 1.0);
        assert!(theme.volume_history().iter().all(|v| *v <= reached));
        assert_eq!(theme.current_volume(), 0.0);
        assert!(!theme.is_playing());
    }

    #[test]
    fn test_looping_track_rolls_over_with_one_renewal() {
        // Arrange
        let mut h = harness(
            "name: music\nloop: true\ntracks:\n  - title: theme\n    sources:\n      - href: theme.ogg\n        type: ogg\n",
        );
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);
        let ended = h.factory.latest("theme.ogg").unwrap();
        assert!(ended.is_looping());

        // Act
        ended.finish();
        h.asset.tick();
        assert!(h.asset.is_playing());
        settle(&mut h.asset);

        // Assert
        assert!(h.asset.is_playing());
        assert_eq!(h.asset.deck().renewals(), 1);
        assert_eq!(h.factory.created_count("theme.ogg"), 2);
        let renewed = h.factory.latest("theme.ogg").unwrap();
        assert!(renewed.is_playing());
        assert!(renewed.is_looping());
        assert_eq!(
            renewed
                .calls()
                .iter()
                .filter(|c| **c == webstory_test_support::TransportCall::Play)
                .count(),
            1
        );
        let ended_events = h.bus.events_of_type(AUDIO_TRACK_ENDED_EVENT_TYPE);
        assert_eq!(ended_events.len(), 1);
        assert_eq!(ended_events[0].payload["TrackEnded"]["looped"], true);
    }

    #[test]
    fn test_non_looping_track_end_clears_logical_intent() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Act
        h.factory.latest("theme.ogg").unwrap().finish();
        h.asset.tick();

        // Assert
        assert!(!h.asset.is_playing());
        assert!(!h.asset.is_playing_physical());
        assert_eq!(h.asset.deck().renewals(), 0);
        assert_eq!(h.bus.events_of_type(AUDIO_TRACK_ENDED_EVENT_TYPE).len(), 1);
    }

    #[test]
    fn test_track_end_with_queued_work_keeps_logical_intent() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);
        h.asset.play(&FadeOptions::default(), cid());

        // Act
        h.factory.latest("theme.ogg").unwrap().finish();
        h.asset.tick();

        // Assert
        assert!(h.asset.is_playing());
        assert!(!h.asset.is_playing_physical());
    }

    #[test]
    fn test_autopause_fades_out_on_blur_and_back_in_on_focus() {
        // Arrange
        let mut h = harness(
            "name: music\nautopause: true\ntracks:\n  - title: theme\n    sources:\n      - href: theme.ogg\n        type: ogg\n",
        );
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);
        let theme = h.factory.latest("theme.ogg").unwrap();

        // Act
        h.asset.window_blurred();
        let blur_ticks = settle(&mut h.asset);

        // Assert
        assert_eq!(blur_ticks, 50 + 1);
        assert!(!theme.is_playing());
        assert_eq!(theme.current_volume(), 0.0);
        assert!(h.asset.is_playing());
        assert!(!h.asset.is_playing_physical());

        // Act
        h.asset.window_focused();
        settle(&mut h.asset);

        // Assert
        assert!(theme.is_playing());
        assert_eq!(theme.current_volume(), 1.0);
        assert!(h.asset.is_playing_physical());
    }

    #[test]
    fn test_blur_without_autopause_is_ignored() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Act
        h.asset.window_blurred();

        // Assert
        assert_eq!(h.asset.pending_operations(), 0);
        assert!(h.factory.latest("theme.ogg").unwrap().is_playing());
    }

    #[test]
    fn test_pause_keeps_logical_intent() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);

        // Act
        h.asset.pause(cid());
        settle(&mut h.asset);

        // Assert
        assert!(h.asset.is_playing());
        assert!(!h.asset.is_playing_physical());
        assert!(!h.factory.latest("theme.ogg").unwrap().is_playing());
    }

    #[test]
    fn test_capture_records_position_only_while_sounding() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);
        h.factory.latest("theme.ogg").unwrap().advance_to(42.0);

        // Act
        let sounding = h.asset.capture(cid());
        h.asset.pause(cid());
        settle(&mut h.asset);
        let paused = h.asset.capture(cid());

        // Assert
        assert!(sounding.is_playing);
        assert_eq!(sounding.position_seconds, 42.0);
        assert_eq!(sounding.current_track.as_deref(), Some("theme"));
        assert!(paused.is_playing);
        assert_eq!(paused.position_seconds, 0.0);
    }

    #[test]
    fn test_restore_round_trips_captured_state() {
        // Arrange
        let mut source = harness(MUSIC);
        source.asset.set_track("battle", &FadeOptions::default(), cid());
        source.asset.play(&FadeOptions::default(), cid());
        settle(&mut source.asset);
        source.factory.latest("battle.ogg").unwrap().advance_to(17.25);
        let snapshot = source.asset.capture(cid());
        let mut target = harness(MUSIC);

        // Act
        target.asset.restore(&snapshot, cid());
        settle(&mut target.asset);
        let recaptured = target.asset.capture(cid());

        // Assert
        assert_eq!(recaptured.is_playing, snapshot.is_playing);
        assert_eq!(recaptured.current_track, snapshot.current_track);
        assert_eq!(recaptured.fade, snapshot.fade);
        assert_eq!(recaptured.fade_in_ms, snapshot.fade_in_ms);
        assert_eq!(recaptured.fade_out_ms, snapshot.fade_out_ms);
        #[allow(clippy::cast_precision_loss)]
        let tolerance = TICK_MS as f64 / 1000.0;
        assert!((recaptured.position_seconds - snapshot.position_seconds).abs() <= tolerance);
        assert!(target.asset.settings().fade);

        let battle = target.factory.latest("battle.ogg").unwrap();
        assert!(battle.is_playing());
        assert_eq!(battle.volume_history(), vec![0.0, 1.0]);
        assert_eq!(
            target.bus.events_of_type(AUDIO_RESTORE_EVENT_TYPE).len(),
            1
        );
    }

    #[test]
    fn test_restore_discards_operations_queued_before_it() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        let snapshot = h.asset.capture(cid());

        // Act
        h.asset.restore(&snapshot, cid());
        settle(&mut h.asset);

        // Assert
        let theme = h.factory.latest("theme.ogg").unwrap();
        assert_eq!(theme.volume_history(), vec![0.0, 1.0]);
        assert!(theme.is_playing());
        assert!(h.asset.is_playing());
    }

    #[test]
    fn test_restore_silences_previously_playing_track() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);
        let snapshot = AudioSnapshot {
            is_playing: true,
            fade: false,
            fade_in_ms: 100,
            fade_out_ms: 100,
            current_track: Some("battle".to_owned()),
            position_seconds: 3.0,
        };

        // Act
        h.asset.restore(&snapshot, cid());
        settle(&mut h.asset);

        // Assert
        assert!(!h.factory.latest("theme.ogg").unwrap().is_playing());
        let battle = h.factory.latest("battle.ogg").unwrap();
        assert!(battle.is_playing());
        assert_eq!(battle.current_position(), 3.0);
        assert_eq!(h.asset.current_track(), Some("battle"));
        assert!(!h.asset.settings().fade);
    }

    #[test]
    fn test_restore_stopped_snapshot_leaves_asset_stopped() {
        // Arrange
        let mut h = harness(MUSIC);
        h.asset.set_track("theme", &FadeOptions::default(), cid());
        h.asset.play(&FadeOptions::default(), cid());
        settle(&mut h.asset);
        let snapshot = AudioSnapshot {
            is_playing: false,
            fade: true,
            fade_in_ms: 100,
            fade_out_ms: 50,
            current_track: Some("theme".to_owned()),
            position_seconds: 0.0,
        };

        // Act
        h.asset.restore(&snapshot, cid());
        settle(&mut h.asset);

        // Assert
        assert!(!h.asset.is_playing());
        assert!(!h.asset.is_playing_physical());
        assert!(h.factory.created().iter().all(|r| !r.is_playing()));
    }
}
