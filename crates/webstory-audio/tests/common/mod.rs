//! Shared test helpers for audio integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use webstory_audio::domain::asset::{AssetEnvironment, AudioAsset};
use webstory_audio::domain::config::AudioDeclaration;
use webstory_audio::runtime::run_until_idle;
use webstory_core::bus::EventBus;
use webstory_core::clock::Clock;
use webstory_core::resource::ResourceFactory;
use webstory_test_support::{FakeResourceFactory, FixedClock, ManualTicker, RecordingEventBus};

/// Tick interval used across all integration tests.
pub const TICK_MS: u64 = 10;

/// A two-track asset with fading enabled.
pub const MUSIC: &str = r"
name: music
fade: true
fadein: 200
fadeout: 100
tracks:
  - title: theme
    sources:
      - href: theme.mp3
        type: mp3
      - href: theme.ogg
        type: ogg
  - title: battle
    sources:
      - href: battle.ogg
        type: ogg
";

/// An asset under test plus handles on its collaborators.
pub struct Stage {
    pub asset: AudioAsset,
    pub factory: Arc<FakeResourceFactory>,
    pub bus: Arc<RecordingEventBus>,
    pub ticker: ManualTicker,
}

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build an asset from a YAML declaration with fake resources.
pub fn stage(yaml: &str) -> Stage {
    stage_with_factory(yaml, FakeResourceFactory::new())
}

/// Build an asset from a YAML declaration with the given fake factory.
pub fn stage_with_factory(yaml: &str, factory: FakeResourceFactory) -> Stage {
    let factory = Arc::new(factory);
    let bus = Arc::new(RecordingEventBus::new());
    let env = AssetEnvironment {
        factory: Arc::clone(&factory) as Arc<dyn ResourceFactory>,
        bus: Arc::clone(&bus) as Arc<dyn EventBus>,
        clock: fixed_clock(),
        tick_ms: TICK_MS,
    };
    let declaration = AudioDeclaration::from_yaml(yaml).unwrap();
    Stage {
        asset: AudioAsset::new(&declaration, env),
        factory,
        bus,
        ticker: ManualTicker::new(TICK_MS),
    }
}

impl Stage {
    /// Tick until the queue drains; panics if it does not within 10 000 ticks.
    pub async fn settle(&mut self) -> u64 {
        let taken = run_until_idle(&mut self.asset, &mut self.ticker, 10_000).await;
        assert_eq!(self.asset.pending_operations(), 0, "queue did not drain");
        taken
    }

    /// Number of resources currently sounding, across all tracks and instances.
    pub fn sounding(&self) -> usize {
        self.factory
            .created()
            .iter()
            .filter(|r| r.is_playing())
            .count()
    }
}
