//! Script runner.
//!
//! Steps fire once the tick clock reaches their offset. Between steps the
//! asset is ticked as usual; after the last step the queue is drained within
//! a fixed budget.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use uuid::Uuid;
use webstory_audio::application::command_handlers::handle_directive;
use webstory_audio::application::persistence::{load_asset, save_asset};
use webstory_audio::domain::asset::{AssetEnvironment, AudioAsset};
use webstory_audio::domain::config::AudioDeclaration;
use webstory_audio::runtime::{IntervalTicker, run_until_idle};
use webstory_core::clock::SystemClock;
use webstory_core::error::DomainError;
use webstory_core::snapshot::SnapshotStore;
use webstory_core::ticker::Ticker;

use crate::bus::TracingEventBus;
use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::script::{Script, Step, StepAction};
use crate::simulated::SimulatedResourceFactory;
use crate::store::JsonFileSnapshotStore;

/// Time allowed for the queue to drain after the last step.
pub const DRAIN_BUDGET_MS: u64 = 60_000;

/// Outcome of a script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks elapsed.
    pub ticks: u64,
    /// Steps applied.
    pub steps: usize,
    /// Whether the queue drained before the budget ran out.
    pub settled: bool,
}

/// Plays `script` against `asset`.
///
/// A `load` from an empty slot is logged and skipped.
///
/// # Errors
///
/// Returns `PlayerError::Domain` if the snapshot store fails or a slot holds
/// an unreadable snapshot.
pub async fn run_script(
    asset: &mut AudioAsset,
    script: &Script,
    ticker: &mut dyn Ticker,
    store: &dyn SnapshotStore,
) -> Result<RunSummary, PlayerError> {
    let interval_ms = ticker.interval_ms().max(1);
    let mut ticks: u64 = 0;

    for step in &script.steps {
        while ticks * interval_ms < step.at_ms {
            ticker.tick().await;
            asset.tick();
            ticks += 1;
        }
        apply_step(asset, step, store).await?;
    }

    ticks += run_until_idle(asset, ticker, DRAIN_BUDGET_MS / interval_ms).await;
    let settled = asset.pending_operations() == 0;
    if !settled {
        warn!(asset = %asset.name(), pending = asset.pending_operations(), "queue still busy after drain budget");
    }

    Ok(RunSummary {
        ticks,
        steps: script.steps.len(),
        settled,
    })
}

#[instrument(skip(asset, step, store), fields(at_ms = step.at_ms, command = %step.command))]
async fn apply_step(
    asset: &mut AudioAsset,
    step: &Step,
    store: &dyn SnapshotStore,
) -> Result<(), PlayerError> {
    match step.action() {
        StepAction::Directive(directive) => handle_directive(asset, &directive),
        StepAction::Blur => asset.window_blurred(),
        StepAction::Focus => asset.window_focused(),
        StepAction::Save(slot) => {
            save_asset(asset, &slot, store, Uuid::new_v4()).await?;
        }
        StepAction::Load(slot) => match load_asset(asset, &slot, store, Uuid::new_v4()).await {
            Ok(_) => {}
            Err(DomainError::SnapshotNotFound(slot)) => {
                warn!(%slot, "savegame slot is empty, load skipped");
            }
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}

async fn read_file(path: &Path) -> Result<String, PlayerError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PlayerError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads the configured asset and script and plays them in real time.
///
/// # Errors
///
/// Returns `PlayerError` if an input file cannot be read or parsed, or if a
/// savegame operation fails.
pub async fn run_player(config: &PlayerConfig) -> Result<RunSummary, PlayerError> {
    let declaration = AudioDeclaration::from_yaml(&read_file(&config.asset_path).await?)?;
    let script = Script::from_yaml(&read_file(&config.script_path).await?)?;

    let mut factory = SimulatedResourceFactory::new(config.track_length_ms.map(Duration::from_millis));
    if config.ogg_only {
        factory = factory.without_mp3();
    }
    let env = AssetEnvironment {
        factory: Arc::new(factory),
        bus: Arc::new(TracingEventBus),
        clock: Arc::new(SystemClock),
        tick_ms: config.tick_ms,
    };
    let mut asset = AudioAsset::new(&declaration, env);
    let store = JsonFileSnapshotStore::new(&config.save_path);
    let mut ticker = IntervalTicker::new(config.tick_ms);

    info!(
        asset = %asset.name(),
        steps = script.steps.len(),
        duration_ms = script.duration_ms(),
        "running script"
    );
    run_script(&mut asset, &script, &mut ticker, &store).await
}
