//! Integration tests for saving and loading audio state.

mod common;

use uuid::Uuid;
use webstory_audio::application::command_handlers::handle_directive;
use webstory_audio::application::persistence::{load_asset, save_asset};
use webstory_audio::domain::directives::Directive;
use webstory_core::error::DomainError;
use webstory_test_support::InMemorySnapshotStore;

use common::{MUSIC, TICK_MS, stage};

#[tokio::test]
async fn test_save_and_load_round_trip_between_sessions() {
    let store = InMemorySnapshotStore::new();
    let mut before = stage(MUSIC);
    handle_directive(&mut before.asset, &Directive::new("set").with("track", "battle"));
    handle_directive(&mut before.asset, &Directive::new("play"));
    before.settle().await;
    before.factory.latest("battle.ogg").unwrap().advance_to(61.5);
    let saved = save_asset(&mut before.asset, "slot-1", &store, Uuid::new_v4())
        .await
        .unwrap();

    let mut after = stage(MUSIC);
    load_asset(&mut after.asset, "slot-1", &store, Uuid::new_v4())
        .await
        .unwrap();
    after.settle().await;
    let resumed = after.asset.capture(Uuid::new_v4());

    assert_eq!(resumed.is_playing, saved.is_playing);
    assert_eq!(resumed.current_track, saved.current_track);
    assert_eq!(resumed.fade, saved.fade);
    assert_eq!(resumed.fade_in_ms, saved.fade_in_ms);
    assert_eq!(resumed.fade_out_ms, saved.fade_out_ms);
    #[allow(clippy::cast_precision_loss)]
    let tolerance = TICK_MS as f64 / 1000.0;
    assert!((resumed.position_seconds - 61.5).abs() <= tolerance);

    // Loading resumes at full volume without a fade-in.
    let battle = after.factory.latest("battle.ogg").unwrap();
    assert_eq!(battle.volume_history(), vec![0.0, 1.0]);
    assert_eq!(after.sounding(), 1);
}

#[tokio::test]
async fn test_load_into_playing_asset_replaces_current_sound() {
    let store = InMemorySnapshotStore::new();
    let mut asset = stage(MUSIC);
    handle_directive(&mut asset.asset, &Directive::new("set").with("track", "battle"));
    save_asset(&mut asset.asset, "quiet", &store, Uuid::new_v4())
        .await
        .unwrap();
    handle_directive(&mut asset.asset, &Directive::new("set").with("track", "theme"));
    handle_directive(&mut asset.asset, &Directive::new("play"));
    asset.settle().await;
    assert_eq!(asset.sounding(), 1);

    load_asset(&mut asset.asset, "quiet", &store, Uuid::new_v4())
        .await
        .unwrap();
    asset.settle().await;

    assert_eq!(asset.sounding(), 0);
    assert!(!asset.asset.is_playing());
    assert_eq!(asset.asset.current_track(), Some("battle"));
    assert_eq!(asset.asset.deck().current_track(), Some("battle"));
}

#[tokio::test]
async fn test_load_mid_transition_drops_queued_operations() {
    let store = InMemorySnapshotStore::new();
    let mut asset = stage(MUSIC);
    handle_directive(&mut asset.asset, &Directive::new("set").with("track", "theme"));
    handle_directive(&mut asset.asset, &Directive::new("play"));
    asset.settle().await;
    save_asset(&mut asset.asset, "slot-1", &store, Uuid::new_v4())
        .await
        .unwrap();

    handle_directive(&mut asset.asset, &Directive::new("stop"));
    assert!(asset.asset.pending_operations() > 0);
    load_asset(&mut asset.asset, "slot-1", &store, Uuid::new_v4())
        .await
        .unwrap();
    asset.settle().await;

    assert!(asset.asset.is_playing());
    assert_eq!(asset.sounding(), 1);
    let theme = asset.factory.latest("theme.mp3").unwrap();
    assert!(theme.is_playing());
    assert_eq!(theme.current_volume(), 1.0);
}

#[tokio::test]
async fn test_load_from_empty_slot_fails_without_side_effects() {
    let store = InMemorySnapshotStore::new();
    let mut asset = stage(MUSIC);

    let result = load_asset(&mut asset.asset, "missing", &store, Uuid::new_v4()).await;

    assert!(matches!(result, Err(DomainError::SnapshotNotFound(_))));
    assert_eq!(asset.asset.pending_operations(), 0);
}
