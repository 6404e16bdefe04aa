//! Command handlers for the audio asset context.
//!
//! Script directives arrive as a name plus raw attributes. The handler maps
//! each one onto the matching controller operation. Problems with a directive
//! never abort the story: they are reported as warnings and the directive is
//! skipped.

use tracing::{info, instrument};
use webstory_core::command::Command;

use crate::domain::asset::AudioAsset;
use crate::domain::directives::Directive;

/// Applies a script directive to an asset.
///
/// Recognised names are `play`, `stop`, `pause` and `set`. `play`, `stop`
/// and `set` honour the `fade`, `fadein` and `fadeout` attributes; `set`
/// requires a `track` attribute.
#[instrument(skip(asset, directive), fields(asset = %asset.name(), directive = %directive.name, correlation_id = %directive.correlation_id))]
pub fn handle_directive(asset: &mut AudioAsset, directive: &Directive) {
    let correlation_id = directive.correlation_id();
    let options = directive.fade_options();

    match directive.name.as_str() {
        "play" => asset.play(&options, correlation_id),
        "stop" => asset.stop(&options, correlation_id),
        "pause" => asset.pause(correlation_id),
        "set" => match directive.attribute("track") {
            Some(track) => asset.set_track(track, &options, correlation_id),
            None => {
                asset.report_warning(
                    "set".to_owned(),
                    format!(
                        "No track attribute given for set in audio element '{}'.",
                        asset.name()
                    ),
                    correlation_id,
                );
                return;
            }
        },
        other => {
            asset.report_warning(
                other.to_owned(),
                format!(
                    "Unknown command '{other}' for audio element '{}'.",
                    asset.name()
                ),
                correlation_id,
            );
            return;
        }
    }

    info!(command_type = directive.command_type(), "directive applied");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::{TimeZone, Utc};
    use webstory_core::bus::EventBus;
    use webstory_core::resource::ResourceFactory;
    use webstory_test_support::{FakeResourceFactory, FixedClock, RecordingEventBus};

    use crate::domain::asset::AssetEnvironment;
    use crate::domain::config::AudioDeclaration;
    use crate::domain::events::{
        AUDIO_PAUSED_EVENT_TYPE, AUDIO_PLAY_EVENT_TYPE, AUDIO_SET_EVENT_TYPE,
        AUDIO_STOP_EVENT_TYPE, AUDIO_WARNING_EVENT_TYPE,
    };

    const MUSIC: &str = r"
name: music
fade: true
tracks:
  - title: theme
    sources:
      - href: theme.ogg
        type: ogg
";

    fn build() -> (AudioAsset, Arc<RecordingEventBus>) {
        let bus = Arc::new(RecordingEventBus::new());
        let env = AssetEnvironment {
            factory: Arc::new(FakeResourceFactory::new()) as Arc<dyn ResourceFactory>,
            bus: Arc::clone(&bus) as Arc<dyn EventBus>,
            clock: Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            )),
            tick_ms: 10,
        };
        let declaration = AudioDeclaration::from_yaml(MUSIC).unwrap();
        let asset = AudioAsset::new(&declaration, env);
        bus.clear();
        (asset, bus)
    }

    #[test]
    fn test_handle_directive_dispatches_known_names() {
        // Arrange
        let (mut asset, bus) = build();

        // Act
        handle_directive(&mut asset, &Directive::new("set").with("track", "theme"));
        handle_directive(&mut asset, &Directive::new("play"));
        handle_directive(&mut asset, &Directive::new("pause"));
        handle_directive(&mut asset, &Directive::new("stop"));

        // Assert
        assert_eq!(
            bus.event_types(),
            vec![
                AUDIO_SET_EVENT_TYPE,
                AUDIO_PLAY_EVENT_TYPE,
                AUDIO_PAUSED_EVENT_TYPE,
                AUDIO_STOP_EVENT_TYPE,
            ]
        );
        assert_eq!(asset.current_track(), Some("theme"));
        assert!(!asset.is_playing());
    }

    #[test]
    fn test_handle_directive_applies_fade_attributes() {
        // Arrange
        let (mut asset, bus) = build();
        let directive = Directive::new("play").with("fadein", "250");

        // Act
        handle_directive(&mut asset, &directive);

        // Assert
        let play = bus.events_of_type(AUDIO_PLAY_EVENT_TYPE);
        assert_eq!(play[0].payload["PlayRequested"]["fade_in_ms"], 250);
        assert_eq!(play[0].correlation_id, directive.correlation_id);
    }

    #[test]
    fn test_handle_directive_fade_false_overrides_asset_default() {
        // Arrange
        let (mut asset, bus) = build();

        // Act
        handle_directive(&mut asset, &Directive::new("play").with("fade", "false"));

        // Assert
        let play = bus.events_of_type(AUDIO_PLAY_EVENT_TYPE);
        assert_eq!(play[0].payload["PlayRequested"]["fade_in_ms"], 0);
    }

    #[test]
    fn test_handle_directive_warns_on_set_without_track() {
        // Arrange
        let (mut asset, bus) = build();

        // Act
        handle_directive(&mut asset, &Directive::new("set"));

        // Assert
        assert_eq!(bus.event_types(), vec![AUDIO_WARNING_EVENT_TYPE]);
        assert_eq!(asset.pending_operations(), 0);
    }

    #[test]
    fn test_handle_directive_warns_on_unknown_name() {
        // Arrange
        let (mut asset, bus) = build();

        // Act
        handle_directive(&mut asset, &Directive::new("rewind"));

        // Assert
        let warnings = bus.events_of_type(AUDIO_WARNING_EVENT_TYPE);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].payload["Warning"]["message"],
            "Unknown command 'rewind' for audio element 'music'."
        );
        assert_eq!(asset.pending_operations(), 0);
    }
}
