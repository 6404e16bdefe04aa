//! Declarative audio asset configuration.
//!
//! Asset definitions arrive as YAML documents. Every field is optional at the
//! parsing stage; validation turns an incomplete declaration into a usable
//! set of tracks plus a list of warnings, never into a hard failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use webstory_core::resource::{AudioFormat, MediaSource, ResourceFactory};

use super::fade::DEFAULT_TICK_MS;

/// Fade duration used when a declaration omits `fadein`/`fadeout`.
pub const DEFAULT_FADE_MS: u64 = 1000;

/// Fade duration of the automatic pause on window blur and resume on focus.
pub const AUTOPAUSE_FADE_MS: u64 = 500;

/// Errors raised while reading an asset declaration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid YAML or does not match the schema.
    #[error("invalid audio declaration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// An `<audio>` asset declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioDeclaration {
    /// Asset name, used to address the asset from scripts.
    pub name: Option<String>,
    /// Pause on window blur, resume on focus.
    #[serde(default)]
    pub autopause: bool,
    /// Restart tracks when they end.
    #[serde(default, rename = "loop")]
    pub looping: bool,
    /// Fade by default on play and stop.
    #[serde(default)]
    pub fade: bool,
    /// Default fade-in duration in milliseconds.
    pub fadein: Option<u64>,
    /// Default fade-out duration in milliseconds.
    pub fadeout: Option<u64>,
    /// Track declarations.
    #[serde(default)]
    pub tracks: Vec<TrackDeclaration>,
}

/// A `<track>` declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackDeclaration {
    /// Track title, used by `set track=<title>`.
    pub title: Option<String>,
    /// Alternative encodings of the track.
    #[serde(default)]
    pub sources: Vec<SourceDeclaration>,
}

/// A `<source>` declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDeclaration {
    /// Media location.
    pub href: Option<String>,
    /// Declared encoding (`mp3` or `ogg`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Runtime settings of an audio asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSettings {
    /// Pause on window blur, resume on focus.
    pub autopause: bool,
    /// Restart tracks when they end.
    pub looping: bool,
    /// Fade by default on play and stop.
    pub fade: bool,
    /// Default fade-in duration in milliseconds.
    pub fade_in_ms: u64,
    /// Default fade-out duration in milliseconds.
    pub fade_out_ms: u64,
    /// Sequencer tick interval in milliseconds.
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            autopause: false,
            looping: false,
            fade: false,
            fade_in_ms: DEFAULT_FADE_MS,
            fade_out_ms: DEFAULT_FADE_MS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

/// A non-fatal problem found in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// The offending declaration.
    pub element: String,
    /// Human-readable explanation.
    pub message: String,
}

/// A validated track ready to be put on the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    /// Track title.
    pub title: String,
    /// The source chosen for this host.
    pub source: MediaSource,
}

impl AudioDeclaration {
    /// Parses a declaration from YAML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is malformed.
    pub fn from_yaml(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(document)?)
    }

    /// Returns the declared name, or an empty string.
    #[must_use]
    pub fn asset_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Derives runtime settings. Missing or zero durations fall back to
    /// [`DEFAULT_FADE_MS`].
    #[must_use]
    pub fn settings(&self, tick_ms: u64) -> AudioSettings {
        AudioSettings {
            autopause: self.autopause,
            looping: self.looping,
            fade: self.fade,
            fade_in_ms: self.fadein.filter(|ms| *ms > 0).unwrap_or(DEFAULT_FADE_MS),
            fade_out_ms: self.fadeout.filter(|ms| *ms > 0).unwrap_or(DEFAULT_FADE_MS),
            tick_ms: tick_ms.max(1),
        }
    }

    /// Validates the track declarations against what the host can play.
    ///
    /// Tracks without a title, without sources, or without a playable source
    /// are dropped; sources without `href` or `type` are ignored. Each drop is
    /// reported as a warning.
    #[must_use]
    pub fn resolve_tracks(
        &self,
        factory: &dyn ResourceFactory,
    ) -> (Vec<ResolvedTrack>, Vec<ConfigWarning>) {
        let name = self.asset_name();
        let element = format!("audio[name={name}]");
        let mut tracks = Vec::new();
        let mut warnings = Vec::new();
        let mut warn = |message: String| {
            warnings.push(ConfigWarning {
                element: element.clone(),
                message,
            });
        };

        if self.tracks.is_empty() {
            warn(format!("No tracks defined for audio element '{name}'."));
        }

        for track in &self.tracks {
            let Some(title) = track.title.as_deref() else {
                warn(format!("No title defined for track in audio element '{name}'."));
                continue;
            };

            if track.sources.is_empty() {
                warn(format!(
                    "No sources defined for track '{title}' in audio element '{name}'."
                ));
                continue;
            }

            let mut mp3 = None;
            let mut ogg = None;
            for source in &track.sources {
                let Some(href) = source.href.as_deref() else {
                    warn(format!(
                        "No href defined for source in track '{title}' in audio element '{name}'."
                    ));
                    continue;
                };
                let Some(kind) = source.kind.as_deref() else {
                    warn(format!(
                        "No type defined for source in track '{title}' in audio element '{name}'."
                    ));
                    continue;
                };
                match AudioFormat::parse(kind) {
                    Some(AudioFormat::Mp3) => mp3 = Some(href),
                    Some(AudioFormat::Ogg) => ogg = Some(href),
                    None => tracing::debug!(track = title, kind, "ignoring unsupported source type"),
                }
            }

            let chosen = match (mp3, ogg) {
                (Some(href), _) if factory.can_play(AudioFormat::Mp3) => {
                    Some((href, AudioFormat::Mp3))
                }
                (_, Some(href)) => Some((href, AudioFormat::Ogg)),
                _ => None,
            };

            let Some((href, format)) = chosen else {
                warn(format!(
                    "No usable source found for track '{title}' in audio element '{name}'."
                ));
                continue;
            };

            tracks.push(ResolvedTrack {
                title: title.to_owned(),
                source: MediaSource {
                    href: href.to_owned(),
                    format,
                },
            });
        }

        (tracks, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webstory_test_support::FakeResourceFactory;

    const FULL: &str = r"
name: music
autopause: true
loop: true
fade: true
fadein: 2000
fadeout: 300
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

    #[test]
    fn test_from_yaml_reads_all_attributes() {
        // Act
        let decl = AudioDeclaration::from_yaml(FULL).unwrap();

        // Assert
        assert_eq!(decl.asset_name(), "music");
        let settings = decl.settings(10);
        assert!(settings.autopause);
        assert!(settings.looping);
        assert!(settings.fade);
        assert_eq!(settings.fade_in_ms, 2000);
        assert_eq!(settings.fade_out_ms, 300);
        assert_eq!(decl.tracks.len(), 2);
    }

    #[test]
    fn test_settings_fall_back_to_defaults() {
        // Arrange
        let decl = AudioDeclaration::from_yaml("name: sfx\nfadein: 0\n").unwrap();

        // Act
        let settings = decl.settings(10);

        // Assert
        assert!(!settings.autopause);
        assert!(!settings.looping);
        assert!(!settings.fade);
        assert_eq!(settings.fade_in_ms, DEFAULT_FADE_MS);
        assert_eq!(settings.fade_out_ms, DEFAULT_FADE_MS);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let result = AudioDeclaration::from_yaml("tracks: [unterminated");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_resolve_prefers_mp3_when_supported() {
        // Arrange
        let decl = AudioDeclaration::from_yaml(FULL).unwrap();
        let factory = FakeResourceFactory::new();

        // Act
        let (tracks, warnings) = decl.resolve_tracks(&factory);

        // Assert
        assert!(warnings.is_empty());
        assert_eq!(tracks[0].title, "theme");
        assert_eq!(tracks[0].source.href, "theme.mp3");
        assert_eq!(tracks[0].source.format, AudioFormat::Mp3);
    }

    #[test]
    fn test_resolve_falls_back_to_ogg_without_mp3_support() {
        // Arrange
        let decl = AudioDeclaration::from_yaml(FULL).unwrap();
        let factory = FakeResourceFactory::without_mp3();

        // Act
        let (tracks, _) = decl.resolve_tracks(&factory);

        // Assert
        assert_eq!(tracks[0].source.href, "theme.ogg");
        assert_eq!(tracks[0].source.format, AudioFormat::Ogg);
    }

    #[test]
    fn test_resolve_drops_unusable_tracks_with_warnings() {
        // Arrange
        let decl = AudioDeclaration::from_yaml(
            r"
name: music
tracks:
  - sources:
      - href: untitled.ogg
        type: ogg
  - title: silent
  - title: mp3only
    sources:
      - href: only.mp3
        type: mp3
  - title: partial
    sources:
      - href: nohref-type.ogg
      - type: ogg
      - href: ok.ogg
        type: ogg
",
        )
        .unwrap();
        let factory = FakeResourceFactory::without_mp3();

        // Act
        let (tracks, warnings) = decl.resolve_tracks(&factory);

        // Assert
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["partial"]);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "No title defined for track in audio element 'music'.",
                "No sources defined for track 'silent' in audio element 'music'.",
                "No usable source found for track 'mp3only' in audio element 'music'.",
                "No type defined for source in track 'partial' in audio element 'music'.",
                "No href defined for source in track 'partial' in audio element 'music'.",
            ]
        );
        assert!(warnings.iter().all(|w| w.element == "audio[name=music]"));
    }

    #[test]
    fn test_resolve_without_tracks_warns_once() {
        // Arrange
        let decl = AudioDeclaration::from_yaml("name: empty\n").unwrap();

        // Act
        let (tracks, warnings) = decl.resolve_tracks(&FakeResourceFactory::new());

        // Assert
        assert!(tracks.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message,
            "No tracks defined for audio element 'empty'."
        );
    }
}
