//! Player configuration read from the environment.

use std::path::PathBuf;

use webstory_audio::domain::fade::DEFAULT_TICK_MS;

use crate::error::PlayerError;

/// Savegame directory used when `WEBSTORY_SAVE_PATH` is unset.
pub const DEFAULT_SAVE_PATH: &str = "saves";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Runtime configuration of the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// YAML asset declaration (`WEBSTORY_ASSET`).
    pub asset_path: PathBuf,
    /// YAML directive script (`WEBSTORY_SCRIPT`).
    pub script_path: PathBuf,
    /// Tick interval in milliseconds (`WEBSTORY_TICK_MS`, default 10).
    pub tick_ms: u64,
    /// Savegame directory (`WEBSTORY_SAVE_PATH`, default `saves`).
    pub save_path: PathBuf,
    /// Length of every simulated track in milliseconds (`WEBSTORY_TRACK_MS`).
    /// Tracks are endless when unset.
    pub track_length_ms: Option<u64>,
    /// Simulate a host that cannot decode mp3 (`WEBSTORY_OGG_ONLY`, default
    /// `false`).
    pub ogg_only: bool,
    /// Log format (`WEBSTORY_LOG_FORMAT`, `json` or `pretty`, default `json`).
    pub log_format: LogFormat,
}

impl PlayerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, PlayerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PlayerError> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                PlayerError::Config(format!("{key} environment variable must be set"))
            })
        };

        let asset_path = PathBuf::from(required("WEBSTORY_ASSET")?);
        let script_path = PathBuf::from(required("WEBSTORY_SCRIPT")?);

        let tick_ms = positive_ms(&lookup, "WEBSTORY_TICK_MS")?.unwrap_or(DEFAULT_TICK_MS);
        let track_length_ms = positive_ms(&lookup, "WEBSTORY_TRACK_MS")?;

        let ogg_only = match lookup("WEBSTORY_OGG_ONLY").as_deref().map(str::trim) {
            None | Some("false" | "0") => false,
            Some("true" | "1") => true,
            Some(other) => {
                return Err(PlayerError::Config(format!(
                    "WEBSTORY_OGG_ONLY must be 'true' or 'false', got '{other}'"
                )));
            }
        };

        let log_format = match lookup("WEBSTORY_LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(PlayerError::Config(format!(
                    "WEBSTORY_LOG_FORMAT must be 'json' or 'pretty', got '{other}'"
                )));
            }
        };

        Ok(Self {
            asset_path,
            script_path,
            tick_ms,
            save_path: lookup("WEBSTORY_SAVE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH), PathBuf::from),
            track_length_ms,
            ogg_only,
            log_format,
        })
    }
}

fn positive_ms(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<u64>, PlayerError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Some)
        .ok_or_else(|| PlayerError::Config(format!("{key} must be a positive integer, got '{raw}'")))
}
