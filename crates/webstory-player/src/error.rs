//! WebStory player — error types.

use std::path::PathBuf;

use thiserror::Error;
use webstory_audio::domain::config::ConfigError;
use webstory_core::error::DomainError;

/// Startup and runtime errors for the player.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An input file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The asset declaration is malformed.
    #[error(transparent)]
    Asset(#[from] ConfigError),

    /// The directive script is malformed.
    #[error("invalid script: {0}")]
    Script(#[from] serde_yaml::Error),

    /// A savegame operation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
