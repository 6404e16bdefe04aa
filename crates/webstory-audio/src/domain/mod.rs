//! Domain model for the audio asset context.

pub mod asset;
pub mod config;
pub mod deck;
pub mod directives;
pub mod events;
pub mod fade;
pub mod sequencer;
pub mod snapshot;
