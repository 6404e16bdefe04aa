//! WebStory — headless script player.
//!
//! Loads an audio asset declaration and a timed directive script, then plays
//! the script against simulated playback resources while every notification
//! is written to the log.

pub mod bus;
pub mod config;
pub mod error;
pub mod runner;
pub mod script;
pub mod simulated;
pub mod store;
