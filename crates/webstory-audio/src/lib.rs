//! WebStory — audio asset context.
//!
//! Responsible for track playback, volume fades and the operation sequencer
//! that serializes them against a single playback resource, plus capturing
//! and restoring audio state across a save/load boundary.

pub mod application;
pub mod domain;
pub mod runtime;
