//! WebStory Core — shared abstractions.
//!
//! This crate defines the traits and types that every asset context depends
//! on: time, ticks, notifications, commands, playback resources and snapshot
//! persistence. It contains no playback logic.

pub mod bus;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod resource;
pub mod snapshot;
pub mod ticker;
