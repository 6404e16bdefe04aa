//! Application services for the audio asset context.

pub mod command_handlers;
pub mod persistence;
