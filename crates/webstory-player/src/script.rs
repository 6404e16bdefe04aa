//! Timed directive scripts.
//!
//! A script is a YAML list of steps. Each step fires at an offset from the
//! start of the run and is either a directive for the asset (`play`, `stop`,
//! `pause`, `set`, or anything else, which the asset reports as unknown) or
//! a host event (`blur`, `focus`, `save`, `load`).
//!
//! ```yaml
//! steps:
//!   - at_ms: 0
//!     command: set
//!     attributes: { track: theme }
//!   - at_ms: 0
//!     command: play
//!   - at_ms: 1500
//!     command: save
//!     attributes: { slot: quick }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use uuid::Uuid;
use webstory_audio::domain::directives::Directive;

use crate::error::PlayerError;

/// Slot used by `save` and `load` steps without a `slot` attribute.
pub const DEFAULT_SLOT: &str = "quicksave";

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Step {
    /// Offset from the start of the run, in milliseconds.
    #[serde(default)]
    pub at_ms: u64,
    /// Step name.
    pub command: String,
    /// Raw attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// What a step does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Hand a directive to the asset.
    Directive(Directive),
    /// The host window lost focus.
    Blur,
    /// The host window regained focus.
    Focus,
    /// Save the asset state to a slot.
    Save(String),
    /// Load the asset state from a slot.
    Load(String),
}

impl Step {
    /// Interprets the step.
    #[must_use]
    pub fn action(&self) -> StepAction {
        let slot = || {
            self.attributes
                .get("slot")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SLOT.to_owned())
        };
        match self.command.as_str() {
            "blur" => StepAction::Blur,
            "focus" => StepAction::Focus,
            "save" => StepAction::Save(slot()),
            "load" => StepAction::Load(slot()),
            name => StepAction::Directive(Directive {
                correlation_id: Uuid::new_v4(),
                name: name.to_owned(),
                attributes: self.attributes.clone(),
            }),
        }
    }
}

/// A parsed script, steps ordered by firing time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    /// Steps in firing order. Steps sharing an offset keep their file order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parses a script from YAML.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Script` if the document is malformed.
    pub fn from_yaml(document: &str) -> Result<Self, PlayerError> {
        let mut script: Self = serde_yaml::from_str(document)?;
        script.steps.sort_by_key(|step| step.at_ms);
        Ok(script)
    }

    /// Returns the offset of the last step.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.steps.last().map_or(0, |step| step.at_ms)
    }
}
