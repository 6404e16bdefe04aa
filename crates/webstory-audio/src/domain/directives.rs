//! Directives addressed to an audio asset by the script interpreter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webstory_core::command::Command;

/// A script command: a name plus string attributes, as written in the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// The correlation ID for tracing.
    #[serde(default = "Uuid::new_v4")]
    pub correlation_id: Uuid,
    /// Directive name: `play`, `stop`, `pause` or `set`.
    pub name: String,
    /// Raw attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Directive {
    /// Creates a directive without attributes.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            name: name.to_owned(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Extracts the fade overrides carried by this directive.
    #[must_use]
    pub fn fade_options(&self) -> FadeOptions {
        FadeOptions::from_attributes(&self.attributes)
    }
}

impl Command for Directive {
    fn command_type(&self) -> &'static str {
        match self.name.as_str() {
            "play" => "audio.play",
            "stop" => "audio.stop",
            "pause" => "audio.pause",
            "set" => "audio.set",
            _ => "audio.unknown",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Per-command fade overrides. `None` means "use the asset default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FadeOptions {
    /// Whether to fade at all.
    pub fade: Option<bool>,
    /// Fade-in duration in milliseconds.
    pub fade_in_ms: Option<u64>,
    /// Fade-out duration in milliseconds.
    pub fade_out_ms: Option<u64>,
}

impl FadeOptions {
    /// Reads `fade`, `fadein` and `fadeout`. Values that are not `true`/`false`
    /// or not a positive integer are treated as absent.
    #[must_use]
    pub fn from_attributes(attributes: &BTreeMap<String, String>) -> Self {
        let fade = match attributes.get("fade").map(String::as_str) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };
        Self {
            fade,
            fade_in_ms: positive_ms(attributes.get("fadein")),
            fade_out_ms: positive_ms(attributes.get("fadeout")),
        }
    }

    /// Options that disable fading regardless of the asset default.
    #[must_use]
    pub fn without_fade() -> Self {
        Self {
            fade: Some(false),
            ..Self::default()
        }
    }
}

fn positive_ms(value: Option<&String>) -> Option<u64> {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
}
