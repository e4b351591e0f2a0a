//! Human-readable feedback for UI consumers and screen-reader live regions.
use serde::Serialize;
use std::cell::RefCell;

use crate::registry::{ToggleId, ToggleSpec};
use crate::value::ToggleValue;

pub const RESET_MESSAGE: &str = "All accessibility settings were reset";
pub const SOFT_SAVE_WARNING: &str = "Some preferences may not be saved";
pub const SPEECH_UNAVAILABLE: &str = "Text to speech is not supported in this browser";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub tone: Tone,
}

impl StatusMessage {
    #[must_use]
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Warning)
    }

    /// Describe a toggle's new value.
    #[must_use]
    pub fn describe(spec: &ToggleSpec, value: &ToggleValue) -> Self {
        let tone = if spec.is_default(value) {
            Tone::Info
        } else {
            Tone::Success
        };
        let text = match value {
            ToggleValue::Flag(true) => format!("{} enabled", spec.label),
            ToggleValue::Flag(false) => format!("{} disabled", spec.label),
            ToggleValue::Level(level) if spec.id == ToggleId::FontSize => {
                format!("{} set to {level}%", spec.label)
            }
            ToggleValue::Level(level) => match spec.level_labels.get(usize::from(*level)) {
                Some(name) => format!("{}: {name}", spec.label),
                None => format!("{} set to level {level}", spec.label),
            },
            ToggleValue::Modes(modes) if modes.is_empty() => format!("{} off", spec.label),
            ToggleValue::Modes(modes) => {
                let names: Vec<&str> = modes.iter().map(|mode| mode.label()).collect();
                format!("{} active: {}", spec.label, names.join(", "))
            }
        };
        Self { text, tone }
    }
}

/// Destination for status messages (a live region on the web).
pub trait StatusSink {
    fn publish(&self, message: &StatusMessage);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn publish(&self, _message: &StatusMessage) {}
}

/// Keeps every published message, newest last.
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    messages: RefCell<Vec<StatusMessage>>,
}

impl RecordingStatusSink {
    #[must_use]
    pub fn messages(&self) -> Vec<StatusMessage> {
        self.messages.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<StatusMessage> {
        self.messages.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl StatusSink for RecordingStatusSink {
    fn publish(&self, message: &StatusMessage) {
        self.messages.borrow_mut().push(message.clone());
    }
}
