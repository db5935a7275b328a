use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::events::Event;

/// A recovered failure. The operation still completed, in a degraded way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Custom duration was non-numeric or not positive.
    InvalidDuration { input: String },
    /// Custom duration exceeded the maximum and was cut down.
    DurationClamped { requested: i64, applied: u32 },
    /// The log target could not be resolved or written.
    LogFailed {
        target: Option<PathBuf>,
        reason: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::InvalidDuration { input } => {
                write!(f, "invalid timer length '{input}'")
            }
            Warning::DurationClamped { requested, applied } => {
                write!(f, "timer length {requested} clamped to {applied} minutes")
            }
            Warning::LogFailed {
                target: Some(path),
                reason,
            } => write!(f, "could not log to {}: {reason}", path.display()),
            Warning::LogFailed { target: None, reason } => {
                write!(f, "could not resolve log target: {reason}")
            }
        }
    }
}

/// What a timer operation did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub events: Vec<Event>,
    pub warnings: Vec<Warning>,
}

impl Outcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn event(event: Event) -> Self {
        Self {
            events: vec![event],
            warnings: Vec::new(),
        }
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn merge(&mut self, other: Outcome) {
        self.events.extend(other.events);
        self.warnings.extend(other.warnings);
    }

    pub fn is_noop(&self) -> bool {
        self.events.is_empty() && self.warnings.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl From<Option<Event>> for Outcome {
    fn from(event: Option<Event>) -> Self {
        event.map(Outcome::event).unwrap_or_default()
    }
}
