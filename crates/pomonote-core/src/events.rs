use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::timer::Mode;

/// Every state change in the timer produces an Event.
/// The host renders them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        duration_secs: i64,
        at: DateTime<Local>,
    },
    TimerPaused {
        mode: Mode,
        remaining_ms: i64,
        at: DateTime<Local>,
    },
    TimerResumed {
        mode: Mode,
        remaining_ms: i64,
        at: DateTime<Local>,
    },
    TimerQuit {
        mode: Mode,
        at: DateTime<Local>,
    },
    /// An interval ran to zero. `next` is `NoTimer` when auto-advance is off.
    IntervalCompleted {
        mode: Mode,
        next: Mode,
        cycle_count: u32,
        at: DateTime<Local>,
    },
    /// The configured checklist note changed while an interval was active.
    ChecklistModified {
        path: PathBuf,
        mode: Mode,
        at: DateTime<Local>,
    },
    /// A line was appended to the log target.
    EntryLogged {
        target: PathBuf,
        line: String,
        at: DateTime<Local>,
    },
}
