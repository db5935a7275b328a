//! # Pomonote Core Library
//!
//! This library provides the pomodoro timer that lives inside a note-taking
//! host: a work/break countdown cycle, a short status string for display,
//! and a log of completed pomodoros written into the user's notes.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine; remaining time is
//!   recomputed from timestamps on every read
//! - **Timer session**: The single owner of timer state, combining the engine
//!   with settings, a clock and the note store
//! - **Notes**: Vault-backed and in-memory note stores, daily note resolution
//! - **Runtime**: One queue of ticks, commands and note changes, applied by a
//!   single loop
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Timer`]: The timer session
//! - [`TimerEngine`]: Core timer state machine
//! - [`NoteStore`]: Trait for the host's note storage
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod logbook;
pub mod notes;
pub mod runtime;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, NoteError};
pub use events::Event;
pub use notes::{MemoryStore, NoteStore, VaultStore};
pub use runtime::{Command, Input, StatusSink};
pub use storage::Config;
pub use timer::{Clock, ManualClock, Mode, Outcome, Status, SystemClock, Timer, TimerEngine, Warning};
