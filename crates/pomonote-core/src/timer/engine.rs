//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads and does not read the clock itself: every command takes
//! the current instant, and remaining time is recomputed from timestamps on
//! each call. Skipped or late ticks therefore cannot corrupt the countdown.
//!
//! ## State Transitions
//!
//! ```text
//! NoTimer -> Pomo -> (ShortBreak | LongBreak) -> Pomo -> ... -> NoTimer
//! ```
//!
//! `quit` returns to `NoTimer` from anywhere. Pausing freezes the elapsed
//! time without leaving the current mode.

use chrono::{DateTime, Duration, Local};

use super::mode::Mode;
use crate::events::Event;
use crate::storage::TimerConfig;

/// Status text shown while no interval is active.
pub const IDLE_STATUS: &str = "";

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    mode: Mode,
    /// When the current interval began or was last resumed.
    started_at: DateTime<Local>,
    duration: Duration,
    /// Elapsed time carried across pause boundaries.
    elapsed_before_pause: Duration,
    paused: bool,
    /// Completed work intervals since the engine was created.
    cycle_count: u32,
}

impl TimerEngine {
    /// Create an idle engine.
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            mode: Mode::NoTimer,
            started_at: now,
            duration: Duration::zero(),
            elapsed_before_pause: Duration::zero(),
            paused: false,
            cycle_count: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_active()
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// Planned length of the current interval. Zero when idle.
    pub fn duration(&self) -> Duration {
        if self.is_active() {
            self.duration
        } else {
            Duration::zero()
        }
    }

    /// Time spent in the current interval, excluding pauses.
    pub fn elapsed(&self, now: DateTime<Local>) -> Duration {
        if !self.is_active() {
            return Duration::zero();
        }
        if self.paused {
            return self.elapsed_before_pause;
        }
        // A clock stepping backwards must not give time back.
        let running = (now - self.started_at).max(Duration::zero());
        self.elapsed_before_pause + running
    }

    /// Remaining time, clamped to zero.
    pub fn remaining(&self, now: DateTime<Local>) -> Duration {
        if !self.is_active() {
            return Duration::zero();
        }
        (self.duration - self.elapsed(now)).max(Duration::zero())
    }

    /// True when a running (not paused) interval has reached zero.
    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        self.is_active() && !self.paused && self.remaining(now) <= Duration::zero()
    }

    /// Mode that follows the current one when it completes.
    ///
    /// `cycle_count` must already include the interval being completed.
    pub fn next_mode(&self, long_break_interval: u32) -> Mode {
        match self.mode {
            Mode::Pomo => {
                let interval = long_break_interval.max(1);
                if self.cycle_count > 0 && self.cycle_count % interval == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Pomo,
            Mode::NoTimer => Mode::NoTimer,
        }
    }

    /// Render the remaining time as `<marker> MM:SS`.
    ///
    /// Pure: does not run completion handling. Minutes are not capped at two
    /// digits, so a 120 minute interval renders as `120:00`.
    pub fn render_status(&self, now: DateTime<Local>) -> String {
        if !self.is_active() {
            return IDLE_STATUS.to_string();
        }
        let total_secs = self.remaining(now).num_seconds().max(0);
        let mut text = format!(
            "{} {:02}:{:02}",
            self.mode.marker(),
            total_secs / 60,
            total_secs % 60
        );
        if self.paused {
            text.push_str(" ⏸");
        }
        text
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new interval, replacing whatever was running.
    ///
    /// Starting `NoTimer` is the same as quitting.
    pub fn start(&mut self, mode: Mode, minutes: u32, now: DateTime<Local>) -> Option<Event> {
        if mode == Mode::NoTimer {
            return self.quit(now);
        }
        self.mode = mode;
        self.started_at = now;
        self.duration = Duration::minutes(i64::from(minutes));
        self.elapsed_before_pause = Duration::zero();
        self.paused = false;
        tracing::debug!(%mode, minutes, "interval started");
        Some(Event::TimerStarted {
            mode,
            duration_secs: self.duration.num_seconds(),
            at: now,
        })
    }

    pub fn toggle_pause(&mut self, now: DateTime<Local>) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        if self.paused {
            self.started_at = now;
            self.paused = false;
            tracing::debug!(mode = %self.mode, "resumed");
            Some(Event::TimerResumed {
                mode: self.mode,
                remaining_ms: self.remaining(now).num_milliseconds(),
                at: now,
            })
        } else {
            // Flush elapsed time first.
            self.elapsed_before_pause = self.elapsed(now);
            self.paused = true;
            tracing::debug!(mode = %self.mode, "paused");
            Some(Event::TimerPaused {
                mode: self.mode,
                remaining_ms: self.remaining(now).num_milliseconds(),
                at: now,
            })
        }
    }

    /// Drop the current interval. Idempotent; only reports when something
    /// was actually running.
    pub fn quit(&mut self, now: DateTime<Local>) -> Option<Event> {
        let was = self.mode;
        self.reset(now);
        if was.is_active() {
            tracing::debug!(mode = %was, "quit");
            Some(Event::TimerQuit { mode: was, at: now })
        } else {
            None
        }
    }

    /// Run completion handling. Returns `Some(Event::IntervalCompleted)` when
    /// the current interval had expired.
    ///
    /// A completed `Pomo` bumps the cycle count. With `auto_advance` the next
    /// interval starts at `now` with its configured length, otherwise the
    /// engine goes idle.
    pub fn tick(&mut self, cfg: &TimerConfig, now: DateTime<Local>) -> Option<Event> {
        if !self.is_expired(now) {
            return None;
        }
        let finished = self.mode;
        if finished == Mode::Pomo {
            self.cycle_count = self.cycle_count.saturating_add(1);
        }
        let next = if cfg.auto_advance {
            self.next_mode(cfg.long_break_interval)
        } else {
            Mode::NoTimer
        };
        if next.is_active() {
            self.start(next, next.duration_min(cfg), now);
        } else {
            self.reset(now);
        }
        tracing::info!(%finished, %next, cycles = self.cycle_count, "interval completed");
        Some(Event::IntervalCompleted {
            mode: finished,
            next,
            cycle_count: self.cycle_count,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset(&mut self, now: DateTime<Local>) {
        self.mode = Mode::NoTimer;
        self.started_at = now;
        self.duration = Duration::zero();
        self.elapsed_before_pause = Duration::zero();
        self.paused = false;
    }
}
