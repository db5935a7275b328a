//! The timer session.
//!
//! [`Timer`] is the single owner of timer state for a running host. It wraps
//! the [`TimerEngine`] with the settings, the clock, and the note store that
//! completed pomodoros are logged to. Every mutation goes through its
//! methods; nothing else holds a mutable handle to the engine.

use chrono::{DateTime, Duration, Local};
use std::path::{Path, PathBuf};

use super::clock::{Clock, SystemClock};
use super::engine::TimerEngine;
use super::mode::Mode;
use super::outcome::{Outcome, Warning};
use crate::error::NoteError;
use crate::events::Event;
use crate::logbook;
use crate::notes::{self, NoteStore};
use crate::storage::{ChecklistAction, Config, InvalidDurationPolicy, MAX_CUSTOM_MINUTES};

/// Status text plus whatever completion handling happened while computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub text: String,
    pub outcome: Outcome,
}

pub struct Timer<S, C = SystemClock> {
    engine: TimerEngine,
    config: Config,
    store: S,
    clock: C,
}

impl<S: NoteStore> Timer<S, SystemClock> {
    pub fn with_system_clock(config: Config, store: S) -> Self {
        Self::new(config, store, SystemClock)
    }
}

impl<S: NoteStore, C: Clock> Timer<S, C> {
    pub fn new(config: Config, store: S, clock: C) -> Self {
        let engine = TimerEngine::new(clock.now());
        Self {
            engine,
            config,
            store,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    pub fn cycle_count(&self) -> u32 {
        self.engine.cycle_count()
    }

    pub fn remaining(&self) -> Duration {
        self.engine.remaining(self.clock.now())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the settings. A running interval keeps its length; the new
    /// values apply from the next interval on.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Note a completed pomodoro would be logged to right now.
    ///
    /// `Ok(None)` when logging is off.
    pub fn log_target_path(&self) -> Result<Option<PathBuf>, NoteError> {
        logbook::target_path(&self.config, self.clock.now()).transpose()
    }

    /// Content of the checklist note, shown next to the custom timer prompt.
    pub async fn checklist_contents(&self) -> Option<String> {
        let path = self.config.checklist_path()?;
        match self.store.read(path).await {
            Ok(content) => Some(content),
            Err(NoteError::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read checklist");
                None
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start an interval of `mode`'s configured length, replacing any
    /// running one.
    pub fn start_timer(&mut self, mode: Mode) -> Outcome {
        let minutes = mode.duration_min(&self.config.timer);
        self.engine.start(mode, minutes, self.clock.now()).into()
    }

    /// Start a pomodoro of `minutes`.
    ///
    /// Values that are not positive go through the configured
    /// [`InvalidDurationPolicy`]; values above [`MAX_CUSTOM_MINUTES`] are
    /// clamped. Both cases add a warning to the outcome.
    pub fn start_custom_timer(&mut self, minutes: i64) -> Outcome {
        if minutes <= 0 {
            return self.reject_duration(minutes.to_string());
        }
        let mut outcome = Outcome::none();
        let applied = match u32::try_from(minutes) {
            Ok(m) if m <= MAX_CUSTOM_MINUTES => m,
            _ => {
                outcome.push_warning(Warning::DurationClamped {
                    requested: minutes,
                    applied: MAX_CUSTOM_MINUTES,
                });
                MAX_CUSTOM_MINUTES
            }
        };
        outcome.merge(
            self.engine
                .start(Mode::Pomo, applied, self.clock.now())
                .into(),
        );
        outcome
    }

    /// Start a custom pomodoro from raw prompt text.
    pub fn start_custom_timer_from_input(&mut self, raw: &str) -> Outcome {
        match parse_minutes(raw) {
            Some(minutes) => self.start_custom_timer(minutes),
            None => self.reject_duration(raw.trim().to_string()),
        }
    }

    pub fn toggle_pause(&mut self) -> Outcome {
        self.engine.toggle_pause(self.clock.now()).into()
    }

    pub fn quit_timer(&mut self) -> Outcome {
        self.engine.quit(self.clock.now()).into()
    }

    /// One button: start a pomodoro when idle, quit otherwise.
    pub fn on_ribbon_icon_click(&mut self) -> Outcome {
        if self.engine.is_active() {
            self.quit_timer()
        } else {
            self.start_timer(Mode::Pomo)
        }
    }

    /// React to a note change reported by the store.
    ///
    /// Only the configured checklist note matters, and only while an
    /// interval is active. The timer state itself is never changed here.
    pub async fn on_file_modify(&mut self, path: &Path) -> Outcome {
        let Some(checklist) = self.config.checklist_path() else {
            return Outcome::none();
        };
        if !notes::same_note(path, checklist) || !self.engine.is_active() {
            return Outcome::none();
        }

        let now = self.clock.now();
        let mut outcome = Outcome::event(Event::ChecklistModified {
            path: path.to_path_buf(),
            mode: self.engine.mode(),
            at: now,
        });
        if self.config.checklist.action == ChecklistAction::Log && self.config.logging.enabled {
            let line = logbook::checklist_line(&self.config, checklist, now);
            outcome.merge(self.log(&line, now).await);
        }
        outcome
    }

    /// Run completion handling.
    ///
    /// Commands do not call this themselves; a caller driving the timer
    /// directly runs it before each command, as `runtime::run` does.
    ///
    /// A finished pomodoro is logged before the engine moves on; a logging
    /// failure is reported but never holds the cycle back.
    pub async fn tick(&mut self) -> Outcome {
        let now = self.clock.now();
        if !self.engine.is_expired(now) {
            return Outcome::none();
        }

        let mut outcome = Outcome::none();
        if self.engine.mode() == Mode::Pomo && self.config.logging.enabled {
            match logbook::pomodoro_line(&self.config, now) {
                Ok(line) => outcome.merge(self.log(&line, now).await),
                Err(_) => {
                    tracing::warn!(template = %self.config.logging.text, "invalid log text template");
                    outcome.push_warning(Warning::LogFailed {
                        target: None,
                        reason: "log text is not a valid strftime pattern".into(),
                    });
                }
            }
        }
        // Completion is judged at `now`, so the log write above cannot
        // change whether the interval is over.
        outcome.merge(self.engine.tick(&self.config.timer, now).into());
        outcome
    }

    /// Completion handling followed by the status text.
    pub async fn refresh(&mut self) -> Status {
        let outcome = self.tick().await;
        let text = self.engine.render_status(self.clock.now());
        Status { text, outcome }
    }

    /// Status bar text. Runs completion handling first; warnings it
    /// produces are only reported through `tracing`.
    pub async fn status_bar_text(&mut self) -> String {
        self.refresh().await.text
    }

    /// Force the timer idle before the host goes away.
    pub fn shutdown(&mut self) -> Outcome {
        tracing::debug!("timer shutting down");
        self.quit_timer()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reject_duration(&mut self, input: String) -> Outcome {
        tracing::warn!(%input, policy = ?self.config.timer.invalid_duration, "invalid timer length");
        let mut outcome = Outcome::none();
        outcome.push_warning(Warning::InvalidDuration { input });
        if self.config.timer.invalid_duration == InvalidDurationPolicy::Fallback {
            outcome.merge(self.start_timer(Mode::Pomo));
        }
        outcome
    }

    async fn log(&self, line: &str, now: DateTime<Local>) -> Outcome {
        match logbook::write_entry(&self.store, &self.config, line, now).await {
            Ok(target) => Outcome::event(Event::EntryLogged {
                target,
                line: line.to_string(),
                at: now,
            }),
            Err(warning) => {
                let mut outcome = Outcome::none();
                outcome.push_warning(warning);
                outcome
            }
        }
    }
}

/// Read a minute count the way a number field hands it over: surrounding
/// whitespace is ignored and parsing stops at the first non-digit, so `"2.5"`
/// reads as 2. Returns `None` when no digits lead the input.
pub fn parse_minutes(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    // Overlong digit runs saturate; the caller clamps anyway.
    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::MemoryStore;
    use crate::timer::ManualClock;

    fn timer() -> (Timer<MemoryStore, ManualClock>, ManualClock, MemoryStore) {
        let clock = ManualClock::default();
        let store = MemoryStore::new();
        let timer = Timer::new(Config::default(), store.clone(), clock.clone());
        (timer, clock, store)
    }

    #[test]
    fn parse_minutes_reads_leading_integer() {
        assert_eq!(parse_minutes("25"), Some(25));
        assert_eq!(parse_minutes("  7 \n"), Some(7));
        assert_eq!(parse_minutes("2.5"), Some(2));
        assert_eq!(parse_minutes("10min"), Some(10));
        assert_eq!(parse_minutes("-3"), Some(-3));
        assert_eq!(parse_minutes("+4"), Some(4));
        assert_eq!(parse_minutes(""), None);
        assert_eq!(parse_minutes("abc"), None);
        assert_eq!(parse_minutes("-"), None);
        assert_eq!(parse_minutes("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn ribbon_click_toggles_between_pomo_and_idle() {
        let (mut timer, _, _) = timer();
        timer.on_ribbon_icon_click();
        assert_eq!(timer.mode(), Mode::Pomo);
        timer.on_ribbon_icon_click();
        assert_eq!(timer.mode(), Mode::NoTimer);
    }

    #[test]
    fn invalid_input_falls_back_to_default_length() {
        let (mut timer, _, _) = timer();
        let outcome = timer.start_custom_timer_from_input("soon");
        assert!(outcome.is_degraded());
        assert_eq!(
            outcome.warnings,
            vec![Warning::InvalidDuration {
                input: "soon".into()
            }]
        );
        assert_eq!(timer.mode(), Mode::Pomo);
        assert_eq!(timer.remaining(), Duration::minutes(25));
    }

    #[test]
    fn invalid_input_is_ignored_under_ignore_policy() {
        let (mut timer, _, _) = timer();
        let mut cfg = Config::default();
        cfg.timer.invalid_duration = InvalidDurationPolicy::Ignore;
        timer.set_config(cfg);

        timer.start_timer(Mode::ShortBreak);
        let outcome = timer.start_custom_timer(0);
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(timer.mode(), Mode::ShortBreak);
    }

    #[test]
    fn oversized_custom_length_is_clamped() {
        let (mut timer, _, _) = timer();
        let outcome = timer.start_custom_timer(100_000);
        assert_eq!(
            outcome.warnings,
            vec![Warning::DurationClamped {
                requested: 100_000,
                applied: MAX_CUSTOM_MINUTES
            }]
        );
        assert_eq!(
            timer.remaining(),
            Duration::minutes(i64::from(MAX_CUSTOM_MINUTES))
        );
    }

    #[tokio::test]
    async fn custom_length_applies_to_one_interval() {
        let (mut timer, clock, _) = timer();
        timer.start_custom_timer(2);
        clock.advance(Duration::minutes(2));
        timer.tick().await;
        assert_eq!(timer.mode(), Mode::ShortBreak);
        clock.advance(Duration::minutes(5));
        timer.tick().await;
        assert_eq!(timer.mode(), Mode::Pomo);
        assert_eq!(timer.remaining(), Duration::minutes(25));
    }

    #[tokio::test]
    async fn checklist_contents_reads_configured_note() {
        let (mut timer, _, store) = timer();
        assert_eq!(timer.checklist_contents().await, None);

        let mut cfg = Config::default();
        cfg.checklist.file = "Todo".into();
        timer.set_config(cfg);
        assert_eq!(timer.checklist_contents().await, None);

        store.insert("Todo.md", "- [ ] write");
        assert_eq!(
            timer.checklist_contents().await.as_deref(),
            Some("- [ ] write")
        );
    }

    #[test]
    fn log_target_path_reports_settings() {
        let (mut timer, _, _) = timer();
        assert_eq!(timer.log_target_path().unwrap(), None);

        let mut cfg = Config::default();
        cfg.logging.enabled = true;
        cfg.logging.file = "Pomodoro Log".into();
        timer.set_config(cfg);
        assert_eq!(
            timer.log_target_path().unwrap(),
            Some(PathBuf::from("Pomodoro Log.md"))
        );
    }

    #[test]
    fn shutdown_forces_idle() {
        let (mut timer, _, _) = timer();
        timer.start_timer(Mode::LongBreak);
        timer.toggle_pause();
        assert!(!timer.shutdown().is_noop());
        assert_eq!(timer.mode(), Mode::NoTimer);
        assert!(!timer.is_paused());
    }
}
