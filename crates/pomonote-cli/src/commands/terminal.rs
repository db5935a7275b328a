//! Status line rendering for a terminal.

use pomonote_core::{Event, Mode, Outcome, StatusSink};
use std::io::Write;

const CLEAR_LINE: &str = "\r\x1b[2K";

/// Keeps the status on the last terminal line and prints notices above it.
pub struct TerminalStatus<W: Write> {
    out: W,
    json: bool,
    current: String,
}

impl<W: Write> TerminalStatus<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            current: String::new(),
        }
    }

    fn print_above(&mut self, message: &str) {
        // A broken stdout has nowhere to report to.
        let _ = write!(self.out, "{CLEAR_LINE}{message}\n{}", self.current);
        let _ = self.out.flush();
    }
}

/// Human-readable notice for an event, if it deserves one.
pub fn describe(event: &Event) -> Option<String> {
    match event {
        Event::IntervalCompleted { mode, next, .. } => Some(match next {
            Mode::NoTimer => format!("🔔 {mode} finished"),
            next => format!("🔔 {mode} finished, starting {next}"),
        }),
        Event::EntryLogged { target, .. } => Some(format!("logged to {}", target.display())),
        Event::ChecklistModified { path, .. } => {
            Some(format!("checklist {} changed", path.display()))
        }
        Event::TimerQuit { mode, .. } => Some(format!("{mode} stopped")),
        _ => None,
    }
}

impl<W: Write> StatusSink for TerminalStatus<W> {
    fn set_text(&mut self, text: &str) {
        self.current = if text.is_empty() {
            "idle".to_string()
        } else {
            text.to_string()
        };
        let _ = write!(self.out, "{CLEAR_LINE}{}", self.current);
        let _ = self.out.flush();
    }

    fn on_outcome(&mut self, outcome: &Outcome) {
        for event in &outcome.events {
            let line = if self.json {
                serde_json::to_string(event).ok()
            } else {
                describe(event)
            };
            if let Some(line) = line {
                self.print_above(&line);
            }
        }
        for warning in &outcome.warnings {
            self.print_above(&format!("warning: {warning}"));
        }
    }

    fn show(&mut self, message: &str) {
        self.print_above(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use pomonote_core::Warning;

    fn rendered(sink: TerminalStatus<Vec<u8>>) -> String {
        String::from_utf8(sink.out).unwrap()
    }

    #[test]
    fn idle_text_renders_as_idle() {
        let mut sink = TerminalStatus::new(Vec::new(), false);
        sink.set_text("");
        assert_eq!(rendered(sink), format!("{CLEAR_LINE}idle"));
    }

    #[test]
    fn notices_print_above_status() {
        let mut sink = TerminalStatus::new(Vec::new(), false);
        sink.set_text("🥤 05:00");
        let mut outcome = Outcome::event(Event::IntervalCompleted {
            mode: Mode::Pomo,
            next: Mode::ShortBreak,
            cycle_count: 1,
            at: Local::now(),
        });
        outcome.push_warning(Warning::InvalidDuration { input: "x".into() });
        sink.on_outcome(&outcome);

        let out = rendered(sink);
        assert!(out.contains("🔔 pomodoro finished, starting short break\n🥤 05:00"));
        assert!(out.contains("warning: invalid timer length 'x'"));
    }

    #[test]
    fn json_mode_prints_events() {
        let mut sink = TerminalStatus::new(Vec::new(), true);
        sink.on_outcome(&Outcome::event(Event::TimerStarted {
            mode: Mode::Pomo,
            duration_secs: 1500,
            at: Local::now(),
        }));
        assert!(rendered(sink).contains("\"type\":\"timer_started\""));
    }
}
