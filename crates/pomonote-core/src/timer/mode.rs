use serde::{Deserialize, Serialize};

use crate::storage::TimerConfig;

/// What the timer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    NoTimer,
    Pomo,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub fn is_active(self) -> bool {
        self != Mode::NoTimer
    }

    pub fn is_break(self) -> bool {
        matches!(self, Mode::ShortBreak | Mode::LongBreak)
    }

    /// Configured length of an interval in this mode, in minutes.
    ///
    /// `NoTimer` has no length and returns 0.
    pub fn duration_min(self, cfg: &TimerConfig) -> u32 {
        match self {
            Mode::NoTimer => 0,
            Mode::Pomo => cfg.pomo,
            Mode::ShortBreak => cfg.short_break,
            Mode::LongBreak => cfg.long_break,
        }
    }

    /// Status bar marker.
    pub fn marker(self) -> &'static str {
        match self {
            Mode::NoTimer => "",
            Mode::Pomo => "🍅",
            Mode::ShortBreak => "🥤",
            Mode::LongBreak => "🛌",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::NoTimer => "idle",
            Mode::Pomo => "pomodoro",
            Mode::ShortBreak => "short break",
            Mode::LongBreak => "long break",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_follow_config() {
        let cfg = TimerConfig::default();
        assert_eq!(Mode::Pomo.duration_min(&cfg), 25);
        assert_eq!(Mode::ShortBreak.duration_min(&cfg), 5);
        assert_eq!(Mode::LongBreak.duration_min(&cfg), 15);
        assert_eq!(Mode::NoTimer.duration_min(&cfg), 0);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Mode::ShortBreak).unwrap(),
            "\"short_break\""
        );
        assert_eq!(serde_json::to_string(&Mode::NoTimer).unwrap(), "\"no_timer\"");
    }

    #[test]
    fn only_breaks_are_breaks() {
        assert!(Mode::LongBreak.is_break());
        assert!(Mode::ShortBreak.is_break());
        assert!(!Mode::Pomo.is_break());
        assert!(!Mode::NoTimer.is_active());
    }
}
