//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Interval lengths and the long-break threshold
//! - Where completed pomodoros are logged
//! - The vault layout used to resolve daily notes
//! - The checklist note watched while a timer runs
//!
//! Configuration is stored at `~/.config/pomonote/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Longest interval a custom timer may request, in minutes.
pub const MAX_CUSTOM_MINUTES: u32 = 24 * 60;

/// Longest accepted status refresh period, in milliseconds.
pub const MAX_TICK_MS: u64 = 60_000;

/// What to do with a custom timer length that is not a positive number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidDurationPolicy {
    /// Start a pomodoro of the configured default length.
    #[default]
    Fallback,
    /// Leave the timer as it is.
    Ignore,
}

/// What a change to the checklist note does while a timer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistAction {
    /// Report the change, leave the timer alone.
    #[default]
    Observe,
    /// Also append a line to the log target.
    Log,
}

/// Interval configuration. Lengths are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_pomo")]
    pub pomo: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    /// Every Nth completed pomodoro is followed by a long break.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default = "default_true")]
    pub auto_advance: bool,
    #[serde(default)]
    pub invalid_duration: InvalidDurationPolicy,
}

/// Log target configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Log into today's daily note instead of `file`.
    #[serde(default)]
    pub to_daily: bool,
    /// Vault-relative path of the log note.
    #[serde(default)]
    pub file: String,
    /// strftime template for a log line.
    #[serde(default = "default_log_text")]
    pub text: String,
    /// Prefix each line with a markdown list bullet.
    #[serde(default)]
    pub as_list: bool,
}

/// Vault layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default = "default_vault_root")]
    pub root: String,
    /// Folder daily notes live in, relative to the vault root.
    #[serde(default)]
    pub daily_folder: String,
    /// strftime format of a daily note's file stem.
    #[serde(default = "default_daily_format")]
    pub daily_format: String,
}

/// Checklist note configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecklistConfig {
    /// Vault-relative path; empty disables the checklist.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub action: ChecklistAction,
}

/// Host UI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Accept ribbon clicks (`click` command).
    #[serde(default = "default_true")]
    pub ribbon_icon: bool,
    /// Status refresh period in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomonote/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub checklist: ChecklistConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

// Default functions
fn default_pomo() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_log_text() -> String {
    "[🍅] %A, %B %d %Y, %-I:%M %p".into()
}
fn default_vault_root() -> String {
    ".".into()
}
fn default_daily_format() -> String {
    "%Y-%m-%d".into()
}
fn default_tick_ms() -> u64 {
    500
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pomo: default_pomo(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            long_break_interval: default_long_break_interval(),
            auto_advance: true,
            invalid_duration: InvalidDurationPolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            to_daily: false,
            file: String::new(),
            text: default_log_text(),
            as_list: false,
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: default_vault_root(),
            daily_folder: String::new(),
            daily_format: default_daily_format(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            ribbon_icon: true,
            tick_ms: default_tick_ms(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject values the timer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("timer.pomo", self.timer.pomo),
            ("timer.short_break", self.timer.short_break),
            ("timer.long_break", self.timer.long_break),
            ("timer.long_break_interval", self.timer.long_break_interval),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        if !(1..=MAX_TICK_MS).contains(&self.ui.tick_ms) {
            return Err(ConfigError::InvalidValue {
                key: "ui.tick_ms".into(),
                message: format!("must be between 1 and {MAX_TICK_MS}"),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Root directory of the vault.
    pub fn vault_root(&self) -> PathBuf {
        PathBuf::from(&self.vault.root)
    }

    /// Checklist path, if one is configured.
    pub fn checklist_path(&self) -> Option<&Path> {
        let file = self.checklist.file.trim();
        (!file.is_empty()).then(|| Path::new(file))
    }
}
