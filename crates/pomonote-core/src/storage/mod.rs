mod config;

pub use config::{
    ChecklistAction, ChecklistConfig, Config, InvalidDurationPolicy, LoggingConfig, TimerConfig,
    UiConfig, VaultConfig, MAX_CUSTOM_MINUTES, MAX_TICK_MS,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pomonote[-dev]/` based on POMONOTE_ENV.
///
/// Set POMONOTE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMONOTE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomonote-dev")
    } else {
        base_dir.join("pomonote")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirUnavailable(e.to_string()))?;
    Ok(dir)
}
