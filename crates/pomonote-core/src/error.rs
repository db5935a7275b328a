//! Core error types for pomonote-core.
//!
//! Only configuration loading and raw note I/O surface as errors. Failures
//! inside the timer itself are recovered and reported as
//! [`Warning`](crate::timer::Warning) values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home or config directory could not be prepared
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Note store errors.
#[derive(Error, Debug)]
pub enum NoteError {
    /// The note does not exist
    #[error("Note not found: {0}")]
    NotFound(PathBuf),

    /// The path escapes the vault or is empty
    #[error("Invalid note path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },

    /// Underlying filesystem failure
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}
