//! Log lines for completed pomodoros.
//!
//! Entries are single self-contained lines appended to either today's daily
//! note or a fixed log note. A line never depends on the lines before it, so
//! a failed write can only lose its own entry.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::error::NoteError;
use crate::notes::{self, NoteStore};
use crate::storage::Config;
use crate::timer::Warning;

const LIST_BULLET: &str = "- ";

/// Where entries go, without touching the store.
///
/// `None` when logging is disabled.
pub fn target_path(cfg: &Config, now: DateTime<Local>) -> Option<Result<PathBuf, NoteError>> {
    if !cfg.logging.enabled {
        return None;
    }
    Some(if cfg.logging.to_daily {
        notes::daily_note_path(&cfg.vault, now)
    } else {
        log_file_path(cfg)
    })
}

fn log_file_path(cfg: &Config) -> Result<PathBuf, NoteError> {
    let file = cfg.logging.file.trim();
    if file.is_empty() {
        return Err(NoteError::InvalidPath {
            path: PathBuf::new(),
            message: "no log file configured".into(),
        });
    }
    notes::normalize_note_path(Path::new(file))
}

/// Resolve the target and make sure it exists.
pub async fn resolve_target<S: NoteStore>(
    store: &S,
    cfg: &Config,
    now: DateTime<Local>,
) -> Result<PathBuf, NoteError> {
    if cfg.logging.to_daily {
        return notes::resolve_daily_note(store, &cfg.vault, now).await;
    }
    let path = log_file_path(cfg)?;
    if store.create(&path, "").await? {
        tracing::debug!(path = %path.display(), "created log file");
    }
    Ok(path)
}

/// Line recorded for a completed pomodoro.
pub fn pomodoro_line(cfg: &Config, now: DateTime<Local>) -> Result<String, std::fmt::Error> {
    let text = notes::format_time(now, &cfg.logging.text)?;
    Ok(bulleted(cfg, text))
}

/// Line recorded when the checklist note changes mid-interval.
pub fn checklist_line(cfg: &Config, checklist: &Path, now: DateTime<Local>) -> String {
    let name = checklist
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    bulleted(cfg, format!("[✅] {name} updated at {}", now.format("%H:%M")))
}

fn bulleted(cfg: &Config, text: String) -> String {
    if cfg.logging.as_list {
        format!("{LIST_BULLET}{text}")
    } else {
        text
    }
}

/// Append `line` to `path`, starting on a fresh line.
pub async fn append_line<S: NoteStore>(store: &S, path: &Path, line: &str) -> Result<(), NoteError> {
    let existing = store.read(path).await?;
    let separator = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    store.append(path, &format!("{separator}{line}\n")).await
}

/// Resolve the target and append `line`.
///
/// Failures come back as a [`Warning::LogFailed`]; they are also reported
/// through `tracing` so a host without a warning display still sees them.
pub async fn write_entry<S: NoteStore>(
    store: &S,
    cfg: &Config,
    line: &str,
    now: DateTime<Local>,
) -> Result<PathBuf, Warning> {
    let path = match resolve_target(store, cfg, now).await {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(error = %e, "could not resolve log target");
            return Err(Warning::LogFailed {
                target: None,
                reason: e.to_string(),
            });
        }
    };
    if let Err(e) = append_line(store, &path, line).await {
        tracing::warn!(path = %path.display(), error = %e, "could not write log entry");
        return Err(Warning::LogFailed {
            target: Some(path),
            reason: e.to_string(),
        });
    }
    tracing::debug!(path = %path.display(), "logged entry");
    Ok(path)
}
