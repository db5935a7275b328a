//! Note store: where log lines go and where the checklist lives.
//!
//! Note paths are vault-relative. They are normalised before use: leading
//! `./` segments are dropped, a missing extension becomes `.md`, and paths
//! that are absolute or climb out of the vault with `..` are rejected.

mod memory;
mod vault;

pub use memory::MemoryStore;
pub use vault::VaultStore;

use chrono::{DateTime, Local};
use std::path::{Component, Path, PathBuf};

use crate::error::NoteError;
use crate::storage::VaultConfig;

const NOTE_EXTENSION: &str = "md";

/// Read/append/create access to notes.
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    async fn exists(&self, path: &Path) -> Result<bool, NoteError>;

    async fn read(&self, path: &Path) -> Result<String, NoteError>;

    /// Create a note with `content`. An existing note is left untouched.
    ///
    /// Returns whether the note was created.
    async fn create(&self, path: &Path, content: &str) -> Result<bool, NoteError>;

    /// Append to an existing note.
    async fn append(&self, path: &Path, text: &str) -> Result<(), NoteError>;
}

/// Normalise a vault-relative note path.
pub fn normalize_note_path(path: &Path) -> Result<PathBuf, NoteError> {
    let invalid = |message: &str| NoteError::InvalidPath {
        path: path.to_path_buf(),
        message: message.into(),
    };

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => out.push(part),
            Component::ParentDir => return Err(invalid("must not leave the vault")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative to the vault"))
            }
        }
    }
    if out.as_os_str().is_empty() {
        return Err(invalid("is empty"));
    }
    if out.extension().is_none() {
        out.set_extension(NOTE_EXTENSION);
    }
    Ok(out)
}

/// True when two note paths name the same note after normalisation.
pub fn same_note(a: &Path, b: &Path) -> bool {
    match (normalize_note_path(a), normalize_note_path(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Format `now` with a strftime pattern, failing instead of panicking on a
/// malformed pattern.
pub fn format_time(now: DateTime<Local>, pattern: &str) -> Result<String, std::fmt::Error> {
    use std::fmt::Write;

    let mut out = String::new();
    write!(out, "{}", now.format(pattern))?;
    Ok(out)
}

/// Path of the daily note for `now`.
pub fn daily_note_path(cfg: &VaultConfig, now: DateTime<Local>) -> Result<PathBuf, NoteError> {
    let stem = format_time(now, &cfg.daily_format).map_err(|_| NoteError::InvalidPath {
        path: PathBuf::from(&cfg.daily_format),
        message: "daily note format is not a valid strftime pattern".into(),
    })?;
    let stem = format!("{stem}.{NOTE_EXTENSION}");
    let folder = cfg.daily_folder.trim().trim_matches('/');
    let path = if folder.is_empty() {
        PathBuf::from(stem)
    } else {
        Path::new(folder).join(stem)
    };
    normalize_note_path(&path)
}

/// Resolve today's daily note, creating it empty if absent.
pub async fn resolve_daily_note<S: NoteStore>(
    store: &S,
    cfg: &VaultConfig,
    now: DateTime<Local>,
) -> Result<PathBuf, NoteError> {
    let path = daily_note_path(cfg, now)?;
    if store.create(&path, "").await? {
        tracing::debug!(path = %path.display(), "created daily note");
    }
    Ok(path)
}
