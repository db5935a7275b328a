use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{normalize_note_path, NoteStore};
use crate::error::NoteError;

/// In-memory note store.
///
/// Clones share the same notes. Paths listed in `fail_writes` reject
/// appends and creates, which lets callers exercise unwritable targets.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    notes: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    read_only: Arc<Mutex<Vec<PathBuf>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a note, replacing any existing content.
    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        if let Ok(path) = normalize_note_path(path.as_ref()) {
            self.lock().insert(path, content.into());
        }
    }

    /// Make writes to `path` fail with a permission error.
    pub fn fail_writes(&self, path: impl AsRef<Path>) {
        if let Ok(path) = normalize_note_path(path.as_ref()) {
            self.read_only
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(path);
        }
    }

    /// Content of a note, if present.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = normalize_note_path(path.as_ref()).ok()?;
        self.lock().get(&path).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, String>> {
        self.notes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_writable(&self, path: &Path) -> Result<(), NoteError> {
        let read_only = self.read_only.lock().unwrap_or_else(|e| e.into_inner());
        if read_only.iter().any(|p| p == path) {
            return Err(NoteError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "note is read-only",
                ),
            });
        }
        Ok(())
    }
}

impl NoteStore for MemoryStore {
    async fn exists(&self, path: &Path) -> Result<bool, NoteError> {
        let path = normalize_note_path(path)?;
        Ok(self.lock().contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<String, NoteError> {
        let path = normalize_note_path(path)?;
        self.lock()
            .get(&path)
            .cloned()
            .ok_or(NoteError::NotFound(path))
    }

    async fn create(&self, path: &Path, content: &str) -> Result<bool, NoteError> {
        let path = normalize_note_path(path)?;
        if self.lock().contains_key(&path) {
            return Ok(false);
        }
        self.check_writable(&path)?;
        self.lock().insert(path, content.to_string());
        Ok(true)
    }

    async fn append(&self, path: &Path, text: &str) -> Result<(), NoteError> {
        let path = normalize_note_path(path)?;
        self.check_writable(&path)?;
        let mut notes = self.lock();
        let note = notes
            .get_mut(&path)
            .ok_or_else(|| NoteError::NotFound(path.clone()))?;
        note.push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_requires_existing_note() {
        let store = MemoryStore::new();
        let path = Path::new("Log.md");
        assert!(matches!(
            store.append(path, "x").await,
            Err(NoteError::NotFound(_))
        ));
        assert!(store.create(path, "a").await.unwrap());
        assert!(!store.create(path, "ignored").await.unwrap());
        store.append(path, "b").await.unwrap();
        assert_eq!(store.read(path).await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn fail_writes_blocks_append() {
        let store = MemoryStore::new();
        store.insert("Log", "");
        store.fail_writes("Log.md");
        assert!(store.append(Path::new("Log"), "x").await.is_err());
        assert_eq!(store.get("Log").as_deref(), Some(""));
    }
}
