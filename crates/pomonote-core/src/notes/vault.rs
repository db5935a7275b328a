use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::{normalize_note_path, NoteStore};
use crate::error::NoteError;

/// Notes stored as files under a vault directory.
#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a note on disk.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf, NoteError> {
        Ok(self.root.join(normalize_note_path(path)?))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> NoteError + '_ {
    move |source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            NoteError::NotFound(path.to_path_buf())
        } else {
            NoteError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl NoteStore for VaultStore {
    async fn exists(&self, path: &Path) -> Result<bool, NoteError> {
        let full = self.resolve(path)?;
        tokio::fs::try_exists(&full)
            .await
            .map_err(|source| NoteError::Io { path: full, source })
    }

    async fn read(&self, path: &Path) -> Result<String, NoteError> {
        let full = self.resolve(path)?;
        tokio::fs::read_to_string(&full)
            .await
            .map_err(io_error(&full))
    }

    async fn create(&self, path: &Path, content: &str) -> Result<bool, NoteError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(io_error(parent))?;
        }
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await;
        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(io_error(&full)(e)),
        };
        file.write_all(content.as_bytes())
            .await
            .map_err(io_error(&full))?;
        file.flush().await.map_err(io_error(&full))?;
        Ok(true)
    }

    async fn append(&self, path: &Path, text: &str) -> Result<(), NoteError> {
        let full = self.resolve(path)?;
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&full)
            .await
            .map_err(io_error(&full))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(io_error(&full))?;
        file.flush().await.map_err(io_error(&full))?;
        Ok(())
    }
}
