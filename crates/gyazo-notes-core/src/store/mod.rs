//! Note storage.
//!
//! Paths handed to a [`NoteStore`] are relative to the store's root (the
//! vault), e.g. `Gyazo/Gyazo 2024-01-05_103000 abc123.md`.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use crate::codec::is_note_path;
use crate::{Error, Result};

/// File primitives the sync engine needs from its host.
pub trait NoteStore: Send + Sync {
    fn exists(&self, path: &Path) -> impl Future<Output = Result<bool>> + Send;

    fn read(&self, path: &Path) -> impl Future<Output = Result<String>> + Send;

    /// Create a new note; fails if `path` is already taken.
    fn create(&self, path: &Path, content: &str) -> impl Future<Output = Result<()>> + Send;

    /// Replace the content of an existing note.
    fn modify(&self, path: &Path, content: &str) -> impl Future<Output = Result<()>> + Send;

    fn delete(&self, path: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Create `dir` and any missing parents.
    fn create_dir_all(&self, dir: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Markdown notes under `dir`, recursively; empty when `dir` is missing.
    fn list_notes(&self, dir: &Path) -> impl Future<Output = Result<Vec<PathBuf>>> + Send;
}

/// Filesystem-backed [`NoteStore`] rooted at a vault directory.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    root: PathBuf,
}

impl FsNoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute()
            || path
                .components()
                .any(|component| matches!(component, std::path::Component::ParentDir))
        {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("note path must stay inside the vault: {}", path.display()),
            )));
        }
        Ok(self.root.join(path))
    }
}

impl NoteStore for FsNoteStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.resolve(path)?).await?)
    }

    async fn read(&self, path: &Path) -> Result<String> {
        Ok(tokio::fs::read_to_string(self.resolve(path)?).await?)
    }

    async fn create(&self, path: &Path, content: &str) -> Result<()> {
        use tokio::io::AsyncWriteExt as _;

        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn modify(&self, path: &Path, content: &str) -> Result<()> {
        let full_path = self.resolve(path)?;
        if !tokio::fs::try_exists(&full_path).await? {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("note does not exist: {}", path.display()),
            )));
        }
        tokio::fs::write(full_path, content).await?;
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(self.resolve(path)?).await?;
        Ok(())
    }

    async fn create_dir_all(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(self.resolve(dir)?).await?;
        Ok(())
    }

    async fn list_notes(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let start = self.resolve(dir)?;
        let mut notes = Vec::new();
        if !tokio::fs::try_exists(&start).await? {
            return Ok(notes);
        }

        let mut pending = vec![start];
        while let Some(current) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                // Skip hidden files/dirs (like .obsidian or .trash)
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if is_note_path(&path) {
                    if let Ok(relative) = path.strip_prefix(&self.root) {
                        notes.push(relative.to_path_buf());
                    }
                }
            }
        }

        notes.sort();
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn create_read_modify_delete_roundtrip() {
        let vault = tempdir().unwrap();
        let store = FsNoteStore::new(vault.path());
        let path = Path::new("Gyazo/Gyazo 2024-01-05_103000 abc123.md");

        assert!(!store.exists(path).await.unwrap());
        store.create(path, "first").await.unwrap();
        assert!(store.exists(path).await.unwrap());
        assert_eq!(store.read(path).await.unwrap(), "first");

        store.modify(path, "second").await.unwrap();
        assert_eq!(store.read(path).await.unwrap(), "second");

        store.delete(path).await.unwrap();
        assert!(!store.exists(path).await.unwrap());
    }

    #[tokio::test]
    async fn create_refuses_to_overwrite() {
        let vault = tempdir().unwrap();
        let store = FsNoteStore::new(vault.path());
        let path = Path::new("Gyazo/note.md");

        store.create(path, "original").await.unwrap();
        assert!(store.create(path, "clobber").await.is_err());
        assert_eq!(store.read(path).await.unwrap(), "original");
    }

    #[tokio::test]
    async fn modify_requires_existing_note() {
        let vault = tempdir().unwrap();
        let store = FsNoteStore::new(vault.path());
        assert!(store.modify(Path::new("Gyazo/missing.md"), "x").await.is_err());
    }

    #[tokio::test]
    async fn list_notes_recurses_and_skips_hidden_and_non_markdown() {
        let vault = tempdir().unwrap();
        let store = FsNoteStore::new(vault.path());

        store.create(Path::new("Gyazo/a.md"), "a").await.unwrap();
        store.create(Path::new("Gyazo/2024/b.md"), "b").await.unwrap();
        store.create(Path::new("Gyazo/.trash/c.md"), "c").await.unwrap();
        store.create(Path::new("Gyazo/image.png"), "png").await.unwrap();
        store.create(Path::new("Other/d.md"), "d").await.unwrap();

        let notes = store.list_notes(Path::new("Gyazo")).await.unwrap();
        assert_eq!(
            notes,
            vec![PathBuf::from("Gyazo/2024/b.md"), PathBuf::from("Gyazo/a.md")]
        );
    }

    #[tokio::test]
    async fn list_notes_on_missing_dir_is_empty() {
        let vault = tempdir().unwrap();
        let store = FsNoteStore::new(vault.path());
        assert!(store
            .list_notes(Path::new("Gyazo"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn paths_cannot_escape_the_vault() {
        let vault = tempdir().unwrap();
        let store = FsNoteStore::new(vault.path());
        assert!(store.read(Path::new("../outside.md")).await.is_err());
        assert!(store.read(Path::new("/etc/passwd")).await.is_err());
    }
}
