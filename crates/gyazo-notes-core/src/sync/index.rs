use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::codec::extract_source_id;
use crate::store::NoteStore;
use crate::Result;

/// Managed notes under a directory, keyed by the image id they carry.
#[derive(Debug, Default)]
pub(crate) struct NoteIndex {
    by_id: HashMap<String, PathBuf>,
    entries: Vec<(PathBuf, String)>,
}

impl NoteIndex {
    /// Read every note under `dir` and record the ones with a `gyazo_id`.
    ///
    /// Unreadable notes are logged and left out. When two notes carry the
    /// same id the first one (in listing order) owns it.
    pub(crate) async fn scan<N: NoteStore>(notes: &N, dir: &Path) -> Result<Self> {
        let mut index = Self::default();
        for path in notes.list_notes(dir).await? {
            let content = match notes.read(&path).await {
                Ok(content) => content,
                Err(error) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable note: {error}");
                    continue;
                }
            };
            let Some(id) = extract_source_id(&content) else {
                continue;
            };
            if index.by_id.contains_key(&id) {
                tracing::warn!(
                    path = %path.display(),
                    image_id = %id,
                    "Another note already carries this image id"
                );
            } else {
                index.by_id.insert(id.clone(), path.clone());
            }
            index.entries.push((path, id));
        }
        Ok(index)
    }

    pub(crate) fn path_for(&self, image_id: &str) -> Option<&Path> {
        self.by_id.get(image_id).map(PathBuf::as_path)
    }

    pub(crate) fn insert(&mut self, image_id: String, path: PathBuf) {
        self.entries.push((path.clone(), image_id.clone()));
        self.by_id.entry(image_id).or_insert(path);
    }

    /// Every managed note as `(path, image id)`, duplicates included.
    pub(crate) fn entries(&self) -> &[(PathBuf, String)] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}
