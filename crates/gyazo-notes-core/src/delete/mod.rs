//! Remote image deletion, optionally followed by removal of its note.

use std::path::Path;

use crate::codec::extract_source_id;
use crate::remote::ImageSource;
use crate::store::NoteStore;
use crate::{Error, Result};

/// Answer from the confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDecision {
    Cancel,
    DeleteImageOnly,
    DeleteImageAndNote,
}

/// Asks the user whether (and how) to delete the image behind a note.
pub trait DeleteConfirmation {
    fn confirm(&self, image_id: &str, note_path: &Path) -> DeleteDecision;
}

/// Fixed answer, for non-interactive hosts.
impl DeleteConfirmation for DeleteDecision {
    fn confirm(&self, _image_id: &str, _note_path: &Path) -> DeleteDecision {
        *self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Cancelled,
    ImageDeleted { image_id: String },
    ImageAndNoteDeleted { image_id: String },
}

/// Deletes Gyazo images on behalf of their notes.
#[derive(Debug)]
pub struct DeletionWorkflow<S, N> {
    source: S,
    notes: N,
    access_token: String,
}

impl<S, N> DeletionWorkflow<S, N>
where
    S: ImageSource,
    N: NoteStore,
{
    pub fn new(source: S, notes: N, access_token: &str) -> Result<Self> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(Error::Configuration(
                "Gyazo access token is not configured".to_string(),
            ));
        }
        Ok(Self {
            source,
            notes,
            access_token: access_token.to_string(),
        })
    }

    /// Delete one image upstream. Errors unless the service confirms `image_id`.
    pub async fn delete_image(&self, image_id: &str) -> Result<()> {
        self.source.delete_image(&self.access_token, image_id).await?;
        tracing::info!(image_id = %image_id, "Deleted Gyazo image");
        Ok(())
    }

    /// Delete the image a note points at, and the note itself if asked to.
    ///
    /// The note is only removed after the image deletion succeeded; a failed
    /// remote delete leaves the note in place and returns the error.
    pub async fn delete_note_for_image(
        &self,
        note_path: &Path,
        confirmation: &impl DeleteConfirmation,
    ) -> Result<DeletionOutcome> {
        let content = self.notes.read(note_path).await?;
        let image_id = extract_source_id(&content).ok_or_else(|| {
            Error::ContentFormat(format!(
                "{} is not linked to a Gyazo image",
                note_path.display()
            ))
        })?;

        let decision = confirmation.confirm(&image_id, note_path);
        if decision == DeleteDecision::Cancel {
            tracing::debug!(image_id = %image_id, "Image deletion cancelled");
            return Ok(DeletionOutcome::Cancelled);
        }

        self.delete_image(&image_id).await?;

        if decision == DeleteDecision::DeleteImageAndNote {
            self.notes.delete(note_path).await?;
            tracing::info!(path = %note_path.display(), "Deleted note");
            return Ok(DeletionOutcome::ImageAndNoteDeleted { image_id });
        }
        Ok(DeletionOutcome::ImageDeleted { image_id })
    }
}
