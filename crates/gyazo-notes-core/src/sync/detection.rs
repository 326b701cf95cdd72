use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::index::NoteIndex;
use super::SyncEngine;
use crate::config::SettingsStore;
use crate::remote::ImageSource;
use crate::store::NoteStore;
use crate::Result;

/// What deleted-image detection found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    /// Notes whose image was missing from the current fetch and got looked up.
    pub checked: usize,
    /// Notes removed because their image is gone.
    pub deleted: usize,
    /// Notes kept even though their image is gone.
    pub flagged: Vec<PathBuf>,
}

impl<S, N, C> SyncEngine<S, N, C>
where
    S: ImageSource,
    N: NoteStore,
    C: SettingsStore,
{
    /// Look for notes whose image no longer exists upstream.
    ///
    /// `current_ids` is only a window of recent images, so a note missing
    /// from it is merely a candidate; a `NotFound` detail lookup confirms the
    /// deletion. Confirmed notes are removed when `delete_notes` is set and
    /// reported through the notifier otherwise.
    pub(crate) async fn detect_deleted_images(
        &self,
        access_token: &str,
        dir: &Path,
        current_ids: &HashSet<&str>,
        delete_notes: bool,
    ) -> Result<DetectionReport> {
        let index = NoteIndex::scan(&self.notes, dir).await?;
        let mut report = DetectionReport::default();

        for (path, image_id) in index.entries() {
            self.check_cancelled()?;
            if current_ids.contains(image_id.as_str()) {
                continue;
            }
            report.checked += 1;

            match self.source.get_image(access_token, image_id).await {
                Ok(_) => {
                    tracing::debug!(image_id = %image_id, "Image outside fetch window still exists");
                }
                Err(error) if error.is_not_found() => {
                    if delete_notes {
                        match self.notes.delete(path).await {
                            Ok(()) => {
                                tracing::info!(
                                    image_id = %image_id,
                                    path = %path.display(),
                                    "Removed note for deleted image"
                                );
                                report.deleted += 1;
                            }
                            Err(error) => tracing::warn!(
                                path = %path.display(),
                                "Failed to remove note for deleted image: {error}"
                            ),
                        }
                    } else {
                        self.notifier.notify(&format!(
                            "Gyazo image {image_id} was deleted; note kept at {}",
                            path.display()
                        ));
                        report.flagged.push(path.clone());
                    }
                }
                Err(error) => {
                    tracing::warn!(image_id = %image_id, "Could not check image: {error}");
                }
            }
        }

        Ok(report)
    }
}
