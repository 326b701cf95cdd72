//! Gyazo -> notes synchronization.
//!
//! A run pulls the newest pages of the image list, stops at the checkpoint
//! left by the previous run, and creates or refreshes one note per image.
//! Notes are found by the `gyazo_id` they carry, not by file name, so a
//! title that changes upstream updates the existing note in place.

mod detection;
mod index;
mod scheduler;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::codec::{self, extract_source_id};
use crate::config::SettingsStore;
use crate::models::ImageRecord;
use crate::notify::Notifier;
use crate::remote::{ImageSource, PAGE_SIZE};
use crate::store::NoteStore;
use crate::util::unix_millis_now;
use crate::{Error, Result};

pub use detection::DetectionReport;
pub use scheduler::{next_run_delay, SyncScheduler};

use index::NoteIndex;

/// Result of one [`SyncEngine::run_sync`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncSummary),
    /// The first page was empty; nothing was touched.
    NoImages,
    /// Another run on the same engine was in progress.
    AlreadyRunning,
}

/// Counters for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Records returned by the list pages.
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Records whose detail fetch or note write failed.
    pub skipped: usize,
    /// Managed notes removed by a forced refetch.
    pub removed_for_refetch: usize,
    pub detection: Option<DetectionReport>,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Gyazo sync complete: {} new, {} updated, {} unchanged",
            self.created, self.updated, self.unchanged
        )?;
        if self.skipped > 0 {
            write!(formatter, ", {} skipped", self.skipped)?;
        }
        if self.removed_for_refetch > 0 {
            write!(
                formatter,
                ", {} removed for refetch",
                self.removed_for_refetch
            )?;
        }
        if let Some(detection) = &self.detection {
            if detection.deleted > 0 {
                write!(
                    formatter,
                    ", {} notes removed for deleted images",
                    detection.deleted
                )?;
            }
            if !detection.flagged.is_empty() {
                write!(
                    formatter,
                    ", {} notes point at deleted images",
                    detection.flagged.len()
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconciled {
    Created,
    Updated,
    Unchanged,
}

/// Maximum number of list pages a run may fetch.
#[must_use]
pub const fn max_pages(max_images_to_fetch: u32) -> u32 {
    let pages = max_images_to_fetch.div_ceil(PAGE_SIZE);
    if pages == 0 {
        1
    } else {
        pages
    }
}

/// Reconciles a remote image list with a directory of notes.
///
/// One run at a time per engine; a second trigger while a run is active
/// returns [`SyncOutcome::AlreadyRunning`].
pub struct SyncEngine<S, N, C> {
    source: S,
    notes: N,
    settings: C,
    notifier: Box<dyn Notifier>,
    run_gate: Mutex<()>,
    cancel: CancellationToken,
}

impl<S, N, C> SyncEngine<S, N, C>
where
    S: ImageSource,
    N: NoteStore,
    C: SettingsStore,
{
    pub fn new(source: S, notes: N, settings: C, notifier: impl Notifier + 'static) -> Self {
        Self {
            source,
            notes,
            settings,
            notifier: Box::new(notifier),
            run_gate: Mutex::new(()),
            cancel: CancellationToken::new(),
        }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub const fn notes(&self) -> &N {
        &self.notes
    }

    pub const fn settings_store(&self) -> &C {
        &self.settings
    }

    /// Stop the active run (and any later one) at the next loop boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `last_fetch_time` currently persisted, in epoch milliseconds.
    pub async fn last_fetch_time(&self) -> Result<Option<i64>> {
        Ok(self.settings.load().await?.last_fetch_time)
    }

    /// Run one synchronization pass.
    ///
    /// Configuration errors, list page failures, checkpoint persistence
    /// failures and cancellation abort the run; everything else is logged per
    /// record and counted as skipped.
    pub async fn run_sync(&self) -> Result<SyncOutcome> {
        let Ok(_guard) = self.run_gate.try_lock() else {
            tracing::info!("Gyazo sync already in progress");
            self.notifier.notify("Gyazo sync is already running");
            return Ok(SyncOutcome::AlreadyRunning);
        };

        let result = self.run_locked().await;
        match &result {
            Err(Error::Cancelled) => tracing::info!("Gyazo sync cancelled"),
            Err(error) => {
                tracing::warn!("Gyazo sync failed: {error}");
                self.notifier.notify(&format!("Gyazo sync failed: {error}"));
            }
            Ok(_) => {}
        }
        result
    }

    async fn run_locked(&self) -> Result<SyncOutcome> {
        let mut settings = self.settings.load().await?;
        let access_token = settings.access_token().ok_or_else(|| {
            Error::Configuration("Gyazo access token is not configured".to_string())
        })?;
        self.check_cancelled()?;

        let records = self
            .fetch_records(
                &access_token,
                settings.effective_checkpoint().as_deref(),
                settings.max_images_to_fetch,
            )
            .await?;
        let Some(newest_id) = records.first().map(|record| record.id.clone()) else {
            tracing::info!("No images returned by Gyazo");
            self.notifier.notify("No images found on Gyazo");
            return Ok(SyncOutcome::NoImages);
        };

        let dir = PathBuf::from(&settings.save_directory);
        let mut summary = SyncSummary {
            fetched: records.len(),
            ..SyncSummary::default()
        };

        if settings.force_refetch {
            summary.removed_for_refetch = self.remove_managed_notes(&dir).await?;
            settings.last_fetched_id = None;
        }

        self.notes.create_dir_all(&dir).await?;
        let mut index = NoteIndex::scan(&self.notes, &dir).await?;
        tracing::debug!(indexed = index.len(), "Indexed existing notes");

        let checkpoint = settings.effective_checkpoint();
        let mut seen = HashSet::new();
        for record in &records {
            self.check_cancelled()?;
            if checkpoint.as_deref() == Some(record.id.as_str()) {
                tracing::debug!(image_id = %record.id, "Reached last fetched image");
                break;
            }
            if !seen.insert(record.id.as_str()) {
                continue;
            }

            let detail = match self.source.get_image(&access_token, &record.id).await {
                Ok(detail) => detail,
                Err(error) => {
                    tracing::warn!(image_id = %record.id, "Skipping image: {error}");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.reconcile(&dir, &mut index, &detail).await {
                Ok(Reconciled::Created) => summary.created += 1,
                Ok(Reconciled::Updated) => summary.updated += 1,
                Ok(Reconciled::Unchanged) => summary.unchanged += 1,
                Err(error) => {
                    tracing::warn!(image_id = %record.id, "Failed to write note: {error}");
                    summary.skipped += 1;
                }
            }
        }

        settings.last_fetched_id = Some(newest_id);
        settings.last_fetch_time = Some(unix_millis_now());
        settings.force_refetch = false;
        self.settings.save(&settings).await?;

        if settings.detect_deleted_images {
            let current_ids = records
                .iter()
                .map(|record| record.id.as_str())
                .collect::<HashSet<_>>();
            match self
                .detect_deleted_images(
                    &access_token,
                    &dir,
                    &current_ids,
                    settings.delete_notes_for_deleted_images,
                )
                .await
            {
                Ok(report) => summary.detection = Some(report),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(error) => tracing::warn!("Deleted-image detection failed: {error}"),
            }
        }

        tracing::info!(
            fetched = summary.fetched,
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            "Gyazo sync finished"
        );
        self.notifier.notify(&summary.to_string());
        Ok(SyncOutcome::Completed(summary))
    }

    /// Pull list pages, newest first, until a short page, the page cap, or a
    /// page containing `checkpoint`.
    async fn fetch_records(
        &self,
        access_token: &str,
        checkpoint: Option<&str>,
        max_images_to_fetch: u32,
    ) -> Result<Vec<ImageRecord>> {
        let page_limit = max_pages(max_images_to_fetch);
        let mut records = Vec::new();

        for page in 1..=page_limit {
            self.check_cancelled()?;
            let batch = self
                .source
                .list_images(access_token, page, PAGE_SIZE)
                .await?;
            let batch_len = batch.len();
            let reached_checkpoint =
                checkpoint.is_some_and(|id| batch.iter().any(|record| record.id == id));
            records.extend(batch);

            if reached_checkpoint {
                tracing::debug!(page, "Page contains last fetched image");
                break;
            }
            if batch_len < PAGE_SIZE as usize {
                break;
            }
        }

        tracing::debug!(count = records.len(), "Fetched image list");
        Ok(records)
    }

    async fn reconcile(
        &self,
        dir: &Path,
        index: &mut NoteIndex,
        record: &ImageRecord,
    ) -> Result<Reconciled> {
        if let Some(path) = index.path_for(&record.id).map(Path::to_path_buf) {
            let existing = self.notes.read(&path).await?;
            let merged = codec::merge(&existing, record);
            if merged == existing {
                return Ok(Reconciled::Unchanged);
            }
            self.notes.modify(&path, &merged).await?;
            tracing::debug!(image_id = %record.id, path = %path.display(), "Updated note");
            return Ok(Reconciled::Updated);
        }

        let mut path = codec::note_path(dir, record);
        if self.notes.exists(&path).await? {
            path = codec::disambiguated_note_path(dir, record);
        }
        self.notes.create(&path, &codec::render(record)).await?;
        tracing::debug!(image_id = %record.id, path = %path.display(), "Created note");
        index.insert(record.id.clone(), path);
        Ok(Reconciled::Created)
    }

    /// Delete every note under `dir` that carries a `gyazo_id`.
    async fn remove_managed_notes(&self, dir: &Path) -> Result<usize> {
        let mut removed = 0;
        for path in self.notes.list_notes(dir).await? {
            self.check_cancelled()?;
            let content = match self.notes.read(&path).await {
                Ok(content) => content,
                Err(error) => {
                    tracing::warn!(path = %path.display(), "Skipping unreadable note: {error}");
                    continue;
                }
            };
            if extract_source_id(&content).is_none() {
                continue;
            }
            match self.notes.delete(&path).await {
                Ok(()) => removed += 1,
                Err(error) => {
                    tracing::warn!(path = %path.display(), "Failed to remove note: {error}");
                }
            }
        }
        tracing::info!(removed, "Removed managed notes for refetch");
        Ok(removed)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
