use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::SyncEngine;
use crate::config::SettingsStore;
use crate::remote::ImageSource;
use crate::store::NoteStore;
use crate::util::unix_millis_now;
use crate::Error;

const MILLIS_PER_HOUR: u64 = 60 * 60 * 1000;

/// Delay until the next periodic run.
///
/// The next run is due one `interval` after `last_fetch_time`; when that
/// moment has passed, or no sync ever ran, the delay is zero.
#[must_use]
pub fn next_run_delay(last_fetch_time: Option<i64>, interval: Duration, now_ms: i64) -> Duration {
    let Some(last_fetch_time) = last_fetch_time else {
        return Duration::ZERO;
    };
    let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
    let due = last_fetch_time.saturating_add(interval_ms);
    u64::try_from(due.saturating_sub(now_ms)).map_or(Duration::ZERO, Duration::from_millis)
}

/// Owns the single pending periodic-sync task.
///
/// Every [`reschedule`](Self::reschedule) replaces the previous task, so
/// settings changes can call it freely. Dropping the scheduler stops it.
#[derive(Debug, Default)]
pub struct SyncScheduler {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SyncScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending run and, unless `interval_hours` is 0, schedule the
    /// next one relative to `last_fetch_time` (epoch ms).
    pub fn reschedule<S, N, C>(
        &self,
        engine: Arc<SyncEngine<S, N, C>>,
        interval_hours: u32,
        last_fetch_time: Option<i64>,
    ) where
        S: ImageSource + 'static,
        N: NoteStore + 'static,
        C: SettingsStore + 'static,
    {
        self.cancel();
        if interval_hours == 0 {
            tracing::info!("Periodic Gyazo sync disabled");
            return;
        }

        let interval = Duration::from_millis(u64::from(interval_hours) * MILLIS_PER_HOUR);
        let first_delay = next_run_delay(last_fetch_time, interval, unix_millis_now());
        tracing::info!(
            interval_hours,
            first_run_in_secs = first_delay.as_secs(),
            "Scheduled periodic Gyazo sync"
        );

        let handle = tokio::spawn(async move {
            let mut delay = first_delay;
            loop {
                tokio::time::sleep(delay).await;
                let fired_at = unix_millis_now();

                match engine.run_sync().await {
                    Ok(outcome) => tracing::debug!(?outcome, "Periodic Gyazo sync finished"),
                    Err(Error::Cancelled) => break,
                    Err(error) => tracing::warn!("Periodic Gyazo sync failed: {error}"),
                }

                let last_fetch_time = match engine.last_fetch_time().await {
                    Ok(value) => value,
                    Err(error) => {
                        tracing::warn!("Failed to reload last fetch time: {error}");
                        None
                    }
                };
                let anchor = last_fetch_time.map_or(fired_at, |last| last.max(fired_at));
                delay = next_run_delay(Some(anchor), interval, unix_millis_now());
            }
        });

        *self.slot() = Some(handle);
    }

    /// Drop the pending run, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Stop periodic syncing for good.
    pub fn shutdown(&self) {
        if self.cancel() {
            tracing::debug!("Periodic Gyazo sync stopped");
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
