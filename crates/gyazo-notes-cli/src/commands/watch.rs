use std::sync::Arc;

use gyazo_notes_core::config::SettingsStore;
use gyazo_notes_core::sync::SyncScheduler;

use crate::commands::common::{build_engine, AppPaths, StdoutNotifier};
use crate::error::CliError;

pub async fn run_watch(paths: &AppPaths) -> Result<(), CliError> {
    let engine = Arc::new(build_engine(paths, StdoutNotifier).await?);
    let settings = engine.settings_store().load().await?;
    if settings.fetch_interval_hours == 0 {
        return Err(CliError::WatchDisabled);
    }
    if settings.access_token().is_none() {
        return Err(gyazo_notes_core::Error::Configuration(
            "Gyazo access token is not configured".to_string(),
        )
        .into());
    }

    let scheduler = SyncScheduler::new();
    scheduler.reschedule(
        Arc::clone(&engine),
        settings.fetch_interval_hours,
        settings.last_fetch_time,
    );
    println!(
        "Syncing every {} hour(s) into {}. Press Ctrl-C to stop.",
        settings.fetch_interval_hours,
        paths.vault.join(&settings.save_directory).display()
    );

    tokio::signal::ctrl_c().await?;
    scheduler.shutdown();
    engine.cancel();
    println!("Stopped");
    Ok(())
}
