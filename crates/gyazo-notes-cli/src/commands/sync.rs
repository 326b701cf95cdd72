use gyazo_notes_core::notify::TracingNotifier;
use gyazo_notes_core::sync::{SyncOutcome, SyncSummary};

use crate::commands::common::{build_engine, AppPaths, StdoutNotifier};
use crate::error::CliError;

pub async fn run_sync(paths: &AppPaths, as_json: bool) -> Result<(), CliError> {
    if !as_json {
        build_engine(paths, StdoutNotifier).await?.run_sync().await?;
        return Ok(());
    }

    let outcome = build_engine(paths, TracingNotifier).await?.run_sync().await?;
    let summary = match outcome {
        SyncOutcome::Completed(summary) => summary,
        SyncOutcome::NoImages | SyncOutcome::AlreadyRunning => SyncSummary::default(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
