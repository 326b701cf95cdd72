//! gyazo-notes CLI - mirror Gyazo captures into a folder of markdown notes
//!
//! One-shot sync, periodic sync, and deletion of an image from its note.

mod cli;
mod commands;
mod error;


use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::AppPaths;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::sync::run_sync;
use crate::commands::watch::run_watch;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "gyazo_notes=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let paths = AppPaths::resolve(cli.vault, cli.config)?;
    match cli.command {
        Commands::Sync { json } => run_sync(&paths, json).await?,
        Commands::Watch => run_watch(&paths).await?,
        Commands::Delete {
            note,
            yes,
            keep_note,
        } => run_delete(&paths, &note, yes, keep_note).await?,
        Commands::Config { command } => run_config(command, &paths).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
