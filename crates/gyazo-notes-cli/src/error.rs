use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] gyazo_notes_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Note path must be inside the vault: {0}")]
    NoteOutsideVault(String),
    #[error("Nothing to update. Pass at least one option, see `gyazo-notes config set --help`.")]
    NothingToUpdate,
    #[error(
        "Periodic sync is disabled. Run `gyazo-notes config set --fetch-interval-hours <HOURS>` first."
    )]
    WatchDisabled,
}
