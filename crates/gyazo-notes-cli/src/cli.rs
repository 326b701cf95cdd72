use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "gyazo-notes")]
#[command(about = "Keep a folder of markdown notes in sync with your Gyazo captures")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory notes are written into (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub vault: Option<PathBuf>,

    /// Settings file (defaults to <config dir>/gyazo-notes/settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one sync pass
    Sync {
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sync periodically until interrupted
    Watch,
    /// Delete the Gyazo image behind a note
    Delete {
        /// Note path, relative to the vault or absolute inside it
        note: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Keep the note after deleting the image
        #[arg(long)]
        keep_note: bool,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update one or more settings
    Set(SettingsUpdate),
}

#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// Gyazo API access token (empty string clears it)
    #[arg(long, value_name = "TOKEN")]
    pub access_token: Option<String>,
    /// Folder inside the vault that holds the notes
    #[arg(long, value_name = "DIR")]
    pub save_directory: Option<String>,
    /// Hours between periodic syncs (0 disables)
    #[arg(long, value_name = "HOURS")]
    pub fetch_interval_hours: Option<u32>,
    /// Upper bound on images fetched per run
    #[arg(long, value_name = "COUNT")]
    pub max_images_to_fetch: Option<u32>,
    /// Look for notes whose image was deleted on Gyazo
    #[arg(long, value_name = "BOOL")]
    pub detect_deleted_images: Option<bool>,
    /// Remove notes whose image was deleted on Gyazo
    #[arg(long, value_name = "BOOL")]
    pub delete_notes_for_deleted_images: Option<bool>,
    /// Rebuild every note on the next sync
    #[arg(long, value_name = "BOOL")]
    pub force_refetch: Option<bool>,
    /// Gyazo API base URL
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub request_timeout_secs: Option<u64>,
    /// Forget the last fetched image so the next sync starts from the top
    #[arg(long)]
    pub reset_checkpoint: bool,
}
