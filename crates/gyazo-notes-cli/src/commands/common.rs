use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, SecondsFormat};
use gyazo_notes_core::config::{JsonSettingsStore, SettingsStore};
use gyazo_notes_core::delete::{DeleteConfirmation, DeleteDecision};
use gyazo_notes_core::notify::Notifier;
use gyazo_notes_core::remote::GyazoClient;
use gyazo_notes_core::store::FsNoteStore;
use gyazo_notes_core::sync::SyncEngine;
use gyazo_notes_core::util::normalize_text_option;
use gyazo_notes_core::Settings;

use crate::error::CliError;

pub const ACCESS_TOKEN_ENV: &str = "GYAZO_ACCESS_TOKEN";
pub const CONFIG_PATH_ENV: &str = "GYAZO_NOTES_CONFIG";
const SETTINGS_FILE_NAME: &str = "settings.json";

pub type CliEngine = SyncEngine<GyazoClient, FsNoteStore, EnvSettingsStore>;

/// Where the CLI reads settings from and writes notes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub vault: PathBuf,
    pub settings: PathBuf,
    /// Token from the environment; wins over the stored one.
    pub token_override: Option<String>,
}

impl AppPaths {
    pub fn resolve(vault: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self, CliError> {
        let vault = match vault {
            Some(path) => path,
            None => env::current_dir()?,
        };
        let settings = match config.or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from)) {
            Some(path) => path,
            None => default_settings_path()?,
        };
        Ok(Self {
            vault,
            settings,
            token_override: normalize_text_option(env::var(ACCESS_TOKEN_ENV).ok()),
        })
    }

    pub fn settings_store(&self) -> EnvSettingsStore {
        EnvSettingsStore::new(
            JsonSettingsStore::new(&self.settings),
            self.token_override.clone(),
        )
    }
}

pub fn default_settings_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("gyazo-notes").join(SETTINGS_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

/// Settings file with the access token optionally supplied by the environment.
///
/// An environment token is never written back; saving keeps whatever token
/// the file already had.
#[derive(Debug, Clone)]
pub struct EnvSettingsStore {
    inner: JsonSettingsStore,
    token_override: Option<String>,
}

impl EnvSettingsStore {
    pub const fn new(inner: JsonSettingsStore, token_override: Option<String>) -> Self {
        Self {
            inner,
            token_override,
        }
    }

    pub fn token_from_env(&self) -> bool {
        self.token_override.is_some()
    }
}

impl SettingsStore for EnvSettingsStore {
    async fn load(&self) -> gyazo_notes_core::Result<Settings> {
        let mut settings = self.inner.load().await?;
        if let Some(token) = &self.token_override {
            settings.access_token = Some(token.clone());
        }
        Ok(settings)
    }

    async fn save(&self, settings: &Settings) -> gyazo_notes_core::Result<()> {
        if self.token_override.is_none() {
            return self.inner.save(settings).await;
        }
        let mut stored = settings.clone();
        stored.access_token = self.inner.load().await?.access_token;
        self.inner.save(&stored).await
    }
}

/// Prints notifications on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

pub async fn build_engine(
    paths: &AppPaths,
    notifier: impl Notifier + 'static,
) -> Result<CliEngine, CliError> {
    let store = paths.settings_store();
    let settings = store.load().await?;
    let client = GyazoClient::from_settings(&settings)?;
    Ok(SyncEngine::new(
        client,
        FsNoteStore::new(&paths.vault),
        store,
        notifier,
    ))
}

/// Turn a user-supplied note path into a vault-relative one.
pub fn vault_relative(vault: &Path, note: &Path) -> Result<PathBuf, CliError> {
    let relative = if note.is_absolute() {
        note.strip_prefix(vault)
            .map_err(|_| CliError::NoteOutsideVault(note.display().to_string()))?
            .to_path_buf()
    } else {
        note.components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect::<PathBuf>()
    };

    if relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(CliError::NoteOutsideVault(note.display().to_string()));
    }
    Ok(relative)
}

/// Decision used for `--yes`.
pub const fn unattended_decision(keep_note: bool) -> DeleteDecision {
    if keep_note {
        DeleteDecision::DeleteImageOnly
    } else {
        DeleteDecision::DeleteImageAndNote
    }
}

/// Map a prompt answer to a decision. Anything unrecognized cancels.
pub fn parse_decision(answer: &str, keep_note: bool) -> DeleteDecision {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => unattended_decision(keep_note),
        "i" | "image" => DeleteDecision::DeleteImageOnly,
        _ => DeleteDecision::Cancel,
    }
}

/// Terminal prompt for image deletion.
#[derive(Debug, Clone, Copy)]
pub struct StdinConfirmation {
    pub keep_note: bool,
}

impl DeleteConfirmation for StdinConfirmation {
    fn confirm(&self, image_id: &str, note_path: &Path) -> DeleteDecision {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return DeleteDecision::Cancel;
        }

        let choices = if self.keep_note {
            "[y]es / [N]o"
        } else {
            "[y]es, image and note / [i]mage only / [N]o"
        };
        print!(
            "Delete Gyazo image {image_id} ({})? {choices}: ",
            note_path.display()
        );
        if io::stdout().flush().is_err() {
            return DeleteDecision::Cancel;
        }

        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            Ok(_) => parse_decision(&answer, self.keep_note),
            Err(_) => DeleteDecision::Cancel,
        }
    }
}

/// Epoch milliseconds as an RFC 3339 UTC timestamp.
pub fn format_epoch_millis(value: i64) -> String {
    DateTime::from_timestamp_millis(value).map_or_else(
        || value.to_string(),
        |timestamp| timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}
