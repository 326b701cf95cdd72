use std::path::Path;

use gyazo_notes_core::config::{JsonSettingsStore, SettingsStore};
use gyazo_notes_core::util::{is_http_url, normalize_text_option};
use gyazo_notes_core::Settings;
use serde::Serialize;

use crate::cli::{ConfigCommands, SettingsUpdate};
use crate::commands::common::{format_epoch_millis, AppPaths, ACCESS_TOKEN_ENV};
use crate::error::CliError;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SettingsView {
    pub settings_path: String,
    pub access_token: String,
    pub save_directory: String,
    pub last_fetched_id: Option<String>,
    pub last_fetch_time: Option<String>,
    pub force_refetch: bool,
    pub fetch_interval_hours: u32,
    pub detect_deleted_images: bool,
    pub delete_notes_for_deleted_images: bool,
    pub max_images_to_fetch: u32,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

pub async fn run_config(command: ConfigCommands, paths: &AppPaths) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { json } => run_config_show(paths, json).await,
        ConfigCommands::Set(update) => run_config_set(paths, update).await,
    }
}

pub async fn run_config_show(paths: &AppPaths, as_json: bool) -> Result<(), CliError> {
    let store = paths.settings_store();
    let settings = store.load().await?;
    let view = settings_view(&settings, &paths.settings, store.token_from_env());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in format_settings_lines(&view) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_config_set(paths: &AppPaths, update: SettingsUpdate) -> Result<(), CliError> {
    // The raw file store, so an environment token is never persisted.
    let store = JsonSettingsStore::new(&paths.settings);
    let mut settings = store.load().await?;
    if !apply_settings_update(&mut settings, update)? {
        return Err(CliError::NothingToUpdate);
    }

    store.save(&settings).await?;
    println!("Settings saved to {}", paths.settings.display());
    Ok(())
}

pub fn settings_view(settings: &Settings, settings_path: &Path, token_from_env: bool) -> SettingsView {
    let access_token = match (settings.access_token().is_some(), token_from_env) {
        (true, true) => format!("set (from {ACCESS_TOKEN_ENV})"),
        (true, false) => "set".to_string(),
        (false, _) => "not set".to_string(),
    };

    SettingsView {
        settings_path: settings_path.display().to_string(),
        access_token,
        save_directory: settings.save_directory.clone(),
        last_fetched_id: settings.last_fetched_id.clone(),
        last_fetch_time: settings.last_fetch_time.map(format_epoch_millis),
        force_refetch: settings.force_refetch,
        fetch_interval_hours: settings.fetch_interval_hours,
        detect_deleted_images: settings.detect_deleted_images,
        delete_notes_for_deleted_images: settings.delete_notes_for_deleted_images,
        max_images_to_fetch: settings.max_images_to_fetch,
        api_base_url: settings.api_base_url.clone(),
        request_timeout_secs: settings.request_timeout_secs,
    }
}

pub fn format_settings_lines(view: &SettingsView) -> Vec<String> {
    let interval = if view.fetch_interval_hours == 0 {
        "disabled".to_string()
    } else {
        format!("{}h", view.fetch_interval_hours)
    };

    vec![
        format!("settings file:                    {}", view.settings_path),
        format!("access token:                     {}", view.access_token),
        format!("save directory:                   {}", view.save_directory),
        format!("fetch interval:                   {interval}"),
        format!("max images per sync:              {}", view.max_images_to_fetch),
        format!("detect deleted images:            {}", view.detect_deleted_images),
        format!(
            "delete notes for deleted images:  {}",
            view.delete_notes_for_deleted_images
        ),
        format!("force refetch on next sync:       {}", view.force_refetch),
        format!(
            "last fetched image:               {}",
            view.last_fetched_id.as_deref().unwrap_or("-")
        ),
        format!(
            "last fetch time:                  {}",
            view.last_fetch_time.as_deref().unwrap_or("never")
        ),
        format!("api base url:                     {}", view.api_base_url),
        format!("request timeout:                  {}s", view.request_timeout_secs),
    ]
}

/// Apply `update` to `settings`. Returns whether anything was requested.
pub fn apply_settings_update(
    settings: &mut Settings,
    update: SettingsUpdate,
) -> Result<bool, CliError> {
    let mut changed = false;

    if let Some(token) = update.access_token {
        settings.access_token = normalize_text_option(Some(token));
        changed = true;
    }
    if let Some(directory) = update.save_directory {
        settings.save_directory = normalize_text_option(Some(directory))
            .ok_or_else(|| CliError::Config("save_directory must not be empty".to_string()))?;
        changed = true;
    }
    if let Some(hours) = update.fetch_interval_hours {
        settings.fetch_interval_hours = hours;
        changed = true;
    }
    if let Some(count) = update.max_images_to_fetch {
        if count == 0 {
            return Err(CliError::Config(
                "max_images_to_fetch must be at least 1".to_string(),
            ));
        }
        settings.max_images_to_fetch = count;
        changed = true;
    }
    if let Some(enabled) = update.detect_deleted_images {
        settings.detect_deleted_images = enabled;
        changed = true;
    }
    if let Some(enabled) = update.delete_notes_for_deleted_images {
        settings.delete_notes_for_deleted_images = enabled;
        changed = true;
    }
    if let Some(enabled) = update.force_refetch {
        settings.force_refetch = enabled;
        changed = true;
    }
    if let Some(url) = update.api_base_url {
        let url = normalize_text_option(Some(url))
            .ok_or_else(|| CliError::Config("api_base_url must not be empty".to_string()))?;
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "api_base_url must include http:// or https://".to_string(),
            ));
        }
        settings.api_base_url = url.trim_end_matches('/').to_string();
        changed = true;
    }
    if let Some(seconds) = update.request_timeout_secs {
        if seconds == 0 {
            return Err(CliError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        settings.request_timeout_secs = seconds;
        changed = true;
    }
    if update.reset_checkpoint {
        settings.last_fetched_id = None;
        changed = true;
    }

    Ok(changed)
}
