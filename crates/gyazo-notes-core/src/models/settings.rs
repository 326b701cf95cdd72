//! Persisted settings and sync checkpoint

use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;

pub const DEFAULT_SAVE_DIRECTORY: &str = "Gyazo";
pub const DEFAULT_API_BASE_URL: &str = "https://api.gyazo.com";
pub const DEFAULT_MAX_IMAGES_TO_FETCH: u32 = 40;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Everything the sync engine persists between runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// Gyazo API access token
    pub access_token: Option<String>,
    /// Vault-relative folder that holds the generated notes
    pub save_directory: String,
    /// Newest image id processed by the previous run
    pub last_fetched_id: Option<String>,
    /// Discard the checkpoint and every managed note on the next run
    pub force_refetch: bool,
    /// Hours between periodic runs; `0` disables scheduling
    pub fetch_interval_hours: u32,
    /// When the last run completed (Unix ms)
    pub last_fetch_time: Option<i64>,
    /// Look for notes whose image was removed upstream
    pub detect_deleted_images: bool,
    /// Delete such notes instead of only reporting them
    pub delete_notes_for_deleted_images: bool,
    /// Upper bound on images fetched per run
    pub max_images_to_fetch: u32,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            access_token: None,
            save_directory: DEFAULT_SAVE_DIRECTORY.to_string(),
            last_fetched_id: None,
            force_refetch: false,
            fetch_interval_hours: 0,
            last_fetch_time: None,
            detect_deleted_images: false,
            delete_notes_for_deleted_images: false,
            max_images_to_fetch: DEFAULT_MAX_IMAGES_TO_FETCH,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Settings")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("save_directory", &self.save_directory)
            .field("last_fetched_id", &self.last_fetched_id)
            .field("force_refetch", &self.force_refetch)
            .field("fetch_interval_hours", &self.fetch_interval_hours)
            .field("last_fetch_time", &self.last_fetch_time)
            .field("detect_deleted_images", &self.detect_deleted_images)
            .field(
                "delete_notes_for_deleted_images",
                &self.delete_notes_for_deleted_images,
            )
            .field("max_images_to_fetch", &self.max_images_to_fetch)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Access token, trimmed; `None` when unset or blank.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        normalize_text_option(self.access_token.clone())
    }

    /// Checkpoint id honoured by this run, `None` under a forced refetch.
    #[must_use]
    pub fn effective_checkpoint(&self) -> Option<String> {
        if self.force_refetch {
            None
        } else {
            normalize_text_option(self.last_fetched_id.clone())
        }
    }

    /// Trim strings and restore defaults for blank required values.
    pub fn normalize(&mut self) {
        self.access_token = normalize_text_option(self.access_token.take());
        self.last_fetched_id = normalize_text_option(self.last_fetched_id.take());

        let save_directory = self.save_directory.trim().trim_matches('/').to_string();
        self.save_directory = if save_directory.is_empty() {
            DEFAULT_SAVE_DIRECTORY.to_string()
        } else {
            save_directory
        };

        let api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self.api_base_url = if api_base_url.is_empty() {
            DEFAULT_API_BASE_URL.to_string()
        } else {
            api_base_url
        };

        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.max_images_to_fetch, 40);
        assert_eq!(settings.save_directory, "Gyazo");
        assert_eq!(settings.fetch_interval_hours, 0);
        assert!(!settings.detect_deleted_images);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "access_token": "tok" }"#).unwrap();
        assert_eq!(settings.access_token().as_deref(), Some("tok"));
        assert_eq!(settings.max_images_to_fetch, 40);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn forced_refetch_ignores_checkpoint() {
        let mut settings = Settings {
            last_fetched_id: Some("abc".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.effective_checkpoint().as_deref(), Some("abc"));
        settings.force_refetch = true;
        assert_eq!(settings.effective_checkpoint(), None);
    }

    #[test]
    fn normalize_restores_blank_defaults() {
        let mut settings = Settings {
            access_token: Some("  ".to_string()),
            save_directory: " /Captures/ ".to_string(),
            api_base_url: "https://api.gyazo.com/".to_string(),
            request_timeout_secs: 0,
            ..Settings::default()
        };
        settings.normalize();
        assert_eq!(settings.access_token, None);
        assert_eq!(settings.save_directory, "Captures");
        assert_eq!(settings.api_base_url, "https://api.gyazo.com");
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn debug_redacts_token() {
        let settings = Settings {
            access_token: Some("secret".to_string()),
            ..Settings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
