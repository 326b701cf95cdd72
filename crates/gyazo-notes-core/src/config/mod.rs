//! Settings persistence.
//!
//! The sync engine reads its configuration and checkpoint through
//! [`SettingsStore`] at the start of every run and writes the checkpoint back
//! when the run completes.

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::models::Settings;
use crate::Result;

/// Load/save access to the persisted [`Settings`].
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Settings>> + Send;

    fn save(&self, settings: &Settings) -> impl Future<Output = Result<()>> + Send;
}

/// Pretty-printed JSON settings file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    /// Missing file means defaults.
    async fn load(&self) -> Result<Settings> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Settings::default());
        }

        let raw = tokio::fs::read_to_string(&self.path).await?;
        let mut settings = serde_json::from_str::<Settings>(&raw)?;
        settings.normalize();
        Ok(settings)
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut normalized = settings.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        tokio::fs::write(&self.path, serialized).await?;
        tracing::debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn settings_roundtrip_normalizes_values() {
        let dir = tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("nested").join("settings.json"));

        let settings = Settings {
            access_token: Some(" token ".to_string()),
            save_directory: "Captures/".to_string(),
            last_fetched_id: Some("abc123".to_string()),
            last_fetch_time: Some(1_704_450_600_000),
            detect_deleted_images: true,
            ..Settings::default()
        };
        store.save(&settings).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.access_token.as_deref(), Some("token"));
        assert_eq!(loaded.save_directory, "Captures");
        assert_eq!(loaded.last_fetched_id.as_deref(), Some("abc123"));
        assert_eq!(loaded.last_fetch_time, Some(1_704_450_600_000));
        assert!(loaded.detect_deleted_images);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonSettingsStore::new(path);
        assert!(matches!(
            store.load().await,
            Err(crate::Error::Serialization(_))
        ));
    }
}
