//! Gyazo image model

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize};

use crate::util::normalize_text_option;

/// An image as returned by the Gyazo list/detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Stable remote identifier
    #[serde(rename = "image_id")]
    pub id: String,
    /// Upload time, in the offset reported by the service
    #[serde(with = "timestamp")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permalink_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub thumb_url: String,
    /// Direct image URL
    #[serde(default, rename = "url", deserialize_with = "null_as_empty")]
    pub content_url: String,
    /// File type reported by the service (`png`, `jpg`, ...)
    #[serde(default, rename = "type", deserialize_with = "null_as_empty")]
    pub image_type: String,
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
    #[serde(default)]
    pub ocr: Option<OcrText>,
}

/// Capture metadata attached by the Gyazo client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "url", alias = "source_url")]
    pub source_url: Option<String>,
    #[serde(default, rename = "desc", alias = "description")]
    pub description: Option<String>,
}

/// OCR result; filled in asynchronously after upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrText {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ImageRecord {
    /// Metadata title, if present and non-blank.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|metadata| normalize_text_option(metadata.title.clone()))
    }

    /// Capturing application name, if present and non-blank.
    #[must_use]
    pub fn app(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|metadata| normalize_text_option(metadata.app.clone()))
    }

    #[must_use]
    pub fn source_url(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|metadata| normalize_text_option(metadata.source_url.clone()))
    }

    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|metadata| normalize_text_option(metadata.description.clone()))
    }

    /// Recognized text, if OCR has completed and found something.
    #[must_use]
    pub fn ocr_text(&self) -> Option<String> {
        self.ocr
            .as_ref()
            .and_then(|ocr| normalize_text_option(ocr.description.clone()))
    }

    #[must_use]
    pub fn ocr_locale(&self) -> Option<String> {
        self.ocr
            .as_ref()
            .and_then(|ocr| normalize_text_option(ocr.locale.clone()))
    }

    /// Title used for the note heading and embed alt text.
    #[must_use]
    pub fn display_title(&self) -> String {
        self.title()
            .unwrap_or_else(|| format!("Gyazo Image {}", self.id))
    }

    /// `created_at` as an RFC 3339 string (`Z` for UTC).
    #[must_use]
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Parse a service timestamp.
///
/// Accepts RFC 3339 as well as the compact `+0900` offsets the Gyazo API
/// emits.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .or_else(|| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z").ok())
        .or_else(|| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z").ok())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

mod timestamp {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid created_at timestamp: {raw}")))
    }
}
