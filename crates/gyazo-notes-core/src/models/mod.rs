//! Data models for gyazo-notes

mod image;
mod settings;

pub use image::{parse_timestamp, ImageMetadata, ImageRecord, OcrText};
pub use settings::{
    Settings, DEFAULT_API_BASE_URL, DEFAULT_MAX_IMAGES_TO_FETCH, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SAVE_DIRECTORY,
};
