//! gyazo-notes-core - Core library for gyazo-notes
//!
//! This crate contains the image models, the note codec, and the sync engine
//! that keeps a folder of markdown notes aligned with a Gyazo account. Every
//! outside collaborator (HTTP, files, settings, notifications, confirmation
//! prompts) sits behind a small trait so hosts can plug in their own.

pub mod codec;
pub mod config;
pub mod delete;
pub mod error;
pub mod models;
pub mod notify;
pub mod remote;
pub mod store;
pub mod sync;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};
pub use models::{ImageMetadata, ImageRecord, OcrText, Settings};
