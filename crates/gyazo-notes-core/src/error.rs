//! Error types for gyazo-notes-core

use thiserror::Error;

/// Result type alias using gyazo-notes-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gyazo-notes-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration (e.g. no access token)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Gyazo API responded with an unexpected status or payload
    #[error("Gyazo API error: {0}")]
    Transport(String),

    /// HTTP client error (connect failure, timeout, bad body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Image does not exist on the remote service
    #[error("Image not found: {0}")]
    NotFound(String),

    /// Note is missing its front-matter or `gyazo_id` marker
    #[error("Not a managed Gyazo note: {0}")]
    ContentFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The run was cancelled before it finished
    #[error("Sync cancelled")]
    Cancelled,
}

impl Error {
    /// Whether this error confirms that the remote image is gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
