//! Error types for annotation sessions.

use thiserror::Error;

/// Failure reported by an [`ImageFetcher`](crate::images::ImageFetcher).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The backend has no image for this reference
    #[error("Image not found")]
    NotFound,

    /// Transport or backend failure
    #[error("{0}")]
    Transport(String),
}

/// Failure reported by a [`FindingsSink`](crate::persist::FindingsSink).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// The backend refused the payload
    #[error("Save rejected: {0}")]
    Rejected(String),

    /// Transport or backend failure
    #[error("Save failed: {0}")]
    Transport(String),
}

/// Errors that can occur while running an annotation session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Fetching image bytes failed; the remaining images were not fetched
    #[error("Failed to fetch image '{reference}': {source}")]
    Fetch {
        /// Reference of the image that failed
        reference: String,
        /// Underlying fetch failure
        #[source]
        source: FetchError,
    },

    /// Persisting findings and annotations failed
    #[error(transparent)]
    Save(#[from] SaveError),

    /// Drawing surface error
    #[error("Canvas error: {0}")]
    Canvas(#[from] toothmark_canvas::CanvasError),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid config: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },
}

impl SessionError {
    /// Create a fetch error for an image reference.
    pub fn fetch(reference: impl Into<String>, source: FetchError) -> Self {
        Self::Fetch {
            reference: reference.into(),
            source,
        }
    }

    /// Create an invalid config error with a message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
