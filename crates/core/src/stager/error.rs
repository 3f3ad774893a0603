//! Error types for the stager module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while staging an artifact.
#[derive(Debug, Error)]
pub enum StagingError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// Transfer failed.
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The artifact server answered with a non-success status.
    #[error("Download of {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive is corrupt or unsupported.
    #[error("Failed to extract archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The content directory has no usable final component.
    #[error("Invalid content directory: {path}")]
    InvalidContentDir { path: PathBuf },

    /// The blocking extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl StagingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
