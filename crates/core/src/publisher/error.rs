//! Error types for the publisher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent the publishing tool from producing an outcome.
///
/// A non-zero exit status is not an error; it is reported through
/// `PublishOutcome`.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The target's script template does not exist.
    #[error("Publish script template not found: {path}")]
    TemplateNotFound { path: PathBuf },

    /// The publishing executable does not exist.
    #[error("Publishing tool not found at path: {path}")]
    ExecutableNotFound { path: PathBuf },

    /// Reading the template or writing the generated script failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The publishing process could not be started.
    #[error("Failed to spawn {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
