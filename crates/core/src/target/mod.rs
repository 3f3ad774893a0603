//! Watch targets and where they come from.

mod loader;
mod types;

pub use loader::JsonDirTargets;
pub use types::{
    NotificationOverride, PublishDestination, SourceLocator, TargetIdentity, WatchTarget,
};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while enumerating watch targets.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The target directory does not exist.
    #[error("Target directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// The target directory could not be read.
    #[error("Failed to read target directory {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Enumerates the watch targets for one pass.
#[async_trait]
pub trait TargetSource: Send + Sync {
    async fn load_targets(&self) -> Result<Vec<WatchTarget>, TargetError>;
}
