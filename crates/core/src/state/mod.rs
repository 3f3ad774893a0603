//! Durable processed-build markers.
//!
//! One marker per target identity records the highest build number that has
//! been staged. The orchestrator only stages builds strictly above it.

mod file_store;

pub use file_store::FileStateStore;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::target::TargetIdentity;

/// Errors from the state store.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to read marker {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write marker {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistent "last processed build" per target identity.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// The last processed build, or `None` when the target has no history.
    async fn get(&self, identity: &TargetIdentity) -> Result<Option<u64>, StateError>;

    /// Overwrite the marker with `build_number`.
    async fn set(&self, identity: &TargetIdentity, build_number: u64) -> Result<(), StateError>;
}
