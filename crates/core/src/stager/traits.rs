//! Trait definitions for the stager module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::StagingError;
use crate::build_api::BuildDefinition;

/// Result of a staging attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The content directory now holds exactly this build's files.
    Staged {
        content_dir: PathBuf,
        /// Number of archive entries extracted.
        entries: usize,
        /// Downloaded archive size.
        bytes: u64,
    },
    /// An archive with this build's file name is already present in the
    /// download directory; nothing was touched.
    AlreadyStaged { archive_path: PathBuf },
}

impl StageOutcome {
    pub fn is_staged(&self) -> bool {
        matches!(self, Self::Staged { .. })
    }
}

/// Fetches a build artifact and unpacks it into a content directory.
#[async_trait]
pub trait Stager: Send + Sync {
    /// Returns the name of this stager implementation.
    fn name(&self) -> &str;

    /// Stages `build` into `content_dir`, replacing whatever was there.
    async fn stage(
        &self,
        build: &BuildDefinition,
        content_dir: &Path,
    ) -> Result<StageOutcome, StagingError>;
}
