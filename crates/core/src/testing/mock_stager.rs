//! Mock stager for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::build_api::BuildDefinition;
use crate::stager::{StageOutcome, Stager, StagingError};

/// A recorded staging call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedStage {
    pub build: BuildDefinition,
    pub content_dir: PathBuf,
    pub success: bool,
}

/// Mock implementation of the Stager trait.
///
/// Stages nothing on disk. By default every call reports `Staged`.
#[derive(Debug, Default)]
pub struct MockStager {
    stages: Arc<RwLock<Vec<RecordedStage>>>,
    /// If set, the next call fails with an I/O error carrying this message.
    next_error: Arc<RwLock<Option<String>>>,
    already_staged: Arc<RwLock<bool>>,
    /// Simulated staging duration.
    delay: Arc<RwLock<Duration>>,
}

impl MockStager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recorded_stages(&self) -> Vec<RecordedStage> {
        self.stages.read().await.clone()
    }

    pub async fn stage_count(&self) -> usize {
        self.stages.read().await.len()
    }

    /// Configure the next call to fail.
    pub async fn set_next_error(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }

    /// Set the simulated staging duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Report every call as already staged.
    pub async fn set_already_staged(&self, already_staged: bool) {
        *self.already_staged.write().await = already_staged;
    }
}

#[async_trait]
impl Stager for MockStager {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stage(
        &self,
        build: &BuildDefinition,
        content_dir: &Path,
    ) -> Result<StageOutcome, StagingError> {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let error = self.next_error.write().await.take();
        self.stages.write().await.push(RecordedStage {
            build: build.clone(),
            content_dir: content_dir.to_path_buf(),
            success: error.is_none(),
        });

        if let Some(message) = error {
            return Err(StagingError::Io {
                path: content_dir.to_path_buf(),
                source: std::io::Error::other(message),
            });
        }

        if *self.already_staged.read().await {
            return Ok(StageOutcome::AlreadyStaged {
                archive_path: PathBuf::from("downloads").join(&build.file_name),
            });
        }

        Ok(StageOutcome::Staged {
            content_dir: content_dir.to_path_buf(),
            entries: 1,
            bytes: 0,
        })
    }
}
