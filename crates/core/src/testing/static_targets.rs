//! Fixed target list for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::target::{TargetError, TargetSource, WatchTarget};

/// A TargetSource returning a configurable list.
#[derive(Debug, Default)]
pub struct StaticTargets {
    targets: Arc<RwLock<Vec<WatchTarget>>>,
    missing_dir: Arc<RwLock<bool>>,
}

impl StaticTargets {
    pub fn new(targets: Vec<WatchTarget>) -> Self {
        Self {
            targets: Arc::new(RwLock::new(targets)),
            missing_dir: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn set_targets(&self, targets: Vec<WatchTarget>) {
        *self.targets.write().await = targets;
    }

    /// Fail enumeration as if the target directory were missing.
    pub async fn set_missing_dir(&self, missing: bool) {
        *self.missing_dir.write().await = missing;
    }
}

#[async_trait]
impl TargetSource for StaticTargets {
    async fn load_targets(&self) -> Result<Vec<WatchTarget>, TargetError> {
        if *self.missing_dir.read().await {
            return Err(TargetError::DirectoryNotFound {
                path: PathBuf::from("configs"),
            });
        }
        Ok(self.targets.read().await.clone())
    }
}
