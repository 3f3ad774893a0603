//! In-memory state store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::state::{StateError, StateStore};
use crate::target::TargetIdentity;

/// Mock implementation of the StateStore trait.
#[derive(Debug, Default)]
pub struct MockStateStore {
    markers: Arc<RwLock<HashMap<TargetIdentity, u64>>>,
    writes: Arc<RwLock<Vec<(TargetIdentity, u64)>>>,
    fail_writes: Arc<RwLock<bool>>,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a marker without recording a write.
    pub async fn seed(&self, identity: TargetIdentity, build_number: u64) {
        self.markers.write().await.insert(identity, build_number);
    }

    pub async fn marker(&self, identity: &TargetIdentity) -> Option<u64> {
        self.markers.read().await.get(identity).copied()
    }

    pub async fn recorded_writes(&self) -> Vec<(TargetIdentity, u64)> {
        self.writes.read().await.clone()
    }

    pub async fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write().await = fail;
    }
}

#[async_trait]
impl StateStore for MockStateStore {
    async fn get(&self, identity: &TargetIdentity) -> Result<Option<u64>, StateError> {
        Ok(self.markers.read().await.get(identity).copied())
    }

    async fn set(&self, identity: &TargetIdentity, build_number: u64) -> Result<(), StateError> {
        if *self.fail_writes.read().await {
            return Err(StateError::Write {
                path: PathBuf::from("state"),
                source: std::io::Error::other("mock write failure"),
            });
        }
        self.writes
            .write()
            .await
            .push((identity.clone(), build_number));
        self.markers
            .write()
            .await
            .insert(identity.clone(), build_number);
        Ok(())
    }
}
