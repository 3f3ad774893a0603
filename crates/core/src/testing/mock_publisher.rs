//! Mock publisher for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::build_api::BuildDefinition;
use crate::publisher::{script_name_for, PublishError, PublishOutcome, Publisher};
use crate::target::PublishDestination;

/// A recorded publish call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPublish {
    pub destination: PublishDestination,
    pub build: BuildDefinition,
}

#[derive(Debug, Clone)]
struct MockExit {
    exit_code: i32,
    output: String,
}

/// Mock implementation of the Publisher trait.
///
/// Exits successfully unless configured otherwise.
#[derive(Debug, Default)]
pub struct MockPublisher {
    publishes: Arc<RwLock<Vec<RecordedPublish>>>,
    exit: Arc<RwLock<Option<MockExit>>>,
    missing_template: Arc<RwLock<bool>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recorded_publishes(&self) -> Vec<RecordedPublish> {
        self.publishes.read().await.clone()
    }

    pub async fn publish_count(&self) -> usize {
        self.publishes.read().await.len()
    }

    /// Make the tool exit with `exit_code` and print `output`.
    pub async fn set_exit(&self, exit_code: i32, output: &str) {
        *self.exit.write().await = Some(MockExit {
            exit_code,
            output: output.to_string(),
        });
    }

    /// Make every publish fail before the tool runs, as if the template
    /// were missing.
    pub async fn set_missing_template(&self, missing: bool) {
        *self.missing_template.write().await = missing;
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(
        &self,
        destination: &PublishDestination,
        build: &BuildDefinition,
    ) -> Result<PublishOutcome, PublishError> {
        if *self.missing_template.read().await {
            return Err(PublishError::TemplateNotFound {
                path: PathBuf::from("scripts").join(&destination.script_template),
            });
        }

        self.publishes.write().await.push(RecordedPublish {
            destination: destination.clone(),
            build: build.clone(),
        });

        let exit = self.exit.read().await.clone().unwrap_or(MockExit {
            exit_code: 0,
            output: String::new(),
        });
        Ok(PublishOutcome {
            success: exit.exit_code == 0,
            exit_code: Some(exit.exit_code),
            output: exit.output,
            script_name: script_name_for(&destination.script_template, build.build_number),
            duration_ms: 0,
        })
    }
}
