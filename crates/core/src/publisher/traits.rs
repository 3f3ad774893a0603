//! Trait definitions for the publisher module.

use async_trait::async_trait;

use super::error::PublishError;
use super::types::PublishOutcome;
use crate::build_api::BuildDefinition;
use crate::target::PublishDestination;

/// Hands a staged build to an external publishing tool.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns the name of this publisher implementation.
    fn name(&self) -> &str;

    /// Publishes `build` to `destination` and waits for the result.
    async fn publish(
        &self,
        destination: &PublishDestination,
        build: &BuildDefinition,
    ) -> Result<PublishOutcome, PublishError>;
}
