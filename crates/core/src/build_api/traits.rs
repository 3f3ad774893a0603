//! Trait definitions for build metadata sources.

use async_trait::async_trait;

use super::error::BuildApiError;
use super::types::BuildDefinition;
use crate::target::SourceLocator;

/// A service that knows which builds exist for a build target.
#[async_trait]
pub trait BuildSource: Send + Sync {
    /// Returns the name of this source implementation.
    fn name(&self) -> &str;

    /// Returns the successful build with the highest build number.
    ///
    /// `Ok(None)` means the target has no successful build yet.
    async fn latest_successful_build(
        &self,
        source: &SourceLocator,
    ) -> Result<Option<BuildDefinition>, BuildApiError>;
}
