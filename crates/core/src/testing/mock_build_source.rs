//! Mock build source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::build_api::{BuildApiError, BuildDefinition, BuildSource};
use crate::target::SourceLocator;

#[derive(Debug, Clone)]
enum MockResponse {
    Latest(BuildDefinition),
    NoBuild,
    HttpStatus(u16),
}

/// Mock implementation of the BuildSource trait.
///
/// Responses are configured per build target id. Unconfigured targets have
/// no successful build.
///
/// # Example
///
/// ```rust,ignore
/// use buildsync_core::testing::{fixtures, MockBuildSource};
///
/// let builds = MockBuildSource::new();
/// builds.set_latest("win64", fixtures::build(42)).await;
/// builds.set_http_error("linux", 401).await;
/// ```
#[derive(Debug, Default)]
pub struct MockBuildSource {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    queries: Arc<RwLock<Vec<SourceLocator>>>,
}

impl MockBuildSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `build` as the latest successful build of `build_target`.
    pub async fn set_latest(&self, build_target: &str, build: BuildDefinition) {
        self.responses
            .write()
            .await
            .insert(build_target.to_string(), MockResponse::Latest(build));
    }

    /// Report that `build_target` has no successful build.
    pub async fn set_no_build(&self, build_target: &str) {
        self.responses
            .write()
            .await
            .insert(build_target.to_string(), MockResponse::NoBuild);
    }

    /// Fail queries for `build_target` with an HTTP status.
    pub async fn set_http_error(&self, build_target: &str, status: u16) {
        self.responses
            .write()
            .await
            .insert(build_target.to_string(), MockResponse::HttpStatus(status));
    }

    /// All source locators queried so far.
    pub async fn recorded_queries(&self) -> Vec<SourceLocator> {
        self.queries.read().await.clone()
    }

    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }
}

#[async_trait]
impl BuildSource for MockBuildSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn latest_successful_build(
        &self,
        source: &SourceLocator,
    ) -> Result<Option<BuildDefinition>, BuildApiError> {
        self.queries.write().await.push(source.clone());

        match self.responses.read().await.get(&source.build_target) {
            Some(MockResponse::Latest(build)) => Ok(Some(build.clone())),
            Some(MockResponse::NoBuild) | None => Ok(None),
            Some(MockResponse::HttpStatus(status)) => Err(BuildApiError::HttpStatus {
                status: *status,
                body: "mock error".to_string(),
            }),
        }
    }
}
