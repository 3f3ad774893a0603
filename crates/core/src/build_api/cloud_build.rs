//! Cloud build API client.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::BuildApiConfig;
use crate::target::SourceLocator;

use super::error::BuildApiError;
use super::traits::BuildSource;
use super::types::{ApiBuild, BuildDefinition};

/// Queries the cloud build service for successful builds of a target.
pub struct CloudBuildClient {
    client: Client,
    config: BuildApiConfig,
}

impl CloudBuildClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BuildApiConfig) -> Result<Self, BuildApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BuildApiError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the successful-builds listing URL for a source.
    fn build_list_url(&self, source: &SourceLocator) -> String {
        format!(
            "{}/orgs/{}/projects/{}/buildtargets/{}/builds?buildStatus=success",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&source.org_id),
            urlencoding::encode(&source.project),
            urlencoding::encode(&source.build_target),
        )
    }
}

/// Decodes a builds listing and picks the highest build number.
///
/// On equal build numbers the record that appears first wins.
pub(crate) fn select_latest_build(
    body: &str,
    project: &str,
) -> Result<Option<BuildDefinition>, BuildApiError> {
    let builds: Vec<ApiBuild> =
        serde_json::from_str(body).map_err(|e| BuildApiError::Decode(e.to_string()))?;

    let mut latest: Option<ApiBuild> = None;
    for build in builds {
        let newer = latest
            .as_ref()
            .map_or(true, |current| build.build > current.build);
        if newer {
            latest = Some(build);
        }
    }

    Ok(latest.map(|build| build.into_definition(project)))
}

#[async_trait]
impl BuildSource for CloudBuildClient {
    fn name(&self) -> &str {
        "cloud-build"
    }

    async fn latest_successful_build(
        &self,
        source: &SourceLocator,
    ) -> Result<Option<BuildDefinition>, BuildApiError> {
        let url = self.build_list_url(source);
        debug!(
            project = %source.project,
            build_target = %source.build_target,
            "Downloading cloud build information"
        );

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Basic {}", source.api_key))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(BuildApiError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BuildApiError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await.map_err(BuildApiError::from_reqwest)?;
        let latest = select_latest_build(&body, &source.project)?;

        match &latest {
            Some(build) => info!(
                project = %source.project,
                build_target = %source.build_target,
                build = build.build_number,
                "Found build"
            ),
            None => info!(
                project = %source.project,
                build_target = %source.build_target,
                "No successful builds"
            ),
        }

        Ok(latest)
    }
}
