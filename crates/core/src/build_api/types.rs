//! Build metadata types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single remote build selected for publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDefinition {
    /// Monotonic per build target; the novelty key.
    pub build_number: u64,
    /// `{build}_{project}_{buildtargetid}_{branch}.{ext}`
    pub file_name: String,
    pub download_url: String,
    pub commit_id: String,
    pub commit_message: String,
    pub scm_branch: String,
}

impl fmt::Display for BuildDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Build({})", self.file_name)
    }
}

/// One record of the builds listing, as returned by the API.
///
/// Only the consumed fields are decoded. Everything except the changeset is
/// required; a record missing any of them fails the whole decode.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiBuild {
    pub build: u64,
    pub buildtargetid: String,
    #[serde(rename = "scmBranch")]
    pub scm_branch: String,
    #[serde(default)]
    pub changeset: Vec<ApiChange>,
    #[serde(rename = "lastBuiltRevision", default)]
    pub last_built_revision: Option<String>,
    pub links: ApiLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiChange {
    #[serde(rename = "commitId")]
    pub commit_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiLinks {
    pub download_primary: ApiDownload,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiDownload {
    pub href: String,
    pub meta: ApiDownloadMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiDownloadMeta {
    /// File extension of the artifact, e.g. "zip".
    #[serde(rename = "type")]
    pub kind: String,
}

impl ApiBuild {
    /// Converts an API record into a build definition for `project`.
    ///
    /// Builds without a changeset (e.g. manually triggered rebuilds) fall back
    /// to `lastBuiltRevision` and an empty commit message.
    pub(crate) fn into_definition(self, project: &str) -> BuildDefinition {
        let file_name = format!(
            "{}_{}_{}_{}.{}",
            self.build,
            project,
            self.buildtargetid,
            self.scm_branch,
            self.links.download_primary.meta.kind
        );

        let (commit_id, commit_message) = match self.changeset.into_iter().next() {
            Some(change) => (change.commit_id, change.message),
            None => (self.last_built_revision.unwrap_or_default(), String::new()),
        };

        BuildDefinition {
            build_number: self.build,
            file_name,
            download_url: self.links.download_primary.href,
            commit_id,
            commit_message,
            scm_branch: self.scm_branch,
        }
    }
}
