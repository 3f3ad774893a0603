//! Watch target types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One configured (source build, destination publish) pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchTarget {
    /// Human-readable name (the config file stem). Logging only.
    #[serde(skip)]
    pub name: String,
    /// Where builds come from.
    pub source: SourceLocator,
    /// Where builds are published to.
    pub destination: PublishDestination,
    /// Optional per-target notification settings.
    #[serde(default)]
    pub notification: Option<NotificationOverride>,
}

/// Locates a build target on the remote build service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceLocator {
    pub org_id: String,
    pub project: String,
    pub build_target: String,
    /// Sent verbatim as the Basic authorization credential.
    pub api_key: String,
}

/// Describes how a staged build is handed to the publishing tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishDestination {
    pub username: String,
    pub password: String,
    pub app_id: String,
    /// Publishing branch; `None` means the tool's default branch.
    #[serde(default)]
    pub branch: Option<String>,
    /// Directory the artifact is extracted into.
    pub content_dir: PathBuf,
    /// Path of the staged executable, relative to the working directory
    /// unless absolute.
    pub executable_path: PathBuf,
    /// Template file name inside the publisher's scripts directory.
    pub script_template: String,
    #[serde(default)]
    pub use_drm: bool,
    pub display_name: String,
}

/// Per-target notification settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationOverride {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// The five fields that identify a target for progress tracking.
///
/// Two targets that share a source but publish to different apps or branches
/// have different identities and are tracked independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetIdentity {
    pub org_id: String,
    pub project: String,
    pub build_target: String,
    pub app_id: String,
    pub branch: String,
}

impl WatchTarget {
    /// Identity used to key the processed-build marker.
    pub fn identity(&self) -> TargetIdentity {
        TargetIdentity {
            org_id: self.source.org_id.clone(),
            project: self.source.project.clone(),
            build_target: self.source.build_target.clone(),
            app_id: self.destination.app_id.clone(),
            branch: self.destination.branch.clone().unwrap_or_default(),
        }
    }

    /// Branch name for messages ("default" when unset).
    pub fn branch_label(&self) -> &str {
        match self.destination.branch.as_deref() {
            Some(branch) if !branch.is_empty() => branch,
            _ => "default",
        }
    }

    /// Webhook URL override, if one is configured and non-empty.
    pub fn webhook_override(&self) -> Option<&str> {
        self.notification
            .as_ref()
            .and_then(|n| n.webhook_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}
