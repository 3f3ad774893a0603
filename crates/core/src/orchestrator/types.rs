//! Types for the sync orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that abort one target's sequence within a pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Build metadata could not be fetched.
    #[error("build api error: {0}")]
    BuildApi(#[from] crate::build_api::BuildApiError),

    /// The processed-build marker could not be read or written.
    #[error("state store error: {0}")]
    State(#[from] crate::state::StateError),

    /// Download or extraction failed.
    #[error("staging error: {0}")]
    Staging(#[from] crate::stager::StagingError),
}

/// What started a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassTrigger {
    Startup,
    Scheduled,
    Manual,
}

impl fmt::Display for PassTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::Scheduled => write!(f, "scheduled"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Per-pass context threaded through the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassContext {
    /// Monotonic per process, starting at 1.
    pub pass_id: u64,
    pub trigger: PassTrigger,
    pub started_at: DateTime<Utc>,
}

impl PassContext {
    pub fn new(pass_id: u64, trigger: PassTrigger) -> Self {
        Self {
            pass_id,
            trigger,
            started_at: Utc::now(),
        }
    }
}

/// What happened to one target during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TargetOutcome {
    /// The build service has no successful build for the target.
    NoBuildAvailable,
    /// The latest build is not above the processed marker.
    UpToDate {
        build_number: u64,
        marker: Option<u64>,
    },
    /// The archive was already in the download directory; nothing changed.
    AlreadyStaged { build_number: u64 },
    Published { build_number: u64 },
    /// The build was staged and claimed but the publishing tool failed.
    PublishFailed {
        build_number: u64,
        detail: Option<String>,
    },
    /// The sequence aborted before the marker was advanced.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: TargetOutcome,
}

/// Summary of one pass over all targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    #[serde(flatten)]
    pub context: PassContext,
    pub finished_at: DateTime<Utc>,
    /// Set when the targets could not be enumerated at all.
    pub target_error: Option<String>,
    pub targets: Vec<TargetReport>,
}

impl PassReport {
    pub fn published_count(&self) -> usize {
        self.count(|o| matches!(o, TargetOutcome::Published { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                TargetOutcome::Failed { .. } | TargetOutcome::PublishFailed { .. }
            )
        })
    }

    pub fn outcome_for(&self, name: &str) -> Option<&TargetOutcome> {
        self.targets
            .iter()
            .find(|t| t.name == name)
            .map(|t| &t.outcome)
    }

    fn count(&self, pred: impl Fn(&TargetOutcome) -> bool) -> usize {
        self.targets.iter().filter(|t| pred(&t.outcome)).count()
    }
}
