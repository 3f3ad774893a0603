//! Sync orchestrator implementation.
//!
//! One pass walks every watch target in order:
//! fetch latest build -> novelty check -> stage -> claim -> publish -> notify.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::build_api::{BuildDefinition, BuildSource};
use crate::notifier::{Delivery, Notification, Notifier};
use crate::publisher::Publisher;
use crate::stager::{StageOutcome, Stager};
use crate::state::StateStore;
use crate::target::{TargetSource, WatchTarget};

use super::types::{PassContext, PassReport, SyncError, TargetOutcome, TargetReport};

/// Runs sync passes over the configured watch targets.
pub struct SyncOrchestrator {
    targets: Arc<dyn TargetSource>,
    builds: Arc<dyn BuildSource>,
    state: Arc<dyn StateStore>,
    stager: Arc<dyn Stager>,
    publisher: Arc<dyn Publisher>,
    notifier: Arc<dyn Notifier>,
}

impl SyncOrchestrator {
    pub fn new(
        targets: Arc<dyn TargetSource>,
        builds: Arc<dyn BuildSource>,
        state: Arc<dyn StateStore>,
        stager: Arc<dyn Stager>,
        publisher: Arc<dyn Publisher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            targets,
            builds,
            state,
            stager,
            publisher,
            notifier,
        }
    }

    /// Run one pass over all targets.
    ///
    /// Targets are processed sequentially. A failure in one target is
    /// recorded in the report and does not stop the others.
    pub async fn run_pass(&self, ctx: &PassContext) -> PassReport {
        info!(pass = ctx.pass_id, trigger = %ctx.trigger, "Starting sync pass");

        let mut report = PassReport {
            context: ctx.clone(),
            finished_at: ctx.started_at,
            target_error: None,
            targets: Vec::new(),
        };

        match self.targets.load_targets().await {
            Ok(targets) => {
                if targets.is_empty() {
                    warn!(pass = ctx.pass_id, "No watch targets configured");
                }
                for target in &targets {
                    let outcome = match self.process_target(ctx, target).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!(
                                pass = ctx.pass_id,
                                target_name = %target.name,
                                "Target failed: {}",
                                e
                            );
                            TargetOutcome::Failed {
                                error: e.to_string(),
                            }
                        }
                    };
                    report.targets.push(TargetReport {
                        name: target.name.clone(),
                        outcome,
                    });
                }
            }
            Err(e) => {
                error!(pass = ctx.pass_id, "Failed to load watch targets: {}", e);
                report.target_error = Some(e.to_string());
            }
        }

        report.finished_at = Utc::now();
        info!(
            pass = ctx.pass_id,
            targets = report.targets.len(),
            published = report.published_count(),
            failed = report.failed_count(),
            "Sync pass finished"
        );
        report
    }

    /// Run the full sequence for one target.
    ///
    /// The marker is advanced right after a successful stage, before
    /// publishing, so a build is never staged or published twice.
    #[instrument(skip_all, fields(pass = ctx.pass_id, target_name = %target.name))]
    pub async fn process_target(
        &self,
        ctx: &PassContext,
        target: &WatchTarget,
    ) -> Result<TargetOutcome, SyncError> {
        let latest = match self.builds.latest_successful_build(&target.source).await {
            Ok(latest) => latest,
            Err(e) if e.is_unauthorized() => {
                warn!(
                    org = %target.source.org_id,
                    project = %target.source.project,
                    "Build API rejected the target's API key"
                );
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        let Some(build) = latest else {
            info!("No successful build available");
            return Ok(TargetOutcome::NoBuildAvailable);
        };
        debug!(
            build = build.build_number,
            commit = %build.commit_id,
            "Latest successful build"
        );

        let identity = target.identity();
        let marker = self.state.get(&identity).await?;
        if marker.is_some_and(|processed| build.build_number <= processed) {
            info!(
                build = build.build_number,
                marker = ?marker,
                "Build already processed"
            );
            return Ok(TargetOutcome::UpToDate {
                build_number: build.build_number,
                marker,
            });
        }

        info!(build = build.build_number, marker = ?marker, "New build found");
        match self
            .stager
            .stage(&build, &target.destination.content_dir)
            .await?
        {
            StageOutcome::Staged { entries, .. } => {
                debug!(entries, "Build staged");
            }
            StageOutcome::AlreadyStaged { archive_path } => {
                warn!(
                    build = build.build_number,
                    archive = %archive_path.display(),
                    "Archive already present, skipping"
                );
                return Ok(TargetOutcome::AlreadyStaged {
                    build_number: build.build_number,
                });
            }
        }

        self.state.set(&identity, build.build_number).await?;
        debug!(build = build.build_number, "Marker advanced");

        Ok(self.publish_and_notify(target, &build).await)
    }

    async fn publish_and_notify(&self, target: &WatchTarget, build: &BuildDefinition) -> TargetOutcome {
        let display = &target.destination.display_name;
        let branch = target.branch_label();

        let (outcome, notification) =
            match self.publisher.publish(&target.destination, build).await {
                Ok(result) if result.success => (
                    TargetOutcome::Published {
                        build_number: build.build_number,
                    },
                    Notification::published(display, build.build_number, branch),
                ),
                Ok(result) => {
                    let detail = result.failure_detail().map(String::from);
                    (
                        TargetOutcome::PublishFailed {
                            build_number: build.build_number,
                            detail: detail.clone(),
                        },
                        Notification::failed(display, build.build_number, branch, detail),
                    )
                }
                Err(e) => {
                    error!(build = build.build_number, "Publish could not run: {}", e);
                    let detail = Some(e.to_string());
                    (
                        TargetOutcome::PublishFailed {
                            build_number: build.build_number,
                            detail: detail.clone(),
                        },
                        Notification::failed(display, build.build_number, branch, detail),
                    )
                }
            };

        match self
            .notifier
            .notify(target.webhook_override(), &notification)
            .await
        {
            Ok(Delivery::Sent) => debug!("Notification sent"),
            Ok(Delivery::Skipped) => debug!("No webhook configured"),
            Err(e) => warn!("Failed to send notification: {}", e),
        }

        outcome
    }
}
