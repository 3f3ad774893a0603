//! Sync pass integration tests.
//!
//! These drive whole passes through the orchestrator with mock collaborators:
//! fetch -> novelty check -> stage -> claim -> publish -> notify

use std::sync::Arc;

use tempfile::TempDir;

use buildsync_core::{
    testing::{
        fixtures, MockBuildSource, MockNotifier, MockPublisher, MockStager, MockStateStore,
        StaticTargets,
    },
    BuildSource, FileStateStore, Notifier, PassContext, PassReport, PassTrigger, Publisher,
    StateStore, Stager, SyncOrchestrator, TargetOutcome, TargetSource, WatchTarget,
};

const WEBHOOK: &str = "https://hooks.example.com/builds";

/// Test helper holding every mock collaborator.
struct TestHarness {
    targets: Arc<StaticTargets>,
    builds: Arc<MockBuildSource>,
    state: Arc<MockStateStore>,
    stager: Arc<MockStager>,
    publisher: Arc<MockPublisher>,
    notifier: Arc<MockNotifier>,
    next_pass: u64,
}

impl TestHarness {
    fn new(targets: Vec<WatchTarget>) -> Self {
        Self {
            targets: Arc::new(StaticTargets::new(targets)),
            builds: Arc::new(MockBuildSource::new()),
            state: Arc::new(MockStateStore::new()),
            stager: Arc::new(MockStager::new()),
            publisher: Arc::new(MockPublisher::new()),
            notifier: Arc::new(MockNotifier::with_default_url(WEBHOOK)),
            next_pass: 1,
        }
    }

    fn single() -> Self {
        Self::new(vec![fixtures::watch_target("game-win64", "win64")])
    }

    fn orchestrator(&self) -> SyncOrchestrator {
        SyncOrchestrator::new(
            Arc::clone(&self.targets) as Arc<dyn TargetSource>,
            Arc::clone(&self.builds) as Arc<dyn BuildSource>,
            Arc::clone(&self.state) as Arc<dyn StateStore>,
            Arc::clone(&self.stager) as Arc<dyn Stager>,
            Arc::clone(&self.publisher) as Arc<dyn Publisher>,
            Arc::clone(&self.notifier) as Arc<dyn Notifier>,
        )
    }

    async fn run_pass(&mut self) -> PassReport {
        let ctx = PassContext::new(self.next_pass, PassTrigger::Scheduled);
        self.next_pass += 1;
        self.orchestrator().run_pass(&ctx).await
    }

    async fn marker(&self, name: &str, build_target: &str) -> Option<u64> {
        self.state
            .marker(&fixtures::watch_target(name, build_target).identity())
            .await
    }

    async fn seed_marker(&self, build_target: &str, build_number: u64) {
        self.state
            .seed(
                fixtures::watch_target("seed", build_target).identity(),
                build_number,
            )
            .await;
    }
}

#[tokio::test]
async fn test_first_build_is_staged_and_claimed() {
    let mut harness = TestHarness::single();
    harness.builds.set_latest("win64", fixtures::build(42)).await;

    let report = harness.run_pass().await;

    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::Published { build_number: 42 })
    );
    assert_eq!(harness.marker("game-win64", "win64").await, Some(42));

    let stages = harness.stager.recorded_stages().await;
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].build.build_number, 42);
    assert_eq!(stages[0].content_dir, std::path::PathBuf::from("content/win64"));
    assert_eq!(harness.publisher.publish_count().await, 1);
}

#[tokio::test]
async fn test_processed_build_is_not_touched_again() {
    let mut harness = TestHarness::single();
    harness.seed_marker("win64", 42).await;
    harness.builds.set_latest("win64", fixtures::build(42)).await;

    let report = harness.run_pass().await;

    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::UpToDate {
            build_number: 42,
            marker: Some(42)
        })
    );
    assert_eq!(harness.builds.query_count().await, 1);
    assert_eq!(harness.stager.stage_count().await, 0);
    assert_eq!(harness.publisher.publish_count().await, 0);
    assert_eq!(harness.notifier.sent_count().await, 0);
    assert!(harness.state.recorded_writes().await.is_empty());
}

#[tokio::test]
async fn test_older_build_than_marker_is_ignored() {
    let mut harness = TestHarness::single();
    harness.seed_marker("win64", 50).await;
    harness.builds.set_latest("win64", fixtures::build(42)).await;

    let report = harness.run_pass().await;

    assert!(matches!(
        report.outcome_for("game-win64"),
        Some(TargetOutcome::UpToDate { build_number: 42, .. })
    ));
    assert_eq!(harness.marker("game-win64", "win64").await, Some(50));
    assert_eq!(harness.stager.stage_count().await, 0);
}

#[tokio::test]
async fn test_new_build_published_and_announced() {
    let mut harness = TestHarness::single();
    harness.seed_marker("win64", 42).await;
    harness.builds.set_latest("win64", fixtures::build(43)).await;

    let report = harness.run_pass().await;

    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::Published { build_number: 43 })
    );
    assert_eq!(harness.marker("game-win64", "win64").await, Some(43));

    let sent = harness.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, WEBHOOK);
    assert!(sent[0].notification.is_success());
    assert!(sent[0].message.contains("43"));
    assert_eq!(
        sent[0].message,
        "Acme Game build 43 has been published to the default branch."
    );
}

#[tokio::test]
async fn test_failed_publish_is_claimed_and_not_retried() {
    let mut harness = TestHarness::single();
    harness.seed_marker("win64", 42).await;
    harness.builds.set_latest("win64", fixtures::build(43)).await;
    harness.publisher.set_exit(1, "disk full").await;

    let report = harness.run_pass().await;

    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::PublishFailed {
            build_number: 43,
            detail: Some("disk full".to_string())
        })
    );
    assert_eq!(harness.marker("game-win64", "win64").await, Some(43));

    let sent = harness.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].notification.is_success());
    assert!(sent[0].message.contains("disk full"));

    // Still 43 on the next pass: nothing is republished.
    let report = harness.run_pass().await;
    assert!(matches!(
        report.outcome_for("game-win64"),
        Some(TargetOutcome::UpToDate { build_number: 43, .. })
    ));
    assert_eq!(harness.stager.stage_count().await, 1);
    assert_eq!(harness.publisher.publish_count().await, 1);
    assert_eq!(harness.notifier.sent_count().await, 1);
}

#[tokio::test]
async fn test_unauthorized_build_api_skips_target() {
    let mut harness = TestHarness::single();
    harness.seed_marker("win64", 42).await;
    harness.builds.set_http_error("win64", 401).await;

    let report = harness.run_pass().await;

    assert!(matches!(
        report.outcome_for("game-win64"),
        Some(TargetOutcome::Failed { .. })
    ));
    assert_eq!(harness.marker("game-win64", "win64").await, Some(42));
    assert_eq!(harness.stager.stage_count().await, 0);
    assert_eq!(harness.publisher.publish_count().await, 0);
    assert_eq!(harness.notifier.sent_count().await, 0);
    assert_eq!(harness.notifier.skipped_count().await, 0);
}

#[tokio::test]
async fn test_no_successful_build() {
    let mut harness = TestHarness::single();
    harness.builds.set_no_build("win64").await;

    let report = harness.run_pass().await;

    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::NoBuildAvailable)
    );
    assert_eq!(harness.marker("game-win64", "win64").await, None);
}

#[tokio::test]
async fn test_staging_failure_keeps_marker_and_retries_next_pass() {
    let mut harness = TestHarness::single();
    harness.seed_marker("win64", 42).await;
    harness.builds.set_latest("win64", fixtures::build(43)).await;
    harness.stager.set_next_error("connection reset").await;

    let report = harness.run_pass().await;

    match report.outcome_for("game-win64") {
        Some(TargetOutcome::Failed { error }) => assert!(error.contains("staging error")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(harness.marker("game-win64", "win64").await, Some(42));
    assert_eq!(harness.publisher.publish_count().await, 0);
    assert_eq!(harness.notifier.sent_count().await, 0);

    let report = harness.run_pass().await;
    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::Published { build_number: 43 })
    );
    assert_eq!(harness.marker("game-win64", "win64").await, Some(43));
}

#[tokio::test]
async fn test_already_staged_archive_is_left_alone() {
    let mut harness = TestHarness::single();
    harness.builds.set_latest("win64", fixtures::build(42)).await;
    harness.stager.set_already_staged(true).await;

    let report = harness.run_pass().await;

    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::AlreadyStaged { build_number: 42 })
    );
    assert_eq!(harness.marker("game-win64", "win64").await, None);
    assert_eq!(harness.publisher.publish_count().await, 0);
    assert_eq!(harness.notifier.sent_count().await, 0);
}

#[tokio::test]
async fn test_marker_write_failure_prevents_publish() {
    let mut harness = TestHarness::single();
    harness.builds.set_latest("win64", fixtures::build(42)).await;
    harness.state.set_fail_writes(true).await;

    let report = harness.run_pass().await;

    assert!(matches!(
        report.outcome_for("game-win64"),
        Some(TargetOutcome::Failed { .. })
    ));
    assert_eq!(harness.stager.stage_count().await, 1);
    assert_eq!(harness.publisher.publish_count().await, 0);
}

#[tokio::test]
async fn test_missing_template_is_reported_as_failed_publish() {
    let mut harness = TestHarness::single();
    harness.builds.set_latest("win64", fixtures::build(42)).await;
    harness.publisher.set_missing_template(true).await;

    let report = harness.run_pass().await;

    match report.outcome_for("game-win64") {
        Some(TargetOutcome::PublishFailed {
            build_number: 42,
            detail: Some(detail),
        }) => assert!(detail.contains("template not found")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(harness.marker("game-win64", "win64").await, Some(42));

    let sent = harness.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].message.starts_with("Failed to publish Acme Game build 42"));
}

#[tokio::test]
async fn test_failing_target_does_not_block_others() {
    let mut harness = TestHarness::new(vec![
        fixtures::watch_target("game-linux", "linux"),
        fixtures::watch_target("game-mac", "mac"),
        fixtures::watch_target("game-win64", "win64"),
    ]);
    harness.builds.set_http_error("linux", 500).await;
    harness
        .builds
        .set_latest("mac", fixtures::build_for("mac", 7))
        .await;
    harness
        .builds
        .set_latest("win64", fixtures::build_for("win64", 12))
        .await;
    harness.stager.set_next_error("disk full").await;

    let report = harness.run_pass().await;

    assert_eq!(report.targets.len(), 3);
    let names: Vec<&str> = report.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["game-linux", "game-mac", "game-win64"]);

    assert!(matches!(
        report.outcome_for("game-linux"),
        Some(TargetOutcome::Failed { .. })
    ));
    // The injected stage error hits the first staged target only.
    assert!(matches!(
        report.outcome_for("game-mac"),
        Some(TargetOutcome::Failed { .. })
    ));
    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::Published { build_number: 12 })
    );
    assert_eq!(report.published_count(), 1);
    assert_eq!(report.failed_count(), 2);
}

#[tokio::test]
async fn test_markers_never_cross_targets() {
    let mut harness = TestHarness::new(vec![
        fixtures::watch_target("game-mac", "mac"),
        fixtures::watch_target("game-win64", "win64"),
    ]);
    harness
        .builds
        .set_latest("mac", fixtures::build_for("mac", 7))
        .await;
    harness
        .builds
        .set_latest("win64", fixtures::build_for("win64", 12))
        .await;

    harness.run_pass().await;

    assert_eq!(harness.marker("game-mac", "mac").await, Some(7));
    assert_eq!(harness.marker("game-win64", "win64").await, Some(12));
    for (identity, build_number) in harness.state.recorded_writes().await {
        match identity.build_target.as_str() {
            "mac" => assert_eq!(build_number, 7),
            "win64" => assert_eq!(build_number, 12),
            other => panic!("unexpected target {}", other),
        }
    }
}

#[tokio::test]
async fn test_same_source_different_branches_tracked_independently() {
    let stable = fixtures::watch_target("game-stable", "win64");
    let mut beta = fixtures::watch_target("game-beta", "win64");
    beta.destination.branch = Some("beta".to_string());
    beta.notification = Some(buildsync_core::target::NotificationOverride {
        webhook_url: Some("https://hooks.example.com/beta".to_string()),
    });

    let mut harness = TestHarness::new(vec![stable.clone(), beta.clone()]);
    harness.state.seed(stable.identity(), 42).await;
    harness.builds.set_latest("win64", fixtures::build(42)).await;

    let report = harness.run_pass().await;

    assert!(matches!(
        report.outcome_for("game-stable"),
        Some(TargetOutcome::UpToDate { .. })
    ));
    assert_eq!(
        report.outcome_for("game-beta"),
        Some(&TargetOutcome::Published { build_number: 42 })
    );
    assert_eq!(harness.state.marker(&beta.identity()).await, Some(42));

    let sent = harness.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, "https://hooks.example.com/beta");
    assert!(sent[0].message.ends_with("to the beta branch."));
}

#[tokio::test]
async fn test_no_webhook_means_no_notification() {
    let mut harness = TestHarness::single();
    harness.notifier = Arc::new(MockNotifier::new());
    harness.builds.set_latest("win64", fixtures::build(42)).await;

    let report = harness.run_pass().await;

    assert_eq!(report.published_count(), 1);
    assert_eq!(harness.notifier.sent_count().await, 0);
    assert_eq!(harness.notifier.skipped_count().await, 1);
}

#[tokio::test]
async fn test_notification_failure_does_not_change_outcome() {
    let mut harness = TestHarness::single();
    harness.builds.set_latest("win64", fixtures::build(42)).await;
    harness.notifier.set_fail(true).await;

    let report = harness.run_pass().await;

    assert_eq!(
        report.outcome_for("game-win64"),
        Some(&TargetOutcome::Published { build_number: 42 })
    );
    assert_eq!(harness.marker("game-win64", "win64").await, Some(42));
}

#[tokio::test]
async fn test_missing_target_directory_fails_pass_cleanly() {
    let mut harness = TestHarness::single();
    harness.targets.set_missing_dir(true).await;

    let report = harness.run_pass().await;

    assert!(report.target_error.is_some());
    assert!(report.targets.is_empty());
    assert_eq!(harness.builds.query_count().await, 0);
}

#[tokio::test]
async fn test_file_markers_survive_restart() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let targets = Arc::new(StaticTargets::new(vec![fixtures::watch_target(
        "game-win64",
        "win64",
    )]));
    let builds = Arc::new(MockBuildSource::new());
    let stager = Arc::new(MockStager::new());
    let publisher = Arc::new(MockPublisher::new());
    builds.set_latest("win64", fixtures::build(42)).await;

    let orchestrator = |state_dir: &std::path::Path| {
        SyncOrchestrator::new(
            Arc::clone(&targets) as Arc<dyn TargetSource>,
            Arc::clone(&builds) as Arc<dyn BuildSource>,
            Arc::new(FileStateStore::new(state_dir)) as Arc<dyn StateStore>,
            Arc::clone(&stager) as Arc<dyn Stager>,
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            Arc::new(MockNotifier::new()) as Arc<dyn Notifier>,
        )
    };

    let first = orchestrator(temp.path())
        .run_pass(&PassContext::new(1, PassTrigger::Startup))
        .await;
    assert_eq!(first.published_count(), 1);

    let second = orchestrator(temp.path())
        .run_pass(&PassContext::new(1, PassTrigger::Startup))
        .await;
    assert!(matches!(
        second.outcome_for("game-win64"),
        Some(TargetOutcome::UpToDate {
            build_number: 42,
            marker: Some(42)
        })
    ));
    assert_eq!(publisher.publish_count().await, 1);
}
