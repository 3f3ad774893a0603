//! Pass scheduling.
//!
//! A single background task owns the timer and the manual rescan queue and
//! runs every pass inline, so two passes can never overlap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::runner::SyncOrchestrator;
use super::types::{PassContext, PassReport, PassTrigger};
use crate::config::SchedulerConfig;

// Roughly 30 years.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Result of a manual rescan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescanRequest {
    /// A pass will start as soon as the current one (if any) finishes.
    Queued,
    /// A rescan was already waiting; the requests were merged.
    AlreadyQueued,
    NotRunning,
}

/// Snapshot of the scheduler for the control API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub pass_in_progress: bool,
    pub passes_completed: u64,
    pub poll_interval_secs: u64,
    pub next_pass_at: Option<DateTime<Utc>>,
    pub last_report: Option<PassReport>,
}

#[derive(Debug, Default)]
struct SharedState {
    pass_in_progress: bool,
    passes_completed: u64,
    next_pass_at: Option<DateTime<Utc>>,
    last_report: Option<PassReport>,
}

/// Runs sync passes on a fixed interval and on demand.
pub struct BuildSyncScheduler {
    orchestrator: Arc<SyncOrchestrator>,
    interval: Duration,
    run_on_startup: bool,

    running: Arc<AtomicBool>,
    shared: Arc<RwLock<SharedState>>,
    shutdown_tx: broadcast::Sender<()>,
    rescan_tx: mpsc::Sender<()>,
    rescan_rx: Mutex<Option<mpsc::Receiver<()>>>,
    passes_tx: watch::Sender<u64>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BuildSyncScheduler {
    pub fn new(orchestrator: Arc<SyncOrchestrator>, config: &SchedulerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        // Capacity 1: at most one rescan waits behind the current pass.
        let (rescan_tx, rescan_rx) = mpsc::channel(1);
        let (passes_tx, _) = watch::channel(0);

        Self {
            orchestrator,
            interval: config.interval(),
            run_on_startup: config.run_on_startup,
            running: Arc::new(AtomicBool::new(false)),
            shared: Arc::new(RwLock::new(SharedState::default())),
            shutdown_tx,
            rescan_tx,
            rescan_rx: Mutex::new(Some(rescan_rx)),
            passes_tx,
            handle: Mutex::new(None),
        }
    }

    /// Overrides the poll interval from the config.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start the scheduler loop. A scheduler can only be started once.
    pub fn start(&self) {
        let rescan_rx = match self.rescan_rx.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        let Some(rescan_rx) = rescan_rx else {
            warn!("Scheduler already started");
            return;
        };

        self.running.store(true, Ordering::SeqCst);
        info!(
            interval_secs = self.interval.as_secs(),
            run_on_startup = self.run_on_startup,
            "Starting build sync scheduler"
        );

        let worker = SchedulerLoop {
            orchestrator: Arc::clone(&self.orchestrator),
            interval: self.interval,
            shared: Arc::clone(&self.shared),
            passes_tx: self.passes_tx.clone(),
            next_pass_id: 1,
        };
        let run_on_startup = self.run_on_startup;
        let shutdown_rx = self.shutdown_tx.subscribe();
        let running = Arc::clone(&self.running);

        let handle = tokio::spawn(async move {
            worker.run(run_on_startup, shutdown_rx, rescan_rx).await;
            running.store(false, Ordering::SeqCst);
        });

        if let Ok(mut guard) = self.handle.lock() {
            *guard = Some(handle);
        }
    }

    /// Ask for an extra pass. Goes through the same queue as every other
    /// pass, so it never overlaps a pass already in progress.
    pub fn request_rescan(&self) -> RescanRequest {
        if !self.is_running() {
            return RescanRequest::NotRunning;
        }
        match self.rescan_tx.try_send(()) {
            Ok(()) => {
                info!("Manual rescan queued");
                RescanRequest::Queued
            }
            Err(mpsc::error::TrySendError::Full(())) => {
                debug!("Manual rescan already queued");
                RescanRequest::AlreadyQueued
            }
            Err(mpsc::error::TrySendError::Closed(())) => RescanRequest::NotRunning,
        }
    }

    /// Stop the scheduler. A pass in progress is allowed to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("Scheduler not running");
        }

        info!("Stopping build sync scheduler");
        let _ = self.shutdown_tx.send(());

        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Scheduler task ended abnormally: {}", e);
            }
        }

        info!("Build sync scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> SchedulerStatus {
        let shared = self.shared.read().await;
        SchedulerStatus {
            running: self.is_running(),
            pass_in_progress: shared.pass_in_progress,
            passes_completed: shared.passes_completed,
            poll_interval_secs: self.interval.as_secs(),
            next_pass_at: shared.next_pass_at,
            last_report: shared.last_report.clone(),
        }
    }

    pub async fn last_report(&self) -> Option<PassReport> {
        self.shared.read().await.last_report.clone()
    }

    pub async fn next_pass_at(&self) -> Option<DateTime<Utc>> {
        self.shared.read().await.next_pass_at
    }

    /// Watch the number of completed passes.
    pub fn subscribe_passes(&self) -> watch::Receiver<u64> {
        self.passes_tx.subscribe()
    }
}

struct SchedulerLoop {
    orchestrator: Arc<SyncOrchestrator>,
    interval: Duration,
    shared: Arc<RwLock<SharedState>>,
    passes_tx: watch::Sender<u64>,
    next_pass_id: u64,
}

impl SchedulerLoop {
    async fn run(
        mut self,
        run_on_startup: bool,
        mut shutdown_rx: broadcast::Receiver<()>,
        mut rescan_rx: mpsc::Receiver<()>,
    ) {
        info!("Scheduler loop started");

        if run_on_startup {
            self.run_pass(PassTrigger::Startup).await;
        }
        let mut deadline = self.schedule_next().await;

        loop {
            let trigger = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Scheduler loop received shutdown signal");
                    break;
                }
                request = rescan_rx.recv() => match request {
                    Some(()) => PassTrigger::Manual,
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline) => PassTrigger::Scheduled,
            };

            self.run_pass(trigger).await;
            deadline = self.schedule_next().await;
        }

        self.shared.write().await.next_pass_at = None;
        info!("Scheduler loop stopped");
    }

    async fn run_pass(&mut self, trigger: PassTrigger) {
        let ctx = PassContext::new(self.next_pass_id, trigger);
        self.next_pass_id += 1;

        self.shared.write().await.pass_in_progress = true;
        let report = self.orchestrator.run_pass(&ctx).await;

        let mut shared = self.shared.write().await;
        shared.pass_in_progress = false;
        shared.passes_completed += 1;
        shared.last_report = Some(report);
        self.passes_tx.send_replace(shared.passes_completed);
    }

    /// Resets the timer to a full interval from now. An interval too large
    /// to represent leaves only manual rescans.
    async fn schedule_next(&self) -> Instant {
        let next_at = chrono::Duration::from_std(self.interval)
            .ok()
            .and_then(|interval| Utc::now().checked_add_signed(interval));
        match next_at {
            Some(at) => info!("Next scheduled pass at {}", at.to_rfc3339()),
            None => warn!(
                interval_secs = self.interval.as_secs(),
                "Poll interval out of range, no scheduled passes"
            ),
        }
        self.shared.write().await.next_pass_at = next_at;

        let now = Instant::now();
        now.checked_add(self.interval)
            .unwrap_or_else(|| now + FAR_FUTURE)
    }
}
