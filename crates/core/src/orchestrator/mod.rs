//! Sync orchestrator and scheduler.
//!
//! The orchestrator drives every watch target through one sequence per pass:
//! - **Fetch**: ask the build source for the latest successful build
//! - **Novelty**: compare against the processed marker, stop if not newer
//! - **Stage**: download and unpack into the content directory
//! - **Claim**: advance the marker (the build is never reconsidered)
//! - **Publish + notify**: run the publishing tool and report the result
//!
//! The scheduler runs passes one at a time, on a timer and on request.

mod runner;
mod scheduler;
mod types;

pub use runner::SyncOrchestrator;
pub use scheduler::{BuildSyncScheduler, RescanRequest, SchedulerStatus};
pub use types::{PassContext, PassReport, PassTrigger, SyncError, TargetOutcome, TargetReport};
