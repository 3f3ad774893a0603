pub mod build_api;
pub mod config;
pub mod notifier;
pub mod orchestrator;
pub mod publisher;
pub mod stager;
pub mod state;
pub mod target;
pub mod testing;

pub use build_api::{BuildApiError, BuildDefinition, BuildSource, CloudBuildClient};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use notifier::{Delivery, Notification, Notifier, NotifyError, WebhookNotifier};
pub use orchestrator::{
    BuildSyncScheduler, PassContext, PassReport, PassTrigger, RescanRequest, SchedulerStatus,
    SyncError, SyncOrchestrator, TargetOutcome, TargetReport,
};
pub use publisher::{PublishError, PublishOutcome, Publisher, ScriptPublisher};
pub use stager::{ArchiveStager, StageOutcome, Stager, StagerConfig, StagingError};
pub use state::{FileStateStore, StateError, StateStore};
pub use target::{JsonDirTargets, TargetError, TargetSource, TargetIdentity, WatchTarget};
