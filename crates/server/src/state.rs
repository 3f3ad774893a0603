use std::sync::Arc;
use buildsync_core::{BuildSyncScheduler, Config, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    scheduler: Arc<BuildSyncScheduler>,
}

impl AppState {
    pub fn new(config: Config, scheduler: Arc<BuildSyncScheduler>) -> Self {
        Self { config, scheduler }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn scheduler(&self) -> &BuildSyncScheduler {
        self.scheduler.as_ref()
    }
}
