use super::{types::Config, ConfigError};

/// One year.
pub const MAX_POLL_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Validate configuration
/// Currently validates:
/// - Publisher section exists (enforced by serde)
/// - Poll interval is between 1 minute and one year
/// - Server port, API base URL and publisher tool dir are set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.scheduler.poll_interval_minutes == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.poll_interval_minutes cannot be 0".to_string(),
        ));
    }

    if config.scheduler.poll_interval_minutes > MAX_POLL_INTERVAL_MINUTES {
        return Err(ConfigError::ValidationError(format!(
            "scheduler.poll_interval_minutes cannot exceed {} (one year), got {}",
            MAX_POLL_INTERVAL_MINUTES, config.scheduler.poll_interval_minutes
        )));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let base_url = config.build_api.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "build_api.base_url must be an http(s) URL, got {:?}",
            config.build_api.base_url
        )));
    }

    if config.publisher.tool_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "publisher.tool_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
