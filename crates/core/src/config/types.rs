use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub build_api: BuildApiConfig,
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Control API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8088
}

/// Polling schedule configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Minutes between two scheduled passes.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_minutes: u64,
    /// Run a pass as soon as the scheduler starts.
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes.saturating_mul(60))
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_minutes: default_poll_interval(),
            run_on_startup: true,
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

/// Filesystem locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory holding one JSON file per watch target.
    #[serde(default = "default_targets_dir")]
    pub targets_dir: PathBuf,
    /// Where artifacts are downloaded before extraction.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// Where processed-build markers are kept.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            targets_dir: default_targets_dir(),
            download_dir: default_download_dir(),
            state_dir: default_state_dir(),
        }
    }
}

fn default_targets_dir() -> PathBuf {
    PathBuf::from("configs")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("state")
}

/// Remote build API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildApiConfig {
    /// API root, e.g. "https://build-api.cloud.unity3d.com/api/v1"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl Default for BuildApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://build-api.cloud.unity3d.com/api/v1".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

/// External publishing tool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublisherConfig {
    /// Root directory of the publishing tool.
    pub tool_dir: PathBuf,
    /// Executable, relative to `tool_dir` unless absolute.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Script template directory, relative to `tool_dir` unless absolute.
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,
}

impl PublisherConfig {
    pub fn new(tool_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool_dir: tool_dir.into(),
            executable: default_executable(),
            scripts_dir: default_scripts_dir(),
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Resolved path of the publishing executable.
    pub fn executable_path(&self) -> PathBuf {
        self.tool_dir.join(&self.executable)
    }

    /// Resolved directory holding templates and generated scripts.
    pub fn scripts_path(&self) -> PathBuf {
        self.tool_dir.join(&self.scripts_dir)
    }
}

fn default_executable() -> PathBuf {
    PathBuf::from("publish-build.sh")
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}

/// Outcome notification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Used when a target has no webhook override.
    #[serde(default)]
    pub default_webhook_url: Option<String>,
    /// Request timeout in seconds (default: 15)
    #[serde(default = "default_notifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            default_webhook_url: None,
            timeout_secs: default_notifier_timeout(),
        }
    }
}

fn default_notifier_timeout() -> u64 {
    15
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
    pub paths: PathsConfig,
    pub build_api: BuildApiConfig,
    pub publisher: PublisherConfig,
    pub notifier: SanitizedNotifierConfig,
}

/// Sanitized notifier config (webhook URL hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedNotifierConfig {
    pub default_webhook_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            scheduler: config.scheduler.clone(),
            paths: config.paths.clone(),
            build_api: config.build_api.clone(),
            publisher: config.publisher.clone(),
            notifier: SanitizedNotifierConfig {
                default_webhook_configured: config
                    .notifier
                    .default_webhook_url
                    .as_deref()
                    .is_some_and(|url| !url.is_empty()),
                timeout_secs: config.notifier.timeout_secs,
            },
        }
    }
}
