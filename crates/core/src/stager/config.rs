//! Configuration for the stager module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the archive stager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagerConfig {
    /// Directory artifacts are downloaded into before extraction.
    pub download_dir: PathBuf,

    /// Connect timeout for artifact downloads, in seconds.
    /// The transfer itself is not time-limited.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Write buffer size for downloads in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_buffer_size() -> usize {
    1024 * 1024 // 1 MB
}

impl StagerConfig {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            connect_timeout_secs: default_connect_timeout(),
            buffer_size: default_buffer_size(),
        }
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Sets the download buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}
