//! Directory-of-JSON target source.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{TargetError, TargetSource, WatchTarget};

/// Reads one watch target per `*.json` file in a directory.
///
/// The directory is re-read on every call, so edits take effect on the next
/// pass. A file that cannot be read or parsed is skipped with a warning.
pub struct JsonDirTargets {
    dir: PathBuf,
}

impl JsonDirTargets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load_file(path: &Path) -> Result<WatchTarget, String> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("read failed: {}", e))?;
        let mut target: WatchTarget =
            serde_json::from_str(&raw).map_err(|e| format!("parse failed: {}", e))?;
        target.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(target)
    }
}

#[async_trait]
impl TargetSource for JsonDirTargets {
    async fn load_targets(&self) -> Result<Vec<WatchTarget>, TargetError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TargetError::DirectoryNotFound {
                    path: self.dir.clone(),
                }
            } else {
                TargetError::Io {
                    path: self.dir.clone(),
                    source: e,
                }
            }
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| TargetError::Io {
            path: self.dir.clone(),
            source: e,
        })? {
            let path = entry.path();
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut targets = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::load_file(&path).await {
                Ok(target) => {
                    debug!(target = %target.name, "Loaded watch target");
                    targets.push(target);
                }
                Err(reason) => {
                    warn!("Skipping target config {}: {}", path.display(), reason);
                }
            }
        }

        Ok(targets)
    }
}
