//! One small text file per target.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use super::{StateError, StateStore};
use crate::target::TargetIdentity;

/// Stores each marker as a decimal number in its own file.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the marker file for `identity`.
    ///
    /// The hash makes the name collision-free; the slug only helps humans
    /// find the right file.
    pub fn record_path(&self, identity: &TargetIdentity) -> PathBuf {
        self.dir.join(record_name(identity))
    }
}

fn record_name(identity: &TargetIdentity) -> String {
    let mut hasher = Sha256::new();
    for field in [
        &identity.org_id,
        &identity.project,
        &identity.build_target,
        &identity.app_id,
        &identity.branch,
    ] {
        hasher.update(field.as_bytes());
        // unit separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update([0x1f]);
    }
    let digest = format!("{:x}", hasher.finalize());

    let slug: String = format!("{}-{}", identity.project, identity.build_target)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(48)
        .collect();

    format!("{}-{}.build", slug, &digest[..16])
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, identity: &TargetIdentity) -> Result<Option<u64>, StateError> {
        let path = self.record_path(identity);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::Read { path, source: e }),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match trimmed.parse::<u64>() {
            Ok(build) => Ok(Some(build)),
            Err(_) => {
                warn!(
                    "Ignoring unreadable marker {} (content {:?})",
                    path.display(),
                    trimmed.chars().take(32).collect::<String>()
                );
                Ok(None)
            }
        }
    }

    async fn set(&self, identity: &TargetIdentity, build_number: u64) -> Result<(), StateError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StateError::Write {
                path: self.dir.clone(),
                source: e,
            })?;

        let path = self.record_path(identity);
        let tmp = path.with_extension("build.tmp");

        fs::write(&tmp, build_number.to_string())
            .await
            .map_err(|e| StateError::Write {
                path: tmp.clone(),
                source: e,
            })?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StateError::Write { path, source: e })?;

        Ok(())
    }
}
