//! Publisher that drives a script-based command line publishing tool.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::error::PublishError;
use super::script::{render_script, script_name_for};
use super::traits::Publisher;
use super::types::PublishOutcome;
use crate::build_api::BuildDefinition;
use crate::config::PublisherConfig;
use crate::target::PublishDestination;

/// Runs the configured publishing executable once per build.
///
/// The tool is invoked as
/// `{executable} {username} {password} {app_id} {script_name} {executable_path} {use_drm}`
/// from the process working directory.
pub struct ScriptPublisher {
    config: PublisherConfig,
}

impl ScriptPublisher {
    pub fn new(config: PublisherConfig) -> Self {
        Self { config }
    }

    /// Renders the destination's template and writes the generated script.
    /// Returns the script name and its path.
    async fn write_script(
        &self,
        destination: &PublishDestination,
        build: &BuildDefinition,
    ) -> Result<(String, PathBuf), PublishError> {
        let scripts_dir = self.config.scripts_path();
        let template_path = scripts_dir.join(&destination.script_template);

        let template = match tokio::fs::read_to_string(&template_path).await {
            Ok(template) => template,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PublishError::TemplateNotFound {
                    path: template_path,
                })
            }
            Err(e) => return Err(PublishError::io(template_path, e)),
        };

        let script_name = script_name_for(&destination.script_template, build.build_number);
        let script_path = scripts_dir.join(&script_name);
        tokio::fs::write(&script_path, render_script(&template, build))
            .await
            .map_err(|e| PublishError::io(&script_path, e))?;
        debug!("Wrote publish script {}", script_path.display());

        Ok((script_name, script_path))
    }

    async fn run_tool(
        &self,
        executable: &Path,
        destination: &PublishDestination,
        script_name: &str,
    ) -> Result<std::process::Output, PublishError> {
        let staged_executable = std::path::absolute(&destination.executable_path)
            .map_err(|e| PublishError::io(&destination.executable_path, e))?;

        Command::new(executable)
            .arg(&destination.username)
            .arg(&destination.password)
            .arg(&destination.app_id)
            .arg(script_name)
            .arg(&staged_executable)
            .arg(if destination.use_drm { "true" } else { "false" })
            .output()
            .await
            .map_err(|e| PublishError::Spawn {
                path: executable.to_path_buf(),
                source: e,
            })
    }
}

#[async_trait]
impl Publisher for ScriptPublisher {
    fn name(&self) -> &str {
        "script"
    }

    async fn publish(
        &self,
        destination: &PublishDestination,
        build: &BuildDefinition,
    ) -> Result<PublishOutcome, PublishError> {
        let executable = self.config.executable_path();
        if !tokio::fs::try_exists(&executable).await.unwrap_or(false) {
            return Err(PublishError::ExecutableNotFound { path: executable });
        }

        let (script_name, script_path) = self.write_script(destination, build).await?;

        info!(
            app_id = %destination.app_id,
            script = %script_name,
            "Invoking publishing tool for {}",
            build
        );
        let start = Instant::now();
        let result = self.run_tool(&executable, destination, &script_name).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if let Err(e) = tokio::fs::remove_file(&script_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove publish script {}: {}", script_path.display(), e);
            }
        }

        let output = result?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let outcome = PublishOutcome {
            success: output.status.success(),
            exit_code: output.status.code(),
            output: format!("{}{}", stdout, stderr),
            script_name,
            duration_ms,
        };

        if !stdout.trim().is_empty() {
            debug!("Publishing tool output:\n{}", stdout.trim_end());
        }
        if outcome.success {
            info!(duration_ms, "Publishing tool finished successfully");
        } else {
            if !stderr.trim().is_empty() {
                error!("Publishing tool error output:\n{}", stderr.trim_end());
            }
            error!(
                exit_code = ?outcome.exit_code,
                duration_ms,
                "Publishing tool failed"
            );
        }

        Ok(outcome)
    }
}
