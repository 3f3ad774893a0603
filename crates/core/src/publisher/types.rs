//! Publisher types.

use serde::{Deserialize, Serialize};

/// Result of one run of the publishing tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    /// True only when the tool exited with status 0.
    pub success: bool,
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured stdout followed by captured stderr.
    pub output: String,
    /// Name of the generated script handed to the tool.
    pub script_name: String,
    pub duration_ms: u64,
}

impl PublishOutcome {
    /// Detail to report for a failed run, if any output was captured.
    pub fn failure_detail(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        let trimmed = self.output.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}
