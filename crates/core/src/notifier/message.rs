//! Notification message formatting.

use serde::{Deserialize, Serialize};

/// Publish result to report to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub display_name: String,
    pub build_number: u64,
    /// Publishing branch ("default" when the target has none).
    pub branch: String,
    pub status: NotificationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationStatus {
    Published,
    Failed { detail: Option<String> },
}

impl Notification {
    pub fn published(
        display_name: impl Into<String>,
        build_number: u64,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            build_number,
            branch: branch.into(),
            status: NotificationStatus::Published,
        }
    }

    pub fn failed(
        display_name: impl Into<String>,
        build_number: u64,
        branch: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            build_number,
            branch: branch.into(),
            status: NotificationStatus::Failed { detail },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, NotificationStatus::Published)
    }

    /// The one-sentence message posted to the webhook.
    pub fn message(&self) -> String {
        let build = format_build_number(self.build_number);
        match &self.status {
            NotificationStatus::Published => format!(
                "{} build {} has been published to the {} branch.",
                self.display_name, build, self.branch
            ),
            NotificationStatus::Failed { detail } => {
                let detail = detail
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .unwrap_or("Unknown error");
                format!(
                    "Failed to publish {} build {} to the {} branch: {}",
                    self.display_name, build, self.branch, detail
                )
            }
        }
    }
}

/// Formats a build number with thousands separators (`12345` -> `12,345`).
pub fn format_build_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
