//! Outcome notifications.
//!
//! After every publish attempt one short message is posted to a webhook.
//! Notification is best effort: no webhook configured means nothing is sent,
//! and delivery errors are reported to the caller but never retried.

mod message;
mod webhook;

pub use message::{format_build_number, Notification, NotificationStatus};
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The webhook request could not be completed.
    #[error("Webhook request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Whether a notification went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No webhook URL was configured for the target.
    Skipped,
}

/// Delivers publish notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `notification`, preferring `webhook_override` over any default
    /// endpoint.
    async fn notify(
        &self,
        webhook_override: Option<&str>,
        notification: &Notification,
    ) -> Result<Delivery, NotifyError>;
}
