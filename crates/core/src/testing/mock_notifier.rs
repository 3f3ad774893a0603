//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notifier::{Delivery, Notification, Notifier, NotifyError};

/// A notification that would have been posted.
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub url: String,
    pub notification: Notification,
    pub message: String,
}

/// Mock implementation of the Notifier trait.
///
/// Resolves the webhook URL like the real notifier (override first, then
/// the default, empty strings ignored) and records what would be sent.
#[derive(Debug, Default)]
pub struct MockNotifier {
    default_url: Option<String>,
    sent: Arc<RwLock<Vec<SentNotification>>>,
    skipped: Arc<RwLock<usize>>,
    fail: Arc<RwLock<bool>>,
}

impl MockNotifier {
    /// A notifier with no default webhook.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_url(url: &str) -> Self {
        Self {
            default_url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.read().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }

    pub async fn skipped_count(&self) -> usize {
        *self.skipped.read().await
    }

    /// Make deliveries fail after being recorded.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(
        &self,
        webhook_override: Option<&str>,
        notification: &Notification,
    ) -> Result<Delivery, NotifyError> {
        let url = webhook_override
            .filter(|url| !url.is_empty())
            .or_else(|| self.default_url.as_deref().filter(|url| !url.is_empty()));
        let Some(url) = url else {
            *self.skipped.write().await += 1;
            return Ok(Delivery::Skipped);
        };

        self.sent.write().await.push(SentNotification {
            url: url.to_string(),
            notification: notification.clone(),
            message: notification.message(),
        });

        if *self.fail.read().await {
            return Err(NotifyError::Client("mock delivery failure".to_string()));
        }
        Ok(Delivery::Sent)
    }
}
