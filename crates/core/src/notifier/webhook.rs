//! Webhook notifier.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Delivery, Notification, Notifier, NotifyError};
use crate::config::NotifierConfig;

/// Posts `{"text": "<message>"}` to a webhook URL.
pub struct WebhookNotifier {
    client: Client,
    default_url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            default_url: config.default_webhook_url.clone(),
        })
    }

    /// URL a notification would be sent to. Empty strings count as unset.
    pub fn resolve_url<'a>(&'a self, webhook_override: Option<&'a str>) -> Option<&'a str> {
        webhook_override
            .filter(|url| !url.is_empty())
            .or_else(|| self.default_url.as_deref().filter(|url| !url.is_empty()))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        webhook_override: Option<&str>,
        notification: &Notification,
    ) -> Result<Delivery, NotifyError> {
        let Some(url) = self.resolve_url(webhook_override) else {
            debug!("No webhook configured, skipping notification");
            return Ok(Delivery::Skipped);
        };

        let body = serde_json::json!({ "text": notification.message() });
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Request {
                url: url.to_string(),
                source: e,
            })?;

        if response.status().is_success() {
            debug!(status = %response.status(), "Notification delivered");
        } else {
            warn!(status = %response.status(), "Webhook rejected notification");
        }

        Ok(Delivery::Sent)
    }
}
