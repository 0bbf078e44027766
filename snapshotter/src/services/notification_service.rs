use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::notifications::WEBHOOK_TIMEOUT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationChannel {
    Notifier,
    Errors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub timestamp: DateTime<Utc>,
    pub channel: NotificationChannel,
    pub severity: Severity,
    pub source: String,
    pub message: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, channel: NotificationChannel, message: &str, severity: Severity) -> Result<()>;
}

/// Send and log on failure; a notification never changes a run's outcome
pub async fn notify_best_effort(
    sink: &dyn NotificationSink,
    channel: NotificationChannel,
    message: &str,
    severity: Severity,
) {
    if let Err(e) = sink.send(channel, message, severity).await {
        warn!("Failed to send notification '{}': {}", message, e);
    }
}

/// Posts notifications as JSON to a webhook; an empty URL disables sending
#[derive(Clone)]
pub struct NotificationService {
    webhook_url: String,
    client: Client,
}

impl NotificationService {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client for notifications: {}", e))?;

        Ok(Self {
            webhook_url,
            client,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    pub fn get_webhook_url(&self) -> &str {
        &self.webhook_url
    }

    async fn send_webhook(&self, payload: &NotificationPayload) -> Result<()> {
        if !self.is_enabled() {
            debug!("No webhook URL configured, skipping notification");
            return Ok(());
        }

        match timeout(
            WEBHOOK_TIMEOUT,
            self.client.post(&self.webhook_url).json(payload).send(),
        )
        .await
        {
            Ok(Ok(response)) if response.status().is_success() => {
                info!("Notification sent: {:?} {}", payload.severity, payload.message);
                Ok(())
            }
            Ok(Ok(response)) => Err(anyhow!("webhook returned status {}", response.status())),
            Ok(Err(e)) => Err(anyhow!("webhook request failed: {}", e)),
            Err(_) => Err(anyhow!("webhook timed out")),
        }
    }
}

#[async_trait]
impl NotificationSink for NotificationService {
    async fn send(&self, channel: NotificationChannel, message: &str, severity: Severity) -> Result<()> {
        let payload = NotificationPayload {
            timestamp: Utc::now(),
            channel,
            severity,
            source: "Accounts Retrieval".to_string(),
            message: message.to_string(),
        };
        self.send_webhook(&payload).await
    }
}
