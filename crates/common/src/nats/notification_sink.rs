use crate::domain::{Notification, NotificationSink};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument};

/// Publishes notification records as JSON on a core NATS subject
pub struct NatsNotificationSink {
    client: async_nats::Client,
    subject: String,
}

impl NatsNotificationSink {
    pub fn new(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }
}

/// Wire form of a notification record
pub fn encode_notification(notification: &Notification) -> Result<Bytes> {
    let payload =
        serde_json::to_vec(notification).context("Failed to serialize notification")?;
    Ok(Bytes::from(payload))
}

#[async_trait]
impl NotificationSink for NatsNotificationSink {
    #[instrument(skip(self, notification), fields(subject = %self.subject, slug = %notification.slug))]
    async fn send(&self, notification: Notification) -> Result<()> {
        let payload = encode_notification(&notification)?;

        self.client
            .publish(self.subject.clone(), payload)
            .await
            .context("Failed to publish notification to NATS")?;

        debug!("published notification");
        Ok(())
    }
}
