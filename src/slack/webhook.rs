use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error, info};

use super::SlackMessage;

/// Result of one delivery attempt. There is no retry.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Rejected { status: u16 },
    TransportError(String),
}

/// Sink for built notifications.
#[async_trait]
pub trait Deliver: Send + Sync {
    /// `message_id` identifies the source message in logs only.
    async fn deliver(&self, message_id: u64, message: &SlackMessage) -> DeliveryOutcome;
}

/// Posts notifications to a Slack incoming webhook.
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Deliver for WebhookClient {
    async fn deliver(&self, message_id: u64, message: &SlackMessage) -> DeliveryOutcome {
        debug!(message_id, blocks = message.blocks.len(), "Posting notification to Slack");

        let response = match self.client.post(&self.url).json(message).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(message_id, error = %e, "Slack delivery failed");
                return DeliveryOutcome::TransportError(e.to_string());
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            info!(message_id, "Slack delivery succeeded");
            DeliveryOutcome::Delivered
        } else {
            error!(message_id, status = status.as_u16(), "Slack delivery failed");
            DeliveryOutcome::Rejected {
                status: status.as_u16(),
            }
        }
    }
}
