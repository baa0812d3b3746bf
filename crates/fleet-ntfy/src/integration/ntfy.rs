use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::{DeliveryConfig, DeliveryError};
use crate::model::Notification;

/// Publishes notifications to an ntfy server.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct NtfyClient {
    http: reqwest::Client,
    url: String,
}

impl NtfyClient {
    pub fn new(config: DeliveryConfig) -> Result<Self, DeliveryError> {
        let url = config.url.trim();
        if url.is_empty() {
            return Err(DeliveryError::Config("ntfy URL must not be empty".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            url: url.to_string(),
        })
    }

    /// Sends one notification, failing on transport errors and on any
    /// status of 400 or above.
    pub async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(notification)?;

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        debug!(status = status.as_u16(), topic = %notification.topic, "ntfy accepted notification");
        Ok(())
    }
}
