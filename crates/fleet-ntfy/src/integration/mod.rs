//! Integration layer for the downstream ntfy server.
//!
//! Notifications are published through ntfy's JSON endpoint: a single POST of
//! the serialized [`Notification`](crate::model::Notification) to the server's
//! base URL. Any status below 400 counts as delivered. Nothing is retried;
//! FleetDM owns redelivery.

mod ntfy;

use std::time::Duration;

pub use ntfy::NtfyClient;

/// Default public ntfy server.
pub const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";

/// Configuration for the delivery client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Base URL notifications are POSTed to
    pub url: String,
    /// Overall request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NTFY_URL)
    }
}

impl DeliveryConfig {
    /// Create configuration for the given ntfy base URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
        }
    }

    /// Set an overall request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Error type for notification delivery
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Notification could not be encoded
    #[error("failed to marshal notification: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Transport failure before a response arrived
    #[error("failed to send to ntfy: {0}")]
    Http(#[from] reqwest::Error),

    /// ntfy answered with a client or server error
    #[error("ntfy returned error {status}: {body}")]
    Rejected {
        /// HTTP status code returned by ntfy
        status: u16,
        /// Response body, empty if it could not be read
        body: String,
    },

    /// Client configuration error
    #[error("delivery configuration error: {0}")]
    Config(String),
}
