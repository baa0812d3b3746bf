//! Relay FleetDM query webhooks to an ntfy server.
//!
//! A [`WebhookPayload`] is turned into at most one [`Notification`] by
//! [`NotificationBuilder`], then published with [`NtfyClient`].
//!
//! ```ignore
//! use fleet_ntfy::{DeliveryConfig, NotificationBuilder, NtfyClient};
//!
//! let builder = NotificationBuilder::new("fleet-alerts");
//! let client = NtfyClient::new(DeliveryConfig::new("https://ntfy.sh"))?;
//!
//! if let Some(notification) = builder.build(&payload) {
//!     client.send(&notification).await?;
//! }
//! ```

pub mod alerting;
pub mod integration;
pub mod model;

pub use alerting::NotificationBuilder;
pub use integration::{DeliveryConfig, DeliveryError, NtfyClient};
pub use model::{Decorations, Detail, Notification, Priority, WebhookPayload};
