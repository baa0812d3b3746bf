//! Alerting pipeline turning FleetDM result rows into ntfy notifications.

mod builder;
pub mod classifier;
pub mod columns;
mod query_name;

pub use builder::NotificationBuilder;
pub use classifier::{priority_for, tags_for, BASE_TAG};
pub use columns::{format_columns, identifier};
pub use query_name::{QueryName, DEFAULT_CATEGORY};
