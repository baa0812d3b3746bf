//! Wire types for the FleetDM webhook payload and the ntfy notification.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level body of a FleetDM query-result webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WebhookPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub details: Vec<Detail>,
}

/// One differential result row reported by osquery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Detail {
    /// `added` or `removed` relative to the previous query run.
    #[serde(deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(rename = "calendarTime", deserialize_with = "null_as_default")]
    pub calendar_time: String,
    #[serde(deserialize_with = "deserialize_columns")]
    pub columns: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub counter: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub decorations: Decorations,
    #[serde(deserialize_with = "null_as_default")]
    pub epoch: i64,
    #[serde(rename = "hostIdentifier", deserialize_with = "null_as_default")]
    pub host_identifier: String,
    /// Composite query name, e.g. `pack/Global/[detection/c2] Beaconing`.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub numerics: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub query_id: i64,
    #[serde(rename = "unixTime", deserialize_with = "null_as_default")]
    pub unix_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Decorations {
    #[serde(deserialize_with = "null_as_default")]
    pub host_uuid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hostname: String,
}

impl Detail {
    /// Display name of the reporting host, preferring the decorated hostname.
    pub fn hostname(&self) -> &str {
        if self.decorations.hostname.is_empty() {
            &self.host_identifier
        } else {
            &self.decorations.hostname
        }
    }
}

/// Explicit `null` leaves a field at its zero value, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// osquery emits `null` for unset columns; treat those as empty strings.
fn deserialize_columns<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<String>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

/// ntfy message priority, serialized as its numeric level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Min = 1,
    Low = 2,
    Default = 3,
    High = 4,
    Urgent = 5,
}

impl Priority {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.as_u8()
    }
}

impl TryFrom<u8> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Min),
            2 => Ok(Self::Low),
            3 => Ok(Self::Default),
            4 => Ok(Self::High),
            5 => Ok(Self::Urgent),
            other => Err(InvalidPriority(other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("priority must be between 1 and 5, got {0}")]
pub struct InvalidPriority(pub u8);

/// JSON body accepted by ntfy's publish-as-JSON endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub topic: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub tags: Vec<String>,
}
