//! Assembling one ntfy notification from a batch of FleetDM result rows.

use std::collections::HashMap;
use std::fmt::Write;

use tracing::debug;

use super::classifier::{priority_for, tags_for};
use super::columns::{format_columns, identifier};
use super::query_name::QueryName;
use crate::model::{Detail, Notification, WebhookPayload};

/// Rendered sections, in output order, with their heading symbol.
const SECTIONS: &[(&str, &str)] = &[("removed", "−"), ("added", "+")];

/// Turns webhook payloads into notifications for a fixed ntfy topic.
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    topic: String,
}

impl NotificationBuilder {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    /// Builds one notification for the whole batch, or `None` when the payload
    /// carries no details.
    ///
    /// The header (host, detection, time) comes from the first detail only;
    /// FleetDM sends one webhook per query, so all rows share it.
    pub fn build(&self, payload: &WebhookPayload) -> Option<Notification> {
        let first = payload.details.first()?;

        let hostname = first.hostname();
        let query = QueryName::parse(&first.name);

        let mut message = String::new();
        let _ = write!(
            message,
            "Host: {hostname}\nDetection: {}\nTime: {}\n\n",
            query.category, first.calendar_time
        );

        let grouped = group_by_action(&payload.details);
        for &(action, symbol) in SECTIONS {
            let Some(details) = grouped.get(action) else {
                continue;
            };

            let _ = writeln!(message, "[{symbol} {action}]");
            for detail in details {
                let id = identifier(&detail.columns);
                if !id.is_empty() {
                    let _ = writeln!(message, "• {id}");
                }
                message.push_str(&format_columns(&detail.columns));
                message.push('\n');
            }
        }

        let dropped: usize = grouped
            .iter()
            .filter(|(action, _)| !SECTIONS.iter().any(|(known, _)| known == *action))
            .map(|(_, details)| details.len())
            .sum();
        if dropped > 0 {
            debug!(dropped, "skipping details with unhandled actions");
        }

        Some(Notification {
            topic: self.topic.clone(),
            title: format!("{} - {hostname}", query.short_name),
            message: message.trim().to_string(),
            priority: priority_for(query.category),
            tags: tags_for(query.category),
        })
    }
}

/// Groups details by action, keeping input order within each group.
fn group_by_action(details: &[Detail]) -> HashMap<&str, Vec<&Detail>> {
    let mut grouped: HashMap<&str, Vec<&Detail>> = HashMap::new();
    for detail in details {
        grouped.entry(detail.action.as_str()).or_default().push(detail);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::{Decorations, Priority};
    use pretty_assertions::assert_eq;

    const PERSISTENCE_QUERY: &str = "pack/Global/[detection/persistence] Unexpected Device Linux";

    fn detail(action: &str, name: &str, columns: &[(&str, &str)]) -> Detail {
        Detail {
            action: action.to_string(),
            calendar_time: "Mon Jan  1 00:00:00 2024 UTC".to_string(),
            columns: columns
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect::<BTreeMap<_, _>>(),
            decorations: Decorations {
                host_uuid: "uuid-1".to_string(),
                hostname: "host1".to_string(),
            },
            host_identifier: "host1.local".to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn payload(details: Vec<Detail>) -> WebhookPayload {
        WebhookPayload {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            details,
        }
    }

    #[test]
    fn test_empty_payload_builds_nothing() {
        let builder = NotificationBuilder::new("fleet-alerts");
        assert!(builder.build(&payload(Vec::new())).is_none());
    }

    #[test]
    fn test_single_added_detail() {
        let builder = NotificationBuilder::new("fleet-alerts");
        let notification = builder
            .build(&payload(vec![detail(
                "added",
                PERSISTENCE_QUERY,
                &[("path", "/tmp/x")],
            )]))
            .unwrap();

        assert_eq!(notification.topic, "fleet-alerts");
        assert_eq!(notification.title, "Unexpected Device Linux - host1");
        assert_eq!(notification.priority, Priority::High);
        assert_eq!(notification.tags, ["computer", "warning", "anchor"]);
        assert_eq!(
            notification.message,
            "Host: host1\n\
             Detection: detection/persistence\n\
             Time: Mon Jan  1 00:00:00 2024 UTC\n\
             \n\
             [+ added]\n\
             • /tmp/x\n  \
             path: /tmp/x"
        );
    }

    #[test]
    fn test_removed_section_precedes_added() {
        let builder = NotificationBuilder::new("fleet-alerts");
        let notification = builder
            .build(&payload(vec![
                detail("added", PERSISTENCE_QUERY, &[("path", "/tmp/new")]),
                detail("removed", PERSISTENCE_QUERY, &[("path", "/tmp/old")]),
                detail("added", PERSISTENCE_QUERY, &[("path", "/tmp/newer")]),
            ]))
            .unwrap();

        assert_eq!(
            notification.message,
            "Host: host1\n\
             Detection: detection/persistence\n\
             Time: Mon Jan  1 00:00:00 2024 UTC\n\
             \n\
             [− removed]\n\
             • /tmp/old\n  \
             path: /tmp/old\n\
             \n\
             [+ added]\n\
             • /tmp/new\n  \
             path: /tmp/new\n\
             \n\
             • /tmp/newer\n  \
             path: /tmp/newer"
        );
    }

    #[test]
    fn test_hostname_falls_back_to_identifier() {
        let mut row = detail("added", "pack/Global/usb_devices", &[]);
        row.decorations.hostname.clear();

        let notification = NotificationBuilder::new("t")
            .build(&payload(vec![row]))
            .unwrap();

        assert_eq!(notification.title, "usb_devices - host1.local");
        assert_eq!(notification.priority, Priority::Default);
        assert_eq!(notification.tags, ["computer", "mag"]);
        assert!(notification.message.starts_with("Host: host1.local\nDetection: alert\n"));
        assert!(notification.message.ends_with("[+ added]"));
    }

    #[test]
    fn test_detail_without_identifier_has_no_bullet() {
        let notification = NotificationBuilder::new("t")
            .build(&payload(vec![detail(
                "removed",
                "[c2] Beacon",
                &[("remote_address", "10.0.0.9"), ("remote_port", "443")],
            )]))
            .unwrap();

        assert!(!notification.message.contains('•'));
        assert!(notification
            .message
            .ends_with("[− removed]\n  remote_address: 10.0.0.9\n  remote_port: 443"));
        assert_eq!(notification.priority, Priority::Urgent);
    }

    #[test]
    fn test_unhandled_actions_are_not_rendered() {
        let notification = NotificationBuilder::new("t")
            .build(&payload(vec![
                detail("snapshot", PERSISTENCE_QUERY, &[("path", "/tmp/snap")]),
                detail("added", PERSISTENCE_QUERY, &[("path", "/tmp/x")]),
            ]))
            .unwrap();

        assert!(!notification.message.contains("/tmp/snap"));
        assert!(notification.message.contains("[+ added]\n• /tmp/x"));
    }

    #[test]
    fn test_header_uses_first_detail_even_if_unhandled() {
        let mut first = detail("snapshot", "[execution] Shell", &[]);
        first.decorations.hostname = "other".to_string();

        let notification = NotificationBuilder::new("t")
            .build(&payload(vec![
                first,
                detail("added", PERSISTENCE_QUERY, &[("path", "/tmp/x")]),
            ]))
            .unwrap();

        assert_eq!(notification.title, "Shell - other");
        assert_eq!(notification.priority, Priority::Urgent);
    }
}
