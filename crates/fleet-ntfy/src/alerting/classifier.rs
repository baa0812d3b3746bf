//! Detection category to ntfy priority and tags.
//!
//! Both tables are ordered substring rules evaluated top to bottom against the
//! lower-cased category; the first rule whose needle occurs wins. The two
//! tables deliberately cover different needles.

use crate::model::Priority;

/// Tag prepended to every notification.
pub const BASE_TAG: &str = "computer";

const PRIORITY_RULES: &[(&str, Priority)] = &[
    ("c2", Priority::Urgent),
    ("execution", Priority::Urgent),
    ("credential", Priority::High),
    ("persistence", Priority::High),
    ("privilege", Priority::High),
    ("defense", Priority::High),
    ("exfil", Priority::Urgent),
    ("lateral", Priority::High),
];

const TAG_RULES: &[(&str, &[&str])] = &[
    ("c2", &["warning", "satellite"]),
    ("execution", &["warning", "zap"]),
    ("persistence", &["warning", "anchor"]),
    ("credential", &["warning", "key"]),
    ("privilege", &["warning", "crown"]),
    ("exfil", &["rotating_light", "outbox_tray"]),
    ("network", &["globe_with_meridians"]),
];

const FALLBACK_TAGS: &[&str] = &["mag"];

fn first_match<T: Copy>(rules: &[(&str, T)], category: &str) -> Option<T> {
    let category = category.to_lowercase();
    rules
        .iter()
        .find(|(needle, _)| category.contains(needle))
        .map(|(_, value)| *value)
}

/// Priority for a detection category, [`Priority::Default`] when nothing matches.
pub fn priority_for(category: &str) -> Priority {
    first_match(PRIORITY_RULES, category).unwrap_or(Priority::Default)
}

/// Tags for a detection category, always starting with [`BASE_TAG`].
pub fn tags_for(category: &str) -> Vec<String> {
    let specific = first_match(TAG_RULES, category).unwrap_or(FALLBACK_TAGS);

    std::iter::once(BASE_TAG)
        .chain(specific.iter().copied())
        .map(str::to_string)
        .collect()
}
