//! Rendering osquery result columns as indented `key: value` lines.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

/// Fields an analyst usually wants first, in display order.
pub const PRIORITY_FIELDS: &[&str] = &[
    "path",
    "name",
    "cmdline",
    "command",
    "cmd",
    "parent_path",
    "parent_cmd",
    "user",
    "uid",
    "gid",
    "local_address",
    "local_port",
    "remote_address",
    "remote_port",
    "sha256",
    "state",
];

/// Columns dropped from the trailing section regardless of value.
pub const NOISY_FIELDS: &[&str] = &["exception_key", "numerics"];

/// Columns tried, in order, for the bullet line naming a result row.
pub const IDENTIFIER_FIELDS: &[&str] = &["path", "name", "filename", "cmdline", "command"];

/// Empty and `"0"` values carry no signal.
fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// Formats columns as `  key: value\n` lines.
///
/// Priority fields come first in [`PRIORITY_FIELDS`] order, then every other
/// column in key order, minus [`NOISY_FIELDS`]. Blank values are skipped.
pub fn format_columns(columns: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    if columns.is_empty() {
        return out;
    }

    let mut emitted = HashSet::new();
    for &key in PRIORITY_FIELDS {
        if let Some(value) = columns.get(key).filter(|value| !is_blank(value)) {
            let _ = writeln!(out, "  {key}: {value}");
            emitted.insert(key);
        }
    }

    for (key, value) in columns {
        if emitted.contains(key.as_str()) || is_blank(value) {
            continue;
        }
        if NOISY_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let _ = writeln!(out, "  {key}: {value}");
    }

    out
}

/// First non-empty identifying column, or `""` when none is present.
pub fn identifier(columns: &BTreeMap<String, String>) -> &str {
    IDENTIFIER_FIELDS
        .iter()
        .filter_map(|field| columns.get(*field))
        .find(|value| !value.is_empty())
        .map_or("", String::as_str)
}
