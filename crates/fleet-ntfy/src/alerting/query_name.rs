//! Splitting FleetDM query names into a detection category and a label.

use std::sync::LazyLock;

use regex::Regex;

/// Category used when the query name carries no `[category]` tag.
pub const DEFAULT_CATEGORY: &str = "alert";

// Only ASCII whitespace separates the tag from the label.
static CATEGORY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\][\t\n\f\r ]*(.+)$").expect("category tag pattern is valid")
});

/// Detection category and human label parsed from a query name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryName<'a> {
    pub category: &'a str,
    pub short_name: &'a str,
}

impl<'a> QueryName<'a> {
    /// Parses names such as `pack/Global/[detection/persistence] Unexpected Device`.
    ///
    /// Without a bracketed tag the label is the last `/`-separated segment and
    /// the category falls back to [`DEFAULT_CATEGORY`].
    pub fn parse(full_name: &'a str) -> Self {
        if let Some(captures) = CATEGORY_TAG.captures(full_name) {
            if let (Some(category), Some(short_name)) = (captures.get(1), captures.get(2)) {
                return Self {
                    category: category.as_str(),
                    short_name: short_name.as_str(),
                };
            }
        }

        Self {
            category: DEFAULT_CATEGORY,
            short_name: full_name.rsplit('/').next().unwrap_or(full_name),
        }
    }
}
