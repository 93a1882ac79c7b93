//! MQTT topic filters: scope inbound messages to one device.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A subscription filter such as `/ax-pro/partitions/#`.
///
/// Supports the MQTT wildcards: `+` matches exactly one level, `#` matches
/// the parent level and everything below it and must be the last level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicFilter(String);

impl TopicFilter {
    /// Validate and wrap a filter.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTopicFilter`] if the filter is empty
    /// or uses a wildcard anywhere but as a whole level (`#` last only).
    pub fn new(filter: impl Into<String>) -> Result<Self, ValidationError> {
        let filter = filter.into();
        if filter.is_empty() {
            return Err(ValidationError::InvalidTopicFilter(filter));
        }
        let levels: Vec<&str> = filter.split('/').collect();
        let last = levels.len() - 1;
        for (index, level) in levels.iter().enumerate() {
            let multi = level.contains('#');
            let single = level.contains('+');
            if (multi && (*level != "#" || index != last)) || (single && *level != "+") {
                return Err(ValidationError::InvalidTopicFilter(filter));
            }
        }
        Ok(Self(filter))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a concrete topic name falls under this filter.
    #[must_use]
    pub fn matches(&self, topic: &str) -> bool {
        // Wildcards never match system topics at the first level.
        if topic.starts_with('$') && (self.0.starts_with('+') || self.0.starts_with('#')) {
            return false;
        }
        let mut filter_levels = self.0.split('/');
        let mut topic_levels = topic.split('/');
        loop {
            match (filter_levels.next(), topic_levels.next()) {
                (Some("#"), _) => return true,
                (Some("+"), Some(_)) => {}
                (Some(f), Some(t)) if f == t => {}
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TopicFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TopicFilter {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TopicFilter> for String {
    fn from(value: TopicFilter) -> Self {
        value.0
    }
}
