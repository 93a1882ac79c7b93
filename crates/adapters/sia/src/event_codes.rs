//! Contact ID event descriptions, keyed by the four-digit code (`1401`).
//!
//! The table is loaded from a JSON array of `{"cid_code", "description"}`
//! entries; extra fields in an entry are ignored.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::EventCodesError;

/// Human-readable description per Contact ID code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct EventCodes(HashMap<String, String>);

#[derive(Deserialize)]
struct Entry {
    cid_code: String,
    description: String,
}

impl EventCodes {
    /// Parse the JSON list format.
    ///
    /// # Errors
    ///
    /// Returns [`EventCodesError::Parse`] if `json` is not a list of entries.
    pub fn from_json(json: &str) -> Result<Self, EventCodesError> {
        let entries: Vec<Entry> = serde_json::from_str(json)?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.cid_code, entry.description))
            .collect())
    }

    /// Read and parse a JSON list file.
    ///
    /// # Errors
    ///
    /// Returns [`EventCodesError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, EventCodesError> {
        let json = std::fs::read_to_string(path).map_err(|source| EventCodesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn description(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    /// Add `other`'s entries, replacing descriptions for codes already present.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C: Into<String>, D: Into<String>> FromIterator<(C, D)> for EventCodes {
    fn from_iter<T: IntoIterator<Item = (C, D)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(code, description)| (code.into(), description.into()))
                .collect(),
        )
    }
}
