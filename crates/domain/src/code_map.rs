//! Code table: vendor event codes to canonical status values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::status::StatusValue;

/// Fixed translation table from vendor codes (e.g. Contact ID `3401`) to
/// [`StatusValue`]s.
///
/// Codes that are not listed have no mapping; that is normal operation, the
/// panel reports plenty of events that do not change a partition's status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeMap(HashMap<String, StatusValue>);

impl CodeMap {
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<StatusValue> {
        self.0.get(code).copied()
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

impl<C: Into<String>> FromIterator<(C, StatusValue)> for CodeMap {
    fn from_iter<I: IntoIterator<Item = (C, StatusValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(c, v)| (c.into(), v)).collect())
    }
}
