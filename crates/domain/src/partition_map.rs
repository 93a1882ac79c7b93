//! Partition table: panel partitions to cells of one device.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::CellId;

/// Maps partition identifiers as reported by the panel (`"01"`, `"02"`, …)
/// to the cell that mirrors them.
///
/// Adding a partition is a data change; identifiers are compared verbatim, so
/// `"1"` and `"01"` are different partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionMapping(BTreeMap<String, CellId>);

impl PartitionMapping {
    #[must_use]
    pub fn lookup(&self, partition: &str) -> Option<&CellId> {
        self.0.get(partition)
    }

    /// Every cell targeted by this table.
    pub fn cells(&self) -> impl Iterator<Item = &CellId> {
        self.0.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellId)> {
        self.0.iter().map(|(p, c)| (p.as_str(), c))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<String>> FromIterator<(P, CellId)> for PartitionMapping {
    fn from_iter<I: IntoIterator<Item = (P, CellId)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(p, c)| (p.into(), c)).collect())
    }
}
