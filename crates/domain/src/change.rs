//! Change records handed to rule handlers.

use serde::Serialize;

use crate::id::CellRef;
use crate::status::StatusValue;
use crate::time::Timestamp;

/// An accepted value change of one cell.
///
/// Only ever built for `old != new`; equal writes produce no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellChange {
    pub cell: CellRef,
    pub old: StatusValue,
    pub new: StatusValue,
    pub at: Timestamp,
}

impl CellChange {
    #[must_use]
    pub fn new(cell: CellRef, old: StatusValue, new: StatusValue, at: Timestamp) -> Self {
        Self { cell, old, new, at }
    }
}
