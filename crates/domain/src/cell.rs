//! Cell: a single addressable status holder inside a virtual device.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::id::CellId;
use crate::locale::LocalizedText;
use crate::status::{StatusLabels, StatusValue};

/// Declaration of a cell, as given at device registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSpec {
    pub id: CellId,
    #[serde(default)]
    pub title: LocalizedText,
    /// Labels shown for each status value; built-in labels when omitted.
    #[serde(default)]
    pub labels: StatusLabels,
}

impl CellSpec {
    #[must_use]
    pub fn new(id: CellId, title: LocalizedText) -> Self {
        Self {
            id,
            title,
            labels: StatusLabels::default(),
        }
    }

    #[must_use]
    pub fn with_labels(mut self, labels: StatusLabels) -> Self {
        self.labels = labels;
        self
    }
}

/// Live cell state.
///
/// Created from a [`CellSpec`] with [`StatusValue::Unknown`]; only the device
/// model mutates `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub id: CellId,
    pub title: LocalizedText,
    pub labels: Arc<StatusLabels>,
    pub value: StatusValue,
}

impl From<CellSpec> for Cell {
    fn from(spec: CellSpec) -> Self {
        Self {
            id: spec.id,
            title: spec.title,
            labels: Arc::new(spec.labels),
            value: StatusValue::default(),
        }
    }
}

impl Cell {
    /// Display label of the current value.
    #[must_use]
    pub fn value_label(&self, locale: &str) -> &str {
        self.labels.label(self.value, locale)
    }
}
