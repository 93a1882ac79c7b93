//! Device: a named, fixed aggregate of cells.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellSpec};
use crate::error::{BridgeError, ValidationError};
use crate::id::{CellId, DeviceName};
use crate::locale::LocalizedText;

/// Everything needed to register a device: its name, title and ordered cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub name: DeviceName,
    #[serde(default)]
    pub title: LocalizedText,
    pub cells: Vec<CellSpec>,
}

impl DeviceDescriptor {
    /// Create a builder for constructing a [`DeviceDescriptor`].
    #[must_use]
    pub fn builder() -> DeviceDescriptorBuilder {
        DeviceDescriptorBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateCell`] when two cells share an id.
    pub fn validate(&self) -> Result<(), BridgeError> {
        let mut seen = HashSet::with_capacity(self.cells.len());
        for spec in &self.cells {
            if !seen.insert(&spec.id) {
                return Err(ValidationError::DuplicateCell(spec.id.to_string()).into());
            }
        }
        Ok(())
    }
}

/// Step-by-step builder for [`DeviceDescriptor`].
#[derive(Debug, Default)]
pub struct DeviceDescriptorBuilder {
    name: Option<String>,
    title: LocalizedText,
    cells: Vec<CellSpec>,
}

impl DeviceDescriptorBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: LocalizedText) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn cell(mut self, spec: CellSpec) -> Self {
        self.cells.push(spec);
        self
    }

    /// Consume the builder, validate, and return a [`DeviceDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if the name is missing or invalid,
    /// or if a cell id repeats.
    pub fn build(self) -> Result<DeviceDescriptor, BridgeError> {
        let descriptor = DeviceDescriptor {
            name: DeviceName::new(self.name.unwrap_or_default())?,
            title: self.title,
            cells: self.cells,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

/// A registered device with live cells, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: DeviceName,
    pub title: LocalizedText,
    pub cells: Vec<Cell>,
}

impl From<DeviceDescriptor> for Device {
    fn from(descriptor: DeviceDescriptor) -> Self {
        Self {
            name: descriptor.name,
            title: descriptor.title,
            cells: descriptor.cells.into_iter().map(Cell::from).collect(),
        }
    }
}

impl Device {
    #[must_use]
    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id.as_str() == id)
    }

    pub fn cell_mut(&mut self, id: &str) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|cell| cell.id.as_str() == id)
    }

    pub fn cell_ids(&self) -> impl Iterator<Item = &CellId> {
        self.cells.iter().map(|cell| &cell.id)
    }
}
