//! Virtual device model: the in-memory store of devices and their cells.
//!
//! The store owns the one rule every other component relies on: a write
//! always replaces the stored value, but the [`ChangeListener`] hears about it
//! only when the value actually changed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axbridge_domain::change::CellChange;
use axbridge_domain::device::{Device, DeviceDescriptor};
use axbridge_domain::error::{BridgeError, NotFoundError};
use axbridge_domain::id::{CellId, CellRef, DeviceName};
use axbridge_domain::status::StatusValue;
use axbridge_domain::time::now;

use crate::ports::ChangeListener;

/// Returned by [`VirtualDeviceModel::register_device`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    pub name: DeviceName,
    pub cells: Vec<CellId>,
}

impl DeviceHandle {
    /// Full reference to one of this device's cells.
    #[must_use]
    pub fn cell_ref(&self, cell: &str) -> Option<CellRef> {
        self.cells
            .iter()
            .find(|id| id.as_str() == cell)
            .map(|id| CellRef::new(self.name.clone(), id.clone()))
    }
}

/// Device/cell store with equality-gated change notification.
pub struct VirtualDeviceModel<L> {
    devices: Mutex<HashMap<DeviceName, Device>>,
    listener: L,
}

impl<L: ChangeListener> VirtualDeviceModel<L> {
    /// Create an empty model that reports changes to `listener`.
    pub fn new(listener: L) -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
            listener,
        }
    }

    /// Register a device, replacing any previous device with the same name.
    ///
    /// All cells start at [`StatusValue::Unknown`]. Replacing a device
    /// discards its previous cells and their values; no change notification
    /// is emitted for the reset.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Validation`] if the descriptor is invalid.
    #[tracing::instrument(skip(self, descriptor), fields(device = %descriptor.name))]
    pub fn register_device(&self, descriptor: DeviceDescriptor) -> Result<DeviceHandle, BridgeError> {
        descriptor.validate()?;
        let device = Device::from(descriptor);
        let handle = DeviceHandle {
            name: device.name.clone(),
            cells: device.cell_ids().cloned().collect(),
        };
        let previous = self.lock_devices().insert(device.name.clone(), device);
        if previous.is_some() {
            tracing::info!(cells = handle.cells.len(), "device re-registered, cells reset");
        } else {
            tracing::debug!(cells = handle.cells.len(), "device registered");
        }
        Ok(handle)
    }

    /// Current value of a cell.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] if the device or cell does not exist.
    pub fn read_cell(&self, device: &str, cell: &str) -> Result<StatusValue, BridgeError> {
        let devices = self.lock_devices();
        let device = find_device(&devices, device)?;
        device
            .cell(cell)
            .map(|c| c.value)
            .ok_or_else(|| cell_not_found(device.name.as_str(), cell).into())
    }

    /// Store `value` in a cell and return the value it replaced.
    ///
    /// The store is always updated. The listener is called, after the store
    /// lock is released, if and only if the previous value differs.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] if the device or cell does not exist.
    pub fn write_cell(
        &self,
        device: &str,
        cell: &str,
        value: StatusValue,
    ) -> Result<StatusValue, BridgeError> {
        let (cell_ref, previous) = {
            let mut devices = self.lock_devices();
            let device = devices
                .get_mut(device)
                .ok_or_else(|| device_not_found(device))?;
            let name = device.name.clone();
            let target = device
                .cell_mut(cell)
                .ok_or_else(|| cell_not_found(name.as_str(), cell))?;
            let previous = std::mem::replace(&mut target.value, value);
            (CellRef::new(name, target.id.clone()), previous)
        };

        if previous == value {
            tracing::debug!(cell = %cell_ref, %value, "value unchanged");
        } else {
            tracing::info!(cell = %cell_ref, from = %previous, to = %value, "cell changed");
            self.listener
                .on_change(&CellChange::new(cell_ref, previous, value, now()));
        }
        Ok(previous)
    }

    /// Snapshot of a registered device.
    #[must_use]
    pub fn device(&self, name: &str) -> Option<Device> {
        self.lock_devices().get(name).cloned()
    }

    /// Names of all registered devices, sorted.
    #[must_use]
    pub fn device_names(&self) -> Vec<DeviceName> {
        let mut names: Vec<_> = self.lock_devices().keys().cloned().collect();
        names.sort();
        names
    }

    /// The listener changes are reported to.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    fn lock_devices(&self) -> MutexGuard<'_, HashMap<DeviceName, Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn find_device<'a>(
    devices: &'a HashMap<DeviceName, Device>,
    name: &str,
) -> Result<&'a Device, NotFoundError> {
    devices.get(name).ok_or_else(|| device_not_found(name))
}

fn device_not_found(name: &str) -> NotFoundError {
    NotFoundError {
        entity: "Device",
        id: name.to_string(),
    }
}

fn cell_not_found(device: &str, cell: &str) -> NotFoundError {
    NotFoundError {
        entity: "Cell",
        id: format!("{device}/{cell}"),
    }
}
