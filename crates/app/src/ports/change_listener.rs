//! Change listener port: receives cell changes accepted by the device model.

use std::sync::Arc;

use axbridge_domain::change::CellChange;

/// Notified synchronously, after the store is updated, for every write that
/// changed a cell's value.
///
/// Never called for a write that stored the value the cell already held.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, change: &CellChange);
}

impl<T: ChangeListener + ?Sized> ChangeListener for Arc<T> {
    fn on_change(&self, change: &CellChange) {
        (**self).on_change(change);
    }
}
