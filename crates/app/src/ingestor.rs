//! Event ingestor: turns raw panel messages into cell writes.
//!
//! Resolution order: payload → fields → device binding (topic) → cell
//! (partition) → status (code). Every failed resolution drops the message;
//! only a malformed payload and a binding that points at a missing cell are
//! worth a log line.

use std::sync::Arc;

use axbridge_domain::code_map::CodeMap;
use axbridge_domain::id::{CellRef, DeviceName};
use axbridge_domain::partition_map::PartitionMapping;
use axbridge_domain::payload::PanelEvent;
use axbridge_domain::status::StatusValue;
use axbridge_domain::topic::TopicFilter;

use crate::device_model::VirtualDeviceModel;
use crate::ports::ChangeListener;

/// Scopes a topic filter to one device and maps its partitions onto cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceBinding {
    pub device: DeviceName,
    pub topic: TopicFilter,
    pub partitions: PartitionMapping,
}

/// Why a message did not produce a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Body was not JSON.
    MalformedPayload,
    /// JSON without a string code and partition.
    NotAPartitionEvent,
    /// No binding's topic filter matches.
    UnboundTopic,
    UnmappedPartition,
    UnmappedCode,
    /// The binding names a cell the model does not have.
    UnknownCell,
}

/// Result of [`EventIngestor::on_message`], for observability only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Written {
        cell: CellRef,
        previous: StatusValue,
        current: StatusValue,
    },
    Dropped(DropReason),
}

impl IngestOutcome {
    /// Whether the write changed the cell (and therefore fired its rules).
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self, Self::Written { previous, current, .. } if previous != current)
    }
}

/// Routes inbound panel events to the device model.
pub struct EventIngestor<L> {
    model: Arc<VirtualDeviceModel<L>>,
    codes: CodeMap,
    bindings: Vec<DeviceBinding>,
}

impl<L: ChangeListener> EventIngestor<L> {
    pub fn new(
        model: Arc<VirtualDeviceModel<L>>,
        codes: CodeMap,
        bindings: Vec<DeviceBinding>,
    ) -> Self {
        Self {
            model,
            codes,
            bindings,
        }
    }

    /// Topic filters the transport must subscribe to.
    pub fn subscriptions(&self) -> impl Iterator<Item = &TopicFilter> {
        self.bindings.iter().map(|binding| &binding.topic)
    }

    #[must_use]
    pub fn model(&self) -> &Arc<VirtualDeviceModel<L>> {
        &self.model
    }

    /// Handle one inbound message. Never fails; see [`IngestOutcome`].
    pub fn on_message(&self, topic: &str, payload: &[u8]) -> IngestOutcome {
        let event = match PanelEvent::parse(payload) {
            Ok(Some(event)) => event,
            Ok(None) => return IngestOutcome::Dropped(DropReason::NotAPartitionEvent),
            Err(error) => {
                tracing::warn!(topic, error = %error, "dropping malformed payload");
                return IngestOutcome::Dropped(DropReason::MalformedPayload);
            }
        };

        // First matching binding wins.
        let Some(binding) = self.bindings.iter().find(|b| b.topic.matches(topic)) else {
            return IngestOutcome::Dropped(DropReason::UnboundTopic);
        };
        let Some(cell) = binding.partitions.lookup(&event.partition) else {
            return IngestOutcome::Dropped(DropReason::UnmappedPartition);
        };
        let Some(value) = self.codes.lookup(&event.code) else {
            return IngestOutcome::Dropped(DropReason::UnmappedCode);
        };

        let cell = CellRef::new(binding.device.clone(), cell.clone());
        match self
            .model
            .write_cell(cell.device.as_str(), cell.cell.as_str(), value)
        {
            Ok(previous) => IngestOutcome::Written {
                cell,
                previous,
                current: value,
            },
            Err(error) => {
                tracing::error!(topic, %cell, error = ?error, "binding targets a missing cell");
                IngestOutcome::Dropped(DropReason::UnknownCell)
            }
        }
    }
}
