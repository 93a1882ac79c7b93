//! Wiring: builds rule engine, device model and ingestor from [`Config`].

use std::sync::Arc;

use axbridge_app::device_model::VirtualDeviceModel;
use axbridge_app::ingestor::{DeviceBinding, EventIngestor};
use axbridge_app::ports::OutboundPublisher;
use axbridge_app::rule_engine::RuleEngine;
use axbridge_domain::error::BridgeError;

use crate::config::Config;

/// The ingestor of a fully wired bridge; the model and rules hang off it.
pub type Bridge = EventIngestor<RuleEngine>;

/// Register every rule and device from `config`.
///
/// Rule actions publish through `publisher`.
///
/// # Errors
///
/// Returns [`BridgeError`] if a device or rule is invalid, or if a rule
/// watches a cell no device declares.
pub fn build<P>(config: &Config, publisher: &P) -> Result<Bridge, BridgeError>
where
    P: OutboundPublisher + Clone + 'static,
{
    let mut engine = RuleEngine::new();
    for rule in &config.rules {
        engine.register_descriptor(rule.clone(), publisher.clone())?;
    }

    let model = Arc::new(VirtualDeviceModel::new(engine));
    for device in &config.devices {
        model.register_device(device.descriptor.clone())?;
    }
    for rule in &config.rules {
        let cell = &rule.when_changed;
        model.read_cell(cell.device.as_str(), cell.cell.as_str())?;
    }

    let bindings = config
        .devices
        .iter()
        .map(|device| DeviceBinding {
            device: device.descriptor.name.clone(),
            topic: device.topic.clone(),
            partitions: device.partitions.clone(),
        })
        .collect();

    tracing::info!(
        devices = config.devices.len(),
        rules = config.rules.len(),
        codes = config.codes.len(),
        "bridge wired"
    );
    Ok(EventIngestor::new(model, config.codes.clone(), bindings))
}
