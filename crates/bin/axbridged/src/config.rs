//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `axbridge.toml` in the working directory (or the path in
//! `AXBRIDGE_CONFIG`). Every field has a default so the file is optional;
//! without a file the daemon runs the stock Ax Pro deployment. A file that
//! declares its own `[[devices]]` starts from an empty device and rule list.
//! Environment variables take precedence over file values.

use std::collections::HashSet;

use axbridge_adapter_mqtt::MqttConfig;
use axbridge_adapter_sia::{EventCodesError, SiaConfig};
use axbridge_domain::cell::CellSpec;
use axbridge_domain::code_map::CodeMap;
use axbridge_domain::device::DeviceDescriptor;
use axbridge_domain::error::BridgeError;
use axbridge_domain::id::{CellId, CellRef, DeviceName};
use axbridge_domain::locale::LocalizedText;
use axbridge_domain::partition_map::PartitionMapping;
use axbridge_domain::rule::{LogLevel, RuleAction, RuleDescriptor};
use axbridge_domain::status::StatusValue;
use axbridge_domain::topic::TopicFilter;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Config file looked up when `AXBRIDGE_CONFIG` is unset.
pub const DEFAULT_PATH: &str = "axbridge.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Broker connection.
    pub mqtt: MqttConfig,
    /// Panel-facing SIA receiver.
    pub sia: SiaConfig,
    /// Vendor code → status table.
    pub codes: CodeMap,
    /// Virtual devices and the topics that feed them.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
    /// Declarative rules.
    #[serde(default)]
    pub rules: Vec<RuleDescriptor>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// A device together with its inbound binding.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(flatten)]
    pub descriptor: DeviceDescriptor,
    /// Topic filter carrying this device's partition events.
    pub topic: TopicFilter,
    /// Partition identifier → cell.
    #[serde(default)]
    pub partitions: PartitionMapping,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, if the SIA
    /// event codes file cannot be loaded, or if the result fails
    /// [`validate`](Self::validate).
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("AXBRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.sia.load_event_codes()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `var`, in order: `AXBRIDGE_MQTT_HOST`,
    /// `AXBRIDGE_MQTT_PORT`, `AXBRIDGE_SIA_PORT`, `AXBRIDGE_LOG`, then
    /// `RUST_LOG` (which wins over `AXBRIDGE_LOG`). Unparsable ports are ignored.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("AXBRIDGE_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(port) = var("AXBRIDGE_MQTT_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.broker_port = port;
        }
        if let Some(port) = var("AXBRIDGE_SIA_PORT").and_then(|val| val.parse().ok()) {
            self.sia.port = port;
        }
        if let Some(val) = var("AXBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    /// Check that the configuration describes a bridge that can start.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(invalid("mqtt.broker_port must be non-zero"));
        }
        if self.sia.enabled && self.sia.port == 0 {
            return Err(invalid("sia.port must be non-zero"));
        }

        let mut names = HashSet::new();
        for device in &self.devices {
            let name = &device.descriptor.name;
            if !names.insert(name) {
                return Err(invalid(format!("device {name} is declared more than once")));
            }
            device
                .descriptor
                .validate()
                .map_err(|err| invalid(format!("device {name}: {err:?}")))?;
            for (partition, cell) in device.partitions.iter() {
                if !device.has_cell(cell.as_str()) {
                    return Err(invalid(format!(
                        "device {name}: partition {partition} targets unknown cell {cell}"
                    )));
                }
            }
        }

        for rule in &self.rules {
            rule.validate()
                .map_err(|err| invalid(format!("rule {:?}: {err:?}", rule.name)))?;
            let target = &rule.when_changed;
            let known = self
                .devices
                .iter()
                .find(|device| device.descriptor.name == target.device)
                .is_some_and(|device| device.has_cell(target.cell.as_str()));
            if !known {
                return Err(invalid(format!(
                    "rule {:?} watches unknown cell {target}",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}

impl DeviceConfig {
    fn has_cell(&self, cell: &str) -> bool {
        self.descriptor
            .cells
            .iter()
            .any(|spec| spec.id.as_str() == cell)
    }

    /// The stock Ax Pro panel: three partitions, one cell each.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the identifiers are fixed and valid.
    pub fn ax_pro() -> Result<Self, BridgeError> {
        let mut descriptor = DeviceDescriptor::builder()
            .name("AxPro")
            .title(LocalizedText::new().with("en", "Ax Pro").with("ru", "Ax Pro"));
        let mut partitions = Vec::new();
        for (partition, id, en, ru) in [
            ("01", "state_01", "Ground floor", "Подвал"),
            ("02", "state_02", "Bar", "Бар"),
            ("03", "state_03", "Outdoor", "Улица"),
        ] {
            let cell = CellId::new(id)?;
            partitions.push((partition, cell.clone()));
            descriptor = descriptor.cell(CellSpec::new(
                cell,
                LocalizedText::new().with("en", en).with("ru", ru),
            ));
        }
        Ok(Self {
            descriptor: descriptor.build()?,
            topic: TopicFilter::new("/ax-pro/partitions/#")?,
            partitions: partitions.into_iter().collect(),
        })
    }
}

/// Log when the ground floor gets armed.
fn arm_ground_floor() -> Result<RuleDescriptor, BridgeError> {
    RuleDescriptor::builder()
        .name("ArmGroundFloor")
        .when_changed(CellRef::new(DeviceName::new("AxPro")?, CellId::new("state_01")?))
        .to(StatusValue::Armed)
        .action(RuleAction::Log {
            level: LogLevel::Info,
            message: "Подвал поставлен на охрану".to_string(),
        })
        .build()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            mqtt: MqttConfig::default(),
            sia: SiaConfig::default(),
            codes: [
                ("3401", StatusValue::Armed),
                ("3441", StatusValue::StayArmed),
                ("1401", StatusValue::Disarmed),
            ]
            .into_iter()
            .collect(),
            devices: DeviceConfig::ax_pro().into_iter().collect(),
            rules: arm_ground_floor().into_iter().collect(),
        }
    }
}

impl LoggingConfig {
    /// Parse [`filter`](Self::filter) into a subscriber filter.
    ///
    /// # Errors
    ///
    /// Returns the parse error for an invalid directive.
    pub fn env_filter(&self) -> Result<EnvFilter, ParseError> {
        EnvFilter::try_new(&self.filter)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "axbridged=info,axbridge=info".to_string(),
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// SIA event codes file failure.
    #[error("failed to load SIA event codes")]
    EventCodes(#[from] EventCodesError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
