//! # axbridge-app
//!
//! Application layer: the bridge core and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement or consume:
//!   - `ChangeListener`: receives accepted cell changes
//!   - `OutboundPublisher`: sends messages out through the transport
//! - Provide the **core**:
//!   - `VirtualDeviceModel`: device/cell store with equality-gated notification
//!   - `RuleEngine`: per-cell handler dispatch with failure isolation
//!   - `EventIngestor`: topic + payload → cell write
//! - Turn declarative rule descriptors into handlers
//!
//! ## Execution model
//! Everything here is synchronous and run-to-completion: one inbound message
//! is fully processed, rule handlers included, before the next is accepted.
//!
//! ## Dependency rule
//! Depends on `axbridge-domain` only (plus `tracing`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod device_model;
pub mod ingestor;
pub mod ports;
pub mod rule_engine;
pub mod rules;
