//! # axbridge-domain
//!
//! Pure domain model for the axbridge alarm-panel bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **status values** a panel partition can be in
//! - Define **virtual devices** and their **cells** (addressable status holders)
//! - Define the **code table** (vendor code → status) and the **partition
//!   table** (partition → cell)
//! - Define **topic filters** that scope inbound messages to one device
//! - Define the **inbound payload** shape and **change records**
//! - Define **rule descriptors** (watched cell → filters → actions)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.

pub mod error;
pub mod id;
pub mod time;

pub mod cell;
pub mod change;
pub mod code_map;
pub mod device;
pub mod locale;
pub mod partition_map;
pub mod payload;
pub mod rule;
pub mod status;
pub mod topic;
