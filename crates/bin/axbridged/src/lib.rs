//! # axbridged: alarm panel bridge daemon
//!
//! Library half of the daemon: configuration and the wiring that turns it
//! into a running bridge. `main.rs` adds the transports and signal handling.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

pub mod config;
pub mod wiring;
