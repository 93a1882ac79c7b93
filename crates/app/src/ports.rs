//! Port definitions: traits at the boundaries of the core.
//!
//! Ports are defined here (in `app`) so that both the core and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod change_listener;
pub mod publisher;

pub use change_listener::ChangeListener;
pub use publisher::OutboundPublisher;
