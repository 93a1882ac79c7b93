//! Outbound publisher port: hands messages to the transport.

use std::sync::Arc;

use axbridge_domain::error::PublishError;

/// Sends a message out through the transport without waiting for delivery.
///
/// Implementations must not block: rule handlers call this while the inbound
/// event that triggered them is still being processed.
pub trait OutboundPublisher: Send + Sync {
    /// Enqueue `payload` for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the message cannot be enqueued.
    fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), PublishError>;
}

impl<T: OutboundPublisher + ?Sized> OutboundPublisher for Arc<T> {
    fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), PublishError> {
        (**self).publish(topic, payload, retain)
    }
}
