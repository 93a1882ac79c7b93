//! Outbound publisher backed by the rumqttc client.

use axbridge_app::ports::OutboundPublisher;
use axbridge_domain::error::PublishError;
use rumqttc::{AsyncClient, QoS};

use crate::error::MqttError;

/// [`OutboundPublisher`] that enqueues on the client without awaiting.
///
/// Messages are sent once the bridge's event loop polls them out of the
/// queue; publishing never blocks the caller.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub(crate) fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl OutboundPublisher for MqttPublisher {
    fn publish(&self, topic: &str, payload: Vec<u8>, retain: bool) -> Result<(), PublishError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, retain, payload)
            .map_err(|err| MqttError::Client(err).into())
    }
}
