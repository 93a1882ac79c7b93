//! MQTT adapter error types.

use axbridge_domain::error::PublishError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused a request.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// The connection to the broker failed.
    #[error("MQTT connection error")]
    Connection(#[source] rumqttc::ConnectionError),
}

impl MqttError {
    /// Convert into a [`PublishError`] for propagation across the publisher
    /// port.
    #[must_use]
    pub fn into_publish(self) -> PublishError {
        PublishError::Transport(Box::new(self))
    }
}

impl From<MqttError> for PublishError {
    fn from(err: MqttError) -> Self {
        err.into_publish()
    }
}
