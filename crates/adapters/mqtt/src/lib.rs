//! # axbridge-adapter-mqtt
//!
//! MQTT transport: connects the bridge to the broker.
//!
//! ## Responsibilities
//! - Connect to the broker and keep the connection alive
//! - Subscribe (QoS 1) to every device binding's topic filter, again after
//!   each reconnect
//! - Hand every incoming publish to the ingestor, one at a time
//! - Provide [`MqttPublisher`], the outbound publisher used by rule actions
//!
//! ## Dependency rule
//! Depends on `axbridge-app` (port traits) and `axbridge-domain` only.

pub mod config;
pub mod error;
mod publisher;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};

pub use config::MqttConfig;
pub use error::MqttError;
pub use publisher::MqttPublisher;

/// Owns the rumqttc event loop.
pub struct MqttBridge {
    client: AsyncClient,
    eventloop: EventLoop,
    topics: Vec<String>,
    config: MqttConfig,
}

impl MqttBridge {
    /// Build the client. Nothing touches the network until [`run`](Self::run)
    /// polls the event loop.
    ///
    /// The publisher is usable right away; topics are set afterwards with
    /// [`with_topics`](Self::with_topics), once whoever consumes the
    /// messages knows what it needs.
    #[must_use]
    pub fn new(config: MqttConfig) -> (Self, MqttPublisher) {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(config.keep_alive());
        let (client, eventloop) = AsyncClient::new(options, config.channel_capacity);
        let bridge = Self {
            client: client.clone(),
            eventloop,
            topics: Vec::new(),
            config,
        };
        (bridge, MqttPublisher::new(client))
    }

    /// Replace the topic filters subscribed after every connection.
    #[must_use]
    pub fn with_topics<I, T>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Topic filters subscribed after every connection.
    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Poll the broker forever, calling `on_message(topic, payload)` for every
    /// incoming publish.
    ///
    /// Messages are delivered serially: the next one is not polled until the
    /// callback returns. Connection errors are logged and retried after the
    /// configured delay.
    pub async fn run<F>(mut self, mut on_message: F)
    where
        F: FnMut(&str, &[u8]),
    {
        tracing::info!(
            host = %self.config.broker_host,
            port = self.config.broker_port,
            "connecting to MQTT broker"
        );
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("connected to MQTT broker");
                    self.subscribe_all();
                }
                Ok(event) => {
                    if let Some((topic, payload)) = incoming_message(&event) {
                        tracing::trace!(topic, bytes = payload.len(), "message received");
                        on_message(topic, payload);
                    }
                }
                Err(err) => {
                    let err = MqttError::Connection(err);
                    tracing::error!(error = %err, cause = ?err, "MQTT event loop error, retrying");
                    tokio::time::sleep(self.config.reconnect_delay()).await;
                }
            }
        }
    }

    fn subscribe_all(&self) {
        for topic in &self.topics {
            match self.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
                Ok(()) => tracing::info!(%topic, "subscribed"),
                Err(err) => {
                    let err = MqttError::Client(err);
                    tracing::error!(%topic, error = %err, "failed to subscribe");
                }
            }
        }
    }
}

/// The topic and payload of an incoming publish, if `event` is one.
fn incoming_message(event: &Event) -> Option<(&str, &[u8])> {
    match event {
        Event::Incoming(Packet::Publish(publish)) => {
            Some((publish.topic.as_str(), publish.payload.as_ref()))
        }
        _ => None,
    }
}
