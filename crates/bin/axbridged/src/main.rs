//! # axbridged: alarm panel bridge daemon
//!
//! Composition root that wires the bridge core to its transports.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Build the rule engine, device model and ingestor
//! - Connect to the MQTT broker and feed every message to the ingestor
//! - Optionally run the SIA receiver the panel reports to
//! - Shut down on SIGINT

use anyhow::Context;
use axbridge_adapter_mqtt::MqttBridge;
use axbridge_adapter_sia::SiaReceiver;
use axbridged::config::{Config, LoggingConfig};
use axbridged::wiring;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let (mqtt, publisher) = MqttBridge::new(config.mqtt.clone());
    let bridge = wiring::build(&config, &publisher).context("failed to wire the bridge")?;
    let mqtt = mqtt.with_topics(bridge.subscriptions().map(ToString::to_string));

    let sia_task = if config.sia.enabled {
        let receiver = SiaReceiver::bind(config.sia.clone(), publisher)
            .await
            .context("failed to bind the SIA receiver")?;
        Some(tokio::spawn(receiver.run()))
    } else {
        None
    };

    tokio::select! {
        () = mqtt.run(|topic, payload| {
            bridge.on_message(topic, payload);
        }) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for SIGINT")?;
            tracing::info!("received SIGINT, shutting down");
        }
    }

    if let Some(task) = sia_task {
        task.abort();
    }
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = logging.env_filter().unwrap_or_else(|err| {
        eprintln!(
            "invalid log filter {:?} ({err}), falling back to \"info\"",
            logging.filter
        );
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
