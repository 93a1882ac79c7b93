//! End-to-end tests for the full axbridged wiring.
//!
//! Each test builds the bridge from a TOML document exactly as the daemon
//! does and drives it through `on_message`: no broker or socket involved.
//! Rule output lands in a spy publisher.

use std::sync::{Arc, Mutex};

use axbridge_adapter_sia::{Disposition, FrameHandler, SiaConfig};
use axbridge_app::ingestor::{DropReason, IngestOutcome};
use axbridge_app::ports::OutboundPublisher;
use axbridge_domain::error::PublishError;
use axbridge_domain::status::StatusValue;
use axbridged::config::Config;
use axbridged::wiring::{self, Bridge};

const PANEL: &str = r#"
    [codes]
    "3401" = "armed"
    "3441" = "stay_armed"
    "1401" = "disarmed"

    [[devices]]
    name = "Panel"
    topic = "/panel/partitions/#"

    [devices.partitions]
    "01" = "zone1"
    "02" = "zone2"

    [[devices.cells]]
    id = "zone1"
    title = { en = "Zone 1" }

    [[devices.cells]]
    id = "zone2"
    title = { en = "Zone 2" }

    [[rules]]
    name = "Mirror zone1"
    when_changed = "Panel/zone1"

    [[rules.actions]]
    type = "publish"
    topic = "/devices/{device}/controls/{cell}"
    payload = "{old_code}->{new_code}"
    retain = true

    [[rules]]
    name = "Zone1 armed"
    when_changed = "Panel/zone1"
    to = "armed"

    [[rules.actions]]
    type = "publish"
    topic = "/alerts/{cell}"
    payload = "{cell} {new}"
"#;

const TOPIC: &str = "/panel/partitions/01/501";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SpyPublisher {
    messages: Mutex<Vec<(String, String)>>,
}

impl SpyPublisher {
    fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl OutboundPublisher for SpyPublisher {
    fn publish(&self, topic: &str, payload: Vec<u8>, _retain: bool) -> Result<(), PublishError> {
        self.messages
            .lock()
            .unwrap()
            .push((topic.to_string(), String::from_utf8(payload).unwrap()));
        Ok(())
    }
}

/// Feeds published messages straight back into a bridge, as the broker would.
struct Loopback<'a>(&'a Bridge);

impl OutboundPublisher for Loopback<'_> {
    fn publish(&self, topic: &str, payload: Vec<u8>, _retain: bool) -> Result<(), PublishError> {
        self.0.on_message(topic, &payload);
        Ok(())
    }
}

fn bridge(toml: &str) -> (Bridge, Arc<SpyPublisher>) {
    let config: Config = toml::from_str(toml).unwrap();
    config.validate().unwrap();
    let publisher = Arc::new(SpyPublisher::default());
    let bridge = wiring::build(&config, &publisher).unwrap();
    (bridge, publisher)
}

fn zone(bridge: &Bridge, cell: &str) -> StatusValue {
    bridge.model().read_cell("Panel", cell).unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn should_arm_zone_and_fire_rules_on_first_event() {
    let (bridge, publisher) = bridge(PANEL);
    assert_eq!(zone(&bridge, "zone1").code(), 4);

    let outcome = bridge.on_message(TOPIC, br#"{"code":"3401","partition":"01"}"#);

    assert!(outcome.changed());
    assert_eq!(zone(&bridge, "zone1"), StatusValue::Armed);
    assert_eq!(zone(&bridge, "zone1").code(), 1);
    assert_eq!(
        publisher.messages(),
        [
            (
                "/devices/Panel/controls/zone1".to_string(),
                "4->1".to_string()
            ),
            ("/alerts/zone1".to_string(), "zone1 armed".to_string()),
        ]
    );
}

#[test]
fn should_fire_rules_once_when_event_is_redelivered() {
    let (bridge, publisher) = bridge(PANEL);
    let payload = br#"{"code":"3401","partition":"01"}"#;

    bridge.on_message(TOPIC, payload);
    let second = bridge.on_message(TOPIC, payload);

    assert!(!second.changed());
    assert_eq!(publisher.messages().len(), 2);
}

#[test]
fn should_ignore_unmapped_code() {
    let (bridge, publisher) = bridge(PANEL);
    bridge.on_message(TOPIC, br#"{"code":"3401","partition":"01"}"#);

    let outcome = bridge.on_message(TOPIC, br#"{"code":"9999","partition":"01"}"#);

    assert_eq!(outcome, IngestOutcome::Dropped(DropReason::UnmappedCode));
    assert_eq!(zone(&bridge, "zone1"), StatusValue::Armed);
    assert_eq!(publisher.messages().len(), 2);
}

#[test]
fn should_ignore_unmapped_partition() {
    let (bridge, publisher) = bridge(PANEL);

    let outcome = bridge.on_message(TOPIC, br#"{"code":"3401","partition":"99"}"#);

    assert_eq!(outcome, IngestOutcome::Dropped(DropReason::UnmappedPartition));
    assert_eq!(zone(&bridge, "zone1"), StatusValue::Unknown);
    assert_eq!(zone(&bridge, "zone2"), StatusValue::Unknown);
    assert!(publisher.messages().is_empty());
}

// ---------------------------------------------------------------------------
// Rules and filters
// ---------------------------------------------------------------------------

#[test]
fn should_only_run_filtered_rule_when_entering_target_state() {
    let (bridge, publisher) = bridge(PANEL);
    bridge.on_message(TOPIC, br#"{"code":"3441","partition":"01"}"#);
    bridge.on_message(TOPIC, br#"{"code":"1401","partition":"01"}"#);

    let topics: Vec<_> = publisher.messages().into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        topics,
        [
            "/devices/Panel/controls/zone1",
            "/devices/Panel/controls/zone1"
        ]
    );
}

#[test]
fn should_not_fire_zone1_rules_for_zone2_changes() {
    let (bridge, publisher) = bridge(PANEL);
    let outcome = bridge.on_message(TOPIC, br#"{"code":"1401","partition":"02"}"#);
    assert!(outcome.changed());
    assert!(publisher.messages().is_empty());
}

#[test]
fn should_survive_malformed_payload() {
    let (bridge, _) = bridge(PANEL);
    assert_eq!(
        bridge.on_message(TOPIC, b"\xff\xfe"),
        IngestOutcome::Dropped(DropReason::MalformedPayload)
    );
    assert!(
        bridge
            .on_message(TOPIC, br#"{"code":"3401","partition":"02"}"#)
            .changed()
    );
}

// ---------------------------------------------------------------------------
// Default deployment
// ---------------------------------------------------------------------------

#[test]
fn should_route_panel_events_in_default_deployment() {
    let publisher = Arc::new(SpyPublisher::default());
    let bridge = wiring::build(&Config::default(), &publisher).unwrap();

    let outcome = bridge.on_message(
        "/ax-pro/partitions/03/000",
        br#"{"cia_code":"3441","group_or_partition_number":"03"}"#,
    );

    assert!(outcome.changed());
    assert_eq!(
        bridge.model().read_cell("AxPro", "state_03").unwrap(),
        StatusValue::StayArmed
    );
    assert_eq!(
        bridge.model().read_cell("AxPro", "state_01").unwrap(),
        StatusValue::Unknown
    );
}

#[test]
fn should_carry_sia_report_through_to_device_cell() {
    let publisher = Arc::new(SpyPublisher::default());
    let bridge = wiring::build(&Config::default(), &publisher).unwrap();
    let sia = FrameHandler::new(
        SiaConfig {
            allowed_accounts: vec!["777".to_string()],
            ..SiaConfig::default()
        },
        Loopback(&bridge),
    );

    let (disposition, ack) = sia
        .handle("B2C20046\"ADM-CID\"0008L0#777[#777|1401 02 501][SУлица]_09:15:28,07-03-2025")
        .unwrap();

    assert_eq!(
        disposition,
        Disposition::Forwarded {
            topic: "/ax-pro/partitions/02/501".to_string()
        }
    );
    assert_eq!(ack, "\nAAA90025\"ACK\"0008L0#777[]_09:15:28,07-03-2025\r");
    assert_eq!(
        bridge.model().read_cell("AxPro", "state_02").unwrap(),
        StatusValue::Disarmed
    );
    assert!(publisher.messages().is_empty());
}

#[test]
fn should_forward_described_sia_event_readable_by_ingestor() {
    let config: Config = toml::from_str(
        r#"
        [sia]
        allowed_accounts = ["777"]

        [sia.event_codes]
        "1401" = "Disarm by user"
        "#,
    )
    .unwrap();
    let relay = Arc::new(SpyPublisher::default());
    let sia = FrameHandler::new(config.sia.clone(), Arc::clone(&relay));

    sia.handle("B2C20046\"ADM-CID\"0008L0#777[#777|1401 02 501][SУлица]_09:15:28,07-03-2025")
        .unwrap();

    let (topic, body) = relay.messages().remove(0);
    assert!(body.contains(r#""description":"Disarm by user""#));
    assert!(body.contains(r#""group_or_partition_number":"02""#));

    let publisher = Arc::new(SpyPublisher::default());
    let bridge = wiring::build(&Config::default(), &publisher).unwrap();
    assert!(bridge.on_message(&topic, body.as_bytes()).changed());
    assert_eq!(
        bridge.model().read_cell("AxPro", "state_02").unwrap(),
        StatusValue::Disarmed
    );
}
