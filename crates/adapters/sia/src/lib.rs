//! # axbridge-adapter-sia
//!
//! SIA DC-09 receiver: the panel-facing side of the bridge.
//!
//! The alarm panel reports Contact ID events over TCP. Each accepted event is
//! republished as a JSON partition event on `<publish_prefix>/<partition>/<zone>`,
//! where the bridge's MQTT subscription picks it up like any other panel
//! message. Every well-formed frame is acknowledged, forwarded or not.
//!
//! The event body carries both the bridge's field names (`code`, `partition`)
//! and the long names existing panel tooling reads
//! (`group_or_partition_number`, ...), plus the code's description when the
//! configured table has one.
//!
//! ## Dependency rule
//! Depends on `axbridge-app` (the outbound publisher port) and
//! `axbridge-domain` only.

pub mod config;
pub mod error;
pub mod event_codes;
pub mod frame;

use std::net::SocketAddr;
use std::sync::Arc;

use axbridge_app::ports::OutboundPublisher;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

pub use config::SiaConfig;
pub use error::{EventCodesError, FrameError, SiaError};
pub use event_codes::EventCodes;
use frame::{ContactId, Protocol, SiaFrame};

/// Largest chunk read from a panel connection; one chunk carries one frame.
const READ_CHUNK: usize = 1024;

/// What happened to an acknowledged frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Published on `topic`.
    Forwarded { topic: String },
    /// Link test, nothing to forward.
    Heartbeat,
    /// Periodic test report, logged only.
    TestReport,
    /// Account is not in the allowlist.
    AccountNotAllowed,
}

/// JSON body published for each forwarded event.
#[derive(Debug, Serialize)]
struct PartitionEvent<'a> {
    account: &'a str,
    qualifier: u8,
    event_code: u16,
    code: &'a str,
    partition: &'a str,
    zone: &'a str,
    description: Option<&'a str>,
    panel_number: &'a str,
    event_qualifier: u8,
    group_or_partition_number: &'a str,
    zone_number_or_user_number: &'a str,
}

impl<'a> PartitionEvent<'a> {
    fn new(contact: &'a ContactId, description: Option<&'a str>) -> Self {
        Self {
            account: &contact.account,
            qualifier: contact.qualifier,
            event_code: contact.event_code,
            code: &contact.code,
            partition: &contact.partition,
            zone: &contact.zone,
            description,
            panel_number: &contact.account,
            event_qualifier: contact.qualifier,
            group_or_partition_number: &contact.partition,
            zone_number_or_user_number: &contact.zone,
        }
    }
}

/// Turns decoded frames into published events and ACKs.
pub struct FrameHandler<P> {
    config: SiaConfig,
    publisher: P,
}

impl<P: OutboundPublisher> FrameHandler<P> {
    pub fn new(config: SiaConfig, publisher: P) -> Self {
        Self { config, publisher }
    }

    /// Handle one frame and return the ACK to send back.
    ///
    /// A publish failure is logged and still acknowledged: the panel cannot
    /// do anything useful with a missing ACK except resend.
    ///
    /// # Errors
    ///
    /// Returns [`SiaError`] when the frame cannot be parsed (or fails CRC
    /// verification when enabled); the connection should then be closed.
    pub fn handle(&self, text: &str) -> Result<(Disposition, String), SiaError> {
        let frame = SiaFrame::parse(text)?;
        if self.config.verify_crc {
            frame.verify()?;
        }
        let ack = frame.ack();

        if frame.protocol == Protocol::Null {
            tracing::debug!(account = %frame.account, "heartbeat");
            return Ok((Disposition::Heartbeat, ack));
        }

        let contact = frame.contact_id()?;
        if !self.config.is_allowed(&frame.account) {
            tracing::error!(account = %frame.account, "account is not allowed");
            return Ok((Disposition::AccountNotAllowed, ack));
        }
        if contact.is_test_report() {
            tracing::info!(account = %frame.account, "test report ok");
            return Ok((Disposition::TestReport, ack));
        }

        let topic = format!(
            "{}/{}/{}",
            self.config.publish_prefix, contact.partition, contact.zone
        );
        let description = self.config.event_codes.description(&contact.code);
        let payload = serde_json::to_vec(&PartitionEvent::new(&contact, description))?;
        tracing::info!(
            account = %frame.account,
            code = %contact.code,
            description = description.unwrap_or_default(),
            partition = %contact.partition,
            zone = %contact.zone,
            %topic,
            "panel event"
        );
        if let Err(err) = self.publisher.publish(&topic, payload, false) {
            tracing::error!(%topic, error = %err, "failed to forward panel event");
        }
        Ok((Disposition::Forwarded { topic }, ack))
    }

    /// Serve one panel connection until it closes or sends garbage.
    ///
    /// # Errors
    ///
    /// Returns [`SiaError`] on socket failure, undecodable bytes or an
    /// invalid frame.
    pub async fn serve<S>(&self, mut stream: S) -> Result<(), SiaError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buffer = [0u8; READ_CHUNK];
        loop {
            let read = stream.read(&mut buffer).await?;
            if read == 0 {
                return Ok(());
            }
            let text = std::str::from_utf8(&buffer[..read])?;
            let (disposition, ack) = self.handle(text)?;
            tracing::trace!(?disposition, "acknowledging frame");
            stream.write_all(ack.as_bytes()).await?;
            stream.flush().await?;
        }
    }
}

/// TCP listener accepting panel connections.
pub struct SiaReceiver<P> {
    listener: TcpListener,
    handler: Arc<FrameHandler<P>>,
}

impl<P: OutboundPublisher + 'static> SiaReceiver<P> {
    /// Bind the listening socket.
    ///
    /// # Errors
    ///
    /// Returns [`SiaError::Io`] if the address cannot be bound.
    pub async fn bind(config: SiaConfig, publisher: P) -> Result<Self, SiaError> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        if config.allowed_accounts.is_empty() {
            tracing::warn!("no allowed accounts configured, panel events will not be forwarded");
        }
        Ok(Self {
            listener,
            handler: Arc::new(FrameHandler::new(config, publisher)),
        })
    }

    /// Address actually bound (useful with port 0).
    ///
    /// # Errors
    ///
    /// Returns [`SiaError::Io`] if the socket is gone.
    pub fn local_addr(&self) -> Result<SocketAddr, SiaError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one task per panel connection.
    pub async fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "SIA receiver listening");
        }
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        tracing::info!(%peer, "panel connected");
                        if let Err(err) = handler.serve(stream).await {
                            tracing::error!(%peer, error = %err, cause = ?err, "closing panel connection");
                        }
                        tracing::info!(%peer, "panel connection closed");
                    });
                }
                Err(err) => tracing::warn!(error = %err, "failed to accept panel connection"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axbridge_domain::error::PublishError;
    use frame::envelope;
    use std::sync::Mutex;
    use tokio::net::TcpStream;

    // ── Spy publisher ──────────────────────────────────────────────

    #[derive(Default)]
    struct SpyPublisher {
        messages: Mutex<Vec<(String, serde_json::Value)>>,
        failing: bool,
    }

    impl SpyPublisher {
        fn messages(&self) -> Vec<(String, serde_json::Value)> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl OutboundPublisher for SpyPublisher {
        fn publish(
            &self,
            topic: &str,
            payload: Vec<u8>,
            _retain: bool,
        ) -> Result<(), PublishError> {
            if self.failing {
                return Err(PublishError::Transport("broker down".into()));
            }
            self.messages
                .lock()
                .unwrap()
                .push((topic.to_string(), serde_json::from_slice(&payload).unwrap()));
            Ok(())
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn report(contact_id: &str) -> String {
        envelope(&format!(
            "\"ADM-CID\"0008L0#777[{contact_id}]_09:15:28,07-03-2025"
        ))
    }

    fn allowing_777() -> SiaConfig {
        SiaConfig {
            allowed_accounts: vec!["777".to_string()],
            ..SiaConfig::default()
        }
    }

    fn handler(config: SiaConfig) -> FrameHandler<Arc<SpyPublisher>> {
        FrameHandler::new(config, Arc::new(SpyPublisher::default()))
    }

    // ── Frame handling ─────────────────────────────────────────────

    #[test]
    fn should_forward_allowed_event_as_partition_event() {
        let handler = handler(allowing_777());

        let (disposition, ack) = handler.handle(&report("#777|3401 01 501")).unwrap();

        assert_eq!(
            disposition,
            Disposition::Forwarded {
                topic: "/ax-pro/partitions/01/501".to_string()
            }
        );
        assert!(ack.contains("\"ACK\"0008L0#777[]_09:15:28,07-03-2025"));
        let messages = handler.publisher.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].1,
            serde_json::json!({
                "account": "777",
                "qualifier": 3,
                "event_code": 401,
                "code": "3401",
                "partition": "01",
                "zone": "501",
                "description": null,
                "panel_number": "777",
                "event_qualifier": 3,
                "group_or_partition_number": "01",
                "zone_number_or_user_number": "501",
            })
        );
    }

    #[test]
    fn should_describe_event_from_configured_table() {
        let handler = handler(SiaConfig {
            event_codes: [("1401", "Disarm by user")].into_iter().collect(),
            ..allowing_777()
        });

        handler.handle(&report("#777|1401 02 501")).unwrap();
        handler.handle(&report("#777|3401 02 501")).unwrap();

        let messages = handler.publisher.messages();
        assert_eq!(messages[0].1["description"], "Disarm by user");
        assert!(messages[1].1["description"].is_null());
    }

    #[test]
    fn should_keep_panel_tooling_field_names() {
        let handler = handler(allowing_777());

        handler
            .handle("B2C20046\"ADM-CID\"0008L0#777[#777|1401 02 501][SУлица]_09:15:28,07-03-2025")
            .unwrap();

        let body = &handler.publisher.messages()[0].1;
        assert_eq!(body["group_or_partition_number"], "02");
        assert_eq!(body["zone_number_or_user_number"], "501");
        assert_eq!(body["panel_number"], "777");
        assert_eq!(body["event_qualifier"], 1);
        assert_eq!(body["event_code"], 401);
    }

    #[test]
    fn should_acknowledge_but_not_forward_unknown_account() {
        let handler = handler(allowing_777());
        let frame = envelope("\"ADM-CID\"0001L0#999[#999|3401 01 501]_09:15:28,07-03-2025");

        let (disposition, _) = handler.handle(&frame).unwrap();

        assert_eq!(disposition, Disposition::AccountNotAllowed);
        assert!(handler.publisher.messages().is_empty());
    }

    #[test]
    fn should_forward_nothing_when_allowlist_is_empty() {
        let handler = handler(SiaConfig::default());
        let (disposition, _) = handler.handle(&report("#777|3401 01 501")).unwrap();
        assert_eq!(disposition, Disposition::AccountNotAllowed);
    }

    #[test]
    fn should_suppress_test_report() {
        let handler = handler(allowing_777());
        let (disposition, _) = handler.handle(&report("#777|1602 00 000")).unwrap();
        assert_eq!(disposition, Disposition::TestReport);
        assert!(handler.publisher.messages().is_empty());
    }

    #[test]
    fn should_acknowledge_heartbeat() {
        let handler = handler(allowing_777());
        let (disposition, ack) = handler
            .handle(&envelope("\"NULL\"0002L0#777[]_10:00:00,07-03-2025"))
            .unwrap();
        assert_eq!(disposition, Disposition::Heartbeat);
        assert!(ack.ends_with("\"ACK\"0002L0#777[]_10:00:00,07-03-2025\r"));
    }

    #[test]
    fn should_still_acknowledge_when_publish_fails() {
        let handler = FrameHandler::new(
            allowing_777(),
            SpyPublisher {
                failing: true,
                ..SpyPublisher::default()
            },
        );
        let (disposition, _) = handler.handle(&report("#777|1401 02 501")).unwrap();
        assert!(matches!(disposition, Disposition::Forwarded { .. }));
    }

    #[test]
    fn should_reject_bad_crc_only_when_verification_enabled() {
        let tampered = report("#777|3401 01 501").replace("3401", "1401");

        let lenient = handler(allowing_777());
        assert!(lenient.handle(&tampered).is_ok());

        let strict = handler(SiaConfig {
            verify_crc: true,
            ..allowing_777()
        });
        assert!(matches!(
            strict.handle(&tampered),
            Err(SiaError::Frame(FrameError::CrcMismatch { .. }))
        ));
    }

    #[test]
    fn should_reject_garbage() {
        let handler = handler(allowing_777());
        assert!(matches!(
            handler.handle("GET / HTTP/1.1"),
            Err(SiaError::Frame(_))
        ));
    }

    // ── Connections ────────────────────────────────────────────────

    #[tokio::test]
    async fn should_ack_each_frame_and_close_on_garbage() {
        let handler = handler(allowing_777());
        let (mut panel, receiver) = tokio::io::duplex(4096);

        let client = async {
            panel
                .write_all(report("#777|3401 01 501").as_bytes())
                .await
                .unwrap();
            let mut ack = vec![0u8; 256];
            let read = panel.read(&mut ack).await.unwrap();
            let ack = String::from_utf8(ack[..read].to_vec()).unwrap();

            panel.write_all(b"not a frame").await.unwrap();
            let mut rest = Vec::new();
            panel.read_to_end(&mut rest).await.unwrap();
            (ack, rest)
        };

        let (result, (ack, rest)) = tokio::join!(handler.serve(receiver), client);

        assert!(matches!(result, Err(SiaError::Frame(_))));
        assert!(ack.starts_with('\n') && ack.ends_with('\r'));
        assert!(rest.is_empty());
        assert_eq!(handler.publisher.messages().len(), 1);
    }

    #[tokio::test]
    async fn should_end_cleanly_when_panel_disconnects() {
        let handler = handler(allowing_777());
        let (panel, receiver) = tokio::io::duplex(64);
        drop(panel);
        assert!(handler.serve(receiver).await.is_ok());
    }

    #[tokio::test]
    async fn should_serve_panel_over_tcp() {
        let publisher = Arc::new(SpyPublisher::default());
        let receiver = SiaReceiver::bind(
            SiaConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                ..allowing_777()
            },
            Arc::clone(&publisher),
        )
        .await
        .unwrap();
        let addr = receiver.local_addr().unwrap();
        let server = tokio::spawn(receiver.run());

        let mut panel = TcpStream::connect(addr).await.unwrap();
        panel
            .write_all(report("#777|1401 03 000").as_bytes())
            .await
            .unwrap();
        let mut ack = vec![0u8; 256];
        let read = panel.read(&mut ack).await.unwrap();

        assert!(String::from_utf8_lossy(&ack[..read]).contains("\"ACK\"0008L0#777[]"));
        assert_eq!(
            publisher.messages()[0].0,
            "/ax-pro/partitions/03/000"
        );
        server.abort();
    }
}
