//! SIA receiver configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::EventCodesError;
use crate::event_codes::EventCodes;

/// Configuration for the panel-facing TCP receiver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiaConfig {
    /// Whether the daemon starts the receiver at all.
    pub enabled: bool,
    /// Address to listen on.
    pub host: String,
    /// TCP port the panel reports to.
    pub port: u16,
    /// Panel account numbers whose events are forwarded. Empty forwards nothing.
    pub allowed_accounts: Vec<String>,
    /// Topic prefix; events go to `<prefix>/<partition>/<zone>`.
    pub publish_prefix: String,
    /// Reject frames whose CRC or length header does not match the body.
    pub verify_crc: bool,
    /// JSON list of `{"cid_code", "description"}` entries.
    pub event_codes_file: Option<PathBuf>,
    /// Inline descriptions; these win over the file's.
    pub event_codes: EventCodes,
}

impl SiaConfig {
    #[must_use]
    pub fn is_allowed(&self, account: &str) -> bool {
        self.allowed_accounts.iter().any(|allowed| allowed == account)
    }

    /// Merge the descriptions from [`event_codes_file`](Self::event_codes_file)
    /// under the inline ones. No-op without a file.
    ///
    /// # Errors
    ///
    /// Returns [`EventCodesError`] if the file cannot be read or parsed.
    pub fn load_event_codes(&mut self) -> Result<(), EventCodesError> {
        let Some(path) = &self.event_codes_file else {
            return Ok(());
        };
        let mut codes = EventCodes::from_file(path)?;
        codes.merge(std::mem::take(&mut self.event_codes));
        self.event_codes = codes;
        Ok(())
    }
}

impl Default for SiaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "0.0.0.0".to_string(),
            port: 8882,
            allowed_accounts: Vec::new(),
            publish_prefix: "/ax-pro/partitions".to_string(),
            verify_crc: false,
            event_codes_file: None,
            event_codes: EventCodes::default(),
        }
    }
}
