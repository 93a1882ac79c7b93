//! Inbound panel payload: the JSON body of a partition event message.

use serde_json::{Map, Value};

/// Field names accepted for the vendor code, in priority order.
const CODE_FIELDS: [&str; 3] = ["code", "cia_code", "cid_code"];

/// Field names accepted for the partition, in priority order.
const PARTITION_FIELDS: [&str; 2] = ["partition", "group_or_partition_number"];

/// The parts of a panel event the bridge cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelEvent {
    /// Vendor status code, e.g. `3401`.
    pub code: String,
    /// Partition identifier, e.g. `01`.
    pub partition: String,
}

/// The payload could not be read as JSON at all.
#[derive(Debug, thiserror::Error)]
#[error("payload is not valid JSON")]
pub struct PayloadError(#[source] serde_json::Error);

impl PanelEvent {
    /// Parse a raw message body.
    ///
    /// Returns `Ok(None)` when the payload is valid JSON but lacks a string
    /// code or partition (the message is simply not a partition event);
    /// unrelated fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when the bytes are not valid JSON.
    pub fn parse(raw: &[u8]) -> Result<Option<Self>, PayloadError> {
        let value: Value = serde_json::from_slice(raw).map_err(PayloadError)?;
        let Value::Object(fields) = value else {
            return Ok(None);
        };
        let code = first_string(&fields, &CODE_FIELDS);
        let partition = first_string(&fields, &PARTITION_FIELDS);
        Ok(code.zip(partition).map(|(code, partition)| Self {
            code: code.to_string(),
            partition: partition.to_string(),
        }))
    }
}

fn first_string<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| fields.get(*name).and_then(Value::as_str))
}
