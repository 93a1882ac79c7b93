//! SIA DC-09 framing and the Contact ID data block.
//!
//! ```text
//! B2C20046"ADM-CID"0008L0#777[#777|1401 02 501][SУлица]_09:15:28,07-03-2025
//! └crc┘└len┘└protocol┘└seq┘└pfx┘└acct┘└──────── data ────────┘ └time──┘ └date────┘
//! ```
//!
//! The CRC and length cover everything from the opening quote of the
//! protocol token to the end of the frame.

use crate::error::FrameError;

/// Event code of the periodic test report.
pub const TEST_REPORT_CODE: u16 = 602;

/// CRC-16/ARC: reflected polynomial 0xA001, initial value 0.
#[must_use]
pub fn crc16_arc(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |crc, &byte| {
        (0..8).fold(crc ^ u16::from(byte), |crc, _| {
            if crc & 1 == 1 {
                (crc >> 1) ^ 0xA001
            } else {
                crc >> 1
            }
        })
    })
}

/// Wrap a message body in the DC-09 envelope: `\n<crc><len><body>\r`.
#[must_use]
pub fn envelope(body: &str) -> String {
    format!(
        "\n{:04X}{:04X}{body}\r",
        crc16_arc(body.as_bytes()),
        body.len()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Contact ID event report.
    AdmCid,
    /// Link test (heartbeat), no event data.
    Null,
}

/// One parsed DC-09 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiaFrame {
    pub crc: u16,
    pub length: usize,
    pub protocol: Protocol,
    pub sequence: String,
    pub prefix: String,
    pub account: String,
    pub data: String,
    pub time: String,
    pub date: String,
    body: String,
}

impl SiaFrame {
    /// Parse one frame; surrounding whitespace (the LF/CR envelope) is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] when the text does not follow the frame grammar.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let text = text.trim();
        let (crc, rest) = take_hex(text, "crc")?;
        let (length, body) = take_hex(rest, "length")?;

        let rest = body
            .strip_prefix('"')
            .ok_or(FrameError::Malformed("protocol"))?;
        let (protocol, rest) = rest
            .split_once('"')
            .ok_or(FrameError::Malformed("protocol"))?;
        let protocol = match protocol {
            "ADM-CID" => Protocol::AdmCid,
            "NULL" => Protocol::Null,
            other => return Err(FrameError::UnsupportedProtocol(other.to_string())),
        };

        let (sequence, rest) = split_field(rest, 'L', "sequence")?;
        let (prefix, rest) = split_field(rest, '#', "prefix")?;
        let (account, rest) = split_field(rest, '[', "account")?;
        let (data, rest) = rest
            .split_once("]_")
            .ok_or(FrameError::Malformed("data block"))?;
        let (time, date) = rest
            .split_once(',')
            .ok_or(FrameError::Malformed("timestamp"))?;
        check(time, "time", |c| c.is_ascii_digit() || c == ':')?;
        check(date, "date", |c| c.is_ascii_digit() || c == '-')?;

        Ok(Self {
            crc,
            length: usize::from(length),
            protocol,
            sequence: sequence.to_string(),
            prefix: prefix.to_string(),
            account: account.to_string(),
            data: data.to_string(),
            time: time.to_string(),
            date: date.to_string(),
            body: body.to_string(),
        })
    }

    /// Check the CRC and length headers against the body.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::CrcMismatch`] or [`FrameError::LengthMismatch`].
    pub fn verify(&self) -> Result<(), FrameError> {
        let computed = crc16_arc(self.body.as_bytes());
        if computed != self.crc {
            return Err(FrameError::CrcMismatch {
                header: self.crc,
                computed,
            });
        }
        if self.body.len() != self.length {
            return Err(FrameError::LengthMismatch {
                header: self.length,
                body: self.body.len(),
            });
        }
        Ok(())
    }

    /// The acknowledgement the panel expects for this frame.
    #[must_use]
    pub fn ack(&self) -> String {
        envelope(&format!(
            "\"ACK\"{}L{}#{}[]_{},{}",
            self.sequence, self.prefix, self.account, self.time, self.date
        ))
    }

    /// Decode the Contact ID data block of an `ADM-CID` frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Malformed`] when the block is not
    /// `#<account>|<QXYZ> <GG> <CCC>`.
    pub fn contact_id(&self) -> Result<ContactId, FrameError> {
        ContactId::parse(&self.data)
    }
}

/// Contact ID event: `#<account>|<Q><XYZ> <GG> <CCC>][<meta>]...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactId {
    pub account: String,
    /// 1 = new event/opening, 3 = restore/closing, 6 = status report.
    pub qualifier: u8,
    pub event_code: u16,
    /// Qualifier and event code together, e.g. `3401`.
    pub code: String,
    pub partition: String,
    /// Zone or user number.
    pub zone: String,
    pub meta: Vec<String>,
}

impl ContactId {
    /// # Errors
    ///
    /// Returns [`FrameError::Malformed`] naming the first field that is wrong.
    pub fn parse(data: &str) -> Result<Self, FrameError> {
        let (account, event) = data
            .strip_prefix('#')
            .and_then(|rest| rest.split_once('|'))
            .ok_or(FrameError::Malformed("contact id account"))?;
        check(account, "contact id account", |c| c.is_ascii_digit())?;

        let mut parts = event.splitn(3, ' ');
        let code = parts.next().unwrap_or_default();
        let partition = parts.next().ok_or(FrameError::Malformed("partition"))?;
        let tail = parts.next().ok_or(FrameError::Malformed("zone"))?;

        if code.len() != 4 {
            return Err(FrameError::Malformed("event code"));
        }
        check(code, "event code", |c| c.is_ascii_digit())?;
        check(partition, "partition", |c| c.is_ascii_digit())?;

        let mut blocks = tail.split("][");
        let zone = blocks.next().unwrap_or_default();
        check(zone, "zone", |c| c.is_ascii_digit())?;

        let (qualifier, event_code) = code.split_at(1);
        Ok(Self {
            account: account.to_string(),
            qualifier: qualifier
                .parse()
                .map_err(|_| FrameError::Malformed("qualifier"))?,
            event_code: event_code
                .parse()
                .map_err(|_| FrameError::Malformed("event code"))?,
            code: code.to_string(),
            partition: partition.to_string(),
            zone: zone.to_string(),
            meta: blocks.map(ToString::to_string).collect(),
        })
    }

    #[must_use]
    pub fn is_test_report(&self) -> bool {
        self.event_code == TEST_REPORT_CODE
    }
}

fn take_hex<'a>(text: &'a str, what: &'static str) -> Result<(u16, &'a str), FrameError> {
    let (hex, rest) = text
        .split_at_checked(4)
        .ok_or(FrameError::Malformed(what))?;
    check(hex, what, |c| c.is_ascii_digit() || ('A'..='F').contains(&c))?;
    let value = u16::from_str_radix(hex, 16).map_err(|_| FrameError::Malformed(what))?;
    Ok((value, rest))
}

fn split_field<'a>(
    text: &'a str,
    delimiter: char,
    what: &'static str,
) -> Result<(&'a str, &'a str), FrameError> {
    let (field, rest) = text
        .split_once(delimiter)
        .ok_or(FrameError::Malformed(what))?;
    check(field, what, |c| c.is_ascii_digit())?;
    Ok((field, rest))
}

fn check(field: &str, what: &'static str, allowed: impl Fn(char) -> bool) -> Result<(), FrameError> {
    if field.is_empty() || !field.chars().all(allowed) {
        return Err(FrameError::Malformed(what));
    }
    Ok(())
}
