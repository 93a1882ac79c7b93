//! Status values: the canonical states of a panel partition.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::locale::LocalizedText;

/// Canonical status of a partition, as stored in a cell.
///
/// The numeric codes match the values panel integrations have always used
/// (`1` armed … `4` unknown) and are what operators see in raw dumps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StatusValue {
    Armed,
    StayArmed,
    Disarmed,
    #[default]
    Unknown,
}

impl StatusValue {
    /// Every representable value, in code order.
    pub const ALL: [Self; 4] = [Self::Armed, Self::StayArmed, Self::Disarmed, Self::Unknown];

    /// Numeric code of this value.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Armed => 1,
            Self::StayArmed => 2,
            Self::Disarmed => 3,
            Self::Unknown => 4,
        }
    }

    /// Snake-case name, as used in configuration and templates.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Armed => "armed",
            Self::StayArmed => "stay_armed",
            Self::Disarmed => "disarmed",
            Self::Unknown => "unknown",
        }
    }

    /// Built-in display label, if one exists for `locale`.
    #[must_use]
    pub fn default_label(self, locale: &str) -> Option<&'static str> {
        let label = match (self, locale) {
            (Self::Armed, "en") => "Armed",
            (Self::StayArmed, "en") => "Stay armed",
            (Self::Disarmed, "en") => "Disarmed",
            (Self::Unknown, "en") => "Status unknown",
            (Self::Armed, "ru") => "Под охраной",
            (Self::StayArmed, "ru") => "Ночной режим",
            (Self::Disarmed, "ru") => "Снято с охраны",
            (Self::Unknown, "ru") => "Состояние неизвестно",
            _ => return None,
        };
        Some(label)
    }

    fn default_labels(self) -> LocalizedText {
        ["en", "ru"]
            .into_iter()
            .filter_map(|locale| self.default_label(locale).map(|label| (locale, label)))
            .collect()
    }
}

impl TryFrom<u8> for StatusValue {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|value| value.code() == code)
            .ok_or(ValidationError::UnknownStatusCode(code))
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|value| value.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatusName(s.to_string()))
    }
}

/// Per-value display labels for one cell.
///
/// Values without an explicit entry use the built-in labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusLabels(BTreeMap<StatusValue, LocalizedText>);

impl Default for StatusLabels {
    fn default() -> Self {
        Self(
            StatusValue::ALL
                .into_iter()
                .map(|value| (value, value.default_labels()))
                .collect(),
        )
    }
}

impl StatusLabels {
    /// Override the labels of a single value.
    #[must_use]
    pub fn with(mut self, value: StatusValue, labels: LocalizedText) -> Self {
        self.0.insert(value, labels);
        self
    }

    /// Display label of `value` in `locale`, falling back to the built-in
    /// label and finally to the snake-case name.
    #[must_use]
    pub fn label(&self, value: StatusValue, locale: &str) -> &str {
        self.0
            .get(&value)
            .and_then(|text| text.get(locale))
            .or_else(|| value.default_label(locale))
            .or_else(|| self.0.get(&value).and_then(|text| text.resolve(locale)))
            .unwrap_or(value.as_str())
    }

    /// Values that have an entry in this table.
    pub fn values(&self) -> impl Iterator<Item = StatusValue> + '_ {
        self.0.keys().copied()
    }
}
