//! Typed identifier newtypes.
//!
//! Devices and cells are addressed by human-chosen names taken from the
//! configuration, so identifiers wrap validated strings rather than UUIDs.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const SEPARATOR: char = '/';

macro_rules! define_name {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a name.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::EmptyName`] for an empty string and
            /// [`ValidationError::InvalidIdentifier`] when it contains `/`.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if value.is_empty() {
                    return Err(ValidationError::EmptyName);
                }
                if value.contains(SEPARATOR) {
                    return Err(ValidationError::InvalidIdentifier(value));
                }
                Ok(Self(value))
            }

            /// Borrow the inner string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_name!(
    /// Name of a [`Device`](crate::device::Device), e.g. `AxPro`.
    DeviceName
);

define_name!(
    /// Identifier of a [`Cell`](crate::cell::Cell) within its device, e.g. `state_01`.
    CellId
);

/// Full address of a cell: `(device, cell)`, written `device/cell`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    pub device: DeviceName,
    pub cell: CellId,
}

impl CellRef {
    #[must_use]
    pub fn new(device: DeviceName, cell: CellId) -> Self {
        Self { device, cell }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.device, self.cell)
    }
}

impl FromStr for CellRef {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device, cell) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| ValidationError::InvalidCellRef(s.to_string()))?;
        let device =
            DeviceName::new(device).map_err(|_| ValidationError::InvalidCellRef(s.to_string()))?;
        let cell = CellId::new(cell).map_err(|_| ValidationError::InvalidCellRef(s.to_string()))?;
        Ok(Self { device, cell })
    }
}

impl TryFrom<String> for CellRef {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellRef> for String {
    fn from(value: CellRef) -> Self {
        value.to_string()
    }
}
