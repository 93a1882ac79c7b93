//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp attached to accepted cell changes.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
