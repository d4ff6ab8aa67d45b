//! Timestamp conversion between `DateTime<Utc>` and the integer column form.
//!
//! Timestamps are stored as signed 64-bit epoch milliseconds. Conversion is
//! deterministic and total for every value `Utc::now()` can produce;
//! sub-millisecond precision is truncated on the way in.

use chrono::{DateTime, Utc};

/// Convert a timestamp to epoch milliseconds for storage.
pub fn to_epoch_millis(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

/// Convert stored epoch milliseconds back to a timestamp.
///
/// Returns `None` for values outside the representable date range.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}
