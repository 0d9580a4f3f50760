//! Timestamp acquisition.
//!
//! All lifecycle points are read from the system clock so that values can be
//! correlated across processes and runs. The Unix epoch doubles as the
//! "unset" sentinel for points the transport did not supply.

use chrono::{DateTime, Utc};

/// Point in time with nanosecond resolution.
pub type Timestamp = DateTime<Utc>;

/// Current wall-clock time.
#[inline]
pub fn now() -> Timestamp {
    Utc::now()
}

/// The sentinel for a lifecycle point that was never observed.
#[inline]
pub fn unset() -> Timestamp {
    DateTime::<Utc>::default()
}

#[inline]
pub fn is_unset(t: &Timestamp) -> bool {
    *t == unset()
}

/// Nanoseconds since the Unix epoch.
///
/// Times outside the `i64` nanosecond range (before 1677 or after 2262) are
/// treated as a failed clock read and collapse to the sentinel value `0`.
pub fn to_nanos(t: &Timestamp) -> i64 {
    t.timestamp_nanos_opt().unwrap_or_else(|| {
        tracing::debug!(timestamp = %t, "timestamp out of nanosecond range");
        0
    })
}

/// Inverse of [`to_nanos`].
#[inline]
pub fn from_nanos(nanos: i64) -> Timestamp {
    DateTime::from_timestamp_nanos(nanos)
}
