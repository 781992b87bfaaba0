//! Small ambient helpers shared across modules.

use chrono::Utc;

/// Monotonic-ish nanosecond timestamp assigned at order intake.
///
/// Uses wall-clock time (`SystemTime`), not a true monotonic clock — the
/// data model only requires timestamps to be non-decreasing under normal
/// operation for within-process time priority, not resistant to clock
/// adjustment.
pub fn now_ns() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Formats the current UTC time as ISO-8601 with microsecond precision and
/// a trailing `Z`, matching the market-data/trade event timestamp format.
pub fn iso8601_micros_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}
