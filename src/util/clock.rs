//! Wall-clock helpers used for record timestamps and destination names.

use chrono::{DateTime, Local};

/// Format used to prefix every sink record.
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for time-based destination names.
pub const DESTINATION_NAME_FORMAT: &str = "log_%Y%m%d_%H%M%S.txt";

/// Current local wall-clock time.
#[must_use]
pub fn now_local() -> DateTime<Local> {
    Local::now()
}

/// Render `ts` the way records are prefixed.
#[must_use]
pub fn format_record_timestamp(ts: &DateTime<Local>) -> String {
    ts.format(RECORD_TIMESTAMP_FORMAT).to_string()
}

/// Destination name for a rotation happening at `ts`.
#[must_use]
pub fn destination_name_at(ts: &DateTime<Local>) -> String {
    ts.format(DESTINATION_NAME_FORMAT).to_string()
}
