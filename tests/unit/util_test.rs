//! Tests for utility functions

use chrono::{Local, TimeZone};
use prometheus_dispatch::util::clock::{
    destination_name_at, format_record_timestamp, DESTINATION_NAME_FORMAT,
    RECORD_TIMESTAMP_FORMAT,
};

#[test]
fn test_record_timestamp_format() {
    let ts = Local.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap();
    assert_eq!(format_record_timestamp(&ts), "2023-12-31 23:59:58");
    assert_eq!(RECORD_TIMESTAMP_FORMAT, "%Y-%m-%d %H:%M:%S");
}

#[test]
fn test_destination_names_sort_chronologically() {
    let earlier = Local.with_ymd_and_hms(2024, 1, 9, 10, 0, 0).unwrap();
    let later = Local.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
    assert!(destination_name_at(&earlier) < destination_name_at(&later));
    assert_eq!(DESTINATION_NAME_FORMAT, "log_%Y%m%d_%H%M%S.txt");
}

#[test]
fn test_init_tracing_is_idempotent() {
    prometheus_dispatch::util::init_tracing("prometheus_dispatch=warn");
    prometheus_dispatch::util::init_tracing("prometheus_dispatch=warn");
}
