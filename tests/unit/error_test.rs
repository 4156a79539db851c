//! Tests for error types

use prometheus_dispatch::core::{AppResult, DispatchError};
use std::error::Error;
use std::io;

#[test]
fn test_invalid_config_error() {
    let err = DispatchError::InvalidConfig("loop_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: loop_count must be greater than 0"
    );
}

#[test]
fn test_spawn_error_keeps_source() {
    let err = DispatchError::Spawn {
        component: "sharded",
        source: io::Error::new(io::ErrorKind::OutOfMemory, "no threads left"),
    };
    assert_eq!(format!("{}", err), "failed to spawn sharded thread: no threads left");
    assert!(err.source().is_some());
}

#[test]
fn test_destination_error() {
    let err = DispatchError::Destination {
        name: "log_20240101_000000.txt".to_string(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
    };
    assert_eq!(
        format!("{}", err),
        "failed to open destination `log_20240101_000000.txt`: read-only"
    );
}

#[test]
fn test_app_result_wraps_dispatch_error() {
    fn build() -> AppResult<()> {
        Err(DispatchError::InvalidConfig("capacity must be greater than 0".into()).into())
    }
    let err = build().unwrap_err();
    assert!(err.downcast_ref::<DispatchError>().is_some());
}
