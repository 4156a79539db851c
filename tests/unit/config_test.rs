//! Tests for configuration validation

use prometheus_dispatch::config::{
    DestinationConfig, EngineConfig, RotationConfig, SchedulerConfig, ShardedPoolConfig,
    SinkConfig, DEFAULT_SINK_CAPACITY,
};

#[test]
fn test_engine_defaults_validate() {
    let cfg = EngineConfig::default();
    assert!(cfg.validate().is_ok());
    assert!(cfg.sink.is_none());
}

#[test]
fn test_engine_reports_failing_section() {
    let cfg = EngineConfig {
        pool: ShardedPoolConfig::new().with_loop_count(0),
        ..EngineConfig::default()
    };
    assert_eq!(
        cfg.validate().unwrap_err(),
        "pool invalid: loop_count must be greater than 0"
    );

    let cfg = EngineConfig {
        sink: Some(SinkConfig::console().with_capacity(0)),
        ..EngineConfig::default()
    };
    assert!(cfg.validate().unwrap_err().starts_with("sink invalid"));
}

#[test]
fn test_engine_from_json() {
    let cfg = EngineConfig::from_json_str(
        r#"{
            "scheduler": { "worker_count": 2, "thread_name_prefix": "timer" },
            "pool": { "loop_count": 3 },
            "sink": {
                "destination": { "kind": "console" },
                "rotation": { "kind": "fixed", "name": "console" }
            }
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.scheduler.worker_count, 2);
    assert_eq!(cfg.scheduler.thread_name_prefix, "timer");
    assert_eq!(cfg.pool.loop_count, 3);
    assert_eq!(cfg.pool.thread_name_prefix, "event-loop");
    let sink = cfg.sink.unwrap();
    assert_eq!(sink.capacity, DEFAULT_SINK_CAPACITY);
    assert_eq!(sink.destination, DestinationConfig::Console);
}

#[test]
fn test_engine_json_rejects_invalid_values() {
    let err = EngineConfig::from_json_str(r#"{ "scheduler": { "worker_count": 0 } }"#).unwrap_err();
    assert!(err.starts_with("scheduler invalid"));

    let err = EngineConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_scheduler_empty_prefix_rejected() {
    let cfg = SchedulerConfig::new().with_thread_name_prefix("  ");
    assert_eq!(
        cfg.validate().unwrap_err(),
        "thread_name_prefix must not be empty"
    );
}

#[test]
fn test_sink_fixed_name_required() {
    let cfg = SinkConfig::console().with_rotation(RotationConfig::Fixed { name: String::new() });
    assert!(cfg.validate().is_err());
}

#[test]
fn test_rotating_files_defaults() {
    let cfg = SinkConfig::rotating_files("/var/log/dispatch", 3600);
    assert_eq!(cfg.capacity, DEFAULT_SINK_CAPACITY);
    assert_eq!(cfg.thread_name, "sink-writer");
    assert_eq!(cfg.rotation, RotationConfig::Interval { secs: 3600 });
    assert!(cfg.validate().is_ok());
}
