//! Tests for builder modules

use prometheus_dispatch::builders::{build_sink, Engine};
use prometheus_dispatch::config::{EngineConfig, RotationConfig, SinkConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_console_sink_builds() {
    let sink = build_sink(&SinkConfig::console()).unwrap();
    sink.log("console ready");
}

#[test]
fn test_interval_file_sink_names_by_time() {
    let dir = tempfile::tempdir().unwrap();
    let sink = build_sink(&SinkConfig::rotating_files(dir.path(), 3600)).unwrap();
    sink.log("hello");
    drop(sink);

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("log_") && names[0].ends_with(".txt"));
}

#[test]
fn test_engine_runs_all_components() {
    let dir = tempfile::tempdir().unwrap();
    let json = format!(
        r#"{{
            "scheduler": {{ "worker_count": 2 }},
            "pool": {{ "loop_count": 2 }},
            "sink": {{
                "capacity": 128,
                "destination": {{ "kind": "file", "directory": {dir:?} }},
                "rotation": {{ "kind": "fixed", "name": "engine.log" }}
            }}
        }}"#,
        dir = dir.path().to_string_lossy()
    );
    let cfg = EngineConfig::from_json_str(&json).unwrap();
    let engine = Engine::from_config(&cfg).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));

    let log = engine.log();
    let counter = Arc::clone(&ran);
    engine.scheduler.submit_after(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            log.log("scheduled job ran");
        },
        Duration::from_millis(10),
    );
    let log = engine.log();
    let counter = Arc::clone(&ran);
    engine.pool.post(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        log.log("pool job ran");
    });

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while ran.load(Ordering::SeqCst) < 2 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    engine.shutdown();

    let text = std::fs::read_to_string(dir.path().join("engine.log")).unwrap();
    assert!(text.contains("] scheduled job ran"));
    assert!(text.contains("] pool job ran"));
}

#[test]
fn test_fixed_rotation_config_round_trips_through_json() {
    let cfg = SinkConfig::rotating_files("/tmp/dispatch", 60).with_rotation(RotationConfig::Fixed {
        name: "out.log".into(),
    });
    let json = serde_json::to_string(&cfg).unwrap();
    assert!(json.contains(r#""kind":"fixed""#));
}
