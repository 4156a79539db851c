//! Integration tests for ShardedPool
//!
//! These tests validate:
//! - Round-robin distribution across loops
//! - FIFO execution within a single loop
//! - Draining of queued work on stop
//! - Panic isolation per loop

use parking_lot::Mutex;
use prometheus_dispatch::config::ShardedPoolConfig;
use prometheus_dispatch::core::{FailureHook, ShardedPool, Submission, TaskFailure};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn pool(loops: usize) -> ShardedPool {
    ShardedPool::new(
        ShardedPoolConfig::new()
            .with_loop_count(loops)
            .with_thread_name_prefix("shard"),
    )
    .unwrap()
}

fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn test_per_loop_fifo_and_round_robin() {
    const LOOPS: usize = 4;
    const POSTS: usize = 400;
    let pool = pool(LOOPS);
    let seen: Arc<Mutex<HashMap<String, Vec<usize>>>> = Arc::new(Mutex::new(HashMap::new()));

    for i in 0..POSTS {
        let seen = Arc::clone(&seen);
        let result = pool.post(move || {
            let name = thread::current().name().unwrap_or_default().to_string();
            seen.lock().entry(name).or_default().push(i);
        });
        assert_eq!(result, Submission::Accepted);
    }
    pool.stop();

    let seen = seen.lock();
    assert_eq!(seen.len(), LOOPS);
    for loop_id in 0..LOOPS {
        let items = &seen[&format!("shard-{loop_id}")];
        let expected: Vec<usize> = (loop_id..POSTS).step_by(LOOPS).collect();
        assert_eq!(items, &expected, "loop {loop_id} ran out of order");
    }
}

#[test]
fn test_stop_drains_queued_work() {
    let pool = pool(2);
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..50 {
        let done = Arc::clone(&done);
        pool.post(move || {
            thread::sleep(Duration::from_millis(1));
            done.fetch_add(1, Ordering::SeqCst);
        });
    }
    pool.stop();

    assert_eq!(done.load(Ordering::SeqCst), 50);
    let stats = pool.stats();
    assert_eq!(stats.completed, 50);
    assert_eq!(stats.in_flight(), 0);
    assert_eq!(pool.post(|| {}), Submission::Ignored);
    assert_eq!(pool.stats().ignored, 1);
}

#[test]
fn test_single_loop_is_serial() {
    let pool = pool(1);
    let active = Arc::new(AtomicUsize::new(0));
    let overlap = Arc::new(AtomicUsize::new(0));

    for _ in 0..20 {
        let active = Arc::clone(&active);
        let overlap = Arc::clone(&overlap);
        pool.post(move || {
            if active.fetch_add(1, Ordering::SeqCst) > 0 {
                overlap.fetch_add(1, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(1));
            active.fetch_sub(1, Ordering::SeqCst);
        });
    }
    pool.stop();

    assert_eq!(overlap.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panic_isolated_to_job() {
    let failures = Arc::new(Mutex::new(Vec::<TaskFailure>::new()));
    let sink = Arc::clone(&failures);
    let hook: FailureHook = Arc::new(move |f: &TaskFailure| sink.lock().push(f.clone()));
    let pool = ShardedPool::with_failure_hook(ShardedPoolConfig::new().with_loop_count(1), hook)
        .unwrap();
    let after = Arc::new(AtomicUsize::new(0));

    pool.post(|| panic!("loop job failed"));
    let counter = Arc::clone(&after);
    pool.post(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(wait_for(Duration::from_secs(2), || after.load(Ordering::SeqCst) == 1));
    pool.stop();

    let failures = failures.lock();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].component, "sharded");
    assert_eq!(failures[0].worker_id, 0);
    assert_eq!(pool.stats().failed, 1);
    assert_eq!(pool.stats().completed, 1);
}

#[test]
fn test_stop_from_inside_job_does_not_deadlock() {
    let pool = Arc::new(pool(2));
    let inner = Arc::clone(&pool);
    let stopped = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&stopped);

    pool.post(move || {
        inner.stop();
        flag.fetch_add(1, Ordering::SeqCst);
    });

    assert!(wait_for(Duration::from_secs(2), || stopped.load(Ordering::SeqCst) == 1));
    assert_eq!(pool.post(|| {}), Submission::Ignored);
}
