//! Deadline-ordered task scheduler.
//!
//! A single min-heap of pending jobs keyed by target execution time, shared by
//! N worker threads under one `parking_lot::Mutex`. Workers compete for the
//! earliest-due entry:
//!
//! - **Empty heap**: wait on the condvar until a submission or shutdown.
//! - **Head is due**: pop it and run it outside the lock.
//! - **Head not yet due**: `wait_until` its deadline; a new (possibly earlier)
//!   submission or shutdown wakes the worker early and it re-evaluates.
//!
//! # Shutdown
//!
//! Shutdown does not drain. A worker that sees shutdown while the head entry is
//! still in the future exits without running it; entries that were already due
//! keep running until the heap head is in the future or the heap is empty.
//! Whatever is left once every worker has exited is dropped and counted as
//! `discarded`.
//!
//! ```rust,ignore
//! use prometheus_dispatch::config::SchedulerConfig;
//! use prometheus_dispatch::core::DeadlineScheduler;
//! use std::time::Duration;
//!
//! let scheduler = DeadlineScheduler::new(SchedulerConfig::new().with_worker_count(3))?;
//! scheduler.submit(|| println!("now"));
//! scheduler.submit_after(|| println!("later"), Duration::from_secs(1));
//! scheduler.shutdown();
//! ```

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::core::stats::DispatchCounters;
use crate::core::task::{join_all, log_failures, run_guarded, spawn_named};
use crate::core::{DispatchError, DispatchStats, FailureHook, Job, Submission};

const COMPONENT: &str = "deadline";

/// Heap entry ordered by `(due, seq)`, earliest first.
struct Entry {
    due: Instant,
    seq: u64,
    job: Job,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct HeapState {
    entries: BinaryHeap<Entry>,
    next_seq: u64,
    shutdown: bool,
}

struct Shared {
    state: Mutex<HeapState>,
    wakeup: Condvar,
    counters: DispatchCounters,
    hook: FailureHook,
}

/// Multi-worker scheduler that runs jobs in deadline order.
///
/// Dropping the scheduler performs [`DeadlineScheduler::shutdown`].
pub struct DeadlineScheduler {
    config: SchedulerConfig,
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl DeadlineScheduler {
    /// Start a scheduler whose job panics are logged through `tracing`.
    ///
    /// # Errors
    ///
    /// - `DispatchError::InvalidConfig` if the configuration is invalid
    /// - `DispatchError::Spawn` if a worker thread cannot be started
    pub fn new(config: SchedulerConfig) -> Result<Self, DispatchError> {
        Self::with_failure_hook(config, log_failures())
    }

    /// Start a scheduler that reports job panics to `hook`.
    ///
    /// # Errors
    ///
    /// Same as [`DeadlineScheduler::new`].
    pub fn with_failure_hook(
        config: SchedulerConfig,
        hook: FailureHook,
    ) -> Result<Self, DispatchError> {
        config.validate().map_err(DispatchError::InvalidConfig)?;

        let shared = Arc::new(Shared {
            state: Mutex::new(HeapState {
                entries: BinaryHeap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
            counters: DispatchCounters::default(),
            hook,
        });

        let scheduler = Self {
            workers: Mutex::new(Vec::with_capacity(config.worker_count)),
            config,
            shared,
            stopped: AtomicBool::new(false),
        };

        // On a spawn failure the early return drops `scheduler`, which joins
        // the workers already started.
        for worker_id in 0..scheduler.config.worker_count {
            let shared = Arc::clone(&scheduler.shared);
            let handle = spawn_named(
                COMPONENT,
                format!("{}-{worker_id}", scheduler.config.thread_name_prefix),
                Some(scheduler.config.thread_stack_size),
                move || worker_loop(worker_id, &shared),
            )?;
            scheduler.workers.lock().push(handle);
        }

        info!(
            worker_count = scheduler.config.worker_count,
            "DeadlineScheduler started"
        );
        Ok(scheduler)
    }

    /// Queue `job` for immediate eligibility.
    pub fn submit<F>(&self, job: F) -> Submission
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_at(job, Instant::now())
    }

    /// Queue `job` to run once `delay` has elapsed.
    pub fn submit_after<F>(&self, job: F, delay: Duration) -> Submission
    where
        F: FnOnce() + Send + 'static,
    {
        let now = Instant::now();
        // An overflowing delay means "never due"; keep it far in the future.
        let due = now
            .checked_add(delay)
            .unwrap_or_else(|| now + Duration::from_secs(u64::from(u32::MAX)));
        self.submit_at(job, due)
    }

    /// Queue `job` to run at `due`. Instants in the past are due immediately.
    pub fn submit_at<F>(&self, job: F, due: Instant) -> Submission
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            if state.shutdown {
                DispatchCounters::bump(&self.shared.counters.ignored);
                debug!("submission after shutdown ignored");
                return Submission::Ignored;
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            state.entries.push(Entry {
                due,
                seq,
                job: Box::new(job),
            });
        }
        DispatchCounters::bump(&self.shared.counters.submitted);
        self.shared.wakeup.notify_one();
        Submission::Accepted
    }

    /// Number of entries waiting in the heap.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// Get current scheduler statistics.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.shared.counters.snapshot(self.config.worker_count)
    }

    /// Stop the scheduler and join every worker.
    ///
    /// Further submissions are ignored. Entries that are due when a worker
    /// wakes still run; entries whose deadline has not arrived are discarded.
    /// Blocks for at most the longest job currently executing.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("Shutting down deadline scheduler");
        self.shared.state.lock().shutdown = true;
        self.shared.wakeup.notify_all();

        let handles = std::mem::take(&mut *self.workers.lock());
        join_all(COMPONENT, handles);

        let leftover = {
            let mut state = self.shared.state.lock();
            std::mem::take(&mut state.entries)
        };
        if !leftover.is_empty() {
            self.shared
                .counters
                .discarded
                .fetch_add(leftover.len() as u64, Ordering::Relaxed);
            warn!(discarded = leftover.len(), "pending entries discarded at shutdown");
        }
        // Jobs are dropped outside the lock; their destructors may be arbitrary.
        drop(leftover);

        info!("Deadline scheduler shut down complete");
    }
}

impl Drop for DeadlineScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Take the next due job, or `None` when the worker should exit.
fn next_job(shared: &Shared) -> Option<Job> {
    let mut state = shared.state.lock();
    loop {
        let Some(head_due) = state.entries.peek().map(|e| e.due) else {
            if state.shutdown {
                return None;
            }
            shared.wakeup.wait(&mut state);
            continue;
        };

        if head_due <= Instant::now() {
            return state.entries.pop().map(|e| e.job);
        }
        if state.shutdown {
            return None;
        }
        // Woken early by a new submission or shutdown; either way re-evaluate.
        let _ = shared.wakeup.wait_until(&mut state, head_due);
    }
}

fn worker_loop(worker_id: usize, shared: &Shared) {
    debug!(worker_id = worker_id, "Deadline worker started");
    while let Some(job) = next_job(shared) {
        let ok = run_guarded(job, COMPONENT, worker_id, &shared.hook);
        shared.counters.record_run(ok);
    }
    debug!(worker_id = worker_id, "Deadline worker exiting");
}
