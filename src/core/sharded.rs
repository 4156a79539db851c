//! Sharded worker pool: a fixed set of independent single-queue event loops.
//!
//! Each loop owns one unbounded channel and one OS thread. `post` hands jobs
//! out round-robin, so loops never contend with each other; the price is
//! coarse balancing (no stealing between loops).
//!
//! # Design
//!
//! - **No polling**: loops block on `recv` until a job arrives
//! - **Clean shutdown**: dropping a loop's sender lets it finish what is
//!   already queued, after which `recv` fails and the thread exits
//! - **Per-loop FIFO**: a job posted to loop *i* runs on loop *i*'s thread,
//!   after every job posted to loop *i* before it

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::ShardedPoolConfig;
use crate::core::stats::DispatchCounters;
use crate::core::task::{join_all, log_failures, run_guarded, spawn_named};
use crate::core::{DispatchError, DispatchStats, FailureHook, Job, Submission};

const COMPONENT: &str = "sharded";

/// Fixed-size pool of event loops fed round-robin.
///
/// Dropping the pool performs [`ShardedPool::stop`].
pub struct ShardedPool {
    config: ShardedPoolConfig,
    /// One sender per loop. `None` once the pool is stopped.
    senders: Vec<Mutex<Option<Sender<Job>>>>,
    next_loop: AtomicUsize,
    counters: Arc<DispatchCounters>,
    stopped: AtomicBool,
    loops: Mutex<Vec<JoinHandle<()>>>,
}

impl ShardedPool {
    /// Start `config.loop_count` loops whose job panics are logged.
    ///
    /// # Errors
    ///
    /// - `DispatchError::InvalidConfig` if the configuration is invalid
    /// - `DispatchError::Spawn` if a loop thread cannot be started
    pub fn new(config: ShardedPoolConfig) -> Result<Self, DispatchError> {
        Self::with_failure_hook(config, log_failures())
    }

    /// Start the loops, reporting job panics to `hook`.
    ///
    /// # Errors
    ///
    /// Same as [`ShardedPool::new`].
    pub fn with_failure_hook(
        config: ShardedPoolConfig,
        hook: FailureHook,
    ) -> Result<Self, DispatchError> {
        config.validate().map_err(DispatchError::InvalidConfig)?;

        let counters = Arc::new(DispatchCounters::default());
        let mut senders = Vec::with_capacity(config.loop_count);
        let mut receivers = Vec::with_capacity(config.loop_count);
        for _ in 0..config.loop_count {
            let (tx, rx) = unbounded::<Job>();
            senders.push(Mutex::new(Some(tx)));
            receivers.push(rx);
        }

        let pool = Self {
            loops: Mutex::new(Vec::with_capacity(config.loop_count)),
            config,
            senders,
            next_loop: AtomicUsize::new(0),
            counters,
            stopped: AtomicBool::new(false),
        };

        for (loop_id, rx) in receivers.into_iter().enumerate() {
            let counters = Arc::clone(&pool.counters);
            let hook = Arc::clone(&hook);
            let handle = spawn_named(
                COMPONENT,
                format!("{}-{loop_id}", pool.config.thread_name_prefix),
                Some(pool.config.thread_stack_size),
                move || run_loop(loop_id, &rx, &counters, &hook),
            )?;
            pool.loops.lock().push(handle);
        }

        info!(loop_count = pool.config.loop_count, "ShardedPool started");
        Ok(pool)
    }

    /// Number of event loops.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.senders.len()
    }

    /// Hand `job` to the next loop in round-robin order.
    ///
    /// The first post goes to loop 0, the next to loop 1, wrapping at
    /// [`ShardedPool::loop_count`].
    pub fn post<F>(&self, job: F) -> Submission
    where
        F: FnOnce() + Send + 'static,
    {
        if self.stopped.load(Ordering::Acquire) {
            return self.ignore();
        }

        let guard = self.senders[self.next_loop_id()].lock();
        let Some(tx) = guard.as_ref() else {
            return self.ignore();
        };

        match tx.send(Box::new(job)) {
            Ok(()) => {
                DispatchCounters::bump(&self.counters.submitted);
                Submission::Accepted
            }
            Err(_) => self.ignore(),
        }
    }

    /// Advance the cursor to `(previous + 1) % loop_count`, returning `previous`.
    ///
    /// The cursor never leaves `0..loop_count`, so it cannot wrap.
    fn next_loop_id(&self) -> usize {
        let loops = self.senders.len();
        self.next_loop
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some((i + 1) % loops))
            .unwrap_or_else(|current| current)
    }

    fn ignore(&self) -> Submission {
        DispatchCounters::bump(&self.counters.ignored);
        debug!("post after stop ignored");
        Submission::Ignored
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot(self.senders.len())
    }

    /// Stop every loop and wait for them to finish.
    ///
    /// Each loop runs the jobs already in its queue, then exits. Posts made
    /// after this call are ignored.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("Stopping sharded pool");
        for sender in &self.senders {
            // Dropping the sender disconnects the loop once its queue is empty.
            sender.lock().take();
        }

        let handles = std::mem::take(&mut *self.loops.lock());
        let loop_count = handles.len();
        join_all(COMPONENT, handles);
        info!(loop_count = loop_count, "Sharded pool stopped");
    }
}

impl Drop for ShardedPool {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    loop_id: usize,
    rx: &Receiver<Job>,
    counters: &DispatchCounters,
    hook: &FailureHook,
) {
    debug!(loop_id = loop_id, "Event loop started");
    // Blocking recv; returns Err only once the sender is gone and the queue is empty.
    while let Ok(job) = rx.recv() {
        let ok = run_guarded(job, COMPONENT, loop_id, hook);
        counters.record_run(ok);
    }
    debug!(loop_id = loop_id, "Event loop exiting");
}
