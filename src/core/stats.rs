//! Lock-free counters shared by the dispatch components.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics about a component's throughput and losses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Number of worker threads or loops.
    pub workers: usize,
    /// Items accepted into the queue.
    pub submitted: u64,
    /// Items that ran (or records written) successfully.
    pub completed: u64,
    /// Items that panicked (or records that failed to write).
    pub failed: u64,
    /// Items handed in after shutdown began.
    pub ignored: u64,
    /// Not-yet-due items thrown away at scheduler shutdown.
    pub discarded: u64,
    /// Items rejected because the bounded queue was full.
    pub dropped: u64,
    /// Destination switches performed by a sink.
    pub rotations: u64,
}

impl DispatchStats {
    /// Items accepted but not yet accounted for by any terminal counter.
    #[must_use]
    pub const fn in_flight(&self) -> u64 {
        self.submitted
            .saturating_sub(self.completed + self.failed + self.discarded)
    }
}

/// Internal counters (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub ignored: AtomicU64,
    pub discarded: AtomicU64,
    pub dropped: AtomicU64,
    pub rotations: AtomicU64,
}

impl DispatchCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one guarded execution.
    pub fn record_run(&self, ok: bool) {
        if ok {
            Self::bump(&self.completed);
        } else {
            Self::bump(&self.failed);
        }
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, workers: usize) -> DispatchStats {
        DispatchStats {
            workers,
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
        }
    }
}
