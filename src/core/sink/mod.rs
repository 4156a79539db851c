//! Asynchronous bounded-queue sink.
//!
//! Producers call [`AsyncSink::submit`], which never blocks: the record is
//! either queued or, when the queue is at capacity, dropped on the spot
//! (drop-newest). One background writer thread drains the queue in batches.
//! At the start of each batch it asks the [`RotationPolicy`] whether to switch
//! destinations; then it appends the records that were queued at that point,
//! timestamped at enqueue time, and flushes. Records arriving mid-batch wait
//! for the next batch, so rotation keeps firing under sustained load.
//!
//! # Shutdown
//!
//! Unlike the deadline scheduler, stopping the sink drains to completion:
//! every record accepted before [`AsyncSink::stop`] is written, the destination
//! is flushed and released, and the writer thread exits.

pub mod rotation;
pub mod switch;

use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::core::stats::DispatchCounters;
use crate::core::task::{join_all, spawn_named};
use crate::core::{DispatchError, DispatchStats, Submission};
use crate::infra::destination::Destination;
use crate::util::clock::{format_record_timestamp, now_local};

pub use rotation::{FixedDestination, IntervalRotation, RotationPolicy};
pub use switch::{ConsoleSink, LineSink, SinkSwitch};

const COMPONENT: &str = "sink";

/// Default writer thread name.
pub const DEFAULT_WRITER_NAME: &str = "sink-writer";

/// A payload waiting to be written, stamped when it was accepted.
#[derive(Debug, Clone)]
pub struct BufferedRecord {
    /// Caller-supplied text.
    pub payload: String,
    /// Local time the record was queued.
    pub enqueued_at: DateTime<Local>,
}

impl BufferedRecord {
    /// Stamp `payload` with the current time.
    #[must_use]
    pub fn now(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            enqueued_at: now_local(),
        }
    }

    /// The line written for this record, without the trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "[{}] {}",
            format_record_timestamp(&self.enqueued_at),
            self.payload
        )
    }
}

/// Non-blocking, bounded, single-writer record sink.
///
/// Dropping the sink performs [`AsyncSink::stop`].
pub struct AsyncSink {
    capacity: usize,
    tx: Mutex<Option<Sender<BufferedRecord>>>,
    counters: Arc<DispatchCounters>,
    stopped: AtomicBool,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncSink {
    /// Start a sink buffering at most `capacity` records.
    ///
    /// The first destination is opened immediately, named by `policy`.
    ///
    /// # Errors
    ///
    /// - `DispatchError::InvalidConfig` if `capacity` is zero
    /// - `DispatchError::Destination` if the first destination cannot be opened
    /// - `DispatchError::Spawn` if the writer thread cannot be started
    pub fn new<R, D>(capacity: usize, policy: R, destination: D) -> Result<Self, DispatchError>
    where
        R: RotationPolicy,
        D: Destination,
    {
        Self::with_thread_name(capacity, DEFAULT_WRITER_NAME, policy, destination)
    }

    /// Same as [`AsyncSink::new`] with a custom writer thread name.
    ///
    /// # Errors
    ///
    /// Same as [`AsyncSink::new`].
    pub fn with_thread_name<R, D>(
        capacity: usize,
        thread_name: impl Into<String>,
        mut policy: R,
        mut destination: D,
    ) -> Result<Self, DispatchError>
    where
        R: RotationPolicy,
        D: Destination,
    {
        if capacity == 0 {
            return Err(DispatchError::InvalidConfig(
                "capacity must be greater than 0".into(),
            ));
        }

        let name = policy.next_destination_name();
        let handle = destination
            .open(&name)
            .map_err(|source| DispatchError::Destination {
                name: name.clone(),
                source,
            })?;

        let (tx, rx) = bounded::<BufferedRecord>(capacity);
        let counters = Arc::new(DispatchCounters::default());
        let writer = Writer {
            policy: Box::new(policy),
            destination: Box::new(destination),
            current: BufWriter::new(handle),
            current_name: name,
            counters: Arc::clone(&counters),
        };
        let join = spawn_named(COMPONENT, thread_name.into(), None, move || writer.run(&rx))?;

        info!(capacity = capacity, "AsyncSink started");
        Ok(Self {
            capacity,
            tx: Mutex::new(Some(tx)),
            counters,
            stopped: AtomicBool::new(false),
            writer: Mutex::new(Some(join)),
        })
    }

    /// Maximum number of buffered records.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue `payload` for writing without blocking.
    ///
    /// Returns `Submission::Dropped` when the queue is full and
    /// `Submission::Ignored` once the sink is stopping.
    pub fn submit(&self, payload: impl Into<String>) -> Submission {
        if self.stopped.load(Ordering::Acquire) {
            return self.ignore();
        }

        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            return self.ignore();
        };

        match tx.try_send(BufferedRecord::now(payload)) {
            Ok(()) => {
                DispatchCounters::bump(&self.counters.submitted);
                Submission::Accepted
            }
            Err(TrySendError::Full(_)) => {
                DispatchCounters::bump(&self.counters.dropped);
                debug!(capacity = self.capacity, "sink queue full; record dropped");
                Submission::Dropped
            }
            Err(TrySendError::Disconnected(_)) => self.ignore(),
        }
    }

    fn ignore(&self) -> Submission {
        DispatchCounters::bump(&self.counters.ignored);
        Submission::Ignored
    }

    /// Get current sink statistics. `completed` counts written records.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot(1)
    }

    /// Stop accepting records, write everything queued, and join the writer.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("Stopping async sink");
        // The writer drains the remaining records, then sees the disconnect.
        self.tx.lock().take();
        if let Some(join) = self.writer.lock().take() {
            join_all(COMPONENT, vec![join]);
        }
        info!("Async sink stopped");
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State confined to the writer thread.
struct Writer {
    policy: Box<dyn RotationPolicy>,
    destination: Box<dyn Destination>,
    current: BufWriter<Box<dyn Write + Send>>,
    current_name: String,
    counters: Arc<DispatchCounters>,
}

impl Writer {
    fn run(mut self, rx: &Receiver<BufferedRecord>) {
        debug!(destination = %self.current_name, "Sink writer started");
        while let Ok(first) = rx.recv() {
            if self.policy.should_rotate() {
                self.rotate();
            }
            self.write(&first);
            // Bounded by the backlog at batch start; later records wait for
            // the next batch and its rotation check.
            let backlog = rx.len();
            for record in rx.try_iter().take(backlog) {
                self.write(&record);
            }
            self.flush();
        }
        self.flush();
        debug!(destination = %self.current_name, "Sink writer exiting");
    }

    fn rotate(&mut self) {
        let name = self.policy.next_destination_name();
        match self.destination.open(&name) {
            Ok(handle) => {
                self.flush();
                self.current = BufWriter::new(handle);
                info!(from = %self.current_name, to = %name, "sink rotated");
                self.current_name = name;
                DispatchCounters::bump(&self.counters.rotations);
            }
            Err(e) => {
                error!(
                    destination = %name,
                    error = %e,
                    "failed to open rotated destination; keeping current"
                );
            }
        }
    }

    fn write(&mut self, record: &BufferedRecord) {
        match writeln!(self.current, "{}", record.render()) {
            Ok(()) => DispatchCounters::bump(&self.counters.completed),
            Err(e) => {
                DispatchCounters::bump(&self.counters.failed);
                error!(destination = %self.current_name, error = %e, "failed to write record");
            }
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.current.flush() {
            error!(destination = %self.current_name, error = %e, "failed to flush destination");
        }
    }
}
