//! Runtime-swappable line sinks owned by the application's composition root.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::AsyncSink;

/// Anything that accepts one line of text at a time.
pub trait LineSink: Send + Sync {
    /// Deliver `line`. Must not block on I/O longer than a short lock.
    fn log(&self, line: &str);
}

impl LineSink for AsyncSink {
    fn log(&self, line: &str) {
        // Overflow and late submissions are policy outcomes, not errors.
        let _ = self.submit(line);
    }
}

/// Synchronous writer that keeps each line intact under a mutex.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Write to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Write to an arbitrary writer.
    #[must_use]
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl LineSink for ConsoleSink {
    fn log(&self, line: &str) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "[Console] {line}");
    }
}

/// Holds the current sink and lets it be replaced while other threads log.
///
/// `log` takes a snapshot of the current sink under a read lock and forwards
/// outside it, so a concurrent [`SinkSwitch::set`] never waits on I/O.
pub struct SinkSwitch {
    current: RwLock<Arc<dyn LineSink>>,
}

impl SinkSwitch {
    /// Start with `initial`.
    #[must_use]
    pub fn new(initial: Arc<dyn LineSink>) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Replace the current sink, returning the previous one.
    pub fn set(&self, sink: Arc<dyn LineSink>) -> Arc<dyn LineSink> {
        std::mem::replace(&mut *self.current.write(), sink)
    }

    /// The sink currently receiving lines.
    #[must_use]
    pub fn current(&self) -> Arc<dyn LineSink> {
        Arc::clone(&*self.current.read())
    }

    /// Forward `line` to the current sink.
    pub fn log(&self, line: &str) {
        self.current().log(line);
    }
}
