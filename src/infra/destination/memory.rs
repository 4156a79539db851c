//! In-memory destination for development and testing.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Destination;

type Buffers = Arc<Mutex<Vec<(String, Arc<Mutex<Vec<u8>>>)>>>;

/// Records every opened destination as a named byte buffer.
///
/// Clones share the same buffers, so a test can keep one clone for inspection
/// and move the other into the sink.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    opened: Buffers,
}

impl MemoryDestination {
    /// Create an empty destination set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names passed to `open`, in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.opened.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Everything written to destinations called `name`, concatenated in open order.
    #[must_use]
    pub fn contents(&self, name: &str) -> Option<String> {
        let opened = self.opened.lock();
        let mut found = false;
        let mut bytes = Vec::new();
        for (opened_name, buf) in opened.iter() {
            if opened_name == name {
                found = true;
                bytes.extend_from_slice(&buf.lock());
            }
        }
        found.then(|| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Every line written to any destination, in open order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.opened
            .lock()
            .iter()
            .flat_map(|(_, buf)| {
                String::from_utf8_lossy(&buf.lock())
                    .lines()
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl Destination for MemoryDestination {
    fn open(&mut self, name: &str) -> io::Result<Box<dyn Write + Send>> {
        let buf = Arc::new(Mutex::new(Vec::new()));
        self.opened.lock().push((name.to_string(), Arc::clone(&buf)));
        Ok(Box::new(MemoryWriter { buf }))
    }
}

struct MemoryWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
