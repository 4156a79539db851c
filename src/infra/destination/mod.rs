//! Byte sinks the asynchronous sink writes records into.

pub mod file;
pub mod memory;

use std::io::{self, Write};

pub use file::FileDestination;
pub use memory::MemoryDestination;

/// Opens named byte sinks on behalf of the sink's writer thread.
///
/// Only the writer thread calls `open`, once at construction and once per
/// rotation.
pub trait Destination: Send + 'static {
    /// Open (or create) the destination called `name` for appending.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while opening.
    fn open(&mut self, name: &str) -> io::Result<Box<dyn Write + Send>>;
}
