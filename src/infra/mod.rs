//! Infrastructure adapters: the byte sinks records are persisted into.

pub mod destination;

pub use destination::{Destination, FileDestination, MemoryDestination};
