//! Builders that turn configuration into running components.

pub mod engine;

pub use engine::{build_sink, Engine};
