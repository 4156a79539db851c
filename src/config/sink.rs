//! Asynchronous sink configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default bound on buffered records.
pub const DEFAULT_SINK_CAPACITY: usize = 10_000;

const fn default_capacity() -> usize {
    DEFAULT_SINK_CAPACITY
}

fn default_thread_name() -> String {
    "sink-writer".into()
}

/// Where sink output goes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DestinationConfig {
    /// Synchronous, mutex-guarded writes to stdout.
    Console,
    /// Buffered writes to files inside `directory`, handled by a background thread.
    File {
        /// Directory that rotated files are created in.
        directory: PathBuf,
    },
}

/// When the sink switches to a new destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RotationConfig {
    /// Never rotate; always write to `name`.
    Fixed {
        /// Destination name.
        name: String,
    },
    /// Rotate once at least `secs` seconds passed since the last rotation.
    Interval {
        /// Rotation interval in seconds.
        secs: u64,
    },
}

/// Sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SinkConfig {
    /// Maximum buffered records; newer records are dropped beyond it.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Background writer thread name.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
    /// Output destination.
    pub destination: DestinationConfig,
    /// Rotation policy.
    pub rotation: RotationConfig,
}

impl SinkConfig {
    /// Console sink; rotation is irrelevant for it.
    #[must_use]
    pub fn console() -> Self {
        Self {
            capacity: DEFAULT_SINK_CAPACITY,
            thread_name: default_thread_name(),
            destination: DestinationConfig::Console,
            rotation: RotationConfig::Fixed {
                name: "console".into(),
            },
        }
    }

    /// File sink rotating every `secs` seconds inside `directory`.
    #[must_use]
    pub fn rotating_files(directory: impl Into<PathBuf>, secs: u64) -> Self {
        Self {
            capacity: DEFAULT_SINK_CAPACITY,
            thread_name: default_thread_name(),
            destination: DestinationConfig::File {
                directory: directory.into(),
            },
            rotation: RotationConfig::Interval { secs },
        }
    }

    /// Set the buffered record bound.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the rotation policy.
    #[must_use]
    pub fn with_rotation(mut self, rotation: RotationConfig) -> Self {
        self.rotation = rotation;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.thread_name.trim().is_empty() {
            return Err("thread_name must not be empty".into());
        }
        match &self.rotation {
            RotationConfig::Fixed { name } if name.trim().is_empty() => {
                Err("fixed rotation name must not be empty".into())
            }
            RotationConfig::Interval { secs: 0 } => {
                Err("rotation interval must be greater than 0".into())
            }
            _ => Ok(()),
        }
    }
}
