//! Rotation policies deciding when an [`AsyncSink`](super::AsyncSink) switches
//! destinations.
//!
//! A policy is owned and called only by the sink's background writer thread,
//! so implementations keep plain mutable state without locking.

use std::time::{Duration, Instant};

use crate::util::clock::{destination_name_at, now_local};

/// Pluggable rotation decision.
pub trait RotationPolicy: Send + 'static {
    /// Whether the sink should open a new destination before the next batch.
    fn should_rotate(&mut self) -> bool;

    /// Name of the destination to open next.
    fn next_destination_name(&mut self) -> String;
}

/// Rotate once at least `interval` elapsed since the previous rotation.
///
/// Names follow `log_%Y%m%d_%H%M%S.txt` in local time.
#[derive(Debug, Clone)]
pub struct IntervalRotation {
    interval: Duration,
    last_rotation: Instant,
}

impl IntervalRotation {
    /// Create a policy rotating every `interval`, counted from now.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_rotation: Instant::now(),
        }
    }

    /// Configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl RotationPolicy for IntervalRotation {
    fn should_rotate(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_rotation) >= self.interval {
            self.last_rotation = now;
            return true;
        }
        false
    }

    fn next_destination_name(&mut self) -> String {
        destination_name_at(&now_local())
    }
}

/// Never rotate; every open uses the same name.
#[derive(Debug, Clone)]
pub struct FixedDestination {
    name: String,
}

impl FixedDestination {
    /// Always write to `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl RotationPolicy for FixedDestination {
    fn should_rotate(&mut self) -> bool {
        false
    }

    fn next_destination_name(&mut self) -> String {
        self.name.clone()
    }
}
