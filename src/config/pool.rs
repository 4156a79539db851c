//! Worker pool configuration structures.

use serde::{Deserialize, Serialize};

/// Default stack size for worker threads (2 MiB).
pub const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_scheduler_prefix() -> String {
    "dl-worker".into()
}

fn default_loop_prefix() -> String {
    "event-loop".into()
}

const fn default_stack_size() -> usize {
    DEFAULT_STACK_SIZE
}

/// Configuration for the deadline-ordered scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Number of worker threads competing for the earliest-due entry.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Worker thread name prefix; threads are named `{prefix}-{id}`.
    #[serde(default = "default_scheduler_prefix")]
    pub thread_name_prefix: String,
    /// Stack size for each worker thread in bytes.
    #[serde(default = "default_stack_size")]
    pub thread_stack_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            thread_name_prefix: default_scheduler_prefix(),
            thread_stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration with one worker per CPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, size: usize) -> Self {
        self.thread_stack_size = size;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        validate_thread_settings(&self.thread_name_prefix, self.thread_stack_size)
    }
}

/// Configuration for the sharded worker pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShardedPoolConfig {
    /// Number of independent execution loops.
    #[serde(default = "default_worker_count")]
    pub loop_count: usize,
    /// Loop thread name prefix; threads are named `{prefix}-{id}`.
    #[serde(default = "default_loop_prefix")]
    pub thread_name_prefix: String,
    /// Stack size for each loop thread in bytes.
    #[serde(default = "default_stack_size")]
    pub thread_stack_size: usize,
}

impl Default for ShardedPoolConfig {
    fn default() -> Self {
        Self {
            loop_count: default_worker_count(),
            thread_name_prefix: default_loop_prefix(),
            thread_stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl ShardedPoolConfig {
    /// Create a configuration with one loop per CPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of execution loops.
    #[must_use]
    pub const fn with_loop_count(mut self, loop_count: usize) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Set the loop thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the loop thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, size: usize) -> Self {
        self.thread_stack_size = size;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.loop_count == 0 {
            return Err("loop_count must be greater than 0".into());
        }
        validate_thread_settings(&self.thread_name_prefix, self.thread_stack_size)
    }
}

pub(crate) fn validate_thread_settings(prefix: &str, stack_size: usize) -> Result<(), String> {
    if prefix.trim().is_empty() {
        return Err("thread_name_prefix must not be empty".into());
    }
    if stack_size < 64 * 1024 {
        return Err("thread_stack_size must be at least 64 KiB".into());
    }
    Ok(())
}
