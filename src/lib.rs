//! # Prometheus Dispatch
//!
//! Thread-based dispatch primitives for services that need to run work later,
//! run it on a fixed set of threads, or write it out without blocking.
//!
//! ## Components
//!
//! - **`DeadlineScheduler`**: a min-heap of jobs keyed by due time, drained by a
//!   fixed set of workers that always take the earliest-due entry. Ties run in
//!   submission order. Shutdown discards work that is not yet due.
//! - **`ShardedPool`**: N independent execution loops, each with its own FIFO
//!   queue and thread. Posts are distributed round-robin; stopping drains every
//!   queue.
//! - **`AsyncSink`**: a bounded queue in front of a single writer thread.
//!   Submissions never block; when the queue is full the newest record is
//!   dropped. A `RotationPolicy` decides when the writer switches destinations.
//!
//! A panicking job never takes down a worker: the panic is caught, counted and
//! reported through a `FailureHook`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use prometheus_dispatch::config::SchedulerConfig;
//! use prometheus_dispatch::core::DeadlineScheduler;
//!
//! let scheduler = DeadlineScheduler::new(SchedulerConfig::new().with_worker_count(2))?;
//! scheduler.submit_after(|| println!("later"), Duration::from_millis(50));
//! scheduler.submit(|| println!("now"));
//! scheduler.shutdown();
//! ```
//!
//! ## Composition
//!
//! `builders::Engine::from_config` starts all three components from an
//! `EngineConfig` (JSON or environment), and exposes the log through a
//! `SinkSwitch` owned by the engine rather than a global.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Scheduler, pool and sink components.
pub mod core;
/// Configuration models for the scheduler, pool, sink and engine.
pub mod config;
/// Builders to construct components from configuration.
pub mod builders;
/// Infrastructure adapters for sink destinations.
pub mod infra;
/// Shared utilities.
pub mod util;
