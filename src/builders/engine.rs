//! Composition root: builds every component from an [`EngineConfig`].
//!
//! The application owns the returned [`Engine`] and passes its
//! [`SinkSwitch`] by reference (or `Arc`) to whatever needs to log; there is
//! no process-wide logger.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::config::{DestinationConfig, EngineConfig, RotationConfig, SinkConfig};
use crate::core::{
    AppResult, AsyncSink, ConsoleSink, DeadlineScheduler, DispatchError, FixedDestination,
    IntervalRotation, LineSink, ShardedPool, SinkSwitch,
};
use crate::infra::FileDestination;

/// Build the line sink described by `cfg`.
///
/// # Errors
///
/// - `DispatchError::InvalidConfig` if the configuration is invalid
/// - `DispatchError::Destination` / `DispatchError::Spawn` from the async sink
pub fn build_sink(cfg: &SinkConfig) -> Result<Arc<dyn LineSink>, DispatchError> {
    cfg.validate().map_err(DispatchError::InvalidConfig)?;

    match &cfg.destination {
        DestinationConfig::Console => Ok(Arc::new(ConsoleSink::stdout())),
        DestinationConfig::File { directory } => {
            let destination = FileDestination::new(directory.clone());
            let sink = match &cfg.rotation {
                RotationConfig::Fixed { name } => AsyncSink::with_thread_name(
                    cfg.capacity,
                    cfg.thread_name.clone(),
                    FixedDestination::new(name.clone()),
                    destination,
                )?,
                RotationConfig::Interval { secs } => AsyncSink::with_thread_name(
                    cfg.capacity,
                    cfg.thread_name.clone(),
                    IntervalRotation::new(Duration::from_secs(*secs)),
                    destination,
                )?,
            };
            Ok(Arc::new(sink))
        }
    }
}

/// Every dispatch component, wired together and owned in one place.
pub struct Engine {
    /// Deadline-ordered scheduler.
    pub scheduler: DeadlineScheduler,
    /// Round-robin sharded pool.
    pub pool: ShardedPool,
    log: Arc<SinkSwitch>,
}

impl Engine {
    /// Validate `cfg` and start every component.
    ///
    /// # Errors
    ///
    /// Returns the first component that failed to start, with context.
    pub fn from_config(cfg: &EngineConfig) -> AppResult<Self> {
        cfg.validate()
            .map_err(DispatchError::InvalidConfig)
            .context("engine configuration rejected")?;

        let sink = match &cfg.sink {
            Some(sink_cfg) => build_sink(sink_cfg).context("failed to build sink")?,
            None => Arc::new(ConsoleSink::stdout()),
        };
        let scheduler = DeadlineScheduler::new(cfg.scheduler.clone())
            .context("failed to start deadline scheduler")?;
        let pool = ShardedPool::new(cfg.pool.clone()).context("failed to start sharded pool")?;

        info!(
            workers = cfg.scheduler.worker_count,
            loops = cfg.pool.loop_count,
            "Engine started"
        );
        Ok(Self {
            scheduler,
            pool,
            log: Arc::new(SinkSwitch::new(sink)),
        })
    }

    /// Shared handle to the swappable log sink.
    #[must_use]
    pub fn log(&self) -> Arc<SinkSwitch> {
        Arc::clone(&self.log)
    }

    /// Stop the scheduler and pool, then release the sink.
    ///
    /// The sink is flushed once the last handle to it is dropped, so jobs that
    /// logged while the pools wound down still reach it.
    pub fn shutdown(self) {
        self.scheduler.shutdown();
        self.pool.stop();
        drop(self.log);
        info!("Engine shut down");
    }
}
