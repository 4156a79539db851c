//! Configuration models for schedulers, pools and sinks.

pub mod engine;
pub mod pool;
pub mod sink;

pub use engine::EngineConfig;
pub use pool::{SchedulerConfig, ShardedPoolConfig, DEFAULT_STACK_SIZE};
pub use sink::{DestinationConfig, RotationConfig, SinkConfig, DEFAULT_SINK_CAPACITY};
