//! Dispatch components: the deadline scheduler, the sharded pool and the
//! asynchronous sink, plus the work-item and statistics types they share.

pub mod deadline;
pub mod error;
pub mod sharded;
pub mod sink;
pub mod stats;
pub mod task;

pub use deadline::DeadlineScheduler;
pub use error::{AppResult, DispatchError};
pub use sharded::ShardedPool;
pub use sink::{
    AsyncSink, BufferedRecord, ConsoleSink, FixedDestination, IntervalRotation, LineSink,
    RotationPolicy, SinkSwitch,
};
pub use stats::DispatchStats;
pub use task::{log_failures, FailureHook, Job, Submission, TaskFailure};
