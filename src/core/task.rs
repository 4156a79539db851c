//! Work items, submission outcomes and the guarded execution path shared by
//! every dispatch component.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use crate::core::DispatchError;

/// An opaque unit of deferred work.
///
/// Ownership moves from the submitting caller into the queue entry, then to the
/// worker that dequeues it. The job is dropped once it has run, whether it
/// returned or panicked.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of handing work to a component.
///
/// None of these are errors: callers racing shutdown or overload simply learn
/// what happened to their item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The item was queued and will be considered for execution.
    Accepted,
    /// The component is shutting down; the item was discarded.
    Ignored,
    /// The bounded queue was full; the item was dropped.
    Dropped,
}

impl Submission {
    /// Whether the item made it into the queue.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Description of a job that panicked while executing.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    /// Component the job ran on (`"deadline"`, `"sharded"`).
    pub component: &'static str,
    /// Index of the worker thread or loop that ran the job.
    pub worker_id: usize,
    /// Panic message, when the payload was a string.
    pub message: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} worker {} job panicked: {}",
            self.component, self.worker_id, self.message
        )
    }
}

/// Callback invoked on the worker thread whenever a job panics.
pub type FailureHook = Arc<dyn Fn(&TaskFailure) + Send + Sync>;

/// Default hook: report the failure through `tracing`.
#[must_use]
pub fn log_failures() -> FailureHook {
    Arc::new(|failure: &TaskFailure| {
        error!(
            component = failure.component,
            worker_id = failure.worker_id,
            message = %failure.message,
            "job panicked"
        );
    })
}

/// Run `job`, catching a panic and reporting it through `hook`.
///
/// Returns `true` when the job completed normally.
pub(crate) fn run_guarded(
    job: Job,
    component: &'static str,
    worker_id: usize,
    hook: &FailureHook,
) -> bool {
    match catch_unwind(AssertUnwindSafe(job)) {
        Ok(()) => true,
        Err(payload) => {
            let failure = TaskFailure {
                component,
                worker_id,
                message: panic_message(payload.as_ref()),
            };
            // A panicking hook must not take the worker down with it.
            if catch_unwind(AssertUnwindSafe(|| hook(&failure))).is_err() {
                error!(component, worker_id, "failure hook panicked");
            }
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Spawn a named worker thread.
pub(crate) fn spawn_named<F>(
    component: &'static str,
    name: String,
    stack_size: Option<usize>,
    body: F,
) -> Result<JoinHandle<()>, DispatchError>
where
    F: FnOnce() + Send + 'static,
{
    let mut builder = thread::Builder::new().name(name);
    if let Some(size) = stack_size {
        builder = builder.stack_size(size);
    }
    builder
        .spawn(body)
        .map_err(|source| DispatchError::Spawn { component, source })
}

/// Join every handle, skipping the calling thread if it is one of them.
///
/// Stopping a component from inside one of its own jobs must not deadlock, so
/// that worker is left to exit on its own once the job returns.
pub(crate) fn join_all(component: &'static str, handles: Vec<JoinHandle<()>>) {
    let current = thread::current().id();
    for (idx, handle) in handles.into_iter().enumerate() {
        if handle.thread().id() == current {
            warn!(component, worker_id = idx, "stop requested from own worker; not joining self");
            continue;
        }
        match handle.join() {
            Ok(()) => debug!(component, worker_id = idx, "worker joined"),
            Err(_) => warn!(component, worker_id = idx, "worker panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_run_guarded_reports_panic() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hook: FailureHook = Arc::new(move |f: &TaskFailure| sink.lock().push(f.clone()));

        let ok = run_guarded(Box::new(|| panic!("boom")), "deadline", 3, &hook);

        assert!(!ok);
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].worker_id, 3);
        assert_eq!(seen[0].message, "boom");
        assert_eq!(seen[0].to_string(), "deadline worker 3 job panicked: boom");
    }

    #[test]
    fn test_run_guarded_success() {
        let hook: FailureHook = Arc::new(|_: &TaskFailure| panic!("hook must not run"));
        assert!(run_guarded(Box::new(|| {}), "sharded", 0, &hook));
    }

    #[test]
    fn test_panicking_hook_is_contained() {
        let hook: FailureHook = Arc::new(|_: &TaskFailure| panic!("hook exploded"));
        assert!(!run_guarded(Box::new(|| panic!("job")), "sharded", 1, &hook));
    }

    #[test]
    fn test_formatted_panic_message() {
        let hook = log_failures();
        let n = 7;
        assert!(!run_guarded(Box::new(move || panic!("bad {n}")), "sharded", 0, &hook));
    }

    #[test]
    fn test_submission_accepted() {
        assert!(Submission::Accepted.is_accepted());
        assert!(!Submission::Ignored.is_accepted());
        assert!(!Submission::Dropped.is_accepted());
    }
}
