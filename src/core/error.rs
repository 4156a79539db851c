//! Error types for dispatch components.

use thiserror::Error;

/// Errors produced while constructing dispatch components.
///
/// Submission and execution never produce errors: overflow and late submission
/// are reported through [`Submission`](crate::core::Submission), and panicking
/// jobs go to the failure hook.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The OS refused to start a worker thread.
    #[error("failed to spawn {component} thread: {source}")]
    Spawn {
        /// Component that tried to spawn the thread.
        component: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A sink destination could not be opened.
    #[error("failed to open destination `{name}`: {source}")]
    Destination {
        /// Destination name requested from the rotation policy.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
