//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `default_directive`
/// (e.g. `"prometheus_dispatch=info"`) when the variable is unset or invalid.
///
/// Does nothing if a global subscriber is already installed, so embedding
/// applications keep control of their own setup.
pub fn init_tracing(default_directive: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}
