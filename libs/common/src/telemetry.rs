//! Tracing initialisation shared by the workspace binaries

use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global `fmt` subscriber.
///
/// Honours `RUST_LOG`; falls back to [`DEFAULT_LOG_FILTER`]. Calling it more
/// than once is harmless, later calls are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
