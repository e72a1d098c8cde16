//! Logging configuration
//!
//! Initializes tracing for the application. Operator-facing subprocess
//! output goes straight to stdout/stderr; tracing carries the step
//! transitions and diagnostics around it.

/// Initializes logging
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects between debug
/// and info as the default level.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
