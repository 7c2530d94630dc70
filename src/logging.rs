//! Logging setup for the binary
//!
//! Logs go to stderr so stdout carries only the JSON output. `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "matchday=debug"
    } else {
        "matchday=info"
    }
}

/// Installs the global tracing subscriber
///
/// Does nothing if a subscriber is already installed.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
