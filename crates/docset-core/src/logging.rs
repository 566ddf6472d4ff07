//! Tracing setup shared by binaries and integration tests.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber: env-filtered (`RUST_LOG`), compact,
/// stderr. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
