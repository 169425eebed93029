//! Tracing setup for binaries and tools embedding the client.

use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `"info"` or
/// `"gymdesk=debug"`) is used. Calling this twice is harmless: the second
/// install is ignored.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Already installed by the host application.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
