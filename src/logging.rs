//! Tracing subscriber setup.
//!
//! Console output goes through `tracing-subscriber`'s fmt layer with an
//! [`EnvFilter`]: `-v` raises the default level to `debug`, and `RUST_LOG`
//! overrides everything for targeted debugging.

use tracing_subscriber::EnvFilter;

/// Initialise the global subscriber.  Safe to call once per process;
/// subsequent calls are ignored (relevant for in-process tests).
pub fn init_subscriber(verbose: bool) {
    let default = if verbose { "etcgen=debug" } else { "etcgen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
