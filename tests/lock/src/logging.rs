//! Test and fixture logging.
//!
//! Planner events are dropped unless a subscriber is installed. Call
//! [`init_test_logging`] at the top of a test, or [`init_stderr_logging`]
//! from a binary, then run with e.g. `RUST_LOG=dstar_search=debug`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Route events through the test writer so `cargo test` captures them.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_filter(filter()),
        )
        .try_init();
}

/// Route events to stderr so stdout stays machine-readable.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_filter(filter()),
        )
        .try_init();
}
