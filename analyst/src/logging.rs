//! Development-time tracing.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics via `RUST_LOG`, output to stderr.
//!   Not part of the product output.
//!
//! - **Run reports**: the JSON result printed by `analyst run` (and written by
//!   `--report`). Always produced, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; defaults to `warn`, or `analyst=debug` when `verbose`.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=analyst=info analyst run --file story.md
/// ```
pub fn init(verbose: bool) {
    let default = if verbose { "warn,analyst=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
