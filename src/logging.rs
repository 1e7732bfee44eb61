//! Tracing subscriber setup.
//!
//! Log output goes to stderr so that table and JSON output on stdout stays
//! machine-readable. The filter comes from `EVCAT_LOG` (same syntax as
//! `RUST_LOG`), defaulting to `warn`, or `debug` with `--verbose`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "EVCAT_LOG";

pub struct Logger;

impl Logger {
    /// Call once near the start of `main`. Later calls are no-ops.
    pub fn init_tracing(verbose: bool) {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .with_filter(Self::filter(verbose));

        // try_init fails only if a subscriber is already installed
        let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
    }

    fn filter(verbose: bool) -> EnvFilter {
        let default = if verbose { "debug" } else { "warn" };
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
    }
}
