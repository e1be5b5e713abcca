//! Tracing initialization
//!
//! Diagnostics go to stderr so that `--json` output on stdout stays clean.

use tracing_subscriber::{EnvFilter, prelude::*};

/// Variable holding an `EnvFilter` directive, e.g. `envstrap=trace`
pub const LOG_ENV: &str = "ENVSTRAP_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "envstrap=debug"
    } else {
        "envstrap=warn"
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .without_time(),
        )
        .try_init();
}
