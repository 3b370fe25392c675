//! Logging initialization for the `devdash` binary.
//!
//! Filter directives come from `DEVDASH_LOG` (e.g. `DEVDASH_LOG=debug` or
//! `DEVDASH_LOG=devdash_core=debug,warn`). Falls back to `warn` so normal runs
//! only print JSON on stdout.

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "DEVDASH_LOG";

/// Install the global subscriber. Logs go to stderr.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
