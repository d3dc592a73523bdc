//! Diagnostic logging setup.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! The filter is read from `SITETIME_LOG` (e.g. `SITETIME_LOG=debug`).

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "SITETIME_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global tracing subscriber. Calling it again is a no-op.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
