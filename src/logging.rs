use std::env;

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Filtering comes from `DIARYD_LOG`
/// (default `info`). Everything goes to stderr: the line protocol owns
/// stdout, and a single log line there would corrupt a response.
pub fn init() {
    let filter = env::var("DIARYD_LOG").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();
}
