use std::io::{IsTerminal, stderr};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Logs go to stderr so stdout stays free for reports. The level comes from
/// `RUST_LOG` (default `info`); output is JSON when stderr is not a terminal.
pub fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if stderr().is_terminal() {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(stderr)
            .with_ansi(true)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(stderr)
            .with_ansi(false)
            .with_target(true)
            .init();
    }
}
