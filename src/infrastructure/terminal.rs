use crate::domain::ports::{Navigator, Notifier};
use crate::error::{CheckoutError, Result};
use std::io::Write;
use tracing::info;
use url::Url;

/// Prints alerts to a writer (stderr by default), one per line.
pub struct TerminalNotifier<W: Write + Send> {
    out: std::sync::Mutex<W>,
}

impl TerminalNotifier<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> TerminalNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: std::sync::Mutex::new(out),
        }
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn alert(&self, message: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(out, "ALERT: {message}")
            .and_then(|_| out.flush())
            .map_err(|e| CheckoutError::NotificationError(e.to_string()))
    }
}

/// A navigator for headless runs: the redirect is logged, not followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, target: &Url) -> Result<()> {
        info!(%target, "Navigating");
        Ok(())
    }
}
