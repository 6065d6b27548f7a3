//! Logging initialization
//!
//! Structured diagnostics with tracing. Output is opt-in: the default level
//! only surfaces errors, `-v` flags widen the filter, and `RUST_LOG` always
//! wins when set.

use crate::error::{Error, ErrorCode, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Count of -v flags
    pub verbosity: u8,
    /// Suppress everything below errors
    pub quiet: bool,
}

impl LogConfig {
    /// The default filter directive for this configuration
    pub fn default_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "error",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Initialize the global tracing subscriber
///
/// Diagnostics go to stderr so stdout stays clean for reports and JSON.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact(),
    );

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        Error::new(
            ErrorCode::Internal,
            format!("Failed to set tracing subscriber: {}", e),
        )
    })?;

    Ok(())
}
