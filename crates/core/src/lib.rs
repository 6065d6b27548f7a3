//! Core utilities for Trellis development tools
//!
//! This crate provides shared functionality used across the project tools:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **File scanning**: File discovery with filtering
//! - **Process execution**: Safe command execution with output capture
//! - **Configuration**: TOML-based configuration with validation
//! - **Health checks**: Verify tool dependencies and environment
//! - **Logging**: Tracing setup driven by CLI verbosity
//!
//! # Example
//!
//! ```rust,no_run
//! use trellis_core::health::HealthChecker;
//!
//! // Check environment health
//! let report = HealthChecker::new()
//!     .with_android_checks()
//!     .run();
//!
//! if !report.is_healthy() {
//!     eprintln!("Environment issues detected!");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod file_scanner;
pub mod health;
pub mod logging;
pub mod process;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::health::{HealthChecker, HealthReport, HealthStatus};
    pub use crate::logging::LogConfig;
    pub use crate::validation::{ValidationResult, Validator};
}
