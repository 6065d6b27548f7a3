//! Android host project tools for Trellis
//!
//! This crate models the Android host project of the Trellis app and
//! repairs its Gradle configuration:
//! - Project discovery and the module model
//! - Namespace backfill for library modules
//! - Build output layout and the clean operation
//! - Module evaluation ordering
//! - Repository declaration and project health checks

#![warn(missing_docs)]

pub mod backfill;
pub mod build_script;
pub mod doctor;
pub mod gradle;
pub mod layout;
pub mod manifest;
pub mod module;
pub mod ordering;
pub mod project;
pub mod repositories;
pub mod settings;

pub use backfill::{BackfillOutcome, BackfillReport, NamespaceBackfiller};
pub use build_script::{BuildScript, NamespaceQuery, ScriptDialect};
pub use layout::BuildLayout;
pub use module::Module;
pub use project::AndroidProject;
