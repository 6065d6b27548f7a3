//! Configuration loading and schema definitions
//!
//! Shared configuration types used across the tools.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
