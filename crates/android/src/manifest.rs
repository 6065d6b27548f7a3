//! Android manifest package extraction
//!
//! Reads the `package` attribute out of a module's `AndroidManifest.xml`.
//! This is a pattern search over the file text, not an XML parse: the
//! manifest is treated as opaque and is never modified, and arbitrary
//! surrounding content (comments, unusual formatting, other attributes)
//! is tolerated.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use trellis_core::error::Result;

/// First `package="…"` declaration in the manifest text
static PACKAGE_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"package="([^"]+)""#).unwrap());

/// A module's manifest file at its fixed location
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Path to the manifest file
    pub path: PathBuf,
}

impl Manifest {
    /// The manifest location relative to a module directory
    pub fn path_for(module_dir: &Path) -> PathBuf {
        module_dir
            .join("src")
            .join("main")
            .join("AndroidManifest.xml")
    }

    /// Locate the manifest for a module, if it exists
    pub fn locate(module_dir: &Path) -> Option<Self> {
        let path = Self::path_for(module_dir);
        if path.is_file() {
            Some(Self { path })
        } else {
            None
        }
    }

    /// Read the manifest and extract the package identifier
    ///
    /// Returns `Ok(None)` when the file carries no usable declaration.
    pub fn package(&self) -> Result<Option<String>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(extract_package(&content))
    }
}

/// Extract the package identifier from manifest text
///
/// Takes the first `package="…"` match, trims surrounding whitespace, and
/// treats a blank result as no declaration.
pub fn extract_package(content: &str) -> Option<String> {
    let captured = PACKAGE_ATTR.captures(content)?;
    let package = captured[1].trim();
    if package.is_empty() {
        None
    } else {
        Some(package.to_string())
    }
}
