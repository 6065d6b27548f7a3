//! Gradle wrapper detection
//!
//! Presence and version of the checked-in wrapper, read straight from
//! the project tree. Nothing here executes Gradle.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Gradle version embedded in the wrapper's distributionUrl
static DISTRIBUTION_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"gradle-([0-9][0-9.]*[0-9])-").unwrap());

/// Path to the wrapper script, if the project has one
pub fn wrapper_script(project_dir: &Path) -> Option<PathBuf> {
    let name = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };
    let path = project_dir.join(name);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Gradle version pinned by the wrapper properties, if readable
pub fn wrapper_version(project_dir: &Path) -> Option<String> {
    let properties = project_dir
        .join("gradle")
        .join("wrapper")
        .join("gradle-wrapper.properties");
    let content = std::fs::read_to_string(properties).ok()?;
    let line = content
        .lines()
        .find(|line| line.trim_start().starts_with("distributionUrl"))?;
    DISTRIBUTION_VERSION
        .captures(line)
        .map(|captured| captured[1].to_string())
}
