//! File scanning utilities
//!
//! Provides file discovery and filtering across a project tree.

use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner with configurable filters
pub struct FileScanner {
    root: PathBuf,
    file_names: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl FileScanner {
    /// Create a new file scanner rooted at the given path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_names: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Filter by exact file names (e.g., "build.gradle", "build.gradle.kts")
    pub fn with_file_names(mut self, names: &[&str]) -> Self {
        self.file_names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add patterns to exclude (glob patterns)
    pub fn exclude(mut self, patterns: &[&str]) -> Self {
        self.exclude_patterns = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Scan and return matching files
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_hidden(e.path()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            // Check file name filter
            if !self.file_names.is_empty() {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("");
                if !self.file_names.iter().any(|n| n == name) {
                    continue;
                }
            }

            // Check exclude patterns
            let path_str = path.to_string_lossy();
            if self.should_exclude(&path_str) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    fn is_hidden(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.') && n != "." && n != "..")
            .unwrap_or(false)
    }

    fn should_exclude(&self, path_str: &str) -> bool {
        let sep = std::path::MAIN_SEPARATOR;
        for pattern in &self.exclude_patterns {
            // "**/name/**" excludes any path with that directory component
            if let Some(dir) = pattern
                .strip_prefix("**/")
                .and_then(|p| p.strip_suffix("/**"))
            {
                if path_str.contains(&format!("{sep}{dir}{sep}")) {
                    return true;
                }
            } else if let Ok(pat) = glob::Pattern::new(pattern) {
                if pat.matches(path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Scan for Gradle build scripts in a directory tree
pub fn scan_build_scripts(root: &Path) -> Result<Vec<PathBuf>> {
    FileScanner::new(root)
        .with_file_names(&["build.gradle", "build.gradle.kts"])
        .exclude(&["**/build/**", "**/src/**", "**/generated/**"])
        .scan()
}
