//! Gradle settings file parsing
//!
//! `settings.gradle(.kts)` names the build and enumerates its modules.
//! Both DSLs are handled by line-oriented pattern matching, so the same
//! code reads `include ':app', ':maps'` and `include(":app", ":maps")`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use trellis_core::error::Result;

/// Lines that include modules into the build
static INCLUDE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*include\b(.*)$").unwrap());

/// Quoted settings paths within an include line
static QUOTED_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).unwrap());

/// rootProject.name assignment
static ROOT_PROJECT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"rootProject\.name\s*=\s*["']([^"']+)["']"#).unwrap());

/// A parsed Gradle settings file
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to the settings file
    pub path: PathBuf,
    /// Declared root project name, if any
    pub root_project_name: Option<String>,
    /// Included module paths, normalized to a leading colon
    pub includes: Vec<String>,
    /// Raw file text, used by the repositories check
    pub content: String,
}

impl Settings {
    /// Locate and parse the settings file in a project root
    ///
    /// Returns `Ok(None)` when the root has neither `settings.gradle`
    /// nor `settings.gradle.kts`.
    pub fn locate(root: &Path) -> Result<Option<Self>> {
        for name in ["settings.gradle", "settings.gradle.kts"] {
            let path = root.join(name);
            if path.is_file() {
                return Ok(Some(Self::load(path)?));
            }
        }
        Ok(None)
    }

    /// Load and parse a settings file from a known path
    pub fn load(path: PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let root_project_name = ROOT_PROJECT_NAME
            .captures(&content)
            .map(|captured| captured[1].to_string());

        let mut includes = Vec::new();
        for line in INCLUDE_LINE.captures_iter(&content) {
            for quoted in QUOTED_PATH.captures_iter(&line[1]) {
                let include = normalize_settings_path(&quoted[1]);
                if !includes.contains(&include) {
                    includes.push(include);
                }
            }
        }

        Ok(Self {
            path,
            root_project_name,
            includes,
            content,
        })
    }
}

/// Normalize a settings path to its canonical colon-prefixed form
fn normalize_settings_path(path: &str) -> String {
    if path.starts_with(':') {
        path.to_string()
    } else {
        format!(":{path}")
    }
}

/// Filesystem directory for a settings path under the project root
///
/// `:app` maps to `root/app` and `:feature:maps` to `root/feature/maps`.
pub fn module_dir(root: &Path, settings_path: &str) -> PathBuf {
    let mut dir = root.to_path_buf();
    for segment in settings_path.split(':').filter(|s| !s.is_empty()) {
        dir.push(segment);
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kotlin_dsl_includes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.gradle.kts");
        std::fs::write(
            &path,
            r#"rootProject.name = "sample"
include(":app")
include(":feature:maps", ":core")
"#,
        )
        .unwrap();

        let settings = Settings::load(path).unwrap();
        assert_eq!(settings.root_project_name.as_deref(), Some("sample"));
        assert_eq!(settings.includes, vec![":app", ":feature:maps", ":core"]);
    }

    #[test]
    fn test_parse_groovy_includes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.gradle");
        std::fs::write(
            &path,
            "rootProject.name = 'sample'\ninclude ':app', ':lib'\ninclude 'plain'\n",
        )
        .unwrap();

        let settings = Settings::load(path).unwrap();
        assert_eq!(settings.includes, vec![":app", ":lib", ":plain"]);
    }

    #[test]
    fn test_include_build_is_not_an_include() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.gradle.kts");
        std::fs::write(&path, "includeBuild(\"../shared\")\ninclude(\":app\")\n").unwrap();

        let settings = Settings::load(path).unwrap();
        assert_eq!(settings.includes, vec![":app"]);
    }

    #[test]
    fn test_locate_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::locate(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_module_dir_nested_path() {
        let root = Path::new("/project/android");
        assert_eq!(module_dir(root, ":app"), PathBuf::from("/project/android/app"));
        assert_eq!(
            module_dir(root, ":feature:maps"),
            PathBuf::from("/project/android/feature/maps")
        );
    }
}
