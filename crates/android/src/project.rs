//! Gradle project discovery
//!
//! Builds the in-memory project model from a directory tree. Module
//! enumeration follows the settings file when one exists, and falls back
//! to scanning for build scripts when it does not. Discovery is
//! best-effort at the module level: a module whose build script cannot
//! be read is kept in the model without one, so a single broken file
//! never hides the rest of the project.

use crate::build_script::BuildScript;
use crate::module::Module;
use crate::settings::{self, Settings};
use std::path::{Path, PathBuf};
use tracing::debug;
use trellis_core::error::{Error, Result};
use trellis_core::file_scanner::scan_build_scripts;

/// An Android project rooted at a Gradle build
#[derive(Debug, Clone)]
pub struct AndroidProject {
    /// Project root directory
    pub root: PathBuf,
    /// Project name, from the settings file or the directory name
    pub name: String,
    /// Parsed settings file, when present
    pub settings: Option<Settings>,
    /// The root build script, when present
    pub root_build_script: Option<BuildScript>,
    /// Modules in declaration order
    pub modules: Vec<Module>,
}

impl AndroidProject {
    /// Discover the project rooted at the given directory
    ///
    /// The directory must exist and carry at least one Gradle marker
    /// (a settings file, a root build script, or the wrapper script).
    pub fn discover(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::not_a_gradle_project(root));
        }

        let settings = Settings::locate(root)?;
        let root_build_script = load_script_best_effort(root);

        let has_wrapper = root.join("gradlew").is_file();
        if settings.is_none() && root_build_script.is_none() && !has_wrapper {
            return Err(Error::not_a_gradle_project(root));
        }

        let modules = match &settings {
            Some(settings) => modules_from_settings(root, settings),
            None => modules_from_scan(root)?,
        };

        let name = settings
            .as_ref()
            .and_then(|s| s.root_project_name.clone())
            .or_else(|| {
                root.file_name()
                    .and_then(|n| n.to_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| "android".to_string());

        Ok(Self {
            root: root.to_path_buf(),
            name,
            settings,
            root_build_script,
            modules,
        })
    }

    /// Look up a module by settings path
    pub fn module(&self, path: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.path == path)
    }

    /// Look up a module by settings path, mutably
    pub fn module_mut(&mut self, path: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.path == path)
    }

    /// Settings paths of all modules, in declaration order
    pub fn module_paths(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.path.clone()).collect()
    }
}

/// Enumerate modules from the settings file includes
fn modules_from_settings(root: &Path, settings: &Settings) -> Vec<Module> {
    settings
        .includes
        .iter()
        .map(|path| {
            let dir = settings::module_dir(root, path);
            let build_script = load_script_best_effort(&dir);
            Module::new(path.clone(), dir, build_script)
        })
        .collect()
}

/// Enumerate modules by scanning for build scripts
///
/// Used when no settings file exists. Settings paths are synthesized
/// from each script's directory relative to the root; the root script
/// itself is not a module.
fn modules_from_scan(root: &Path) -> Result<Vec<Module>> {
    let mut modules = Vec::new();
    for script_path in scan_build_scripts(root)? {
        let Some(dir) = script_path.parent() else {
            continue;
        };
        if dir == root {
            continue;
        }
        let Some(path) = synthesize_settings_path(root, dir) else {
            continue;
        };
        if modules.iter().any(|m: &Module| m.path == path) {
            continue;
        }
        let build_script = load_script_best_effort(dir);
        modules.push(Module::new(path, dir.to_path_buf(), build_script));
    }
    Ok(modules)
}

/// Colon-join a module directory relative to the root
fn synthesize_settings_path(root: &Path, dir: &Path) -> Option<String> {
    let rel = dir.strip_prefix(root).ok()?;
    let segments: Vec<&str> = rel
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(format!(":{}", segments.join(":")))
    }
}

/// Load a directory's build script, dropping it on read failure
fn load_script_best_effort(dir: &Path) -> Option<BuildScript> {
    match BuildScript::locate(dir) {
        Ok(script) => script,
        Err(err) => {
            debug!("skipping unreadable build script in {}: {err}", dir.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("settings.gradle.kts"),
            "rootProject.name = \"demo\"\ninclude(\":app\")\ninclude(\":maps\")\n",
        );
        write(&root.join("build.gradle.kts"), "allprojects { }\n");
        write(
            &root.join("app").join("build.gradle.kts"),
            "plugins { id(\"com.android.application\") }\nandroid { }\n",
        );
        write(
            &root.join("maps").join("build.gradle"),
            "apply plugin: 'com.android.library'\nandroid { }\n",
        );

        let project = AndroidProject::discover(root).unwrap();
        assert_eq!(project.name, "demo");
        assert_eq!(project.module_paths(), vec![":app", ":maps"]);
        assert!(project.module(":app").unwrap().is_android_application());
        assert!(project.module(":maps").unwrap().is_android_library());
    }

    #[test]
    fn test_discover_keeps_modules_without_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("settings.gradle"), "include ':app', ':docs'\n");
        write(&root.join("app").join("build.gradle"), "android { }\n");

        let project = AndroidProject::discover(root).unwrap();
        assert_eq!(project.modules.len(), 2);
        assert!(project.module(":docs").unwrap().build_script.is_none());
    }

    #[test]
    fn test_discover_scan_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("build.gradle.kts"), "allprojects { }\n");
        write(
            &root.join("feature").join("maps").join("build.gradle.kts"),
            "android { }\n",
        );

        let project = AndroidProject::discover(root).unwrap();
        assert_eq!(project.module_paths(), vec![":feature:maps"]);
    }

    #[test]
    fn test_discover_rejects_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("README.md"), "# not gradle\n");

        let err = AndroidProject::discover(dir.path()).unwrap_err();
        assert_eq!(err.code, trellis_core::ErrorCode::NotAGradleProject);
    }

    #[test]
    fn test_discover_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(AndroidProject::discover(&missing).is_err());
    }

    #[test]
    fn test_name_falls_back_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("android");
        write(&root.join("settings.gradle"), "include ':app'\n");
        write(&root.join("app").join("build.gradle"), "android { }\n");

        let project = AndroidProject::discover(&root).unwrap();
        assert_eq!(project.name, "android");
    }
}
