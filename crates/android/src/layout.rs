//! Build output layout
//!
//! The project's build outputs are redirected out of the source tree
//! into a shared directory one level above the project root, with one
//! subdirectory per module. `clean` deletes those outputs plus any
//! legacy in-tree `build/` directories left behind from before the
//! redirect. Deleting an absent directory is not an error, so clean can
//! be run any number of times.

use crate::module::Module;
use crate::project::AndroidProject;
use owo_colors::OwoColorize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use trellis_cli::output::{format_size, Status};
use trellis_core::config::LayoutConfig;
use trellis_core::error::{exit_codes, Result};
use walkdir::WalkDir;

/// Where a project's build outputs live
#[derive(Debug, Clone)]
pub struct BuildLayout {
    /// Project root directory
    pub root: PathBuf,
    /// Shared build output directory
    pub shared_build_dir: PathBuf,
}

impl BuildLayout {
    /// Compute the layout for a project root under the given config
    ///
    /// With redirection on, the shared directory is the configured path
    /// resolved against the root and lexically normalized, so the
    /// default `../build` lands next to the project directory rather
    /// than inside it.
    pub fn from_config(root: &Path, config: &LayoutConfig) -> Self {
        let shared_build_dir = if config.redirect_build_dir {
            normalize_lexically(&root.join(&config.shared_build_dir))
        } else {
            root.join("build")
        };
        Self {
            root: root.to_path_buf(),
            shared_build_dir,
        }
    }

    /// Build output directory for one module
    pub fn module_build_dir(&self, module: &Module) -> PathBuf {
        self.shared_build_dir.join(&module.name)
    }

    /// Remove build outputs, returning what was (or would be) deleted
    pub fn clean(&self, project: &AndroidProject, dry_run: bool) -> Result<CleanReport> {
        let mut targets: Vec<PathBuf> = vec![self.shared_build_dir.clone()];
        let legacy_root = self.root.join("build");
        if !targets.contains(&legacy_root) {
            targets.push(legacy_root);
        }
        for module in &project.modules {
            let legacy = module.dir.join("build");
            if !targets.contains(&legacy) {
                targets.push(legacy);
            }
        }

        let mut removed = Vec::new();
        let mut total_files = 0;
        let mut total_bytes = 0;
        for target in targets {
            if !target.is_dir() {
                debug!("nothing to clean at {}", target.display());
                continue;
            }
            let (files, bytes) = measure(&target);
            if !dry_run {
                std::fs::remove_dir_all(&target)?;
            }
            total_files += files;
            total_bytes += bytes;
            removed.push(CleanTarget {
                path: target,
                files,
                bytes,
            });
        }

        Ok(CleanReport {
            dry_run,
            removed,
            total_files,
            total_bytes,
        })
    }
}

/// One directory removed by clean
#[derive(Debug, Clone)]
pub struct CleanTarget {
    /// Directory path
    pub path: PathBuf,
    /// Files it contained
    pub files: usize,
    /// Bytes it contained
    pub bytes: u64,
}

/// Result of a clean run
#[derive(Debug, Clone)]
pub struct CleanReport {
    /// Whether this run left the directories in place
    pub dry_run: bool,
    /// Directories removed, in processing order
    pub removed: Vec<CleanTarget>,
    /// Total files removed
    pub total_files: usize,
    /// Total bytes removed
    pub total_bytes: u64,
}

impl CleanReport {
    /// Print the human-readable report, returning the exit code
    pub fn print_results(&self) -> i32 {
        let title = if self.dry_run {
            "Clean build outputs (dry run)"
        } else {
            "Clean build outputs"
        };
        Status::header(title);

        if self.removed.is_empty() {
            println!("  {} already clean", "·".dimmed());
            return exit_codes::SUCCESS;
        }

        let verb = if self.dry_run { "would remove" } else { "removed" };
        for target in &self.removed {
            println!(
                "  {} {verb} {} ({} files, {})",
                "✓".green(),
                target.path.display(),
                target.files,
                format_size(target.bytes)
            );
        }
        println!();
        println!(
            "  {} files, {} reclaimed",
            self.total_files,
            format_size(self.total_bytes)
        );
        exit_codes::SUCCESS
    }
}

/// Count files and bytes under a directory
fn measure(dir: &Path) -> (usize, u64) {
    let mut files = 0;
    let mut bytes = 0;
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            files += 1;
            bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    (files, bytes)
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if last_is_normal {
                    normalized.pop();
                } else {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_config(redirect: bool, shared: &str) -> LayoutConfig {
        LayoutConfig {
            redirect_build_dir: redirect,
            shared_build_dir: shared.to_string(),
        }
    }

    #[test]
    fn test_redirect_normalizes_parent_path() {
        let layout = BuildLayout::from_config(
            Path::new("/work/app/android"),
            &layout_config(true, "../build"),
        );
        assert_eq!(layout.shared_build_dir, PathBuf::from("/work/app/build"));
    }

    #[test]
    fn test_redirect_disabled_stays_in_tree() {
        let layout = BuildLayout::from_config(
            Path::new("/work/app/android"),
            &layout_config(false, "../build"),
        );
        assert_eq!(
            layout.shared_build_dir,
            PathBuf::from("/work/app/android/build")
        );
    }

    #[test]
    fn test_module_build_dir_uses_short_name() {
        let layout = BuildLayout::from_config(
            Path::new("/work/app/android"),
            &layout_config(true, "../build"),
        );
        let module = Module::new(
            ":feature:maps".to_string(),
            PathBuf::from("/work/app/android/feature/maps"),
            None,
        );
        assert_eq!(
            layout.module_build_dir(&module),
            PathBuf::from("/work/app/build/maps")
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parents() {
        assert_eq!(
            normalize_lexically(Path::new("./../build")),
            PathBuf::from("../build")
        );
        assert_eq!(
            normalize_lexically(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
    }

    #[test]
    fn test_clean_removes_shared_and_legacy_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("android");
        let app = root.join("app");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(root.join("settings.gradle"), "include ':app'\n").unwrap();
        std::fs::write(app.join("build.gradle"), "android { }\n").unwrap();

        let shared = dir.path().join("build");
        std::fs::create_dir_all(shared.join("app")).unwrap();
        std::fs::write(shared.join("app").join("out.bin"), b"12345").unwrap();
        std::fs::create_dir_all(app.join("build")).unwrap();
        std::fs::write(app.join("build").join("stale.txt"), b"xyz").unwrap();

        let project = AndroidProject::discover(&root).unwrap();
        let layout = BuildLayout::from_config(&root, &layout_config(true, "../build"));
        let report = layout.clean(&project, false).unwrap();

        assert_eq!(report.removed.len(), 2);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.total_bytes, 8);
        assert!(!shared.exists());
        assert!(!app.join("build").exists());
    }

    #[test]
    fn test_clean_twice_is_safe() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("android");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("settings.gradle"), "include ':app'\n").unwrap();

        let project = AndroidProject::discover(&root).unwrap();
        let layout = BuildLayout::from_config(&root, &layout_config(true, "../build"));

        let first = layout.clean(&project, false).unwrap();
        let second = layout.clean(&project, false).unwrap();
        assert!(first.removed.is_empty());
        assert!(second.removed.is_empty());
    }

    #[test]
    fn test_clean_dry_run_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("android");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("settings.gradle"), "include ':app'\n").unwrap();
        let shared = dir.path().join("build");
        std::fs::create_dir_all(&shared).unwrap();
        std::fs::write(shared.join("out.bin"), b"123").unwrap();

        let project = AndroidProject::discover(&root).unwrap();
        let layout = BuildLayout::from_config(&root, &layout_config(true, "../build"));
        let report = layout.clean(&project, true).unwrap();

        assert_eq!(report.removed.len(), 1);
        assert!(shared.exists());
    }
}
