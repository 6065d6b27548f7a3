//! Namespace backfill
//!
//! Android Gradle Plugin 8 requires every module to declare a
//! `namespace` in its build script. Older library modules declare a
//! `package` attribute in their manifest instead. The backfiller walks
//! the project's library modules and copies the manifest package into
//! the build script wherever the namespace is missing, never touching a
//! module that already declares one.
//!
//! Every module is processed independently. A module that cannot be
//! repaired (no manifest, no package attribute, nowhere to write the
//! declaration) is reported and skipped; it never aborts the run.

use crate::build_script::NamespaceQuery;
use crate::module::Module;
use crate::ordering::evaluation_order;
use crate::project::AndroidProject;
use chrono::Utc;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trellis_cli::output::Status;
use trellis_core::error::exit_codes;

/// What happened to one module during a backfill run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillOutcome {
    /// Listed in the configuration's exclude list
    Excluded,
    /// Not an Android library module
    NotLibrary,
    /// Namespace already declared, left untouched
    AlreadySet(String),
    /// No readable manifest at the fixed location
    NoManifest,
    /// Manifest carries no usable package attribute
    NoPackage,
    /// Namespace written (or would be, under dry-run)
    Applied(String),
    /// Nowhere to write the declaration
    SetterUnavailable(String),
    /// The edit or the write back to disk failed
    WriteFailed(String),
}

impl BackfillOutcome {
    /// Whether this outcome represents a namespace that was filled in
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Whether this outcome represents a failed repair attempt
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::SetterUnavailable(_) | Self::WriteFailed(_))
    }

    fn describe(&self, dry_run: bool) -> String {
        match self {
            Self::Excluded => "excluded by configuration".to_string(),
            Self::NotLibrary => "not an Android library".to_string(),
            Self::AlreadySet(ns) => format!("namespace already set ({ns})"),
            Self::NoManifest => "no manifest to read a package from".to_string(),
            Self::NoPackage => "manifest has no package attribute".to_string(),
            Self::Applied(ns) if dry_run => format!("would set namespace to {ns}"),
            Self::Applied(ns) => format!("namespace set to {ns}"),
            Self::SetterUnavailable(reason) => format!("cannot set namespace: {reason}"),
            Self::WriteFailed(msg) => format!("write failed: {msg}"),
        }
    }
}

/// Outcome of one module, tagged with its settings path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutcome {
    /// Settings path of the module
    pub module: String,
    /// What happened
    pub outcome: BackfillOutcome,
}

/// Aggregate counts over a backfill run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillSummary {
    /// Modules visited
    pub total: usize,
    /// Namespaces filled in
    pub applied: usize,
    /// Namespaces that were already declared
    pub already_set: usize,
    /// Modules skipped (excluded, not a library, nothing to copy)
    pub skipped: usize,
    /// Modules where the repair was attempted and failed
    pub failed: usize,
}

/// Full report of a backfill run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Project name
    pub project: String,
    /// UTC timestamp of the run
    pub timestamp: String,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Per-module outcomes, in processing order
    pub outcomes: Vec<ModuleOutcome>,
    /// Aggregate counts
    pub summary: BackfillSummary,
}

impl BackfillReport {
    fn new(project: String, dry_run: bool, outcomes: Vec<ModuleOutcome>) -> Self {
        let mut summary = BackfillSummary {
            total: outcomes.len(),
            applied: 0,
            already_set: 0,
            skipped: 0,
            failed: 0,
        };
        for entry in &outcomes {
            match &entry.outcome {
                BackfillOutcome::Applied(_) => summary.applied += 1,
                BackfillOutcome::AlreadySet(_) => summary.already_set += 1,
                BackfillOutcome::SetterUnavailable(_) | BackfillOutcome::WriteFailed(_) => {
                    summary.failed += 1;
                }
                _ => summary.skipped += 1,
            }
        }
        Self {
            project,
            timestamp: Utc::now().to_rfc3339(),
            dry_run,
            outcomes,
            summary,
        }
    }

    /// Whether modules still need a namespace filled in
    ///
    /// Under dry-run the applied count is exactly the set a real run
    /// would repair, so a CI check fails while it is non-zero.
    pub fn has_pending_work(&self) -> bool {
        self.summary.applied > 0
    }

    /// Print the human-readable report, returning the exit code
    pub fn print_results(&self) -> i32 {
        let title = if self.dry_run {
            format!("Namespace backfill for {} (dry run)", self.project)
        } else {
            format!("Namespace backfill for {}", self.project)
        };
        Status::header(&title);

        for entry in &self.outcomes {
            let line = entry.outcome.describe(self.dry_run);
            match &entry.outcome {
                BackfillOutcome::Applied(_) => {
                    println!("  {} {:<20} {}", "✓".green(), entry.module, line);
                }
                BackfillOutcome::SetterUnavailable(_) | BackfillOutcome::WriteFailed(_) => {
                    println!("  {} {:<20} {}", "✗".red(), entry.module, line);
                }
                BackfillOutcome::NoManifest | BackfillOutcome::NoPackage => {
                    println!("  {} {:<20} {}", "⚠".yellow(), entry.module, line);
                }
                _ => {
                    println!("  {} {:<20} {}", "·".dimmed(), entry.module, line.dimmed());
                }
            }
        }

        println!();
        let s = &self.summary;
        println!(
            "  {} modules: {} applied, {} already set, {} skipped, {} failed",
            s.total, s.applied, s.already_set, s.skipped, s.failed
        );

        if s.failed > 0 {
            exit_codes::FAILURE
        } else {
            exit_codes::SUCCESS
        }
    }
}

/// Backfills missing namespaces across a project's library modules
pub struct NamespaceBackfiller {
    dry_run: bool,
    exclude: Vec<String>,
}

impl NamespaceBackfiller {
    /// Create a backfiller; a dry run edits nothing on disk
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            exclude: Vec::new(),
        }
    }

    /// Skip the given settings paths entirely
    pub fn exclude(mut self, modules: &[String]) -> Self {
        self.exclude = modules.to_vec();
        self
    }

    /// Process every module and collect the report
    ///
    /// Modules are visited in evaluation order when one can be computed;
    /// a dependency cycle degrades to declaration order rather than
    /// aborting the run.
    pub fn run(&self, project: &mut AndroidProject, app_module: &str) -> BackfillReport {
        let order = match evaluation_order(project, app_module) {
            Ok(order) => order,
            Err(err) => {
                warn!("falling back to declaration order: {err}");
                project.module_paths()
            }
        };

        let mut outcomes = Vec::with_capacity(order.len());
        for path in order {
            let Some(module) = project.module_mut(&path) else {
                continue;
            };
            let outcome = self.backfill_module(module);
            outcomes.push(ModuleOutcome {
                module: path,
                outcome,
            });
        }
        BackfillReport::new(project.name.clone(), self.dry_run, outcomes)
    }

    /// Apply the backfill steps to a single module
    pub fn backfill_module(&self, module: &mut Module) -> BackfillOutcome {
        if self.exclude.contains(&module.path) {
            return BackfillOutcome::Excluded;
        }
        if !module.is_android_library() {
            return BackfillOutcome::NotLibrary;
        }

        // an unsupported probe counts as "no current value"; the reason
        // resurfaces if we end up needing to write
        let unsupported = match module.namespace_query() {
            NamespaceQuery::Declared(ns) if !ns.trim().is_empty() => {
                return BackfillOutcome::AlreadySet(ns.trim().to_string());
            }
            NamespaceQuery::Declared(_) | NamespaceQuery::Missing => None,
            NamespaceQuery::Unsupported(reason) => {
                debug!("{}: namespace probe unsupported: {reason}", module.path);
                Some(reason)
            }
        };

        let Some(manifest) = module.manifest() else {
            return BackfillOutcome::NoManifest;
        };
        let package = match manifest.package() {
            Ok(Some(package)) => package,
            Ok(None) => return BackfillOutcome::NoPackage,
            Err(err) => {
                debug!("{}: unreadable manifest: {err}", module.path);
                return BackfillOutcome::NoManifest;
            }
        };

        if let Some(reason) = unsupported {
            warn!("{}: cannot set namespace: {reason}", module.path);
            return BackfillOutcome::SetterUnavailable(reason);
        }
        let Some(script) = module.build_script.as_mut() else {
            // unreachable in practice: a probe without a script is Unsupported
            return BackfillOutcome::SetterUnavailable("module has no build script".to_string());
        };
        if let Err(err) = script.set_namespace(&package) {
            warn!("{}: {err}", module.path);
            return BackfillOutcome::WriteFailed(err.to_string());
        }
        if !self.dry_run {
            if let Err(err) = script.save() {
                warn!("{}: {err}", module.path);
                return BackfillOutcome::WriteFailed(err.to_string());
            }
        }
        BackfillOutcome::Applied(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    const LIBRARY_SCRIPT: &str =
        "plugins {\n    id(\"com.android.library\")\n}\nandroid {\n    compileSdk = 34\n}\n";

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Project with :app plus one library module built from the arguments
    fn fixture(lib_script: Option<&str>, manifest: Option<&str>) -> (TempDir, AndroidProject) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("settings.gradle.kts"),
            "rootProject.name = \"demo\"\ninclude(\":app\", \":maps\")\n",
        );
        write(
            &root.join("app").join("build.gradle.kts"),
            "plugins { id(\"com.android.application\") }\nandroid {\n    namespace = \"com.demo.app\"\n}\n",
        );
        if let Some(script) = lib_script {
            write(&root.join("maps").join("build.gradle.kts"), script);
        }
        if let Some(manifest) = manifest {
            write(
                &root.join("maps").join("src").join("main").join("AndroidManifest.xml"),
                manifest,
            );
        }
        let project = AndroidProject::discover(root).unwrap();
        (dir, project)
    }

    fn lib_script_content(root: &Path) -> String {
        std::fs::read_to_string(root.join("maps").join("build.gradle.kts")).unwrap()
    }

    #[test]
    fn test_existing_namespace_is_never_overwritten() {
        let script =
            "plugins { id(\"com.android.library\") }\nandroid {\n    namespace = \"com.kept.value\"\n}\n";
        let (dir, mut project) = fixture(
            Some(script),
            Some(r#"<manifest package="com.other.value"/>"#),
        );
        let before = lib_script_content(dir.path());

        let outcome = NamespaceBackfiller::new(false)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::AlreadySet("com.kept.value".to_string()));
        assert_eq!(lib_script_content(dir.path()), before);
    }

    #[test]
    fn test_missing_namespace_filled_from_manifest() {
        let (dir, mut project) = fixture(
            Some(LIBRARY_SCRIPT),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        let outcome = NamespaceBackfiller::new(false)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::Applied("com.example.maps".to_string()));
        assert!(lib_script_content(dir.path())
            .contains("namespace = \"com.example.maps\""));
    }

    #[test]
    fn test_no_manifest_leaves_namespace_unset() {
        let (dir, mut project) = fixture(Some(LIBRARY_SCRIPT), None);

        let outcome = NamespaceBackfiller::new(false)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::NoManifest);
        assert!(!lib_script_content(dir.path()).contains("namespace"));
    }

    #[test]
    fn test_manifest_without_package_leaves_namespace_unset() {
        let (dir, mut project) = fixture(
            Some(LIBRARY_SCRIPT),
            Some(r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"/>"#),
        );

        let outcome = NamespaceBackfiller::new(false)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::NoPackage);
        assert!(!lib_script_content(dir.path()).contains("namespace"));
    }

    #[test]
    fn test_non_library_module_untouched() {
        let script = "plugins { id(\"java-library\") }\n";
        let (dir, mut project) = fixture(
            Some(script),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        let outcome = NamespaceBackfiller::new(false)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::NotLibrary);
        assert_eq!(lib_script_content(dir.path()), script);
    }

    #[test]
    fn test_blank_namespace_is_backfilled_in_place() {
        let script =
            "plugins { id(\"com.android.library\") }\nandroid {\n    namespace = \"\"\n}\n";
        let (dir, mut project) = fixture(
            Some(script),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        let outcome = NamespaceBackfiller::new(false)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::Applied("com.example.maps".to_string()));
        let content = lib_script_content(dir.path());
        assert!(content.contains("namespace = \"com.example.maps\""));
        assert_eq!(content.matches("namespace").count(), 1);
    }

    #[test]
    fn test_backfill_writes_inside_single_line_android_block() {
        let script = "plugins { id(\"com.android.library\") }\nandroid { }\n";
        let (dir, mut project) = fixture(
            Some(script),
            Some(r#"<manifest package="com.demo.maps"/>"#),
        );

        let outcome = NamespaceBackfiller::new(false)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::Applied("com.demo.maps".to_string()));
        assert_eq!(
            lib_script_content(dir.path()),
            "plugins { id(\"com.android.library\") }\nandroid {\n    namespace = \"com.demo.maps\"\n}\n"
        );
    }

    #[test]
    fn test_library_without_android_block_reports_setter_unavailable() {
        let script = "plugins { id(\"com.android.library\") }\n";
        let (dir, mut project) = fixture(
            Some(script),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        let outcome = NamespaceBackfiller::new(false)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert!(outcome.is_failure());
        assert_eq!(lib_script_content(dir.path()), script);
    }

    #[test]
    fn test_dry_run_reports_without_writing() {
        let (dir, mut project) = fixture(
            Some(LIBRARY_SCRIPT),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        let outcome = NamespaceBackfiller::new(true)
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::Applied("com.example.maps".to_string()));
        assert_eq!(lib_script_content(dir.path()), LIBRARY_SCRIPT);
    }

    #[test]
    fn test_excluded_module_is_skipped() {
        let (dir, mut project) = fixture(
            Some(LIBRARY_SCRIPT),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        let outcome = NamespaceBackfiller::new(false)
            .exclude(&[":maps".to_string()])
            .backfill_module(project.module_mut(":maps").unwrap());

        assert_eq!(outcome, BackfillOutcome::Excluded);
        assert_eq!(lib_script_content(dir.path()), LIBRARY_SCRIPT);
    }

    #[test]
    fn test_run_processes_app_first_and_counts() {
        let (_dir, mut project) = fixture(
            Some(LIBRARY_SCRIPT),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        let report = NamespaceBackfiller::new(false).run(&mut project, ":app");

        assert_eq!(report.outcomes[0].module, ":app");
        assert_eq!(report.outcomes[0].outcome, BackfillOutcome::NotLibrary);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.applied, 1);
        assert_eq!(report.summary.failed, 0);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let (dir, mut project) = fixture(
            Some(LIBRARY_SCRIPT),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        NamespaceBackfiller::new(false).run(&mut project, ":app");
        let after_first = lib_script_content(dir.path());

        // rediscover so the second run reads what the first wrote
        let mut project = AndroidProject::discover(dir.path()).unwrap();
        let report = NamespaceBackfiller::new(false).run(&mut project, ":app");

        assert_eq!(report.summary.applied, 0);
        assert_eq!(report.summary.already_set, 1);
        assert_eq!(lib_script_content(dir.path()), after_first);
    }

    #[test]
    fn test_pending_work_clears_after_repair() {
        let (dir, mut project) = fixture(
            Some(LIBRARY_SCRIPT),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );

        let report = NamespaceBackfiller::new(true).run(&mut project, ":app");
        assert!(report.has_pending_work());

        let mut project = AndroidProject::discover(dir.path()).unwrap();
        NamespaceBackfiller::new(false).run(&mut project, ":app");

        let mut project = AndroidProject::discover(dir.path()).unwrap();
        let report = NamespaceBackfiller::new(true).run(&mut project, ":app");
        assert!(!report.has_pending_work());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let (_dir, mut project) = fixture(
            Some(LIBRARY_SCRIPT),
            Some(r#"<manifest package="com.example.maps"/>"#),
        );
        let report = NamespaceBackfiller::new(true).run(&mut project, ":app");

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"dry_run\":true"));
        assert!(json.contains("com.example.maps"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Running twice always equals running once, whatever the package
        #[test]
        fn prop_backfill_idempotent(
            package in "[a-z][a-z0-9]{0,6}(\\.[a-z][a-z0-9]{0,6}){1,3}"
        ) {
            let manifest = format!(r#"<manifest package="{package}"/>"#);
            let (dir, mut project) = fixture(Some(LIBRARY_SCRIPT), Some(&manifest));

            let first = NamespaceBackfiller::new(false)
                .backfill_module(project.module_mut(":maps").unwrap());
            prop_assert_eq!(first, BackfillOutcome::Applied(package.clone()));
            let after_first = lib_script_content(dir.path());

            let mut project = AndroidProject::discover(dir.path()).unwrap();
            let second = NamespaceBackfiller::new(false)
                .backfill_module(project.module_mut(":maps").unwrap());
            prop_assert_eq!(second, BackfillOutcome::AlreadySet(package));
            prop_assert_eq!(lib_script_content(dir.path()), after_first);
        }
    }
}
