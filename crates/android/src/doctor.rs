//! Project doctor
//!
//! One-stop diagnosis of an Android host project: the module table,
//! namespace state, repository declarations, build layout, wrapper, and
//! the local environment. Read-only; the doctor never repairs anything
//! itself.

use crate::build_script::NamespaceQuery;
use crate::gradle;
use crate::layout::BuildLayout;
use crate::module::Module;
use crate::project::AndroidProject;
use crate::repositories::RepositoryCheck;
use chrono::Utc;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trellis_cli::output::{format_duration, Status};
use trellis_core::config::ConfigSchema;
use trellis_core::error::exit_codes;
use trellis_core::health::{HealthChecker, HealthReport, HealthStatus, PathCheck};
use trellis_core::validation::{validate_namespace_format, ValidationError};

/// Snapshot of one module for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    /// Settings path
    pub path: String,
    /// Short name
    pub name: String,
    /// `application`, `library` or `plain`
    pub kind: String,
    /// Declared namespace, when present and non-blank
    pub namespace: Option<String>,
    /// Package attribute from the manifest, when readable
    pub manifest_package: Option<String>,
    /// Library module still missing its namespace
    pub needs_backfill: bool,
}

impl ModuleSummary {
    /// Summarize a module, reading its manifest if one exists
    pub fn of(module: &Module) -> Self {
        let kind = if module.is_android_application() {
            "application"
        } else if module.is_android_library() {
            "library"
        } else {
            "plain"
        };
        let namespace = match module.namespace_query() {
            NamespaceQuery::Declared(ns) if !ns.trim().is_empty() => {
                Some(ns.trim().to_string())
            }
            _ => None,
        };
        let manifest_package = module
            .manifest()
            .and_then(|manifest| manifest.package().ok())
            .flatten();
        let needs_backfill = kind == "library" && namespace.is_none();
        Self {
            path: module.path.clone(),
            name: module.name.clone(),
            kind: kind.to_string(),
            namespace,
            manifest_package,
            needs_backfill,
        }
    }
}

/// Summarize every module of a project
pub fn summarize_modules(project: &AndroidProject) -> Vec<ModuleSummary> {
    project.modules.iter().map(ModuleSummary::of).collect()
}

/// Print the module table, returning the exit code
pub fn print_module_table(modules: &[ModuleSummary]) -> i32 {
    for module in modules {
        let state = match (&module.namespace, module.needs_backfill) {
            (Some(ns), _) => format!("namespace {ns}"),
            (None, true) => match &module.manifest_package {
                Some(package) => format!("needs backfill (manifest package {package})"),
                None => "needs backfill (no manifest package)".to_string(),
            },
            (None, false) => "-".to_string(),
        };
        if module.needs_backfill {
            println!(
                "  {} {:<20} {:<12} {}",
                "⚠".yellow(),
                module.path,
                module.kind,
                state.yellow()
            );
        } else {
            println!(
                "  {} {:<20} {:<12} {}",
                "·".dimmed(),
                module.path,
                module.kind,
                state
            );
        }
    }
    println!();
    let pending = modules.iter().filter(|m| m.needs_backfill).count();
    println!("  {} modules, {} need backfill", modules.len(), pending);
    exit_codes::SUCCESS
}

/// Full diagnosis of a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    /// Project name
    pub project: String,
    /// Project root
    pub root: String,
    /// UTC timestamp
    pub timestamp: String,
    /// Per-module snapshots
    pub modules: Vec<ModuleSummary>,
    /// Repository declaration check
    pub repositories: RepositoryCheck,
    /// Shared build output directory
    pub shared_build_dir: String,
    /// Whether the wrapper script is present
    pub wrapper: bool,
    /// Gradle version pinned by the wrapper, if readable
    pub wrapper_version: Option<String>,
    /// Local environment checks
    pub environment: HealthReport,
    /// Namespace format warnings
    pub warnings: Vec<ValidationError>,
}

/// Run every diagnostic over a discovered project
pub fn diagnose(project: &AndroidProject, config: &ConfigSchema) -> ProjectReport {
    let modules = summarize_modules(project);
    let repositories = RepositoryCheck::run(project, &config.repositories.required);
    let layout = BuildLayout::from_config(&project.root, &config.layout);

    let mut warnings = Vec::new();
    for module in &modules {
        if let Some(ns) = &module.namespace {
            let result = validate_namespace_format(&module.path, ns);
            warnings.extend(result.warnings().to_vec());
        }
    }

    ProjectReport {
        project: project.name.clone(),
        root: project.root.display().to_string(),
        timestamp: Utc::now().to_rfc3339(),
        modules,
        repositories,
        shared_build_dir: layout.shared_build_dir.display().to_string(),
        wrapper: gradle::wrapper_script(&project.root).is_some(),
        wrapper_version: gradle::wrapper_version(&project.root),
        environment: HealthChecker::new()
            .with_android_checks()
            .add_check(PathCheck::readable(project.root.display().to_string()))
            .run(),
        warnings,
    }
}

impl ProjectReport {
    /// Whether the project passes the doctor's hard checks
    pub fn is_passing(&self) -> bool {
        self.repositories.is_satisfied() && self.environment.status != HealthStatus::Unhealthy
    }

    /// Print the human-readable report, returning the exit code
    pub fn print_report(&self) -> i32 {
        Status::header(&format!("Doctor report for {}", self.project));
        println!("  root: {}", self.root);

        Status::subheader("Modules");
        print_module_table(&self.modules);

        Status::subheader("Repositories");
        for token in &self.repositories.declared {
            println!("  {} {token}", "✓".green());
        }
        for token in &self.repositories.missing {
            println!("  {} {token} not declared", "✗".red());
        }

        Status::subheader("Build layout");
        println!("  shared build dir: {}", self.shared_build_dir);
        match (self.wrapper, &self.wrapper_version) {
            (true, Some(version)) => {
                println!("  {} gradle wrapper {version}", "✓".green());
            }
            (true, None) => println!("  {} gradle wrapper (version unknown)", "✓".green()),
            (false, _) => println!("  {} no gradle wrapper", "⚠".yellow()),
        }

        Status::subheader("Environment");
        for check in &self.environment.checks {
            let glyph = match check.status {
                HealthStatus::Healthy => "✓".green().to_string(),
                HealthStatus::Degraded => "⚠".yellow().to_string(),
                HealthStatus::Unhealthy => "✗".red().to_string(),
                HealthStatus::Unknown => "?".dimmed().to_string(),
            };
            match &check.message {
                Some(message) => println!("  {glyph} {}: {message}", check.name),
                None => println!("  {glyph} {}", check.name),
            }
        }
        println!(
            "  checks completed in {}",
            format_duration(Duration::from_millis(self.environment.total_duration_ms))
        );

        if !self.warnings.is_empty() {
            Status::subheader("Warnings");
            for warning in &self.warnings {
                println!("  {} {}: {}", "⚠".yellow(), warning.field, warning.message);
            }
        }

        println!();
        if !self.repositories.is_satisfied() {
            Status::error("Required repositories are missing");
            return exit_codes::FAILURE;
        }
        if self.environment.status == HealthStatus::Unhealthy {
            Status::error("Environment checks failed");
            return exit_codes::FAILURE;
        }
        Status::success("Project looks healthy");
        exit_codes::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn fixture() -> (tempfile::TempDir, AndroidProject) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("settings.gradle.kts"),
            "rootProject.name = \"demo\"\ninclude(\":app\", \":maps\", \":docs\")\n",
        );
        write(
            &root.join("build.gradle.kts"),
            "allprojects {\n    repositories {\n        google()\n        mavenCentral()\n    }\n}\n",
        );
        write(
            &root.join("app").join("build.gradle.kts"),
            "plugins { id(\"com.android.application\") }\nandroid {\n    namespace = \"com.demo.app\"\n}\n",
        );
        write(
            &root.join("maps").join("build.gradle.kts"),
            "plugins { id(\"com.android.library\") }\nandroid { }\n",
        );
        write(
            &root.join("maps").join("src").join("main").join("AndroidManifest.xml"),
            r#"<manifest package="com.demo.maps"/>"#,
        );
        let project = AndroidProject::discover(root).unwrap();
        (dir, project)
    }

    #[test]
    fn test_module_summaries() {
        let (_dir, project) = fixture();
        let modules = summarize_modules(&project);

        let app = modules.iter().find(|m| m.path == ":app").unwrap();
        assert_eq!(app.kind, "application");
        assert_eq!(app.namespace.as_deref(), Some("com.demo.app"));
        assert!(!app.needs_backfill);

        let maps = modules.iter().find(|m| m.path == ":maps").unwrap();
        assert_eq!(maps.kind, "library");
        assert!(maps.namespace.is_none());
        assert_eq!(maps.manifest_package.as_deref(), Some("com.demo.maps"));
        assert!(maps.needs_backfill);

        let docs = modules.iter().find(|m| m.path == ":docs").unwrap();
        assert_eq!(docs.kind, "plain");
        assert!(!docs.needs_backfill);
    }

    #[test]
    fn test_diagnose_report() {
        let (_dir, project) = fixture();
        let report = diagnose(&project, &ConfigSchema::default());

        assert_eq!(report.project, "demo");
        assert!(report.repositories.is_satisfied());
        assert!(!report.wrapper);
        assert!(report.shared_build_dir.ends_with("build"));
        assert!(!report.environment.checks.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_diagnose_warns_on_odd_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("settings.gradle"), "include ':lib'\n");
        write(
            &root.join("lib").join("build.gradle"),
            "apply plugin: 'com.android.library'\nandroid {\n    namespace 'singleword'\n}\n",
        );

        let project = AndroidProject::discover(root).unwrap();
        let report = diagnose(&project, &ConfigSchema::default());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, ":lib.namespace");
    }

    #[test]
    fn test_report_serializes_to_json() {
        let (_dir, project) = fixture();
        let report = diagnose(&project, &ConfigSchema::default());

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"project\":\"demo\""));
        assert!(json.contains("needs_backfill"));
    }
}
