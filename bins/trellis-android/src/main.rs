//! Trellis Android CLI
//!
//! Configures and repairs the Gradle host project of the Trellis app.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use trellis_android::doctor;
use trellis_android::{AndroidProject, BuildLayout, NamespaceBackfiller};
use trellis_cli::output::{format_count, Status};
use trellis_cli::progress::spinner;
use trellis_core::config::Config;
use trellis_core::error::exit_codes;
use trellis_core::logging::{self, LogConfig};

#[derive(Parser)]
#[command(name = "trellis-android")]
#[command(about = "Gradle configuration tools for the Trellis Android project")]
#[command(version)]
struct Cli {
    /// Android project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in missing library namespaces from their manifests
    Backfill {
        /// Report what would change without editing any files
        #[arg(long)]
        dry_run: bool,
        /// Like --dry-run, but exit non-zero while work remains
        #[arg(long, conflicts_with = "dry_run")]
        check: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List modules and their namespace state
    Modules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose the project and local environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete build outputs
    Clean {
        /// Report what would be deleted without deleting it
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    logging::init(&LogConfig {
        verbosity: cli.verbose,
        quiet: cli.quiet,
    })?;

    let config = match Config::load(cli.config.as_deref().map(|p| p.to_str().unwrap())) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&format!("{}", e));
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };
    if let Err(e) = config.validate().to_result() {
        Status::error(&format!("{}", e));
        std::process::exit(exit_codes::CONFIG_ERROR);
    }

    let exit_code = match cli.command {
        Commands::Backfill {
            dry_run,
            check,
            json,
        } => run_backfill(&cli.project_dir, &config, dry_run, check, json),
        Commands::Modules { json } => run_modules(&cli.project_dir, json),
        Commands::Doctor { json } => run_doctor(&cli.project_dir, &config, json),
        Commands::Clean { dry_run } => run_clean(&cli.project_dir, &config, dry_run),
    };

    std::process::exit(exit_code);
}

fn discover(project_dir: &Path) -> Option<AndroidProject> {
    match AndroidProject::discover(project_dir) {
        Ok(project) => Some(project),
        Err(e) => {
            Status::error(&format!("{}", e));
            None
        }
    }
}

fn run_backfill(project_dir: &Path, config: &Config, dry_run: bool, check: bool, json: bool) -> i32 {
    let Some(mut project) = discover(project_dir) else {
        return exit_codes::PROJECT_ERROR;
    };

    let backfiller = NamespaceBackfiller::new(dry_run || check)
        .exclude(&config.schema.backfill.exclude_modules);
    let report = backfiller.run(&mut project, &config.schema.evaluation.app_module);

    let code = if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => {
                println!("{}", out);
                if report.summary.failed > 0 {
                    exit_codes::FAILURE
                } else {
                    exit_codes::SUCCESS
                }
            }
            Err(e) => {
                Status::error(&format!("JSON encoding failed: {}", e));
                exit_codes::FAILURE
            }
        }
    } else {
        report.print_results()
    };

    if check && report.has_pending_work() {
        if !json {
            Status::warning(&format!(
                "{} still missing a namespace; run 'trellis-android backfill' to fix them",
                format_count(report.summary.applied, "module", "modules")
            ));
        }
        return exit_codes::FAILURE;
    }
    code
}

fn run_modules(project_dir: &Path, json: bool) -> i32 {
    let Some(project) = discover(project_dir) else {
        return exit_codes::PROJECT_ERROR;
    };
    let modules = doctor::summarize_modules(&project);

    if json {
        match serde_json::to_string_pretty(&modules) {
            Ok(out) => {
                println!("{}", out);
                exit_codes::SUCCESS
            }
            Err(e) => {
                Status::error(&format!("JSON encoding failed: {}", e));
                exit_codes::FAILURE
            }
        }
    } else {
        Status::header(&format!("Modules of {}", project.name));
        if modules.is_empty() {
            Status::info("no Gradle modules found");
            return exit_codes::SUCCESS;
        }
        doctor::print_module_table(&modules)
    }
}

fn run_doctor(project_dir: &Path, config: &Config, json: bool) -> i32 {
    let Some(project) = discover(project_dir) else {
        return exit_codes::PROJECT_ERROR;
    };
    let report = if json {
        doctor::diagnose(&project, &config.schema)
    } else {
        // the environment checks shell out, so this can take a moment
        let spin = spinner("Checking project and environment...");
        let report = doctor::diagnose(&project, &config.schema);
        spin.finish_and_clear();
        report
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => {
                println!("{}", out);
                if report.is_passing() {
                    exit_codes::SUCCESS
                } else {
                    exit_codes::FAILURE
                }
            }
            Err(e) => {
                Status::error(&format!("JSON encoding failed: {}", e));
                exit_codes::FAILURE
            }
        }
    } else {
        report.print_report()
    }
}

fn run_clean(project_dir: &Path, config: &Config, dry_run: bool) -> i32 {
    let Some(project) = discover(project_dir) else {
        return exit_codes::PROJECT_ERROR;
    };
    let layout = BuildLayout::from_config(&project.root, &config.schema.layout);

    match layout.clean(&project, dry_run) {
        Ok(report) => report.print_results(),
        Err(e) => {
            Status::error(&format!("Clean failed: {}", e));
            exit_codes::FAILURE
        }
    }
}
