//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub backfill: BackfillConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub evaluation: EvaluationConfig,

    #[serde(default)]
    pub repositories: RepositoriesConfig,
}

/// General project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Project name
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Android host project directory, relative to the app root
    #[serde(default = "default_android_dir")]
    pub android_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            android_dir: default_android_dir(),
        }
    }
}

fn default_project_name() -> String {
    "Trellis".to_string()
}

fn default_android_dir() -> String {
    "android".to_string()
}

/// Namespace backfill configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackfillConfig {
    /// Modules to leave untouched, by settings path (e.g. ":legacy_maps")
    #[serde(default)]
    pub exclude_modules: Vec<String>,
}

/// Build output layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Redirect build output to the shared directory
    #[serde(default = "default_true")]
    pub redirect_build_dir: bool,

    /// Shared build directory, relative to the Android project directory.
    /// Defaults to the sibling of the project directory.
    #[serde(default = "default_shared_build_dir")]
    pub shared_build_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            redirect_build_dir: true,
            shared_build_dir: default_shared_build_dir(),
        }
    }
}

fn default_shared_build_dir() -> String {
    "../build".to_string()
}

fn default_true() -> bool {
    true
}

/// Module evaluation ordering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Module every other module's evaluation depends on
    #[serde(default = "default_app_module")]
    pub app_module: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            app_module: default_app_module(),
        }
    }
}

fn default_app_module() -> String {
    ":app".to_string()
}

/// Shared repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoriesConfig {
    /// Repository declarations every project is expected to carry
    #[serde(default = "default_required_repositories")]
    pub required: Vec<String>,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            required: default_required_repositories(),
        }
    }
}

fn default_required_repositories() -> Vec<String> {
    vec!["google()", "mavenCentral()"]
        .into_iter()
        .map(String::from)
        .collect()
}
