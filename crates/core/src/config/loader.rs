//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use crate::validation::{ValidationResult, Validator};
use std::path::Path;

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .pattern(
                "evaluation.app_module",
                &self.schema.evaluation.app_module,
                r"^:[A-Za-z0-9_.-]+$",
                "a settings path like \":app\"",
            )
            .required("layout.shared_build_dir", &self.schema.layout.shared_build_dir)
            .not_empty_list("repositories.required", &self.schema.repositories.required)
            .validate()
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [
        ".trellis-tools.toml",
        "trellis-tools.toml",
        ".config/trellis-tools.toml",
    ];

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
    }

    None
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read config file {}: {}", path, e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse config file {}: {}", path, e)))
}
