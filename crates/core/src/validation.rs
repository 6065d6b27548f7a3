//! Configuration and input validation
//!
//! Provides validation for:
//! - Configuration files
//! - Namespace identifiers
//! - File paths
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("app_module", &config.app_module)
//!     .pattern("app_module", &config.app_module, r"^:\w+$", "a settings path")
//!     .validate();
//!
//! if !result.is_valid() {
//!     for error in result.errors() {
//!         eprintln!("Validation error: {}", error);
//!     }
//! }
//! ```

use crate::error::{Error, ErrorCode, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            Err(Error::new(
                ErrorCode::ValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate against a regex pattern
    pub fn pattern(mut self, field: &str, value: &str, pattern: &str, description: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(value) {
                    self.result.add_error(ValidationError {
                        field: field.to_string(),
                        message: format!("Must match {}", description),
                        code: "PATTERN".to_string(),
                        expected: Some(description.to_string()),
                        actual: Some(value.to_string()),
                    });
                }
            }
            Err(_) => {
                self.result.add_error(ValidationError {
                    field: field.to_string(),
                    message: "Invalid validation pattern".to_string(),
                    code: "INTERNAL".to_string(),
                    expected: None,
                    actual: None,
                });
            }
        }
        self
    }

    /// Validate that a list has at least one entry
    pub fn not_empty_list(mut self, field: &str, values: &[String]) -> Self {
        if values.is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "List must not be empty".to_string(),
                code: "EMPTY_LIST".to_string(),
                expected: Some("at least one entry".to_string()),
                actual: Some("empty list".to_string()),
            });
        }
        self
    }

    /// Validate that a path is a directory
    pub fn is_directory(mut self, field: &str, path: &Path) -> Self {
        if !path.is_dir() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Not a directory: {}", path.display()),
                code: "NOT_A_DIRECTORY".to_string(),
                expected: Some("directory".to_string()),
                actual: Some(if path.is_file() {
                    "file".to_string()
                } else {
                    "not found".to_string()
                }),
            });
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Validate an Android namespace identifier
///
/// Namespaces are expected to be reverse-domain identifiers with at least two
/// segments (`com.example.app`). A value that deviates produces a warning, not
/// an error: Gradle accepts any string here, the Android plugin is what
/// eventually objects.
pub fn validate_namespace_format(module: &str, namespace: &str) -> ValidationResult {
    let field = format!("{}.namespace", module);
    let looks_reverse_domain = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$")
        .map(|re| re.is_match(namespace))
        .unwrap_or(false);

    Validator::new()
        .required(&field, namespace)
        .warn_if(
            &field,
            !namespace.trim().is_empty() && !looks_reverse_domain,
            "Does not look like a reverse-domain identifier (e.g. com.example.app)",
        )
        .validate()
}
