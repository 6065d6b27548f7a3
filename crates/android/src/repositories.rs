//! Shared repository declaration check
//!
//! Modules resolve their dependencies from repositories declared once
//! for the whole build, either in the root build script's
//! `allprojects { repositories { … } }` block or in the settings file's
//! `dependencyResolutionManagement` block. This check reports which of
//! the required declarations are present; it never rewrites the blocks.

use crate::project::AndroidProject;
use serde::{Deserialize, Serialize};

/// Which required repository declarations the project carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryCheck {
    /// Tokens that must be declared, e.g. `google()`
    pub required: Vec<String>,
    /// Tokens found in the root build script or settings file
    pub declared: Vec<String>,
    /// Tokens not found anywhere
    pub missing: Vec<String>,
}

impl RepositoryCheck {
    /// Scan the project for the required repository tokens
    pub fn run(project: &AndroidProject, required: &[String]) -> Self {
        let mut corpus = String::new();
        if let Some(script) = &project.root_build_script {
            corpus.push_str(&script.content);
        }
        if let Some(settings) = &project.settings {
            corpus.push_str(&settings.content);
        }

        let mut declared = Vec::new();
        let mut missing = Vec::new();
        for token in required {
            if corpus.contains(token.as_str()) {
                declared.push(token.clone());
            } else {
                missing.push(token.clone());
            }
        }
        Self {
            required: required.to_vec(),
            declared,
            missing,
        }
    }

    /// Whether every required declaration is present
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }
}
