//! Gradle module model

use crate::build_script::{BuildScript, NamespaceQuery};
use crate::manifest::Manifest;
use std::path::PathBuf;

const ANDROID_LIBRARY: &str = "com.android.library";
const ANDROID_APPLICATION: &str = "com.android.application";

/// One module of a Gradle build
#[derive(Debug, Clone)]
pub struct Module {
    /// Short name, the last segment of the settings path
    pub name: String,
    /// Settings path, e.g. `:app` or `:feature:maps`
    pub path: String,
    /// Module directory on disk
    pub dir: PathBuf,
    /// The module's build script, when it has one
    pub build_script: Option<BuildScript>,
}

impl Module {
    /// Build a module from its settings path and directory
    pub fn new(path: String, dir: PathBuf, build_script: Option<BuildScript>) -> Self {
        let name = path
            .rsplit(':')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&path)
            .to_string();
        Self {
            name,
            path,
            dir,
            build_script,
        }
    }

    /// Whether this module applies the Android library plugin
    pub fn is_android_library(&self) -> bool {
        self.build_script
            .as_ref()
            .is_some_and(|script| script.has_plugin(ANDROID_LIBRARY))
    }

    /// Whether this module applies the Android application plugin
    pub fn is_android_application(&self) -> bool {
        self.build_script
            .as_ref()
            .is_some_and(|script| script.has_plugin(ANDROID_APPLICATION))
    }

    /// Ask the module for its namespace declaration
    pub fn namespace_query(&self) -> NamespaceQuery {
        match &self.build_script {
            Some(script) => script.namespace_query(),
            None => NamespaceQuery::Unsupported("module has no build script".to_string()),
        }
    }

    /// The module's manifest, when present at its fixed location
    pub fn manifest(&self) -> Option<Manifest> {
        Manifest::locate(&self.dir)
    }

    /// Settings paths of sibling modules this module depends on
    pub fn project_dependencies(&self) -> Vec<String> {
        self.build_script
            .as_ref()
            .map(BuildScript::project_dependencies)
            .unwrap_or_default()
    }
}
