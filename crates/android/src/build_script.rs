//! Gradle build script parsing and editing
//!
//! Each module's `build.gradle` or `build.gradle.kts` is the module's
//! configuration surface. The file is held in memory as text and edited
//! with targeted pattern replacements, so unrelated formatting and
//! comments survive a rewrite untouched. Nothing here evaluates Gradle:
//! a script that declares no `android` block simply does not support
//! namespace configuration, and that is reported as data rather than an
//! error.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use trellis_core::error::{Error, Result};

/// Plugin application forms across both DSLs
static PLUGIN_DECLS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // plugins { id("com.android.library") } / id 'com.android.library'
        Regex::new(r#"\bid\s*\(\s*["']([A-Za-z0-9_.\-]+)["']\s*\)"#).unwrap(),
        Regex::new(r#"\bid\s+["']([A-Za-z0-9_.\-]+)["']"#).unwrap(),
        // apply(plugin = "…") / apply plugin: '…'
        Regex::new(r#"\bapply\s*\(\s*plugin\s*=\s*["']([A-Za-z0-9_.\-]+)["']\s*\)"#).unwrap(),
        Regex::new(r#"\bapply\s+plugin:\s*["']([A-Za-z0-9_.\-]+)["']"#).unwrap(),
    ]
});

/// Opening line of the android configuration block
static ANDROID_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)android\s*\{").unwrap());

/// A namespace declaration inside the script, with its indentation
static NAMESPACE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^([ \t]*)namespace\s*=?\s*["']([^"']*)["']"#).unwrap());

/// project(":path") references in dependency declarations
static PROJECT_DEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bproject\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap());

/// Which Gradle DSL a build script is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptDialect {
    /// `build.gradle`
    Groovy,
    /// `build.gradle.kts`
    KotlinDsl,
}

/// Result of asking a build script for its namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceQuery {
    /// A namespace declaration is present, with its raw value
    Declared(String),
    /// The script has an android block but no namespace declaration
    Missing,
    /// The script cannot carry a namespace at all
    Unsupported(String),
}

/// A module build script loaded into memory
#[derive(Debug, Clone)]
pub struct BuildScript {
    /// Path to the script file
    pub path: PathBuf,
    /// DSL the script is written in
    pub dialect: ScriptDialect,
    /// Current script text, including unsaved edits
    pub content: String,
}

impl BuildScript {
    /// Locate and load the build script in a module directory
    ///
    /// Checks `build.gradle` before `build.gradle.kts`, matching Gradle's
    /// own lookup order. Returns `Ok(None)` when the directory has
    /// neither.
    pub fn locate(dir: &Path) -> Result<Option<Self>> {
        for (name, dialect) in [
            ("build.gradle", ScriptDialect::Groovy),
            ("build.gradle.kts", ScriptDialect::KotlinDsl),
        ] {
            let path = dir.join(name);
            if path.is_file() {
                return Ok(Some(Self::load(path, dialect)?));
            }
        }
        Ok(None)
    }

    /// Load a script from a known path
    pub fn load(path: PathBuf, dialect: ScriptDialect) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Ok(Self {
            path,
            dialect,
            content,
        })
    }

    /// All plugin ids applied by this script, in declaration order
    pub fn plugin_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for decl in PLUGIN_DECLS.iter() {
            for captured in decl.captures_iter(&self.content) {
                let id = captured[1].to_string();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Whether the script applies the given plugin id
    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.plugin_ids().iter().any(|id| id == plugin_id)
    }

    /// Whether the script has an android configuration block
    pub fn has_android_block(&self) -> bool {
        ANDROID_BLOCK.is_match(&self.content)
    }

    /// Ask the script for its namespace declaration
    pub fn namespace_query(&self) -> NamespaceQuery {
        if !self.has_android_block() {
            return NamespaceQuery::Unsupported(
                "build script has no android block".to_string(),
            );
        }
        match NAMESPACE_DECL.captures(&self.content) {
            Some(captured) => NamespaceQuery::Declared(captured[2].to_string()),
            None => NamespaceQuery::Missing,
        }
    }

    /// Set the namespace in the script text
    ///
    /// An existing declaration is rewritten in place, keeping its
    /// indentation. Otherwise a new declaration is inserted directly
    /// under the `android {` line; a block that opens and closes on one
    /// line is broken open first so the declaration stays inside it.
    /// Only the in-memory text changes; call [`save`](Self::save) to
    /// write it back.
    pub fn set_namespace(&mut self, value: &str) -> Result<()> {
        let declaration = |indent: &str| match self.dialect {
            ScriptDialect::KotlinDsl => format!("{indent}namespace = \"{value}\""),
            ScriptDialect::Groovy => format!("{indent}namespace '{value}'"),
        };

        if let Some(captured) = NAMESPACE_DECL.captures(&self.content) {
            let range = captured.get(0).map(|m| m.range()).unwrap_or_default();
            let indent = captured[1].to_string();
            self.content.replace_range(range, &declaration(&indent));
            return Ok(());
        }

        let Some(captured) = ANDROID_BLOCK.captures(&self.content) else {
            return Err(Error::build_script(format!(
                "cannot set namespace in {}: no android block",
                self.path.display()
            )));
        };
        let block = captured.get(0).map(|m| m.range()).unwrap_or_default();
        let block_indent = captured[1].to_string();
        let indent = format!("{block_indent}    ");
        let line_end = self.content[block.end..]
            .find('\n')
            .map_or(self.content.len(), |offset| block.end + offset);

        let rest = self.content[block.end..line_end].to_string();
        let trimmed = rest.trim();
        if closes_on_same_line(trimmed) {
            // single-line block: break it open so the declaration lands
            // inside rather than after the closing brace
            let closing_indent = if trimmed.starts_with('}') {
                &block_indent
            } else {
                &indent
            };
            let replacement = format!("\n{}\n{closing_indent}{trimmed}", declaration(&indent));
            self.content.replace_range(block.end..line_end, &replacement);
            return Ok(());
        }

        // insert on a fresh line right after `android {`
        self.content
            .insert_str(line_end, &format!("\n{}", declaration(&indent)));
        Ok(())
    }

    /// Write the current script text back to disk
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, &self.content)?;
        Ok(())
    }

    /// Settings paths of sibling modules this script depends on
    pub fn project_dependencies(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for captured in PROJECT_DEP.captures_iter(&self.content) {
            let path = captured[1].to_string();
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }
}

/// Whether a line remainder closes the block opened just before it
fn closes_on_same_line(rest: &str) -> bool {
    let mut depth = 0i32;
    for ch in rest.chars() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}
