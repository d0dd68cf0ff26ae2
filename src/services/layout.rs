//! Project layout
//!
//! Walks the source root with the `ignore` crate (gitignore-aware) and maps
//! each schema file to the module it implements:
//!
//! - `a/b.sdoc` implements `::a::b`
//! - `a/mod.sdoc` implements `::a`
//! - `mod.sdoc` implements `::`

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};

use crate::models::config::ProjectConfig;
use crate::models::path::ModulePath;
use crate::models::source::path_to_uri;
use crate::symbols::SymbolTable;
use crate::syntax::reader::is_identifier_char;

/// File stem that stands for its parent directory's module
pub const MOD_FILE_STEM: &str = "mod";

const PROJECT_DIR: &str = ".schemata";

#[derive(Debug, Clone)]
pub struct ProjectLayout {
    source_root: PathBuf,
    project_root: PathBuf,
    extension: String,
    ignored_paths: Vec<String>,
}

impl ProjectLayout {
    pub fn new(project_root: &Path, config: &ProjectConfig) -> Self {
        let source_root = match &config.source_root {
            Some(dir) => project_root.join(dir),
            None => project_root.to_path_buf(),
        };
        Self {
            source_root,
            project_root: project_root.to_path_buf(),
            extension: config.extension.clone(),
            ignored_paths: config.ignored_paths.clone(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Build override patterns from the configured ignored paths
    fn build_overrides(&self) -> Option<Override> {
        if self.ignored_paths.is_empty() {
            return None;
        }
        let mut builder = OverrideBuilder::new(&self.source_root);
        for pattern in &self.ignored_paths {
            // Override globs whitelist on match; negate to ignore
            if let Err(e) = builder.add(&format!("!{}", pattern)) {
                tracing::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }
        builder.build().ok()
    }

    fn walk_builder(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.source_root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false)
            .sort_by_file_path(|a, b| a.cmp(b));

        let custom_ignore = self.project_root.join(PROJECT_DIR).join("ignore");
        if custom_ignore.exists()
            && let Some(err) = builder.add_ignore(&custom_ignore)
        {
            tracing::warn!("Failed to parse {}: {}", custom_ignore.display(), err);
        }
        if let Some(overrides) = self.build_overrides() {
            builder.overrides(overrides);
        }
        builder
    }

    /// Schema files under the source root, in path order
    pub fn discover_files(&self) -> Vec<PathBuf> {
        self.walk_builder()
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
            })
            .collect()
    }

    /// Module implemented by `file`, or `None` when it is outside the source root
    /// or a segment is not a valid identifier
    pub fn module_path(&self, file: &Path) -> Option<ModulePath> {
        let relative = file.strip_prefix(&self.source_root).ok()?;
        let stem = relative.file_stem()?.to_str()?;

        let mut path = ModulePath::root();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                path.push(component.as_os_str().to_str()?);
            }
        }
        if stem != MOD_FILE_STEM {
            path.push(stem);
        }

        let valid = path.segments().iter().all(|segment| {
            segment
                .chars()
                .enumerate()
                .all(|(i, c)| is_identifier_char(c, i == 0))
        });
        if !valid {
            tracing::warn!("{} does not map to a module path", file.display());
            return None;
        }
        Some(path)
    }

    /// Register every discovered file as a module symbol
    pub fn scan(&self, table: &mut SymbolTable) -> Vec<(ModulePath, String)> {
        table.clear_layout();
        let mut modules = Vec::new();
        for file in self.discover_files() {
            if let Some(path) = self.module_path(&file) {
                let uri = path_to_uri(&file);
                table.register_module(&path, &uri);
                modules.push((path, uri));
            }
        }
        tracing::debug!(
            "Registered {} modules under {}",
            modules.len(),
            self.source_root.display()
        );
        modules
    }
}
