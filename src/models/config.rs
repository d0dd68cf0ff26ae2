//! Configuration model for Schemata
//!
//! Loaded from `config.toml` files; every section falls back to defaults.

use serde::{Deserialize, Serialize};

/// Schemata configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemataConfig {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub checker: CheckerConfig,

    #[serde(default)]
    pub registries: RegistryConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: Option<String>,

    /// File extension of schema documents, without the dot
    #[serde(default = "defaults::extension")]
    pub extension: String,

    /// Directory holding the schema files, relative to the project root
    #[serde(default)]
    pub source_root: Option<String>,

    /// Paths to ignore
    #[serde(default = "default_ignored_paths")]
    pub ignored_paths: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            extension: defaults::extension(),
            source_root: None,
            ignored_paths: default_ignored_paths(),
        }
    }
}

fn default_ignored_paths() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        ".git".to_string(),
        "target".to_string(),
        "dist".to_string(),
        "build".to_string(),
        ".schemata".to_string(),
    ]
}

/// Limits applied while binding and checking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    #[serde(default = "defaults::max_path_depth")]
    pub max_path_depth: usize,

    #[serde(default = "defaults::max_load_depth")]
    pub max_load_depth: usize,

    #[serde(default = "defaults::max_file_size_mb")]
    pub max_file_size_mb: u32,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            max_path_depth: defaults::max_path_depth(),
            max_load_depth: defaults::max_load_depth(),
            max_file_size_mb: defaults::max_file_size_mb(),
        }
    }
}

impl CheckerConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        if self.max_file_size_mb == 0 {
            u64::MAX
        } else {
            self.max_file_size_mb as u64 * 1024 * 1024
        }
    }
}

/// Registries that `describes` clauses may target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Namespace applied to registry names written without one
    #[serde(default = "defaults::default_namespace")]
    pub default_namespace: String,

    /// Known registries as full resource locations
    #[serde(default = "defaults::known_registries")]
    pub known: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_namespace: defaults::default_namespace(),
            known: defaults::known_registries(),
        }
    }
}

impl RegistryConfig {
    /// Full `namespace:path` form of a registry name
    pub fn normalize(&self, namespace: Option<&str>, path: &str) -> String {
        format!(
            "{}:{}",
            namespace.unwrap_or(&self.default_namespace),
            path
        )
    }

    pub fn is_known(&self, full_name: &str) -> bool {
        self.known.iter().any(|known| known == full_name)
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Indent JSON output
    #[serde(default = "defaults::pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: defaults::pretty(),
        }
    }
}

mod defaults {
    // Project
    pub fn extension() -> String {
        "sdoc".to_string()
    }

    // Checker
    pub fn max_path_depth() -> usize {
        32
    }
    pub fn max_load_depth() -> usize {
        64
    }
    pub fn max_file_size_mb() -> u32 {
        5
    }

    // Registries
    pub fn default_namespace() -> String {
        "core".to_string()
    }
    pub fn known_registries() -> Vec<String> {
        ["core:item", "core:block", "core:entity", "core:component"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    // Output
    pub fn pretty() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchemataConfig::default();
        assert_eq!(config.project.extension, "sdoc");
        assert_eq!(config.checker.max_path_depth, 32);
        assert_eq!(config.checker.max_load_depth, 64);
        assert_eq!(config.registries.default_namespace, "core");
        assert!(config.output.pretty);
    }

    #[test]
    fn test_ignored_paths() {
        let config = SchemataConfig::default();
        assert!(
            config
                .project
                .ignored_paths
                .contains(&".schemata".to_string())
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SchemataConfig = toml::from_str(
            r#"
[checker]
max_path_depth = 4

[registries]
known = ["custom:thing"]
"#,
        )
        .unwrap();
        assert_eq!(config.checker.max_path_depth, 4);
        assert_eq!(config.checker.max_load_depth, 64);
        assert_eq!(config.registries.default_namespace, "core");
        assert!(config.registries.is_known("custom:thing"));
        assert!(!config.registries.is_known("core:item"));
    }

    #[test]
    fn test_registry_normalize() {
        let registries = RegistryConfig::default();
        assert_eq!(registries.normalize(None, "item"), "core:item");
        assert_eq!(registries.normalize(Some("mod"), "gadget"), "mod:gadget");
    }

    #[test]
    fn test_file_size_limit() {
        let mut checker = CheckerConfig::default();
        assert_eq!(checker.max_file_size_bytes(), 5 * 1024 * 1024);
        checker.max_file_size_mb = 0;
        assert_eq!(checker.max_file_size_bytes(), u64::MAX);
    }
}
