//! Configuration service for Schemata
//!
//! Global config is read from `$XDG_CONFIG_HOME/schemata/config.toml`, then
//! overlaid by `<project>/.schemata/config.toml` and `SCHEMATA_*` variables.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ConfigError;
use crate::models::config::{ProjectConfig, RegistryConfig, SchemataConfig};

pub const PROJECT_DIR: &str = ".schemata";
const CONFIG_FILE: &str = "config.toml";

#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn load(&self, global_only: bool) -> Result<SchemataConfig, ConfigError>;
    fn config_path(&self, global: bool) -> PathBuf;
    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError>;
}

pub struct DefaultConfigService {
    root: PathBuf,
}

impl DefaultConfigService {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn global_config_path() -> PathBuf {
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("schemata")
            .join(CONFIG_FILE)
    }

    fn project_config_path(&self) -> PathBuf {
        self.root.join(PROJECT_DIR).join(CONFIG_FILE)
    }

    async fn load_from_path(path: &Path) -> Result<SchemataConfig, ConfigError> {
        if !path.exists() {
            return Ok(SchemataConfig::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    async fn write_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(&SchemataConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigService for DefaultConfigService {
    async fn load(&self, global_only: bool) -> Result<SchemataConfig, ConfigError> {
        let global = Self::load_from_path(&Self::global_config_path()).await?;
        if global_only {
            return Ok(global);
        }

        let project = Self::load_from_path(&self.project_config_path()).await?;
        let config = merge_config(global, project);
        apply_env_overrides(config, |key| std::env::var(key).ok())
    }

    fn config_path(&self, global: bool) -> PathBuf {
        if global {
            Self::global_config_path()
        } else {
            self.project_config_path()
        }
    }

    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError> {
        let path = self.config_path(global);

        if path.exists() && !force {
            return Err(ConfigError::InvalidValue {
                key: "config".to_string(),
                message: format!(
                    "Config already exists: {}. Use --force to overwrite.",
                    path.display()
                ),
            });
        }

        Self::write_default_config(&path).await?;
        tracing::info!("Wrote default config to {}", path.display());
        Ok(path)
    }
}

/// Project settings win; known registries from both files are kept
fn merge_config(base: SchemataConfig, overlay: SchemataConfig) -> SchemataConfig {
    let mut known = base.registries.known;
    for registry in overlay.registries.known {
        if !known.contains(&registry) {
            known.push(registry);
        }
    }

    SchemataConfig {
        project: ProjectConfig {
            name: overlay.project.name.or(base.project.name),
            ..overlay.project
        },
        checker: overlay.checker,
        registries: RegistryConfig {
            default_namespace: overlay.registries.default_namespace,
            known,
        },
        output: overlay.output,
    }
}

fn apply_env_overrides(
    mut config: SchemataConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<SchemataConfig, ConfigError> {
    fn parse_usize(key: &str, value: String) -> Result<usize, ConfigError> {
        value.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a non-negative integer, got '{}'", value),
        })
    }

    if let Some(val) = var("SCHEMATA_OUTPUT_PRETTY") {
        config.output.pretty = val.parse().map_err(|_| ConfigError::InvalidValue {
            key: "SCHEMATA_OUTPUT_PRETTY".to_string(),
            message: format!("expected true or false, got '{}'", val),
        })?;
    }
    if let Some(val) = var("SCHEMATA_DEFAULT_NAMESPACE") {
        config.registries.default_namespace = val;
    }
    if let Some(val) = var("SCHEMATA_MAX_PATH_DEPTH") {
        config.checker.max_path_depth = parse_usize("SCHEMATA_MAX_PATH_DEPTH", val)?;
    }
    if let Some(val) = var("SCHEMATA_MAX_LOAD_DEPTH") {
        config.checker.max_load_depth = parse_usize("SCHEMATA_MAX_LOAD_DEPTH", val)?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_and_load_project_config() {
        let temp = TempDir::new().unwrap();
        let service = DefaultConfigService::new(temp.path());

        let path = service.init(false, false).await.unwrap();
        assert_eq!(path, temp.path().join(".schemata/config.toml"));

        let loaded = DefaultConfigService::load_from_path(&path).await.unwrap();
        assert_eq!(loaded.project.extension, "sdoc");
        assert_eq!(loaded.registries.default_namespace, "core");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let service = DefaultConfigService::new(temp.path());
        service.init(false, false).await.unwrap();

        let err = service.init(false, false).await.unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(service.init(false, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_toml_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[checker\nmax_path_depth = ").unwrap();

        let err = DefaultConfigService::load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_merge_keeps_global_registries_and_name() {
        let mut global = SchemataConfig::default();
        global.project.name = Some("global".into());
        global.registries.known.push("mod:gadget".into());

        let mut project = SchemataConfig::default();
        project.project.extension = "schema".into();
        project.registries.known = vec!["core:item".into(), "core:dimension".into()];

        let merged = merge_config(global, project);
        assert_eq!(merged.project.name.as_deref(), Some("global"));
        assert_eq!(merged.project.extension, "schema");
        assert!(merged.registries.is_known("mod:gadget"));
        assert!(merged.registries.is_known("core:dimension"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SCHEMATA_OUTPUT_PRETTY", "false"),
            ("SCHEMATA_MAX_PATH_DEPTH", "4"),
        ]
        .into_iter()
        .collect();
        let config = apply_env_overrides(SchemataConfig::default(), |key| {
            vars.get(key).map(|v| v.to_string())
        })
        .unwrap();
        assert!(!config.output.pretty);
        assert_eq!(config.checker.max_path_depth, 4);
        assert_eq!(config.checker.max_load_depth, 64);
    }

    #[test]
    fn test_invalid_env_override() {
        let err = apply_env_overrides(SchemataConfig::default(), |key| {
            (key == "SCHEMATA_MAX_LOAD_DEPTH").then(|| "deep".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("SCHEMATA_MAX_LOAD_DEPTH"));
    }
}
