//! Project service for Schemata

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ProjectError;
use crate::models::config::{ProjectConfig, SchemataConfig};

use super::config::PROJECT_DIR;
use super::layout::ProjectLayout;

/// Project service trait
#[async_trait]
pub trait ProjectService: Send + Sync {
    /// Initialize a new project
    async fn init(&self, name: Option<&str>, force: bool) -> Result<ProjectInfo, ProjectError>;

    /// Get project status
    async fn status(&self, config: &SchemataConfig) -> Result<ProjectStatus, ProjectError>;

    /// Check if project is initialized
    fn is_initialized(&self) -> bool;
}

/// Project information
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub name: String,
    pub root: PathBuf,
    pub config_path: PathBuf,
}

/// Project status
#[derive(Debug, Clone)]
pub struct ProjectStatus {
    pub initialized: bool,
    pub project: Option<ProjectInfo>,
    pub source_root: PathBuf,
    /// Schema documents found under the source root
    pub document_count: usize,
}

/// Default project service
pub struct DefaultProjectService {
    root: PathBuf,
}

impl DefaultProjectService {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    fn config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    fn default_name(&self) -> String {
        self.root
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string())
    }
}

#[async_trait]
impl ProjectService for DefaultProjectService {
    async fn init(&self, name: Option<&str>, force: bool) -> Result<ProjectInfo, ProjectError> {
        let project_dir = self.project_dir();

        if project_dir.exists() && !force {
            return Err(ProjectError::AlreadyExists(self.root.clone()));
        }

        tokio::fs::create_dir_all(&project_dir).await?;

        let project_name = name
            .map(|n| n.to_string())
            .unwrap_or_else(|| self.default_name());

        let config = SchemataConfig {
            project: ProjectConfig {
                name: Some(project_name.clone()),
                ..Default::default()
            },
            ..Default::default()
        };

        let content = toml::to_string_pretty(&config)
            .map_err(|e| ProjectError::Io(std::io::Error::other(e)))?;
        tokio::fs::write(self.config_path(), content).await?;
        tracing::info!("Initialized project '{}' at {}", project_name, self.root.display());

        Ok(ProjectInfo {
            name: project_name,
            root: self.root.clone(),
            config_path: self.config_path(),
        })
    }

    async fn status(&self, config: &SchemataConfig) -> Result<ProjectStatus, ProjectError> {
        let layout = ProjectLayout::new(&self.root, &config.project);
        let source_root = layout.source_root().to_path_buf();
        let document_count = tokio::task::spawn_blocking(move || layout.discover_files().len())
            .await
            .map_err(|e| ProjectError::Io(std::io::Error::other(e)))?;

        let project = self.is_initialized().then(|| ProjectInfo {
            name: config
                .project
                .name
                .clone()
                .unwrap_or_else(|| self.default_name()),
            root: self.root.clone(),
            config_path: self.config_path(),
        });

        Ok(ProjectStatus {
            initialized: project.is_some(),
            project,
            source_root,
            document_count,
        })
    }

    fn is_initialized(&self) -> bool {
        self.config_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config() {
        let temp = TempDir::new().unwrap();
        let service = DefaultProjectService::new(temp.path());
        assert!(!service.is_initialized());

        let info = service.init(Some("demo"), false).await.unwrap();
        assert_eq!(info.name, "demo");
        assert!(service.is_initialized());

        let content = std::fs::read_to_string(info.config_path).unwrap();
        let config: SchemataConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.project.name.as_deref(), Some("demo"));
    }

    #[tokio::test]
    async fn test_init_twice_fails_without_force() {
        let temp = TempDir::new().unwrap();
        let service = DefaultProjectService::new(temp.path());
        service.init(None, false).await.unwrap();

        let err = service.init(None, false).await.unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
        assert!(service.init(None, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_status_counts_documents() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.sdoc"), "").unwrap();
        std::fs::write(temp.path().join("b.sdoc"), "").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "").unwrap();

        let service = DefaultProjectService::new(temp.path());
        let status = service.status(&SchemataConfig::default()).await.unwrap();
        assert!(!status.initialized);
        assert!(status.project.is_none());
        assert_eq!(status.document_count, 2);
    }
}
