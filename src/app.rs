//! Application container for Schemata

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::OutputContext;
use crate::config;
use crate::models::config::SchemataConfig;
use crate::services::config::{ConfigService, DefaultConfigService, PROJECT_DIR};
use crate::services::documents::TextDocuments;
use crate::services::layout::ProjectLayout;
use crate::services::project::{DefaultProjectService, ProjectService};
use crate::services::workspace::Workspace;
use crate::syntax::ParseOptions;

pub struct App {
    root: PathBuf,
    pub(crate) output: OutputContext,
    pub(crate) documents: Arc<TextDocuments>,
    pub(crate) project: Arc<dyn ProjectService>,
    pub(crate) config_service: Arc<dyn ConfigService>,
    pub(crate) config: SchemataConfig,
}

impl App {
    pub async fn new() -> anyhow::Result<Self> {
        let root = std::env::current_dir()?;
        Self::with_root(root).await
    }

    pub async fn with_root(root: PathBuf) -> anyhow::Result<Self> {
        tracing::debug!("Initializing Schemata at {:?}", root);

        let config_service = Arc::new(DefaultConfigService::new(&root));
        let config = match config_service.load(false).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {}", e);
                SchemataConfig::default()
            }
        };

        config::init(&config);

        let output = OutputContext::new(root.clone(), config.output.pretty);
        let project = Arc::new(DefaultProjectService::new(&root));

        Ok(Self {
            root,
            output,
            documents: Arc::new(TextDocuments::new()),
            project,
            config_service,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SchemataConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.root.join(PROJECT_DIR).exists()
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.root, &self.config.project)
    }

    /// Workspace over the project's documents with every module registered
    pub async fn workspace(&self, options: ParseOptions) -> Workspace {
        let layout = self.layout();
        let mut workspace =
            Workspace::new(self.documents.clone(), &self.config).with_parse_options(options);
        let uris = workspace.register_layout(&layout);
        let loaded = workspace.preload().await;
        tracing::debug!("Preloaded {}/{} documents", loaded, uris.len());
        workspace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::workspace::ModuleLoader;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_checks_project_files() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("a")).unwrap();
        std::fs::write(temp.path().join("a/b.sdoc"), "struct Foo {}\n").unwrap();
        std::fs::write(
            temp.path().join("a/c.sdoc"),
            "use super::b::Foo;\nstruct Bar { foo: Foo }\n",
        )
        .unwrap();

        tokio_test::block_on(async {
            let app = App::with_root(temp.path().to_path_buf()).await.unwrap();
            assert!(!app.is_initialized());

            let mut workspace = app.workspace(ParseOptions::default()).await;
            let results = workspace.check_all().await;
            assert_eq!(results.len(), 2);
            for (uri, result) in &results {
                assert!(result.is_ok());
                assert!(workspace.diagnostics(uri).is_empty(), "{uri}");
                assert!(workspace.is_checked(uri));
            }
        });
    }
}
