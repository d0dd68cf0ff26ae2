//! Status command implementation
//!
//! Show whether the project is initialized and how many documents it has.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::services::config::PROJECT_DIR;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Include the resolved config and project directory
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Serialize)]
struct StatusResponse {
    initialized: bool,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    source_root: String,
    extension: String,
    documents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    known_registries: Option<Vec<String>>,
}

pub async fn execute(args: StatusArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let status = app.project.status(app.config()).await?;

    let response = StatusResponse {
        initialized: status.initialized,
        path: app.root().display().to_string(),
        name: status.project.map(|p| p.name),
        source_root: ctx.relative_path(&status.source_root),
        extension: app.config().project.extension.clone(),
        documents: status.document_count,
        project_dir: args
            .detailed
            .then(|| ctx.relative_path(&app.root().join(PROJECT_DIR))),
        known_registries: args
            .detailed
            .then(|| app.config().registries.known.clone()),
    };

    ctx.print_success_flat(response);
    Ok(())
}
