//! Check command implementation
//!
//! Parse, bind and check documents and print their diagnostics.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::cli::response::FileDiagnostics;
use crate::models::diagnostic::ErrorSeverity;
use crate::models::source::{path_to_uri, uri_to_path};
use crate::services::workspace::{ModuleLoader, Workspace};
use crate::syntax::{ParseOptions, TrailingSeparator};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Documents or directories to check (defaults to the whole project)
    pub paths: Vec<PathBuf>,

    /// Minimum severity to report (error, warning, info, hint)
    #[arg(short, long, default_value = "hint")]
    pub severity: ErrorSeverity,

    /// Trailing comma policy for struct and enum bodies
    #[arg(long, default_value = "allowed")]
    pub trailing: TrailingSeparator,
}

#[derive(Serialize)]
struct FailureOutput {
    file: String,
    error: String,
}

#[derive(Serialize)]
struct CheckResponse {
    checked: usize,
    error_count: usize,
    warning_count: usize,
    files: Vec<FileDiagnostics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailureOutput>,
}

/// Document URIs selected by `paths`
fn target_uris(workspace: &Workspace, root: &Path, paths: &[PathBuf]) -> Vec<String> {
    let mut uris = Vec::new();
    for path in paths {
        let path = if path.is_absolute() {
            path.clone()
        } else {
            root.join(path)
        };
        if path.is_dir() {
            uris.extend(
                workspace
                    .table()
                    .module_uris()
                    .into_iter()
                    .map(|(_, uri)| uri)
                    .filter(|uri| uri_to_path(uri).starts_with(&path)),
            );
        } else {
            uris.push(path_to_uri(&path));
        }
    }
    uris.sort();
    uris.dedup();
    uris
}

pub async fn execute(args: CheckArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let mut workspace = app
        .workspace(ParseOptions {
            trailing: args.trailing,
        })
        .await;

    let results = if args.paths.is_empty() {
        workspace.check_all().await
    } else {
        let mut results = Vec::new();
        for uri in target_uris(&workspace, app.root(), &args.paths) {
            let result = workspace.ensure_checked(&uri).await;
            results.push((uri, result));
        }
        results
    };

    let mut files = Vec::new();
    let mut failures = Vec::new();
    for (uri, result) in &results {
        if let Err(e) = result {
            failures.push(FailureOutput {
                file: ctx.relative_uri(uri),
                error: e.to_string(),
            });
            continue;
        }
        let diagnostics = workspace.diagnostics(uri);
        let text = workspace.text(uri).unwrap_or_default();
        let output = FileDiagnostics::new(
            ctx.relative_uri(uri),
            text,
            &diagnostics,
            args.severity,
            ctx,
        );
        if output.count > 0 {
            files.push(output);
        }
    }

    let count = |severity: ErrorSeverity| {
        files
            .iter()
            .flat_map(|f| &f.diagnostics)
            .filter(|d| d.severity == severity.to_string())
            .count()
    };
    let response = CheckResponse {
        checked: results.len() - failures.len(),
        error_count: count(ErrorSeverity::Error),
        warning_count: count(ErrorSeverity::Warning),
        files,
        failures,
    };

    tracing::debug!(
        "Checked {} documents: {} errors, {} warnings",
        response.checked,
        response.error_count,
        response.warning_count
    );
    ctx.print_success_flat(response);
    Ok(())
}
