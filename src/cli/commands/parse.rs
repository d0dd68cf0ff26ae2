//! Parse command implementation
//!
//! Print the syntax tree and parse errors of documents. No binding or
//! checking happens, so files outside the project can be inspected too.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use futures::future::join_all;
use serde::Serialize;

use crate::app::App;
use crate::cli::response::FileDiagnostics;
use crate::models::diagnostic::ErrorSeverity;
use crate::models::node::SyntaxNode;
use crate::models::source::path_to_uri;
use crate::syntax::{ParseOptions, TrailingSeparator, parse};

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Documents to parse
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Trailing comma policy for struct and enum bodies
    #[arg(long, default_value = "allowed")]
    pub trailing: TrailingSeparator,

    /// Omit the syntax tree and print only diagnostics
    #[arg(long)]
    pub errors_only: bool,
}

#[derive(Serialize)]
struct ParsedFile {
    #[serde(flatten)]
    diagnostics: FileDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<SyntaxNode>,
}

#[derive(Serialize)]
struct ParseResponse {
    files: Vec<ParsedFile>,
}

pub async fn execute(args: ParseArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let options = ParseOptions {
        trailing: args.trailing,
    };

    let uris: Vec<String> = args
        .files
        .iter()
        .map(|file| path_to_uri(&app.root().join(file)))
        .collect();
    let documents = join_all(uris.iter().map(|uri| app.documents.read(uri))).await;

    let mut files = Vec::with_capacity(documents.len());
    for document in documents {
        let document = document?;
        let result = parse(&document.text, options);
        if !result.node.is_well_formed() {
            tracing::error!("Malformed syntax tree for {}", document.uri);
        }
        files.push(ParsedFile {
            diagnostics: FileDiagnostics::new(
                ctx.relative_uri(&document.uri),
                &document.text,
                &result.errors,
                ErrorSeverity::Hint,
                ctx,
            ),
            tree: (!args.errors_only).then_some(result.node),
        });
    }

    ctx.print_success_flat(ParseResponse { files });
    Ok(())
}
