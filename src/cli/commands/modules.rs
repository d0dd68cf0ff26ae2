//! Modules command implementation
//!
//! List the modules the project layout maps documents to.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::models::source::path_to_uri;
use crate::symbols::SymbolTable;

#[derive(Args, Debug)]
pub struct ModulesArgs {
    /// Also list schema files that do not map to a module
    #[arg(long)]
    pub unmapped: bool,
}

#[derive(Serialize)]
struct ModuleOutput {
    module: String,
    file: String,
}

#[derive(Serialize)]
struct ModulesResponse {
    source_root: String,
    count: usize,
    modules: Vec<ModuleOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unmapped: Option<Vec<String>>,
}

pub async fn execute(args: ModulesArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let layout = app.layout();

    let mut table = SymbolTable::new();
    let registered = layout.scan(&mut table);
    let modules: Vec<ModuleOutput> = registered
        .iter()
        .map(|(path, uri)| ModuleOutput {
            module: path.to_string(),
            file: ctx.relative_uri(uri),
        })
        .collect();

    let unmapped = args.unmapped.then(|| {
        layout
            .discover_files()
            .into_iter()
            .filter(|file| {
                let uri = path_to_uri(file);
                !registered.iter().any(|(_, registered)| *registered == uri)
            })
            .map(|file| ctx.relative_path(&file))
            .collect()
    });

    ctx.print_success_flat(ModulesResponse {
        source_root: ctx.relative_path(layout.source_root()),
        count: modules.len(),
        modules,
        unmapped,
    });
    Ok(())
}
