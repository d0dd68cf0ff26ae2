//! Symbols command implementation
//!
//! Check the whole project and list the resulting symbol table.

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::cli::response::{SymbolOutput, SymbolsResponse};
use crate::models::path::ModulePath;
use crate::models::symbol::{Category, PATH_SEP, Symbol};
use crate::syntax::ParseOptions;

#[derive(Args, Debug)]
pub struct SymbolsArgs {
    /// Only this category (`schema` or `description/<registry>`)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only symbols declared in this module or its submodules
    #[arg(short, long)]
    pub module: Option<String>,
}

/// Whether the schema key `key` lies inside `module`
fn in_module(key: &str, module: &ModulePath) -> bool {
    if module.is_root() {
        return true;
    }
    let prefix = module.to_string();
    key == prefix
        || key
            .strip_prefix(&prefix)
            .is_some_and(|rest| rest.starts_with(PATH_SEP))
}

fn selected(symbol: &Symbol, module: Option<&ModulePath>) -> bool {
    match (module, &symbol.category) {
        (Some(module), Category::Schema) => in_module(&symbol.identifier, module),
        (Some(module), Category::Description(_)) => symbol
            .relations
            .described_by
            .as_ref()
            .and_then(|target| target.path.first())
            .is_some_and(|key| in_module(key, module)),
        (None, _) => true,
    }
}

pub async fn execute(args: SymbolsArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let mut workspace = app.workspace(ParseOptions::default()).await;
    for (uri, result) in workspace.check_all().await {
        if let Err(e) = result {
            tracing::warn!("Skipping {}: {}", uri, e);
        }
    }

    let module = args.module.as_deref().map(ModulePath::parse);
    let table = workspace.table();
    let symbols: Vec<SymbolOutput> = table
        .categories()
        .filter(|category| {
            args.category
                .as_deref()
                .is_none_or(|wanted| category.to_string() == wanted)
        })
        .flat_map(|category| table.symbols(category))
        .filter(|symbol| selected(symbol, module.as_ref()))
        .map(|symbol| SymbolOutput::from_symbol(symbol, ctx))
        .collect();

    ctx.print_success_flat(SymbolsResponse {
        count: symbols.len(),
        symbols,
    });
    Ok(())
}
