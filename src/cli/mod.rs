//! CLI module for Schemata
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod output;
pub mod response;

pub use output::OutputContext;

use clap::{Parser, Subcommand};

use commands::{
    check::CheckArgs, config::ConfigArgs, init::InitArgs, modules::ModulesArgs,
    parse::ParseArgs, status::StatusArgs, symbols::SymbolsArgs,
};

const LONG_ABOUT: &str = r#"
Schemata - checker for schema definition documents

Schemata parses schema documents, binds their declarations into a
module-scoped symbol table and checks references across modules.
All output is JSON.

QUICK START:
  1. Initialize a project:    schemata init
  2. Check every module:      schemata check
  3. Inspect a parse tree:    schemata parse schemas/a/b.sdoc

EXAMPLES:
  schemata check a/b.sdoc --severity error
  schemata parse a/b.sdoc --trailing disallowed
  schemata symbols --module ::a
  schemata symbols --category description/core:item
"#;

/// Schemata - checker for schema definition documents
#[derive(Parser, Debug)]
#[command(name = "schemata")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'schemata <COMMAND> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new Schemata project
    Init(InitArgs),

    /// Show project status
    Status(StatusArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Parse, bind and check documents and report diagnostics
    Check(CheckArgs),

    /// Print the syntax tree and parse errors of documents
    Parse(ParseArgs),

    /// List symbols after checking the project
    Symbols(SymbolsArgs),

    /// List modules and the documents implementing them
    Modules(ModulesArgs),
}
