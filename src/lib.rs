//! Schemata - tooling backend for a schema definition DSL
//!
//! Parses schema documents into syntax trees with recoverable diagnostics,
//! binds their declarations into a module-scoped symbol table and checks
//! references across modules.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod symbols;
pub mod syntax;

pub use error::{SchemataError, SchemataResult};
