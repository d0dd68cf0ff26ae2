//! Symbol table and fluent query

pub mod query;
pub mod table;

pub use query::{SymbolQuery, SymbolRecord};
pub use table::{ModuleMapper, SymbolTable};
