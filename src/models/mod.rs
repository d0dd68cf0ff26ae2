//! Data models for Schemata
//!
//! Contains core type definitions used throughout the application.

pub mod config;
pub mod diagnostic;
pub mod message;
pub mod node;
pub mod path;
pub mod source;
pub mod symbol;

// Re-export commonly used types
pub use config::SchemataConfig;
pub use diagnostic::{Diagnostic, ErrorSeverity};
pub use message::MessageKey;
pub use node::{EnumKind, Field, NodeKind, Primitive, SyntaxNode};
pub use path::ModulePath;
pub use source::{Location, Position, Range};
pub use symbol::{
    Category, Contributor, SchemaType, Subcategory, Symbol, SymbolPath, Usage, UsageKind,
    Visibility,
};
