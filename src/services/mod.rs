//! Service layer for Schemata

pub mod binder;
pub mod checker;
pub mod config;
pub mod documents;
pub mod layout;
pub mod project;
pub mod workspace;

pub use config::{ConfigService, DefaultConfigService};
pub use documents::{DocumentProvider, TextDocument, TextDocuments};
pub use layout::ProjectLayout;
pub use project::{DefaultProjectService, ProjectService};
pub use workspace::{FileState, ModuleLoader, Workspace};
