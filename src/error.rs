//! Error types for Schemata
//!
//! Problems inside schema documents are [`Diagnostic`](crate::models::Diagnostic)
//! values. These enums cover operational failures only.

use std::path::PathBuf;

use thiserror::Error;

pub type SchemataResult<T> = std::result::Result<T, SchemataError>;

#[derive(Debug, Error)]
pub enum SchemataError {
    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("There is no TextDocument corresponding to '{0}'")]
    NotOpen(String),

    #[error("URI does not exist: '{0}'")]
    NotFound(String),

    #[error("File too large ({size_mb}MB > {limit_mb}MB limit): {uri}")]
    TooLarge {
        uri: String,
        size_mb: u64,
        limit_mb: u64,
    },
}

/// Why a module could not be brought to the checked state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("No document is available for '{0}'")]
    NotFound(String),

    #[error("Circular module dependency on '{0}'")]
    Circular(String),

    #[error("Module loading exceeded the maximum depth of {0}")]
    TooDeep(usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project already initialized at: {0}")]
    AlreadyExists(PathBuf),

    #[error("Path is not inside the project: {0}")]
    OutsideProject(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
