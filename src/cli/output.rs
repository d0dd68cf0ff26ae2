//! Output formatting for CLI commands

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::source::uri_to_path;

/// Output context for consistent formatting across commands
///
/// Every command prints through this context so responses share one
/// envelope: `{"success": true, ...}` or `{"success": false, "error": ...}`.
#[derive(Debug, Clone)]
pub struct OutputContext {
    /// Project root for relative path calculation
    root: PathBuf,
    pretty: bool,
}

impl OutputContext {
    pub fn new(root: PathBuf, pretty: bool) -> Self {
        Self { root, pretty }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert an absolute path to relative (if within project root)
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }

    /// Display form of a document URI, relative to the project root
    pub fn relative_uri(&self, uri: &str) -> String {
        self.relative_path(&uri_to_path(uri))
    }

    /// Print a successful response with data fields at top level
    pub fn print_success_flat<T: Serialize>(&self, data: T) {
        let mut response = serde_json::to_value(data).unwrap_or(serde_json::json!({}));
        if let Some(obj) = response.as_object_mut() {
            obj.insert("success".to_string(), serde_json::json!(true));
        }
        self.print_json(&response);
    }

    /// Print an error response
    pub fn print_error(&self, message: &str) {
        let response = serde_json::json!({
            "success": false,
            "error": message
        });
        self.print_json(&response);
    }

    fn print_json(&self, value: &serde_json::Value) {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        match rendered {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize output: {e}"),
        }
    }
}
