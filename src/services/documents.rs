//! Text document cache
//!
//! Open documents shadow the file system. Documents read from disk are
//! cached with version 0 until invalidated.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::DocumentError;
use crate::models::source::uri_to_path;

pub const LANGUAGE_ID: &str = "schemata";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocument {
    pub uri: String,
    pub language_id: String,
    pub version: i32,
    pub text: String,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, version: i32, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            language_id: LANGUAGE_ID.to_string(),
            version,
            text: text.into(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }
}

/// Source of document text for the workspace
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn get(&self, uri: &str) -> Option<TextDocument>;
}

#[derive(Default)]
pub struct TextDocuments {
    open: RwLock<HashMap<String, TextDocument>>,
    cache: RwLock<HashMap<String, TextDocument>>,
}

impl TextDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, uri: &str, version: i32, text: &str) {
        self.cache.write().await.remove(uri);
        self.open
            .write()
            .await
            .insert(uri.to_string(), TextDocument::new(uri, version, text));
    }

    /// Replace the whole text of an open document
    pub async fn change(&self, uri: &str, version: i32, text: &str) -> Result<(), DocumentError> {
        let mut open = self.open.write().await;
        let doc = open
            .get_mut(uri)
            .ok_or_else(|| DocumentError::NotOpen(uri.to_string()))?;
        doc.version = version;
        doc.text = text.to_string();
        Ok(())
    }

    pub async fn close(&self, uri: &str) {
        self.open.write().await.remove(uri);
    }

    /// Open document only
    pub async fn get_open(&self, uri: &str) -> Option<TextDocument> {
        self.open.read().await.get(uri).cloned()
    }

    pub async fn is_open(&self, uri: &str) -> bool {
        self.open.read().await.contains_key(uri)
    }

    /// Drop the cached disk copy of `uri`
    pub async fn invalidate(&self, uri: &str) {
        self.cache.write().await.remove(uri);
    }

    /// Open document, cached disk copy, or a fresh read from disk
    pub async fn read(&self, uri: &str) -> Result<TextDocument, DocumentError> {
        if let Some(doc) = self.get_open(uri).await {
            return Ok(doc);
        }
        if let Some(doc) = self.cache.read().await.get(uri) {
            return Ok(doc.clone());
        }

        let path = uri_to_path(uri);
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            tracing::debug!("Cannot stat {}: {}", path.display(), e);
            DocumentError::NotFound(uri.to_string())
        })?;
        let limit = crate::config::max_file_size_bytes();
        if metadata.len() > limit {
            return Err(DocumentError::TooLarge {
                uri: uri.to_string(),
                size_mb: metadata.len() / (1024 * 1024),
                limit_mb: limit / (1024 * 1024),
            });
        }

        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            DocumentError::NotFound(uri.to_string())
        })?;
        let doc = TextDocument::new(uri, 0, text);
        self.cache
            .write()
            .await
            .insert(uri.to_string(), doc.clone());
        Ok(doc)
    }
}

#[async_trait]
impl DocumentProvider for TextDocuments {
    async fn get(&self, uri: &str) -> Option<TextDocument> {
        self.read(uri).await.ok()
    }
}
