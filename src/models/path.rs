//! Module paths
//!
//! The flattened form is `::` followed by the segments joined with `::`.
//! The root module is `::`.

use std::fmt;

use serde::Serialize;

use super::symbol::PATH_SEP;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse the flattened form; a missing leading `::` is tolerated
    pub fn parse(identifier: &str) -> Self {
        let body = identifier.strip_prefix(PATH_SEP).unwrap_or(identifier);
        Self(
            body.split(PATH_SEP)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Drop the last segment; returns false at the root
    pub fn pop(&mut self) -> bool {
        self.0.pop().is_some()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.push(segment);
        child
    }

    /// Flattened symbol key of a declaration named `name` in this module
    pub fn join(&self, name: &str) -> String {
        self.child(name).to_string()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PATH_SEP}{}", self.0.join(PATH_SEP))
    }
}
