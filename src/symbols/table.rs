//! Symbol store
//!
//! `category -> top-level key -> Symbol`; deeper path segments live in
//! [`Symbol::members`]. The table is an explicit value owned by the
//! workspace, never global state.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::path::ModulePath;
use crate::models::source::{Location, Range};
use crate::models::symbol::{Category, Contributor, Subcategory, Symbol, Usage, UsageKind};

use super::query::SymbolQuery;

/// Maps documents to the modules they implement
pub trait ModuleMapper {
    fn uri_to_module_path(&self, uri: &str) -> Option<ModulePath>;
    fn module_path_to_uri(&self, path: &ModulePath) -> Option<String>;
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    categories: BTreeMap<Category, BTreeMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fluent query on `path`, as seen from the document `uri`
    pub fn query(
        &mut self,
        uri: impl Into<String>,
        category: Category,
        path: Vec<String>,
    ) -> SymbolQuery<'_> {
        SymbolQuery::new(self, uri.into(), category, path)
    }

    pub fn lookup(&self, category: &Category, path: &[String]) -> Option<&Symbol> {
        let (first, rest) = path.split_first()?;
        let mut symbol = self.categories.get(category)?.get(first)?;
        for segment in rest {
            symbol = symbol.members.get(segment)?;
        }
        Some(symbol)
    }

    pub fn lookup_mut(&mut self, category: &Category, path: &[String]) -> Option<&mut Symbol> {
        let (first, rest) = path.split_first()?;
        let mut symbol = self.categories.get_mut(category)?.get_mut(first)?;
        for segment in rest {
            symbol = symbol.members.get_mut(segment)?;
        }
        Some(symbol)
    }

    /// Fetch the symbol at `path`, creating it and any missing parents
    pub fn get_or_create(&mut self, category: &Category, path: &[String]) -> Option<&mut Symbol> {
        let (first, rest) = path.split_first()?;
        let mut symbol = self
            .categories
            .entry(category.clone())
            .or_default()
            .entry(first.clone())
            .or_insert_with(|| Symbol::new(category.clone(), vec![first.clone()]));
        for (depth, segment) in rest.iter().enumerate() {
            symbol = symbol
                .members
                .entry(segment.clone())
                .or_insert_with(|| Symbol::new(category.clone(), path[..depth + 2].to_vec()));
        }
        Some(symbol)
    }

    /// Top-level symbols of one category, ordered by key
    pub fn symbols(&self, category: &Category) -> impl Iterator<Item = &Symbol> {
        self.categories.get(category).into_iter().flat_map(|m| m.values())
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.keys()
    }

    /// Total number of symbols, members included
    pub fn len(&self) -> usize {
        self.categories
            .values()
            .flat_map(|m| m.values())
            .map(Symbol::count)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(BTreeMap::is_empty)
    }

    /// Record that the document `uri` implements the module `path`
    pub fn register_module(&mut self, path: &ModulePath, uri: &str) {
        let Some(symbol) = self.get_or_create(&Category::Schema, &[path.to_string()]) else {
            return;
        };
        symbol.subcategory = Some(Subcategory::Module);
        let exists = symbol.usages.iter().any(|u| {
            u.contributor == Contributor::Layout
                && u.kind == UsageKind::Implementation
                && u.location.uri == uri
        });
        if !exists {
            symbol.usages.push(
                Usage::new(
                    UsageKind::Implementation,
                    Location::new(uri, Range::point(0)),
                )
                .from_layout(),
            );
        }
    }

    /// Forget every module registered by the project layout
    pub fn clear_layout(&mut self) {
        if let Some(schema) = self.categories.get_mut(&Category::Schema) {
            for symbol in schema.values_mut() {
                symbol.usages.retain(|u| u.contributor != Contributor::Layout);
            }
            schema.retain(|_, symbol| !symbol.is_orphan());
        }
    }

    /// Remove checker usages located in `uri` and drop orphaned symbols
    pub fn clear_uri(&mut self, uri: &str) {
        for symbols in self.categories.values_mut() {
            for symbol in symbols.values_mut() {
                symbol.clear_uri(uri);
            }
            symbols.retain(|_, symbol| !symbol.is_orphan());
        }
        self.categories.retain(|_, symbols| !symbols.is_empty());
        tracing::trace!(uri, remaining = self.len(), "Cleared symbols");
    }

    fn modules(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols(&Category::Schema)
            .filter(|s| s.subcategory == Some(Subcategory::Module))
    }

    /// Every registered module with the document implementing it
    pub fn module_uris(&self) -> Vec<(ModulePath, String)> {
        self.modules()
            .flat_map(|module| {
                module
                    .usages
                    .iter()
                    .filter(|u| u.kind == UsageKind::Implementation)
                    .map(|u| (ModulePath::parse(&module.identifier), u.location.uri.clone()))
            })
            .collect()
    }
}

impl ModuleMapper for SymbolTable {
    fn uri_to_module_path(&self, uri: &str) -> Option<ModulePath> {
        self.modules()
            .find(|module| {
                module
                    .usages
                    .iter()
                    .any(|u| u.kind == UsageKind::Implementation && u.location.uri == uri)
            })
            .map(|module| ModulePath::parse(&module.identifier))
    }

    fn module_path_to_uri(&self, path: &ModulePath) -> Option<String> {
        let module = self.lookup(&Category::Schema, &[path.to_string()])?;
        if module.subcategory != Some(Subcategory::Module) {
            return None;
        }
        module
            .usages
            .iter()
            .find(|u| u.kind == UsageKind::Implementation)
            .map(|u| u.location.uri.clone())
    }
}
