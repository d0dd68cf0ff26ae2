//! Fluent symbol query
//!
//! A query targets one `(category, path)` as seen from one document. `if_*`
//! branches run when their condition holds and mark the chain as handled;
//! `else_*` branches only run while nothing has been handled yet.
//!
//! ```ignore
//! table
//!     .query(uri, Category::Schema, vec![key])
//!     .if_declared(|existing| report_duplicate(existing))
//!     .else_enter(SymbolRecord::definition(location));
//! ```

use crate::models::source::Location;
use crate::models::symbol::{
    Category, Relations, SchemaType, Subcategory, Symbol, SymbolPath, Usage, UsageKind,
};

use super::table::SymbolTable;

/// Data merged into a symbol by `enter` and `amend`
#[derive(Debug, Clone, Default)]
pub struct SymbolRecord {
    pub subcategory: Option<Subcategory>,
    pub desc: Option<String>,
    pub data: Option<SchemaType>,
    pub relations: Relations,
    pub usage: Option<Usage>,
}

impl SymbolRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn usage(kind: UsageKind, location: Location) -> Self {
        Self {
            usage: Some(Usage::new(kind, location)),
            ..Self::default()
        }
    }

    pub fn definition(location: Location) -> Self {
        Self::usage(UsageKind::Definition, location)
    }

    pub fn reference(location: Location) -> Self {
        Self::usage(UsageKind::Reference, location)
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_subcategory(mut self, subcategory: Subcategory) -> Self {
        self.subcategory = Some(subcategory);
        self
    }

    pub fn with_desc(mut self, desc: Option<&str>) -> Self {
        self.desc = desc.map(str::to_string);
        self
    }

    pub fn with_data(mut self, data: SchemaType) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_alias_of(mut self, target: SymbolPath) -> Self {
        self.relations.alias_of = Some(target);
        self
    }

    pub fn with_described_by(mut self, target: SymbolPath) -> Self {
        self.relations.described_by = Some(target);
        self
    }

    fn apply(self, symbol: &mut Symbol) {
        if self.subcategory.is_some() {
            symbol.subcategory = self.subcategory;
        }
        if self.desc.is_some() {
            symbol.desc = self.desc;
        }
        if self.data.is_some() {
            symbol.data = self.data;
        }
        if self.relations.alias_of.is_some() {
            symbol.relations.alias_of = self.relations.alias_of;
        }
        if self.relations.described_by.is_some() {
            symbol.relations.described_by = self.relations.described_by;
        }
        if let Some(usage) = self.usage {
            symbol.usages.push(usage);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    /// Declared and visible from the querying document
    Found,
    Absent,
}

pub struct SymbolQuery<'t> {
    table: &'t mut SymbolTable,
    uri: String,
    category: Category,
    path: Vec<String>,
    lookup: Lookup,
    handled: bool,
}

impl<'t> SymbolQuery<'t> {
    pub(super) fn new(
        table: &'t mut SymbolTable,
        uri: String,
        category: Category,
        path: Vec<String>,
    ) -> Self {
        let mut query = Self {
            table,
            uri,
            category,
            path,
            lookup: Lookup::Absent,
            handled: false,
        };
        query.refresh();
        query
    }

    fn refresh(&mut self) {
        let visible = self
            .table
            .lookup(&self.category, &self.path)
            .is_some_and(|s| s.is_declared() && s.is_visible_from(&self.uri));
        self.lookup = if visible {
            Lookup::Found
        } else {
            Lookup::Absent
        };
    }

    pub fn path(&self) -> SymbolPath {
        SymbolPath::new(self.category.clone(), self.path.clone())
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.table.lookup(&self.category, &self.path)
    }

    pub fn is_declared(&self) -> bool {
        self.lookup == Lookup::Found
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Run `f` with the existing symbol when the path is declared
    pub fn if_declared(&mut self, f: impl FnOnce(&Symbol)) -> &mut Self {
        if !self.handled
            && self.lookup == Lookup::Found
            && let Some(symbol) = self.table.lookup(&self.category, &self.path)
        {
            f(symbol);
            self.handled = true;
        }
        self
    }

    /// Run `f` when the path is unknown to the querying document
    pub fn if_unknown(&mut self, f: impl FnOnce()) -> &mut Self {
        if !self.handled && self.lookup == Lookup::Absent {
            f();
            self.handled = true;
        }
        self
    }

    pub fn else_(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        if !self.handled {
            f(self);
        }
        self
    }

    pub fn else_enter(&mut self, record: SymbolRecord) -> &mut Self {
        if !self.handled {
            self.enter(record);
        }
        self
    }

    /// Create or update the symbol and append the record's usage
    pub fn enter(&mut self, record: SymbolRecord) -> &mut Self {
        if let Some(symbol) = self.table.get_or_create(&self.category, &self.path) {
            tracing::trace!(path = %self.path.join("."), "Entering symbol");
            record.apply(symbol);
        }
        self.refresh();
        self
    }

    /// Merge into an existing symbol; no-op when absent
    pub fn amend(&mut self, record: SymbolRecord) -> &mut Self {
        if let Some(symbol) = self.table.lookup_mut(&self.category, &self.path) {
            record.apply(symbol);
        }
        self.refresh();
        self
    }

    /// Query the member `name` of the current symbol
    pub fn member(&mut self, name: &str, f: impl FnOnce(&mut SymbolQuery<'_>)) -> &mut Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        let mut member = SymbolQuery::new(
            &mut *self.table,
            self.uri.clone(),
            self.category.clone(),
            path,
        );
        f(&mut member);
        self.refresh();
        self
    }

    pub fn on_each<I>(
        &mut self,
        items: impl IntoIterator<Item = I>,
        mut f: impl FnMut(I, &mut Self),
    ) -> &mut Self {
        for item in items {
            f(item, self);
        }
        self
    }

    /// Redirect the query along `alias_of` links until a non-alias is reached
    ///
    /// The chase is bounded by the number of symbols in the table; exceeding
    /// it means the aliases form a cycle.
    pub fn else_resolve_alias(&mut self) -> &mut Self {
        if self.handled || self.lookup == Lookup::Absent {
            return self;
        }
        let bound = self.table.len();
        let mut steps = 0;
        while let Some(target) = self
            .table
            .lookup(&self.category, &self.path)
            .and_then(|s| s.relations.alias_of.clone())
        {
            if steps >= bound {
                tracing::error!(
                    path = %self.path(),
                    bound,
                    "Alias chain does not terminate"
                );
                break;
            }
            steps += 1;
            self.category = target.category;
            self.path = target.path;
        }
        self.refresh();
        self
    }
}
