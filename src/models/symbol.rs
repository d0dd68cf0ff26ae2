//! Symbol model definitions
//!
//! Symbols are keyed by category and a path. The first path segment is the
//! top-level key in the table (a flattened module path such as `::a::b::Foo`),
//! deeper segments address nested members such as struct fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use super::node::{EnumKind, Primitive};
use super::source::{Location, Range};

/// Separator between module path segments
pub const PATH_SEP: &str = "::";

/// Namespace a symbol lives in
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Modules and the types declared in them
    Schema,
    /// Objects of one registry bound to a type, keyed by the registry's full name
    Description(String),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::Description(registry) => write!(f, "description/{registry}"),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcategory {
    Module,
    Compound,
    Enum,
    CompoundKey,
    EnumKey,
}

impl Subcategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Compound => "compound",
            Self::Enum => "enum",
            Self::CompoundKey => "compound_key",
            Self::EnumKey => "enum_key",
        }
    }
}

/// Fully qualified address of a symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SymbolPath {
    pub category: Category,
    pub path: Vec<String>,
}

impl SymbolPath {
    pub fn new(category: Category, path: Vec<String>) -> Self {
        Self { category, path }
    }

    pub fn schema(key: impl Into<String>) -> Self {
        Self::new(Category::Schema, vec![key.into()])
    }

    pub fn member(&self, name: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(name.into());
        Self::new(self.category.clone(), path)
    }
}

impl fmt::Display for SymbolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category, self.path.join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    Implementation,
    Declaration,
    Definition,
    Reference,
}

impl UsageKind {
    /// Whether a usage of this kind makes its symbol "declared"
    pub fn is_declaring(&self) -> bool {
        !matches!(self, Self::Reference)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only visible from the file holding the declaration
    File,
    #[default]
    Exported,
}

/// Which pass created a usage; rebinding a file only removes checker usages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Contributor {
    Layout,
    Checker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub kind: UsageKind,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_range: Option<Range>,
    pub renamable: bool,
    pub visibility: Visibility,
    pub contributor: Contributor,
}

impl Usage {
    pub fn new(kind: UsageKind, location: Location) -> Self {
        Self {
            kind,
            location,
            full_range: None,
            renamable: true,
            visibility: Visibility::Exported,
            contributor: Contributor::Checker,
        }
    }

    pub fn with_full_range(mut self, range: Range) -> Self {
        self.full_range = Some(range);
        self
    }

    pub fn not_renamable(mut self) -> Self {
        self.renamable = false;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn from_layout(mut self) -> Self {
        self.contributor = Contributor::Layout;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Relations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<SymbolPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub described_by: Option<SymbolPath>,
}

impl Relations {
    pub fn is_empty(&self) -> bool {
        self.alias_of.is_none() && self.described_by.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Schema payload computed for declarations and their fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaType {
    Primitive {
        name: Primitive,
    },
    Literal {
        value: LiteralValue,
    },
    List {
        item: Box<SchemaType>,
    },
    Optional {
        inner: Box<SchemaType>,
    },
    /// Reference to another declaration; `path` is absent when resolution failed
    Reference {
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<SymbolPath>,
    },
    Struct {
        fields: Vec<FieldSchema>,
    },
    Enum {
        #[serde(skip_serializing_if = "Option::is_none")]
        enum_kind: Option<EnumKind>,
        values: Vec<EnumValueSchema>,
    },
}

impl SchemaType {
    /// Short human name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Primitive { .. } => "primitive",
            Self::Literal { .. } => "literal",
            Self::List { .. } => "list",
            Self::Optional { .. } => "optional",
            Self::Reference { .. } => "reference",
            Self::Struct { .. } => "struct",
            Self::Enum { .. } => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub key: String,
    #[serde(rename = "type")]
    pub ty: SchemaType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueSchema {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<LiteralValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub category: Category,
    pub path: Vec<String>,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<Subcategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SchemaType>,
    #[serde(skip_serializing_if = "Relations::is_empty")]
    pub relations: Relations,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub members: BTreeMap<String, Symbol>,
    pub usages: Vec<Usage>,
}

impl Symbol {
    pub fn new(category: Category, path: Vec<String>) -> Self {
        let identifier = path.last().cloned().unwrap_or_default();
        Self {
            category,
            path,
            identifier,
            subcategory: None,
            desc: None,
            data: None,
            relations: Relations::default(),
            members: BTreeMap::new(),
            usages: Vec::new(),
        }
    }

    pub fn symbol_path(&self) -> SymbolPath {
        SymbolPath::new(self.category.clone(), self.path.clone())
    }

    /// Usages that declare, define or implement this symbol
    pub fn declarations(&self) -> impl Iterator<Item = &Usage> {
        self.usages.iter().filter(|u| u.kind.is_declaring())
    }

    pub fn first_declaration(&self) -> Option<&Usage> {
        self.declarations().next()
    }

    pub fn definition(&self) -> Option<&Usage> {
        self.usages
            .iter()
            .find(|u| u.kind == UsageKind::Definition)
    }

    pub fn is_declared(&self) -> bool {
        self.declarations().next().is_some()
    }

    /// Visible when any declaring usage is exported or lives in `uri`
    pub fn is_visible_from(&self, uri: &str) -> bool {
        self.declarations()
            .any(|u| u.visibility == Visibility::Exported || u.location.uri == uri)
    }

    /// A symbol with neither usages nor members is an orphan
    pub fn is_orphan(&self) -> bool {
        self.usages.is_empty() && self.members.is_empty()
    }

    /// Remove checker usages located in `uri`, recursively pruning orphaned members
    pub fn clear_uri(&mut self, uri: &str) {
        self.usages
            .retain(|u| u.contributor != Contributor::Checker || u.location.uri != uri);
        for member in self.members.values_mut() {
            member.clear_uri(uri);
        }
        self.members.retain(|_, member| !member.is_orphan());
        if !self.is_declared() {
            self.relations = Relations::default();
            self.data = None;
            self.desc = None;
        }
    }

    pub fn count(&self) -> usize {
        1 + self.members.values().map(Symbol::count).sum::<usize>()
    }
}
