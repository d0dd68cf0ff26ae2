//! Concrete syntax tree
//!
//! Every node carries a closed [`NodeKind`], a byte [`Range`] and its children
//! in source order. Children may be tagged with a [`Field`] so consumers can
//! look up the key of a pair or the identifier of a struct without relying
//! on positions. Missing content is an absent field, never a missing node.

use serde::Serialize;

use super::source::Range;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntaxNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

/// Node variants produced by the grammar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Main,
    DocComments { text: String },
    Keyword { value: String },
    Identifier { value: String },
    String { value: String },
    Number { value: f64 },
    Boolean { value: bool },
    ResourceLocation {
        #[serde(skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        path: String,
    },
    IdentPath { from_global_root: bool },
    Table,
    List,
    Pair {
        #[serde(skip_serializing_if = "Option::is_none")]
        sep: Option<Range>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<Range>,
    },
    Item {
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<Range>,
    },
    PrimitiveType { name: Primitive },
    ListType,
    OptionalType,
    LiteralType,
    ReferenceType,
    Struct,
    Enum {
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<EnumKind>,
    },
    ModuleDeclaration,
    UseClause { is_export: bool },
    InjectClause,
    InjectStruct,
    InjectEnum {
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<EnumKind>,
    },
    DescribesClause,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::DocComments { .. } => "doc_comments",
            Self::Keyword { .. } => "keyword",
            Self::Identifier { .. } => "identifier",
            Self::String { .. } => "string",
            Self::Number { .. } => "number",
            Self::Boolean { .. } => "boolean",
            Self::ResourceLocation { .. } => "resource_location",
            Self::IdentPath { .. } => "ident_path",
            Self::Table => "table",
            Self::List => "list",
            Self::Pair { .. } => "pair",
            Self::Item { .. } => "item",
            Self::PrimitiveType { .. } => "primitive_type",
            Self::ListType => "list_type",
            Self::OptionalType => "optional_type",
            Self::LiteralType => "literal_type",
            Self::ReferenceType => "reference_type",
            Self::Struct => "struct",
            Self::Enum { .. } => "enum",
            Self::ModuleDeclaration => "module_declaration",
            Self::UseClause { .. } => "use_clause",
            Self::InjectClause => "inject_clause",
            Self::InjectStruct => "inject_struct",
            Self::InjectEnum { .. } => "inject_enum",
            Self::DescribesClause => "describes_clause",
        }
    }
}

/// Role of a child within its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Doc,
    Keyword,
    Identifier,
    Key,
    Value,
    Body,
    Path,
    Kind,
    Type,
    Registry,
    Objects,
    Definition,
}

/// Built-in scalar types of the schema language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Any,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl Primitive {
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "any" => Self::Any,
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "string" => Self::String,
            _ => return None,
        })
    }
}

/// Value type backing an enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl EnumKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "byte" => Self::Byte,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "string" => Self::String,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::String)
    }
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, range: Range) -> Self {
        Self {
            kind,
            range,
            field: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, range: Range, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            range,
            field: None,
            children,
        }
    }

    /// Tag this node with the role it plays in its parent
    pub fn tagged(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    pub fn child(&self, field: Field) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    pub fn children_of(&self, field: Field) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.field == Some(field))
    }

    /// Identifier or string value carried by this node
    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { value } | NodeKind::String { value } => Some(value),
            _ => None,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match &self.child(Field::Doc)?.kind {
            NodeKind::DocComments { text } => Some(text),
            _ => None,
        }
    }

    /// Value of the `identifier` child, if present
    pub fn identifier(&self) -> Option<&str> {
        self.child(Field::Identifier)?.text_value()
    }

    /// Visit this node and all descendants in pre-order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SyntaxNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Check range containment and sibling ordering for the whole subtree
    pub fn is_well_formed(&self) -> bool {
        let own = match &self.kind {
            NodeKind::Pair { sep, end } => [*sep, *end]
                .iter()
                .flatten()
                .all(|r| self.range.contains(r)),
            NodeKind::Item { end } => end.is_none_or(|r| self.range.contains(&r)),
            _ => true,
        };
        own && self.children.iter().all(|c| self.range.contains(&c.range))
            && self
                .children
                .windows(2)
                .all(|w| w[0].range.end <= w[1].range.start)
            && self.children.iter().all(SyntaxNode::is_well_formed)
    }
}
