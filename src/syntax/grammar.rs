//! Schema language productions
//!
//! ```text
//! main        := (doc? declaration)*
//! declaration := struct | enum | mod | use | inject | describes
//! struct      := "struct" IDENT table<key ":" type>
//! enum        := "enum" "(" KIND ")" IDENT table<IDENT "=" literal>
//! mod         := "mod" IDENT ";"
//! use         := "export"? "use" path ";"
//! inject      := "inject" ("struct" path table | "enum" "(" KIND ")" path table)
//! describes   := path "describes" resloc ("[" resloc, ... "]")? ";"
//! type        := ("[" type "]" | literal | PRIMITIVE | path) "?"*
//! path        := "::"? IDENT ("::" IDENT)*
//! ```

use serde::Serialize;

use crate::models::diagnostic::{Diagnostic, ErrorSeverity};
use crate::models::message::{MessageKey, quote};
use crate::models::node::{EnumKind, Field, NodeKind, Primitive, SyntaxNode};
use crate::models::source::Range;
use crate::models::symbol::PATH_SEP;

use super::delimited::{self, Delimiters, PairGrammar, TrailingSeparator, attempt};
use super::reader::Source;

/// Tree plus every recoverable problem found while building it
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub node: SyntaxNode,
    pub errors: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Policy for trailing commas in struct and enum bodies
    pub trailing: TrailingSeparator,
}

const STRUCT_FIELD: PairGrammar = PairGrammar {
    key: field_key,
    sep: ":",
    value: type_expr,
    docs: true,
};

const ENUM_FIELD: PairGrammar = PairGrammar {
    key: identifier,
    sep: "=",
    value: literal,
    docs: true,
};

const STRING_TABLE: PairGrammar = PairGrammar {
    key: string,
    sep: ":",
    value: string,
    docs: false,
};

/// Parse a whole schema document
pub fn parse(text: &str, options: ParseOptions) -> ParseResult {
    let mut src = Source::new(text);
    let mut errors = Vec::new();
    let mut children = Vec::new();

    loop {
        src.skip_whitespace();
        if !src.can_read() {
            break;
        }

        let doc = src.read_doc_comments();
        match declaration(&mut src, &mut errors, doc.clone(), options) {
            Some(node) => children.push(node),
            None => {
                if let Some(doc) = doc {
                    errors.push(
                        Diagnostic::from_key(MessageKey::DocCommentNotAttached, &[], doc.range)
                            .with_severity(ErrorSeverity::Warning),
                    );
                    children.push(doc.tagged(Field::Doc));
                }
                if src.can_read() {
                    let line = src.skip_line();
                    let content = line.slice(text).trim_end();
                    errors.push(Diagnostic::from_key(
                        MessageKey::ExpectedDeclaration,
                        &[],
                        Range::new(line.start, line.start + content.len()),
                    ));
                }
            }
        }
    }

    ParseResult {
        node: SyntaxNode::with_children(NodeKind::Main, Range::new(0, text.len()), children),
        errors,
    }
}

/// Parse a table of string keys and string values
pub fn parse_table(text: &str, trailing: TrailingSeparator) -> ParseResult {
    let mut src = Source::new(text);
    let mut errors = Vec::new();
    src.skip_whitespace();
    let node = delimited::table(
        &mut src,
        &mut errors,
        Delimiters::braces(trailing),
        &STRING_TABLE,
    );
    ParseResult { node, errors }
}

fn declaration(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    doc: Option<SyntaxNode>,
    options: ParseOptions,
) -> Option<SyntaxNode> {
    let word = src.peek_word();
    let mut builder = match word {
        "struct" => struct_decl(src, errors, options),
        "enum" => enum_decl(src, errors, options),
        "mod" => mod_decl(src, errors),
        "use" | "export" => use_clause(src, errors),
        "inject" => inject_clause(src, errors, options),
        _ if !word.is_empty() || src.peek_is(PATH_SEP) => describes_clause(src, errors),
        _ => return None,
    };
    if let Some(doc) = doc {
        builder.children.insert(0, doc.tagged(Field::Doc));
    }
    Some(builder.finish())
}

/// Accumulates children and derives the node range from them
struct NodeBuilder {
    kind: NodeKind,
    start: usize,
    children: Vec<SyntaxNode>,
}

impl NodeBuilder {
    fn new(kind: NodeKind, start: usize) -> Self {
        Self {
            kind,
            start,
            children: Vec::new(),
        }
    }

    fn push(&mut self, node: SyntaxNode, field: Field) {
        self.children.push(node.tagged(field));
    }

    fn keyword(&mut self, src: &mut Source<'_>, keyword: &str) -> bool {
        match src.try_read_keyword(keyword) {
            Some(range) => {
                self.push(
                    SyntaxNode::new(
                        NodeKind::Keyword {
                            value: keyword.to_string(),
                        },
                        range,
                    ),
                    Field::Keyword,
                );
                true
            }
            None => false,
        }
    }

    fn finish(self) -> SyntaxNode {
        let range = self
            .children
            .iter()
            .map(|c| c.range)
            .reduce(Range::span)
            .unwrap_or(Range::point(self.start));
        SyntaxNode::with_children(self.kind, range, self.children)
    }
}

fn expect_identifier(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    builder: &mut NodeBuilder,
) {
    src.skip_whitespace();
    match identifier(src, errors) {
        Some(node) => builder.push(node, Field::Identifier),
        None => errors.push(Diagnostic::from_key(
            MessageKey::ExpectedIdentifier,
            &[],
            Range::point(src.cursor),
        )),
    }
}

fn expect_path(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>, builder: &mut NodeBuilder) {
    src.skip_whitespace();
    match attempt(src, errors, ident_path) {
        Some(node) => builder.push(node, Field::Path),
        None => errors.push(Diagnostic::from_key(
            MessageKey::ExpectedIdentifier,
            &[],
            Range::point(src.cursor),
        )),
    }
}

fn expect_token(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    token: &str,
) -> Option<Range> {
    src.skip_whitespace();
    let range = src.try_read(token);
    if range.is_none() {
        errors.push(Diagnostic::from_key(
            MessageKey::Expected,
            &[&quote(token)],
            Range::point(src.cursor),
        ));
    }
    range
}

/// `( kind )`; the kind is absent when missing or unknown
fn enum_kind(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    builder: &mut NodeBuilder,
) -> Option<EnumKind> {
    expect_token(src, errors, "(")?;
    src.skip_whitespace();
    let kind = match src.read_identifier() {
        Some((word, range)) => {
            let kind = EnumKind::from_keyword(&word);
            if kind.is_none() {
                errors.push(Diagnostic::from_key(
                    MessageKey::Expected,
                    &["an enum kind"],
                    range,
                ));
            }
            builder.push(
                SyntaxNode::new(NodeKind::Keyword { value: word }, range),
                Field::Kind,
            );
            kind
        }
        None => {
            errors.push(Diagnostic::from_key(
                MessageKey::Expected,
                &["an enum kind"],
                Range::point(src.cursor),
            ));
            None
        }
    };
    expect_token(src, errors, ")");
    kind
}

fn struct_body(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    options: ParseOptions,
) -> SyntaxNode {
    src.skip_whitespace();
    delimited::table(src, errors, Delimiters::braces(options.trailing), &STRUCT_FIELD)
        .tagged(Field::Body)
}

fn enum_body(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    options: ParseOptions,
) -> SyntaxNode {
    src.skip_whitespace();
    delimited::table(src, errors, Delimiters::braces(options.trailing), &ENUM_FIELD)
        .tagged(Field::Body)
}

fn struct_decl(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    options: ParseOptions,
) -> NodeBuilder {
    let mut builder = NodeBuilder::new(NodeKind::Struct, src.cursor);
    builder.keyword(src, "struct");
    expect_identifier(src, errors, &mut builder);
    builder.children.push(struct_body(src, errors, options));
    builder
}

fn enum_decl(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    options: ParseOptions,
) -> NodeBuilder {
    let mut builder = NodeBuilder::new(NodeKind::Enum { kind: None }, src.cursor);
    builder.keyword(src, "enum");
    let kind = enum_kind(src, errors, &mut builder);
    builder.kind = NodeKind::Enum { kind };
    expect_identifier(src, errors, &mut builder);
    builder.children.push(enum_body(src, errors, options));
    builder
}

fn mod_decl(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> NodeBuilder {
    let mut builder = NodeBuilder::new(NodeKind::ModuleDeclaration, src.cursor);
    builder.keyword(src, "mod");
    expect_identifier(src, errors, &mut builder);
    expect_terminator(src, errors, &mut builder);
    builder
}

fn use_clause(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> NodeBuilder {
    let mut builder = NodeBuilder::new(NodeKind::UseClause { is_export: false }, src.cursor);
    if builder.keyword(src, "export") {
        builder.kind = NodeKind::UseClause { is_export: true };
        src.skip_whitespace();
    }
    if !builder.keyword(src, "use") {
        errors.push(Diagnostic::from_key(
            MessageKey::Expected,
            &[&quote("use")],
            Range::point(src.cursor),
        ));
    }
    expect_path(src, errors, &mut builder);
    expect_terminator(src, errors, &mut builder);
    builder
}

fn inject_clause(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    options: ParseOptions,
) -> NodeBuilder {
    let mut builder = NodeBuilder::new(NodeKind::InjectClause, src.cursor);
    builder.keyword(src, "inject");
    src.skip_whitespace();

    let mut inner = NodeBuilder::new(NodeKind::InjectStruct, src.cursor);
    if inner.keyword(src, "struct") {
        expect_path(src, errors, &mut inner);
        inner.children.push(struct_body(src, errors, options));
    } else if inner.keyword(src, "enum") {
        let kind = enum_kind(src, errors, &mut inner);
        inner.kind = NodeKind::InjectEnum { kind };
        expect_path(src, errors, &mut inner);
        inner.children.push(enum_body(src, errors, options));
    } else {
        errors.push(Diagnostic::from_key(
            MessageKey::Expected,
            &["\"struct\" or \"enum\""],
            Range::point(src.cursor),
        ));
        return builder;
    }
    builder.push(inner.finish(), Field::Definition);
    builder
}

fn describes_clause(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> NodeBuilder {
    let mut builder = NodeBuilder::new(NodeKind::DescribesClause, src.cursor);
    expect_path(src, errors, &mut builder);
    src.skip_whitespace();
    if !builder.keyword(src, "describes") {
        errors.push(Diagnostic::from_key(
            MessageKey::Expected,
            &[&quote("describes")],
            Range::point(src.cursor),
        ));
    }

    src.skip_whitespace();
    match attempt(src, errors, resource_location) {
        Some(node) => builder.push(node, Field::Registry),
        None => errors.push(Diagnostic::from_key(
            MessageKey::ExpectedResourceLocation,
            &[],
            Range::point(src.cursor),
        )),
    }

    src.skip_whitespace();
    if src.peek_is("[") {
        let objects = delimited::list(
            src,
            errors,
            Delimiters::brackets(TrailingSeparator::Allowed),
            resource_location,
        );
        builder.push(objects, Field::Objects);
    }
    expect_terminator(src, errors, &mut builder);
    builder
}

fn expect_terminator(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    builder: &mut NodeBuilder,
) {
    if let Some(range) = expect_token(src, errors, ";") {
        builder.children.push(SyntaxNode::new(
            NodeKind::Keyword {
                value: ";".to_string(),
            },
            range,
        ));
    }
}

pub fn identifier(src: &mut Source<'_>, _errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    let (value, range) = src.read_identifier()?;
    Some(SyntaxNode::new(NodeKind::Identifier { value }, range))
}

/// Double-quoted string with `\` escapes
pub fn string(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    let start = src.cursor;
    src.try_read("\"")?;
    let mut value = String::new();
    loop {
        match src.peek() {
            Some('"') => {
                src.advance();
                break;
            }
            Some('\\') => {
                src.advance();
                match src.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(c) => value.push(c),
                    None => {}
                }
            }
            Some('\n') | None => {
                errors.push(Diagnostic::from_key(
                    MessageKey::UnterminatedString,
                    &[],
                    Range::new(start, src.cursor),
                ));
                break;
            }
            Some(c) => {
                value.push(c);
                src.advance();
            }
        }
    }
    Some(SyntaxNode::new(
        NodeKind::String { value },
        Range::new(start, src.cursor),
    ))
}

pub fn number(src: &mut Source<'_>, _errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    let start = src.cursor;
    src.try_read("-");
    if src.read_while(|c| c.is_ascii_digit()).is_empty() {
        src.cursor = start;
        return None;
    }
    if src.peek_is(".") {
        let mut probe = *src;
        probe.advance();
        if !probe.read_while(|c| c.is_ascii_digit()).is_empty() {
            *src = probe;
        }
    }
    let range = Range::new(start, src.cursor);
    let value = range.slice(src.text()).parse::<f64>().ok()?;
    Some(SyntaxNode::new(NodeKind::Number { value }, range))
}

fn boolean(src: &mut Source<'_>, _errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    for (word, value) in [("true", true), ("false", false)] {
        if let Some(range) = src.try_read_keyword(word) {
            return Some(SyntaxNode::new(NodeKind::Boolean { value }, range));
        }
    }
    None
}

fn literal(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    string(src, errors)
        .or_else(|| number(src, errors))
        .or_else(|| boolean(src, errors))
}

fn field_key(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    identifier(src, errors).or_else(|| string(src, errors))
}

/// `::`-separated path; a leading `::` starts at the root module
pub fn ident_path(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    let start = src.cursor;
    let from_global_root = src.try_read(PATH_SEP).is_some();
    let mut segments = Vec::new();

    match identifier(src, errors) {
        Some(segment) => segments.push(segment),
        None if from_global_root => errors.push(Diagnostic::from_key(
            MessageKey::ExpectedIdentifier,
            &[],
            Range::point(src.cursor),
        )),
        None => return None,
    }

    while !segments.is_empty() && src.try_read(PATH_SEP).is_some() {
        match identifier(src, errors) {
            Some(segment) => segments.push(segment),
            None => {
                errors.push(Diagnostic::from_key(
                    MessageKey::ExpectedIdentifier,
                    &[],
                    Range::point(src.cursor),
                ));
                break;
            }
        }
    }

    Some(SyntaxNode::with_children(
        NodeKind::IdentPath { from_global_root },
        Range::new(start, src.cursor),
        segments,
    ))
}

/// `namespace:path` or bare `path`
pub fn resource_location(
    src: &mut Source<'_>,
    _errors: &mut Vec<Diagnostic>,
) -> Option<SyntaxNode> {
    let range = src.read_while(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '/' | ':')
    });
    if range.is_empty() {
        return None;
    }
    let raw = range.slice(src.text());
    let (namespace, path) = match raw.split_once(':') {
        Some((ns, path)) => (Some(ns.to_string()), path.to_string()),
        None => (None, raw.to_string()),
    };
    Some(SyntaxNode::new(
        NodeKind::ResourceLocation { namespace, path },
        range,
    ))
}

pub fn type_expr(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    let mut node = primary_type(src, errors)?;
    while let Some(mark) = src.try_read("?") {
        let range = Range::span(node.range, mark);
        node = SyntaxNode::with_children(
            NodeKind::OptionalType,
            range,
            vec![node.tagged(Field::Type)],
        );
    }
    Some(node)
}

fn primary_type(src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> Option<SyntaxNode> {
    let start = src.cursor;
    if src.try_read("[").is_some() {
        let mut children = Vec::new();
        src.skip_whitespace();
        match attempt(src, errors, type_expr) {
            Some(item) => children.push(item.tagged(Field::Type)),
            None => errors.push(Diagnostic::from_key(
                MessageKey::ExpectedType,
                &[],
                Range::point(src.cursor),
            )),
        }
        src.skip_whitespace();
        let mut end = children.last().map_or(start + 1, |c| c.range.end);
        match src.try_read("]") {
            Some(close) => end = close.end,
            None => errors.push(Diagnostic::from_key(
                MessageKey::Expected,
                &[&quote("]")],
                Range::point(src.cursor),
            )),
        }
        return Some(SyntaxNode::with_children(
            NodeKind::ListType,
            Range::new(start, end),
            children,
        ));
    }

    if let Some(value) = literal(src, errors) {
        return Some(SyntaxNode::with_children(
            NodeKind::LiteralType,
            value.range,
            vec![value.tagged(Field::Value)],
        ));
    }

    if let Some(name) = Primitive::from_keyword(src.peek_word()) {
        let word_len = src.peek_word().len();
        src.cursor += word_len;
        return Some(SyntaxNode::new(
            NodeKind::PrimitiveType { name },
            Range::new(start, src.cursor),
        ));
    }

    let path = ident_path(src, errors)?;
    Some(SyntaxNode::with_children(
        NodeKind::ReferenceType,
        path.range,
        vec![path.tagged(Field::Path)],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(text: &str) -> ParseResult {
        parse(text, ParseOptions::default())
    }

    fn messages(result: &ParseResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_table_trailing_disallowed() {
        let result = parse_table("{ \"foo\" : \"bar\" , }", TrailingSeparator::Disallowed);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Trailing separation");
        assert_eq!(result.errors[0].range, Range::new(16, 17));
    }

    #[test]
    fn test_table_trailing_allowed() {
        let result = parse_table("{ \"foo\" : \"bar\" , }", TrailingSeparator::Allowed);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let result = parse_default("");
        assert_eq!(result.node.kind, NodeKind::Main);
        assert_eq!(result.node.range, Range::point(0));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_struct_declaration() {
        let text = "/// A thing\nstruct Foo {\n  /// Name\n  name: string,\n  tags: [string]?,\n  \"id\": int,\n}";
        let result = parse_default(text);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.node.children.len(), 1);

        let decl = &result.node.children[0];
        assert_eq!(decl.kind, NodeKind::Struct);
        assert_eq!(decl.identifier(), Some("Foo"));
        assert_eq!(decl.doc(), Some("A thing"));
        assert_eq!(decl.range, Range::new(0, text.len()));

        let body = decl.child(Field::Body).unwrap();
        assert_eq!(body.children.len(), 3);
        assert_eq!(body.children[0].doc(), Some("Name"));
        let keys: Vec<_> = body
            .children
            .iter()
            .filter_map(|p| p.child(Field::Key).and_then(SyntaxNode::text_value))
            .collect();
        assert_eq!(keys, vec!["name", "tags", "id"]);
        assert!(result.node.is_well_formed());
    }

    #[test]
    fn test_types() {
        let result = parse_default("struct A { a: [int]?, b: \"lit\", c: 3.5, d: ::x::Y, e: super::Z }");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let body = result.node.children[0].child(Field::Body).unwrap();
        let kinds: Vec<_> = body
            .children
            .iter()
            .map(|p| p.child(Field::Value).unwrap().kind.name())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "optional_type",
                "literal_type",
                "literal_type",
                "reference_type",
                "reference_type"
            ]
        );

        let d = body.children[3].child(Field::Value).unwrap();
        let path = d.child(Field::Path).unwrap();
        assert_eq!(
            path.kind,
            NodeKind::IdentPath {
                from_global_root: true
            }
        );
        assert_eq!(path.children.len(), 2);
    }

    #[test]
    fn test_enum_declaration() {
        let result = parse_default("enum(string) Color { Red = \"red\", Blue = \"blue\" }");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let decl = &result.node.children[0];
        assert_eq!(
            decl.kind,
            NodeKind::Enum {
                kind: Some(EnumKind::String)
            }
        );
        assert_eq!(decl.identifier(), Some("Color"));
        assert_eq!(decl.child(Field::Body).unwrap().children.len(), 2);
    }

    #[test]
    fn test_enum_unknown_kind() {
        let result = parse_default("enum(text) Color {}");
        assert_eq!(messages(&result), vec!["Expected an enum kind"]);
        assert_eq!(result.node.children[0].kind, NodeKind::Enum { kind: None });
    }

    #[test]
    fn test_mod_and_use() {
        let result = parse_default("mod foo;\nexport use super::b::Foo;\nuse ::c::D;");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let kinds: Vec<_> = result.node.children.iter().map(|c| c.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::ModuleDeclaration,
                NodeKind::UseClause { is_export: true },
                NodeKind::UseClause { is_export: false },
            ]
        );
        assert_eq!(result.node.children[0].identifier(), Some("foo"));
    }

    #[test]
    fn test_missing_semicolon() {
        let result = parse_default("mod foo\nstruct A {}");
        assert_eq!(messages(&result), vec!["Expected \";\""]);
        assert_eq!(result.errors[0].range, Range::point(8));
        assert_eq!(result.node.children.len(), 2);
    }

    #[test]
    fn test_inject_clauses() {
        let result = parse_default("inject struct ::a::Foo { extra: int }\ninject enum(int) B { X = 1 }");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let first = result.node.children[0].child(Field::Definition).unwrap();
        assert_eq!(first.kind, NodeKind::InjectStruct);
        assert!(first.child(Field::Path).is_some());
        let second = result.node.children[1].child(Field::Definition).unwrap();
        assert_eq!(
            second.kind,
            NodeKind::InjectEnum {
                kind: Some(EnumKind::Int)
            }
        );
    }

    #[test]
    fn test_describes_clause() {
        let result = parse_default("Foo describes item[stone, mod:gadget];\nBar describes core:block;");
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let clause = &result.node.children[0];
        assert_eq!(clause.kind, NodeKind::DescribesClause);
        let registry = clause.child(Field::Registry).unwrap();
        assert_eq!(
            registry.kind,
            NodeKind::ResourceLocation {
                namespace: None,
                path: "item".into()
            }
        );
        assert_eq!(clause.child(Field::Objects).unwrap().children.len(), 2);
        assert!(result.node.children[1].child(Field::Objects).is_none());
    }

    #[test]
    fn test_garbage_line_recovers() {
        let result = parse_default("}}} nonsense\nstruct A {}");
        assert_eq!(messages(&result), vec!["Expected a declaration"]);
        assert_eq!(result.errors[0].range, Range::new(0, 12));
        assert_eq!(result.node.children.len(), 1);
        assert_eq!(result.node.children[0].kind, NodeKind::Struct);
    }

    #[test]
    fn test_dangling_doc_comment() {
        let result = parse_default("struct A {}\n/// orphan");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].severity, ErrorSeverity::Warning);
        assert_eq!(result.node.children.len(), 2);
    }

    #[test]
    fn test_unterminated_string() {
        let result = parse_default("struct A { \"key: int }");
        assert!(messages(&result).contains(&"Unterminated string"));
        assert!(result.node.is_well_formed());
    }

    #[test]
    fn test_struct_trailing_policy() {
        let text = "struct A { a: int, }";
        assert!(parse_default(text).errors.is_empty());
        let strict = parse(
            text,
            ParseOptions {
                trailing: TrailingSeparator::Disallowed,
            },
        );
        assert_eq!(messages(&strict), vec!["Trailing separation"]);
        assert_eq!(strict.errors[0].range, Range::new(17, 18));
    }

    #[test]
    fn test_totality() {
        let inputs = [
            "struct",
            "struct {",
            "enum(",
            "enum(int",
            "inject",
            "inject struct",
            "use",
            "export",
            "::",
            "a describes",
            "a describes b[",
            "struct A { a: [ }",
            "struct A { a: [int }",
            "/// doc",
            "mod ;;;",
            "struct A { : , : }",
            "\u{0}\u{1}",
        ];
        for input in inputs {
            let result = parse_default(input);
            assert_eq!(result.node.range, Range::new(0, input.len()), "{input:?}");
            assert!(result.node.is_well_formed(), "{input:?}");
        }
    }
}
