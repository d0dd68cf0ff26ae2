//! Resilient delimited-sequence parser
//!
//! One loop handles every `open entry (, entry)* close` construct. Failures
//! never abort: each becomes an `Error` diagnostic and the partial node is kept.

use crate::models::diagnostic::Diagnostic;
use crate::models::message::{MessageKey, quote};
use crate::models::node::{Field, NodeKind, SyntaxNode};
use crate::models::source::Range;

use super::reader::Source;

/// Sub-parser for one element; returns `None` without consuming on mismatch
pub type SubParser = fn(&mut Source<'_>, &mut Vec<Diagnostic>) -> Option<SyntaxNode>;

pub const ENTRY_SEPARATOR: &str = ",";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSeparator {
    #[default]
    Allowed,
    Disallowed,
}

impl std::str::FromStr for TrailingSeparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allowed" | "allow" => Ok(Self::Allowed),
            "disallowed" | "disallow" => Ok(Self::Disallowed),
            _ => Err(format!(
                "Unknown trailing policy: '{}'. Valid: allowed, disallowed",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Delimiters {
    pub open: &'static str,
    pub close: &'static str,
    pub trailing: TrailingSeparator,
}

impl Delimiters {
    pub const fn braces(trailing: TrailingSeparator) -> Self {
        Self {
            open: "{",
            close: "}",
            trailing,
        }
    }

    pub const fn brackets(trailing: TrailingSeparator) -> Self {
        Self {
            open: "[",
            close: "]",
            trailing,
        }
    }
}

/// Key, separator and value of a table entry
#[derive(Debug, Clone, Copy)]
pub struct PairGrammar {
    pub key: SubParser,
    pub sep: &'static str,
    pub value: SubParser,
    /// Accept `///` doc comments in front of each key
    pub docs: bool,
}

/// Run `parser`, rolling back the cursor and its diagnostics when it fails
pub fn attempt(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    parser: SubParser,
) -> Option<SyntaxNode> {
    let saved = src.cursor;
    let mut scratch = Vec::new();
    match parser(src, &mut scratch) {
        Some(node) => {
            errors.append(&mut scratch);
            Some(node)
        }
        None => {
            src.cursor = saved;
            None
        }
    }
}

/// Whether `parser` would succeed at the cursor
pub fn lookahead(src: &Source<'_>, parser: SubParser) -> bool {
    let mut probe = *src;
    parser(&mut probe, &mut Vec::new()).is_some()
}

impl PairGrammar {
    pub fn parse_pair(&self, src: &mut Source<'_>, errors: &mut Vec<Diagnostic>) -> SyntaxNode {
        let mut children = Vec::new();
        if self.docs
            && let Some(doc) = src.read_doc_comments()
        {
            children.push(doc.tagged(Field::Doc));
        }

        let key_pos = src.cursor;
        match attempt(src, errors, self.key) {
            Some(key) => children.push(key.tagged(Field::Key)),
            None => errors.push(Diagnostic::from_key(
                MessageKey::ExpectedKey,
                &[],
                Range::point(key_pos),
            )),
        }

        src.skip_whitespace();
        let sep = src.try_read(self.sep);
        if sep.is_none() {
            errors.push(Diagnostic::from_key(
                MessageKey::Expected,
                &[&quote(self.sep)],
                Range::point(src.cursor),
            ));
        }

        src.skip_whitespace();
        let value_pos = src.cursor;
        let value = attempt(src, errors, self.value);
        if value.is_none() {
            errors.push(Diagnostic::from_key(
                MessageKey::ExpectedValue,
                &[],
                Range::point(value_pos),
            ));
        }

        let mut covered: Vec<Range> = children.iter().map(|c| c.range).collect();
        covered.extend(sep);
        covered.extend(value.as_ref().map(|v| v.range));
        children.extend(value.map(|v| v.tagged(Field::Value)));

        let range = covered
            .into_iter()
            .reduce(Range::span)
            .unwrap_or(Range::point(key_pos));
        SyntaxNode::with_children(NodeKind::Pair { sep, end: None }, range, children)
    }

    pub fn starts_pair(&self, src: &Source<'_>) -> bool {
        (self.docs && src.peek_is("///")) || src.peek_is(self.sep) || lookahead(src, self.key)
    }
}

/// `{ key sep value, ... }`
pub fn table(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    delimiters: Delimiters,
    grammar: &PairGrammar,
) -> SyntaxNode {
    sequence(
        src,
        errors,
        delimiters,
        NodeKind::Table,
        |src, errors| grammar.parse_pair(src, errors),
        |src| grammar.starts_pair(src),
    )
}

/// `[ value, ... ]`
pub fn list(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    delimiters: Delimiters,
    value: SubParser,
) -> SyntaxNode {
    sequence(
        src,
        errors,
        delimiters,
        NodeKind::List,
        |src, errors| {
            let pos = src.cursor;
            match attempt(src, errors, value) {
                Some(node) => SyntaxNode::with_children(
                    NodeKind::Item { end: None },
                    node.range,
                    vec![node.tagged(Field::Value)],
                ),
                None => {
                    errors.push(Diagnostic::from_key(
                        MessageKey::ExpectedValue,
                        &[],
                        Range::point(pos),
                    ));
                    SyntaxNode::new(NodeKind::Item { end: None }, Range::point(pos))
                }
            }
        },
        |src| lookahead(src, value),
    )
}

fn sequence(
    src: &mut Source<'_>,
    errors: &mut Vec<Diagnostic>,
    delimiters: Delimiters,
    container: NodeKind,
    mut parse_entry: impl FnMut(&mut Source<'_>, &mut Vec<Diagnostic>) -> SyntaxNode,
    starts_entry: impl Fn(&Source<'_>) -> bool,
) -> SyntaxNode {
    let start = src.cursor;
    let Some(open) = src.try_read(delimiters.open) else {
        errors.push(Diagnostic::from_key(
            MessageKey::Expected,
            &[&quote(delimiters.open)],
            Range::point(start),
        ));
        return SyntaxNode::new(container, Range::point(start));
    };

    let mut children = Vec::new();
    let mut end = open.end;

    loop {
        src.skip_whitespace();
        if !src.can_read() || src.peek_is(delimiters.close) {
            break;
        }

        let mut entry = parse_entry(src, errors);
        if !entry.range.is_empty() {
            end = end.max(entry.range.end);
        }

        src.skip_whitespace();
        if let Some(separator) = src.try_read(ENTRY_SEPARATOR) {
            set_entry_end(&mut entry, separator);
            end = separator.end;
            children.push(entry);

            src.skip_whitespace();
            if src.peek_is(delimiters.close) {
                if delimiters.trailing == TrailingSeparator::Disallowed {
                    errors.push(Diagnostic::from_key(
                        MessageKey::TrailingSeparation,
                        &[],
                        separator,
                    ));
                }
                break;
            }
            continue;
        }

        if entry.range.is_empty() {
            break;
        }
        let entry_end = entry.range.end;
        children.push(entry);
        if !src.peek_is(delimiters.close) && starts_entry(src) {
            errors.push(Diagnostic::from_key(
                MessageKey::Expected,
                &[&quote(ENTRY_SEPARATOR)],
                Range::point(entry_end),
            ));
            continue;
        }
        break;
    }

    match src.try_read(delimiters.close) {
        Some(close) => end = close.end,
        None => errors.push(Diagnostic::from_key(
            MessageKey::Expected,
            &[&quote(delimiters.close)],
            Range::point(src.cursor),
        )),
    }

    SyntaxNode::with_children(container, Range::new(start, end), children)
}

fn set_entry_end(entry: &mut SyntaxNode, separator: Range) {
    match &mut entry.kind {
        NodeKind::Pair { end, .. } | NodeKind::Item { end } => *end = Some(separator),
        _ => {}
    }
    entry.range = Range::span(entry.range, separator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::diagnostic::ErrorSeverity;
    use crate::syntax::grammar;

    const STRINGS: PairGrammar = PairGrammar {
        key: grammar::string,
        sep: ":",
        value: grammar::string,
        docs: false,
    };

    fn parse(text: &str, trailing: TrailingSeparator) -> (SyntaxNode, Vec<Diagnostic>) {
        let mut src = Source::new(text);
        let mut errors = Vec::new();
        let node = table(
            &mut src,
            &mut errors,
            Delimiters::braces(trailing),
            &STRINGS,
        );
        (node, errors)
    }

    fn messages(errors: &[Diagnostic]) -> Vec<(String, Range)> {
        errors.iter().map(|e| (e.message.clone(), e.range)).collect()
    }

    #[test]
    fn test_empty_input() {
        let (node, errors) = parse("", TrailingSeparator::Allowed);
        assert_eq!(node.kind, NodeKind::Table);
        assert_eq!(node.range, Range::point(0));
        assert!(node.children.is_empty());
        assert_eq!(
            messages(&errors),
            vec![("Expected \"{\"".to_string(), Range::point(0))]
        );
    }

    #[test]
    fn test_only_open_delimiter() {
        let (node, errors) = parse("{", TrailingSeparator::Allowed);
        assert_eq!(node.range, Range::new(0, 1));
        assert_eq!(
            messages(&errors),
            vec![("Expected \"}\"".to_string(), Range::point(1))]
        );
    }

    #[test]
    fn test_empty_table() {
        let (node, errors) = parse("{ }", TrailingSeparator::Disallowed);
        assert_eq!(node.range, Range::new(0, 3));
        assert!(node.children.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_single_pair() {
        let (node, errors) = parse("{ \"foo\" : \"bar\" }", TrailingSeparator::Disallowed);
        assert!(errors.is_empty());
        assert_eq!(node.range, Range::new(0, 17));
        assert_eq!(node.children.len(), 1);

        let pair = &node.children[0];
        assert_eq!(pair.range, Range::new(2, 15));
        assert_eq!(
            pair.kind,
            NodeKind::Pair {
                sep: Some(Range::new(8, 9)),
                end: None
            }
        );
        assert_eq!(pair.child(Field::Key).unwrap().text_value(), Some("foo"));
        assert_eq!(pair.child(Field::Value).unwrap().text_value(), Some("bar"));
    }

    #[test]
    fn test_trailing_separator_disallowed() {
        let (node, errors) = parse("{ \"foo\" : \"bar\" , }", TrailingSeparator::Disallowed);
        assert_eq!(
            messages(&errors),
            vec![("Trailing separation".to_string(), Range::new(16, 17))]
        );
        let pair = &node.children[0];
        assert_eq!(pair.range, Range::new(2, 17));
        assert_eq!(
            pair.kind,
            NodeKind::Pair {
                sep: Some(Range::new(8, 9)),
                end: Some(Range::new(16, 17))
            }
        );
        assert!(node.is_well_formed());
    }

    #[test]
    fn test_trailing_separator_allowed() {
        let (node, errors) = parse("{ \"foo\" : \"bar\" , }", TrailingSeparator::Allowed);
        assert!(errors.is_empty());
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.range, Range::new(0, 19));
    }

    #[test]
    fn test_missing_comma() {
        let (node, errors) = parse("{ \"a\" : \"b\" \"c\" : \"d\" }", TrailingSeparator::Allowed);
        assert_eq!(node.children.len(), 2);
        assert_eq!(
            messages(&errors),
            vec![("Expected \",\"".to_string(), Range::point(11))]
        );
        assert_eq!(errors[0].severity, ErrorSeverity::Error);
        assert!(node.is_well_formed());
    }

    #[test]
    fn test_missing_key_and_value() {
        let (node, errors) = parse("{ : }", TrailingSeparator::Allowed);
        assert_eq!(node.children.len(), 1);
        let pair = &node.children[0];
        assert_eq!(pair.range, Range::new(2, 3));
        assert!(pair.child(Field::Key).is_none());
        assert!(pair.child(Field::Value).is_none());
        assert_eq!(
            messages(&errors),
            vec![
                ("Expected a key".to_string(), Range::point(2)),
                ("Expected a value".to_string(), Range::point(4)),
            ]
        );
    }

    #[test]
    fn test_missing_separator_still_reads_value() {
        let (node, errors) = parse("{ \"a\" \"b\" }", TrailingSeparator::Allowed);
        let pair = &node.children[0];
        assert_eq!(pair.child(Field::Value).unwrap().text_value(), Some("b"));
        assert_eq!(
            messages(&errors),
            vec![("Expected \":\"".to_string(), Range::point(6))]
        );
    }

    #[test]
    fn test_missing_value_before_close() {
        let (node, errors) = parse("{ \"foo\" }", TrailingSeparator::Allowed);
        assert_eq!(node.children[0].range, Range::new(2, 7));
        assert_eq!(
            messages(&errors),
            vec![
                ("Expected \":\"".to_string(), Range::point(8)),
                ("Expected a value".to_string(), Range::point(8)),
            ]
        );
    }

    #[test]
    fn test_garbage_terminates() {
        let (node, errors) = parse("{ @@ }", TrailingSeparator::Allowed);
        assert_eq!(node.range, Range::new(0, 1));
        assert!(
            errors
                .iter()
                .any(|e| e.message == "Expected \"}\"" && e.range == Range::point(2))
        );
        assert!(node.is_well_formed());
    }

    #[test]
    fn test_unclosed_after_pair() {
        let (node, errors) = parse("{ \"a\": \"b\"", TrailingSeparator::Allowed);
        assert_eq!(node.range, Range::new(0, 10));
        assert_eq!(
            messages(&errors),
            vec![("Expected \"}\"".to_string(), Range::point(10))]
        );
    }

    #[test]
    fn test_list_entries() {
        let mut src = Source::new("[ \"a\", , \"b\" ]");
        let mut errors = Vec::new();
        let node = list(
            &mut src,
            &mut errors,
            Delimiters::brackets(TrailingSeparator::Allowed),
            grammar::string,
        );
        assert_eq!(node.kind, NodeKind::List);
        assert_eq!(node.children.len(), 3);
        assert_eq!(
            messages(&errors),
            vec![("Expected a value".to_string(), Range::point(7))]
        );
        assert!(node.is_well_formed());
    }

    #[test]
    fn test_totality_on_odd_inputs() {
        let inputs = [
            "}", "{{", "{,", "{ , , }", "{ \"a\" : }", "{ : : : }", "{\"", "{ \"é\": \"ü\",",
        ];
        for input in inputs {
            for trailing in [TrailingSeparator::Allowed, TrailingSeparator::Disallowed] {
                let (node, _) = parse(input, trailing);
                assert!(node.range.end <= input.len(), "input {input:?}");
                assert!(node.is_well_formed(), "input {input:?}");
            }
        }
    }
}
