//! Byte cursor over document text
//!
//! The cursor is always kept on a char boundary. `//` comments are trivia;
//! `///` doc comments are not and must be read with [`Source::read_doc_comments`].

use crate::models::node::{NodeKind, SyntaxNode};
use crate::models::source::{Position, Range};

#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    text: &'a str,
    pub cursor: Position,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: 0 }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn rest(&self) -> &'a str {
        &self.text[self.cursor..]
    }

    pub fn can_read(&self) -> bool {
        self.cursor < self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_is(&self, expected: &str) -> bool {
        self.rest().starts_with(expected)
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    /// Consume `expected` if the input starts with it
    pub fn try_read(&mut self, expected: &str) -> Option<Range> {
        if self.peek_is(expected) {
            let start = self.cursor;
            self.cursor += expected.len();
            Some(Range::new(start, self.cursor))
        } else {
            None
        }
    }

    pub fn read_while(&mut self, mut pred: impl FnMut(char) -> bool) -> Range {
        let start = self.cursor;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.cursor += c.len_utf8();
        }
        Range::new(start, self.cursor)
    }

    /// Skip whitespace and `//` line comments
    pub fn skip_whitespace(&mut self) {
        loop {
            self.read_while(char::is_whitespace);
            if self.peek_is("//") && !self.peek_is("///") {
                self.skip_line();
            } else {
                break;
            }
        }
    }

    /// Skip to just after the next line break, or to the end of input
    pub fn skip_line(&mut self) -> Range {
        let start = self.cursor;
        match self.rest().find('\n') {
            Some(i) => self.cursor += i + 1,
            None => self.cursor = self.text.len(),
        }
        Range::new(start, self.cursor)
    }

    /// Identifier-like word at the cursor, without consuming it
    pub fn peek_word(&self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(i, c)| !is_identifier_char(*c, *i == 0))
            .map_or(rest.len(), |(i, _)| i);
        &rest[..len]
    }

    /// Consume `keyword` only when it is a whole word
    pub fn try_read_keyword(&mut self, keyword: &str) -> Option<Range> {
        if self.peek_word() == keyword {
            self.try_read(keyword)
        } else {
            None
        }
    }

    pub fn read_identifier(&mut self) -> Option<(String, Range)> {
        let word = self.peek_word();
        if word.is_empty() {
            return None;
        }
        let range = Range::new(self.cursor, self.cursor + word.len());
        self.cursor = range.end;
        Some((word.to_string(), range))
    }

    /// Read consecutive `///` lines into one node
    ///
    /// Lines are joined with `\n` after stripping the marker and one leading space.
    pub fn read_doc_comments(&mut self) -> Option<SyntaxNode> {
        let start = self.cursor;
        let mut end = start;
        let mut lines = Vec::new();
        while self.peek_is("///") {
            let line = self.skip_line();
            let content = line.slice(self.text).trim_end_matches(['\n', '\r']);
            end = line.start + content.len();
            let content = &content[3..];
            lines.push(content.strip_prefix(' ').unwrap_or(content).to_string());
            self.skip_whitespace();
        }
        if lines.is_empty() {
            return None;
        }
        Some(SyntaxNode::new(
            NodeKind::DocComments {
                text: lines.join("\n"),
            },
            Range::new(start, end),
        ))
    }
}

pub fn is_identifier_char(c: char, first: bool) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (!first && c.is_ascii_digit())
}
