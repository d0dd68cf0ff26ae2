//! Response types for CLI output
//!
//! Shared by the check, parse and symbols commands. Offsets are converted
//! to 1-indexed lines and columns for display.

use serde::Serialize;

use crate::models::diagnostic::{Diagnostic, ErrorSeverity};
use crate::models::source::{LineIndex, Range};
use crate::models::symbol::{Symbol, Usage, UsageKind};

use super::OutputContext;

/// Line/column span of a byte range
#[derive(Debug, Clone, Serialize)]
pub struct SpanOutput {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SpanOutput {
    pub fn new(range: Range, index: &LineIndex) -> Self {
        let (line, column) = index.line_col(range.start);
        let (end_line, end_column) = index.line_col(range.end);
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RelatedOutput {
    pub file: String,
    pub start: usize,
    pub end: usize,
    pub message: String,
}

/// Diagnostic output
#[derive(Debug, Serialize)]
pub struct DiagnosticOutput {
    pub severity: String,
    pub message: String,
    #[serde(flatten)]
    pub span: SpanOutput,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedOutput>,
}

impl DiagnosticOutput {
    pub fn new(diagnostic: &Diagnostic, index: &LineIndex, ctx: &OutputContext) -> Self {
        Self {
            severity: diagnostic.severity.to_string(),
            message: diagnostic.message.clone(),
            span: SpanOutput::new(diagnostic.range, index),
            related: diagnostic
                .related()
                .iter()
                .map(|related| RelatedOutput {
                    file: ctx.relative_uri(&related.location.uri),
                    start: related.location.range.start,
                    end: related.location.range.end,
                    message: related.message.clone(),
                })
                .collect(),
        }
    }
}

/// Diagnostics of one file at or above `min_severity`
#[derive(Debug, Serialize)]
pub struct FileDiagnostics {
    pub file: String,
    pub count: usize,
    pub diagnostics: Vec<DiagnosticOutput>,
}

impl FileDiagnostics {
    pub fn new(
        file: String,
        text: &str,
        diagnostics: &[Diagnostic],
        min_severity: ErrorSeverity,
        ctx: &OutputContext,
    ) -> Self {
        let index = LineIndex::new(text);
        let diagnostics: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity >= min_severity)
            .map(|d| DiagnosticOutput::new(d, &index, ctx))
            .collect();
        Self {
            file,
            count: diagnostics.len(),
            diagnostics,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsageOutput {
    pub kind: UsageKind,
    pub file: String,
    pub start: usize,
    pub end: usize,
}

impl UsageOutput {
    fn new(usage: &Usage, ctx: &OutputContext) -> Self {
        Self {
            kind: usage.kind,
            file: ctx.relative_uri(&usage.location.uri),
            start: usage.location.range.start,
            end: usage.location.range.end,
        }
    }
}

/// Symbol output with nested members
#[derive(Debug, Serialize)]
pub struct SymbolOutput {
    pub category: String,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub described_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub usages: Vec<UsageOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<SymbolOutput>,
}

impl SymbolOutput {
    pub fn from_symbol(symbol: &Symbol, ctx: &OutputContext) -> Self {
        Self {
            category: symbol.category.to_string(),
            identifier: symbol.identifier.clone(),
            subcategory: symbol.subcategory.map(|s| s.as_str()),
            desc: symbol.desc.clone(),
            alias_of: symbol.relations.alias_of.as_ref().map(|p| p.to_string()),
            described_by: symbol.relations.described_by.as_ref().map(|p| p.to_string()),
            data: symbol
                .data
                .as_ref()
                .and_then(|data| serde_json::to_value(data).ok()),
            usages: symbol
                .usages
                .iter()
                .map(|usage| UsageOutput::new(usage, ctx))
                .collect(),
            members: symbol
                .members
                .values()
                .map(|member| SymbolOutput::from_symbol(member, ctx))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub count: usize,
    pub symbols: Vec<SymbolOutput>,
}
