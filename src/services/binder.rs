//! Hoisting pass
//!
//! Enters every top-level declaration of a document before any path is
//! resolved, so declarations may be referenced before they appear.

use std::collections::HashMap;

use crate::models::diagnostic::{Diagnostic, ErrorSeverity};
use crate::models::message::{MessageKey, message, quote};
use crate::models::node::{Field, NodeKind, SyntaxNode};
use crate::models::path::ModulePath;
use crate::models::source::Range;
use crate::models::symbol::{Category, Subcategory, Usage, UsageKind};
use crate::symbols::{ModuleMapper, SymbolRecord, SymbolTable};

use super::checker::{CheckContext, EarlyResolution, duplicated};

/// Module implemented by `uri`
///
/// Reports an error and returns `None` when no registered module maps to
/// the document. Files implementing the root module get a warning.
pub(crate) fn module_of(
    table: &SymbolTable,
    uri: &str,
    errors: &mut Vec<Diagnostic>,
) -> Option<ModulePath> {
    let Some(module) = table.uri_to_module_path(uri) else {
        errors.push(Diagnostic::from_key(
            MessageKey::UndefinedModuleSegment,
            &[],
            Range::point(0),
        ));
        return None;
    };
    if module.is_root() {
        errors.push(
            Diagnostic::from_key(MessageKey::EmptyModuleSegment, &[], Range::point(0))
                .with_severity(ErrorSeverity::Warning),
        );
    }
    Some(module)
}

/// Enter the top-level declarations of `root`
///
/// Use-clauses into other modules load their target first. Returns the
/// use-clauses naming something not declared yet; the checker resolves them
/// after the rest of the document is hoisted.
pub(crate) async fn hoist<'n>(
    ctx: &mut CheckContext<'_>,
    root: &'n SyntaxNode,
) -> Vec<&'n SyntaxNode> {
    let mut declared_modules: HashMap<String, Range> = HashMap::new();
    let mut deferred = Vec::new();

    for decl in &root.children {
        match &decl.kind {
            NodeKind::Struct => hoist_type(ctx, decl, Subcategory::Compound),
            NodeKind::Enum { .. } => hoist_type(ctx, decl, Subcategory::Enum),
            NodeKind::ModuleDeclaration => hoist_module(ctx, decl, &mut declared_modules),
            NodeKind::UseClause { .. } => {
                if !hoist_use(ctx, decl).await {
                    deferred.push(decl);
                }
            }
            _ => {}
        }
    }

    tracing::trace!("Hoisted {} with {} deferred use-clauses", ctx.uri, deferred.len());
    deferred
}

fn hoist_type(ctx: &mut CheckContext<'_>, decl: &SyntaxNode, subcategory: Subcategory) {
    let Some(identifier) = decl.child(Field::Identifier) else {
        return;
    };
    let Some(name) = identifier.text_value() else {
        return;
    };

    let record = SymbolRecord::new()
        .with_usage(
            Usage::new(UsageKind::Definition, ctx.location(identifier.range))
                .with_full_range(decl.range),
        )
        .with_subcategory(subcategory)
        .with_desc(decl.doc());

    let errors = &mut ctx.errors;
    ctx.workspace
        .table
        .query(ctx.uri.clone(), Category::Schema, vec![ctx.module.join(name)])
        .if_declared(|existing| errors.push(duplicated(name, identifier.range, existing)))
        .else_enter(record);
}

fn hoist_module(
    ctx: &mut CheckContext<'_>,
    decl: &SyntaxNode,
    declared: &mut HashMap<String, Range>,
) {
    let Some(identifier) = decl.child(Field::Identifier) else {
        return;
    };
    let Some(name) = identifier.text_value() else {
        return;
    };

    if let Some(first) = declared.get(name) {
        let diagnostic = Diagnostic::from_key(
            MessageKey::DuplicatedModuleDeclaration,
            &[&quote(name)],
            identifier.range,
        )
        .with_severity(ErrorSeverity::Warning)
        .with_related(
            ctx.location(*first),
            message(MessageKey::DuplicatedModuleDeclarationRelated, &[&quote(name)]),
        );
        ctx.errors.push(diagnostic);
        return;
    }
    declared.insert(name.to_string(), identifier.range);

    let path = ctx.module.child(name);
    if ctx.workspace.table.module_path_to_uri(&path).is_none() {
        ctx.report(
            MessageKey::NonExistentModule,
            &[&quote(&path.to_string())],
            identifier.range,
        );
        return;
    }

    let usage = Usage::new(UsageKind::Declaration, ctx.location(identifier.range))
        .with_full_range(decl.range);
    ctx.workspace
        .table
        .query(ctx.uri.clone(), Category::Schema, vec![path.to_string()])
        .amend(SymbolRecord::new().with_usage(usage));
}

/// Declare the alias of a use-clause; false when it has to wait for the check pass
async fn hoist_use(ctx: &mut CheckContext<'_>, clause: &SyntaxNode) -> bool {
    let Some(path) = clause.child(Field::Path) else {
        // Nothing to resolve later either
        return true;
    };
    match ctx.resolve_early(path).await {
        EarlyResolution::Resolved(target) => {
            ctx.declare_alias(clause, target);
            true
        }
        EarlyResolution::Failed => true,
        EarlyResolution::Pending => false,
    }
}
