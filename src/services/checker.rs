//! Resolution pass
//!
//! Runs after hoisting. Resolves identifier paths (loading other modules on
//! demand), computes schema data for struct and enum bodies, and handles
//! `use`, `describes` and `inject` clauses.

use std::collections::{BTreeSet, HashMap};

use crate::error::LoadError;
use crate::models::diagnostic::{Diagnostic, ErrorSeverity};
use crate::models::message::{MessageKey, message, quote};
use crate::models::node::{EnumKind, Field, NodeKind, SyntaxNode};
use crate::models::path::ModulePath;
use crate::models::source::{Location, Range};
use crate::models::symbol::{
    Category, EnumValueSchema, FieldSchema, LiteralValue, SchemaType, Subcategory, Symbol,
    SymbolPath, Usage, UsageKind, Visibility,
};
use crate::symbols::{ModuleMapper, SymbolRecord};

use super::workspace::{ModuleLoader, Workspace};

/// Key under which a registry's catch-all description is stored
pub const DEFAULT_OBJECT: &str = "@default";

/// State shared by the binder and checker while one document is processed
pub struct CheckContext<'w> {
    pub(crate) workspace: &'w mut Workspace,
    pub(crate) uri: String,
    pub(crate) module: ModulePath,
    pub(crate) errors: Vec<Diagnostic>,
    /// Documents loaded while resolving this one
    pub(crate) dependencies: BTreeSet<String>,
}

/// Where an identifier path points before the final lookup
pub(crate) struct PathTarget {
    pub module: ModulePath,
    pub name: String,
    pub name_range: Range,
    /// Module segments with their ranges; `super` segments are not renamable
    pub module_refs: Vec<(ModulePath, Range, bool)>,
}

/// Outcome of resolving a use-clause during hoisting
#[derive(Debug, PartialEq)]
pub(crate) enum EarlyResolution {
    Resolved(SymbolPath),
    /// Already reported
    Failed,
    /// Retried by the check pass
    Pending,
}

/// Warning for a second declaration of `name`, pointing at the first one
pub(crate) fn duplicated(name: &str, range: Range, existing: &Symbol) -> Diagnostic {
    let diagnostic = Diagnostic::from_key(MessageKey::DuplicatedIdentifier, &[&quote(name)], range)
        .with_severity(ErrorSeverity::Warning);
    match existing.first_declaration() {
        Some(first) => diagnostic.with_related(
            first.location.clone(),
            message(MessageKey::DuplicatedIdentifierRelated, &[&quote(name)]),
        ),
        None => diagnostic,
    }
}

fn literal_value(node: &SyntaxNode) -> Option<LiteralValue> {
    match &node.kind {
        NodeKind::String { value } => Some(LiteralValue::String(value.clone())),
        NodeKind::Number { value } => Some(LiteralValue::Number(*value)),
        NodeKind::Boolean { value } => Some(LiteralValue::Boolean(*value)),
        _ => None,
    }
}

const ANY: SchemaType = SchemaType::Primitive {
    name: crate::models::node::Primitive::Any,
};

/// Convert a type expression, looking up reference targets in `resolved`
fn convert_type(node: &SyntaxNode, resolved: &HashMap<Range, Option<SymbolPath>>) -> SchemaType {
    let inner = |node: &SyntaxNode| {
        node.child(Field::Type)
            .map_or(ANY, |child| convert_type(child, resolved))
    };
    match &node.kind {
        NodeKind::PrimitiveType { name } => SchemaType::Primitive { name: *name },
        NodeKind::ListType => SchemaType::List {
            item: Box::new(inner(node)),
        },
        NodeKind::OptionalType => SchemaType::Optional {
            inner: Box::new(inner(node)),
        },
        NodeKind::LiteralType => match node.child(Field::Value).and_then(literal_value) {
            Some(value) => SchemaType::Literal { value },
            None => ANY,
        },
        NodeKind::ReferenceType => SchemaType::Reference {
            path: node
                .child(Field::Path)
                .and_then(|p| resolved.get(&p.range).cloned().flatten()),
        },
        _ => ANY,
    }
}

/// Label of a declaration kind as used in injection diagnostics
fn kind_label(subcategory: Option<Subcategory>, enum_kind: Option<EnumKind>) -> String {
    match (subcategory, enum_kind) {
        (Some(Subcategory::Compound), _) => message(MessageKey::CompoundDefinition, &[]),
        (Some(Subcategory::Enum), Some(kind)) => format!(
            "{}({})",
            message(MessageKey::EnumDefinition, &[]),
            kind.as_str()
        ),
        (Some(Subcategory::Enum), None) => message(MessageKey::EnumDefinition, &[]),
        (Some(other), _) => other.as_str().to_string(),
        (None, _) => "unknown".to_string(),
    }
}

impl<'w> CheckContext<'w> {
    pub(crate) fn new(workspace: &'w mut Workspace, uri: String, module: ModulePath) -> Self {
        Self {
            workspace,
            uri,
            module,
            errors: Vec::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub(crate) fn location(&self, range: Range) -> Location {
        Location::new(self.uri.clone(), range)
    }

    pub(crate) fn report(&mut self, key: MessageKey, args: &[&str], range: Range) {
        self.errors.push(Diagnostic::from_key(key, args, range));
    }

    /// Compute the module and final name of `path` without touching the table
    pub(crate) fn walk_path(&self, path: &SyntaxNode) -> Result<PathTarget, Option<Diagnostic>> {
        let from_global_root = matches!(
            path.kind,
            NodeKind::IdentPath {
                from_global_root: true
            }
        );
        let segments: Vec<(&str, Range)> = path
            .children
            .iter()
            .filter_map(|c| c.text_value().map(|v| (v, c.range)))
            .collect();
        let Some(((name, name_range), modules)) = segments.split_last() else {
            return Err(None);
        };

        let max_depth = crate::config::max_path_depth();
        if segments.len() > max_depth {
            return Err(Some(Diagnostic::from_key(
                MessageKey::PathTooDeep,
                &[&max_depth.to_string()],
                path.range,
            )));
        }

        let mut module = if from_global_root {
            ModulePath::root()
        } else {
            self.module.clone()
        };
        let mut module_refs = Vec::with_capacity(modules.len());
        for (segment, range) in modules {
            if *segment == "super" {
                if !module.pop() {
                    return Err(Some(Diagnostic::from_key(
                        MessageKey::SuperFromRoot,
                        &[],
                        *range,
                    )));
                }
                module_refs.push((module.clone(), *range, false));
            } else {
                module.push(*segment);
                module_refs.push((module.clone(), *range, true));
            }
        }

        Ok(PathTarget {
            module,
            name: name.to_string(),
            name_range: *name_range,
            module_refs,
        })
    }

    fn record_module_refs(&mut self, refs: &[(ModulePath, Range, bool)]) {
        for (module, range, renamable) in refs {
            let mut usage = Usage::new(UsageKind::Reference, self.location(*range));
            if !renamable {
                usage = usage.not_renamable();
            }
            self.workspace
                .table
                .query(self.uri.clone(), Category::Schema, vec![module.to_string()])
                .amend(SymbolRecord::new().with_usage(usage));
        }
    }

    /// Bring the document implementing `module` to the checked state
    async fn load_module(&mut self, module: &ModulePath, range: Range) -> bool {
        let Some(uri) = self.workspace.table.module_path_to_uri(module) else {
            self.report(MessageKey::UnknownModule, &[&quote(&module.to_string())], range);
            return false;
        };
        if uri == self.uri {
            return true;
        }

        self.dependencies.insert(uri.clone());
        match self.workspace.ensure_checked(&uri).await {
            Ok(()) => true,
            Err(LoadError::Circular(_)) => {
                self.report(
                    MessageKey::CircularModuleDependency,
                    &[&quote(&module.to_string())],
                    range,
                );
                false
            }
            Err(e) => {
                tracing::debug!("Cannot load {}: {}", uri, e);
                self.report(MessageKey::UnknownModule, &[&quote(&module.to_string())], range);
                false
            }
        }
    }

    /// Resolve `path`, reporting failures and recording reference usages
    pub(crate) async fn resolve_path(&mut self, path: &SyntaxNode) -> Option<SymbolPath> {
        let target = match self.walk_path(path) {
            Ok(target) => target,
            Err(diagnostic) => {
                self.errors.extend(diagnostic);
                return None;
            }
        };
        self.record_module_refs(&target.module_refs);

        if target.module != self.module && !self.load_module(&target.module, path.range).await {
            return None;
        }

        let key = target.module.join(&target.name);
        let location = self.location(target.name_range);
        let module_name = quote(&target.module.to_string());
        let name = quote(&target.name);
        let errors = &mut self.errors;
        let mut query = self
            .workspace
            .table
            .query(self.uri.clone(), Category::Schema, vec![key]);
        query
            .if_unknown(|| {
                errors.push(Diagnostic::from_key(
                    MessageKey::UnknownIdentifier,
                    &[&name, &module_name],
                    target.name_range,
                ))
            })
            .else_resolve_alias()
            .else_enter(SymbolRecord::reference(location));
        query.is_declared().then(|| query.path())
    }

    /// Resolve `path` while hoisting
    ///
    /// Paths into other modules load those modules first, so a failed load
    /// is reported here. Names not declared yet are left for the check pass
    /// and nothing is recorded for them.
    pub(crate) async fn resolve_early(&mut self, path: &SyntaxNode) -> EarlyResolution {
        let Ok(target) = self.walk_path(path) else {
            return EarlyResolution::Pending;
        };
        if target.module != self.module && !self.load_module(&target.module, path.range).await {
            self.record_module_refs(&target.module_refs);
            return EarlyResolution::Failed;
        }

        let key = target.module.join(&target.name);
        let location = self.location(target.name_range);
        let mut query = self
            .workspace
            .table
            .query(self.uri.clone(), Category::Schema, vec![key]);
        if !query.is_declared() {
            return EarlyResolution::Pending;
        }
        query
            .else_resolve_alias()
            .else_enter(SymbolRecord::reference(location));
        let resolved = query.path();

        self.record_module_refs(&target.module_refs);
        EarlyResolution::Resolved(resolved)
    }

    /// Declare the alias introduced by a use-clause
    pub(crate) fn declare_alias(&mut self, clause: &SyntaxNode, target: SymbolPath) {
        let Some(last) = clause
            .child(Field::Path)
            .and_then(|path| path.children.last())
        else {
            return;
        };
        let Some(name) = last.text_value() else {
            return;
        };
        let visibility = match clause.kind {
            NodeKind::UseClause { is_export: true } => Visibility::Exported,
            _ => Visibility::File,
        };
        let usage = Usage::new(UsageKind::Declaration, self.location(last.range))
            .with_full_range(clause.range)
            .with_visibility(visibility);

        let errors = &mut self.errors;
        let range = last.range;
        self.workspace
            .table
            .query(
                self.uri.clone(),
                Category::Schema,
                vec![self.module.join(name)],
            )
            .if_declared(|existing| errors.push(duplicated(name, range, existing)))
            .else_enter(
                SymbolRecord::new()
                    .with_usage(usage)
                    .with_alias_of(target),
            );
    }

    /// Enter a field under `container`; false when it duplicates an earlier one
    fn enter_field(
        &mut self,
        container: &SymbolPath,
        key: &SyntaxNode,
        pair: &SyntaxNode,
        subcategory: Subcategory,
        data: Option<SchemaType>,
    ) -> bool {
        let Some(name) = key.text_value() else {
            return false;
        };
        let mut record = SymbolRecord::new()
            .with_usage(
                Usage::new(UsageKind::Definition, self.location(key.range))
                    .with_full_range(pair.range),
            )
            .with_subcategory(subcategory)
            .with_desc(pair.doc());
        record.data = data;

        let errors = &mut self.errors;
        let mut entered = false;
        self.workspace
            .table
            .query(
                self.uri.clone(),
                container.category.clone(),
                container.path.clone(),
            )
            .member(name, |field| {
                field
                    .if_declared(|existing| errors.push(duplicated(name, key.range, existing)))
                    .else_(|field| {
                        field.enter(record);
                        entered = true;
                    });
            });
        entered
    }

    /// Schema data for a type expression; references are resolved in order
    pub(crate) async fn type_data(&mut self, node: &SyntaxNode) -> SchemaType {
        let mut paths = Vec::new();
        node.walk(&mut |n| {
            if matches!(n.kind, NodeKind::ReferenceType)
                && let Some(path) = n.child(Field::Path)
            {
                paths.push(path);
            }
        });

        let mut resolved = HashMap::with_capacity(paths.len());
        for path in paths {
            let target = self.resolve_path(path).await;
            resolved.insert(path.range, target);
        }
        convert_type(node, &resolved)
    }

    /// Whether the hoisted symbol `key` was defined by this very declaration
    fn owns_definition(&self, key: &str, identifier: &SyntaxNode) -> bool {
        let location = self.location(identifier.range);
        self.workspace
            .table
            .lookup(&Category::Schema, &[key.to_string()])
            .and_then(Symbol::definition)
            .is_some_and(|usage| usage.location == location)
    }

    async fn struct_fields(&mut self, container: &SymbolPath, body: &SyntaxNode) -> Vec<FieldSchema> {
        let mut fields = Vec::new();
        for pair in &body.children {
            let Some(key) = pair.child(Field::Key) else {
                continue;
            };
            let ty = match pair.child(Field::Value) {
                Some(value) => Some(self.type_data(value).await),
                None => None,
            };
            if self.enter_field(container, key, pair, Subcategory::CompoundKey, ty.clone())
                && let (Some(name), Some(ty)) = (key.text_value(), ty)
            {
                fields.push(FieldSchema {
                    key: name.to_string(),
                    ty,
                });
            }
        }
        fields
    }

    fn enum_values(&mut self, container: &SymbolPath, body: &SyntaxNode) -> Vec<EnumValueSchema> {
        let mut values = Vec::new();
        for pair in &body.children {
            let Some(key) = pair.child(Field::Key) else {
                continue;
            };
            let value = pair.child(Field::Value).and_then(literal_value);
            let data = value.clone().map(|value| SchemaType::Literal { value });
            if self.enter_field(container, key, pair, Subcategory::EnumKey, data)
                && let Some(name) = key.text_value()
            {
                values.push(EnumValueSchema {
                    identifier: name.to_string(),
                    value,
                });
            }
        }
        values
    }

    async fn check_use(&mut self, clause: &SyntaxNode) {
        let Some(path) = clause.child(Field::Path) else {
            return;
        };
        if let Some(target) = self.resolve_path(path).await {
            self.declare_alias(clause, target);
        }
    }

    async fn check_struct(&mut self, decl: &SyntaxNode) {
        let (Some(identifier), Some(body)) = (decl.child(Field::Identifier), decl.child(Field::Body))
        else {
            return;
        };
        let Some(name) = identifier.text_value() else {
            return;
        };
        let key = self.module.join(name);
        if !self.owns_definition(&key, identifier) {
            return;
        }

        let container = SymbolPath::schema(key.clone());
        let fields = self.struct_fields(&container, body).await;
        self.workspace
            .table
            .query(self.uri.clone(), Category::Schema, vec![key])
            .amend(SymbolRecord::new().with_data(SchemaType::Struct { fields }));
    }

    fn check_enum(&mut self, decl: &SyntaxNode, enum_kind: Option<EnumKind>) {
        let (Some(identifier), Some(body)) = (decl.child(Field::Identifier), decl.child(Field::Body))
        else {
            return;
        };
        let Some(name) = identifier.text_value() else {
            return;
        };
        let key = self.module.join(name);
        if !self.owns_definition(&key, identifier) {
            return;
        }

        let container = SymbolPath::schema(key.clone());
        let values = self.enum_values(&container, body);
        self.workspace
            .table
            .query(self.uri.clone(), Category::Schema, vec![key])
            .amend(SymbolRecord::new().with_data(SchemaType::Enum { enum_kind, values }));
    }

    async fn check_describes(&mut self, clause: &SyntaxNode) {
        let (Some(path), Some(registry)) = (clause.child(Field::Path), clause.child(Field::Registry))
        else {
            return;
        };
        let NodeKind::ResourceLocation {
            namespace,
            path: registry_path,
        } = &registry.kind
        else {
            return;
        };
        let registries = &self.workspace.registries;
        let registry_name = registries.normalize(namespace.as_deref(), registry_path);
        if !registries.is_known(&registry_name) {
            tracing::debug!("Ignoring describes clause for unknown registry {}", registry_name);
            return;
        }

        let target = self.resolve_path(path).await;

        let objects: Vec<(String, Range)> = match clause.child(Field::Objects) {
            Some(list) => list
                .children
                .iter()
                .filter_map(|item| item.child(Field::Value))
                .filter_map(|object| match &object.kind {
                    NodeKind::ResourceLocation { namespace, path } => Some((
                        self.workspace
                            .registries
                            .normalize(namespace.as_deref(), path),
                        object.range,
                    )),
                    _ => None,
                })
                .collect(),
            None => vec![(DEFAULT_OBJECT.to_string(), path.range)],
        };

        // Several clauses may describe one object; every one is a definition
        let category = Category::Description(registry_name);
        for (object, range) in objects {
            let mut record =
                SymbolRecord::new().with_usage(Usage::new(UsageKind::Definition, self.location(range)));
            if let Some(target) = &target {
                record = record.with_described_by(target.clone());
            }
            self.workspace
                .table
                .query(self.uri.clone(), category.clone(), vec![object])
                .enter(record);
        }
    }

    async fn check_inject(&mut self, clause: &SyntaxNode) {
        let Some(definition) = clause.child(Field::Definition) else {
            return;
        };
        let (injected, injected_kind) = match &definition.kind {
            NodeKind::InjectStruct => (Subcategory::Compound, None),
            NodeKind::InjectEnum { kind } => (Subcategory::Enum, *kind),
            _ => return,
        };
        let Some(path) = definition.child(Field::Path) else {
            return;
        };
        let Some(target) = self.resolve_path(path).await else {
            return;
        };

        let (target_sub, target_kind) = match self.workspace.table.lookup(&target.category, &target.path) {
            Some(symbol) => (
                symbol.subcategory,
                match &symbol.data {
                    Some(SchemaType::Enum { enum_kind, .. }) => *enum_kind,
                    _ => None,
                },
            ),
            None => (None, None),
        };

        let kinds_differ = matches!(
            (target_kind, injected_kind),
            (Some(a), Some(b)) if a != b
        );
        if target_sub != Some(injected) || kinds_differ {
            let (target_label, injected_label) = if kinds_differ {
                (
                    kind_label(target_sub, target_kind),
                    kind_label(Some(injected), injected_kind),
                )
            } else {
                (kind_label(target_sub, None), kind_label(Some(injected), None))
            };
            self.report(
                MessageKey::UnmatchedInjection,
                &[&target_label, &injected_label],
                path.range,
            );
            return;
        }

        let Some(body) = definition.child(Field::Body) else {
            return;
        };
        match injected {
            Subcategory::Compound => {
                self.struct_fields(&target, body).await;
            }
            _ => {
                self.enum_values(&target, body);
            }
        }
    }
}

/// Check pass over one hoisted document
pub(crate) async fn check(
    ctx: &mut CheckContext<'_>,
    root: &SyntaxNode,
    deferred_uses: Vec<&SyntaxNode>,
) {
    for clause in deferred_uses {
        ctx.check_use(clause).await;
    }
    for decl in &root.children {
        match &decl.kind {
            NodeKind::Struct => ctx.check_struct(decl).await,
            NodeKind::Enum { kind } => ctx.check_enum(decl, *kind),
            NodeKind::DescribesClause => ctx.check_describes(decl).await,
            NodeKind::InjectClause => ctx.check_inject(decl).await,
            _ => {}
        }
    }
}
