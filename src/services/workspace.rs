//! Workspace
//!
//! Owns the symbol table and the per-document pipeline state. A document
//! moves through parse, hoist and check; `ensure_checked` drives it to the
//! checked state, loading other modules on demand while paths resolve.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;

use crate::error::LoadError;
use crate::models::config::{RegistryConfig, SchemataConfig};
use crate::models::diagnostic::Diagnostic;
use crate::models::node::SyntaxNode;
use crate::symbols::SymbolTable;
use crate::syntax::{ParseOptions, parse};

use super::binder;
use super::checker::{self, CheckContext};
use super::documents::{DocumentProvider, TextDocument};
use super::layout::ProjectLayout;

/// Pipeline state of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Unparsed,
    Parsed,
    Hoisted,
    Checking,
    Checked,
}

impl FileState {
    /// Whether the document is somewhere between parsing and checked
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Parsed | Self::Hoisted | Self::Checking)
    }
}

#[derive(Debug, Clone)]
struct FileRecord {
    version: i32,
    text: String,
    state: FileState,
    node: Option<SyntaxNode>,
    parse_errors: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
    dependencies: BTreeSet<String>,
}

impl FileRecord {
    fn is_current(&self, doc: &TextDocument) -> bool {
        self.state == FileState::Checked && self.version == doc.version && self.text == doc.text
    }
}

/// Brings modules to the checked state on demand
#[async_trait]
pub trait ModuleLoader: Send {
    async fn ensure_checked(&mut self, uri: &str) -> Result<(), LoadError>;

    fn is_checked(&self, uri: &str) -> bool;
}

pub struct Workspace {
    pub(crate) table: SymbolTable,
    pub(crate) registries: RegistryConfig,
    documents: Arc<dyn DocumentProvider>,
    options: ParseOptions,
    files: HashMap<String, FileRecord>,
    load_depth: usize,
}

impl Workspace {
    pub fn new(documents: Arc<dyn DocumentProvider>, config: &SchemataConfig) -> Self {
        Self {
            table: SymbolTable::new(),
            registries: config.registries.clone(),
            documents,
            options: ParseOptions::default(),
            files: HashMap::new(),
            load_depth: 0,
        }
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Register the modules of `layout`, returning their document URIs
    pub fn register_layout(&mut self, layout: &ProjectLayout) -> Vec<String> {
        layout
            .scan(&mut self.table)
            .into_iter()
            .map(|(_, uri)| uri)
            .collect()
    }

    pub fn file_state(&self, uri: &str) -> FileState {
        self.files
            .get(uri)
            .map_or(FileState::Unparsed, |record| record.state)
    }

    /// Read every registered module concurrently so later checks hit the cache
    pub async fn preload(&self) -> usize {
        let uris: Vec<String> = self
            .table
            .module_uris()
            .into_iter()
            .map(|(_, uri)| uri)
            .collect();
        let documents = join_all(uris.iter().map(|uri| self.documents.get(uri))).await;
        documents.iter().filter(|doc| doc.is_some()).count()
    }

    /// Check every registered module, in path order
    pub async fn check_all(&mut self) -> Vec<(String, Result<(), LoadError>)> {
        let mut uris: Vec<String> = self
            .table
            .module_uris()
            .into_iter()
            .map(|(_, uri)| uri)
            .collect();
        uris.sort();
        uris.dedup();

        let mut results = Vec::with_capacity(uris.len());
        for uri in uris {
            let result = self.ensure_checked(&uri).await;
            results.push((uri, result));
        }
        results
    }

    /// Parse errors followed by binder and checker errors for `uri`
    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        self.files
            .get(uri)
            .map(|record| {
                record
                    .parse_errors
                    .iter()
                    .chain(&record.errors)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Text the last check of `uri` ran on
    pub fn text(&self, uri: &str) -> Option<&str> {
        self.files.get(uri).map(|record| record.text.as_str())
    }

    pub fn syntax_tree(&self, uri: &str) -> Option<&SyntaxNode> {
        self.files.get(uri)?.node.as_ref()
    }

    /// Documents loaded while checking `uri`
    pub fn dependencies(&self, uri: &str) -> Option<&BTreeSet<String>> {
        self.files.get(uri).map(|record| &record.dependencies)
    }

    /// Mark `uri` and every document depending on it for re-checking
    pub fn invalidate(&mut self, uri: &str) -> Vec<String> {
        let mut invalidated = Vec::new();
        let mut queue = VecDeque::from([uri.to_string()]);
        while let Some(current) = queue.pop_front() {
            if invalidated.contains(&current) {
                continue;
            }
            if let Some(record) = self.files.get_mut(&current) {
                record.state = FileState::Unparsed;
            }
            for (dependent, record) in &self.files {
                if record.dependencies.contains(&current) {
                    queue.push_back(dependent.clone());
                }
            }
            invalidated.push(current);
        }
        tracing::debug!("Invalidated {} documents from {}", invalidated.len(), uri);
        invalidated
    }

    fn set_state(&mut self, uri: &str, state: FileState) {
        if let Some(record) = self.files.get_mut(uri) {
            record.state = state;
        }
    }

    async fn check_document(&mut self, doc: TextDocument) {
        let TextDocument {
            uri, version, text, ..
        } = doc;
        tracing::debug!(uri, version, "Checking document");

        self.table.clear_uri(&uri);
        let parsed = parse(&text, self.options);
        let node = parsed.node;
        self.files.insert(
            uri.clone(),
            FileRecord {
                version,
                text,
                state: FileState::Parsed,
                node: None,
                parse_errors: parsed.errors,
                errors: Vec::new(),
                dependencies: BTreeSet::new(),
            },
        );

        let mut errors = Vec::new();
        let module = binder::module_of(&self.table, &uri, &mut errors);
        let (errors, dependencies) = match module {
            Some(module) => {
                let mut ctx = CheckContext::new(self, uri.clone(), module);
                ctx.errors = errors;
                let deferred = binder::hoist(&mut ctx, &node).await;
                ctx.workspace.set_state(&uri, FileState::Hoisted);

                ctx.workspace.set_state(&uri, FileState::Checking);
                checker::check(&mut ctx, &node, deferred).await;
                (ctx.errors, ctx.dependencies)
            }
            None => (errors, BTreeSet::new()),
        };

        if let Some(record) = self.files.get_mut(&uri) {
            record.state = FileState::Checked;
            record.node = Some(node);
            record.errors = errors;
            record.dependencies = dependencies;
        }
        tracing::trace!(uri, "Checked document");
    }
}

#[async_trait]
impl ModuleLoader for Workspace {
    async fn ensure_checked(&mut self, uri: &str) -> Result<(), LoadError> {
        let Some(doc) = self.documents.get(uri).await else {
            return Err(LoadError::NotFound(uri.to_string()));
        };

        if let Some(record) = self.files.get(uri) {
            if record.is_current(&doc) {
                return Ok(());
            }
            if record.state.is_in_progress() {
                return Err(LoadError::Circular(uri.to_string()));
            }
        }

        let max_depth = crate::config::max_load_depth();
        if self.load_depth >= max_depth {
            tracing::warn!("Not loading {}: depth limit {} reached", uri, max_depth);
            return Err(LoadError::TooDeep(max_depth));
        }

        self.load_depth += 1;
        self.check_document(doc).await;
        self.load_depth -= 1;
        Ok(())
    }

    fn is_checked(&self, uri: &str) -> bool {
        self.file_state(uri) == FileState::Checked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::diagnostic::ErrorSeverity;
    use crate::models::symbol::{Category, SchemaType, Subcategory, UsageKind, Visibility};
    use crate::models::{ModulePath, SymbolPath};
    use crate::services::documents::TextDocuments;
    use crate::symbols::ModuleMapper;
    use tokio_test::{assert_err, assert_ok};

    fn uri(module: &str) -> String {
        format!("file:///project/{module}.sdoc")
    }

    /// Workspace over in-memory documents, one per module path
    async fn workspace(files: &[(&str, &str)]) -> (Workspace, Arc<TextDocuments>) {
        let documents = Arc::new(TextDocuments::new());
        let mut workspace = Workspace::new(documents.clone(), &SchemataConfig::default());
        for (module, text) in files {
            let path = ModulePath::parse(module);
            let file = uri(&path.segments().join("/"));
            documents.open(&file, 0, text).await;
            workspace.table.register_module(&path, &file);
        }
        (workspace, documents)
    }

    fn messages(workspace: &Workspace, uri: &str) -> Vec<String> {
        workspace
            .diagnostics(uri)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    fn schema<'a>(workspace: &'a Workspace, key: &str) -> Option<&'a crate::models::Symbol> {
        workspace
            .table
            .lookup(&Category::Schema, &[key.to_string()])
    }

    #[tokio::test]
    async fn test_struct_and_fields_are_entered() {
        let (mut ws, _) = workspace(&[(
            "::a",
            "/// A thing\nstruct Foo {\n    /// Its name\n    name: string,\n    count: int?,\n}\n",
        )])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert!(ws.diagnostics(&uri("a")).is_empty());

        let foo = schema(&ws, "::a::Foo").unwrap();
        assert_eq!(foo.subcategory, Some(Subcategory::Compound));
        assert_eq!(foo.desc.as_deref(), Some("A thing"));
        let name = &foo.members["name"];
        assert_eq!(name.subcategory, Some(Subcategory::CompoundKey));
        assert_eq!(name.desc.as_deref(), Some("Its name"));
        match &foo.data {
            Some(SchemaType::Struct { fields }) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[1].key, "count");
                assert_eq!(fields[1].ty.kind_name(), "optional");
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_struct_is_warned_with_related_location() {
        let (mut ws, _) = workspace(&[("::a", "struct Foo {}\nstruct Foo {}\n")]).await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);

        let diagnostics = ws.diagnostics(&uri("a"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Duplicated identifier \"Foo\"");
        assert_eq!(diagnostics[0].severity, ErrorSeverity::Warning);
        let related = diagnostics[0].related();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].location.range.start, 7);
        assert_eq!(related[0].message, "\"Foo\" is first declared here");
    }

    #[tokio::test]
    async fn test_duplicate_field_is_warned() {
        let (mut ws, _) = workspace(&[("::a", "struct Foo { x: int, x: string }")]).await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert_eq!(messages(&ws, &uri("a")), vec!["Duplicated identifier \"x\""]);

        let foo = schema(&ws, "::a::Foo").unwrap();
        match &foo.data {
            Some(SchemaType::Struct { fields }) => assert_eq!(fields.len(), 1),
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_forward_reference_in_same_file() {
        let (mut ws, _) = workspace(&[("::a", "struct A { b: B }\nstruct B {}\n")]).await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert!(ws.diagnostics(&uri("a")).is_empty());

        let b = schema(&ws, "::a::B").unwrap();
        assert!(b.usages.iter().any(|u| u.kind == UsageKind::Reference));
    }

    #[tokio::test]
    async fn test_use_super_across_modules() {
        let (mut ws, _) = workspace(&[
            ("::a::b", "struct Foo {}\n"),
            ("::a::c", "use super::b::Foo;\nstruct Bar { foo: Foo }\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a/c")).await);
        assert!(ws.diagnostics(&uri("a/c")).is_empty(), "{:?}", messages(&ws, &uri("a/c")));
        assert!(ws.is_checked(&uri("a/b")));

        let alias = schema(&ws, "::a::c::Foo").unwrap();
        assert_eq!(
            alias.relations.alias_of,
            Some(SymbolPath::schema("::a::b::Foo"))
        );
        assert_eq!(alias.usages[0].visibility, Visibility::File);

        let bar = schema(&ws, "::a::c::Bar").unwrap();
        match &bar.data {
            Some(SchemaType::Struct { fields }) => match &fields[0].ty {
                SchemaType::Reference { path } => {
                    assert_eq!(path.as_ref(), Some(&SymbolPath::schema("::a::b::Foo")))
                }
                other => panic!("unexpected type: {other:?}"),
            },
            other => panic!("unexpected data: {other:?}"),
        }

        let dependencies = ws.dependencies(&uri("a/c")).unwrap();
        assert!(dependencies.contains(&uri("a/b")));
    }

    #[tokio::test]
    async fn test_use_of_unregistered_module() {
        let (mut ws, _) = workspace(&[("::a::c", "use super::b::Foo;\n")]).await;
        assert_ok!(ws.ensure_checked(&uri("a/c")).await);
        assert_eq!(messages(&ws, &uri("a/c")), vec!["Unknown module \"::a::b\""]);
    }

    #[tokio::test]
    async fn test_use_of_unloadable_module() {
        let (mut ws, docs) = workspace(&[
            ("::a::b", "struct Foo {}\n"),
            ("::a::c", "use super::b::Foo;\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a/b")).await);
        docs.close(&uri("a/b")).await;

        assert_ok!(ws.ensure_checked(&uri("a/c")).await);
        assert_eq!(messages(&ws, &uri("a/c")), vec!["Unknown module \"::a::b\""]);
        assert!(schema(&ws, "::a::c::Foo").is_none());
    }

    #[tokio::test]
    async fn test_field_reference_into_unloadable_module() {
        let (mut ws, docs) = workspace(&[
            ("::a::b", "struct Foo {}\n"),
            ("::a::c", "struct Bar { f: super::b::Foo }\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a/b")).await);
        docs.close(&uri("a/b")).await;

        assert_ok!(ws.ensure_checked(&uri("a/c")).await);
        assert_eq!(messages(&ws, &uri("a/c")), vec!["Unknown module \"::a::b\""]);
    }

    #[tokio::test]
    async fn test_use_sees_edited_target() {
        let (mut ws, docs) = workspace(&[
            ("::a::b", "struct Foo {}\n"),
            ("::a::c", "use super::b::Foo;\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a/b")).await);
        docs.change(&uri("a/b"), 1, "struct Other {}\n").await.unwrap();

        assert_ok!(ws.ensure_checked(&uri("a/c")).await);
        assert_eq!(
            messages(&ws, &uri("a/c")),
            vec!["Unknown identifier \"Foo\" in module \"::a::b\""]
        );
        assert!(schema(&ws, "::a::c::Foo").is_none());
        assert!(schema(&ws, "::a::b::Other").is_some());
    }

    #[tokio::test]
    async fn test_unknown_identifier() {
        let (mut ws, _) = workspace(&[
            ("::a::b", "struct Foo {}\n"),
            ("::a::c", "struct Bar { x: super::b::Missing }\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a/c")).await);
        assert_eq!(
            messages(&ws, &uri("a/c")),
            vec!["Unknown identifier \"Missing\" in module \"::a::b\""]
        );
    }

    #[tokio::test]
    async fn test_super_from_root() {
        let (mut ws, _) = workspace(&[("::a", "struct Bar { x: super::super::Foo }\n")]).await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert_eq!(
            messages(&ws, &uri("a")),
            vec!["Cannot go above root with \"super\""]
        );
    }

    #[tokio::test]
    async fn test_file_scoped_alias_is_invisible_elsewhere() {
        let (mut ws, _) = workspace(&[
            ("::a", "struct Foo {}\n"),
            ("::b", "use ::a::Foo;\n"),
            ("::c", "struct Baz { x: ::b::Foo }\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("c")).await);
        assert_eq!(
            messages(&ws, &uri("c")),
            vec!["Unknown identifier \"Foo\" in module \"::b\""]
        );
    }

    #[tokio::test]
    async fn test_exported_alias_resolves_to_target() {
        let (mut ws, _) = workspace(&[
            ("::a", "struct Foo {}\n"),
            ("::b", "export use ::a::Foo;\n"),
            ("::c", "struct Baz { x: ::b::Foo }\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("c")).await);
        assert!(ws.diagnostics(&uri("c")).is_empty(), "{:?}", messages(&ws, &uri("c")));

        let foo = schema(&ws, "::a::Foo").unwrap();
        assert!(
            foo.usages
                .iter()
                .any(|u| u.kind == UsageKind::Reference && u.location.uri == uri("c"))
        );
    }

    #[tokio::test]
    async fn test_circular_dependency() {
        let (mut ws, _) = workspace(&[
            ("::a", "struct A { b: ::b::B }\n"),
            ("::b", "struct B { a: ::a::A }\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);

        assert_eq!(
            messages(&ws, &uri("b")),
            vec!["Circular module dependency on \"::a\""]
        );
        assert!(ws.diagnostics(&uri("a")).is_empty());
        assert!(ws.is_checked(&uri("a")));
        assert!(ws.is_checked(&uri("b")));
    }

    #[tokio::test]
    async fn test_missing_document() {
        let (mut ws, _) = workspace(&[]).await;
        let err = assert_err!(ws.ensure_checked("file:///nowhere.sdoc").await);
        assert_eq!(err, LoadError::NotFound("file:///nowhere.sdoc".into()));
    }

    #[tokio::test]
    async fn test_unregistered_document_aborts_binding() {
        let (mut ws, docs) = workspace(&[]).await;
        docs.open("file:///loose.sdoc", 0, "struct Foo {}").await;
        assert_ok!(ws.ensure_checked("file:///loose.sdoc").await);

        let diagnostics = ws.diagnostics("file:///loose.sdoc");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, ErrorSeverity::Error);
        assert_eq!(diagnostics[0].range.start, 0);
        assert!(ws.table.symbols(&Category::Schema).next().is_none());
    }

    #[tokio::test]
    async fn test_root_module_warning() {
        let (mut ws, _) = workspace(&[("::", "struct Foo {}")]).await;
        let root = uri("");
        assert_eq!(ws.table.uri_to_module_path(&root), Some(ModulePath::root()));
        assert_ok!(ws.ensure_checked(&root).await);

        let diagnostics = ws.diagnostics(&root);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, ErrorSeverity::Warning);
        assert!(schema(&ws, "::Foo").is_some());
    }

    #[tokio::test]
    async fn test_module_declarations() {
        let (mut ws, _) = workspace(&[
            ("::a", "mod b;\nmod b;\nmod nope;\n"),
            ("::a::b", ""),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert_eq!(
            messages(&ws, &uri("a")),
            vec![
                "Duplicated module declaration \"b\"",
                "Module \"::a::nope\" does not exist",
            ]
        );
        let module = schema(&ws, "::a::b").unwrap();
        assert!(module.usages.iter().any(|u| u.kind == UsageKind::Declaration));
    }

    #[tokio::test]
    async fn test_inject_mismatch() {
        let (mut ws, _) = workspace(&[(
            "::a",
            "struct Foo {}\ninject enum(string) ::a::Foo { Bar = \"bar\" }\n",
        )])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert_eq!(
            messages(&ws, &uri("a")),
            vec!["Unmatched injection: cannot inject enum into struct"]
        );
        assert!(schema(&ws, "::a::Foo").unwrap().members.is_empty());
    }

    #[tokio::test]
    async fn test_inject_struct_fields() {
        let (mut ws, _) = workspace(&[
            ("::a", "struct Foo { x: int }\n"),
            ("::b", "inject struct ::a::Foo { y: string, x: int }\n"),
        ])
        .await;
        assert_ok!(ws.ensure_checked(&uri("b")).await);
        assert_eq!(messages(&ws, &uri("b")), vec!["Duplicated identifier \"x\""]);

        let foo = schema(&ws, "::a::Foo").unwrap();
        assert!(foo.members.contains_key("y"));
        assert_eq!(foo.members["y"].usages[0].location.uri, uri("b"));
    }

    #[tokio::test]
    async fn test_enum_values() {
        let (mut ws, _) = workspace(&[(
            "::a",
            "enum(int) Level { Low = 1, High = 2 }\n",
        )])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        let level = schema(&ws, "::a::Level").unwrap();
        assert_eq!(level.members["High"].subcategory, Some(Subcategory::EnumKey));
        match &level.data {
            Some(SchemaType::Enum { enum_kind, values }) => {
                assert_eq!(*enum_kind, Some(crate::models::EnumKind::Int));
                assert_eq!(values.len(), 2);
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_describes_known_and_unknown_registries() {
        let (mut ws, _) = workspace(&[(
            "::a",
            "struct Stone {}\nstruct Other {}\n::a::Stone describes item[stone, minecraft:cobble];\n::a::Other describes nowhere;\n",
        )])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert!(ws.diagnostics(&uri("a")).is_empty(), "{:?}", messages(&ws, &uri("a")));

        let category = Category::Description("core:item".into());
        let stone = ws
            .table
            .lookup(&category, &["core:stone".to_string()])
            .unwrap();
        assert_eq!(
            stone.relations.described_by,
            Some(SymbolPath::schema("::a::Stone"))
        );
        assert!(
            ws.table
                .lookup(&category, &["minecraft:cobble".to_string()])
                .is_some()
        );
        assert!(
            ws.table
                .lookup(&Category::Description("core:nowhere".into()), &[checker::DEFAULT_OBJECT.to_string()])
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_describes_same_object_twice() {
        let (mut ws, _) = workspace(&[(
            "::a",
            "struct S {}\nstruct T {}\n::a::S describes item[stone];\n::a::T describes item[stone];\n::a::Missing describes item[dirt];\n",
        )])
        .await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert_eq!(
            messages(&ws, &uri("a")),
            vec!["Unknown identifier \"Missing\" in module \"::a\""]
        );

        let category = Category::Description("core:item".into());
        let stone = ws
            .table
            .lookup(&category, &["core:stone".to_string()])
            .unwrap();
        assert_eq!(stone.usages.len(), 2);
        assert!(stone.usages.iter().all(|u| u.kind == UsageKind::Definition));
        assert!(stone.relations.described_by.is_some());

        let dirt = ws
            .table
            .lookup(&category, &["core:dirt".to_string()])
            .unwrap();
        assert_eq!(dirt.relations.described_by, None);
    }

    #[tokio::test]
    async fn test_recheck_clears_stale_symbols() {
        let (mut ws, docs) = workspace(&[("::a", "struct Old {}\n")]).await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert!(schema(&ws, "::a::Old").is_some());

        docs.change(&uri("a"), 1, "struct New {}\n").await.unwrap();
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert!(schema(&ws, "::a::Old").is_none());
        assert!(schema(&ws, "::a::New").is_some());
    }

    #[tokio::test]
    async fn test_unchanged_document_is_not_rechecked() {
        let (mut ws, _) = workspace(&[("::a", "struct Foo {}\nstruct Foo {}\n")]).await;
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        assert_ok!(ws.ensure_checked(&uri("a")).await);
        // A second check would report the duplicate against itself again
        assert_eq!(ws.diagnostics(&uri("a")).len(), 1);
        assert_eq!(
            ws.table.lookup(&Category::Schema, &["::a::Foo".into()]).unwrap().usages.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_invalidate_marks_dependents() {
        let (mut ws, _) = workspace(&[
            ("::a", "struct Foo {}\n"),
            ("::b", "struct Bar { foo: ::a::Foo }\n"),
            ("::c", "struct Baz {}\n"),
        ])
        .await;
        let results = ws.check_all().await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|(_, r)| r.is_ok()));

        let mut invalidated = ws.invalidate(&uri("a"));
        invalidated.sort();
        assert_eq!(invalidated, vec![uri("a"), uri("b")]);
        assert_eq!(ws.file_state(&uri("b")), FileState::Unparsed);
        assert!(ws.is_checked(&uri("c")));
    }

    #[tokio::test]
    async fn test_preload_reads_registered_modules() {
        let (ws, _) = workspace(&[("::a", ""), ("::b", "")]).await;
        assert_eq!(ws.preload().await, 2);
    }

    #[test]
    fn test_in_progress_states() {
        assert!(!FileState::Unparsed.is_in_progress());
        assert!(FileState::Hoisted.is_in_progress());
        assert!(!FileState::Checked.is_in_progress());
    }
}
