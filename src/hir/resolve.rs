//! Name resolution: the workspace symbol index and constant lookup.
//!
//! # Architecture
//!
//! 1. **Symbol Extraction** - the namer records declarations and relationship
//!    targets as written, per file
//! 2. **Graph Build** - [`SymbolIndex`] merges reopened namespaces, resolves
//!    relationship targets and builds the include graph plus method tables
//! 3. **Query-time Resolution** - [`Resolver`] walks lexical scopes and
//!    ancestor chains; chains are linearized once and cached per namespace
//!
//! ## Key Data Structures
//!
//! - [`Namespace`] - A module or class merged across all its declarations
//! - [`SymbolIndex`] - Global index with all symbols and the include graph
//! - [`Resolver`] - Constant path resolution from a lexical nesting

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::ids::DefId;
use super::linearize::{Ancestor, IncludeCycle, IncludeGraph, LinearizeError, Linearizer, find_cycles};
use super::symbols::{HirRelationship, HirSymbol, RelationshipKind, SymbolKind, qualify};
use crate::base::{FileId, Span};

type AncestorCache = RwLock<FxHashMap<DefId, Arc<[DefId]>>>;
type ErrorCache = RwLock<FxHashMap<DefId, LinearizeError>>;
type SingletonCache = RwLock<FxHashMap<DefId, Result<Arc<[Ancestor<DefId>]>, LinearizeError>>>;

// ============================================================================
// NAMESPACES
// ============================================================================

/// Where a namespace is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub file: FileId,
    pub span: Span,
}

/// A module or class, merged across every `module`/`class` block that opens it.
#[derive(Clone, Debug)]
pub struct Namespace {
    id: DefId,
    name: Arc<str>,
    kind: SymbolKind,
    declarations: Vec<Declaration>,
    includes: Vec<DefId>,
    extends: Vec<DefId>,
    superclass: Option<DefId>,
    methods: IndexMap<Arc<str>, HirSymbol>,
    singleton_methods: IndexMap<Arc<str>, HirSymbol>,
}

impl Namespace {
    fn new(id: DefId, name: Arc<str>, kind: SymbolKind) -> Self {
        Self {
            id,
            name,
            kind,
            declarations: Vec::new(),
            includes: Vec::new(),
            extends: Vec::new(),
            superclass: None,
            methods: IndexMap::new(),
            singleton_methods: IndexMap::new(),
        }
    }

    pub fn id(&self) -> DefId {
        self.id
    }

    /// Fully qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &Arc<str> {
        &self.name
    }

    /// `Module` or `Class`; the kind of the first declaration.
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_class(&self) -> bool {
        self.kind == SymbolKind::Class
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Included modules, in inclusion order.
    pub fn includes(&self) -> &[DefId] {
        &self.includes
    }

    /// Extended modules, in extension order.
    pub fn extends(&self) -> &[DefId] {
        &self.extends
    }

    pub fn superclass(&self) -> Option<DefId> {
        self.superclass
    }

    /// Instance methods defined directly in this namespace, in definition order.
    pub fn methods(&self) -> impl Iterator<Item = &HirSymbol> {
        self.methods.values()
    }

    /// Look up an instance method defined directly in this namespace.
    pub fn method(&self, name: &str) -> Option<&HirSymbol> {
        self.methods.get(name)
    }

    pub fn singleton_methods(&self) -> impl Iterator<Item = &HirSymbol> {
        self.singleton_methods.values()
    }

    /// Look up a `def self.x` method defined directly in this namespace.
    pub fn singleton_method(&self, name: &str) -> Option<&HirSymbol> {
        self.singleton_methods.get(name)
    }
}

// ============================================================================
// GRAPH PROBLEMS
// ============================================================================

/// A declaration-level inconsistency found while building the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphProblem {
    pub file: FileId,
    pub span: Span,
    pub kind: GraphProblemKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphProblemKind {
    /// `module A` reopened as `class A`, or the other way around.
    KindMismatch {
        name: Arc<str>,
        declared: SymbolKind,
        found: SymbolKind,
    },
    /// `include`/`extend` of a class, or a module used as superclass.
    InvalidTarget {
        relationship: RelationshipKind,
        target: Arc<str>,
        target_kind: SymbolKind,
    },
    /// A class reopened with a different superclass.
    SuperclassMismatch { name: Arc<str> },
}

impl GraphProblem {
    pub fn message(&self) -> String {
        match &self.kind {
            GraphProblemKind::KindMismatch {
                name,
                declared,
                found,
            } => format!(
                "`{}` is already defined as a {}, cannot reopen it as a {}",
                name,
                declared.display(),
                found.display()
            ),
            GraphProblemKind::InvalidTarget {
                relationship: RelationshipKind::Superclass,
                target,
                ..
            } => format!("superclass must be a class, `{}` is a module", target),
            GraphProblemKind::InvalidTarget {
                relationship,
                target,
                target_kind,
            } => format!(
                "cannot {} {} `{}`, only modules can be mixed in",
                relationship.display(),
                target_kind.display(),
                target
            ),
            GraphProblemKind::SuperclassMismatch { name } => {
                format!("superclass mismatch for class `{}`", name)
            }
        }
    }
}

// ============================================================================
// SYMBOL INDEX
// ============================================================================

/// An index of all symbols across multiple files.
///
/// This is the main data structure for workspace-wide name resolution. The
/// per-file symbol lists are the source of truth; namespaces, method tables
/// and the include graph are derived from them by [`SymbolIndex::ensure_graph`]
/// and never mutated in place.
///
/// Ancestor chains are linearized on first use and cached per namespace until
/// the next rebuild. Every linearization resumes from the chains cached so
/// far. Cycles are found once per rebuild.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    /// Symbols per file, as extracted.
    files: IndexMap<FileId, Vec<HirSymbol>>,
    namespaces: Vec<Namespace>,
    /// Qualified name -> namespace.
    by_name: IndexMap<Arc<str>, DefId>,
    /// Qualified name -> constant assignment.
    constants: IndexMap<Arc<str>, HirSymbol>,
    problems: Vec<GraphProblem>,
    cycles: Vec<IncludeCycle<DefId>>,
    graph_dirty: bool,
    ancestors: AncestorCache,
    ancestor_errors: ErrorCache,
    singleton_ancestors: SingletonCache,
}

impl SymbolIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over the given files.
    pub fn build(files: impl IntoIterator<Item = (FileId, Vec<HirSymbol>)>) -> Self {
        let mut index = Self::new();
        for (file, symbols) in files {
            index.add_file(file, symbols);
        }
        index.ensure_graph();
        index
    }

    /// Add (or replace) the symbols of a file. The graph is rebuilt by the
    /// next [`ensure_graph`](Self::ensure_graph).
    pub fn add_file(&mut self, file: FileId, symbols: Vec<HirSymbol>) {
        self.files.insert(file, symbols);
        self.graph_dirty = true;
    }

    /// Remove all symbols from a file.
    pub fn remove_file(&mut self, file: FileId) {
        if self.files.shift_remove(&file).is_some() {
            self.graph_dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.graph_dirty
    }

    /// Rebuild namespaces and the include graph if files changed since the
    /// last build.
    pub fn ensure_graph(&mut self) {
        if !self.graph_dirty {
            return;
        }
        self.rebuild_graph();
        self.graph_dirty = false;
    }

    fn rebuild_graph(&mut self) {
        self.namespaces.clear();
        self.by_name.clear();
        self.constants.clear();
        self.problems.clear();
        self.cycles.clear();
        self.ancestors.write().clear();
        self.ancestor_errors.write().clear();
        self.singleton_ancestors.write().clear();

        // Declaration order decides which kind a namespace gets, so files are
        // visited in id order whatever order they were added in.
        let mut file_ids: Vec<FileId> = self.files.keys().copied().collect();
        file_ids.sort();

        let mut pending: Vec<(DefId, FileId, HirRelationship)> = Vec::new();

        // 1. Namespaces and constants
        for &file in &file_ids {
            let Some(symbols) = self.files.get(&file) else {
                continue;
            };
            for symbol in symbols {
                match symbol.kind {
                    SymbolKind::Module | SymbolKind::Class => {
                        let id = match self.by_name.get(&symbol.qualified_name) {
                            Some(&id) => id,
                            None => {
                                let id = DefId::new(self.namespaces.len() as u32);
                                self.namespaces.push(Namespace::new(
                                    id,
                                    symbol.qualified_name.clone(),
                                    symbol.kind,
                                ));
                                self.by_name.insert(symbol.qualified_name.clone(), id);
                                id
                            }
                        };
                        let namespace = &mut self.namespaces[id.index()];
                        namespace.declarations.push(Declaration {
                            file,
                            span: symbol.span(),
                        });
                        if namespace.kind != symbol.kind {
                            self.problems.push(GraphProblem {
                                file,
                                span: symbol.span(),
                                kind: GraphProblemKind::KindMismatch {
                                    name: symbol.qualified_name.clone(),
                                    declared: namespace.kind,
                                    found: symbol.kind,
                                },
                            });
                        }
                        for relationship in &symbol.relationships {
                            pending.push((id, file, relationship.clone()));
                        }
                    }
                    SymbolKind::Constant => {
                        self.constants
                            .entry(symbol.qualified_name.clone())
                            .or_insert_with(|| symbol.clone());
                    }
                    SymbolKind::Method | SymbolKind::SingletonMethod => {}
                }
            }
        }

        // 2. Method tables; a later definition replaces an earlier one
        for &file in &file_ids {
            let Some(symbols) = self.files.get(&file) else {
                continue;
            };
            for symbol in symbols.iter().filter(|s| s.kind.is_method()) {
                let owner = symbol
                    .owner
                    .as_ref()
                    .and_then(|owner| self.by_name.get(owner).copied());
                let Some(owner) = owner else {
                    tracing::trace!(
                        "[INDEX] no namespace for method {}, skipping",
                        symbol.qualified_name
                    );
                    continue;
                };
                let namespace = &mut self.namespaces[owner.index()];
                let table = if symbol.kind == SymbolKind::SingletonMethod {
                    &mut namespace.singleton_methods
                } else {
                    &mut namespace.methods
                };
                table.insert(symbol.name.clone(), symbol.clone());
            }
        }

        // 3. Include graph
        for (id, file, relationship) in pending {
            self.add_edge(id, file, &relationship);
        }

        // 4. Cycles
        let cycles = find_cycles(&*self, self.namespaces.iter().map(|n| n.id));
        self.cycles = cycles;

        tracing::debug!(
            "[INDEX] built graph: {} files, {} namespaces, {} constants, {} problems, {} cycles",
            self.files.len(),
            self.namespaces.len(),
            self.constants.len(),
            self.problems.len(),
            self.cycles.len()
        );
    }

    fn add_edge(&mut self, id: DefId, file: FileId, relationship: &HirRelationship) {
        let Some(target) = self.resolve_lexical(&relationship.target, &relationship.nesting) else {
            tracing::debug!(
                "[INDEX] unresolved {} target `{}` in {}",
                relationship.kind.display(),
                relationship.target,
                self.namespaces[id.index()].name
            );
            return;
        };

        let target_kind = self.namespaces[target.index()].kind;
        let valid = match relationship.kind {
            RelationshipKind::Include | RelationshipKind::Extend => {
                target_kind == SymbolKind::Module
            }
            RelationshipKind::Superclass => target_kind == SymbolKind::Class,
        };
        if !valid {
            self.problems.push(GraphProblem {
                file,
                span: relationship.span(),
                kind: GraphProblemKind::InvalidTarget {
                    relationship: relationship.kind,
                    target: self.namespaces[target.index()].name.clone(),
                    target_kind,
                },
            });
            return;
        }

        let namespace = &mut self.namespaces[id.index()];
        match relationship.kind {
            RelationshipKind::Include => namespace.includes.push(target),
            RelationshipKind::Extend => namespace.extends.push(target),
            RelationshipKind::Superclass => match namespace.superclass {
                None => namespace.superclass = Some(target),
                Some(existing) if existing == target => {}
                Some(_) => {
                    let name = namespace.name.clone();
                    self.problems.push(GraphProblem {
                        file,
                        span: relationship.span(),
                        kind: GraphProblemKind::SuperclassMismatch { name },
                    });
                }
            },
        }
    }

    /// Resolve a relationship target using lexical scopes only: each
    /// enclosing namespace from the innermost outward, then the root.
    fn resolve_lexical(&self, target: &str, nesting: &[Arc<str>]) -> Option<DefId> {
        if let Some(absolute) = target.strip_prefix("::") {
            return self.by_name.get(absolute).copied();
        }
        nesting
            .iter()
            .rev()
            .find_map(|scope| {
                self.by_name
                    .get(qualify(Some(scope.as_ref()), target).as_str())
                    .copied()
            })
            .or_else(|| self.by_name.get(target).copied())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn namespace(&self, id: DefId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    pub fn namespace_by_name(&self, qualified_name: &str) -> Option<&Namespace> {
        self.def_id(qualified_name).map(|id| self.namespace(id))
    }

    pub fn def_id(&self, qualified_name: &str) -> Option<DefId> {
        self.by_name.get(qualified_name).copied()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    /// Constant assignment by qualified name (`Config::PATH`).
    pub fn constant(&self, qualified_name: &str) -> Option<&HirSymbol> {
        self.constants.get(qualified_name)
    }

    /// Look up a constant named `name` directly inside `scope` (or at the root).
    pub fn member(&self, scope: Option<DefId>, name: &str) -> Option<ConstantTarget> {
        let qualified = match scope {
            Some(id) => qualify(Some(self.namespace(id).name()), name),
            None => name.to_string(),
        };
        if let Some(&id) = self.by_name.get(qualified.as_str()) {
            return Some(ConstantTarget::Namespace(id));
        }
        self.constants
            .get(qualified.as_str())
            .map(|symbol| ConstantTarget::Value(symbol.clone()))
    }

    /// Look up a symbol by its exact qualified name (first declaration).
    pub fn lookup_qualified(&self, name: &str) -> Option<&HirSymbol> {
        self.all_symbols()
            .find(|symbol| symbol.qualified_name.as_ref() == name)
    }

    pub fn symbols_in_file(&self, file: FileId) -> &[HirSymbol] {
        self.files.get(&file).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn all_symbols(&self) -> impl Iterator<Item = &HirSymbol> {
        self.files.values().flatten()
    }

    /// Graph problems found in `file`.
    pub fn problems_in_file(&self, file: FileId) -> impl Iterator<Item = &GraphProblem> {
        self.problems.iter().filter(move |p| p.file == file)
    }

    pub fn problems(&self) -> &[GraphProblem] {
        &self.problems
    }

    /// Include and superclass cycles, one per strongly connected group of
    /// namespaces, ordered by message.
    pub fn cycles(&self) -> &[IncludeCycle<DefId>] {
        &self.cycles
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linearized ancestor chain of a namespace, itself first.
    pub fn ancestors(&self, id: DefId) -> Result<Arc<[DefId]>, LinearizeError> {
        if let Some(chain) = self.ancestors.read().get(&id) {
            return Ok(chain.clone());
        }
        if let Some(error) = self.ancestor_errors.read().get(&id) {
            return Err(error.clone());
        }

        let result = self.with_linearizer(|linearizer| linearizer.ancestors(id));
        if let Err(error) = &result {
            self.ancestor_errors.write().insert(id, error.clone());
        }
        result
    }

    /// Singleton ancestor chain of a namespace: its singleton, the modules it
    /// extends, then the singleton chain of its superclass.
    pub fn singleton_ancestors(&self, id: DefId) -> Result<Arc<[Ancestor<DefId>]>, LinearizeError> {
        if let Some(cached) = self.singleton_ancestors.read().get(&id) {
            return cached.clone();
        }
        let result: Result<Arc<[Ancestor<DefId>]>, LinearizeError> = self
            .with_linearizer(|linearizer| linearizer.singleton_ancestors(id))
            .map(Arc::from);
        self.singleton_ancestors.write().insert(id, result.clone());
        result
    }

    /// Run a linearizer seeded with every cached chain, then cache whatever
    /// it linearized along the way.
    fn with_linearizer<T>(&self, run: impl FnOnce(&mut Linearizer<'_, Self>) -> T) -> T {
        let mut chains = self.ancestors.write();
        let mut linearizer = Linearizer::with_memo(self, std::mem::take(&mut *chains));
        let result = run(&mut linearizer);
        *chains = linearizer.into_memo();
        result
    }

    /// Ancestor chain as qualified names.
    pub fn ancestor_names(&self, id: DefId) -> Result<Vec<Arc<str>>, LinearizeError> {
        Ok(self
            .ancestors(id)?
            .iter()
            .map(|&ancestor| self.namespace(ancestor).name.clone())
            .collect())
    }

    /// Get a resolver starting at the given lexical nesting.
    pub fn resolver(&self, nesting: Vec<DefId>) -> Resolver<'_> {
        Resolver::new(self).with_nesting(nesting)
    }
}

impl IncludeGraph for SymbolIndex {
    type Node = DefId;

    fn includes(&self, node: DefId) -> &[DefId] {
        &self.namespace(node).includes
    }

    fn extends(&self, node: DefId) -> &[DefId] {
        &self.namespace(node).extends
    }

    fn superclass(&self, node: DefId) -> Option<DefId> {
        self.namespace(node).superclass
    }

    fn name(&self, node: DefId) -> &str {
        self.namespace(node).name()
    }
}

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// What a constant path refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum ConstantTarget {
    /// A module or class.
    Namespace(DefId),
    /// A constant assignment.
    Value(HirSymbol),
}

/// Result of resolving a constant path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    Found(ConstantTarget),
    /// Segment `segment` (0-based) of the path could not be resolved.
    NotFound { segment: usize },
}

impl ResolveResult {
    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_))
    }

    /// The namespace the path resolved to, if any.
    pub fn namespace(&self) -> Option<DefId> {
        match self {
            ResolveResult::Found(ConstantTarget::Namespace(id)) => Some(*id),
            _ => None,
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Constant resolver for one lexical position.
#[derive(Clone, Debug)]
pub struct Resolver<'a> {
    index: &'a SymbolIndex,
    /// Enclosing namespaces, outermost first.
    nesting: Vec<DefId>,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Self {
            index,
            nesting: Vec::new(),
        }
    }

    /// Set the lexical nesting, outermost first.
    pub fn with_nesting(mut self, nesting: Vec<DefId>) -> Self {
        self.nesting = nesting;
        self
    }

    /// Resolve a path as written, e.g. `A::B` or `::A`.
    pub fn resolve(&self, path: &str) -> ResolveResult {
        let (absolute, rest) = match path.strip_prefix("::") {
            Some(rest) => (true, rest),
            None => (false, path),
        };
        let segments: Vec<&str> = rest.split("::").collect();
        self.resolve_path(&segments, absolute)
    }

    /// Resolve a path given as segments.
    pub fn resolve_path<S: AsRef<str>>(&self, segments: &[S], absolute: bool) -> ResolveResult {
        let Some((first, rest)) = segments.split_first() else {
            return ResolveResult::NotFound { segment: 0 };
        };

        let mut current = if absolute {
            self.index.member(None, first.as_ref())
        } else {
            self.resolve_first(first.as_ref())
        };

        for (offset, segment) in rest.iter().enumerate() {
            current = match current {
                Some(ConstantTarget::Namespace(scope)) => self.resolve_member(scope, segment.as_ref()),
                _ => None,
            };
            if current.is_none() {
                tracing::trace!(
                    "[RESOLVE] segment `{}` not found in path",
                    segment.as_ref()
                );
                return ResolveResult::NotFound { segment: offset + 1 };
            }
        }

        match current {
            Some(target) => ResolveResult::Found(target),
            None => {
                tracing::trace!("[RESOLVE] `{}` not found", first.as_ref());
                ResolveResult::NotFound { segment: 0 }
            }
        }
    }

    /// First segment: lexical scopes innermost outward, then the ancestors of
    /// the innermost scope, then the root.
    fn resolve_first(&self, name: &str) -> Option<ConstantTarget> {
        for &scope in self.nesting.iter().rev() {
            if let Some(found) = self.index.member(Some(scope), name) {
                tracing::trace!(
                    "[RESOLVE] found `{}` in lexical scope {}",
                    name,
                    self.index.namespace(scope).name()
                );
                return Some(found);
            }
        }
        if let Some(&innermost) = self.nesting.last() {
            if let Some(found) = self.in_ancestors(innermost, name) {
                return Some(found);
            }
        }
        self.index.member(None, name)
    }

    /// Later segments: members of `scope` or of its ancestors.
    fn resolve_member(&self, scope: DefId, name: &str) -> Option<ConstantTarget> {
        self.index
            .member(Some(scope), name)
            .or_else(|| self.in_ancestors(scope, name))
    }

    fn in_ancestors(&self, scope: DefId, name: &str) -> Option<ConstantTarget> {
        let ancestors = self.index.ancestors(scope).ok()?;
        ancestors
            .iter()
            .skip(1)
            .find_map(|&ancestor| self.index.member(Some(ancestor), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::symbols::extract_symbols;
    use crate::syntax::SyntaxFile;

    fn index(sources: &[&str]) -> SymbolIndex {
        SymbolIndex::build(sources.iter().enumerate().map(|(i, source)| {
            let file = FileId::new(i as u32);
            (file, extract_symbols(file, &SyntaxFile::new(source)))
        }))
    }

    fn names(index: &SymbolIndex, name: &str) -> Vec<String> {
        let id = index.def_id(name).unwrap();
        index
            .ancestor_names(id)
            .unwrap()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    #[test]
    fn test_reopened_namespaces_merge_across_files() {
        let index = index(&[
            "module M\n  def a; end\nend\n",
            "module M\n  def b; end\nend\n",
        ]);
        let m = index.namespace_by_name("M").unwrap();
        assert_eq!(m.declarations().len(), 2);
        let methods: Vec<&str> = m.methods().map(|s| s.name.as_ref()).collect();
        assert_eq!(methods, vec!["a", "b"]);
    }

    #[test]
    fn test_redefinition_replaces_method() {
        let index = index(&["class A\n  def run; end\n  def run(x); end\nend\n"]);
        let run = index.namespace_by_name("A").unwrap().method("run").unwrap();
        assert_eq!(run.arity.map(|a| a.required), Some(1));
    }

    #[test]
    fn test_diamond_ancestors() {
        let index = index(&[concat!(
            "module Base; end\n",
            "module BaseWithMethod\n  include Base\n  def foo; end\nend\n",
            "module OtherModuleWithMethod\n  def foo(i); end\nend\n",
            "class E\n  include BaseWithMethod\n  include OtherModuleWithMethod\nend\n",
        )]);
        assert_eq!(
            names(&index, "E"),
            vec!["E", "OtherModuleWithMethod", "BaseWithMethod", "Base"]
        );
    }

    #[test]
    fn test_relationship_resolves_lexically() {
        let index = index(&[
            "module Outer\n  module Helper; end\n  class Thing\n    include Helper\n  end\nend\nmodule Helper; end\n",
        ]);
        assert_eq!(names(&index, "Outer::Thing"), vec!["Outer::Thing", "Outer::Helper"]);
    }

    #[test]
    fn test_superclass_chain() {
        let index = index(&["class Parent; end\nmodule M; end\nclass Child < Parent\n  include M\nend\n"]);
        assert_eq!(names(&index, "Child"), vec!["Child", "M", "Parent"]);
    }

    #[test]
    fn test_kind_mismatch_and_invalid_include_are_problems() {
        let index = index(&["module A; end\nclass A; end\nclass K; end\nmodule M\n  include K\nend\n"]);
        let messages: Vec<String> = index.problems().iter().map(|p| p.message()).collect();
        assert_eq!(
            messages,
            vec![
                "`A` is already defined as a module, cannot reopen it as a class",
                "cannot include class `K`, only modules can be mixed in",
            ]
        );
        assert!(index.namespace_by_name("M").unwrap().includes().is_empty());
    }

    #[test]
    fn test_cyclic_include_is_an_error() {
        let index = index(&["module A\n  include B\nend\nmodule B\n  include A\nend\n"]);
        let a = index.def_id("A").unwrap();
        let b = index.def_id("B").unwrap();
        assert_eq!(index.ancestors(a).unwrap_err(), index.ancestors(b).unwrap_err());
    }

    #[test]
    fn test_cached_chains_are_shared_between_queries() {
        let index = index(&[concat!(
            "module Common; end\n",
            "module Left\n  include Common\nend\n",
            "module Right\n  include Common\nend\n",
            "class C\n  include Left\n  include Right\nend\n",
        )]);
        let c = index.def_id("C").unwrap();
        assert_eq!(names(&index, "C"), vec!["C", "Right", "Left", "Common"]);

        // One linearization of C fills in the chains of everything it includes.
        let cached = index.ancestors.read().len();
        assert_eq!(cached, 4);
        let left = index.def_id("Left").unwrap();
        let chain = index.ancestors.read().get(&left).cloned().unwrap();
        assert!(Arc::ptr_eq(&chain, &index.ancestors(left).unwrap()));

        index.singleton_ancestors(c).unwrap();
        assert_eq!(index.ancestors.read().len(), 4);
    }

    #[test]
    fn test_cycles_found_at_build() {
        let index = index(&[concat!(
            "module X\n  include Y\nend\n",
            "module Y\n  include X\nend\n",
            "module A\n  include B\n  include X\nend\n",
            "module B\n  include A\nend\n",
        )]);
        let messages: Vec<String> = index.cycles().iter().map(|c| c.error.to_string()).collect();
        assert_eq!(
            messages,
            vec!["cyclic include: `A` -> `B` -> `A`", "cyclic include: `X` -> `Y` -> `X`"]
        );
        let a = index.def_id("A").unwrap();
        assert!(index.cycles()[0].members.contains(&a));
        assert!(index.ancestor_errors.read().is_empty());
    }

    #[test]
    fn test_rebuild_after_remove() {
        let mut index = index(&["module M; end\n", "class C\n  include M\nend\n"]);
        index.remove_file(FileId::new(0));
        index.ensure_graph();
        assert!(index.namespace_by_name("M").is_none());
        assert_eq!(names(&index, "C"), vec!["C"]);
    }

    #[test]
    fn test_resolver_lexical_then_ancestors_then_root() {
        let index = index(&[concat!(
            "LIMIT = 1\n",
            "module Mixin\n  MIXED = 2\nend\n",
            "module Outer\n  INNER = 3\n  class Thing\n    include Mixin\n  end\nend\n",
        )]);
        let outer = index.def_id("Outer").unwrap();
        let thing = index.def_id("Outer::Thing").unwrap();
        let resolver = index.resolver(vec![outer, thing]);

        assert!(resolver.resolve("INNER").is_found());
        assert!(resolver.resolve("MIXED").is_found());
        assert!(resolver.resolve("LIMIT").is_found());
        assert_eq!(resolver.resolve("Outer::Thing").namespace(), Some(thing));
        assert_eq!(
            resolver.resolve("Outer::Missing"),
            ResolveResult::NotFound { segment: 1 }
        );
        assert_eq!(resolver.resolve("::INNER"), ResolveResult::NotFound { segment: 0 });
    }
}
