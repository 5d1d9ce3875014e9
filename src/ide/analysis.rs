//! AnalysisHost and Analysis: mutable workspace state and read-only snapshots.
//!
//! The `AnalysisHost` owns the Salsa database, the file table and the
//! workspace [`SymbolIndex`]. Changes go through the host; queries go
//! through an [`Analysis`] snapshot so every read sees the same index.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! host.set_file_content("lib/shapes.rb", "class Circle; end\n");
//!
//! let analysis = host.analysis();
//! let file = analysis.get_file_id("lib/shapes.rb").unwrap();
//! let diagnostics = analysis.diagnostics(file);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use salsa::Setter;

use crate::base::FileId;
use crate::hir::{
    CheckConfig, Diagnostic, FileText, LinearizeError, LookupError, MethodResolution,
    RootDatabase, SymbolIndex, check_file, file_symbols_from_text, lookup_method,
    lookup_singleton_method, parse_file,
};
use crate::syntax::{ParseError, SyntaxFile};

use super::expectations::{ExpectationReport, check_expectations, parse_expectations};

/// Owns all mutable state for the analysis layer.
///
/// Apply changes via `set_file_content()` and `remove_file()`,
/// then get a consistent snapshot via `analysis()`.
pub struct AnalysisHost {
    db: RootDatabase,
    /// Path -> file id, in insertion order
    paths: IndexMap<PathBuf, FileId>,
    inputs: FxHashMap<FileId, FileText>,
    next_file_id: u32,
    symbol_index: SymbolIndex,
    config: CheckConfig,
    /// Files whose symbols must be re-read into the index
    changed: FxHashSet<FileId>,
    removed: Vec<FileId>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// Create a new empty AnalysisHost.
    pub fn new() -> Self {
        Self::with_config(CheckConfig::default())
    }

    pub fn with_config(config: CheckConfig) -> Self {
        Self {
            db: RootDatabase::new(),
            paths: IndexMap::new(),
            inputs: FxHashMap::default(),
            next_file_id: 0,
            symbol_index: SymbolIndex::new(),
            config,
            changed: FxHashSet::default(),
            removed: Vec::new(),
        }
    }

    pub fn config(&self) -> CheckConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CheckConfig) {
        self.config = config;
    }

    /// Set the content of a file. New paths get a fresh [`FileId`]; known
    /// paths keep theirs and only invalidate their own parse.
    ///
    /// Returns parse errors if any.
    pub fn set_file_content(
        &mut self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Vec<ParseError> {
        let path = path.into();
        let content = content.into();

        let file_text = match self.paths.get(&path) {
            Some(file) => {
                let file_text = self.inputs[file];
                if file_text.text(&self.db) != &content {
                    file_text.set_text(&mut self.db).to(content);
                }
                file_text
            }
            None => {
                let file = FileId::new(self.next_file_id);
                self.next_file_id += 1;
                let file_text = FileText::new(&self.db, file, content);
                tracing::trace!("[HOST] {} -> {}", path.display(), file);
                self.paths.insert(path, file);
                self.inputs.insert(file, file_text);
                file_text
            }
        };

        let file = file_text.file(&self.db);
        self.removed.retain(|removed| *removed != file);
        self.changed.insert(file);
        parse_file(&self.db, file_text).syntax_file.errors().to_vec()
    }

    /// Remove a file from the workspace.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        if let Some(file) = self.paths.shift_remove(path.as_ref()) {
            self.inputs.remove(&file);
            self.changed.remove(&file);
            self.removed.push(file);
        }
    }

    pub fn has_file(&self, path: impl AsRef<Path>) -> bool {
        self.paths.contains_key(path.as_ref())
    }

    /// Get the number of files loaded.
    pub fn file_count(&self) -> usize {
        self.paths.len()
    }

    /// Get the FileId for a path, if it exists.
    pub fn get_file_id(&self, path: impl AsRef<Path>) -> Option<FileId> {
        self.paths.get(path.as_ref()).copied()
    }

    /// Bring the symbol index up to date with the changed files.
    ///
    /// This is called automatically by `analysis()`.
    pub fn rebuild_index(&mut self) {
        if self.changed.is_empty() && self.removed.is_empty() && !self.symbol_index.is_dirty() {
            return;
        }
        tracing::debug!(
            "[HOST] refreshing index: {} changed, {} removed",
            self.changed.len(),
            self.removed.len()
        );

        for file in self.removed.drain(..) {
            self.symbol_index.remove_file(file);
        }
        let mut changed: Vec<FileId> = self.changed.drain().collect();
        changed.sort();
        for file in changed {
            if let Some(&file_text) = self.inputs.get(&file) {
                let symbols = file_symbols_from_text(&self.db, file_text);
                self.symbol_index.add_file(file, symbols);
            }
        }
        self.symbol_index.ensure_graph();
    }

    /// Get a consistent snapshot for querying.
    ///
    /// If files changed, the index is refreshed first.
    pub fn analysis(&mut self) -> Analysis<'_> {
        self.rebuild_index();
        Analysis {
            db: &self.db,
            paths: &self.paths,
            inputs: &self.inputs,
            symbol_index: &self.symbol_index,
            config: self.config,
        }
    }
}

/// An immutable snapshot of the analysis state.
pub struct Analysis<'a> {
    db: &'a RootDatabase,
    paths: &'a IndexMap<PathBuf, FileId>,
    inputs: &'a FxHashMap<FileId, FileText>,
    symbol_index: &'a SymbolIndex,
    config: CheckConfig,
}

impl<'a> Analysis<'a> {
    // ==================== Files ====================

    /// Get the FileId for a path.
    pub fn get_file_id(&self, path: impl AsRef<Path>) -> Option<FileId> {
        self.paths.get(path.as_ref()).copied()
    }

    /// Get the path of a FileId.
    pub fn file_path(&self, file: FileId) -> Option<&'a Path> {
        self.paths
            .iter()
            .find(|(_, id)| **id == file)
            .map(|(path, _)| path.as_path())
    }

    /// All files, in the order they were added.
    pub fn files(&self) -> impl Iterator<Item = FileId> + 'a {
        self.paths.values().copied()
    }

    /// The source text of a file.
    pub fn file_text(&self, file: FileId) -> Option<&'a str> {
        self.inputs.get(&file).map(|input| input.text(self.db).as_str())
    }

    /// The parsed file.
    pub fn syntax(&self, file: FileId) -> Option<Arc<SyntaxFile>> {
        let input = self.inputs.get(&file)?;
        Some(parse_file(self.db, *input).syntax_file)
    }

    // ==================== Semantic queries ====================

    /// All diagnostics of one file: syntax errors, include-graph problems
    /// and unresolved constants, methods and arities.
    pub fn diagnostics(&self, file: FileId) -> Vec<Diagnostic> {
        match self.syntax(file) {
            Some(syntax) => check_file(self.symbol_index, file, &syntax, self.config),
            None => Vec::new(),
        }
    }

    /// Diagnostics of every file, file by file.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        self.files()
            .flat_map(|file| self.diagnostics(file))
            .collect()
    }

    /// Linearized ancestors of a class or module, by qualified name.
    pub fn ancestors(&self, qualified_name: &str) -> Option<Result<Vec<Arc<str>>, LinearizeError>> {
        let id = self.symbol_index.def_id(qualified_name)?;
        Some(self.symbol_index.ancestor_names(id))
    }

    /// Resolve `method` on an instance of the named class or module.
    pub fn resolve_method(
        &self,
        qualified_name: &str,
        method: &str,
    ) -> Option<Result<MethodResolution, LookupError>> {
        let id = self.symbol_index.def_id(qualified_name)?;
        Some(lookup_method(self.symbol_index, id, method))
    }

    /// Resolve `method` called on the named class or module itself.
    pub fn resolve_singleton_method(
        &self,
        qualified_name: &str,
        method: &str,
    ) -> Option<Result<MethodResolution, LookupError>> {
        let id = self.symbol_index.def_id(qualified_name)?;
        Some(lookup_singleton_method(self.symbol_index, id, method))
    }

    /// Compare the file's diagnostics with its `# error:` comments.
    pub fn check_expectations(&self, file: FileId) -> Option<ExpectationReport> {
        let text = self.file_text(file)?;
        let expectations = parse_expectations(text);
        Some(check_expectations(&expectations, &self.diagnostics(file)))
    }

    // ==================== Accessors ====================

    /// Get the symbol index.
    pub fn symbol_index(&self) -> &'a SymbolIndex {
        self.symbol_index
    }

    pub fn config(&self) -> CheckConfig {
        self.config
    }
}
