//! Salsa database definition and queries.

use std::sync::Arc;

use crate::base::FileId;
use crate::syntax::SyntaxFile;

use super::symbols::{HirSymbol, extract_symbols};

// ============================================================================
// INPUTS
// ============================================================================

/// Input: The raw text content of a file.
///
/// Set this explicitly when a file is opened or changed.
#[salsa::input]
pub struct FileText {
    pub file: FileId,
    #[return_ref]
    pub text: String,
}

// ============================================================================
// DATABASE
// ============================================================================

/// The root Salsa database for HIR operations.
///
/// Parsing and symbol extraction are memoized per file and invalidated when
/// the file's [`FileText`] changes.
#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for RootDatabase {
    fn salsa_event(&self, _event: &dyn Fn() -> salsa::Event) {}
}

impl RootDatabase {
    /// Create a new, empty database.
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// PARSE RESULT
// ============================================================================

/// A parsed file plus its error messages. Parsing always produces a tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseResult {
    pub syntax_file: Arc<SyntaxFile>,
    pub errors: Vec<String>,
}

// Manual Eq impl for Salsa tracking
impl Eq for ParseResult {}

impl ParseResult {
    pub fn ok(syntax_file: SyntaxFile) -> Self {
        Self {
            syntax_file: Arc::new(syntax_file),
            errors: Vec::new(),
        }
    }

    pub fn ok_with_errors(syntax_file: SyntaxFile, errors: Vec<String>) -> Self {
        Self {
            syntax_file: Arc::new(syntax_file),
            errors,
        }
    }

    /// No syntax errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn get_syntax_file(&self) -> &SyntaxFile {
        &self.syntax_file
    }
}

// ============================================================================
// TRACKED QUERIES
// ============================================================================

/// Parse a file.
///
/// This is a tracked Salsa query - results are memoized and automatically
/// invalidated when the input `FileText` changes.
#[salsa::tracked]
pub fn parse_file(db: &dyn salsa::Database, file_text: FileText) -> ParseResult {
    let text = file_text.text(db);
    let syntax_file = SyntaxFile::new(text);

    if syntax_file.has_errors() {
        let errors: Vec<String> = syntax_file
            .errors()
            .iter()
            .map(|e| e.message.clone())
            .collect();
        tracing::debug!(
            "[DB] {} parsed with {} errors",
            file_text.file(db),
            errors.len()
        );
        ParseResult::ok_with_errors(syntax_file, errors)
    } else {
        ParseResult::ok(syntax_file)
    }
}

/// Extract symbols from a file given its text.
///
/// This is a tracked Salsa query that combines parsing + symbol extraction.
/// Results are memoized per-file.
#[salsa::tracked]
pub fn file_symbols_from_text(db: &dyn salsa::Database, file_text: FileText) -> Vec<HirSymbol> {
    let file = file_text.file(db);
    let result = parse_file(db, file_text);
    extract_symbols(file, &result.syntax_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::symbols::SymbolKind;

    #[test]
    fn test_parse_result() {
        let ok = ParseResult::ok(SyntaxFile::new("class A; end\n"));
        assert!(ok.is_ok());
        assert!(!ok.has_errors());

        let broken = ParseResult::ok_with_errors(SyntaxFile::new("class"), vec!["e".to_string()]);
        assert!(!broken.is_ok());
        assert!(broken.get_syntax_file().has_errors());
    }

    #[test]
    fn test_salsa_tracked_parse_query() {
        let db = RootDatabase::new();
        let file_text = FileText::new(&db, FileId::new(0), "module M\nend\n".to_string());

        let result = parse_file(&db, file_text);
        assert!(result.is_ok(), "Parse failed with errors: {:?}", result.errors);
    }

    #[test]
    fn test_salsa_tracked_symbols_query() {
        let db = RootDatabase::new();
        let source = "module Shapes\n  class Circle\n    def area; end\n  end\nend\n";
        let file_text = FileText::new(&db, FileId::new(0), source.to_string());

        let symbols = file_symbols_from_text(&db, file_text);
        let circle = symbols
            .iter()
            .find(|s| s.qualified_name.as_ref() == "Shapes::Circle")
            .expect("Circle not found in symbols");
        assert_eq!(circle.kind, SymbolKind::Class);
        assert!(symbols.iter().any(|s| s.qualified_name.as_ref() == "Shapes::Circle#area"));
    }

    #[test]
    fn test_salsa_memoization() {
        let db = RootDatabase::new();
        let file_text = FileText::new(&db, FileId::new(0), "class Memo; end\n".to_string());

        let symbols1 = file_symbols_from_text(&db, file_text);
        let symbols2 = file_symbols_from_text(&db, file_text);
        assert_eq!(symbols1, symbols2);
    }

    #[test]
    fn test_symbols_of_empty_file() {
        let db = RootDatabase::new();
        let file_text = FileText::new(&db, FileId::new(0), String::new());
        assert!(file_symbols_from_text(&db, file_text).is_empty());
    }
}
