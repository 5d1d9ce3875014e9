//! Diagnostics: semantic error reporting.
//!
//! This module provides the diagnostic type shared by every check, the
//! collector the checks write into, and the [`SemanticChecker`] that runs all
//! checks for one file against the workspace [`SymbolIndex`].

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::body::BodyChecker;
use super::config::CheckConfig;
use super::linearize::LinearizeError;
use super::methods::{ArityError, LookupError};
use super::resolve::{GraphProblem, GraphProblemKind, SymbolIndex};
use crate::base::{FileId, Span};
use crate::syntax::{ParseError, SyntaxFile};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file containing this diagnostic.
    pub file: FileId,
    /// Start line (0-indexed).
    pub start_line: u32,
    /// Start column (0-indexed).
    pub start_col: u32,
    /// End line (0-indexed).
    pub end_line: u32,
    /// End column (0-indexed).
    pub end_col: u32,
    pub severity: Severity,
    /// Error code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub file: FileId,
    pub line: u32,
    pub col: u32,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(file: FileId, line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col,
            severity: Severity::Error,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(file: FileId, line: u32, col: u32, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(file, line, col, message)
        }
    }

    /// Create an error covering `span`.
    pub fn error_at(file: FileId, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::error(file, span.start.line, span.start.column, message)
            .with_span(span.end.line, span.end.column)
    }

    /// Set the end of the range for this diagnostic.
    pub fn with_span(mut self, end_line: u32, end_col: u32) -> Self {
        self.end_line = end_line;
        self.end_col = end_col;
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Semantic errors (resolution, lookup, arity, graph shape)
/// - **E0100-E0199**: Syntax errors
pub mod codes {
    /// Constant path that does not resolve.
    pub const UNKNOWN_CONSTANT: &str = "E0001";
    /// No ancestor of the receiver defines the method.
    pub const METHOD_NOT_FOUND: &str = "E0002";
    /// Argument count not accepted by the resolved method.
    pub const ARITY_MISMATCH: &str = "E0003";
    /// A namespace transitively includes itself.
    pub const CYCLIC_INCLUDE: &str = "E0004";
    /// `include`/`extend` of a class, module superclass, superclass mismatch.
    pub const INVALID_TARGET: &str = "E0005";
    /// A module reopened as a class or the other way around.
    pub const KIND_MISMATCH: &str = "E0006";
    /// The parser could not make sense of the input.
    pub const SYNTAX_ERROR: &str = "E0100";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during semantic analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn syntax_error(&mut self, file: FileId, error: &ParseError) {
        self.add(
            Diagnostic::error_at(file, error.span, error.message.as_str())
                .with_code(codes::SYNTAX_ERROR),
        );
    }

    /// `path` is the path as written up to the segment that failed.
    pub fn unknown_constant(&mut self, file: FileId, span: Span, path: &str) {
        self.add(
            Diagnostic::error_at(file, span, format!("unknown constant `{}`", path))
                .with_code(codes::UNKNOWN_CONSTANT),
        );
    }

    pub fn method_not_found(&mut self, file: FileId, span: Span, error: &LookupError) {
        self.add(Diagnostic::error_at(file, span, error.to_string()).with_code(codes::METHOD_NOT_FOUND));
    }

    pub fn arity_mismatch(
        &mut self,
        file: FileId,
        span: Span,
        error: &ArityError,
        definition: Option<RelatedInfo>,
    ) {
        let mut diagnostic =
            Diagnostic::error_at(file, span, error.to_string()).with_code(codes::ARITY_MISMATCH);
        if let Some(info) = definition {
            diagnostic = diagnostic.with_related(info);
        }
        self.add(diagnostic);
    }

    pub fn cyclic_include(&mut self, file: FileId, span: Span, error: &LinearizeError) {
        self.add(Diagnostic::error_at(file, span, error.to_string()).with_code(codes::CYCLIC_INCLUDE));
    }

    pub fn graph_problem(&mut self, problem: &GraphProblem) {
        let code = match problem.kind {
            GraphProblemKind::KindMismatch { .. } => codes::KIND_MISMATCH,
            GraphProblemKind::InvalidTarget { .. } | GraphProblemKind::SuperclassMismatch { .. } => {
                codes::INVALID_TARGET
            }
        };
        self.add(Diagnostic::error_at(problem.file, problem.span, problem.message()).with_code(code));
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific file.
    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

// ============================================================================
// SEMANTIC CHECKER
// ============================================================================

/// Runs every check for one file against the workspace index.
pub struct SemanticChecker<'a> {
    index: &'a SymbolIndex,
    config: CheckConfig,
    collector: DiagnosticCollector,
}

impl<'a> SemanticChecker<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Self {
            index,
            config: CheckConfig::default(),
            collector: DiagnosticCollector::new(),
        }
    }

    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    /// Check one parsed file.
    pub fn check_file(&mut self, file: FileId, syntax: &SyntaxFile) {
        for error in syntax.errors() {
            self.collector.syntax_error(file, error);
        }
        self.check_cycles(file);
        for problem in self.index.problems_in_file(file) {
            self.collector.graph_problem(problem);
        }
        BodyChecker::new(self.index, file, syntax, self.config, &mut self.collector)
            .check_source_file();
    }

    /// Report each cycle at every declaration in `file` of one of its members.
    fn check_cycles(&mut self, file: FileId) {
        for cycle in self.index.cycles() {
            for &member in &cycle.members {
                let declarations = self.index.namespace(member).declarations();
                for declaration in declarations.iter().filter(|d| d.file == file) {
                    self.collector.cyclic_include(file, declaration.span, &cycle.error);
                }
            }
        }
    }

    /// Finish checking, returning diagnostics sorted by position with
    /// duplicates removed.
    pub fn finish(self) -> Vec<Diagnostic> {
        let mut seen = FxHashSet::default();
        let mut diagnostics: Vec<Diagnostic> = self
            .collector
            .diagnostics
            .into_iter()
            .filter(|d| {
                // Deduplicate by (file, line, col, message)
                let key = (d.file, d.start_line, d.start_col, d.message.clone());
                seen.insert(key)
            })
            .collect();
        diagnostics.sort_by(|a, b| {
            (a.file, a.start_line, a.start_col, &a.message).cmp(&(
                b.file,
                b.start_line,
                b.start_col,
                &b.message,
            ))
        });
        diagnostics
    }
}

/// Check a file and return its diagnostics.
pub fn check_file(
    index: &SymbolIndex,
    file: FileId,
    syntax: &SyntaxFile,
    config: CheckConfig,
) -> Vec<Diagnostic> {
    let mut checker = SemanticChecker::new(index).with_config(config);
    checker.check_file(file, syntax);
    checker.finish()
}
