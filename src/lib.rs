//! # rubric-base
//!
//! Core library for analyzing a Ruby subset: parsing, constant resolution,
//! module linearization (method resolution order) and method lookup.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → Workspace loading from disk
//!   ↓
//! ide       → AnalysisHost / Analysis snapshots, `# error:` expectations
//!   ↓
//! hir       → Semantic model with Salsa queries, linearizer, diagnostics
//!   ↓
//! syntax    → SyntaxFile, ParseError with line/column spans
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, typed AST
//!   ↓
//! base      → Primitives (FileId, Name, LineIndex, Span, constants)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → ide → project)
// ============================================================================

/// Foundation types: FileId, Name, TextRange, line/column conversion
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, typed AST
pub mod parser;

/// Syntax: parsed files with line/column errors
pub mod syntax;

/// High-level IR: Salsa-based semantic model
pub mod hir;

/// Analysis host, snapshots and expectation checking
pub mod ide;

/// Project management: workspace loading
pub mod project;

// Re-export foundation types
pub use base::{FileId, LineCol, LineIndex, Name, Position, Span, TextRange, TextSize};

// Re-export the main entry points
pub use hir::{CheckConfig, Diagnostic, LinearizeError, Severity, linearize};
pub use ide::{Analysis, AnalysisHost};
