//! High-level IR (HIR): the semantic model with Salsa queries.
//!
//! Parsing and symbol extraction are memoized per file with Salsa; the
//! workspace-wide include graph is rebuilt from the per-file symbols when
//! files change, and ancestor chains are linearized lazily on top of it.
//!
//! ## Key Types
//!
//! - [`RootDatabase`] - Concrete Salsa database
//! - [`HirSymbol`] - A declaration extracted from the AST
//! - [`SymbolIndex`] - Workspace-wide namespaces, method tables and include graph
//! - [`Linearizer`] - Ancestor chains (method resolution order)
//! - [`Resolver`] - Constant path resolution
//! - [`SemanticChecker`] - Per-file diagnostics
//!
//! ## Query Layers
//!
//! ```text
//! file_text(file)              ← INPUT: raw source text
//!     │
//!     ▼
//! parse_file(file)             ← Parse into CST (per-file)
//!     │
//!     ▼
//! file_symbols_from_text(file) ← Extract symbols (per-file)
//!     │
//!     ▼
//! SymbolIndex                  ← Namespaces + include graph
//!     │
//!     ▼
//! ancestors(def)               ← Linearization, cached per namespace
//!     │
//!     ▼
//! check_file(file)             ← Semantic errors
//! ```

mod body;
mod config;
mod db;
mod diagnostics;
mod ids;
mod linearize;
mod methods;
mod resolve;
mod symbols;

pub use body::{BodyChecker, Ty};
pub use config::CheckConfig;
pub use db::{FileText, ParseResult, RootDatabase, file_symbols_from_text, parse_file};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, RelatedInfo, SemanticChecker, Severity, check_file, codes,
};
pub use ids::DefId;
pub use linearize::{
    Ancestor, IncludeCycle, IncludeGraph, LinearizeError, Linearizer, find_cycles, linearize,
    linearize_singleton,
};
pub use methods::{
    ArityError, CallShape, LookupError, MethodRef, MethodResolution, check_arity, lookup_method,
    lookup_singleton_method,
};
pub use resolve::{
    ConstantTarget, Declaration, GraphProblem, GraphProblemKind, Namespace, ResolveResult,
    Resolver, SymbolIndex,
};
pub use symbols::{
    Arity, HirRelationship, HirSymbol, RelationshipKind, SymbolKind, TOP_LEVEL_OWNER,
    extract_symbols, qualify,
};
