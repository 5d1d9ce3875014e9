//! HIR layer tests
//!
//! Tests for the semantic model through the analysis host:
//! - Module linearization across files
//! - Method lookup and arity checks
//! - Constant resolution
//! - Semantic diagnostics

pub mod tests_constants;
pub mod tests_diagnostics;
pub mod tests_linearization;
pub mod tests_method_lookup;
