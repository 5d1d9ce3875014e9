//! Diagnostic assertion helpers.

use rubric::hir::{Diagnostic, Severity};

use crate::helpers::hir_helpers::analysis_from_ruby;

/// Get all diagnostics for a Ruby source string.
pub fn diagnostics_from_ruby(source: &str) -> Vec<Diagnostic> {
    let (mut host, file_id) = analysis_from_ruby(source);
    let analysis = host.analysis();
    analysis.diagnostics(file_id)
}

/// Get only error-level diagnostics.
pub fn errors_from_ruby(source: &str) -> Vec<Diagnostic> {
    diagnostics_from_ruby(source)
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

/// Errors as `(line, message)` pairs, lines 0-indexed.
pub fn error_lines(source: &str) -> Vec<(u32, String)> {
    errors_from_ruby(source)
        .into_iter()
        .map(|d| (d.start_line, d.message.to_string()))
        .collect()
}

/// Assert a source has no errors.
pub fn assert_no_errors(source: &str) {
    let errors = errors_from_ruby(source);
    assert!(
        errors.is_empty(),
        "Expected no errors, got {} error(s):\n{}",
        errors.len(),
        errors
            .iter()
            .map(|e| format!("  Line {}: {}", e.start_line + 1, e.message))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
