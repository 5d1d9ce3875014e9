//! `# error:` expectation comments.
//!
//! Test sources mark the diagnostics they expect with a trailing comment on
//! the offending line:
//!
//! ```text
//! E.new.foo # error: Not enough arguments provided for method `OtherModuleWithMethod#foo`
//! next Foo # error: unknown constant `Foo`
//! ```
//!
//! An expectation matches an error on the same line whose message contains
//! the expected text. `# error:` with nothing after it matches any error on
//! its line.

use crate::base::LineIndex;
use crate::base::constants::ERROR_EXPECTATION_MARKER;
use crate::hir::Diagnostic;
use crate::parser::{SyntaxKind, tokenize};

/// One expected error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expectation {
    /// 0-indexed line of the comment
    pub line: u32,
    /// Expected message fragment; empty matches any message
    pub message: String,
}

/// Outcome of matching expectations against diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectationReport {
    /// Expectations with no matching error
    pub missing: Vec<Expectation>,
    /// Errors no expectation accounted for
    pub unexpected: Vec<Diagnostic>,
}

impl ExpectationReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// Collect the `# error:` comments of a source text.
pub fn parse_expectations(text: &str) -> Vec<Expectation> {
    let line_index = LineIndex::new(text);
    tokenize(text)
        .into_iter()
        .filter(|token| token.kind == SyntaxKind::LINE_COMMENT)
        .filter_map(|token| {
            let body = token.text.trim_start_matches('#').trim_start();
            let message = body.strip_prefix(ERROR_EXPECTATION_MARKER)?;
            Some(Expectation {
                line: line_index.line_col(token.offset).line,
                message: message.trim().to_string(),
            })
        })
        .collect()
}

/// Match expectations against the diagnostics of the same file. Each error
/// satisfies at most one expectation; warnings are ignored.
pub fn check_expectations(
    expectations: &[Expectation],
    diagnostics: &[Diagnostic],
) -> ExpectationReport {
    let mut used = vec![false; diagnostics.len()];
    let mut report = ExpectationReport::default();

    for expectation in expectations {
        let matched = diagnostics.iter().enumerate().position(|(i, diagnostic)| {
            !used[i]
                && diagnostic.is_error()
                && diagnostic.start_line == expectation.line
                && diagnostic.message.contains(expectation.message.as_str())
        });
        match matched {
            Some(i) => used[i] = true,
            None => report.missing.push(expectation.clone()),
        }
    }

    report.unexpected = diagnostics
        .iter()
        .zip(&used)
        .filter(|(diagnostic, used)| !**used && diagnostic.is_error())
        .map(|(diagnostic, _)| diagnostic.clone())
        .collect();

    tracing::debug!(
        "[EXPECT] {} expectations, {} missing, {} unexpected",
        expectations.len(),
        report.missing.len(),
        report.unexpected.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;

    fn error(line: u32, message: &str) -> Diagnostic {
        Diagnostic::error(FileId::new(0), line, 0, message)
    }

    #[test]
    fn test_parse_expectations() {
        let text = "x = 1\nnext Foo # error: unknown constant `Foo`\n# a plain comment\nbar # error:\n";
        assert_eq!(
            parse_expectations(text),
            vec![
                Expectation {
                    line: 1,
                    message: "unknown constant `Foo`".to_string()
                },
                Expectation {
                    line: 3,
                    message: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_matching_consumes_each_error_once() {
        let expectations = vec![
            Expectation {
                line: 2,
                message: "unknown constant".to_string(),
            },
            Expectation {
                line: 2,
                message: "unknown constant".to_string(),
            },
        ];
        let report = check_expectations(&expectations, &[error(2, "unknown constant `A`")]);
        assert_eq!(report.missing.len(), 1);
        assert!(report.unexpected.is_empty());
    }

    #[test]
    fn test_unexpected_errors_and_ignored_warnings() {
        let diagnostics = vec![
            error(0, "Method `x` does not exist on `A`"),
            Diagnostic::warning(FileId::new(0), 1, 0, "just a warning"),
        ];
        let report = check_expectations(&[], &diagnostics);
        assert_eq!(report.unexpected.len(), 1);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_empty_expectation_matches_any_error_on_line() {
        let expectations = parse_expectations("foo # error:\n");
        let report = check_expectations(&expectations, &[error(0, "anything at all")]);
        assert!(report.is_ok());
    }
}
