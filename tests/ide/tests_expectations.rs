#![allow(clippy::unwrap_used, clippy::expect_used)]

use rubric::ide::{Expectation, check_expectations, parse_expectations};

use crate::helpers::hir_helpers::analysis_from_sources;

#[test]
fn test_expectations_collected_per_line() {
    let text = "A # error: unknown constant `A`\nB\nC # error:unknown constant `C`\n";
    let expectations = parse_expectations(text);
    assert_eq!(
        expectations,
        [
            Expectation {
                line: 0,
                message: "unknown constant `A`".to_string()
            },
            Expectation {
                line: 2,
                message: "unknown constant `C`".to_string()
            },
        ]
    );
}

#[test]
fn test_non_error_comments_are_ignored() {
    assert!(parse_expectations("# just a note\nx = 1 # warning: nope\n").is_empty());
}

#[test]
fn test_expectations_match_against_host_diagnostics() {
    let mut host = analysis_from_sources(&[
        ("lib.rb", "module Lib\n  def call(a); end\nend\n"),
        (
            "app.rb",
            "class App\n  include Lib\nend\nApp.new.call # error: Not enough arguments\nApp.new.call(1)\n",
        ),
    ]);
    let analysis = host.analysis();
    let app = analysis.get_file_id("app.rb").unwrap();
    let report = analysis.check_expectations(app).unwrap();
    assert!(report.is_ok(), "{report:?}");
}

#[test]
fn test_wrong_line_is_both_missing_and_unexpected() {
    let mut host = analysis_from_sources(&[(
        "shifted.rb",
        "Missing\n# error: unknown constant `Missing`\n",
    )]);
    let analysis = host.analysis();
    let file = analysis.get_file_id("shifted.rb").unwrap();

    let text = analysis.file_text(file).unwrap();
    let report = check_expectations(&parse_expectations(text), &analysis.diagnostics(file));
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].line, 1);
    assert_eq!(report.unexpected.len(), 1);
    assert_eq!(report.unexpected[0].start_line, 0);
}
