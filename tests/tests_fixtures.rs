//! Annotated fixture files under `tests/testdata/`.
//!
//! Every fixture is analyzed as a single-file workspace and must produce
//! exactly the errors its `# error:` comments announce.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use rstest::rstest;
use rubric::ide::{AnalysisHost, ExpectationReport, parse_expectations};
use walkdir::WalkDir;

static TESTDATA: Lazy<PathBuf> =
    Lazy::new(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("testdata"));

/// All fixture files, sorted.
static FIXTURES: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    let mut paths: Vec<PathBuf> = WalkDir::new(&*TESTDATA)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rb"))
        .collect();
    paths.sort();
    paths
});

fn check_fixture(path: &Path) -> ExpectationReport {
    let text = std::fs::read_to_string(path).expect("fixture should be readable");
    let mut host = AnalysisHost::new();
    let errors = host.set_file_content(path, text);
    assert!(errors.is_empty(), "{}: parse errors {:?}", path.display(), errors);

    let analysis = host.analysis();
    let file = analysis.get_file_id(path).unwrap();
    analysis.check_expectations(file).unwrap()
}

fn assert_fixture(path: &Path) {
    let report = check_fixture(path);
    assert!(
        report.is_ok(),
        "{}:\n  missing: {:?}\n  unexpected: {:?}",
        path.display(),
        report.missing,
        report
            .unexpected
            .iter()
            .map(|d| format!("line {}: {}", d.start_line + 1, d.message))
            .collect::<Vec<_>>()
    );
}

#[rstest]
#[case("linearization.rb", 1)]
#[case("next_break.rb", 4)]
#[case("cyclic_include.rb", 2)]
#[case("nested_scopes.rb", 3)]
#[case("arity.rb", 3)]
#[case("superclass.rb", 2)]
#[case("singleton.rb", 3)]
fn test_fixture(#[case] name: &str, #[case] expected_errors: usize) {
    let path = TESTDATA.join(name);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(parse_expectations(&text).len(), expected_errors);
    assert_fixture(&path);
}

#[test]
fn test_every_fixture_passes() {
    assert!(!FIXTURES.is_empty(), "no fixtures under {}", TESTDATA.display());
    for path in FIXTURES.iter() {
        assert_fixture(path);
    }
}

#[test]
fn test_removing_annotation_surfaces_unexpected_error() {
    let path = TESTDATA.join("next_break.rb");
    let text = std::fs::read_to_string(&path).unwrap();
    let stripped = text.replace(" # error: unknown constant `Foo`", "");

    let mut host = AnalysisHost::new();
    host.set_file_content("next_break.rb", stripped);
    let analysis = host.analysis();
    let file = analysis.get_file_id("next_break.rb").unwrap();
    let report = analysis.check_expectations(file).unwrap();

    assert!(report.missing.is_empty());
    assert_eq!(report.unexpected.len(), 1);
    assert_eq!(report.unexpected[0].message.as_ref(), "unknown constant `Foo`");
}
