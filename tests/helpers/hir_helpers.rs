//! HIR test helpers for setting up analysis hosts.

use rubric::base::FileId;
use rubric::ide::AnalysisHost;

/// Creates an AnalysisHost with a single Ruby file.
pub fn analysis_from_ruby(source: &str) -> (AnalysisHost, FileId) {
    analysis_from_source(source, "test.rb")
}

/// Creates an AnalysisHost with a single file.
pub fn analysis_from_source(source: &str, filename: &str) -> (AnalysisHost, FileId) {
    let mut host = AnalysisHost::new();
    let errors = host.set_file_content(filename, source);
    assert!(
        errors.is_empty(),
        "Parse errors in '{}': {:?}",
        filename,
        errors
    );

    let file_id = host
        .get_file_id(filename)
        .expect("File should be known after set_file_content");
    (host, file_id)
}

/// Creates an AnalysisHost with multiple files.
pub fn analysis_from_sources(files: &[(&str, &str)]) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    for (path, content) in files {
        let errors = host.set_file_content(*path, *content);
        assert!(
            errors.is_empty(),
            "Parse errors in '{}': {:?}",
            path,
            errors
        );
    }
    host
}

/// Ancestor chain of `name` in a single-file workspace.
pub fn ancestors_of(source: &str, name: &str) -> Vec<String> {
    let (mut host, _) = analysis_from_ruby(source);
    let analysis = host.analysis();
    analysis
        .ancestors(name)
        .unwrap_or_else(|| panic!("`{name}` is not defined"))
        .unwrap_or_else(|e| panic!("linearizing `{name}` failed: {e}"))
        .iter()
        .map(|n| n.to_string())
        .collect()
}
