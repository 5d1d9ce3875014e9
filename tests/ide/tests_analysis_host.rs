#![allow(clippy::unwrap_used, clippy::expect_used)]

use rubric::hir::CheckConfig;
use rubric::ide::AnalysisHost;

use crate::helpers::hir_helpers::{analysis_from_ruby, analysis_from_sources};

#[test]
fn test_file_ids_are_stable_across_edits() {
    let mut host = analysis_from_sources(&[("a.rb", "module A; end\n"), ("b.rb", "module B; end\n")]);
    let a = host.get_file_id("a.rb").unwrap();
    let b = host.get_file_id("b.rb").unwrap();
    assert_ne!(a, b);

    host.set_file_content("a.rb", "module A2; end\n");
    assert_eq!(host.get_file_id("a.rb"), Some(a));
    assert_eq!(host.file_count(), 2);

    let analysis = host.analysis();
    let files: Vec<_> = analysis.files().collect();
    assert_eq!(files, [a, b]);
    assert!(analysis.symbol_index().def_id("A2").is_some());
}

#[test]
fn test_edit_in_one_file_fixes_another() {
    let mut host = analysis_from_sources(&[
        ("user.rb", "class User\n  include Auditable\nend\n"),
        ("auditable.rb", "module Audit; end\n"),
    ]);
    let user = host.get_file_id("user.rb").unwrap();
    assert_eq!(host.analysis().diagnostics(user).len(), 1);

    host.set_file_content("auditable.rb", "module Auditable; end\n");
    assert!(host.analysis().diagnostics(user).is_empty());
}

#[test]
fn test_removed_file_no_longer_resolves() {
    let mut host = analysis_from_sources(&[
        ("helpers.rb", "module Helpers; end\n"),
        ("app.rb", "class App\n  include Helpers\nend\n"),
    ]);
    host.remove_file("helpers.rb");
    assert!(!host.has_file("helpers.rb"));

    let analysis = host.analysis();
    let app = analysis.get_file_id("app.rb").unwrap();
    let diagnostics = analysis.diagnostics(app);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message.as_ref(), "unknown constant `Helpers`");
}

#[test]
fn test_syntax_tree_is_available() {
    let (mut host, file) = analysis_from_ruby("class Tree\nend\n");
    let analysis = host.analysis();
    let syntax = analysis.syntax(file).unwrap();
    assert!(!syntax.has_errors());
    assert_eq!(syntax.source_text(), "class Tree\nend\n");
    assert_eq!(analysis.file_path(file).unwrap().to_str(), Some("test.rb"));
}

#[test]
fn test_config_changes_apply_to_next_snapshot() {
    let (mut host, file) = analysis_from_ruby("class A; end\nA.new.missing\n");
    assert_eq!(host.analysis().diagnostics(file).len(), 1);

    host.set_config(CheckConfig::default().with_missing_methods(false));
    assert!(host.analysis().diagnostics(file).is_empty());
}

#[test]
fn test_empty_host() {
    let mut host = AnalysisHost::default();
    let analysis = host.analysis();
    assert_eq!(analysis.files().count(), 0);
    assert!(analysis.all_diagnostics().is_empty());
    assert!(analysis.ancestors("Anything").is_none());
}
