#![allow(clippy::unwrap_used, clippy::expect_used)]

use rubric::hir::{LookupError, MethodResolution};

use crate::helpers::hir_helpers::analysis_from_sources;

const SHAPES: &str = r#"
module Describable
  def describe; end
end

module Measurable
  def area; end
  def scale(factor); end
end

class Shape
  include Describable
  def name; end
end

class Square < Shape
  include Measurable
  def area; end
end
"#;

fn owner_of(resolution: &MethodResolution) -> String {
    resolution
        .method()
        .expect("expected a defined method")
        .symbol
        .qualified_name
        .to_string()
}

#[test]
fn test_first_match_in_ancestor_order_wins() {
    let mut host = analysis_from_sources(&[("shapes.rb", SHAPES)]);
    let analysis = host.analysis();

    let area = analysis.resolve_method("Square", "area").unwrap().unwrap();
    assert_eq!(owner_of(&area), "Square#area");
    let scale = analysis.resolve_method("Square", "scale").unwrap().unwrap();
    assert_eq!(owner_of(&scale), "Measurable#scale");
    let describe = analysis.resolve_method("Square", "describe").unwrap().unwrap();
    assert_eq!(owner_of(&describe), "Describable#describe");
}

#[test]
fn test_override_in_included_module_beats_shared_ancestor() {
    let source = r#"
module Common
  def bar; end
end

module Left
  include Common
  def bar(a); end
end

module Right
  include Common
end

class C
  include Left
  include Right
end
"#;
    let mut host = analysis_from_sources(&[("override.rb", source)]);
    let analysis = host.analysis();
    let bar = analysis.resolve_method("C", "bar").unwrap().unwrap();
    assert_eq!(owner_of(&bar), "Left#bar");
}

#[test]
fn test_methods_resolve_across_files() {
    let mut host = analysis_from_sources(&[
        ("describable.rb", "module Describable\n  def describe(verbose); end\nend\n"),
        ("widget.rb", "class Widget\n  include Describable\nend\n"),
    ]);
    let analysis = host.analysis();
    let resolution = analysis.resolve_method("Widget", "describe").unwrap().unwrap();
    assert_eq!(owner_of(&resolution), "Describable#describe");
}

#[test]
fn test_missing_method_error_names_receiver() {
    let mut host = analysis_from_sources(&[("shapes.rb", SHAPES)]);
    let analysis = host.analysis();

    let error = analysis.resolve_method("Square", "volume").unwrap().unwrap_err();
    assert_eq!(error.to_string(), "Method `volume` does not exist on `Square`");
    assert!(matches!(error, LookupError::MethodNotFound { .. }));
}

#[test]
fn test_object_methods_are_builtin() {
    let mut host = analysis_from_sources(&[("shapes.rb", SHAPES)]);
    let analysis = host.analysis();
    assert_eq!(
        analysis.resolve_method("Square", "inspect").unwrap().unwrap(),
        MethodResolution::Builtin
    );
}

#[test]
fn test_singleton_methods_follow_extend_and_superclass() {
    let source = r#"
module Factory
  def build(attrs); end
end

class Record
  extend Factory
  def self.table; end
end

class User < Record
end
"#;
    let mut host = analysis_from_sources(&[("records.rb", source)]);
    let analysis = host.analysis();

    let build = analysis.resolve_singleton_method("User", "build").unwrap().unwrap();
    assert_eq!(owner_of(&build), "Factory#build");
    let table = analysis.resolve_singleton_method("User", "table").unwrap().unwrap();
    assert_eq!(owner_of(&table), "Record.table");
    assert!(matches!(
        analysis.resolve_singleton_method("User", "new").unwrap().unwrap(),
        MethodResolution::Constructor { initialize: None }
    ));
    assert_eq!(
        analysis
            .resolve_singleton_method("User", "purge")
            .unwrap()
            .unwrap_err()
            .to_string(),
        "Method `purge` does not exist on `T.class_of(User)`"
    );
}

#[test]
fn test_unknown_namespace_is_none() {
    let mut host = analysis_from_sources(&[("shapes.rb", SHAPES)]);
    assert!(host.analysis().resolve_method("Circle", "area").is_none());
}
