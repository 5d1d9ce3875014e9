#![allow(clippy::unwrap_used, clippy::expect_used)]

use rubric::hir::{ConstantTarget, ResolveResult};

use crate::helpers::diagnostic_helpers::{assert_no_errors, error_lines};
use crate::helpers::hir_helpers::analysis_from_sources;

const NESTED: &str = r#"
module Config
  MAX = 3

  module Defaults
  end

  class Loader
  end
end

module Limits
  CEILING = 10
end

class Box
  include Limits
end
"#;

#[test]
fn test_lexical_scope_is_searched_outward() {
    let mut host = analysis_from_sources(&[("config.rb", NESTED)]);
    let analysis = host.analysis();
    let index = analysis.symbol_index();
    let config = index.def_id("Config").unwrap();
    let loader = index.def_id("Config::Loader").unwrap();

    let from_loader = index.resolver(vec![config, loader]).resolve("Defaults");
    assert_eq!(from_loader.namespace(), index.def_id("Config::Defaults"));

    let from_root = index.resolver(Vec::new()).resolve("Defaults");
    assert_eq!(from_root, ResolveResult::NotFound { segment: 0 });
}

#[test]
fn test_constant_values_resolve() {
    let mut host = analysis_from_sources(&[("config.rb", NESTED)]);
    let analysis = host.analysis();
    let index = analysis.symbol_index();

    match index.resolver(Vec::new()).resolve("Config::MAX") {
        ResolveResult::Found(ConstantTarget::Value(symbol)) => {
            assert_eq!(symbol.qualified_name.as_ref(), "Config::MAX")
        }
        other => panic!("expected a constant value, got {:?}", other),
    }
}

#[test]
fn test_included_module_constants_are_visible() {
    let mut host = analysis_from_sources(&[("config.rb", NESTED)]);
    let analysis = host.analysis();
    let index = analysis.symbol_index();
    let box_id = index.def_id("Box").unwrap();

    assert!(index.resolver(vec![box_id]).resolve("CEILING").is_found());
    assert!(index.resolver(Vec::new()).resolve("Box::CEILING").is_found());
    assert!(!index.resolver(Vec::new()).resolve("CEILING").is_found());
}

#[test]
fn test_failing_segment_is_reported() {
    let mut host = analysis_from_sources(&[("config.rb", NESTED)]);
    let analysis = host.analysis();
    let index = analysis.symbol_index();

    assert_eq!(
        index.resolver(Vec::new()).resolve("Config::Missing::Deeper"),
        ResolveResult::NotFound { segment: 1 }
    );
    assert!(index.resolver(Vec::new()).resolve("::Config::Loader").is_found());
}

#[test]
fn test_constant_references_in_method_bodies() {
    let source = r#"
module Config
  MAX = 3
  class Loader
    def limit
      MAX
    end

    def fallback
      Unknown
    end
  end
end
"#;
    assert_eq!(error_lines(source), [(9, "unknown constant `Unknown`".to_string())]);
}

#[test]
fn test_constants_defined_in_other_files() {
    let mut host = analysis_from_sources(&[
        ("app.rb", "class App\n  def run\n    Settings::PORT\n  end\nend\n"),
        ("settings.rb", "module Settings\n  PORT = 80\nend\n"),
    ]);
    let analysis = host.analysis();
    assert!(analysis.all_diagnostics().is_empty());
}

#[test]
fn test_nested_statement_blocks_are_scanned() {
    let source = r#"
class Worker
  def run(items)
    items.each do |item|
      begin
        Processor.call(item)
      rescue StandardErr
        next Skipped
      end
    end
  end
end
"#;
    let errors = error_lines(source);
    let messages: Vec<&str> = errors.iter().map(|(_, m)| m.as_str()).collect();
    assert_eq!(
        messages,
        [
            "unknown constant `Processor`",
            "unknown constant `StandardErr`",
            "unknown constant `Skipped`"
        ]
    );
}

#[test]
fn test_reference_after_definition_in_same_file() {
    assert_no_errors("module Shapes\n  class Circle; end\nend\nShapes::Circle.new\n");
}
