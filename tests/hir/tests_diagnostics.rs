#![allow(clippy::unwrap_used, clippy::expect_used)]

use rubric::hir::codes;

use crate::helpers::diagnostic_helpers::{
    assert_no_errors, diagnostics_from_ruby, error_lines, errors_from_ruby,
};
use crate::helpers::hir_helpers::analysis_from_sources;

#[test]
fn test_diamond_call_selects_later_include() {
    let source = r#"
module Base
end

module BaseWithMethod
  include Base
  def foo; end
end

module OtherModuleWithMethod
  def foo(i); end
end

class E
  include BaseWithMethod
  include OtherModuleWithMethod
end

E.new.foo(1)
E.new.foo
"#;
    assert_eq!(
        error_lines(source),
        [(
            19,
            "Not enough arguments provided for method `OtherModuleWithMethod#foo`. Expected: `1`, got: `0`"
                .to_string()
        )]
    );
}

#[test]
fn test_arity_error_points_at_definition() {
    let source = "class A\n  def pair(a, b = 1); end\nend\nA.new.pair(1, 2, 3)\n";
    let errors = errors_from_ruby(source);
    assert_eq!(errors.len(), 1);
    let error = &errors[0];
    assert_eq!(error.code.as_deref(), Some(codes::ARITY_MISMATCH));
    assert_eq!(
        error.message.as_ref(),
        "Too many arguments provided for method `A#pair`. Expected: `1..2`, got: `3`"
    );
    assert_eq!(error.related.len(), 1);
    assert_eq!(error.related[0].line, 1);
}

#[test]
fn test_cycle_reported_at_each_member_declaration() {
    let source = "module A\n  include B\nend\n\nmodule B\n  include A\nend\n";
    let errors = errors_from_ruby(source);
    let lines: Vec<u32> = errors.iter().map(|e| e.start_line).collect();
    assert_eq!(lines, [0, 4]);
    for error in &errors {
        assert_eq!(error.code.as_deref(), Some(codes::CYCLIC_INCLUDE));
        assert_eq!(error.message.as_ref(), "cyclic include: `A` -> `B` -> `A`");
    }
}

#[test]
fn test_cycle_reported_even_when_member_includes_another_cycle() {
    let source = r#"module X
  include Y
end
module Y
  include X
end
module A
  include B
  include X
end
module B
  include A
end
class User
  include A
end
"#;
    let errors: Vec<(u32, String)> = errors_from_ruby(source)
        .iter()
        .map(|e| (e.start_line, e.message.to_string()))
        .collect();
    let a_b = "cyclic include: `A` -> `B` -> `A`".to_string();
    let x_y = "cyclic include: `X` -> `Y` -> `X`".to_string();
    assert_eq!(
        errors,
        [(0, x_y.clone()), (3, x_y), (6, a_b.clone()), (10, a_b)]
    );
}

#[test]
fn test_cycle_reported_once_per_file() {
    let mut host = analysis_from_sources(&[
        ("a.rb", "module A\n  include B\nend\n"),
        ("b.rb", "module B\n  include A\nend\n"),
    ]);
    let analysis = host.analysis();
    let a = analysis.get_file_id("a.rb").unwrap();
    let b = analysis.get_file_id("b.rb").unwrap();
    assert_eq!(analysis.diagnostics(a).len(), 1);
    assert_eq!(analysis.diagnostics(b).len(), 1);
    assert_eq!(analysis.all_diagnostics().len(), 2);
}

#[test]
fn test_include_of_class_is_invalid() {
    let source = "class Engine; end\nclass Car\n  include Engine\nend\n";
    assert_eq!(
        error_lines(source),
        [(2, "cannot include class `Engine`, only modules can be mixed in".to_string())]
    );
}

#[test]
fn test_module_as_superclass_is_invalid() {
    let source = "module Wheels; end\nclass Car < Wheels\nend\n";
    assert_eq!(
        error_lines(source),
        [(1, "superclass must be a class, `Wheels` is a module".to_string())]
    );
}

#[test]
fn test_reopening_with_other_kind() {
    let source = "module Thing; end\nclass Thing; end\n";
    let errors = errors_from_ruby(source);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code.as_deref(), Some(codes::KIND_MISMATCH));
    assert_eq!(
        errors[0].message.as_ref(),
        "`Thing` is already defined as a module, cannot reopen it as a class"
    );
}

#[test]
fn test_superclass_mismatch() {
    let source = "class A; end\nclass B; end\nclass C < A; end\nclass C < B; end\n";
    assert_eq!(
        error_lines(source),
        [(3, "superclass mismatch for class `C`".to_string())]
    );
}

#[test]
fn test_unresolved_include_is_unknown_constant() {
    let source = "class App\n  include Missing\nend\n";
    let errors = errors_from_ruby(source);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code.as_deref(), Some(codes::UNKNOWN_CONSTANT));
    assert_eq!(errors[0].start_line, 1);
}

#[test]
fn test_syntax_errors_are_diagnostics() {
    let mut host = rubric::AnalysisHost::new();
    host.set_file_content("broken.rb", "class Broken\n  def run\n");
    let analysis = host.analysis();
    let file = analysis.get_file_id("broken.rb").unwrap();
    let diagnostics = analysis.diagnostics(file);
    assert!(!diagnostics.is_empty());
    assert!(diagnostics
        .iter()
        .all(|d| d.code.as_deref() == Some(codes::SYNTAX_ERROR)));
}

#[test]
fn test_diagnostics_are_sorted_by_position() {
    let source = "Zeta\nAlpha\nclass A; end\nA.new.nope\n";
    let lines: Vec<u32> = diagnostics_from_ruby(source)
        .iter()
        .map(|d| d.start_line)
        .collect();
    assert_eq!(lines, [0, 1, 3]);
}

#[test]
fn test_valid_program_is_clean() {
    assert_no_errors(
        r#"
module Greeting
  def greet(name, punctuation = "!")
    name
  end
end

class Person
  include Greeting
  attr_accessor :name

  def initialize(name)
    @name = name
  end

  def self.build(name)
    new(name)
  end
end

Person.build("Ada")
person = Person.new("Ada")
person.greet("Ada")
person.name = "Grace"
person.name
Person.new("Bob").greet("Bob", "?")
"#,
    );
}
