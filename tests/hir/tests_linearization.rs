#![allow(clippy::unwrap_used, clippy::expect_used)]

use rubric::hir::LinearizeError;

use crate::helpers::hir_helpers::{analysis_from_sources, ancestors_of};

const DIAMOND: &str = r#"
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
"#;

#[test]
fn test_diamond_later_include_comes_first() {
    assert_eq!(
        ancestors_of(DIAMOND, "E"),
        ["E", "OtherModuleWithMethod", "BaseWithMethod", "Base"]
    );
}

#[test]
fn test_included_modules_precede_superclass() {
    let source = r#"
module Walk; end
module Swim; end

class Animal
  include Walk
end

class Duck < Animal
  include Swim
end
"#;
    assert_eq!(ancestors_of(source, "Duck"), ["Duck", "Swim", "Animal", "Walk"]);
}

#[test]
fn test_shared_module_appears_once() {
    let source = r#"
module Shared; end
module Left
  include Shared
end
module Right
  include Shared
end
class C
  include Left
  include Right
end
"#;
    let chain = ancestors_of(source, "C");
    assert_eq!(chain, ["C", "Right", "Left", "Shared"]);
    assert_eq!(chain.first().map(String::as_str), Some("C"));
}

#[test]
fn test_module_included_by_superclass_stays_behind_it() {
    let source = r#"
module Shared; end
module Extra; end

class Parent
  include Shared
end

class Child < Parent
  include Extra
  include Shared
end
"#;
    assert_eq!(
        ancestors_of(source, "Child"),
        ["Child", "Extra", "Parent", "Shared"]
    );
}

#[test]
fn test_nested_namespaces_use_qualified_names() {
    let source = r#"
module Outer
  module Mixin; end
  class Inner
    include Mixin
  end
end
"#;
    assert_eq!(ancestors_of(source, "Outer::Inner"), ["Outer::Inner", "Outer::Mixin"]);
}

#[test]
fn test_reopened_class_accumulates_includes() {
    let source = r#"
module A; end
module B; end
class C
  include A
end
class C
  include B
end
"#;
    assert_eq!(ancestors_of(source, "C"), ["C", "B", "A"]);
}

#[test]
fn test_linearization_is_independent_of_file_order() {
    let files = [
        ("a.rb", "module A\n  include Base\nend\n"),
        ("base.rb", "module Base; end\n"),
        ("c.rb", "class C\n  include A\nend\n"),
    ];
    let mut reversed = files;
    reversed.reverse();

    let mut forward_host = analysis_from_sources(&files);
    let mut reversed_host = analysis_from_sources(&reversed);
    let forward = forward_host.analysis().ancestors("C").unwrap().unwrap();
    let backward = reversed_host.analysis().ancestors("C").unwrap().unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn test_relinearizing_unchanged_graph_is_stable() {
    let mut host = analysis_from_sources(&[("diamond.rb", DIAMOND)]);
    let first = host.analysis().ancestors("E").unwrap().unwrap();
    let second = host.analysis().ancestors("E").unwrap().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cycle_is_rejected_from_every_member() {
    let mut host = analysis_from_sources(&[
        ("a.rb", "module A\n  include B\nend\n"),
        ("b.rb", "module B\n  include C\nend\n"),
        ("c.rb", "module C\n  include A\nend\n"),
    ]);
    let analysis = host.analysis();

    let errors: Vec<LinearizeError> = ["A", "B", "C"]
        .iter()
        .map(|name| analysis.ancestors(name).unwrap().unwrap_err())
        .collect();
    assert!(errors.iter().all(|e| *e == errors[0]));
    assert_eq!(
        errors[0].to_string(),
        "cyclic include: `A` -> `B` -> `C` -> `A`"
    );
}

#[test]
fn test_includer_of_cycle_fails_too() {
    let mut host = analysis_from_sources(&[(
        "cycle.rb",
        "module A\n  include B\nend\nmodule B\n  include A\nend\nclass User\n  include A\nend\n",
    )]);
    let analysis = host.analysis();
    let error = analysis.ancestors("User").unwrap().unwrap_err();
    assert!(error.involves("A"));
    assert!(!error.involves("User"));
}

#[test]
fn test_edit_updates_linearization() {
    let mut host = analysis_from_sources(&[
        ("m.rb", "module M; end\n"),
        ("c.rb", "class C\n  include M\nend\n"),
    ]);
    assert_eq!(host.analysis().ancestors("C").unwrap().unwrap().len(), 2);

    host.set_file_content("c.rb", "class C\nend\n");
    let chain = host.analysis().ancestors("C").unwrap().unwrap();
    assert_eq!(chain.iter().map(|n| n.as_ref()).collect::<Vec<_>>(), ["C"]);
}
