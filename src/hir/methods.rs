//! Method lookup over ancestor chains, and arity checking.
//!
//! Lookup is by name only: the first ancestor defining the name wins. Whether
//! the call site passes an acceptable number of arguments is checked
//! afterwards by [`check_arity`], so a mismatch never makes lookup fall
//! through to a less specific ancestor.

use super::ids::DefId;
use super::linearize::{Ancestor, LinearizeError};
use super::resolve::SymbolIndex;
use super::symbols::HirSymbol;
use crate::base::constants::{CONSTRUCTOR, is_module_method, is_object_method};
use crate::parser::{CallExpr, Expr};

/// The method a call resolved to, together with its defining namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRef {
    pub owner: DefId,
    pub symbol: HirSymbol,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodResolution {
    /// A `def` found in the ancestor chain.
    Defined(MethodRef),
    /// `C.new` on a class; `initialize` if one is defined in the instance chain.
    Constructor { initialize: Option<MethodRef> },
    /// A method every object (or every class/module) responds to.
    Builtin,
}

impl MethodResolution {
    pub fn method(&self) -> Option<&MethodRef> {
        match self {
            MethodResolution::Defined(method) => Some(method),
            MethodResolution::Constructor { initialize } => initialize.as_ref(),
            MethodResolution::Builtin => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Method `{method}` does not exist on `{receiver}`")]
    MethodNotFound { receiver: String, method: String },
    #[error(transparent)]
    Linearize(#[from] LinearizeError),
}

/// Look up an instance method of `namespace` by scanning its ancestors.
pub fn lookup_method(
    index: &SymbolIndex,
    namespace: DefId,
    name: &str,
) -> Result<MethodResolution, LookupError> {
    if let Some(found) = find_instance_method(index, namespace, name)? {
        return Ok(MethodResolution::Defined(found));
    }
    if is_object_method(name) {
        return Ok(MethodResolution::Builtin);
    }
    Err(LookupError::MethodNotFound {
        receiver: index.namespace(namespace).name().to_string(),
        method: name.to_string(),
    })
}

/// Look up a method called on the namespace itself (`C.build`).
///
/// Scans the singleton chain: `def self.x` tables of the namespace and its
/// superclasses, and the instance tables of extended modules.
pub fn lookup_singleton_method(
    index: &SymbolIndex,
    namespace: DefId,
    name: &str,
) -> Result<MethodResolution, LookupError> {
    for ancestor in index.singleton_ancestors(namespace)?.iter() {
        let (owner, symbol) = match *ancestor {
            Ancestor::Singleton(owner) => (owner, index.namespace(owner).singleton_method(name)),
            Ancestor::Module(owner) => (owner, index.namespace(owner).method(name)),
        };
        if let Some(symbol) = symbol {
            tracing::trace!(
                "[METHODS] {}.{} -> {}",
                index.namespace(namespace).name(),
                name,
                symbol.qualified_name
            );
            return Ok(MethodResolution::Defined(MethodRef {
                owner,
                symbol: symbol.clone(),
            }));
        }
    }

    let target = index.namespace(namespace);
    if name == "new" && target.is_class() {
        let initialize = find_instance_method(index, namespace, CONSTRUCTOR)?;
        return Ok(MethodResolution::Constructor { initialize });
    }
    if is_module_method(name) {
        return Ok(MethodResolution::Builtin);
    }
    Err(LookupError::MethodNotFound {
        receiver: format!("T.class_of({})", target.name()),
        method: name.to_string(),
    })
}

fn find_instance_method(
    index: &SymbolIndex,
    namespace: DefId,
    name: &str,
) -> Result<Option<MethodRef>, LinearizeError> {
    for &ancestor in index.ancestors(namespace)?.iter() {
        if let Some(symbol) = index.namespace(ancestor).method(name) {
            tracing::trace!(
                "[METHODS] {}#{} -> {}",
                index.namespace(namespace).name(),
                name,
                symbol.qualified_name
            );
            return Ok(Some(MethodRef {
                owner: ancestor,
                symbol: symbol.clone(),
            }));
        }
    }
    Ok(None)
}

// ============================================================================
// ARITY
// ============================================================================

/// Argument shape of a call site.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallShape {
    /// Plain positional arguments
    pub positional: usize,
    /// A `*args` argument; the count is unknown
    pub has_splat: bool,
    /// Trailing `key: value` pairs or `**opts`
    pub keyword_hash: bool,
}

impl CallShape {
    pub fn positional(count: usize) -> Self {
        Self {
            positional: count,
            ..Self::default()
        }
    }

    /// Shape of the arguments of a call. Block arguments are not counted.
    pub fn of_call(call: &CallExpr) -> Self {
        Self::of_args(call.args())
    }

    pub fn of_args(args: impl IntoIterator<Item = Expr>) -> Self {
        let mut shape = CallShape::default();
        for arg in args {
            match arg {
                Expr::Splat(splat) if splat.is_double() => shape.keyword_hash = true,
                Expr::Splat(_) => shape.has_splat = true,
                Expr::BlockPass(_) => {}
                Expr::Hash(hash) if !hash.is_braced() => shape.keyword_hash = true,
                _ => shape.positional += 1,
            }
        }
        shape
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArityError {
    #[error(
        "Not enough arguments provided for method `{method}`. Expected: `{expected}`, got: `{got}`"
    )]
    NotEnough {
        method: String,
        expected: String,
        got: usize,
    },
    #[error("Too many arguments provided for method `{method}`. Expected: `{expected}`, got: `{got}`")]
    TooMany {
        method: String,
        expected: String,
        got: usize,
    },
}

/// Check a call's arguments against the resolved method's parameters.
///
/// Splat calls are accepted as is. A trailing keyword hash passed to a method
/// without keyword parameters counts as one more positional argument.
pub fn check_arity(method: &HirSymbol, call: CallShape) -> Result<(), ArityError> {
    let Some(arity) = method.arity else {
        return Ok(());
    };
    if call.has_splat {
        return Ok(());
    }
    let got = call.positional + usize::from(call.keyword_hash && !arity.keywords);
    if arity.accepts(got) {
        return Ok(());
    }
    let method_name = method.qualified_name.to_string();
    let expected = arity.describe();
    if got < arity.required as usize {
        Err(ArityError::NotEnough {
            method: method_name,
            expected,
            got,
        })
    } else {
        Err(ArityError::TooMany {
            method: method_name,
            expected,
            got,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::symbols::extract_symbols;
    use crate::syntax::SyntaxFile;

    fn index(source: &str) -> SymbolIndex {
        let file = FileId::new(0);
        SymbolIndex::build([(file, extract_symbols(file, &SyntaxFile::new(source)))])
    }

    const DIAMOND: &str = concat!(
        "module Base; end\n",
        "module BaseWithMethod\n  include Base\n  def foo; end\nend\n",
        "module OtherModuleWithMethod\n  def foo(i); end\nend\n",
        "class E\n  include BaseWithMethod\n  include OtherModuleWithMethod\nend\n",
    );

    #[test]
    fn test_later_include_defines_the_method() {
        let index = index(DIAMOND);
        let e = index.def_id("E").unwrap();
        let resolution = lookup_method(&index, e, "foo").unwrap();
        let method = resolution.method().unwrap();
        assert_eq!(method.symbol.qualified_name.as_ref(), "OtherModuleWithMethod#foo");
        assert!(check_arity(&method.symbol, CallShape::positional(1)).is_ok());
    }

    #[test]
    fn test_arity_mismatch_does_not_fall_through() {
        let index = index(DIAMOND);
        let e = index.def_id("E").unwrap();
        let method = lookup_method(&index, e, "foo").unwrap();
        let error = check_arity(&method.method().unwrap().symbol, CallShape::positional(0))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Not enough arguments provided for method `OtherModuleWithMethod#foo`. Expected: `1`, got: `0`"
        );
    }

    #[test]
    fn test_missing_method() {
        let index = index(DIAMOND);
        let e = index.def_id("E").unwrap();
        assert_eq!(
            lookup_method(&index, e, "bar").unwrap_err().to_string(),
            "Method `bar` does not exist on `E`"
        );
        assert_eq!(lookup_method(&index, e, "nil?").unwrap(), MethodResolution::Builtin);
    }

    #[test]
    fn test_singleton_lookup() {
        let index = index(concat!(
            "module Helpers\n  def helper(a, b); end\nend\n",
            "class Parent\n  extend Helpers\n  def self.build; end\nend\n",
            "class Child < Parent\n  def initialize(name); end\nend\n",
        ));
        let child = index.def_id("Child").unwrap();

        let build = lookup_singleton_method(&index, child, "build").unwrap();
        assert_eq!(build.method().unwrap().symbol.qualified_name.as_ref(), "Parent.build");
        let helper = lookup_singleton_method(&index, child, "helper").unwrap();
        assert_eq!(helper.method().unwrap().symbol.qualified_name.as_ref(), "Helpers#helper");

        match lookup_singleton_method(&index, child, "new").unwrap() {
            MethodResolution::Constructor { initialize } => {
                assert_eq!(initialize.unwrap().symbol.qualified_name.as_ref(), "Child#initialize")
            }
            other => panic!("expected constructor, got {:?}", other),
        }
        assert_eq!(
            lookup_singleton_method(&index, child, "missing")
                .unwrap_err()
                .to_string(),
            "Method `missing` does not exist on `T.class_of(Child)`"
        );
    }

    #[test]
    fn test_new_on_module_is_not_found() {
        let index = index("module M; end\n");
        let m = index.def_id("M").unwrap();
        assert!(matches!(
            lookup_singleton_method(&index, m, "new"),
            Err(LookupError::MethodNotFound { .. })
        ));
    }

    #[test]
    fn test_cycle_surfaces_as_lookup_error() {
        let index = index("module A\n  include B\nend\nmodule B\n  include A\nend\n");
        let a = index.def_id("A").unwrap();
        assert!(matches!(
            lookup_method(&index, a, "foo"),
            Err(LookupError::Linearize(_))
        ));
    }

    #[test]
    fn test_keyword_hash_counts_without_keyword_params() {
        let index = index("class A\n  def one(a); end\n  def opts(a, key: 1); end\nend\n");
        let a = index.namespace_by_name("A").unwrap();
        let shape = CallShape {
            positional: 1,
            keyword_hash: true,
            has_splat: false,
        };
        assert!(matches!(
            check_arity(a.method("one").unwrap(), shape),
            Err(ArityError::TooMany { got: 2, .. })
        ));
        assert!(check_arity(a.method("opts").unwrap(), shape).is_ok());
        let splat = CallShape {
            has_splat: true,
            ..CallShape::default()
        };
        assert!(check_arity(a.method("one").unwrap(), splat).is_ok());
    }

    #[test]
    fn test_call_shape_of_source() {
        let file = SyntaxFile::new("run(1, *rest, &blk)\nrun(1, {a: 1}, key: 2)\n");
        let calls: Vec<CallExpr> = file
            .source_file()
            .unwrap()
            .statements()
            .filter_map(|e| match e {
                Expr::Call(call) => Some(call),
                _ => None,
            })
            .collect();
        let first = CallShape::of_call(&calls[0]);
        assert_eq!((first.positional, first.has_splat, first.keyword_hash), (1, true, false));
        let second = CallShape::of_call(&calls[1]);
        assert_eq!((second.positional, second.has_splat, second.keyword_hash), (2, false, true));
    }
}
