//! Symbol extraction from the AST: pure functions that return symbols.
//!
//! The namer walks namespace bodies and records every module, class, method
//! and constant declaration together with the `include` / `extend` /
//! superclass relationships written in them. Nothing is resolved here: the
//! relationship targets are kept as written, with the lexical nesting needed
//! to resolve them later in the [`SymbolIndex`](super::SymbolIndex).

use std::sync::Arc;

use crate::base::{FileId, LineIndex, Span, TextRange};
use crate::parser::{
    AstNode, CallExpr, ClassDef, ConstPath, Expr, MethodDef, ModuleDef, Param, ParamKind,
    SingletonClass, SyntaxKind, SyntaxNode,
};
use crate::syntax::SyntaxFile;

/// Owner of top-level method definitions.
pub const TOP_LEVEL_OWNER: &str = "Object";

// ============================================================================
// SYMBOLS
// ============================================================================

/// The kind of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Module,
    Class,
    /// `def foo`
    Method,
    /// `def self.foo` or a `def` inside `class << self`
    SingletonMethod,
    /// `FOO = ...`
    Constant,
}

impl SymbolKind {
    /// Modules and classes own other symbols.
    pub fn is_namespace(&self) -> bool {
        matches!(self, SymbolKind::Module | SymbolKind::Class)
    }

    pub fn is_method(&self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::SingletonMethod)
    }

    pub fn display(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Class => "class",
            SymbolKind::Method => "method",
            SymbolKind::SingletonMethod => "singleton method",
            SymbolKind::Constant => "constant",
        }
    }
}

/// The kind of relationship between namespaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// `include M`
    Include,
    /// `extend M`
    Extend,
    /// `class C < S`
    Superclass,
}

impl RelationshipKind {
    pub fn display(&self) -> &'static str {
        match self {
            RelationshipKind::Include => "include",
            RelationshipKind::Extend => "extend",
            RelationshipKind::Superclass => "superclass",
        }
    }
}

/// A relationship from a namespace declaration to another namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HirRelationship {
    pub kind: RelationshipKind,
    /// The target path as written in source, e.g. `Base` or `::A::B`
    pub target: Arc<str>,
    /// Lexical nesting where the target is written, outermost first
    pub nesting: Vec<Arc<str>>,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl HirRelationship {
    pub fn span(&self) -> Span {
        Span::from_coords(self.start_line, self.start_col, self.end_line, self.end_col)
    }
}

/// Number of positional arguments a method accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Arity {
    pub required: u32,
    pub optional: u32,
    /// Has a `*rest` parameter
    pub rest: bool,
    /// Has keyword parameters (`key:`, `key: 1`, `**opts`)
    pub keywords: bool,
}

impl Arity {
    /// Compute the arity of a parameter list.
    pub fn from_params(params: impl IntoIterator<Item = Param>) -> Self {
        let mut arity = Arity::default();
        for param in params {
            match param.kind() {
                ParamKind::Required | ParamKind::Destructure => arity.required += 1,
                ParamKind::Optional => arity.optional += 1,
                ParamKind::Rest => arity.rest = true,
                ParamKind::KeywordRequired | ParamKind::KeywordOptional | ParamKind::KeywordRest => {
                    arity.keywords = true
                }
                ParamKind::Block => {}
            }
        }
        arity
    }

    /// Whether a call with `count` positional arguments is accepted.
    pub fn accepts(&self, count: usize) -> bool {
        let count = count as u64;
        u64::from(self.required) <= count
            && (self.rest || count <= u64::from(self.required + self.optional))
    }

    /// Human readable expectation: `1`, `1..2` or `1+`.
    pub fn describe(&self) -> String {
        if self.rest {
            format!("{}+", self.required)
        } else if self.optional == 0 {
            self.required.to_string()
        } else {
            format!("{}..{}", self.required, self.required + self.optional)
        }
    }
}

/// A declaration extracted from a file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HirSymbol {
    /// The simple name (`B` for `A::B`, `foo` for `A#foo`)
    pub name: Arc<str>,
    /// The fully qualified name: `A::B`, `A::B#foo`, `A::B.foo`, `A::B::MAX`
    pub qualified_name: Arc<str>,
    pub kind: SymbolKind,
    pub file: FileId,
    /// Start line of the name (0-indexed)
    pub start_line: u32,
    /// Start column of the name (0-indexed)
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    /// Qualified name of the owning namespace, for methods and constants
    pub owner: Option<Arc<str>>,
    /// Lexical nesting at the declaration, outermost first. For namespaces
    /// this excludes the namespace itself.
    pub nesting: Vec<Arc<str>>,
    /// Relationships written in this declaration's body
    pub relationships: Vec<HirRelationship>,
    /// Positional arity, for methods
    pub arity: Option<Arity>,
}

impl HirSymbol {
    /// Span of the declared name.
    pub fn span(&self) -> Span {
        Span::from_coords(self.start_line, self.start_col, self.end_line, self.end_col)
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Qualify `path` relative to the namespace `prefix`.
///
/// `::A` is absolute; any other path is taken relative to the enclosing
/// namespace, the way Ruby defines `class A::B` inside `module M`.
pub fn qualify(prefix: Option<&str>, path: &str) -> String {
    if let Some(absolute) = path.strip_prefix("::") {
        return absolute.to_string();
    }
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}::{}", prefix, path),
        _ => path.to_string(),
    }
}

struct ExtractionContext<'a> {
    file: FileId,
    line_index: &'a LineIndex,
    /// Qualified names of the enclosing namespaces
    nesting: Vec<Arc<str>>,
    /// Index in `symbols` of the declaration each nesting entry came from
    owners: Vec<usize>,
    /// Inside `class << self`
    in_singleton_class: bool,
    symbols: Vec<HirSymbol>,
}

struct SpanInfo {
    start_line: u32,
    start_col: u32,
    end_line: u32,
    end_col: u32,
}

impl ExtractionContext<'_> {
    fn current_namespace(&self) -> Option<&Arc<str>> {
        self.nesting.last()
    }

    fn span(&self, range: TextRange) -> SpanInfo {
        let start = self.line_index.line_col(range.start());
        let end = self.line_index.line_col(range.end());
        SpanInfo {
            start_line: start.line,
            start_col: start.col,
            end_line: end.line,
            end_col: end.col,
        }
    }

    fn push_symbol(
        &mut self,
        name: &str,
        qualified_name: String,
        kind: SymbolKind,
        range: TextRange,
        owner: Option<Arc<str>>,
        arity: Option<Arity>,
    ) -> usize {
        let span = self.span(range);
        self.symbols.push(HirSymbol {
            name: Arc::from(name),
            qualified_name: Arc::from(qualified_name),
            kind,
            file: self.file,
            start_line: span.start_line,
            start_col: span.start_col,
            end_line: span.end_line,
            end_col: span.end_col,
            owner,
            nesting: self.nesting.clone(),
            relationships: Vec::new(),
            arity,
        });
        self.symbols.len() - 1
    }

    fn add_relationship(&mut self, kind: RelationshipKind, path: &ConstPath) {
        let Some(&owner) = self.owners.last() else {
            tracing::trace!(
                "[NAMER] ignoring top-level {} of {}",
                kind.display(),
                path.path_text()
            );
            return;
        };
        let span = self.span(path.syntax().text_range());
        let relationship = HirRelationship {
            kind,
            target: Arc::from(path.path_text()),
            nesting: self.nesting.clone(),
            start_line: span.start_line,
            start_col: span.start_col,
            end_line: span.end_line,
            end_col: span.end_col,
        };
        if let Some(symbol) = self.symbols.get_mut(owner) {
            symbol.relationships.push(relationship);
        }
    }
}

/// Extract symbols from a syntax file.
pub fn extract_symbols(file: FileId, syntax: &SyntaxFile) -> Vec<HirSymbol> {
    let mut ctx = ExtractionContext {
        file,
        line_index: syntax.line_index(),
        nesting: Vec::new(),
        owners: Vec::new(),
        in_singleton_class: false,
        symbols: Vec::new(),
    };

    if let Some(source_file) = syntax.source_file() {
        for statement in source_file.statements() {
            extract_from_expr(&mut ctx, statement);
        }
    }

    ctx.symbols
}

fn extract_from_expr(ctx: &mut ExtractionContext<'_>, expr: Expr) {
    match expr {
        Expr::Module(module) => extract_from_module(ctx, &module),
        Expr::Class(class) => extract_from_class(ctx, &class),
        Expr::SingletonClass(singleton) => extract_from_singleton_class(ctx, &singleton),
        Expr::MethodDef(def) => extract_from_method(ctx, &def),
        Expr::Call(call) => {
            extract_from_call(ctx, &call);
            extract_from_children(ctx, call.syntax());
        }
        Expr::Assign(assign) => {
            if let Some(Expr::ConstPath(path)) = assign.lhs() {
                extract_constant(ctx, &path);
            }
            if let Some(rhs) = assign.rhs() {
                extract_from_expr(ctx, rhs);
            }
        }
        other => extract_from_children(ctx, other.syntax()),
    }
}

/// Recurse through conditionals, blocks and argument lists looking for
/// nested declarations.
fn extract_from_children(ctx: &mut ExtractionContext<'_>, node: &SyntaxNode) {
    for child in node.children() {
        match Expr::cast(child.clone()) {
            Some(expr) => extract_from_expr(ctx, expr),
            None => extract_from_children(ctx, &child),
        }
    }
}

fn enter_namespace(
    ctx: &mut ExtractionContext<'_>,
    path: &ConstPath,
    kind: SymbolKind,
) -> Option<usize> {
    let segments = path.segments();
    let name = segments.last()?.clone();
    let qualified = qualify(
        ctx.current_namespace().map(|s| s.as_ref()),
        &path.path_text(),
    );
    let idx = ctx.push_symbol(
        &name,
        qualified.clone(),
        kind,
        path.syntax().text_range(),
        None,
        None,
    );
    ctx.nesting.push(Arc::from(qualified));
    ctx.owners.push(idx);
    Some(idx)
}

fn leave_namespace(ctx: &mut ExtractionContext<'_>) {
    ctx.nesting.pop();
    ctx.owners.pop();
}

fn extract_from_module(ctx: &mut ExtractionContext<'_>, module: &ModuleDef) {
    let Some(path) = module.name() else {
        return;
    };
    if enter_namespace(ctx, &path, SymbolKind::Module).is_none() {
        return;
    }
    let saved = std::mem::replace(&mut ctx.in_singleton_class, false);
    for statement in module.body().into_iter().flat_map(|b| b.statements()) {
        extract_from_expr(ctx, statement);
    }
    ctx.in_singleton_class = saved;
    leave_namespace(ctx);
}

fn extract_from_class(ctx: &mut ExtractionContext<'_>, class: &ClassDef) {
    let Some(path) = class.name() else {
        return;
    };
    let superclass = class.superclass().and_then(|s| s.expr());

    // The superclass expression is evaluated outside the class body.
    let superclass_rel = match &superclass {
        Some(Expr::ConstPath(sup)) if sup.scope_expr().is_none() => {
            let span = ctx.span(sup.syntax().text_range());
            Some(HirRelationship {
                kind: RelationshipKind::Superclass,
                target: Arc::from(sup.path_text()),
                nesting: ctx.nesting.clone(),
                start_line: span.start_line,
                start_col: span.start_col,
                end_line: span.end_line,
                end_col: span.end_col,
            })
        }
        _ => None,
    };
    if let Some(expr) = superclass.filter(|e| !matches!(e, Expr::ConstPath(_))) {
        extract_from_expr(ctx, expr);
    }

    let Some(idx) = enter_namespace(ctx, &path, SymbolKind::Class) else {
        return;
    };
    if let Some(rel) = superclass_rel {
        ctx.symbols[idx].relationships.push(rel);
    }
    let saved = std::mem::replace(&mut ctx.in_singleton_class, false);
    for statement in class.body().into_iter().flat_map(|b| b.statements()) {
        extract_from_expr(ctx, statement);
    }
    ctx.in_singleton_class = saved;
    leave_namespace(ctx);
}

fn extract_from_singleton_class(ctx: &mut ExtractionContext<'_>, singleton: &SingletonClass) {
    if !matches!(singleton.target(), Some(Expr::SelfExpr(_))) {
        tracing::trace!("[NAMER] skipping singleton class of a non-self target");
        return;
    }
    let saved = std::mem::replace(&mut ctx.in_singleton_class, true);
    for statement in singleton.body().into_iter().flat_map(|b| b.statements()) {
        extract_from_expr(ctx, statement);
    }
    ctx.in_singleton_class = saved;
}

fn extract_from_method(ctx: &mut ExtractionContext<'_>, def: &MethodDef) {
    let Some(name_node) = def.name() else {
        return;
    };
    let name = name_node.text();
    if name.is_empty() {
        return;
    }
    let singleton = def.is_singleton() || ctx.in_singleton_class;
    let owner: Arc<str> = ctx
        .current_namespace()
        .cloned()
        .unwrap_or_else(|| Arc::from(TOP_LEVEL_OWNER));
    let (kind, separator) = if singleton {
        (SymbolKind::SingletonMethod, '.')
    } else {
        (SymbolKind::Method, '#')
    };
    let qualified = format!("{}{}{}", owner, separator, name);
    let arity = Arity::from_params(def.param_list().into_iter().flat_map(|p| p.params()));
    ctx.push_symbol(
        &name,
        qualified,
        kind,
        name_node.syntax().text_range(),
        Some(owner),
        Some(arity),
    );
}

/// `include A, B` / `extend A`
fn extract_from_call(ctx: &mut ExtractionContext<'_>, call: &CallExpr) {
    if call.receiver().is_some() {
        return;
    }
    let kind = match call.name().as_deref() {
        Some(accessor @ ("attr_reader" | "attr_writer" | "attr_accessor")) => {
            extract_accessors(ctx, call, accessor);
            return;
        }
        // Including into the singleton class is extending the namespace.
        Some("include") if ctx.in_singleton_class => RelationshipKind::Extend,
        Some("include") => RelationshipKind::Include,
        Some("extend") => RelationshipKind::Extend,
        _ => return,
    };
    let targets: Vec<ConstPath> = call
        .args()
        .filter_map(|arg| match arg {
            Expr::ConstPath(path) if path.scope_expr().is_none() => Some(path),
            _ => None,
        })
        .collect();
    // `include A, B` inserts B first, then A.
    for path in targets.iter().rev() {
        ctx.add_relationship(kind, path);
    }
}

/// `attr_reader :a` defines `a`; `attr_writer :a` defines `a=`.
fn extract_accessors(ctx: &mut ExtractionContext<'_>, call: &CallExpr, accessor: &str) {
    let Some(owner) = ctx.current_namespace().cloned() else {
        return;
    };
    let (kind, separator) = if ctx.in_singleton_class {
        (SymbolKind::SingletonMethod, '.')
    } else {
        (SymbolKind::Method, '#')
    };
    let reader = accessor != "attr_writer";
    let writer = accessor != "attr_reader";

    for arg in call.args() {
        let Expr::Literal(literal) = arg else {
            continue;
        };
        let Some(token) = literal.token().filter(|t| t.kind() == SyntaxKind::SYMBOL) else {
            continue;
        };
        let attribute = token.text().trim_start_matches(':');
        if reader {
            let arity = Arity::default();
            ctx.push_symbol(
                attribute,
                format!("{}{}{}", owner, separator, attribute),
                kind,
                token.text_range(),
                Some(owner.clone()),
                Some(arity),
            );
        }
        if writer {
            let name = format!("{}=", attribute);
            let arity = Arity {
                required: 1,
                ..Arity::default()
            };
            ctx.push_symbol(
                &name,
                format!("{}{}{}", owner, separator, name),
                kind,
                token.text_range(),
                Some(owner.clone()),
                Some(arity),
            );
        }
    }
}

fn extract_constant(ctx: &mut ExtractionContext<'_>, path: &ConstPath) {
    if path.scope_expr().is_some() {
        return;
    }
    let segments = path.segments();
    let Some(name) = segments.last() else {
        return;
    };
    let qualified = qualify(
        ctx.current_namespace().map(|s| s.as_ref()),
        &path.path_text(),
    );
    let owner = qualified
        .rfind("::")
        .map(|idx| Arc::<str>::from(&qualified[..idx]));
    ctx.push_symbol(
        name,
        qualified,
        SymbolKind::Constant,
        path.syntax().text_range(),
        owner,
        None,
    );
}
