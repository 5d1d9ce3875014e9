//! Scope-aware walk over method bodies and namespace bodies.
//!
//! The checker visits every statement of a file, tracking the lexical nesting,
//! the type of `self` and a stack of local variable scopes. Constant paths are
//! resolved, calls on a receiver of known type are looked up and arity
//! checked. Anything not handled explicitly is walked through its children,
//! so nothing nested in loops, conditionals or jump values is skipped.

use rustc_hash::FxHashMap;
use super::config::CheckConfig;
use super::diagnostics::{DiagnosticCollector, RelatedInfo};
use super::ids::DefId;
use super::methods::{
    CallShape, LookupError, MethodResolution, check_arity, lookup_method, lookup_singleton_method,
};
use super::resolve::{ConstantTarget, ResolveResult, SymbolIndex};
use super::symbols::qualify;
use crate::base::{FileId, LineIndex, Name, Span, TextRange};
use crate::parser::{
    AssignExpr, AstNode, Block, CallExpr, ClassDef, ConstPath, Expr, MethodDef, ModuleDef, Param,
    RescueClause, SingletonClass, SyntaxNode,
};
use crate::syntax::SyntaxFile;

/// What the checker knows about the value of an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ty {
    Unknown,
    /// An instance of a class (or of a class including this module)
    Instance(DefId),
    /// The namespace object itself
    Singleton(DefId),
}

/// Local variables of one scope.
type LocalScope = FxHashMap<Name, Ty>;

pub struct BodyChecker<'a> {
    index: &'a SymbolIndex,
    file: FileId,
    syntax: &'a SyntaxFile,
    line_index: &'a LineIndex,
    config: CheckConfig,
    collector: &'a mut DiagnosticCollector,
    /// Enclosing namespaces, outermost first
    nesting: Vec<DefId>,
    self_ty: Ty,
    /// Inside `class << self`
    in_singleton_class: bool,
    scopes: Vec<LocalScope>,
}

impl<'a> BodyChecker<'a> {
    pub fn new(
        index: &'a SymbolIndex,
        file: FileId,
        syntax: &'a SyntaxFile,
        config: CheckConfig,
        collector: &'a mut DiagnosticCollector,
    ) -> Self {
        Self {
            index,
            file,
            syntax,
            line_index: syntax.line_index(),
            config,
            collector,
            nesting: Vec::new(),
            self_ty: Ty::Unknown,
            in_singleton_class: false,
            scopes: vec![LocalScope::default()],
        }
    }

    pub fn check_source_file(mut self) {
        let Some(source_file) = self.syntax.source_file() else {
            return;
        };
        for statement in source_file.statements() {
            self.walk_expr(statement);
        }
    }

    fn span(&self, range: TextRange) -> Span {
        self.line_index.span(range)
    }

    // ------------------------------------------------------------------------
    // Locals
    // ------------------------------------------------------------------------

    fn lookup_local(&self, name: &str) -> Option<Ty> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Bind a local. A variable assigned values of different types becomes
    /// unknown for the rest of its scope.
    fn declare_local(&mut self, name: impl Into<Name>, ty: Ty) {
        let name = name.into();
        if let Some(scope) = self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.contains_key(&name))
        {
            if let Some(existing) = scope.get_mut(&name) {
                if *existing != ty {
                    *existing = Ty::Unknown;
                }
            }
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, ty);
        }
    }

    fn declare_params(&mut self, params: impl Iterator<Item = Param>) {
        for param in params {
            if let Some(name) = param.name() {
                self.declare_local(name, Ty::Unknown);
            }
            for nested in param.nested() {
                if let Some(name) = nested.name() {
                    self.declare_local(name, Ty::Unknown);
                }
            }
            if let Some(default) = param.default() {
                self.walk_expr(default);
            }
        }
    }

    /// Run `f` with a fresh local scope stack, restoring the outer state after.
    fn with_fresh_scope(&mut self, self_ty: Ty, f: impl FnOnce(&mut Self)) {
        let saved_scopes = std::mem::replace(&mut self.scopes, vec![LocalScope::default()]);
        let saved_self = std::mem::replace(&mut self.self_ty, self_ty);
        f(self);
        self.self_ty = saved_self;
        self.scopes = saved_scopes;
    }

    // ------------------------------------------------------------------------
    // Walk
    // ------------------------------------------------------------------------

    fn walk_expr(&mut self, expr: Expr) -> Ty {
        match expr {
            Expr::Module(module) => {
                self.walk_module(&module);
                Ty::Unknown
            }
            Expr::Class(class) => {
                self.walk_class(&class);
                Ty::Unknown
            }
            Expr::SingletonClass(singleton) => {
                self.walk_singleton_class(&singleton);
                Ty::Unknown
            }
            Expr::MethodDef(def) => {
                self.walk_method(&def);
                Ty::Unknown
            }
            Expr::ConstPath(path) => self.resolve_const_path(&path),
            Expr::Call(call) => self.walk_call(&call),
            Expr::Assign(assign) => self.walk_assign(&assign),
            Expr::SelfExpr(_) => self.self_ty,
            Expr::NameRef(name_ref) => name_ref
                .name()
                .and_then(|name| self.lookup_local(&name))
                .unwrap_or(Ty::Unknown),
            Expr::Lambda(lambda) => {
                self.scopes.push(LocalScope::default());
                if let Some(params) = lambda.param_list() {
                    self.declare_params(params.params());
                }
                if let Some(block) = lambda.block() {
                    self.walk_block(&block);
                }
                self.scopes.pop();
                Ty::Unknown
            }
            Expr::Paren(paren) => {
                let mut ty = Ty::Unknown;
                for child in paren.syntax().children() {
                    ty = self.walk_node(&child);
                }
                ty
            }
            other => {
                self.walk_children(other.syntax());
                Ty::Unknown
            }
        }
    }

    /// Walk a node that may or may not be an expression.
    fn walk_node(&mut self, node: &SyntaxNode) -> Ty {
        if let Some(block) = Block::cast(node.clone()) {
            self.walk_block(&block);
            return Ty::Unknown;
        }
        if let Some(rescue) = RescueClause::cast(node.clone()) {
            self.walk_rescue(&rescue);
            return Ty::Unknown;
        }
        match Expr::cast(node.clone()) {
            Some(expr) => self.walk_expr(expr),
            None => {
                self.walk_children(node);
                Ty::Unknown
            }
        }
    }

    fn walk_children(&mut self, node: &SyntaxNode) {
        for child in node.children() {
            self.walk_node(&child);
        }
    }

    fn walk_body_statements(&mut self, statements: impl Iterator<Item = Expr>) {
        for statement in statements {
            self.walk_expr(statement);
        }
    }

    fn namespace_id(&self, path: &ConstPath) -> Option<DefId> {
        let outer = self
            .nesting
            .last()
            .map(|&id| self.index.namespace(id).name().to_string());
        let qualified = qualify(outer.as_deref(), &path.path_text());
        self.index.def_id(&qualified)
    }

    fn enter_namespace(&mut self, id: Option<DefId>, f: impl FnOnce(&mut Self)) {
        let self_ty = id.map_or(Ty::Unknown, Ty::Singleton);
        if let Some(id) = id {
            self.nesting.push(id);
        }
        let saved_singleton = std::mem::replace(&mut self.in_singleton_class, false);
        self.with_fresh_scope(self_ty, f);
        self.in_singleton_class = saved_singleton;
        if id.is_some() {
            self.nesting.pop();
        }
    }

    fn walk_module(&mut self, module: &ModuleDef) {
        let id = module.name().and_then(|path| self.namespace_id(&path));
        self.enter_namespace(id, |this| {
            this.walk_body_statements(module.body().into_iter().flat_map(|b| b.statements()));
        });
    }

    fn walk_class(&mut self, class: &ClassDef) {
        // The superclass is evaluated in the enclosing scope.
        if let Some(superclass) = class.superclass().and_then(|s| s.expr()) {
            self.walk_expr(superclass);
        }
        let id = class.name().and_then(|path| self.namespace_id(&path));
        self.enter_namespace(id, |this| {
            this.walk_body_statements(class.body().into_iter().flat_map(|b| b.statements()));
        });
    }

    fn walk_singleton_class(&mut self, singleton: &SingletonClass) {
        let target_ty = singleton
            .target()
            .map_or(Ty::Unknown, |target| self.walk_expr(target));
        let saved = std::mem::replace(&mut self.in_singleton_class, true);
        self.with_fresh_scope(target_ty, |this| {
            this.walk_body_statements(singleton.body().into_iter().flat_map(|b| b.statements()));
        });
        self.in_singleton_class = saved;
    }

    fn walk_method(&mut self, def: &MethodDef) {
        let owner = self.nesting.last().copied();
        let singleton = def.is_singleton() || self.in_singleton_class;
        let self_ty = match owner {
            Some(id) if singleton => Ty::Singleton(id),
            Some(id) => Ty::Instance(id),
            None => Ty::Unknown,
        };
        let saved = std::mem::replace(&mut self.in_singleton_class, false);
        self.with_fresh_scope(self_ty, |this| {
            if let Some(params) = def.param_list() {
                this.declare_params(params.params());
            }
            this.walk_body_statements(def.body().into_iter().flat_map(|b| b.statements()));
            for rescue in def.rescue_clauses() {
                this.walk_rescue(&rescue);
            }
        });
        self.in_singleton_class = saved;
    }

    /// Blocks see the locals of the enclosing scope.
    fn walk_block(&mut self, block: &Block) {
        self.scopes.push(LocalScope::default());
        if let Some(params) = block.params() {
            self.declare_params(params.params());
        }
        self.walk_body_statements(block.body().into_iter().flat_map(|b| b.statements()));
        self.scopes.pop();
    }

    fn walk_rescue(&mut self, rescue: &RescueClause) {
        for exception in rescue.exceptions() {
            self.walk_expr(exception);
        }
        if let Some(name) = rescue.variable().and_then(|v| v.name()) {
            self.declare_local(name, Ty::Unknown);
        }
        self.walk_body_statements(rescue.body().into_iter().flat_map(|b| b.statements()));
    }

    fn walk_assign(&mut self, assign: &AssignExpr) -> Ty {
        match assign.lhs() {
            Some(Expr::NameRef(name_ref)) => {
                let ty = assign
                    .rhs()
                    .map_or(Ty::Unknown, |rhs| self.walk_expr(rhs));
                let ty = if assign.is_compound() { Ty::Unknown } else { ty };
                if let Some(name) = name_ref.name() {
                    self.declare_local(name, ty);
                }
                ty
            }
            // `obj.attr = value` calls `attr=`
            Some(Expr::Call(call)) if call.receiver().is_some() && call.arg_list().is_none() => {
                let receiver_ty = call
                    .receiver()
                    .map_or(Ty::Unknown, |receiver| self.walk_expr(receiver));
                if let Some(name) = call.name() {
                    if assign.is_compound() {
                        self.check_call(&call, receiver_ty, &name, CallShape::positional(0));
                    }
                    let setter = format!("{}=", name);
                    self.check_call(&call, receiver_ty, &setter, CallShape::positional(1));
                }
                assign.rhs().map_or(Ty::Unknown, |rhs| self.walk_expr(rhs))
            }
            // Constant definitions are not references.
            Some(Expr::ConstPath(path)) if path.scope_expr().is_none() => {
                assign.rhs().map_or(Ty::Unknown, |rhs| self.walk_expr(rhs))
            }
            _ => {
                self.walk_children(assign.syntax());
                Ty::Unknown
            }
        }
    }

    // ------------------------------------------------------------------------
    // Constants
    // ------------------------------------------------------------------------

    fn resolve_const_path(&mut self, path: &ConstPath) -> Ty {
        if let Some(scope) = path.scope_expr() {
            self.walk_expr(scope);
            return Ty::Unknown;
        }
        let segments = path.segments();
        if segments.is_empty() {
            return Ty::Unknown;
        }
        let absolute = path.is_absolute();
        let result = self
            .index
            .resolver(self.nesting.clone())
            .resolve_path(&segments, absolute);
        match result {
            ResolveResult::Found(ConstantTarget::Namespace(id)) => Ty::Singleton(id),
            ResolveResult::Found(ConstantTarget::Value(_)) => Ty::Unknown,
            ResolveResult::NotFound { segment } => {
                if self.config.report_unknown_constants {
                    let mut written = segments[..=segment.min(segments.len() - 1)].join("::");
                    if absolute {
                        written.insert_str(0, "::");
                    }
                    let span = self.span(path.syntax().text_range());
                    self.collector.unknown_constant(self.file, span, &written);
                }
                Ty::Unknown
            }
        }
    }

    // ------------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------------

    fn walk_call(&mut self, call: &CallExpr) -> Ty {
        let receiver_ty = call.receiver().map(|receiver| self.walk_expr(receiver));
        for arg in call.args() {
            self.walk_expr(arg);
        }

        let result = match (receiver_ty, call.name()) {
            (Some(receiver_ty), Some(name)) => {
                self.check_call(call, receiver_ty, &name, CallShape::of_call(call))
            }
            _ => Ty::Unknown,
        };

        if let Some(block) = call.block() {
            self.walk_block(&block);
        }
        result
    }

    /// Look up `name` on the receiver and check the argument count. Returns
    /// the type of the call's value when it is known.
    fn check_call(&mut self, call: &CallExpr, receiver: Ty, name: &str, shape: CallShape) -> Ty {
        let lookup = match receiver {
            Ty::Unknown => return Ty::Unknown,
            Ty::Instance(id) => lookup_method(self.index, id, name),
            Ty::Singleton(id) => lookup_singleton_method(self.index, id, name),
        };
        let span = self.span(
            call.name_token()
                .map_or_else(|| call.syntax().text_range(), |token| token.text_range()),
        );

        match lookup {
            Ok(resolution) => {
                if let Some(method) = resolution.method() {
                    if self.config.check_arity {
                        if let Err(error) = check_arity(&method.symbol, shape) {
                            let related = RelatedInfo {
                                file: method.symbol.file,
                                line: method.symbol.start_line,
                                col: method.symbol.start_col,
                                message: format!("`{}` defined here", method.symbol.qualified_name)
                                    .into(),
                            };
                            self.collector
                                .arity_mismatch(self.file, span, &error, Some(related));
                        }
                    }
                }
                match (resolution, receiver) {
                    (MethodResolution::Constructor { .. }, Ty::Singleton(id)) => Ty::Instance(id),
                    _ => Ty::Unknown,
                }
            }
            Err(error @ LookupError::MethodNotFound { .. }) => {
                if self.config.report_missing_methods {
                    self.collector.method_not_found(self.file, span, &error);
                }
                Ty::Unknown
            }
            // Reported once at the declarations on the cycle.
            Err(LookupError::Linearize(_)) => Ty::Unknown,
        }
    }
}
