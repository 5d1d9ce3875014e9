//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode and provides methods to access children.
//! Accessors never fail on malformed input; they return `None` or an empty
//! iterator when the parser recovered from an error.

use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.children().find_map(N::cast)
}

fn children<N: AstNode>(node: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    node.children().filter_map(N::cast)
}

/// Direct child tokens, skipping trivia.
fn tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
}

fn first_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    tokens(node).find(|token| token.kind() == kind)
}

// ============================================================================
// Root and bodies
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }

    pub fn statements(&self) -> impl Iterator<Item = Expr> + use<> {
        self.body().into_iter().flat_map(|body| body.statements())
    }
}

ast_node!(Body, BODY);

impl Body {
    pub fn statements(&self) -> impl Iterator<Item = Expr> + use<> {
        children(&self.0)
    }
}

// ============================================================================
// Definitions
// ============================================================================

ast_node!(ModuleDef, MODULE_DEF);

impl ModuleDef {
    pub fn name(&self) -> Option<ConstPath> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }
}

ast_node!(ClassDef, CLASS_DEF);

impl ClassDef {
    pub fn name(&self) -> Option<ConstPath> {
        child(&self.0)
    }

    pub fn superclass(&self) -> Option<Superclass> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }
}

ast_node!(Superclass, SUPERCLASS);

impl Superclass {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.0)
    }
}

ast_node!(SingletonClass, SINGLETON_CLASS);

impl SingletonClass {
    /// The expression after `class <<`, usually `self`.
    pub fn target(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }
}

ast_node!(MethodDef, METHOD_DEF);

impl MethodDef {
    pub fn name(&self) -> Option<MethodName> {
        child(&self.0)
    }

    /// `def self.foo`
    pub fn is_singleton(&self) -> bool {
        first_token(&self.0, SyntaxKind::SELF_KW).is_some()
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }

    pub fn rescue_clauses(&self) -> impl Iterator<Item = RescueClause> + use<> {
        children(&self.0)
    }
}

ast_node!(MethodName, METHOD_NAME);

impl MethodName {
    /// The full name, including a setter `=` or `[]`.
    pub fn text(&self) -> SmolStr {
        let mut text = String::new();
        for token in tokens(&self.0) {
            text.push_str(token.text());
        }
        SmolStr::new(text)
    }
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + use<> {
        children(&self.0)
    }
}

/// Shape of a single parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Required,
    Optional,
    Rest,
    KeywordRequired,
    KeywordOptional,
    KeywordRest,
    Block,
    /// `|(a, b)|` in block parameters
    Destructure,
}

ast_node!(Param, PARAM);

impl Param {
    pub fn kind(&self) -> ParamKind {
        let mut toks = tokens(&self.0);
        match toks.next().map(|t| t.kind()) {
            Some(SyntaxKind::STAR) => ParamKind::Rest,
            Some(SyntaxKind::STAR_STAR) => ParamKind::KeywordRest,
            Some(SyntaxKind::AMP) => ParamKind::Block,
            Some(SyntaxKind::L_PAREN) => ParamKind::Destructure,
            _ => match toks.next().map(|t| t.kind()) {
                Some(SyntaxKind::COLON) if self.default().is_some() => ParamKind::KeywordOptional,
                Some(SyntaxKind::COLON) => ParamKind::KeywordRequired,
                Some(SyntaxKind::EQ) => ParamKind::Optional,
                _ => ParamKind::Required,
            },
        }
    }

    pub fn name(&self) -> Option<SmolStr> {
        first_token(&self.0, SyntaxKind::IDENT).map(|t| SmolStr::new(t.text()))
    }

    pub fn default(&self) -> Option<Expr> {
        child(&self.0)
    }

    /// Names bound by a destructuring parameter.
    pub fn nested(&self) -> impl Iterator<Item = Param> + use<> {
        children(&self.0)
    }
}

// ============================================================================
// Control flow
// ============================================================================

ast_node!(IfExpr, IF_EXPR);
ast_node!(UnlessExpr, UNLESS_EXPR);
ast_node!(WhileExpr, WHILE_EXPR);
ast_node!(ModifierExpr, MODIFIER_EXPR);
ast_node!(TernaryExpr, TERNARY_EXPR);
ast_node!(BeginExpr, BEGIN_EXPR);
ast_node!(ElsifClause, ELSIF_CLAUSE);
ast_node!(ElseClause, ELSE_CLAUSE);
ast_node!(EnsureClause, ENSURE_CLAUSE);

impl IfExpr {
    pub fn condition(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn then_body(&self) -> Option<Body> {
        child(&self.0)
    }

    pub fn elsif_clauses(&self) -> impl Iterator<Item = ElsifClause> + use<> {
        children(&self.0)
    }

    pub fn else_clause(&self) -> Option<ElseClause> {
        child(&self.0)
    }
}

impl ModifierExpr {
    /// `if`, `unless`, `while`, `until` or `rescue`
    pub fn keyword(&self) -> Option<SyntaxKind> {
        tokens(&self.0).map(|t| t.kind()).find(|k| k.is_keyword())
    }

    pub fn statement(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn condition(&self) -> Option<Expr> {
        children(&self.0).nth(1)
    }
}

impl ElseClause {
    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }
}

ast_node!(RescueClause, RESCUE_CLAUSE);

impl RescueClause {
    /// Exception classes listed after `rescue`, before `=>`.
    pub fn exceptions(&self) -> impl Iterator<Item = Expr> + use<> {
        let mut seen_arrow = false;
        self.0
            .children_with_tokens()
            .filter_map(move |element| {
                if element.kind() == SyntaxKind::FAT_ARROW {
                    seen_arrow = true;
                }
                if seen_arrow {
                    return None;
                }
                element.into_node().and_then(Expr::cast)
            })
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Local bound by `=> e`.
    pub fn variable(&self) -> Option<NameRef> {
        let mut seen_arrow = false;
        for element in self.0.children_with_tokens() {
            if element.kind() == SyntaxKind::FAT_ARROW {
                seen_arrow = true;
            } else if seen_arrow {
                if let Some(name) = element.into_node().and_then(NameRef::cast) {
                    return Some(name);
                }
            }
        }
        None
    }

    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }
}

/// `next`, `break` and `return`
macro_rules! jump_node {
    ($name:ident, $kind:ident) => {
        ast_node!($name, $kind);

        impl $name {
            pub fn values(&self) -> impl Iterator<Item = Expr> + use<> {
                children(&self.0)
            }
        }
    };
}

jump_node!(NextExpr, NEXT_EXPR);
jump_node!(BreakExpr, BREAK_EXPR);
jump_node!(ReturnExpr, RETURN_EXPR);

ast_node!(YieldExpr, YIELD_EXPR);

impl YieldExpr {
    pub fn arg_list(&self) -> Option<ArgList> {
        child(&self.0)
    }
}

// ============================================================================
// Names and paths
// ============================================================================

ast_node!(ConstPath, CONST_PATH);

impl ConstPath {
    /// Constant names in order, `A::B::C` -> [A, B, C].
    pub fn segments(&self) -> Vec<SmolStr> {
        tokens(&self.0)
            .filter(|t| t.kind() == SyntaxKind::CONSTANT)
            .map(|t| SmolStr::new(t.text()))
            .collect()
    }

    /// `::Foo` - resolved from the top level only.
    pub fn is_absolute(&self) -> bool {
        self.scope_expr().is_none()
            && tokens(&self.0)
                .next()
                .is_some_and(|t| t.kind() == SyntaxKind::COLON_COLON)
    }

    /// `expr::Foo` where the scope is not itself a constant path.
    pub fn scope_expr(&self) -> Option<Expr> {
        child(&self.0)
    }

    /// Text of the path without trivia, e.g. `A::B`.
    pub fn path_text(&self) -> String {
        let mut text = String::new();
        if self.is_absolute() {
            text.push_str("::");
        }
        text.push_str(&self.segments().join("::"));
        text
    }

    pub fn last_segment(&self) -> Option<SmolStr> {
        self.segments().pop()
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn name(&self) -> Option<SmolStr> {
        tokens(&self.0).next().map(|t| SmolStr::new(t.text()))
    }
}

ast_node!(VarRef, VAR_REF);

impl VarRef {
    pub fn name(&self) -> Option<SmolStr> {
        tokens(&self.0).next().map(|t| SmolStr::new(t.text()))
    }
}

ast_node!(SelfExpr, SELF_EXPR);

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        tokens(&self.0).next()
    }
}

// ============================================================================
// Calls
// ============================================================================

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    /// The receiver for `recv.name`; `None` for receiverless calls.
    pub fn receiver(&self) -> Option<Expr> {
        child(&self.0)
    }

    /// The method name token.
    pub fn name_token(&self) -> Option<SyntaxToken> {
        let mut toks = tokens(&self.0);
        if self.receiver().is_some() {
            toks.find(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::DOT | SyntaxKind::SAFE_NAV | SyntaxKind::COLON_COLON
                )
            })?;
            toks.next()
        } else {
            toks.find(|t| matches!(t.kind(), SyntaxKind::IDENT | SyntaxKind::CONSTANT))
        }
    }

    pub fn name(&self) -> Option<SmolStr> {
        self.name_token().map(|t| SmolStr::new(t.text()))
    }

    pub fn is_safe_navigation(&self) -> bool {
        first_token(&self.0, SyntaxKind::SAFE_NAV).is_some()
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child(&self.0)
    }

    pub fn args(&self) -> impl Iterator<Item = Expr> + use<> {
        self.arg_list().into_iter().flat_map(|list| list.args())
    }

    pub fn block(&self) -> Option<Block> {
        child(&self.0)
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + use<> {
        children(&self.0)
    }
}

ast_node!(IndexExpr, INDEX_EXPR);

impl IndexExpr {
    pub fn base(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn args(&self) -> impl Iterator<Item = Expr> + use<> {
        children(&self.0).skip(1)
    }
}

ast_node!(SplatArg, SPLAT_ARG);

impl SplatArg {
    /// `**opts` rather than `*args`
    pub fn is_double(&self) -> bool {
        first_token(&self.0, SyntaxKind::STAR_STAR).is_some()
    }

    pub fn expr(&self) -> Option<Expr> {
        child(&self.0)
    }
}

ast_node!(BlockPass, BLOCK_PASS);

impl BlockPass {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.0)
    }
}

ast_node!(Block, BLOCK);

impl Block {
    pub fn params(&self) -> Option<BlockParams> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<Body> {
        child(&self.0)
    }
}

ast_node!(BlockParams, BLOCK_PARAMS);

impl BlockParams {
    pub fn params(&self) -> impl Iterator<Item = Param> + use<> {
        children(&self.0)
    }
}

ast_node!(LambdaExpr, LAMBDA_EXPR);

impl LambdaExpr {
    pub fn param_list(&self) -> Option<ParamList> {
        child(&self.0)
    }

    pub fn block(&self) -> Option<Block> {
        child(&self.0)
    }
}

// ============================================================================
// Operators and literals
// ============================================================================

ast_node!(AssignExpr, ASSIGN_EXPR);

impl AssignExpr {
    pub fn lhs(&self) -> Option<Expr> {
        child(&self.0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        children(&self.0).nth(1)
    }

    /// `+=`, `||=` and friends
    pub fn is_compound(&self) -> bool {
        first_token(&self.0, SyntaxKind::OP_ASSIGN).is_some()
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);
ast_node!(UnaryExpr, UNARY_EXPR);
ast_node!(ParenExpr, PAREN_EXPR);
ast_node!(ArrayExpr, ARRAY_EXPR);
ast_node!(HashExpr, HASH_EXPR);
ast_node!(Pair, PAIR);

impl HashExpr {
    /// `{ a: 1 }` rather than the bare `a: 1` of a trailing argument
    pub fn is_braced(&self) -> bool {
        first_token(&self.0, SyntaxKind::L_BRACE).is_some()
    }

    pub fn pairs(&self) -> impl Iterator<Item = Pair> + use<> {
        children(&self.0)
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Any expression or statement node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Module(ModuleDef),
    Class(ClassDef),
    SingletonClass(SingletonClass),
    MethodDef(MethodDef),
    If(IfExpr),
    Unless(UnlessExpr),
    While(WhileExpr),
    Modifier(ModifierExpr),
    Ternary(TernaryExpr),
    Begin(BeginExpr),
    Next(NextExpr),
    Break(BreakExpr),
    Return(ReturnExpr),
    Yield(YieldExpr),
    ConstPath(ConstPath),
    Call(CallExpr),
    Index(IndexExpr),
    Splat(SplatArg),
    BlockPass(BlockPass),
    Lambda(LambdaExpr),
    NameRef(NameRef),
    VarRef(VarRef),
    SelfExpr(SelfExpr),
    Literal(Literal),
    Assign(AssignExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Paren(ParenExpr),
    Array(ArrayExpr),
    Hash(HashExpr),
}

macro_rules! expr_variants {
    ($($variant:ident($node:ident) = $kind:ident),* $(,)?) => {
        impl AstNode for Expr {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|*)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                match node.kind() {
                    $(SyntaxKind::$kind => Some(Self::$variant($node(node))),)*
                    _ => None,
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                match self {
                    $(Self::$variant(n) => n.syntax(),)*
                }
            }
        }
    };
}

expr_variants! {
    Module(ModuleDef) = MODULE_DEF,
    Class(ClassDef) = CLASS_DEF,
    SingletonClass(SingletonClass) = SINGLETON_CLASS,
    MethodDef(MethodDef) = METHOD_DEF,
    If(IfExpr) = IF_EXPR,
    Unless(UnlessExpr) = UNLESS_EXPR,
    While(WhileExpr) = WHILE_EXPR,
    Modifier(ModifierExpr) = MODIFIER_EXPR,
    Ternary(TernaryExpr) = TERNARY_EXPR,
    Begin(BeginExpr) = BEGIN_EXPR,
    Next(NextExpr) = NEXT_EXPR,
    Break(BreakExpr) = BREAK_EXPR,
    Return(ReturnExpr) = RETURN_EXPR,
    Yield(YieldExpr) = YIELD_EXPR,
    ConstPath(ConstPath) = CONST_PATH,
    Call(CallExpr) = CALL_EXPR,
    Index(IndexExpr) = INDEX_EXPR,
    Splat(SplatArg) = SPLAT_ARG,
    BlockPass(BlockPass) = BLOCK_PASS,
    Lambda(LambdaExpr) = LAMBDA_EXPR,
    NameRef(NameRef) = NAME_REF,
    VarRef(VarRef) = VAR_REF,
    SelfExpr(SelfExpr) = SELF_EXPR,
    Literal(Literal) = LITERAL,
    Assign(AssignExpr) = ASSIGN_EXPR,
    Binary(BinaryExpr) = BINARY_EXPR,
    Unary(UnaryExpr) = UNARY_EXPR,
    Paren(ParenExpr) = PAREN_EXPR,
    Array(ArrayExpr) = ARRAY_EXPR,
    Hash(HashExpr) = HASH_EXPR,
}
