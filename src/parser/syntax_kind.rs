//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree
//! of the supported Ruby subset.

/// All syntax kinds (tokens and nodes) of the Ruby subset
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (modules, classes, method definitions, calls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,

    /// Newlines terminate statements, so they are not trivia.
    NEWLINE,

    // =========================================================================
    // LITERALS AND NAMES
    // =========================================================================
    IDENT,    // foo, empty?, save!
    CONSTANT, // Foo
    IVAR,     // @foo
    CVAR,     // @@foo
    GVAR,     // $foo
    SYMBOL,   // :foo
    INTEGER,  // 42
    FLOAT,    // 3.14
    STRING,   // "hello" or 'hello'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_PAREN,     // (
    R_PAREN,     // )
    L_BRACKET,   // [
    R_BRACKET,   // ]
    L_BRACE,     // {
    R_BRACE,     // }
    COMMA,       // ,
    DOT,         // .
    SAFE_NAV,    // &.
    DOT_DOT,     // .. or ...
    COLON_COLON, // ::
    COLON,       // :
    SEMICOLON,   // ;
    QUESTION,    // ?
    EQ,          // =
    OP_ASSIGN,   // += -= *= /= ||= &&= <<=
    EQ_EQ,       // ==
    EQ_EQ_EQ,    // ===
    BANG_EQ,     // !=
    MATCH,       // =~
    SPACESHIP,   // <=>
    LT,          // <
    GT,          // >
    LT_EQ,       // <=
    GT_EQ,       // >=
    SHL,         // <<
    PLUS,        // +
    MINUS,       // -
    STAR,        // *
    STAR_STAR,   // **
    SLASH,       // /
    PERCENT,     // %
    BANG,        // !
    AMP,         // &
    AMP_AMP,     // &&
    PIPE,        // |
    PIPE_PIPE,   // ||
    FAT_ARROW,   // =>
    THIN_ARROW,  // ->

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    MODULE_KW,
    CLASS_KW,
    DEF_KW,
    END_KW,
    IF_KW,
    ELSIF_KW,
    ELSE_KW,
    UNLESS_KW,
    WHILE_KW,
    UNTIL_KW,
    DO_KW,
    THEN_KW,
    NEXT_KW,
    BREAK_KW,
    RETURN_KW,
    SELF_KW,
    NIL_KW,
    TRUE_KW,
    FALSE_KW,
    BEGIN_KW,
    RESCUE_KW,
    ENSURE_KW,
    YIELD_KW,
    AND_KW,
    OR_KW,
    NOT_KW,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    BODY,

    // Namespaces and definitions
    MODULE_DEF,
    CLASS_DEF,
    SUPERCLASS,
    SINGLETON_CLASS,
    METHOD_DEF,
    METHOD_NAME,
    PARAM_LIST,
    PARAM,

    // Control flow
    IF_EXPR,
    ELSIF_CLAUSE,
    ELSE_CLAUSE,
    UNLESS_EXPR,
    WHILE_EXPR,
    MODIFIER_EXPR,
    TERNARY_EXPR,
    BEGIN_EXPR,
    RESCUE_CLAUSE,
    ENSURE_CLAUSE,
    NEXT_EXPR,
    BREAK_EXPR,
    RETURN_EXPR,
    YIELD_EXPR,

    // Expressions
    CONST_PATH,
    CALL_EXPR,
    INDEX_EXPR,
    ARG_LIST,
    SPLAT_ARG,
    BLOCK_PASS,
    BLOCK,
    BLOCK_PARAMS,
    LAMBDA_EXPR,
    NAME_REF,
    VAR_REF,
    SELF_EXPR,
    LITERAL,
    ASSIGN_EXPR,
    BINARY_EXPR,
    UNARY_EXPR,
    PAREN_EXPR,
    ARRAY_EXPR,
    HASH_EXPR,
    PAIR,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::MODULE_KW as u16) && (self as u16) <= (Self::NOT_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_PAREN as u16) && (self as u16) <= (Self::THIN_ARROW as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INTEGER
                | Self::FLOAT
                | Self::STRING
                | Self::SYMBOL
                | Self::NIL_KW
                | Self::TRUE_KW
                | Self::FALSE_KW
        )
    }

    /// Statement terminators: newline or `;`
    pub fn is_terminator(self) -> bool {
        matches!(self, Self::NEWLINE | Self::SEMICOLON)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RubyLanguage {}

impl rowan::Language for RubyLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<RubyLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<RubyLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<RubyLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<RubyLanguage>;
