//! Logos-based lexer for the Ruby subset
//!
//! Fast tokenization using the logos crate. The lexer never fails: bytes it
//! does not understand become `ERROR` tokens and the parser reports them.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\f]+")]
    #[regex(r"\\\r?\n")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    LineComment,

    #[token("\n")]
    Newline,

    // =========================================================================
    // NAMES AND LITERALS
    // =========================================================================
    #[regex(r"[a-z_][a-zA-Z0-9_]*[?!]?")]
    Ident,

    #[regex(r"[A-Z][a-zA-Z0-9_]*")]
    Constant,

    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
    Ivar,

    #[regex(r"@@[a-zA-Z_][a-zA-Z0-9_]*")]
    Cvar,

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    Gvar,

    #[regex(r":[a-zA-Z_][a-zA-Z0-9_]*[?!=]?")]
    #[regex(r#":"([^"\\]|\\.)*""#)]
    Symbol,

    #[regex(r"[0-9][0-9_]*")]
    Integer,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Float,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("<=>")]
    Spaceship,

    #[token("===")]
    EqEqEq,

    #[token("==")]
    EqEq,

    #[token("=~")]
    Match,

    #[token("=>")]
    FatArrow,

    #[token("!=")]
    BangEq,

    #[token("->")]
    ThinArrow,

    #[token("&.")]
    SafeNav,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    #[token("**")]
    StarStar,

    #[token("<<")]
    Shl,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("::")]
    ColonColon,

    #[token("..")]
    #[token("...")]
    DotDot,

    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("||=")]
    #[token("&&=")]
    #[token("<<=")]
    OpAssign,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token("?")]
    Question,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("!")]
    Bang,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("module")]
    ModuleKw,

    #[token("class")]
    ClassKw,

    #[token("def")]
    DefKw,

    #[token("end")]
    EndKw,

    #[token("if")]
    IfKw,

    #[token("elsif")]
    ElsifKw,

    #[token("else")]
    ElseKw,

    #[token("unless")]
    UnlessKw,

    #[token("while")]
    WhileKw,

    #[token("until")]
    UntilKw,

    #[token("do")]
    DoKw,

    #[token("then")]
    ThenKw,

    #[token("next")]
    NextKw,

    #[token("break")]
    BreakKw,

    #[token("return")]
    ReturnKw,

    #[token("self")]
    SelfKw,

    #[token("nil")]
    NilKw,

    #[token("true")]
    TrueKw,

    #[token("false")]
    FalseKw,

    #[token("begin")]
    BeginKw,

    #[token("rescue")]
    RescueKw,

    #[token("ensure")]
    EnsureKw,

    #[token("yield")]
    YieldKw,

    #[token("and")]
    AndKw,

    #[token("or")]
    OrKw,

    #[token("not")]
    NotKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            // Trivia
            Whitespace => SyntaxKind::WHITESPACE,
            LineComment => SyntaxKind::LINE_COMMENT,
            Newline => SyntaxKind::NEWLINE,

            // Names and literals
            Ident => SyntaxKind::IDENT,
            Constant => SyntaxKind::CONSTANT,
            Ivar => SyntaxKind::IVAR,
            Cvar => SyntaxKind::CVAR,
            Gvar => SyntaxKind::GVAR,
            Symbol => SyntaxKind::SYMBOL,
            Integer => SyntaxKind::INTEGER,
            Float => SyntaxKind::FLOAT,
            String => SyntaxKind::STRING,

            // Multi-char punctuation
            Spaceship => SyntaxKind::SPACESHIP,
            EqEqEq => SyntaxKind::EQ_EQ_EQ,
            EqEq => SyntaxKind::EQ_EQ,
            Match => SyntaxKind::MATCH,
            FatArrow => SyntaxKind::FAT_ARROW,
            BangEq => SyntaxKind::BANG_EQ,
            ThinArrow => SyntaxKind::THIN_ARROW,
            SafeNav => SyntaxKind::SAFE_NAV,
            AmpAmp => SyntaxKind::AMP_AMP,
            PipePipe => SyntaxKind::PIPE_PIPE,
            StarStar => SyntaxKind::STAR_STAR,
            Shl => SyntaxKind::SHL,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,
            ColonColon => SyntaxKind::COLON_COLON,
            DotDot => SyntaxKind::DOT_DOT,
            OpAssign => SyntaxKind::OP_ASSIGN,

            // Single-char punctuation
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            Comma => SyntaxKind::COMMA,
            Dot => SyntaxKind::DOT,
            Colon => SyntaxKind::COLON,
            Semicolon => SyntaxKind::SEMICOLON,
            Question => SyntaxKind::QUESTION,
            Eq => SyntaxKind::EQ,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Star => SyntaxKind::STAR,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,
            Bang => SyntaxKind::BANG,
            Amp => SyntaxKind::AMP,
            Pipe => SyntaxKind::PIPE,

            // Keywords
            ModuleKw => SyntaxKind::MODULE_KW,
            ClassKw => SyntaxKind::CLASS_KW,
            DefKw => SyntaxKind::DEF_KW,
            EndKw => SyntaxKind::END_KW,
            IfKw => SyntaxKind::IF_KW,
            ElsifKw => SyntaxKind::ELSIF_KW,
            ElseKw => SyntaxKind::ELSE_KW,
            UnlessKw => SyntaxKind::UNLESS_KW,
            WhileKw => SyntaxKind::WHILE_KW,
            UntilKw => SyntaxKind::UNTIL_KW,
            DoKw => SyntaxKind::DO_KW,
            ThenKw => SyntaxKind::THEN_KW,
            NextKw => SyntaxKind::NEXT_KW,
            BreakKw => SyntaxKind::BREAK_KW,
            ReturnKw => SyntaxKind::RETURN_KW,
            SelfKw => SyntaxKind::SELF_KW,
            NilKw => SyntaxKind::NIL_KW,
            TrueKw => SyntaxKind::TRUE_KW,
            FalseKw => SyntaxKind::FALSE_KW,
            BeginKw => SyntaxKind::BEGIN_KW,
            RescueKw => SyntaxKind::RESCUE_KW,
            EnsureKw => SyntaxKind::ENSURE_KW,
            YieldKw => SyntaxKind::YIELD_KW,
            AndKw => SyntaxKind::AND_KW,
            OrKw => SyntaxKind::OR_KW,
            NotKw => SyntaxKind::NOT_KW,
        }
    }
}
