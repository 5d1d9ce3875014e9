//! Recursive descent parser for the Ruby subset
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse Ruby source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens, TextSize::of(input));
    parser.parse_source_file();
    parser.finish()
}

/// Binding power of binary operators, loosest first.
fn binary_precedence(kind: SyntaxKind) -> Option<u8> {
    use SyntaxKind::*;
    let prec = match kind {
        DOT_DOT => 1,
        PIPE_PIPE => 2,
        AMP_AMP => 3,
        EQ_EQ | BANG_EQ | EQ_EQ_EQ | MATCH | SPACESHIP => 4,
        LT | GT | LT_EQ | GT_EQ => 5,
        PIPE | AMP => 6,
        SHL => 7,
        PLUS | MINUS => 8,
        STAR | SLASH | PERCENT => 9,
        STAR_STAR => 10,
        _ => return None,
    };
    Some(prec)
}

/// Operators that may be defined as methods (`def ==(other)`).
const OPERATOR_METHOD_NAMES: &[SyntaxKind] = &[
    SyntaxKind::PLUS,
    SyntaxKind::MINUS,
    SyntaxKind::STAR,
    SyntaxKind::STAR_STAR,
    SyntaxKind::SLASH,
    SyntaxKind::PERCENT,
    SyntaxKind::EQ_EQ,
    SyntaxKind::EQ_EQ_EQ,
    SyntaxKind::BANG_EQ,
    SyntaxKind::MATCH,
    SyntaxKind::SPACESHIP,
    SyntaxKind::LT,
    SyntaxKind::GT,
    SyntaxKind::LT_EQ,
    SyntaxKind::GT_EQ,
    SyntaxKind::SHL,
    SyntaxKind::BANG,
];

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    end: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    /// Set while parsing `while` conditions and command arguments, where a
    /// `do` belongs to the enclosing construct.
    no_do_block: bool,
    /// Set inside `|...|` block parameters, where `|` closes the list.
    no_pipe: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], end: TextSize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            no_do_block: false,
            no_pipe: false,
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn raw(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.raw(0) == Some(kind)
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        self.raw(0).is_some_and(|k| kinds.contains(&k))
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn next_non_trivia_index(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&idx| !self.tokens[idx].kind.is_trivia())
    }

    /// Kind of the next non-trivia token (newlines are not trivia).
    fn peek(&self) -> Option<SyntaxKind> {
        self.next_non_trivia_index(self.pos)
            .map(|idx| self.tokens[idx].kind)
    }

    /// Kind of the next token that is neither trivia nor a newline.
    fn peek_past_newlines(&self) -> Option<SyntaxKind> {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .map(|t| t.kind)
            .find(|k| !k.is_trivia() && *k != SyntaxKind::NEWLINE)
    }

    /// `foo bar` - whitespace followed by something that starts an argument
    /// on the same line.
    fn at_command_arg_start(&self) -> bool {
        use SyntaxKind::*;
        if !self.at(WHITESPACE) {
            return false;
        }
        let Some(idx) = self.next_non_trivia_index(self.pos) else {
            return false;
        };
        let glued = self
            .tokens
            .get(idx + 1)
            .is_some_and(|t| !t.kind.is_trivia() && t.kind != NEWLINE);
        match self.tokens[idx].kind {
            IDENT | CONSTANT | IVAR | CVAR | GVAR | SYMBOL | INTEGER | FLOAT | STRING | NIL_KW
            | TRUE_KW | FALSE_KW | SELF_KW | L_BRACKET | L_PAREN | THIN_ARROW | DEF_KW
            | NOT_KW | BANG => true,
            COLON_COLON | STAR | STAR_STAR | AMP | MINUS => glued,
            _ => false,
        }
    }

    /// `key: value`
    fn at_label(&self) -> bool {
        self.at_any(&[SyntaxKind::IDENT, SyntaxKind::CONSTANT])
            && self.raw(1) == Some(SyntaxKind::COLON)
    }

    /// Scan ahead on the current argument for a top-level `=>`.
    fn rocket_pair_ahead(&self) -> bool {
        use SyntaxKind::*;
        let mut depth = 0usize;
        for token in &self.tokens[self.pos..] {
            match token.kind {
                L_PAREN | L_BRACKET | L_BRACE => depth += 1,
                R_PAREN | R_BRACKET | R_BRACE => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                FAT_ARROW if depth == 0 => return true,
                COMMA | NEWLINE | SEMICOLON | DO_KW | END_KW if depth == 0 => return false,
                _ => {}
            }
        }
        false
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        let tokens = self.tokens;
        if let Some(token) = tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    /// Consume the current token under a different kind (keywords used as
    /// method names become identifiers).
    fn bump_as(&mut self, kind: SyntaxKind) {
        let tokens = self.tokens;
        if let Some(token) = tokens.get(self.pos) {
            self.builder.token(kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            let found = self
                .raw(0)
                .map(|k| format!("{:?}", k))
                .unwrap_or_else(|| "end of file".to_string());
            self.error(format!("expected {:?}, found {}", kind, found));
            false
        }
    }

    fn skip_trivia(&mut self) {
        while self.current().is_some_and(|t| t.kind.is_trivia()) {
            self.bump();
        }
    }

    /// Skip trivia and newlines (inside brackets, after operators).
    fn skip_ws_and_newlines(&mut self) {
        while self
            .current()
            .is_some_and(|t| t.kind.is_trivia() || t.kind == SyntaxKind::NEWLINE)
        {
            self.bump();
        }
    }

    /// Skip trivia and statement terminators.
    fn skip_terminators(&mut self) {
        while self
            .current()
            .is_some_and(|t| t.kind.is_trivia() || t.kind.is_terminator())
        {
            self.bump();
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| TextRange::empty(self.end));
        self.errors.push(SyntaxError::new(message, range));
    }

    /// Report an error and wrap the current token in an ERROR node.
    fn error_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        if !self.at_eof() {
            self.start_node(SyntaxKind::ERROR);
            self.bump();
            self.finish_node();
        }
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    fn with_no_do_block<T>(&mut self, value: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.no_do_block, value);
        let result = f(self);
        self.no_do_block = saved;
        result
    }

    // =========================================================================
    // Grammar rules: statements
    // =========================================================================

    /// SourceFile = Body
    fn parse_source_file(&mut self) {
        self.start_node(SyntaxKind::SOURCE_FILE);
        self.parse_body(&[]);
        // Anything left over is a stray closer; keep it in the tree.
        while !self.at_eof() {
            self.error_bump(format!("unexpected {:?}", self.raw(0).unwrap_or(SyntaxKind::ERROR)));
        }
        self.finish_node();
    }

    /// Body = (Statement Terminator)*
    fn parse_body(&mut self, terminators: &[SyntaxKind]) {
        self.start_node(SyntaxKind::BODY);
        loop {
            self.skip_terminators();
            if self.at_eof() || self.at_any(terminators) {
                break;
            }
            let pos_before = self.pos;
            self.parse_statement();
            // Safety: if we didn't make progress, force-skip a token
            if self.pos == pos_before {
                self.error_bump(format!(
                    "unexpected {:?}",
                    self.raw(0).unwrap_or(SyntaxKind::ERROR)
                ));
            }
        }
        self.finish_node();
    }

    /// Statement = ExprStmt (('if' | 'unless' | 'while' | 'until' | 'rescue') ExprStmt)*
    fn parse_statement(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_expr_stmt();
        loop {
            self.skip_trivia();
            if !self.at_any(&[
                SyntaxKind::IF_KW,
                SyntaxKind::UNLESS_KW,
                SyntaxKind::WHILE_KW,
                SyntaxKind::UNTIL_KW,
                SyntaxKind::RESCUE_KW,
            ]) {
                break;
            }
            self.start_node_at(checkpoint, SyntaxKind::MODIFIER_EXPR);
            self.bump();
            self.skip_trivia();
            self.parse_expr_stmt();
            self.finish_node();
        }
    }

    /// ExprStmt = NotExpr (('and' | 'or') NotExpr)*
    fn parse_expr_stmt(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_not_expr();
        loop {
            self.skip_trivia();
            if !self.at_any(&[SyntaxKind::AND_KW, SyntaxKind::OR_KW]) {
                break;
            }
            self.start_node_at(checkpoint, SyntaxKind::BINARY_EXPR);
            self.bump();
            self.skip_ws_and_newlines();
            self.parse_not_expr();
            self.finish_node();
        }
    }

    fn parse_not_expr(&mut self) {
        self.skip_trivia();
        if self.at(SyntaxKind::NOT_KW) {
            self.start_node(SyntaxKind::UNARY_EXPR);
            self.bump();
            self.skip_trivia();
            self.parse_not_expr();
            self.finish_node();
        } else {
            self.parse_expr();
        }
    }

    // =========================================================================
    // Grammar rules: expressions
    // =========================================================================

    /// Expr = Ternary (('=' | OpAssign) Expr)?
    fn parse_expr(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_ternary();
        self.skip_trivia();
        if self.at_any(&[SyntaxKind::EQ, SyntaxKind::OP_ASSIGN]) {
            self.start_node_at(checkpoint, SyntaxKind::ASSIGN_EXPR);
            self.bump();
            self.skip_ws_and_newlines();
            self.parse_expr();
            self.finish_node();
        }
    }

    /// Ternary = Binary ('?' Ternary ':' Ternary)?
    fn parse_ternary(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_binary(0);
        self.skip_trivia();
        if self.at(SyntaxKind::QUESTION) {
            self.start_node_at(checkpoint, SyntaxKind::TERNARY_EXPR);
            self.bump();
            self.skip_ws_and_newlines();
            self.parse_ternary();
            self.skip_ws_and_newlines();
            self.expect(SyntaxKind::COLON);
            self.skip_ws_and_newlines();
            self.parse_ternary();
            self.finish_node();
        }
    }

    fn parse_binary(&mut self, min_precedence: u8) {
        let checkpoint = self.checkpoint();
        self.parse_unary();
        loop {
            self.skip_trivia();
            let Some(kind) = self.raw(0) else {
                break;
            };
            if self.no_pipe && kind == SyntaxKind::PIPE {
                break;
            }
            let Some(precedence) = binary_precedence(kind) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.start_node_at(checkpoint, SyntaxKind::BINARY_EXPR);
            self.bump();
            self.skip_ws_and_newlines();
            self.parse_binary(precedence + 1);
            self.finish_node();
        }
    }

    fn parse_unary(&mut self) {
        self.skip_trivia();
        if self.at_any(&[
            SyntaxKind::BANG,
            SyntaxKind::MINUS,
            SyntaxKind::PLUS,
            SyntaxKind::DOT_DOT,
        ]) {
            self.start_node(SyntaxKind::UNARY_EXPR);
            self.bump();
            self.parse_unary();
            self.finish_node();
        } else {
            self.parse_postfix();
        }
    }

    /// Postfix = Primary ('.' Name Args? Block? | '::' Constant | '[' Args ']')*
    fn parse_postfix(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_primary();
        loop {
            match self.peek_past_newlines() {
                Some(SyntaxKind::DOT | SyntaxKind::SAFE_NAV) => {
                    self.skip_ws_and_newlines();
                    self.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
                    self.bump();
                    self.skip_ws_and_newlines();
                    self.parse_method_name_token();
                    self.parse_call_args();
                    self.parse_block_opt();
                    self.finish_node();
                    continue;
                }
                _ => {}
            }
            if self.at(SyntaxKind::COLON_COLON) {
                match self.raw(1) {
                    Some(SyntaxKind::CONSTANT) => {
                        self.start_node_at(checkpoint, SyntaxKind::CONST_PATH);
                        self.bump();
                        self.bump();
                        self.finish_node();
                        continue;
                    }
                    Some(SyntaxKind::IDENT) => {
                        self.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
                        self.bump();
                        self.bump();
                        self.parse_call_args();
                        self.parse_block_opt();
                        self.finish_node();
                        continue;
                    }
                    _ => {}
                }
            }
            if self.at(SyntaxKind::L_BRACKET) {
                self.start_node_at(checkpoint, SyntaxKind::INDEX_EXPR);
                self.parse_delimited_args(SyntaxKind::L_BRACKET, SyntaxKind::R_BRACKET);
                self.finish_node();
                continue;
            }
            break;
        }
    }

    fn parse_method_name_token(&mut self) {
        match self.raw(0) {
            Some(SyntaxKind::IDENT | SyntaxKind::CONSTANT) => self.bump(),
            Some(kind) if kind.is_keyword() => self.bump_as(SyntaxKind::IDENT),
            Some(kind) if OPERATOR_METHOD_NAMES.contains(&kind) => self.bump(),
            _ => self.error("expected method name"),
        }
    }

    fn parse_primary(&mut self) {
        use SyntaxKind::*;
        self.skip_trivia();
        let Some(kind) = self.raw(0) else {
            self.error("expected expression, found end of file");
            return;
        };
        match kind {
            INTEGER | FLOAT | STRING | SYMBOL | NIL_KW | TRUE_KW | FALSE_KW => {
                self.start_node(LITERAL);
                self.bump();
                self.finish_node();
            }
            SELF_KW => {
                self.start_node(SELF_EXPR);
                self.bump();
                self.finish_node();
            }
            IVAR | CVAR | GVAR => {
                self.start_node(VAR_REF);
                self.bump();
                self.finish_node();
            }
            CONSTANT => self.parse_constant_or_call(),
            COLON_COLON => {
                self.start_node(CONST_PATH);
                self.bump();
                self.expect(CONSTANT);
                self.parse_const_path_tail();
                self.finish_node();
            }
            IDENT => self.parse_identifier(),
            L_PAREN => self.parse_paren_expr(),
            L_BRACKET => {
                self.start_node(ARRAY_EXPR);
                self.parse_delimited_args(L_BRACKET, R_BRACKET);
                self.finish_node();
            }
            L_BRACE => self.parse_hash_literal(),
            THIN_ARROW => self.parse_lambda(),
            MODULE_KW => self.parse_module(),
            CLASS_KW => self.parse_class(),
            DEF_KW => self.parse_method_def(),
            IF_KW => self.parse_if(),
            UNLESS_KW => self.parse_unless(),
            WHILE_KW | UNTIL_KW => self.parse_while(),
            BEGIN_KW => self.parse_begin(),
            NEXT_KW => self.parse_jump(NEXT_EXPR),
            BREAK_KW => self.parse_jump(BREAK_EXPR),
            RETURN_KW => self.parse_jump(RETURN_EXPR),
            YIELD_KW => {
                self.start_node(YIELD_EXPR);
                self.bump();
                self.parse_call_args();
                self.finish_node();
            }
            NEWLINE | SEMICOLON | END_KW | R_PAREN | R_BRACE | R_BRACKET | ELSE_KW
            | ELSIF_KW | RESCUE_KW | ENSURE_KW | THEN_KW => {
                self.error(format!("expected expression, found {:?}", kind));
            }
            _ => self.error_bump(format!("expected expression, found {:?}", kind)),
        }
    }

    /// `Foo`, `Foo::Bar`, or a constant-named call `Integer(x)`
    fn parse_constant_or_call(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump();
        if self.at(SyntaxKind::L_PAREN) {
            self.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
            self.parse_call_args();
            self.parse_block_opt();
            self.finish_node();
        } else {
            self.start_node_at(checkpoint, SyntaxKind::CONST_PATH);
            self.parse_const_path_tail();
            self.finish_node();
        }
    }

    fn parse_const_path_tail(&mut self) {
        while self.at(SyntaxKind::COLON_COLON) && self.raw(1) == Some(SyntaxKind::CONSTANT) {
            self.bump();
            self.bump();
        }
    }

    /// A bare identifier is a local variable or a receiverless call; it is a
    /// call when it has arguments or a block.
    fn parse_identifier(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump();
        let has_args = self.at(SyntaxKind::L_PAREN) || self.at_command_arg_start();
        let has_block = match self.peek() {
            Some(SyntaxKind::DO_KW) => !self.no_do_block,
            Some(SyntaxKind::L_BRACE) => true,
            _ => false,
        };
        if has_args || has_block {
            self.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
            self.parse_call_args();
            self.parse_block_opt();
            self.finish_node();
        } else {
            self.start_node_at(checkpoint, SyntaxKind::NAME_REF);
            self.finish_node();
        }
    }

    fn parse_paren_expr(&mut self) {
        self.start_node(SyntaxKind::PAREN_EXPR);
        self.bump();
        self.with_no_do_block(false, |p| {
            loop {
                p.skip_terminators();
                if p.at_eof() || p.at(SyntaxKind::R_PAREN) {
                    break;
                }
                let pos_before = p.pos;
                p.parse_statement();
                if p.pos == pos_before {
                    break;
                }
            }
        });
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// Args = Arg (',' Arg)* between `open` and `close`
    fn parse_delimited_args(&mut self, open: SyntaxKind, close: SyntaxKind) {
        // Bracketed forms are already wrapped by ARRAY_EXPR / INDEX_EXPR.
        let wrap_arg_list = open == SyntaxKind::L_PAREN;
        if wrap_arg_list {
            self.start_node(SyntaxKind::ARG_LIST);
        }
        self.bump();
        self.with_no_do_block(false, |p| {
            p.skip_ws_and_newlines();
            while !p.at_eof() && !p.at(close) {
                let pos_before = p.pos;
                p.parse_arg();
                p.skip_ws_and_newlines();
                if p.pos == pos_before || !p.eat(SyntaxKind::COMMA) {
                    break;
                }
                p.skip_ws_and_newlines();
            }
        });
        self.expect(close);
        if wrap_arg_list {
            self.finish_node();
        }
    }

    /// CallArgs = '(' Args ')' | CommandArgs
    fn parse_call_args(&mut self) {
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_delimited_args(SyntaxKind::L_PAREN, SyntaxKind::R_PAREN);
        } else if self.at_command_arg_start() {
            self.start_node(SyntaxKind::ARG_LIST);
            self.skip_trivia();
            self.with_no_do_block(true, |p| {
                loop {
                    let pos_before = p.pos;
                    p.parse_arg();
                    p.skip_trivia();
                    if p.pos == pos_before || !p.at(SyntaxKind::COMMA) {
                        break;
                    }
                    p.bump();
                    p.skip_ws_and_newlines();
                }
            });
            self.finish_node();
        }
    }

    /// Arg = '*' Expr | '**' Expr | '&' Expr? | BareHash | Expr
    fn parse_arg(&mut self) {
        self.skip_trivia();
        match self.raw(0) {
            Some(SyntaxKind::STAR | SyntaxKind::STAR_STAR) => {
                self.start_node(SyntaxKind::SPLAT_ARG);
                self.bump();
                self.parse_ternary();
                self.finish_node();
            }
            Some(SyntaxKind::AMP) => {
                self.start_node(SyntaxKind::BLOCK_PASS);
                self.bump();
                // Anonymous block forwarding: foo(&)
                if !self.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::COMMA]) {
                    self.parse_ternary();
                }
                self.finish_node();
            }
            _ if self.at_label() || self.rocket_pair_ahead() => self.parse_bare_hash(),
            _ => self.parse_expr(),
        }
    }

    /// Trailing `key: value` / `k => v` pairs form one hash argument.
    fn parse_bare_hash(&mut self) {
        self.start_node(SyntaxKind::HASH_EXPR);
        loop {
            self.parse_pair();
            self.skip_trivia();
            if !self.at(SyntaxKind::COMMA) {
                break;
            }
            let after_comma = self.next_non_trivia_index(self.pos + 1);
            let continues = after_comma.is_some_and(|idx| {
                let kind = self.tokens[idx].kind;
                let next = self.tokens.get(idx + 1).map(|t| t.kind);
                matches!(kind, SyntaxKind::IDENT | SyntaxKind::CONSTANT)
                    && next == Some(SyntaxKind::COLON)
            });
            if !continues {
                break;
            }
            self.bump();
            self.skip_ws_and_newlines();
        }
        self.finish_node();
    }

    /// Pair = Label Expr | Expr '=>' Expr
    fn parse_pair(&mut self) {
        self.start_node(SyntaxKind::PAIR);
        if self.at_label() {
            self.bump();
            self.bump();
            self.skip_ws_and_newlines();
            self.parse_expr();
        } else {
            self.parse_ternary();
            self.skip_ws_and_newlines();
            self.expect(SyntaxKind::FAT_ARROW);
            self.skip_ws_and_newlines();
            self.parse_expr();
        }
        self.finish_node();
    }

    fn parse_hash_literal(&mut self) {
        self.start_node(SyntaxKind::HASH_EXPR);
        self.bump();
        self.skip_ws_and_newlines();
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            if self.at(SyntaxKind::STAR_STAR) {
                self.start_node(SyntaxKind::SPLAT_ARG);
                self.bump();
                self.parse_ternary();
                self.finish_node();
            } else {
                self.parse_pair();
            }
            self.skip_ws_and_newlines();
            if self.pos == pos_before || !self.eat(SyntaxKind::COMMA) {
                break;
            }
            self.skip_ws_and_newlines();
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// Block = 'do' BlockParams? Body 'end' | '{' BlockParams? Body '}'
    fn parse_block_opt(&mut self) {
        let opens_block = match self.peek() {
            Some(SyntaxKind::DO_KW) => !self.no_do_block,
            Some(SyntaxKind::L_BRACE) => true,
            _ => false,
        };
        if opens_block {
            self.skip_trivia();
            self.parse_block();
        }
    }

    fn parse_block(&mut self) {
        self.start_node(SyntaxKind::BLOCK);
        let is_do = self.at(SyntaxKind::DO_KW);
        self.bump();
        self.skip_trivia();
        self.parse_block_params();
        self.with_no_do_block(false, |p| {
            if is_do {
                p.parse_body(&[SyntaxKind::END_KW, SyntaxKind::RESCUE_KW, SyntaxKind::ENSURE_KW]);
                p.parse_rescue_tail();
                p.expect(SyntaxKind::END_KW);
            } else {
                p.parse_body(&[SyntaxKind::R_BRACE]);
                p.expect(SyntaxKind::R_BRACE);
            }
        });
        self.finish_node();
    }

    fn parse_block_params(&mut self) {
        if self.at(SyntaxKind::PIPE_PIPE) {
            self.start_node(SyntaxKind::BLOCK_PARAMS);
            self.bump();
            self.finish_node();
            return;
        }
        if !self.at(SyntaxKind::PIPE) {
            return;
        }
        self.start_node(SyntaxKind::BLOCK_PARAMS);
        self.bump();
        let saved = std::mem::replace(&mut self.no_pipe, true);
        self.parse_params_until(SyntaxKind::PIPE, true);
        self.no_pipe = saved;
        self.expect(SyntaxKind::PIPE);
        self.finish_node();
    }

    /// Lambda = '->' ParamList? Block
    fn parse_lambda(&mut self) {
        self.start_node(SyntaxKind::LAMBDA_EXPR);
        self.bump();
        self.skip_trivia();
        if self.at(SyntaxKind::L_PAREN) {
            self.start_node(SyntaxKind::PARAM_LIST);
            self.bump();
            self.parse_params_until(SyntaxKind::R_PAREN, true);
            self.expect(SyntaxKind::R_PAREN);
            self.finish_node();
            self.skip_trivia();
        }
        if self.at_any(&[SyntaxKind::L_BRACE, SyntaxKind::DO_KW]) {
            self.parse_block();
        } else {
            self.error("expected lambda body");
        }
        self.finish_node();
    }

    /// Jump = ('next' | 'break' | 'return') Args?
    fn parse_jump(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        if self.at(SyntaxKind::L_PAREN) || self.at_command_arg_start() {
            self.skip_trivia();
            loop {
                let pos_before = self.pos;
                self.parse_arg();
                self.skip_trivia();
                if self.pos == pos_before || !self.at(SyntaxKind::COMMA) {
                    break;
                }
                self.bump();
                self.skip_ws_and_newlines();
            }
        }
        self.finish_node();
    }

    // =========================================================================
    // Grammar rules: definitions
    // =========================================================================

    /// ConstPath = '::'? Constant ('::' Constant)*
    fn parse_const_path_name(&mut self) {
        self.start_node(SyntaxKind::CONST_PATH);
        self.eat(SyntaxKind::COLON_COLON);
        if self.at(SyntaxKind::CONSTANT) {
            self.bump();
            self.parse_const_path_tail();
        } else {
            self.error("expected constant name");
        }
        self.finish_node();
    }

    /// Module = 'module' ConstPath Body 'end'
    fn parse_module(&mut self) {
        self.start_node(SyntaxKind::MODULE_DEF);
        self.bump();
        self.skip_trivia();
        self.parse_const_path_name();
        self.parse_body(&[SyntaxKind::END_KW]);
        self.expect(SyntaxKind::END_KW);
        self.finish_node();
    }

    /// Class = 'class' ConstPath ('<' Expr)? Body 'end'
    ///       | 'class' '<<' Expr Body 'end'
    fn parse_class(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump();
        self.skip_trivia();
        if self.at(SyntaxKind::SHL) {
            self.start_node_at(checkpoint, SyntaxKind::SINGLETON_CLASS);
            self.bump();
            self.skip_trivia();
            self.parse_expr();
        } else {
            self.start_node_at(checkpoint, SyntaxKind::CLASS_DEF);
            self.parse_const_path_name();
            self.skip_trivia();
            if self.at(SyntaxKind::LT) {
                self.start_node(SyntaxKind::SUPERCLASS);
                self.bump();
                self.skip_trivia();
                self.parse_expr();
                self.finish_node();
            }
        }
        self.parse_body(&[SyntaxKind::END_KW]);
        self.expect(SyntaxKind::END_KW);
        self.finish_node();
    }

    /// MethodDef = 'def' ('self' '.')? MethodName ParamList? (Body RescueTail 'end' | '=' Statement)
    fn parse_method_def(&mut self) {
        self.start_node(SyntaxKind::METHOD_DEF);
        self.bump();
        self.skip_trivia();
        if self.at(SyntaxKind::SELF_KW) && self.raw(1) == Some(SyntaxKind::DOT) {
            self.bump();
            self.bump();
        }
        self.parse_method_name();

        if self.at(SyntaxKind::L_PAREN) {
            self.start_node(SyntaxKind::PARAM_LIST);
            self.bump();
            self.parse_params_until(SyntaxKind::R_PAREN, true);
            self.expect(SyntaxKind::R_PAREN);
            self.finish_node();
        } else {
            self.skip_trivia();
            if self.at_any(&[
                SyntaxKind::IDENT,
                SyntaxKind::STAR,
                SyntaxKind::STAR_STAR,
                SyntaxKind::AMP,
            ]) {
                self.start_node(SyntaxKind::PARAM_LIST);
                self.parse_params_until(SyntaxKind::NEWLINE, false);
                self.finish_node();
            }
        }

        self.skip_trivia();
        if self.at(SyntaxKind::EQ) {
            // Endless method: def answer = 42
            self.bump();
            self.skip_ws_and_newlines();
            self.start_node(SyntaxKind::BODY);
            self.parse_statement();
            self.finish_node();
        } else {
            self.parse_body(&[SyntaxKind::END_KW, SyntaxKind::RESCUE_KW, SyntaxKind::ENSURE_KW]);
            self.parse_rescue_tail();
            self.expect(SyntaxKind::END_KW);
        }
        self.finish_node();
    }

    fn parse_method_name(&mut self) {
        use SyntaxKind::*;
        self.start_node(METHOD_NAME);
        match self.raw(0) {
            Some(IDENT | CONSTANT) => {
                self.bump();
                // Setter: def name=(value)
                if self.at(EQ) && self.raw(1) == Some(L_PAREN) {
                    self.bump();
                }
            }
            Some(L_BRACKET) if self.raw(1) == Some(R_BRACKET) => {
                self.bump();
                self.bump();
                if self.at(EQ) && self.raw(1) == Some(L_PAREN) {
                    self.bump();
                }
            }
            Some(kind) if kind.is_keyword() => self.bump_as(IDENT),
            Some(kind) if OPERATOR_METHOD_NAMES.contains(&kind) => self.bump(),
            _ => self.error("expected method name"),
        }
        self.finish_node();
    }

    /// Params = Param (',' Param)* up to `close` (not consumed)
    fn parse_params_until(&mut self, close: SyntaxKind, allow_newlines: bool) {
        loop {
            if allow_newlines {
                self.skip_ws_and_newlines();
            } else {
                self.skip_trivia();
            }
            if self.at_eof() || self.at(close) || self.at(SyntaxKind::SEMICOLON) {
                break;
            }
            let pos_before = self.pos;
            self.parse_param();
            if allow_newlines {
                self.skip_ws_and_newlines();
            } else {
                self.skip_trivia();
            }
            if self.pos == pos_before || !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    }

    /// Param = ('*' | '**' | '&') Ident? | Ident (':' Expr? | '=' Expr)? | '(' Params ')'
    fn parse_param(&mut self) {
        use SyntaxKind::*;
        match self.raw(0) {
            Some(STAR | STAR_STAR | AMP) => {
                self.start_node(PARAM);
                self.bump();
                self.eat(IDENT);
                self.finish_node();
            }
            Some(IDENT) => {
                self.start_node(PARAM);
                self.bump();
                if self.at(COLON) {
                    self.bump();
                    self.skip_trivia();
                    if !self.at_any(&[COMMA, R_PAREN, PIPE, NEWLINE, SEMICOLON]) {
                        self.parse_ternary();
                    }
                } else {
                    self.skip_trivia();
                    if self.at(EQ) {
                        self.bump();
                        self.skip_trivia();
                        self.parse_ternary();
                    }
                }
                self.finish_node();
            }
            Some(L_PAREN) => {
                // Destructuring block parameter: |(a, b)|
                self.start_node(PARAM);
                self.bump();
                self.parse_params_until(R_PAREN, true);
                self.expect(R_PAREN);
                self.finish_node();
            }
            _ => self.error_bump("expected parameter"),
        }
    }

    // =========================================================================
    // Grammar rules: control flow
    // =========================================================================

    /// If = 'if' ExprStmt 'then'? Body ('elsif' ExprStmt 'then'? Body)* ('else' Body)? 'end'
    fn parse_if(&mut self) {
        use SyntaxKind::*;
        self.start_node(IF_EXPR);
        self.bump();
        self.parse_condition();
        self.parse_body(&[ELSIF_KW, ELSE_KW, END_KW]);
        while self.at(ELSIF_KW) {
            self.start_node(ELSIF_CLAUSE);
            self.bump();
            self.parse_condition();
            self.parse_body(&[ELSIF_KW, ELSE_KW, END_KW]);
            self.finish_node();
        }
        self.parse_else_clause(&[END_KW]);
        self.expect(END_KW);
        self.finish_node();
    }

    /// Unless = 'unless' ExprStmt 'then'? Body ('else' Body)? 'end'
    fn parse_unless(&mut self) {
        use SyntaxKind::*;
        self.start_node(UNLESS_EXPR);
        self.bump();
        self.parse_condition();
        self.parse_body(&[ELSE_KW, END_KW]);
        self.parse_else_clause(&[END_KW]);
        self.expect(END_KW);
        self.finish_node();
    }

    fn parse_condition(&mut self) {
        self.skip_trivia();
        self.parse_expr_stmt();
        self.skip_trivia();
        self.eat(SyntaxKind::THEN_KW);
    }

    fn parse_else_clause(&mut self, terminators: &[SyntaxKind]) {
        if self.at(SyntaxKind::ELSE_KW) {
            self.start_node(SyntaxKind::ELSE_CLAUSE);
            self.bump();
            self.parse_body(terminators);
            self.finish_node();
        }
    }

    /// While = ('while' | 'until') ExprStmt 'do'? Body 'end'
    fn parse_while(&mut self) {
        self.start_node(SyntaxKind::WHILE_EXPR);
        self.bump();
        self.skip_trivia();
        self.with_no_do_block(true, |p| p.parse_expr_stmt());
        self.skip_trivia();
        self.eat(SyntaxKind::DO_KW);
        self.with_no_do_block(false, |p| p.parse_body(&[SyntaxKind::END_KW]));
        self.expect(SyntaxKind::END_KW);
        self.finish_node();
    }

    /// Begin = 'begin' Body RescueTail 'end'
    fn parse_begin(&mut self) {
        use SyntaxKind::*;
        self.start_node(BEGIN_EXPR);
        self.bump();
        self.parse_body(&[RESCUE_KW, ELSE_KW, ENSURE_KW, END_KW]);
        self.parse_rescue_tail();
        self.expect(END_KW);
        self.finish_node();
    }

    /// RescueTail = RescueClause* ('else' Body)? ('ensure' Body)?
    fn parse_rescue_tail(&mut self) {
        use SyntaxKind::*;
        while self.at(RESCUE_KW) {
            self.parse_rescue_clause();
        }
        self.parse_else_clause(&[ENSURE_KW, END_KW]);
        if self.at(ENSURE_KW) {
            self.start_node(ENSURE_CLAUSE);
            self.bump();
            self.parse_body(&[END_KW]);
            self.finish_node();
        }
    }

    /// RescueClause = 'rescue' (Expr (',' Expr)*)? ('=>' Name)? 'then'? Body
    fn parse_rescue_clause(&mut self) {
        use SyntaxKind::*;
        self.start_node(RESCUE_CLAUSE);
        self.bump();
        self.skip_trivia();
        while !self.at_eof() && !self.at_any(&[NEWLINE, SEMICOLON, THEN_KW, FAT_ARROW]) {
            let pos_before = self.pos;
            self.parse_ternary();
            self.skip_trivia();
            if self.pos == pos_before || !self.eat(COMMA) {
                break;
            }
            self.skip_ws_and_newlines();
        }
        if self.eat(FAT_ARROW) {
            self.skip_trivia();
            match self.raw(0) {
                Some(IDENT) => {
                    self.start_node(NAME_REF);
                    self.bump();
                    self.finish_node();
                }
                Some(IVAR | CVAR | GVAR) => {
                    self.start_node(VAR_REF);
                    self.bump();
                    self.finish_node();
                }
                _ => self.error("expected exception variable"),
            }
            self.skip_trivia();
        }
        self.eat(THEN_KW);
        self.parse_body(&[RESCUE_KW, ELSE_KW, ENSURE_KW, END_KW]);
        self.finish_node();
    }
}
