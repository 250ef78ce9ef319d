//! davc-par - the recursive-descent parser and the single-pass code
//! generator fused into it (`spec.md` §4.4-§4.10).
//!
//! The original bootstrap compiler keeps `parser_pos`, `current_fn_ret_type`
//! and `expr_type` as module-level globals shared by every parse function.
//! `SPEC_FULL.md` §9's first Design Note re-architects that into an owning
//! context: [`Parser`] holds the token cursor, the symbol table and the
//! emitter as fields, and every grammar-level function is a method on it.
//! `expr_type` disappears entirely - every expression-parsing method simply
//! *returns* the `Type` of what it just emitted.

mod expr;
mod items;
mod stmt;

use davc_lex::{Token, TokenKind};
use davc_sem::{SymbolTable, Type};
use davc_util::{Arena, Handler, Level};

/// Owns everything a single compilation needs after lexing: the token
/// stream, the two-scope symbol table, and the output buffer.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    arena: &'a Arena,
    handler: &'a mut Handler,
    sem: SymbolTable,
    emitter: davc_emit::Emitter,
    /// The enclosing function's declared return type, consulted by
    /// `return_stmt` (`spec.md` §4.10). `Type::Void` at global scope, where
    /// no `return` is legal.
    current_fn_ret_type: Type,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, arena: &'a Arena, handler: &'a mut Handler) -> Self {
        assert!(!tokens.is_empty(), "token stream must end in EOF");
        Self {
            tokens,
            pos: 0,
            arena,
            handler,
            sem: SymbolTable::new(),
            emitter: davc_emit::Emitter::new(),
            current_fn_ret_type: Type::Void,
        }
    }

    /// Parses the whole program, emitting translated C as it goes.
    pub fn parse_program(&mut self) {
        tracing::debug!(tokens = self.tokens.len(), "parsing");
        while !self.at(TokenKind::Eof) {
            self.global_decl();
        }
    }

    /// Consumes the parser and returns the C text emitted for the globals
    /// the caller asked it to translate. The driver wraps this with
    /// includes, prototypes and the runtime helper definitions.
    pub fn into_output(self) -> String {
        self.emitter.into_inner()
    }

    /// Number of symbols bound in global scope, for `--strict-limits`
    /// (`SPEC_FULL.md` §5).
    pub fn global_symbol_count(&self) -> usize {
        self.sem.global_len()
    }

    /// Bytes of C emitted so far, for `--strict-limits`.
    pub fn output_len(&self) -> usize {
        self.emitter.len()
    }

    // -- token stream -----------------------------------------------------

    fn cur(&self) -> Token {
        self.tokens[self.pos]
    }

    fn kind(&self) -> TokenKind {
        self.cur().kind
    }

    fn at(&self, k: TokenKind) -> bool {
        self.kind() == k
    }

    fn at_any(&self, ks: &[TokenKind]) -> bool {
        ks.contains(&self.kind())
    }

    /// Resolves a value-carrying token's lexeme text.
    fn text(&self, tok: Token) -> &'a str {
        self.arena.resolve(tok.value.expect("token carries no lexeme"))
    }

    /// Consumes and returns the current token. Saturates at `EOF`: once the
    /// cursor reaches the end there is nothing further to consume, so
    /// repeated calls keep returning the same `EOF` token rather than
    /// reading past the stream (the original bootstrap compiler's `next()`
    /// has no such bound, which is a latent out-of-bounds read on
    /// catastrophically malformed input - `spec.md` §8's termination
    /// property rules that out here).
    fn advance(&mut self) -> Token {
        let tok = self.cur();
        if !self.at(TokenKind::Eof) {
            self.pos += 1;
        }
        tok
    }

    /// Consumes the current token if it has kind `k`, otherwise reports a
    /// syntax diagnostic and leaves the cursor where it was (matching the
    /// original `expect()`, which also does not consume on mismatch).
    fn expect(&mut self, k: TokenKind) -> Option<Token> {
        if self.at(k) {
            Some(self.advance())
        } else {
            let tok = self.cur();
            self.err_syntax(
                format!(
                    "expected token: {} but got token: {}",
                    k.label(),
                    tok.kind.label()
                ),
                tok,
            );
            None
        }
    }

    fn err_syntax(&mut self, message: impl Into<String>, at: Token) {
        self.handler.report(Level::Syntax, message, at.line, at.col);
    }

    fn err_semantic(&mut self, message: impl Into<String>, at: Token) {
        self.handler.report(Level::Semantic, message, at.line, at.col);
    }

    /// True once the cursor is sitting on `EOF`; the caller-side escape
    /// hatch every "parse a list until the closing delimiter" loop uses so
    /// a missing delimiter cannot spin forever (`spec.md` §8).
    fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }
}
