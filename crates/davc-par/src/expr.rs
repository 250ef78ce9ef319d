//! The expression grammar (`spec.md` §4.9): `expr -> logical -> relational
//! -> additive -> multiplicative -> unary -> atom`, each level a method on
//! [`Parser`] grounded directly on the same-named function in the original
//! bootstrap compiler.
//!
//! `relational` and `additive` are the two levels that need to know an
//! operand's C text *before* deciding what to wrap it in (`char* == char*`
//! becomes `strcmp(l, r) == 0`, not `l == r`). They use [`Parser::peek_level`]
//! to get a level's text without committing it, build up the composed text
//! as an owned `String` across the whole left-associative chain, and emit
//! once at the end. `logical`, `multiplicative` and `unary` never need to
//! rewrite what they parse, so they emit directly, the same as the original.

use davc_lex::TokenKind;
use davc_sem::Type;

use crate::Parser;

impl<'a> Parser<'a> {
    /// Runs `f` (one of the grammar-level methods) without committing
    /// anything it emits, returning the text it would have emitted plus its
    /// `Type`. This is `peek_code(level)` from `spec.md` §4.3, worked from
    /// the parser's side of the contract instead of the emitter's: `f`
    /// needs the full parser (to consume tokens, look up symbols, report
    /// diagnostics), not just the output buffer, so the mark/run/rewind
    /// dance lives here rather than going through `Emitter::peek`.
    pub(crate) fn peek_level(&mut self, f: impl FnOnce(&mut Self) -> Type) -> (String, Type) {
        let start = self.emitter.mark();
        let ty = f(self);
        let end = self.emitter.mark();
        let text = self.emitter.slice(start, end).to_string();
        self.emitter.rewind(start);
        (text, ty)
    }

    /// `expr -> logical` (`spec.md` §4.9). `expr` itself does no work of
    /// its own; it exists as the grammar's named entry point.
    pub(crate) fn expr(&mut self) -> Type {
        self.logical()
    }

    /// `logical -> relational ( ("&&" | "||") relational )*`. Both operands
    /// of `&&`/`||` must be `int`; the result is always `int`.
    fn logical(&mut self) -> Type {
        let mut ty = self.relational();
        while self.at_any(&[TokenKind::And, TokenKind::Or]) {
            let op_tok = self.advance();
            let op = if op_tok.kind == TokenKind::And { "&&" } else { "||" };
            self.emitter.emit(" ");
            self.emitter.emit(op);
            self.emitter.emit(" ");
            let right_ty = self.relational();
            if ty != Type::Int || right_ty != Type::Int {
                self.err_semantic(
                    format!("operator '{op}' requires int operands, got '{ty}' and '{right_ty}'"),
                    op_tok,
                );
                return right_ty;
            }
            ty = Type::Int;
        }
        ty
    }

    /// `relational -> additive ( ("==" | "!=" | "<" | ">" | "<=" | ">=") additive )*`.
    /// String comparison is rewritten through `strcmp` (`spec.md` §4.9).
    fn relational(&mut self) -> Type {
        let (mut text, mut ty) = self.peek_level(Self::additive);
        while self.at_relop() {
            let op_tok = self.advance();
            let op = relop_symbol(op_tok.kind);
            let (right_text, right_ty) = self.peek_level(Self::additive);
            let (new_text, new_ty) =
                self.combine_relational(&text, ty, op, &right_text, right_ty, op_tok.line, op_tok.col);
            text = new_text;
            ty = new_ty;
        }
        self.emitter.emit(&text);
        ty
    }

    fn at_relop(&self) -> bool {
        self.at_any(&[
            TokenKind::Eq,
            TokenKind::Ne,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Le,
            TokenKind::Ge,
        ])
    }

    fn combine_relational(
        &mut self,
        left: &str,
        left_ty: Type,
        op: &str,
        right: &str,
        right_ty: Type,
        line: u32,
        col: u32,
    ) -> (String, Type) {
        use Type::*;
        match (left_ty, right_ty) {
            (CharPtr, CharPtr) => match op {
                "==" => (format!("strcmp({left}, {right}) == 0"), Int),
                "!=" => (format!("strcmp({left}, {right}) != 0"), Int),
                _ => {
                    self.handler.report(
                        davc_util::Level::Semantic,
                        format!("operator '{op}' is not allowed on strings, only '==' and '!='"),
                        line,
                        col,
                    );
                    (format!("{left} {op} {right}"), Int)
                }
            },
            (CharPtr, Int) | (Int, CharPtr) if op == "==" || op == "!=" => {
                (format!("{left} {op} {right}"), Int)
            }
            (CharPtr, _) | (_, CharPtr) => {
                self.handler.report(
                    davc_util::Level::Semantic,
                    format!("cannot compare a string and a '{}' with '{op}'",
                        if left_ty == CharPtr { right_ty } else { left_ty }),
                    line,
                    col,
                );
                (format!("{left} {op} {right}"), Int)
            }
            _ => (format!("{left} {op} {right}"), Int),
        }
    }

    /// `additive -> multiplicative ( ("+" | "-") multiplicative )*`.
    /// `char* + char*` becomes `concat(...)`; pointer +/- int keeps the
    /// pointer's type; int + pointer is allowed (commutative `+` only).
    fn additive(&mut self) -> Type {
        let (mut text, mut ty) = self.peek_level(Self::multiplicative);
        while self.at_any(&[TokenKind::Plus, TokenKind::Minus]) {
            let op_tok = self.advance();
            let op = if op_tok.kind == TokenKind::Plus { "+" } else { "-" };
            let (right_text, right_ty) = self.peek_level(Self::multiplicative);
            let (new_text, new_ty) =
                self.combine_additive(&text, ty, op, &right_text, right_ty, op_tok.line, op_tok.col);
            text = new_text;
            ty = new_ty;
        }
        self.emitter.emit(&text);
        ty
    }

    fn combine_additive(
        &mut self,
        left: &str,
        left_ty: Type,
        op: &str,
        right: &str,
        right_ty: Type,
        line: u32,
        col: u32,
    ) -> (String, Type) {
        use Type::*;
        match (left_ty, right_ty) {
            (Int, Int) => (format!("{left} {op} {right}"), Int),
            (CharPtr, CharPtr) if op == "+" => (format!("concat({left}, {right})"), CharPtr),
            (l, Int) if l.is_pointer() => (format!("{left} {op} {right}"), l),
            (Int, r) if r.is_pointer() && op == "+" => (format!("{left}{op}{right}"), r),
            (Int, r) if r.is_pointer() => {
                self.handler.report(
                    davc_util::Level::Semantic,
                    "cannot subtract a pointer from an int".to_string(),
                    line,
                    col,
                );
                (format!("{left} {op} {right}"), Int)
            }
            _ => {
                self.handler.report(
                    davc_util::Level::Semantic,
                    format!("operator '{op}' is not allowed between '{left_ty}' and '{right_ty}'"),
                    line,
                    col,
                );
                (format!("{left} {op} {right}"), Int)
            }
        }
    }

    /// `multiplicative -> unary ( ("*" | "/") unary )*`. Both operands must
    /// be `int`.
    fn multiplicative(&mut self) -> Type {
        let mut ty = self.unary();
        while self.at_any(&[TokenKind::Mul, TokenKind::Div]) {
            let op_tok = self.advance();
            let op = if op_tok.kind == TokenKind::Mul { "*" } else { "/" };
            self.emitter.emit(" ");
            self.emitter.emit(op);
            self.emitter.emit(" ");
            let right_ty = self.unary();
            if ty != Type::Int || right_ty != Type::Int {
                self.err_semantic(
                    format!("operator '{op}' requires int operands, got '{ty}' and '{right_ty}'"),
                    op_tok,
                );
                return right_ty;
            }
            ty = Type::Int;
        }
        ty
    }

    /// `unary -> "-" unary | atom`. Only `int` can be negated.
    fn unary(&mut self) -> Type {
        if self.at(TokenKind::Minus) {
            let op_tok = self.advance();
            self.emitter.emit("-");
            let ty = self.unary();
            if ty != Type::Int {
                self.err_semantic(format!("cannot negate a '{ty}'"), op_tok);
                return ty;
            }
            return Type::Int;
        }
        self.atom()
    }

    /// `atom -> NUMBER | STRING | CHAR | "(" expr ")" | ID (call | index)?`.
    ///
    /// Unconditionally consumes one token up front, matching the original:
    /// this is what guarantees every expression-parsing loop (call
    /// argument lists, in particular) makes forward progress even when the
    /// token it lands on is not a valid atom start.
    fn atom(&mut self) -> Type {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Number => {
                self.emitter.emit(self.text(tok));
                Type::Int
            }
            TokenKind::Char => {
                let ch = self.text(tok);
                self.emitter.emit(&format!("'{ch}'"));
                Type::Char
            }
            TokenKind::String => {
                let s = self.text(tok);
                self.emitter.emit(&format!("\"{s}\""));
                Type::CharPtr
            }
            TokenKind::LParen => {
                let ty = self.expr();
                self.expect(TokenKind::RParen);
                ty
            }
            TokenKind::Id => self.atom_id(tok),
            _ => {
                self.err_syntax(format!("unexpected token in expression: {}", tok.kind.label()), tok);
                Type::Undefined
            }
        }
    }

    fn atom_id(&mut self, tok: davc_lex::Token) -> Type {
        let name = self.text(tok).to_string();
        let sym_ty = match self.sem.lookup(&name) {
            Some(ty) => ty,
            None => {
                self.err_semantic(format!("undeclared identifier '{name}'"), tok);
                Type::Undefined
            }
        };

        if self.at(TokenKind::LParen) {
            return self.call_args(&name, tok, sym_ty);
        }

        if self.at(TokenKind::LSquare) {
            self.advance();
            if !sym_ty.is_pointer() {
                self.err_semantic(format!("'{name}' is not indexable (has type '{sym_ty}')"), tok);
            }
            self.emitter.emit(&name);
            self.emitter.emit("[");
            let idx_ty = self.expr();
            if idx_ty != Type::Int {
                self.err_semantic(format!("index must be int, got '{idx_ty}'"), tok);
            }
            self.expect(TokenKind::RSquare);
            self.emitter.emit("]");
            return sym_ty.pointee();
        }

        self.emitter.emit(&name);
        sym_ty
    }

    /// Parses `"(" [ expr { "," expr } ] ")"` for a call starting at `name`,
    /// emitting `name(args...)` and checking arity/argument types against
    /// `name`'s recorded signature. Shared by an expression-position call
    /// ([`Parser::atom_id`]) and a call used as a whole statement
    /// ([`Parser::call_stmt`] in `stmt.rs`), which needs the same argument
    /// parsing but stops at the closing `)` rather than feeding it onward
    /// into the expression precedence chain.
    pub(crate) fn call_args(&mut self, name: &str, tok: davc_lex::Token, sym_ty: Type) -> Type {
        self.advance(); // LPAREN
        let sig = self.sem.fn_sig(name).cloned();
        if sig.is_none() {
            self.err_semantic(format!("'{name}' is called but is not a function"), tok);
        }

        self.emitter.emit(name);
        self.emitter.emit("(");
        let mut arg_types = Vec::new();
        let mut first = true;
        while !self.at(TokenKind::RParen) && !self.at_eof() {
            if !first {
                self.expect(TokenKind::Comma);
                self.emitter.emit(", ");
            }
            first = false;
            arg_types.push(self.expr());
        }
        self.expect(TokenKind::RParen);
        self.emitter.emit(")");

        if let Some(sig) = &sig {
            if sig.params.len() != arg_types.len() {
                self.err_semantic(
                    format!(
                        "'{name}' expects {} argument(s), got {}",
                        sig.params.len(),
                        arg_types.len()
                    ),
                    tok,
                );
            } else {
                for (i, (expected, actual)) in sig.params.iter().zip(arg_types.iter()).enumerate() {
                    if expected != actual {
                        self.err_semantic(
                            format!(
                                "argument {} to '{name}' has type '{actual}', expected '{expected}'",
                                i + 1
                            ),
                            tok,
                        );
                    }
                }
            }
        }

        sym_ty
    }
}

fn relop_symbol(k: TokenKind) -> &'static str {
    match k {
        TokenKind::Eq => "==",
        TokenKind::Ne => "!=",
        TokenKind::Lt => "<",
        TokenKind::Gt => ">",
        TokenKind::Le => "<=",
        TokenKind::Ge => ">=",
        _ => unreachable!("at_relop already filtered to relational operators"),
    }
}

#[cfg(test)]
mod tests {
    use davc_lex::Lexer;
    use davc_sem::Type;
    use davc_util::{Arena, Handler};

    use crate::Parser;

    fn parse_expr(src: &str) -> (String, Type, usize) {
        let mut arena = Arena::new();
        let mut handler = Handler::new();
        let tokens = {
            let lexer = Lexer::new(src, &mut arena, &mut handler);
            lexer.tokenize().expect("lexing should succeed")
        };
        let mut parser = Parser::new(tokens, &arena, &mut handler);
        parser.sem.add_symbol(true, "x", Type::Int);
        parser.sem.add_symbol(true, "s", Type::CharPtr);
        parser.sem.add_symbol(true, "t", Type::CharPtr);
        parser.sem.add_symbol(true, "p", Type::IntPtr);
        parser.sem.add_symbol(true, "n", Type::Int);
        let ty = parser.expr();
        let errs = handler.count();
        (parser.into_output(), ty, errs)
    }

    #[test]
    fn arithmetic_keeps_int() {
        let (out, ty, errs) = parse_expr("1 + 2 * 3");
        assert_eq!(out, "1 + 2 * 3");
        assert_eq!(ty, Type::Int);
        assert_eq!(errs, 0);
    }

    #[test]
    fn string_equality_becomes_strcmp() {
        let (out, ty, errs) = parse_expr("s == t");
        assert_eq!(out, "strcmp(s, t) == 0");
        assert_eq!(ty, Type::Int);
        assert_eq!(errs, 0);
    }

    #[test]
    fn string_inequality_becomes_strcmp_ne() {
        let (out, ty, errs) = parse_expr("s != t");
        assert_eq!(out, "strcmp(s, t) != 0");
        assert_eq!(ty, Type::Int);
        assert_eq!(errs, 0);
    }

    #[test]
    fn string_concatenation_becomes_concat() {
        let (out, ty, errs) = parse_expr("s + t");
        assert_eq!(out, "concat(s, t)");
        assert_eq!(ty, Type::CharPtr);
        assert_eq!(errs, 0);
    }

    #[test]
    fn pointer_plus_int_keeps_pointer_type() {
        let (out, ty, errs) = parse_expr("p + 1");
        assert_eq!(out, "p + 1");
        assert_eq!(ty, Type::IntPtr);
        assert_eq!(errs, 0);
    }

    #[test]
    fn string_relational_gt_is_an_error() {
        let (_out, _ty, errs) = parse_expr("s > t");
        assert_eq!(errs, 1);
    }

    #[test]
    fn string_vs_int_equality_is_a_null_pointer_test() {
        let (out, ty, errs) = parse_expr("s == n");
        assert_eq!(out, "s == n");
        assert_eq!(ty, Type::Int);
        assert_eq!(errs, 0);
    }

    #[test]
    fn string_vs_int_relational_other_than_eq_ne_is_an_error() {
        let (_out, _ty, errs) = parse_expr("s < n");
        assert_eq!(errs, 1);
    }

    #[test]
    fn peek_does_not_leak_partial_text_on_a_single_operand() {
        let (out, ty, errs) = parse_expr("(1 + 2)");
        assert_eq!(out, "1 + 2");
        assert_eq!(ty, Type::Int);
        assert_eq!(errs, 0);
    }

    #[test]
    fn undeclared_identifier_is_reported_but_parsing_continues() {
        let (_out, ty, errs) = parse_expr("y");
        assert_eq!(ty, Type::Undefined);
        assert_eq!(errs, 1);
    }
}
