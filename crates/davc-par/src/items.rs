//! Top-level items: global `let`s and function declarations/definitions
//! (`spec.md` §4.5).

use davc_lex::TokenKind;
use davc_sem::{FnSig, Type};

use crate::Parser;

impl<'a> Parser<'a> {
    /// One top-level item. An unrecognized leading token is reported and
    /// then consumed on its own, guaranteeing the top-level loop in
    /// [`Parser::parse_program`] always makes progress (`spec.md` §8).
    pub(crate) fn global_decl(&mut self) {
        match self.kind() {
            TokenKind::Fn => self.fn_decl(),
            TokenKind::Let => self.let_stmt(true),
            _ => {
                let tok = self.cur();
                self.err_syntax(
                    format!("unexpected token at top level: {}", tok.kind.label()),
                    tok,
                );
                self.advance();
            }
        }
    }

    /// Parses an optional `[TYPE] [MUL]` (`spec.md` §4.4: `fn_decl`'s return
    /// type and `param` both take this shape, `TYPE` entirely absent is
    /// legal). At most one `*` promotes the type one pointer level
    /// following the table in §4.5 (`int -> int*`, `char -> char*`,
    /// `char* -> char**`); promoting anything else (`int*`, `char**`,
    /// `void`) is a semantic error, though the offending `*` is still
    /// consumed so the cursor keeps moving. Returns `None` when no `TYPE`
    /// token was present at all.
    pub(crate) fn parse_type_opt(&mut self) -> Option<Type> {
        if !self.at(TokenKind::Type) {
            return None;
        }
        let tok = self.advance();
        let mut ty = Type::from_type_word(self.text(tok)).unwrap_or(Type::Void);
        if self.at(TokenKind::Mul) {
            let star_tok = self.advance();
            match ty.promote_pointer() {
                Ok(promoted) => ty = promoted,
                Err(bad) => {
                    self.err_semantic(format!("cannot make a pointer to '{bad}'"), star_tok);
                }
            }
        }
        Some(ty)
    }

    /// `ah TYPE ID "(" params ")" (";" | "{" statement* "}")`.
    ///
    /// A trailing `;` is a prototype: it registers the signature (so later
    /// calls type-check) but emits nothing and never touches local scope.
    /// A body clears local scope, binds each parameter, and translates
    /// each statement in turn.
    fn fn_decl(&mut self) {
        self.advance(); // FN
        let ret_ty = self.parse_type_opt().unwrap_or(Type::Void);
        let Some(name_tok) = self.expect(TokenKind::Id) else {
            return;
        };
        let name = self.text(name_tok).to_string();

        if self.sem.is_defined_in_scope(true, &name) {
            self.err_semantic(format!("redefinition of '{name}'"), name_tok);
        } else {
            self.sem.add_symbol(true, &name, ret_ty);
        }

        self.expect(TokenKind::LParen);
        self.sem.clear_local();

        let mut params = Vec::new();
        let mut first = true;
        while !self.at(TokenKind::RParen) && !self.at_eof() {
            if !first {
                self.expect(TokenKind::Comma);
            }
            first = false;

            let p_ty_tok = self.cur();
            let mut pty = self.parse_type_opt().unwrap_or_else(|| {
                self.err_semantic("parameter requires an explicit type", p_ty_tok);
                Type::Int
            });
            let Some(p_tok) = self.expect(TokenKind::Id) else {
                break;
            };
            let pname = self.text(p_tok).to_string();

            if self.at(TokenKind::LSquare) {
                self.advance();
                if self.at(TokenKind::Number) {
                    self.advance(); // array size is irrelevant to a decayed parameter type
                }
                self.expect(TokenKind::RSquare);
                match pty.promote_pointer() {
                    Ok(promoted) => pty = promoted,
                    Err(bad) => self.err_semantic(format!("cannot make an array of '{bad}'"), p_tok),
                }
            }

            if self.sem.is_defined_in_scope(false, &pname) {
                self.err_semantic(format!("redefinition of parameter '{pname}'"), p_tok);
            } else {
                self.sem.add_symbol(false, &pname, pty);
            }
            params.push((pname, pty));
        }
        self.expect(TokenKind::RParen);

        self.sem.add_fn_sig(
            &name,
            FnSig {
                params: params.iter().map(|(_, ty)| *ty).collect(),
                ret: ret_ty,
            },
        );

        self.emitter.emit(&format!("{ret_ty} {name}("));
        for (i, (pname, pty)) in params.iter().enumerate() {
            if i > 0 {
                self.emitter.emit(", ");
            }
            self.emitter.emit(&format!("{pty} {pname}"));
        }
        self.emitter.emit(")");

        if self.at(TokenKind::Semicol) {
            self.advance();
            self.emitter.emit(";\n");
            return;
        }

        let prev_ret_ty = self.current_fn_ret_type;
        self.current_fn_ret_type = ret_ty;

        self.emitter.emit(" {\n");
        self.block();
        self.emitter.emit("}\n");

        self.current_fn_ret_type = prev_ret_ty;
    }
}

#[cfg(test)]
mod tests {
    use davc_lex::Lexer;
    use davc_util::{Arena, Handler};

    use crate::Parser;

    fn compile(src: &str) -> (String, usize) {
        let mut arena = Arena::new();
        let mut handler = Handler::new();
        let tokens = {
            let lexer = Lexer::new(src, &mut arena, &mut handler);
            lexer.tokenize().expect("lexing should succeed")
        };
        let mut parser = Parser::new(tokens, &arena, &mut handler);
        parser.parse_program();
        (parser.into_output(), handler.count())
    }

    #[test]
    fn a_function_with_a_parameter_and_a_return_translates_cleanly() {
        let (out, errs) = compile("ah int square(int x) { return x * x; }");
        assert_eq!(errs, 0);
        assert!(out.contains("int square(int x) {"));
        assert!(out.contains("return x * x;"));
    }

    #[test]
    fn a_prototype_emits_a_forward_declaration_and_registers_the_signature() {
        let (out, errs) = compile(
            "ah int add(int a, int b);\nah int main() { return add(1, 2); }",
        );
        assert_eq!(errs, 0);
        assert!(out.contains("int add(int a, int b);"));
        assert!(!out.contains("int add(int a, int b) {"));
        assert!(out.contains("add(1, 2)"));
    }

    #[test]
    fn calling_a_function_with_the_wrong_argument_count_is_an_error() {
        let (_out, errs) = compile("ah int add(int a, int b) { return a + b; }\nah int main() { return add(1); }");
        assert_eq!(errs, 1);
    }

    #[test]
    fn calling_a_function_with_the_wrong_argument_type_is_an_error() {
        let (_out, errs) = compile(
            "ah int add(int a, int b) { return a + b; }\nah int main() { return add(1, \"x\"); }",
        );
        assert_eq!(errs, 1);
    }

    #[test]
    fn redefining_a_function_is_rejected() {
        let (_out, errs) = compile("ah int f() { return 1; } ah int f() { return 2; }");
        assert!(errs >= 1);
    }

    #[test]
    fn a_function_with_no_return_type_word_defaults_to_void() {
        let (out, errs) = compile("ah greet() { return concat(\"hi\", \"\\n\"); }");
        assert_eq!(errs, 1, "declared void but returns a char*");
        assert!(out.contains("void greet() {"));
    }

    #[test]
    fn array_parameter_decays_to_a_pointer() {
        let (out, errs) = compile("ah int first(int x[]) { return x[0]; }");
        assert_eq!(errs, 0);
        assert!(out.contains("int first(int* x) {"));
        assert!(out.contains("x[0]"));
    }

    #[test]
    fn unexpected_top_level_token_is_reported_and_skipped() {
        let (_out, errs) = compile("} ah int f() { return 1; }");
        assert_eq!(errs, 1);
    }
}
