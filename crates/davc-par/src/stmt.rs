//! Statements inside a function body (`spec.md` §4.6-§4.8, §4.10): `let`,
//! `print`, `if`/`else`, `while`, `return`, and the four `id`-led forms
//! (plain assignment, indexed assignment, call statement).

use davc_lex::TokenKind;
use davc_sem::Type;

use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn statement(&mut self) {
        match self.kind() {
            TokenKind::Let => self.let_stmt(false),
            TokenKind::Print => self.print_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Id => self.id_stmt(),
            _ => {
                let tok = self.cur();
                self.err_syntax(
                    format!("unexpected token in statement: {}", tok.kind.label()),
                    tok,
                );
                self.advance();
            }
        }
    }

    /// `beg [TYPE] [MUL] ID (...)` has three shapes, picked by the token
    /// after the name (`spec.md` §4.6): an initializer (`ASSIGN`), a
    /// fixed-size array declaration (`LSQUARE NUMBER RSQUARE`), or a plain
    /// declaration (`SEMICOL`). Only the initializer shape may omit the
    /// type, inferring it from the initializer; the array and plain shapes
    /// require it explicitly.
    pub(crate) fn let_stmt(&mut self, is_global: bool) {
        self.advance(); // LET
        let declared_ty = self.parse_type_opt();
        let Some(name_tok) = self.expect(TokenKind::Id) else {
            return;
        };
        let name = self.text(name_tok).to_string();

        match self.kind() {
            TokenKind::Assign => {
                self.advance();
                let (expr_text, expr_ty) = self.peek_level(Self::expr);
                let final_ty = match declared_ty {
                    None => {
                        if expr_ty == Type::Undefined || expr_ty == Type::Void {
                            self.err_semantic(
                                format!(
                                    "cannot infer a type for '{name}' from a '{expr_ty}' expression"
                                ),
                                name_tok,
                            );
                            Type::Int
                        } else {
                            expr_ty
                        }
                    }
                    Some(declared) => {
                        if expr_ty != declared {
                            self.err_semantic(
                                format!(
                                    "cannot initialize '{name}' of type '{declared}' with a '{expr_ty}'"
                                ),
                                name_tok,
                            );
                        }
                        declared
                    }
                };
                self.expect(TokenKind::Semicol);
                self.declare(is_global, &name, final_ty, name_tok);
                self.emitter
                    .emit(&format!("{final_ty} {name} = {expr_text};"));
            }
            TokenKind::LSquare => {
                self.advance();
                let size_tok = self.expect(TokenKind::Number);
                self.expect(TokenKind::RSquare);
                self.expect(TokenKind::Semicol);
                let base_ty = declared_ty.unwrap_or_else(|| {
                    self.err_semantic("array declaration requires an explicit type", name_tok);
                    Type::Int
                });
                let elem_ty = match base_ty.promote_pointer() {
                    Ok(promoted) => promoted,
                    Err(bad) => {
                        self.err_semantic(format!("cannot make an array of '{bad}'"), name_tok);
                        base_ty
                    }
                };
                self.declare(is_global, &name, elem_ty, name_tok);
                let size = size_tok.map(|t| self.text(t)).unwrap_or("0");
                self.emitter.emit(&format!("{base_ty} {name}[{size}];"));
            }
            TokenKind::Semicol => {
                self.advance();
                let ty = declared_ty.unwrap_or_else(|| {
                    self.err_semantic("declaration requires an explicit type", name_tok);
                    Type::Int
                });
                self.declare(is_global, &name, ty, name_tok);
                self.emitter.emit(&format!("{ty} {name};"));
            }
            _ => {
                let tok = self.cur();
                self.err_syntax(
                    format!("expected '=', '[' or ';' after 'beg {name}'"),
                    tok,
                );
                self.advance();
            }
        }
    }

    fn declare(&mut self, is_global: bool, name: &str, ty: Type, at: davc_lex::Token) {
        if self.sem.is_defined_in_scope(is_global, name) {
            self.err_semantic(format!("redefinition of '{name}'"), at);
            return;
        }
        self.sem.add_symbol(is_global, name, ty);
    }

    /// `boo(expr);` - the format specifier is chosen from the expression's
    /// type (`spec.md` §4.8).
    fn print_stmt(&mut self) {
        let tok = self.advance(); // PRINT
        self.expect(TokenKind::LParen);
        let (text, ty) = self.peek_level(Self::expr);
        let fmt = match ty {
            Type::Int => "%d",
            Type::Char => "%c",
            Type::CharPtr => "%s",
            other => {
                self.err_semantic(format!("cannot print a value of type '{other}'"), tok);
                "%d"
            }
        };
        self.expect(TokenKind::RParen);
        self.expect(TokenKind::Semicol);
        self.emitter
            .emit(&format!("printf(\"{fmt}\\n\", {text});"));
    }

    /// `if` and `while` conditions are bare expressions at the source
    /// level - not parenthesized - even though the emitted C always wraps
    /// them in `(...)` (`spec.md` §4.4's note, §4.10).
    fn if_stmt(&mut self) {
        let if_tok = self.advance(); // IF
        self.emitter.emit("if (");
        let cond_ty = self.expr();
        if cond_ty != Type::Int {
            self.err_semantic(format!("if condition must be int, got '{cond_ty}'"), if_tok);
        }
        self.emitter.emit(") {\n");
        self.block();
        self.emitter.emit("}\n");

        if self.at(TokenKind::Else) {
            self.advance();
            if self.at(TokenKind::If) {
                self.emitter.emit("else ");
                self.if_stmt();
            } else {
                self.emitter.emit("else {\n");
                self.block();
                self.emitter.emit("}\n");
            }
        }
    }

    fn while_stmt(&mut self) {
        let while_tok = self.advance(); // WHILE
        self.emitter.emit("while (");
        let cond_ty = self.expr();
        if cond_ty != Type::Int {
            self.err_semantic(
                format!("while condition must be int, got '{cond_ty}'"),
                while_tok,
            );
        }
        self.emitter.emit(") {\n");
        self.block();
        self.emitter.emit("}\n");
    }

    /// Parses a `{ statement* }` block, already inside the emitted braces.
    pub(crate) fn block(&mut self) {
        self.expect(TokenKind::LBrace);
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            self.statement();
            self.emitter.emit("\n");
        }
        self.expect(TokenKind::RBrace);
    }

    /// `return expr;` - the expression is mandatory regardless of the
    /// enclosing function's return type (`spec.md` §4.4, §4.10); its type
    /// must equal `current_fn_ret_type`.
    fn return_stmt(&mut self) {
        let tok = self.advance(); // RETURN
        let (text, ty) = self.peek_level(Self::expr);
        if ty != self.current_fn_ret_type {
            self.err_semantic(
                format!(
                    "cannot return a '{ty}' from a function declared to return '{}'",
                    self.current_fn_ret_type
                ),
                tok,
            );
        }
        self.expect(TokenKind::Semicol);
        self.emitter.emit(&format!("return {text};"));
    }

    fn peek_next_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Dispatches the three `ID`-led statement forms (`spec.md` §4.7):
    /// plain assignment, indexed assignment, and a call used as a
    /// statement. The lexer never produces a standalone expression
    /// statement that starts with `ID` and isn't one of these three, so an
    /// unrecognized continuation is always a syntax error.
    fn id_stmt(&mut self) {
        let tok = self.cur();
        match self.peek_next_kind() {
            TokenKind::Assign => self.assign_stmt(),
            TokenKind::LSquare => self.indexed_assign_stmt(),
            TokenKind::LParen => self.call_stmt(),
            _ => {
                self.err_syntax(
                    "expected an assignment or a function call".to_string(),
                    tok,
                );
                self.advance();
            }
        }
    }

    fn assign_stmt(&mut self) {
        let tok = self.advance(); // ID
        let name = self.text(tok).to_string();
        let sym_ty = self.sem.lookup(&name);
        if sym_ty.is_none() {
            self.err_semantic(format!("undeclared identifier '{name}'"), tok);
        }
        self.expect(TokenKind::Assign);
        self.emitter.emit(&name);
        self.emitter.emit(" = ");
        let expr_ty = self.expr();
        if let Some(ty) = sym_ty {
            if ty != expr_ty {
                self.err_semantic(
                    format!("cannot assign a '{expr_ty}' to '{name}' of type '{ty}'"),
                    tok,
                );
            }
        }
        self.expect(TokenKind::Semicol);
        self.emitter.emit(";");
    }

    fn indexed_assign_stmt(&mut self) {
        let tok = self.advance(); // ID
        let name = self.text(tok).to_string();
        let sym_ty = self.sem.lookup(&name);
        if let Some(ty) = sym_ty {
            if !ty.is_pointer() {
                self.err_semantic(format!("'{name}' is not indexable (has type '{ty}')"), tok);
            }
        } else {
            self.err_semantic(format!("undeclared identifier '{name}'"), tok);
        }

        self.expect(TokenKind::LSquare);
        self.emitter.emit(&name);
        self.emitter.emit("[");
        let idx_ty = self.expr();
        if idx_ty != Type::Int {
            self.err_semantic(format!("index must be int, got '{idx_ty}'"), tok);
        }
        self.expect(TokenKind::RSquare);
        self.emitter.emit("]");
        self.expect(TokenKind::Assign);
        self.emitter.emit(" = ");
        let value_ty = self.expr();
        let expected = sym_ty.map(Type::pointee).unwrap_or(Type::Undefined);
        if sym_ty.is_some() && value_ty != expected {
            self.err_semantic(
                format!("cannot assign a '{value_ty}' through a '{expected}' element"),
                tok,
            );
        }
        self.expect(TokenKind::Semicol);
        self.emitter.emit(";");
    }

    /// `ID "(" [ expr { "," expr } ] ")" ";"` - a call used as a whole
    /// statement. Stops at the call's closing `)`; unlike an expression-
    /// position call, nothing may follow but `;` (`spec.md`'s `id_stmt`
    /// grammar has no operator continuation after this form).
    fn call_stmt(&mut self) {
        let tok = self.advance(); // ID
        let name = self.text(tok).to_string();
        let sym_ty = match self.sem.lookup(&name) {
            Some(ty) => ty,
            None => {
                self.err_semantic(format!("undeclared identifier '{name}'"), tok);
                Type::Undefined
            }
        };
        self.call_args(&name, tok, sym_ty);
        self.expect(TokenKind::Semicol);
        self.emitter.emit(";");
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
    fn let_with_inferred_type_picks_up_the_initializer_type() {
        let (out, errs) = compile("ah void main() { beg x = 1 + 2; boo(x); }");
        assert_eq!(errs, 0);
        assert!(out.contains("int x = 1 + 2;"));
        assert!(out.contains("printf(\"%d\\n\", x);"));
    }

    #[test]
    fn let_with_explicit_type_and_no_initializer() {
        let (out, errs) = compile("ah void main() { beg int x; }");
        assert_eq!(errs, 0);
        assert!(out.contains("int x;"));
    }

    #[test]
    fn let_array_declaration_stores_the_decayed_pointer_type() {
        let (out, errs) = compile("ah void main() { beg int a[3]; a[0] = 1; }");
        assert_eq!(errs, 0);
        assert!(out.contains("int a[3];"));
        assert!(out.contains("a[0] = 1;"));
    }

    #[test]
    fn let_array_declaration_without_an_explicit_type_is_an_error() {
        let (_out, errs) = compile("ah void main() { beg a[3]; }");
        assert_eq!(errs, 1);
    }

    #[test]
    fn let_type_mismatch_with_its_initializer_is_an_error() {
        let (_out, errs) = compile("ah void main() { beg int x = \"hi\"; }");
        assert_eq!(errs, 1);
    }

    #[test]
    fn redefining_a_local_is_rejected() {
        let (_out, errs) = compile("ah void main() { beg int x = 1; beg int x = 2; }");
        assert_eq!(errs, 1);
    }

    #[test]
    fn print_selects_format_specifier_from_the_expression_type() {
        let (out, errs) = compile("ah void main() { beg char* s = \"hi\"; boo(s); }");
        assert_eq!(errs, 0);
        assert!(out.contains("printf(\"%s\\n\", s);"));
    }

    #[test]
    fn if_else_translates_both_branches() {
        let (out, errs) = compile(
            "ah void main() { beg char* s = \"hi\"; if s == \"hi\" { boo(s); } else { boo(s); } }",
        );
        assert_eq!(errs, 0);
        assert!(out.contains("if (strcmp"));
        assert!(out.contains("else {"));
    }

    #[test]
    fn else_if_chains_without_nesting_another_brace_block() {
        let (out, errs) =
            compile("ah void main() { beg int x = 1; if x == 1 { boo(x); } else if x == 2 { boo(x); } }");
        assert_eq!(errs, 0);
        assert!(out.contains("else if ("));
    }

    #[test]
    fn while_condition_must_be_int() {
        let (_out, errs) = compile("ah void main() { beg char* s = \"x\"; while s { } }");
        assert_eq!(errs, 1);
    }

    #[test]
    fn assignment_type_mismatch_is_reported() {
        let (_out, errs) = compile("ah void main() { beg int x = 1; x = \"hi\"; }");
        assert_eq!(errs, 1);
    }

    #[test]
    fn returning_the_wrong_type_is_reported() {
        let (_out, errs) = compile("ah int f() { return \"hi\"; }");
        assert_eq!(errs, 1);
    }

    #[test]
    fn indexed_assignment_checks_the_element_type() {
        let (out, errs) = compile("ah void fill(int x[]) { x[0] = 5; }");
        assert_eq!(errs, 0);
        assert!(out.contains("x[0] = 5;"));
    }

    #[test]
    fn a_call_statement_translates_cleanly() {
        let (out, errs) =
            compile("ah int f() { return 1; }\nah void main() { f(); }");
        assert_eq!(errs, 0);
        assert!(out.contains("f();"));
    }

    #[test]
    fn a_call_statement_followed_by_an_operator_is_a_syntax_error() {
        let (_out, errs) =
            compile("ah int f() { return 1; }\nah void main() { f() + 1; }");
        assert_eq!(errs, 1);
    }
}
