//! The lexer itself: a single forward pass turning source bytes into a
//! flat `Vec<Token>` backed by an [`Arena`].
//!
//! Lexical errors (`spec.md` §4.1: unterminated string/char literal, an
//! unrecognized byte) are fatal — they abort tokenization immediately,
//! matching the original bootstrap compiler's `return 1;` out of
//! `tokenize()` with no further tokens produced. Everything else in the
//! compiler (syntax, semantic) recovers and cascades; lexing does not.

use davc_util::{Arena, Handler, Level, StringRef};

use crate::token::{Token, TokenKind};

/// Lexes Dav source text into a token stream.
///
/// `source` must be LF-only, BOM-free bytes (`spec.md` §6); CR is not
/// treated specially and becomes part of whatever token it lands in,
/// same as the reference implementation.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    line_start: usize,
    arena: &'a mut Arena,
    handler: &'a mut Handler,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, arena: &'a mut Arena, handler: &'a mut Handler) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
            arena,
            handler,
        }
    }

    fn col(&self) -> u32 {
        (self.pos - self.line_start) as u32
    }

    fn peek_byte(&self) -> u8 {
        self.byte_at(self.pos)
    }

    fn byte_at(&self, idx: usize) -> u8 {
        self.src.get(idx).copied().unwrap_or(0)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn report(&mut self, message: impl Into<String>, line: u32, col: u32) {
        self.handler.report(Level::Lex, message, line, col);
    }

    /// Runs the full lexer, producing every token up to and including a
    /// synthetic `EOF`, or `None` if a fatal lexical error was hit (the
    /// diagnostic has already been reported by the time this returns).
    pub fn tokenize(mut self) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        tracing::debug!(bytes = self.src.len(), "lexing source");

        while !self.at_end() {
            let c = self.peek_byte();

            if is_space(c) {
                if c == b'\n' {
                    self.line += 1;
                    self.line_start = self.pos + 1;
                }
                self.advance();
                continue;
            }

            let line = self.line;
            let col = self.col();

            if is_digit(c) {
                tokens.push(self.lex_number(line, col));
                continue;
            }
            if is_letter(c) {
                tokens.push(self.lex_ident_or_keyword(line, col));
                continue;
            }

            match c {
                b'=' => {
                    if self.byte_at(self.pos + 1) == b'=' {
                        self.advance();
                        self.advance();
                        tokens.push(Token::new(TokenKind::Eq, None, line, col));
                    } else {
                        self.advance();
                        tokens.push(Token::new(TokenKind::Assign, None, line, col));
                    }
                }
                b'!' if self.byte_at(self.pos + 1) == b'=' => {
                    self.advance();
                    self.advance();
                    tokens.push(Token::new(TokenKind::Ne, None, line, col));
                }
                b'>' => {
                    if self.byte_at(self.pos + 1) == b'=' {
                        self.advance();
                        self.advance();
                        tokens.push(Token::new(TokenKind::Ge, None, line, col));
                    } else {
                        self.advance();
                        tokens.push(Token::new(TokenKind::Gt, None, line, col));
                    }
                }
                b'<' => {
                    if self.byte_at(self.pos + 1) == b'=' {
                        self.advance();
                        self.advance();
                        tokens.push(Token::new(TokenKind::Le, None, line, col));
                    } else {
                        self.advance();
                        tokens.push(Token::new(TokenKind::Lt, None, line, col));
                    }
                }
                b'&' if self.byte_at(self.pos + 1) == b'&' => {
                    self.advance();
                    self.advance();
                    tokens.push(Token::new(TokenKind::And, None, line, col));
                }
                b'|' if self.byte_at(self.pos + 1) == b'|' => {
                    self.advance();
                    self.advance();
                    tokens.push(Token::new(TokenKind::Or, None, line, col));
                }
                b'/' => {
                    if self.byte_at(self.pos + 1) == b'/' {
                        while !self.at_end() && self.peek_byte() != b'\n' {
                            self.advance();
                        }
                    } else {
                        self.advance();
                        tokens.push(Token::new(TokenKind::Div, None, line, col));
                    }
                }
                b'(' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::LParen, None, line, col));
                }
                b')' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::RParen, None, line, col));
                }
                b'{' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::LBrace, None, line, col));
                }
                b'}' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::RBrace, None, line, col));
                }
                b'[' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::LSquare, None, line, col));
                }
                b']' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::RSquare, None, line, col));
                }
                b'+' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Plus, None, line, col));
                }
                b'-' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Minus, None, line, col));
                }
                b'*' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Mul, None, line, col));
                }
                b';' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Semicol, None, line, col));
                }
                b',' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Comma, None, line, col));
                }
                b'"' => match self.lex_string(line, col) {
                    Some(tok) => tokens.push(tok),
                    None => return None,
                },
                b'\'' => match self.lex_char(line, col) {
                    Some(tok) => tokens.push(tok),
                    None => return None,
                },
                other => {
                    self.report(
                        format!("unexpected character '{}'", other as char),
                        line,
                        col,
                    );
                    return None;
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, None, self.line, self.col()));
        Some(tokens)
    }

    fn lex_number(&mut self, line: u32, col: u32) -> Token {
        let start = self.pos;
        while is_digit(self.peek_byte()) {
            self.advance();
        }
        if self.peek_byte() == b'.' && is_digit(self.byte_at(self.pos + 1)) {
            self.advance();
            while is_digit(self.peek_byte()) {
                self.advance();
            }
        }
        let lexeme = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        let value = self.arena.intern(lexeme);
        Token::new(TokenKind::Number, Some(value), line, col)
    }

    fn lex_ident_or_keyword(&mut self, line: u32, col: u32) -> Token {
        let start = self.pos;
        while is_ident_char(self.peek_byte()) {
            self.advance();
        }
        let lexeme = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        match keyword_kind(lexeme) {
            Some(kind) => Token::new(kind, None, line, col),
            None => {
                let kind = if is_type_word(lexeme) {
                    TokenKind::Type
                } else {
                    TokenKind::Id
                };
                let value = self.arena.intern(lexeme);
                Token::new(kind, Some(value), line, col)
            }
        }
    }

    fn lex_string(&mut self, line: u32, col: u32) -> Option<Token> {
        self.advance(); // opening quote
        let mut buf = String::new();
        loop {
            if self.at_end() {
                self.report("unterminated string literal", line, col);
                return None;
            }
            let c = self.peek_byte();
            if c == b'"' {
                self.advance();
                break;
            }
            if c == b'\\' {
                self.advance();
                if self.at_end() {
                    self.report("unterminated string literal", line, col);
                    return None;
                }
                let esc = self.peek_byte();
                buf.push(decode_escape(esc));
                self.advance();
            } else {
                buf.push(c as char);
                self.advance();
            }
        }
        let value = self.arena.intern(&buf);
        Some(Token::new(TokenKind::String, Some(value), line, col))
    }

    fn lex_char(&mut self, line: u32, col: u32) -> Option<Token> {
        self.advance(); // opening quote
        if self.at_end() {
            self.report("unterminated char literal", line, col);
            return None;
        }
        let mut c = self.peek_byte() as char;
        self.advance();
        if c == '\\' {
            if self.at_end() {
                self.report("unterminated char literal", line, col);
                return None;
            }
            c = decode_escape(self.peek_byte());
            self.advance();
        }
        if self.peek_byte() != b'\'' {
            self.report("unclosed or invalid char literal", line, col);
            return None;
        }
        self.advance();
        let value = self.arena.intern(&c.to_string());
        Some(Token::new(TokenKind::Char, Some(value), line, col))
    }
}

fn decode_escape(c: u8) -> char {
    match c {
        b'n' => '\n',
        b't' => '\t',
        b'"' => '"',
        b'\\' => '\\',
        b'\'' => '\'',
        other => other as char,
    }
}

fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

fn is_ident_char(c: u8) -> bool {
    is_letter(c) || is_digit(c)
}

fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t' || c == b'\n'
}

fn is_type_word(s: &str) -> bool {
    matches!(s, "int" | "char" | "void")
}

fn keyword_kind(s: &str) -> Option<TokenKind> {
    Some(match s {
        "ah" => TokenKind::Fn,
        "beg" => TokenKind::Let,
        "boo" => TokenKind::Print,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "return" => TokenKind::Return,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> (Vec<Token>, Arena) {
        let mut arena = Arena::new();
        let mut handler = Handler::new();
        let tokens = {
            let lexer = Lexer::new(src, &mut arena, &mut handler);
            lexer.tokenize()
        };
        (tokens.expect("lexing should succeed"), arena)
    }

    #[test]
    fn keywords_and_types_are_recognized() {
        let (tokens, _arena) = lex("ah beg boo if else while return int char void");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Fn,
                TokenKind::Let,
                TokenKind::Print,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Return,
                TokenKind::Type,
                TokenKind::Type,
                TokenKind::Type,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_are_probed_before_their_prefix() {
        let (tokens, _) = lex("== != >= <= && ||");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Ge,
                TokenKind::Le,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn non_value_tokens_carry_no_lexeme() {
        let (tokens, _) = lex("+ - ;");
        for t in &tokens[..3] {
            assert!(t.value.is_none());
        }
    }

    #[test]
    fn value_tokens_round_trip_through_the_arena() {
        let (tokens, arena) = lex(r#"123 'a' "hi\n" count"#);
        let lexemes: Vec<_> = tokens
            .iter()
            .filter_map(|t| t.value.map(|v| arena.resolve(v)))
            .collect();
        assert_eq!(lexemes, vec!["123", "a", "hi\n", "count"]);
    }

    #[test]
    fn line_comment_produces_no_token() {
        let (tokens, _) = lex("// whole line\nboo");
        assert_eq!(tokens[0].kind, TokenKind::Print);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn line_and_column_tracking() {
        let (tokens, _) = lex("ah\nboo");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].col, 0);
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let mut arena = Arena::new();
        let mut handler = Handler::new();
        let result = Lexer::new("\"never closed", &mut arena, &mut handler).tokenize();
        assert!(result.is_none());
        assert!(handler.has_errors());
    }

    #[test]
    fn unterminated_char_is_fatal() {
        let mut arena = Arena::new();
        let mut handler = Handler::new();
        let result = Lexer::new("'a", &mut arena, &mut handler).tokenize();
        assert!(result.is_none());
        assert!(handler.has_errors());
    }

    #[test]
    fn unknown_byte_is_fatal() {
        let mut arena = Arena::new();
        let mut handler = Handler::new();
        let result = Lexer::new("@", &mut arena, &mut handler).tokenize();
        assert!(result.is_none());
        assert!(handler.has_errors());
    }

    #[test]
    fn decimal_number_is_one_token() {
        let (tokens, arena) = lex("3.14");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(arena.resolve(tokens[0].value.unwrap()), "3.14");
    }

    #[test]
    fn eof_is_always_the_final_token() {
        let (tokens, _) = lex("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
