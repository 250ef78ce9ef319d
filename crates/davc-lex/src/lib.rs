//! davc-lex - lexical analysis for Dav.
//!
//! A single forward pass over the source string produces a flat
//! [`Vec<Token>`], backed by a [`davc_util::Arena`] for lexeme text. See
//! `spec.md` §4.1 for the full token grammar.

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};
