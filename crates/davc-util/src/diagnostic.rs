//! Diagnostic collection.
//!
//! `spec.md` §7 specifies that every error is printed immediately and
//! that, outside of fatal buffer/limit overflows, the compiler does not
//! unwind: the current parser call returns a sentinel and its caller
//! continues. `Handler` is the shared sink every stage reports through so
//! the driver can later ask "did anything go wrong" without re-parsing
//! output text.

use std::fmt;

/// Severity of a recoverable diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Unexpected byte, unterminated string/char literal.
    Lex,
    /// Unexpected token where a specific kind was expected.
    Syntax,
    /// Undeclared identifier, redefinition, type mismatch, bad operator use.
    Semantic,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Lex => "lex error",
            Level::Syntax => "syntax error",
            Level::Semantic => "semantic error",
        };
        f.write_str(s)
    }
}

/// A single recoverable diagnostic with its source position.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (line {}, col {})",
            self.level, self.message, self.line, self.col
        )
    }
}

/// Collects diagnostics raised while lexing and parsing.
///
/// Diagnostics are printed to standard output as they are raised (per
/// `spec.md` §7, "every error is printed immediately"), and also kept so
/// the driver can decide the process exit code (`SPEC_FULL.md` §9).
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records and immediately prints a diagnostic.
    pub fn report(&mut self, level: Level, message: impl Into<String>, line: u32, col: u32) {
        let diag = Diagnostic {
            level,
            message: message.into(),
            line,
            col,
        };
        println!("{diag}");
        self.diagnostics.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
