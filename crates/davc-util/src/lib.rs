//! davc-util - arena, diagnostics and shared limits for the Dav compiler.
//!
//! This crate holds the pieces every other `davc-*` crate needs but that
//! belong to none of them in particular: the string arena that backs
//! lexemes (`arena`), the diagnostic collection used by the lexer and
//! parser (`diagnostic`), and the soft resource limits carried over from
//! the original bootstrap compiler's fixed-size C buffers (`limits`).

mod arena;
mod diagnostic;
mod limits;

pub use arena::{Arena, ArenaError, StringRef};
pub use diagnostic::{Diagnostic, Handler, Level};
pub use limits::Limits;
