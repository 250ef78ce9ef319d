//! The string arena backing every lexeme produced by the lexer.
//!
//! A single contiguous, growable byte buffer. Every lexeme that carries a
//! value (`NUMBER`, `STRING`, `CHAR`, `ID`, `TYPE`) is copied in once and
//! referenced afterward by a [`StringRef`], a `(start, len)` pair into
//! this buffer. The arena owns the bytes; `StringRef` is a non-owning
//! index and is only meaningful against the `Arena` that produced it.

use thiserror::Error;

/// A non-owning reference to a byte range inside an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef {
    start: u32,
    len: u32,
}

impl StringRef {
    fn new(start: usize, len: usize) -> Self {
        Self {
            start: start as u32,
            len: len as u32,
        }
    }
}

/// Fatal errors producing or reading from the arena.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// A `StringRef` pointed outside the arena's current bounds. This can
    /// only happen when a `StringRef` from one `Arena` is used against a
    /// different one.
    #[error("string ref {start}..{end} out of bounds for arena of length {len}")]
    OutOfBounds { start: u32, end: u32, len: usize },

    /// The bytes at a `StringRef` were not valid UTF-8. Lexemes are copied
    /// from a `&str` source, so this indicates a bug in the copying code,
    /// not malformed user input.
    #[error("arena slice is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Growable backing storage for lexeme text.
///
/// The original bootstrap compiler used a fixed `char token_pool[500000]`;
/// here the pool grows with the input, and overflow is therefore not a
/// distinct failure mode (see `spec.md` §5 / `SPEC_FULL.md` §5).
#[derive(Debug, Default)]
pub struct Arena {
    bytes: Vec<u8>,
}

impl Arena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Creates an arena with room for roughly `capacity` bytes of lexemes
    /// without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Copies `text` into the arena and returns a reference to it.
    pub fn intern(&mut self, text: &str) -> StringRef {
        let start = self.bytes.len();
        self.bytes.extend_from_slice(text.as_bytes());
        StringRef::new(start, text.len())
    }

    /// Resolves a [`StringRef`] back into a `&str`.
    ///
    /// # Panics
    ///
    /// Panics if `ref_` was not produced by this arena (out of bounds) or
    /// somehow straddles a non-UTF-8 boundary; both indicate a caller bug
    /// rather than a recoverable compilation error, so this mirrors the
    /// rest of the crate's "internal invariant" error handling.
    pub fn resolve(&self, ref_: StringRef) -> &str {
        self.try_resolve(ref_)
            .expect("StringRef must be valid for the Arena it was interned into")
    }

    /// Fallible version of [`Arena::resolve`].
    pub fn try_resolve(&self, ref_: StringRef) -> Result<&str, ArenaError> {
        let start = ref_.start as usize;
        let end = start + ref_.len as usize;
        let slice = self
            .bytes
            .get(start..end)
            .ok_or(ArenaError::OutOfBounds {
                start: ref_.start,
                end: end as u32,
                len: self.bytes.len(),
            })?;
        Ok(std::str::from_utf8(slice)?)
    }

    /// Total number of bytes currently interned.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_then_resolve_round_trips() {
        let mut arena = Arena::new();
        let a = arena.intern("hello");
        let b = arena.intern("world");
        assert_eq!(arena.resolve(a), "hello");
        assert_eq!(arena.resolve(b), "world");
    }

    #[test]
    fn empty_string_round_trips() {
        let mut arena = Arena::new();
        let r = arena.intern("");
        assert_eq!(arena.resolve(r), "");
    }

    #[test]
    fn out_of_bounds_ref_is_an_error_not_a_panic_path() {
        let arena = Arena::new();
        let bogus = StringRef::new(0, 5);
        assert!(arena.try_resolve(bogus).is_err());
    }
}
