//! davc-emit - the append-only C output buffer and the peek-and-rewind
//! facility (`spec.md` §4.3).
//!
//! The original bootstrap compiler shares one mutable output buffer
//! between "commit this text" and "speculatively generate this operand's
//! text so I can decide what wrapper to put around it" (string `==`
//! becoming `strcmp(...) == 0`, and so on). `spec.md` §9's Design Note
//! "the peek mechanism" points out this can be done without a shared
//! scratch buffer at all: have the thing you're peeking *return* its text
//! instead of writing to a buffer your caller has to rewind.
//!
//! [`Emitter::peek`] keeps the *emitter's* side of that contract — it
//! marks the buffer, lets the closure append to it as normal, then lifts
//! the appended bytes back out into an owned `String` and rewinds —
//! while giving every caller in `davc-par` an ordinary `&mut Emitter` to
//! write through, so nothing needs a second "peek mode".

/// The compiler's single growable, append-only output buffer.
///
/// `emit` appends; `mark`/`rewind` support speculative emission (see
/// [`Emitter::peek`]). There is no fixed capacity (`SPEC_FULL.md` §5):
/// the buffer is a `String` and simply grows.
#[derive(Debug, Default)]
pub struct Emitter {
    buf: String,
}

impl Emitter {
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Appends `s` to the output.
    pub fn emit(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// Captures the current write cursor.
    pub fn mark(&self) -> usize {
        self.buf.len()
    }

    /// Truncates the buffer back to a previously captured cursor,
    /// discarding everything appended since.
    pub fn rewind(&mut self, pos: usize) {
        self.buf.truncate(pos);
    }

    /// Reads back a previously marked range without disturbing it.
    ///
    /// Used by callers (`davc-par`) that need to build up the text for a
    /// whole left-associative operator chain themselves before committing
    /// any of it, rather than handing a single closure to [`Emitter::peek`].
    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.buf[start..end]
    }

    /// Runs `f`, which is expected to call `emit` zero or more times on
    /// this emitter, then lifts whatever it appended out into an owned
    /// `String` and rewinds the buffer as if `f` had never run.
    ///
    /// This is `peek_code` from `spec.md` §4.3: `f` is one of the
    /// recursive-descent entry points (`expr`, `logical`, `relational`,
    /// `additive`, `multiplicative`, `unary`, `atom`); the `level`
    /// parameter from the spec is just which closure the caller passes.
    /// Because `f` borrows `self` mutably for its whole duration, two
    /// overlapping peeks are a borrow-check error rather than a runtime
    /// bug — the single-slot discipline from `spec.md` §4.3 /
    /// `SPEC_FULL.md` §5 is structural here, not a convention callers
    /// must remember.
    pub fn peek<T>(&mut self, f: impl FnOnce(&mut Emitter) -> T) -> (String, T) {
        let start = self.mark();
        let value = f(self);
        let end = self.mark();
        let text = self.buf[start..end].to_string();
        self.rewind(start);
        (text, value)
    }

    /// The fully emitted text, consumed at the end of compilation.
    pub fn into_inner(self) -> String {
        self.buf
    }

    /// Current length of the committed output.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
