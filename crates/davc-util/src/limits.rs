//! Soft accounting limits carried over from the original bootstrap
//! compiler's fixed-size C arrays.
//!
//! Every container in this workspace is growable (`Vec`/`String`), so
//! these are no longer hard caps; they exist so `--strict-limits`
//! (see `SPEC_FULL.md` §5) can reproduce the original compiler's
//! bug-for-bug overflow behavior for callers who want it.

/// Reference capacities from the original `compiler.c` / `stage2_compiler.c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_tokens: usize,
    pub max_pool_bytes: usize,
    pub max_output_bytes: usize,
    pub max_peek_bytes: usize,
    pub max_symbols_per_scope: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tokens: 50_000,
            max_pool_bytes: 500_000,
            max_output_bytes: 1_000_000,
            max_peek_bytes: 4_096,
            max_symbols_per_scope: 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_bootstrap_compiler() {
        let l = Limits::default();
        assert_eq!(l.max_tokens, 50_000);
        assert_eq!(l.max_pool_bytes, 500_000);
        assert_eq!(l.max_output_bytes, 1_000_000);
        assert_eq!(l.max_peek_bytes, 4_096);
        assert_eq!(l.max_symbols_per_scope, 1_000);
    }
}
