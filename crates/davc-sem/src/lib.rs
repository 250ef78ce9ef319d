//! davc-sem - the Dav type system and two-scope symbol table.
//!
//! `spec.md` §3 defines type tags as a closed set of strings; Design
//! Note 2 of `spec.md` §9 asks for those to become a proper enum. That
//! enum is [`Type`]. §4.2 defines the two flat scopes (global, local)
//! with local-then-global lookup and no block scoping; that's
//! [`SymbolTable`].

mod scope;
mod types;

pub use scope::{FnSig, SymbolTable};
pub use types::Type;
