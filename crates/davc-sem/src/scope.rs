use crate::types::Type;

/// A function's parameter types and return type.
///
/// Not part of the original bootstrap compiler (which never checked call
/// arguments — `spec.md` §9, Open Question "argument-type checking for
/// calls"); this implements the recommended deviation from
/// `SPEC_FULL.md` §9: call sites check arity and per-argument type
/// against the declared signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnSig {
    pub params: Vec<Type>,
    pub ret: Type,
}

/// The two flat, linearly-searched scopes from `spec.md` §4.2: `global`
/// (functions and globals, lives for the whole compilation) and `local`
/// (the current function's parameters and locals, cleared on function
/// entry). No block scoping exists; a local shadows a global of the same
/// name.
pub struct SymbolTable {
    globals: Vec<(String, Type)>,
    locals: Vec<(String, Type)>,
    fn_sigs: Vec<(String, FnSig)>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table with the runtime helpers already registered in
    /// global scope (`spec.md` §4.2), so user code can call them without
    /// forward declaration.
    pub fn new() -> Self {
        let mut table = Self {
            globals: Vec::new(),
            locals: Vec::new(),
            fn_sigs: Vec::new(),
        };
        table.preset_runtime_symbols();
        table
    }

    fn preset_runtime_symbols(&mut self) {
        use Type::*;
        let helpers: &[(&str, &[Type], Type)] = &[
            ("concat", &[CharPtr, CharPtr], CharPtr),
            ("itos", &[Int], CharPtr),
            ("ctos", &[Char], CharPtr),
            ("strlen", &[CharPtr], Int),
            ("strcmp", &[CharPtr, CharPtr], Int),
            ("read_file", &[CharPtr], CharPtr),
            ("write_file", &[CharPtr, CharPtr], Void),
        ];
        for (name, params, ret) in helpers {
            self.globals.push((name.to_string(), *ret));
            self.fn_sigs.push((
                name.to_string(),
                FnSig {
                    params: params.to_vec(),
                    ret: *ret,
                },
            ));
        }
    }

    /// Adds a symbol to the requested scope. Callers must check
    /// [`SymbolTable::is_defined_in_scope`] first — a symbol is never
    /// added twice to the same scope (`spec.md` §3 invariant), but this
    /// method itself does not enforce that, matching `spec.md` §4.2's
    /// `add_symbol` contract.
    pub fn add_symbol(&mut self, global: bool, name: &str, ty: Type) {
        let scope = if global {
            &mut self.globals
        } else {
            &mut self.locals
        };
        scope.push((name.to_string(), ty));
    }

    /// Registers a function's parameter/return signature, used for call
    /// arity/type checking (`SPEC_FULL.md` §9).
    pub fn add_fn_sig(&mut self, name: &str, sig: FnSig) {
        self.fn_sigs.push((name.to_string(), sig));
    }

    pub fn fn_sig(&self, name: &str) -> Option<&FnSig> {
        self.fn_sigs
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, sig)| sig)
    }

    /// Looks up `name`, trying `local` first and falling back to
    /// `global`. Returns `None` when undeclared (`spec.md` §4.2's empty
    /// sentinel type).
    pub fn lookup(&self, name: &str) -> Option<Type> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .or_else(|| self.globals.iter().rev().find(|(n, _)| n == name))
            .map(|(_, ty)| *ty)
    }

    /// Whether `name` is already bound *in that specific scope* (used for
    /// the redefinition check in `let`/parameter/function declarations;
    /// `spec.md` §3: "duplicate names within the same scope are
    /// rejected", §3: "a local shadows a global" — so this intentionally
    /// does not consult the other scope).
    pub fn is_defined_in_scope(&self, global: bool, name: &str) -> bool {
        let scope = if global { &self.globals } else { &self.locals };
        scope.iter().any(|(n, _)| n == name)
    }

    /// Truncates the local scope back to empty (`spec.md` §4.2,
    /// `clear_local`), run on every function entry.
    pub fn clear_local(&mut self) {
        self.locals.clear();
    }

    /// Number of symbols bound in global scope, including the
    /// preregistered runtime helpers. Used by `--strict-limits`
    /// (`SPEC_FULL.md` §5) to reproduce the original compiler's
    /// `max_symbols_per_scope` overflow check.
    pub fn global_len(&self) -> usize {
        self.globals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_helpers_are_preregistered() {
        let table = SymbolTable::new();
        assert_eq!(table.lookup("concat"), Some(Type::CharPtr));
        assert_eq!(table.lookup("write_file"), Some(Type::Void));
        assert_eq!(table.lookup("strcmp"), Some(Type::Int));
    }

    #[test]
    fn local_lookup_takes_priority_over_global() {
        let mut table = SymbolTable::new();
        table.add_symbol(true, "x", Type::Int);
        table.add_symbol(false, "x", Type::CharPtr);
        assert_eq!(table.lookup("x"), Some(Type::CharPtr));
    }

    #[test]
    fn clear_local_removes_only_locals() {
        let mut table = SymbolTable::new();
        table.add_symbol(true, "g", Type::Int);
        table.add_symbol(false, "l", Type::Char);
        table.clear_local();
        assert_eq!(table.lookup("l"), None);
        assert_eq!(table.lookup("g"), Some(Type::Int));
    }

    #[test]
    fn redefinition_check_is_scoped_not_global() {
        let mut table = SymbolTable::new();
        table.add_symbol(true, "x", Type::Int);
        assert!(table.is_defined_in_scope(true, "x"));
        assert!(!table.is_defined_in_scope(false, "x"));
    }

    #[test]
    fn global_len_counts_the_preset_runtime_helpers() {
        let mut table = SymbolTable::new();
        let before = table.global_len();
        table.add_symbol(true, "main", Type::Int);
        assert_eq!(table.global_len(), before + 1);
    }

    #[test]
    fn undeclared_lookup_is_none() {
        let table = SymbolTable::new();
        assert_eq!(table.lookup("nope"), None);
    }
}
