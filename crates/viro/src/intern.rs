//! Symbol interning for word spellings.
//!
//! Every word, refinement, and frame key is interned once and afterwards
//! handled as a [`Symbol`], so binding lookup and path walking compare
//! integers instead of strings. Spellings are case-preserving: the first
//! spelling seen wins and is what `mold` prints.

use ahash::AHashMap;

/// Unique identifier for an interned word spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Symbol(u32);

impl Symbol {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Storage for interned word spellings.
///
/// Owned by the evaluator; the parser borrows it mutably so symbols stay
/// stable across every `parse` call of a session.
#[derive(Debug, Default)]
pub(crate) struct Interns {
    spellings: Vec<Box<str>>,
    lookup: AHashMap<Box<str>, Symbol>,
}

impl Interns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a spelling, returning its symbol. Idempotent.
    pub fn intern(&mut self, spelling: &str) -> Symbol {
        if let Some(sym) = self.lookup.get(spelling) {
            return *sym;
        }
        let sym = Symbol(u32::try_from(self.spellings.len()).expect("symbol table overflow"));
        self.spellings.push(spelling.into());
        self.lookup.insert(spelling.into(), sym);
        sym
    }

    /// Returns the spelling of a previously interned symbol.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.spellings[sym.index()]
    }
}

/// Symbols the evaluator and natives look up on hot paths, interned once at
/// startup so natives never re-intern their own refinement names.
#[derive(Debug)]
pub(crate) struct WellKnown {
    pub part: Symbol,
    pub last: Symbol,
    pub default: Symbol,
    pub levels: Symbol,
    pub with_index: Symbol,
    pub category: Symbol,
    pub id: Symbol,
    pub message: Symbol,
    pub object_type: Symbol,
    pub error_type: Symbol,
}

impl WellKnown {
    pub fn new(interns: &mut Interns) -> Self {
        Self {
            part: interns.intern("part"),
            last: interns.intern("last"),
            default: interns.intern("default"),
            levels: interns.intern("levels"),
            with_index: interns.intern("with-index"),
            category: interns.intern("category"),
            id: interns.intern("id"),
            message: interns.intern("message"),
            object_type: interns.intern("object!"),
            error_type: interns.intern("error!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut interns = Interns::new();
        let a = interns.intern("append");
        let b = interns.intern("append");
        assert_eq!(a, b, "same spelling must intern to the same symbol");
        assert_eq!(interns.resolve(a), "append");
    }

    #[test]
    fn distinct_spellings_get_distinct_symbols() {
        let mut interns = Interns::new();
        let a = interns.intern("foo");
        let b = interns.intern("Foo");
        assert_ne!(a, b, "interning is case-preserving and case-sensitive");
    }
}
