//! String interning for identifiers and string literals.
//!
//! Every name in a component source becomes a [`Symbol`]: a small copyable
//! handle that keeps AST nodes compact and makes name comparison O(1). The
//! rewrite leans on this heavily — each cache slot mints fresh `_v`/`_eq`
//! identifiers, so a file can easily intern more synthesized names than
//! source names. Each distinct string is stored once, shared between the
//! lookup table and the index.
//!
//! Slot 0 is reserved at construction for the empty placeholder behind
//! [`Symbol::dummy`], so placeholder symbols (parser error templates,
//! half-built synthesized nodes) resolve to `""` instead of being dangling
//! handles.

use rustc_hash::FxHashMap;
use std::num::NonZeroU32;
use std::rc::Rc;

/// Handle to an interned string.
///
/// Use [`Interner::resolve`] to get the actual string back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(NonZeroU32);

impl Symbol {
    #[inline]
    fn new(index: usize) -> Self {
        // The niche lives at 0, so slot i is handle i + 1
        let raw = u32::try_from(index + 1).expect("interner overflow");
        Symbol(NonZeroU32::new(raw).expect("index + 1 is nonzero"))
    }

    #[inline]
    fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    /// The reserved placeholder symbol: slot 0, the empty string.
    #[inline]
    pub const fn dummy() -> Self {
        Symbol(NonZeroU32::MIN)
    }
}

/// Deduplicating string store.
#[derive(Debug, Clone)]
pub struct Interner {
    lookup: FxHashMap<Rc<str>, Symbol>,
    strings: Vec<Rc<str>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut interner = Self {
            lookup: FxHashMap::with_capacity_and_hasher(capacity + 1, Default::default()),
            strings: Vec::with_capacity(capacity + 1),
        };
        let placeholder = interner.intern("");
        debug_assert_eq!(placeholder, Symbol::dummy());
        interner
    }

    /// Intern a string, returning its symbol.
    ///
    /// Interning the same string twice yields the same symbol. The string
    /// is allocated once; the lookup key and the index entry share it.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.lookup.get(s) {
            return sym;
        }
        let entry: Rc<str> = Rc::from(s);
        let sym = Symbol::new(self.strings.len());
        self.strings.push(Rc::clone(&entry));
        self.lookup.insert(entry, sym);
        sym
    }

    /// Resolve a symbol back to its string.
    ///
    /// # Panics
    ///
    /// Panics if the symbol did not come from this interner.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.index()]
    }

    /// Look up a symbol without interning.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.lookup.get(s).copied()
    }

    /// Number of distinct strings interned, the placeholder excluded.
    pub fn len(&self) -> usize {
        self.strings.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
