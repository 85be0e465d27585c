//! Lexical binding environment
//!
//! Resolves identifier names to binding tags while the optimizer descends.
//! Two bindings with the same name in different blocks get distinct tags, so
//! the memo tables never collapse them; a name that resolves to nothing is
//! foreign (declared outside the component) and therefore constant.

use cachet_parser::Symbol;
use rustc_hash::FxHashMap;

/// Resolved-binding tag. Never reused within one component rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u32);

/// Stack of lexical frames mirroring the optimizer's scope descent.
#[derive(Debug, Default)]
pub struct Env {
    frames: Vec<FxHashMap<Symbol, BindingId>>,
    next: u32,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Declare a name in the innermost frame, shadowing any outer binding.
    pub fn declare(&mut self, name: Symbol) -> BindingId {
        let id = BindingId(self.next);
        self.next += 1;
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, id);
        }
        id
    }

    /// Resolve a name through the frame stack. `None` means foreign.
    pub fn resolve(&self, name: Symbol) -> Option<BindingId> {
        for frame in self.frames.iter().rev() {
            if let Some(&id) = frame.get(&name) {
                return Some(id);
            }
        }
        None
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_parser::Interner;

    #[test]
    fn test_shadowing_gets_distinct_tags() {
        let mut interner = Interner::new();
        let x = interner.intern("x");

        let mut env = Env::new();
        env.push_frame();
        let outer = env.declare(x);
        env.push_frame();
        let inner = env.declare(x);

        assert_ne!(outer, inner);
        assert_eq!(env.resolve(x), Some(inner));
        env.pop_frame();
        assert_eq!(env.resolve(x), Some(outer));
    }

    #[test]
    fn test_unresolved_is_foreign() {
        let mut interner = Interner::new();
        let y = interner.intern("y");
        let mut env = Env::new();
        env.push_frame();
        assert_eq!(env.resolve(y), None);
    }
}
