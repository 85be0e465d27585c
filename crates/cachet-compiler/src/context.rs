//! Shared pass state
//!
//! The state context owns everything that outlives a single component
//! rewrite: the interner, the compiled preset, the per-file import table,
//! the skip-span set, and the fresh-name counter.

use crate::imports::{RuntimeFn, RuntimeImports};
use crate::preset::{CompiledPreset, ImportDefinition, Preset};
use cachet_parser::ast::Identifier;
use cachet_parser::{Interner, Span};
use rustc_hash::FxHashSet;

/// State shared by every component rewrite in a file.
pub struct StateContext {
    /// String interner, continued from the parser.
    pub interner: Interner,

    /// Compiled preset (hook names interned).
    pub preset: CompiledPreset,

    /// Per-file import resolution.
    pub imports: RuntimeImports,

    /// Statements whose spans are listed here are emitted unchanged.
    pub skip: FxHashSet<Span>,

    counter: u32,
}

impl StateContext {
    pub fn new(mut interner: Interner, preset: &Preset) -> Self {
        let preset = CompiledPreset::compile(preset, &mut interner);
        Self {
            interner,
            preset,
            imports: RuntimeImports::new(),
            skip: FxHashSet::default(),
            counter: 0,
        }
    }

    /// Generate a fresh identifier. The shared counter keeps every generated
    /// name unique within the file regardless of prefix.
    pub fn fresh(&mut self, prefix: &str) -> Identifier {
        let name = format!("_{}{}", prefix, self.counter);
        self.counter += 1;
        Identifier::synthetic(self.interner.intern(&name))
    }

    /// Local identifier for a cache-runtime entry point.
    pub fn runtime(&mut self, f: RuntimeFn) -> Identifier {
        let def = ImportDefinition::new(f.name(), self.preset.runtime_module.clone());
        self.imports.resolve(&def, &mut self.interner)
    }

    /// Local identifier for the framework memo hook.
    pub fn memo_hook(&mut self) -> Identifier {
        let def = self.preset.memo_hook.clone();
        self.imports.resolve(&def, &mut self.interner)
    }

    /// Local identifier for the framework ref hook.
    pub fn ref_hook(&mut self) -> Identifier {
        let def = self.preset.ref_hook.clone();
        self.imports.resolve(&def, &mut self.interner)
    }
}
