//! Preset configuration
//!
//! A preset tells the pass which callee names are hooks (and of which kind),
//! where the cache runtime lives, which framework hooks anchor the root
//! caches, and whether JSX is memoized. Hosts load presets from plugin
//! configuration, so the types carry serde derives.

use cachet_parser::{Interner, Symbol};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// The special-call kinds the optimizer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    /// memo(fn, deps?): cache the result of calling fn
    Memo,
    /// callback(fn, deps?): cache fn itself
    Callback,
    /// ref(init?): a per-instance mutable cell
    Ref,
    /// effect(fn, deps?): scheduled side effect, deps normalized
    Effect,
    /// A recognized user hook: stateful, never cached
    Custom,
    /// Explicitly disabled: handled like an ordinary call
    Skip,
}

/// An importable symbol: a named export of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportDefinition {
    pub name: String,
    pub source: String,
}

impl ImportDefinition {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// One hook registration: callee name to hook kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookRegistration {
    pub name: String,
    pub kind: HookKind,
}

/// Preset: everything host-configurable about the pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Module the cache runtime (`cache`, `ref`, `branch`, `equals`) is
    /// imported from.
    pub runtime_module: String,

    /// Framework hook anchoring the root memo cache.
    pub memo_hook: ImportDefinition,

    /// Framework hook anchoring the root ref cache.
    pub ref_hook: ImportDefinition,

    /// Registered hook callees.
    pub hooks: Vec<HookRegistration>,

    /// Treat `useXxx`-named callees as custom hooks.
    #[serde(default = "default_true")]
    pub use_prefix_custom: bool,

    /// Memoize JSX elements and fragments.
    #[serde(default = "default_true")]
    pub memoize_jsx: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            runtime_module: "cachet/runtime".to_string(),
            memo_hook: ImportDefinition::new("useMemo", "react"),
            ref_hook: ImportDefinition::new("useRef", "react"),
            hooks: vec![
                HookRegistration {
                    name: "useMemo".to_string(),
                    kind: HookKind::Memo,
                },
                HookRegistration {
                    name: "useCallback".to_string(),
                    kind: HookKind::Callback,
                },
                HookRegistration {
                    name: "useRef".to_string(),
                    kind: HookKind::Ref,
                },
                HookRegistration {
                    name: "useEffect".to_string(),
                    kind: HookKind::Effect,
                },
                HookRegistration {
                    name: "useLayoutEffect".to_string(),
                    kind: HookKind::Effect,
                },
            ],
            use_prefix_custom: true,
            memoize_jsx: true,
        }
    }
}

/// A preset with hook names interned for O(1) callee classification.
#[derive(Debug, Clone)]
pub struct CompiledPreset {
    hooks: FxHashMap<Symbol, HookKind>,
    pub use_prefix_custom: bool,
    pub memoize_jsx: bool,
    pub runtime_module: String,
    pub memo_hook: ImportDefinition,
    pub ref_hook: ImportDefinition,
}

impl CompiledPreset {
    pub fn compile(preset: &Preset, interner: &mut Interner) -> Self {
        let mut hooks = FxHashMap::default();
        for registration in &preset.hooks {
            hooks.insert(interner.intern(&registration.name), registration.kind);
        }
        Self {
            hooks,
            use_prefix_custom: preset.use_prefix_custom,
            memoize_jsx: preset.memoize_jsx,
            runtime_module: preset.runtime_module.clone(),
            memo_hook: preset.memo_hook.clone(),
            ref_hook: preset.ref_hook.clone(),
        }
    }

    /// Look up a registered hook by callee symbol.
    pub fn hook_kind(&self, name: Symbol) -> Option<HookKind> {
        self.hooks.get(&name).copied()
    }

    /// Check whether a name follows the `useXxx` user-hook convention.
    pub fn is_hook_name(&self, name: &str) -> bool {
        let mut chars = name.chars();
        chars.next() == Some('u')
            && chars.next() == Some('s')
            && chars.next() == Some('e')
            && chars.next().is_some_and(|c| c.is_ascii_uppercase())
    }
}
