//! Cachet auto-memoization compiler
//!
//! Rewrites UI components so every non-trivial sub-expression is stored in
//! and retrieved from a per-invocation cache: on re-invocation the component
//! re-uses previously computed values whenever their inputs are unchanged by
//! referential equality. The rewrite is a pure AST-to-AST transformation; the
//! emitted code calls a four-function runtime (`cache`, `ref`, `branch`,
//! `equals`) imported from the preset's runtime module.
//!
//! # Example
//!
//! ```
//! use cachet_compiler::{compile_module, Preset};
//! use cachet_parser::printer::print_module;
//!
//! let source = "function Sum(p) { return p.x + p.y; }";
//! let (module, interner) = cachet_parser::parse(source).unwrap();
//! let output = compile_module(module, interner, &Preset::default());
//! assert!(output.errors.is_empty());
//!
//! let printed = print_module(&output.module, &output.interner);
//! assert!(printed.contains("_cache(_useMemo, 5)"));
//! assert!(printed.contains("_equals("));
//! ```

pub mod analyzer;
pub mod captures;
pub mod context;
pub mod driver;
pub mod env;
pub mod error;
pub mod imports;
pub mod optimizer;
pub mod preset;
pub mod scope;
pub mod simplify;
mod synth;

pub use analyzer::ExprAnalyzer;
pub use context::StateContext;
pub use driver::{compile_module, CompileOutput};
pub use error::CompileError;
pub use optimizer::{MemoDeps, Optimized, Optimizer};
pub use preset::{CompiledPreset, HookKind, HookRegistration, ImportDefinition, Preset};
pub use scope::{CacheKind, ScopeId, ScopeTree};
pub use simplify::{Simplifier, Truthiness};
