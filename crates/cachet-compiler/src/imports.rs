//! Runtime import resolution
//!
//! Maps logical runtime symbols (`cache`, `ref`, `branch`, `equals`) and the
//! framework hooks to canonical local identifiers, deduplicating per file.
//! The driver asks for the accumulated import declarations once the module
//! has been rewritten, so only symbols that were actually used are imported.

use crate::preset::ImportDefinition;
use cachet_parser::ast::{Identifier, ImportDecl, ImportSpecifier, Statement, StringLiteral};
use cachet_parser::{Interner, Span};
use rustc_hash::FxHashMap;

/// The four cache-runtime entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeFn {
    Cache,
    Ref,
    Branch,
    Equals,
}

impl RuntimeFn {
    pub fn name(self) -> &'static str {
        match self {
            RuntimeFn::Cache => "cache",
            RuntimeFn::Ref => "ref",
            RuntimeFn::Branch => "branch",
            RuntimeFn::Equals => "equals",
        }
    }
}

/// Per-file import table: logical import to local identifier.
#[derive(Debug, Default)]
pub struct RuntimeImports {
    entries: Vec<(ImportDefinition, Identifier)>,
    index: FxHashMap<ImportDefinition, usize>,
}

impl RuntimeImports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a logical import to its canonical local identifier, creating
    /// the local (and remembering the import) on first use.
    pub fn resolve(&mut self, def: &ImportDefinition, interner: &mut Interner) -> Identifier {
        if let Some(&idx) = self.index.get(def) {
            return self.entries[idx].1.clone();
        }
        let local = Identifier::synthetic(interner.intern(&format!("_{}", def.name)));
        self.index.insert(def.clone(), self.entries.len());
        self.entries.push((def.clone(), local.clone()));
        local
    }

    /// True when no runtime symbol was used.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build one import declaration per source module, in first-use order.
    pub fn to_import_decls(&self, interner: &mut Interner) -> Vec<Statement> {
        let mut by_source: Vec<(String, Vec<(String, Identifier)>)> = Vec::new();
        for (def, local) in &self.entries {
            match by_source.iter_mut().find(|(source, _)| *source == def.source) {
                Some((_, names)) => names.push((def.name.clone(), local.clone())),
                None => by_source.push((
                    def.source.clone(),
                    vec![(def.name.clone(), local.clone())],
                )),
            }
        }

        by_source
            .into_iter()
            .map(|(source, names)| {
                let specifiers = names
                    .into_iter()
                    .map(|(name, local)| ImportSpecifier::Named {
                        name: Identifier::synthetic(interner.intern(&name)),
                        alias: Some(local),
                    })
                    .collect();
                Statement::Import(ImportDecl {
                    specifiers,
                    source: StringLiteral {
                        value: interner.intern(&source),
                        span: Span::synthetic(),
                    },
                    span: Span::synthetic(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_deduplicates() {
        let mut interner = Interner::new();
        let mut imports = RuntimeImports::new();
        let def = ImportDefinition::new("cache", "cachet/runtime");

        let first = imports.resolve(&def, &mut interner);
        let second = imports.resolve(&def, &mut interner);
        assert_eq!(first, second);
        assert_eq!(interner.resolve(first.name), "_cache");
    }

    #[test]
    fn test_import_decls_group_by_source() {
        let mut interner = Interner::new();
        let mut imports = RuntimeImports::new();
        imports.resolve(&ImportDefinition::new("cache", "cachet/runtime"), &mut interner);
        imports.resolve(&ImportDefinition::new("equals", "cachet/runtime"), &mut interner);
        imports.resolve(&ImportDefinition::new("useMemo", "react"), &mut interner);

        let decls = imports.to_import_decls(&mut interner);
        assert_eq!(decls.len(), 2);
        let Statement::Import(first) = &decls[0] else {
            panic!("expected import");
        };
        assert_eq!(first.specifiers.len(), 2);
    }
}
