//! Per-block cache state
//!
//! Scopes mirror lexical block structure and own everything the rewrite
//! needs per block: the lazily created memo/ref headers, monotonic slot
//! counters, loop identifiers, accumulated output statements, and the two
//! memo tables (optimized bindings and proven constants).
//!
//! Slot allocation for a child's branch header happens in the parent at the
//! child's finalization, so sibling order never perturbs parent indices and
//! every header ends up with contiguous slots starting at 0.

use crate::context::StateContext;
use crate::env::BindingId;
use crate::imports::RuntimeFn;
use crate::optimizer::Optimized;
use crate::synth;
use cachet_parser::ast::{Identifier, Statement};
use rustc_hash::{FxHashMap, FxHashSet};

/// Which cache a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Memo,
    Ref,
}

/// Index of a scope in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// One block's cache state.
#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub is_in_loop: bool,

    /// Memo cache header for this block, created on first slot.
    pub memo_header: Option<Identifier>,
    /// Ref cache header for this block, created on first ref slot.
    pub ref_header: Option<Identifier>,
    pub memo_index: u32,
    pub ref_index: u32,

    /// Loop-level slots array (declared in the enclosing scope).
    pub loop_memo: Option<Identifier>,
    pub loop_ref: Option<Identifier>,
    /// Loop iteration counter (declared in the enclosing scope).
    pub loop_index: Option<Identifier>,
    /// Per-iteration copy of the counter.
    pub iteration_index: Option<Identifier>,

    /// Output statements accumulated for this block.
    pub statements: Vec<Statement>,

    /// Memoized bindings, for read de-duplication.
    optimized: FxHashMap<BindingId, Optimized>,
    /// Bindings proven invariant across invocations.
    constants: FxHashSet<BindingId>,

    finalized: bool,
}

/// The lowered pieces of a loop scope.
pub struct LoopLowering {
    /// Declaration emitted before the loop in the enclosing scope.
    pub outer: Option<Statement>,
    /// Finalized loop body, per-iteration headers first.
    pub body: Vec<Statement>,
}

/// Arena of scopes for one component rewrite.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, parent: Option<ScopeId>, is_in_loop: bool) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            is_in_loop,
            ..Scope::default()
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn push_statement(&mut self, id: ScopeId, statement: Statement) {
        self.get_mut(id).statements.push(statement);
    }

    // ========================================================================
    // Memo tables
    // ========================================================================

    /// Find a memoized binding along the scope chain.
    pub fn lookup_optimized(&self, from: ScopeId, binding: BindingId) -> Option<&Optimized> {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let scope = self.get(id);
            if let Some(found) = scope.optimized.get(&binding) {
                return Some(found);
            }
            cursor = scope.parent;
        }
        None
    }

    /// Record a memoized binding in a scope.
    pub fn record_optimized(&mut self, at: ScopeId, binding: BindingId, optimized: Optimized) {
        self.get_mut(at).optimized.insert(binding, optimized);
    }

    /// Drop a binding's memo entries everywhere along the chain. Called when
    /// the binding is written: later reads re-memoize against the new value.
    pub fn invalidate(&mut self, from: ScopeId, binding: BindingId) {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let scope = self.get_mut(id);
            scope.optimized.remove(&binding);
            scope.constants.remove(&binding);
            cursor = scope.parent;
        }
    }

    /// Register a binding as holding an invariant value.
    pub fn mark_constant(&mut self, at: ScopeId, binding: BindingId) {
        self.get_mut(at).constants.insert(binding);
    }

    /// True when the binding is registered constant anywhere along the chain.
    pub fn binding_is_constant(&self, from: ScopeId, binding: BindingId) -> bool {
        let mut cursor = Some(from);
        while let Some(id) = cursor {
            let scope = self.get(id);
            if scope.constants.contains(&binding) {
                return true;
            }
            cursor = scope.parent;
        }
        false
    }

    // ========================================================================
    // Slot allocation
    // ========================================================================

    /// Allocate the next slot of a cache in a scope, creating the header
    /// identifier (and, in loops, the iteration machinery) lazily.
    pub fn alloc_slot(
        &mut self,
        id: ScopeId,
        kind: CacheKind,
        ctx: &mut StateContext,
    ) -> (Identifier, u32) {
        let is_root = self.get(id).parent.is_none();
        let scope = &mut self.scopes[id.0 as usize];
        debug_assert!(!scope.finalized, "slot allocated after finalization");

        if scope.is_in_loop && scope.iteration_index.is_none() {
            scope.loop_index = Some(ctx.fresh("li"));
            scope.iteration_index = Some(ctx.fresh("i"));
        }

        match kind {
            CacheKind::Memo => {
                if scope.memo_header.is_none() {
                    if scope.is_in_loop {
                        scope.loop_memo = Some(ctx.fresh("l"));
                        scope.memo_header = Some(ctx.fresh("b"));
                    } else if is_root {
                        scope.memo_header = Some(ctx.fresh("c"));
                    } else {
                        scope.memo_header = Some(ctx.fresh("b"));
                    }
                }
                let index = scope.memo_index;
                scope.memo_index += 1;
                (scope.memo_header.clone().unwrap(), index)
            }
            CacheKind::Ref => {
                if scope.ref_header.is_none() {
                    if scope.is_in_loop {
                        scope.loop_ref = Some(ctx.fresh("lr"));
                        scope.ref_header = Some(ctx.fresh("rb"));
                    } else if is_root {
                        scope.ref_header = Some(ctx.fresh("r"));
                    } else {
                        scope.ref_header = Some(ctx.fresh("rb"));
                    }
                }
                let index = scope.ref_index;
                scope.ref_index += 1;
                (scope.ref_header.clone().unwrap(), index)
            }
        }
    }

    // ========================================================================
    // Finalization
    // ========================================================================

    /// Finalize a non-loop scope: prepend header declarations (allocating the
    /// parent slots the branch headers hang off) and coalesce `let` runs.
    ///
    /// Must be called exactly once, while the parent is still active.
    pub fn finalize(&mut self, id: ScopeId, ctx: &mut StateContext) -> Vec<Statement> {
        let idx = id.0 as usize;
        debug_assert!(!self.scopes[idx].finalized, "scope finalized twice");
        debug_assert!(
            !self.scopes[idx].is_in_loop,
            "loop scopes finalize via finalize_loop"
        );
        self.scopes[idx].finalized = true;

        let statements = std::mem::take(&mut self.scopes[idx].statements);
        let parent = self.scopes[idx].parent;
        let memo = self.scopes[idx]
            .memo_header
            .clone()
            .map(|header| (header, self.scopes[idx].memo_index));
        let refs = self.scopes[idx]
            .ref_header
            .clone()
            .map(|header| (header, self.scopes[idx].ref_index));

        let mut out = Vec::new();
        if let Some((header, size)) = memo {
            let init = match parent {
                None => {
                    let cache_fn = ctx.runtime(RuntimeFn::Cache);
                    let hook = ctx.memo_hook();
                    synth::call(synth::ident(cache_fn), vec![synth::ident(hook), synth::int(size)])
                }
                Some(parent_id) => {
                    let (parent_header, parent_slot) =
                        self.alloc_slot(parent_id, CacheKind::Memo, ctx);
                    let branch_fn = ctx.runtime(RuntimeFn::Branch);
                    synth::call(
                        synth::ident(branch_fn),
                        vec![
                            synth::ident(parent_header),
                            synth::int(parent_slot),
                            synth::int(size),
                        ],
                    )
                }
            };
            out.push(synth::let_stmt(header, Some(init)));
        }
        if let Some((header, size)) = refs {
            let init = match parent {
                None => {
                    let ref_fn = ctx.runtime(RuntimeFn::Ref);
                    let hook = ctx.ref_hook();
                    synth::call(synth::ident(ref_fn), vec![synth::ident(hook), synth::int(size)])
                }
                Some(parent_id) => {
                    let (parent_header, parent_slot) =
                        self.alloc_slot(parent_id, CacheKind::Ref, ctx);
                    let branch_fn = ctx.runtime(RuntimeFn::Branch);
                    synth::call(
                        synth::ident(branch_fn),
                        vec![
                            synth::ident(parent_header),
                            synth::int(parent_slot),
                            synth::int(size),
                        ],
                    )
                }
            };
            out.push(synth::let_stmt(header, Some(init)));
        }

        out.extend(statements);
        synth::coalesce_lets(out)
    }

    /// Finalize a loop scope into its outer declaration and rewritten body.
    ///
    /// The enclosing scope receives `let l = branch(parent, slot, 0), li = 0;`
    /// (size 0: iteration count is dynamic); the body starts with
    /// `let i = ++li;` and a per-iteration `branch(l, i, size)` header for
    /// each cache the body used.
    pub fn finalize_loop(&mut self, id: ScopeId, ctx: &mut StateContext) -> LoopLowering {
        let idx = id.0 as usize;
        debug_assert!(!self.scopes[idx].finalized, "scope finalized twice");
        debug_assert!(self.scopes[idx].is_in_loop, "finalize_loop on non-loop scope");
        self.scopes[idx].finalized = true;

        let statements = std::mem::take(&mut self.scopes[idx].statements);
        let parent = self.scopes[idx].parent;
        let loop_memo = self.scopes[idx].loop_memo.clone();
        let loop_ref = self.scopes[idx].loop_ref.clone();
        let loop_index = self.scopes[idx].loop_index.clone();
        let iteration_index = self.scopes[idx].iteration_index.clone();
        let memo = self.scopes[idx]
            .memo_header
            .clone()
            .map(|header| (header, self.scopes[idx].memo_index));
        let refs = self.scopes[idx]
            .ref_header
            .clone()
            .map(|header| (header, self.scopes[idx].ref_index));

        if memo.is_none() && refs.is_none() {
            return LoopLowering {
                outer: None,
                body: synth::coalesce_lets(statements),
            };
        }

        let parent_id = parent.expect("loop scope has an enclosing scope");
        let branch_fn = ctx.runtime(RuntimeFn::Branch);

        let mut declarators = Vec::new();
        if let Some(header) = loop_memo.clone() {
            let (parent_header, parent_slot) = self.alloc_slot(parent_id, CacheKind::Memo, ctx);
            declarators.push((
                header,
                synth::call(
                    synth::ident(branch_fn.clone()),
                    vec![
                        synth::ident(parent_header),
                        synth::int(parent_slot),
                        synth::int(0),
                    ],
                ),
            ));
        }
        if let Some(header) = loop_ref.clone() {
            let (parent_header, parent_slot) = self.alloc_slot(parent_id, CacheKind::Ref, ctx);
            declarators.push((
                header,
                synth::call(
                    synth::ident(branch_fn.clone()),
                    vec![
                        synth::ident(parent_header),
                        synth::int(parent_slot),
                        synth::int(0),
                    ],
                ),
            ));
        }
        let loop_index = loop_index.expect("loop counter exists when headers do");
        declarators.push((loop_index.clone(), synth::int(0)));

        let iteration = iteration_index.expect("iteration index exists when headers do");
        let mut body = vec![synth::let_stmt(
            iteration.clone(),
            Some(synth::pre_increment(loop_index)),
        )];
        if let Some((header, size)) = memo {
            body.push(synth::let_stmt(
                header,
                Some(synth::call(
                    synth::ident(branch_fn.clone()),
                    vec![
                        synth::ident(loop_memo.unwrap()),
                        synth::ident(iteration.clone()),
                        synth::int(size),
                    ],
                )),
            ));
        }
        if let Some((header, size)) = refs {
            body.push(synth::let_stmt(
                header,
                Some(synth::call(
                    synth::ident(branch_fn),
                    vec![
                        synth::ident(loop_ref.unwrap()),
                        synth::ident(iteration),
                        synth::int(size),
                    ],
                )),
            ));
        }
        body.extend(statements);

        LoopLowering {
            outer: Some(synth::let_multi(declarators)),
            body: synth::coalesce_lets(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::Preset;
    use cachet_parser::ast::{Expression, Pattern, Statement, VariableKind};
    use cachet_parser::Interner;

    fn context() -> StateContext {
        StateContext::new(Interner::new(), &Preset::default())
    }

    #[test]
    fn test_slot_indices_are_contiguous_per_cache() {
        let mut ctx = context();
        let mut tree = ScopeTree::new();
        let root = tree.create(None, false);

        let (h0, i0) = tree.alloc_slot(root, CacheKind::Memo, &mut ctx);
        let (h1, i1) = tree.alloc_slot(root, CacheKind::Memo, &mut ctx);
        let (r0, j0) = tree.alloc_slot(root, CacheKind::Ref, &mut ctx);
        let (h2, i2) = tree.alloc_slot(root, CacheKind::Memo, &mut ctx);

        assert_eq!((i0, i1, i2), (0, 1, 2));
        assert_eq!(j0, 0);
        assert_eq!(h0, h1);
        assert_eq!(h1, h2);
        assert_ne!(h0, r0);
    }

    #[test]
    fn test_root_finalize_prepends_cache_declaration() {
        let mut ctx = context();
        let mut tree = ScopeTree::new();
        let root = tree.create(None, false);
        tree.alloc_slot(root, CacheKind::Memo, &mut ctx);
        tree.alloc_slot(root, CacheKind::Memo, &mut ctx);

        let statements = tree.finalize(root, &mut ctx);
        assert_eq!(statements.len(), 1);
        let Statement::VariableDecl(decl) = &statements[0] else {
            panic!("expected header declaration");
        };
        assert_eq!(decl.kind, VariableKind::Let);
        let Some(Expression::Call(call)) = &decl.declarators[0].init else {
            panic!("expected cache() call");
        };
        assert_eq!(call.arguments.len(), 2);
    }

    #[test]
    fn test_child_finalize_allocates_parent_slot() {
        let mut ctx = context();
        let mut tree = ScopeTree::new();
        let root = tree.create(None, false);
        let child = tree.create(Some(root), false);
        tree.alloc_slot(child, CacheKind::Memo, &mut ctx);

        let statements = tree.finalize(child, &mut ctx);
        assert!(!statements.is_empty());
        // The child reserved slot 0 of the root for its branch header
        assert_eq!(tree.get(root).memo_index, 1);
    }

    #[test]
    fn test_sibling_finalize_order_gives_monotonic_parent_slots() {
        let mut ctx = context();
        let mut tree = ScopeTree::new();
        let root = tree.create(None, false);
        let first = tree.create(Some(root), false);
        let second = tree.create(Some(root), false);
        tree.alloc_slot(first, CacheKind::Memo, &mut ctx);
        tree.alloc_slot(second, CacheKind::Memo, &mut ctx);

        tree.finalize(first, &mut ctx);
        assert_eq!(tree.get(root).memo_index, 1);
        tree.finalize(second, &mut ctx);
        assert_eq!(tree.get(root).memo_index, 2);
    }

    #[test]
    fn test_loop_finalize_emits_outer_declaration() {
        let mut ctx = context();
        let mut tree = ScopeTree::new();
        let root = tree.create(None, false);
        let body = tree.create(Some(root), true);
        tree.alloc_slot(body, CacheKind::Memo, &mut ctx);

        let lowering = tree.finalize_loop(body, &mut ctx);
        let Some(Statement::VariableDecl(outer)) = &lowering.outer else {
            panic!("expected outer loop declaration");
        };
        // branch array plus the iteration counter
        assert_eq!(outer.declarators.len(), 2);
        assert!(!lowering.body.is_empty());
        // Loop branch reserved a slot in the enclosing scope
        assert_eq!(tree.get(root).memo_index, 1);
    }

    #[test]
    fn test_unused_loop_scope_lowers_to_nothing() {
        let mut ctx = context();
        let mut tree = ScopeTree::new();
        let root = tree.create(None, false);
        let body = tree.create(Some(root), true);
        tree.push_statement(
            body,
            Statement::Empty(cachet_parser::Span::synthetic()),
        );

        let lowering = tree.finalize_loop(body, &mut ctx);
        assert!(lowering.outer.is_none());
        assert_eq!(lowering.body.len(), 1);
        assert_eq!(tree.get(root).memo_index, 0);
    }

    #[test]
    fn test_invalidate_removes_binding_along_chain() {
        let mut ctx = context();
        let mut tree = ScopeTree::new();
        let root = tree.create(None, false);
        let child = tree.create(Some(root), false);

        let name = ctx.interner.intern("x");
        let mut env = crate::env::Env::new();
        env.push_frame();
        let binding = env.declare(name);

        tree.record_optimized(
            root,
            binding,
            crate::optimizer::Optimized::constant(Expression::Identifier(
                cachet_parser::ast::Identifier::synthetic(name),
            )),
        );
        tree.mark_constant(root, binding);
        assert!(tree.lookup_optimized(child, binding).is_some());
        assert!(tree.binding_is_constant(child, binding));

        tree.invalidate(child, binding);
        assert!(tree.lookup_optimized(child, binding).is_none());
        assert!(!tree.binding_is_constant(child, binding));
    }

    #[test]
    fn test_let_coalescing_on_finalize() {
        let mut ctx = context();
        let mut tree = ScopeTree::new();
        let root = tree.create(None, false);
        let a = ctx.fresh("v");
        let b = ctx.fresh("v");
        tree.push_statement(root, crate::synth::let_stmt(a, None));
        tree.push_statement(root, crate::synth::let_stmt(b, None));

        let statements = tree.finalize(root, &mut ctx);
        assert_eq!(statements.len(), 1);
        let Statement::VariableDecl(decl) = &statements[0] else {
            panic!("expected coalesced let");
        };
        assert_eq!(decl.declarators.len(), 2);
        assert!(matches!(decl.declarators[0].pattern, Pattern::Identifier(_)));
    }
}
