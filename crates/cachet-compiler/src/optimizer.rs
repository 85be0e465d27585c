//! The memoization optimizer
//!
//! Recursive descent over a component body. Every expression walk returns an
//! [`Optimized`]: the replacement expression, the dependency guards that
//! decide when it must be recomputed, and a constant flag. Cache reads and
//! writes are installed as `let` declarations in the current [`Scope`];
//! statements that fork control flow get child scopes whose finalized bodies
//! are spliced back in, so every slot is written exactly once per invocation
//! along any executed path.
//!
//! [`Scope`]: crate::scope::Scope

use crate::analyzer::{AnalyzerCx, ExprAnalyzer};
use crate::captures;
use crate::context::StateContext;
use crate::env::Env;
use crate::error::CompileError;
use crate::imports::RuntimeFn;
use crate::preset::HookKind;
use crate::scope::{CacheKind, LoopLowering, ScopeId, ScopeTree};
use crate::synth;
use cachet_parser::ast::*;
use cachet_parser::Span;
use rustc_hash::FxHashSet;

/// The result of optimizing one expression.
#[derive(Debug, Clone)]
pub struct Optimized {
    /// Replacement expression for the original node
    pub expr: Expression,
    /// Dependency guards; empty means the value is its own guard (or none)
    pub deps: Vec<Expression>,
    /// Proven invariant across invocations
    pub constant: bool,
}

impl Optimized {
    pub fn constant(expr: Expression) -> Self {
        Self {
            expr,
            deps: Vec::new(),
            constant: true,
        }
    }
}

/// How a memo slot's guard is derived.
#[derive(Debug)]
pub enum MemoDeps {
    /// Write once, read forever: `(i in h) ? h[i] : (h[i] = expr)`
    OneTime,
    /// The value guards itself: `equals(h, i, value)`
    Auto,
    /// AND-fold of dependency guards
    Exprs(Vec<Expression>),
}

/// Identity-producing aggregates take a one-time host when nothing guards
/// them; everything else equality-guards its own value.
fn aggregate_deps(deps: Vec<Expression>) -> MemoDeps {
    if deps.is_empty() {
        MemoDeps::OneTime
    } else {
        MemoDeps::Exprs(deps)
    }
}

/// Constant expressions that still need a cache slot: their evaluation mints
/// a fresh identity every time, which would defeat downstream guards.
fn requires_memo_host(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::Array(_)
            | Expression::Object(_)
            | Expression::Function(_)
            | Expression::Arrow(_)
            | Expression::New(_)
    )
}

/// The optimizer for one component.
pub struct Optimizer<'ctx> {
    ctx: &'ctx mut StateContext,
    scopes: ScopeTree,
    env: Env,
    analyzer: ExprAnalyzer,
    current: ScopeId,
}

impl<'ctx> Optimizer<'ctx> {
    pub fn new(ctx: &'ctx mut StateContext) -> Self {
        let mut scopes = ScopeTree::new();
        let root = scopes.create(None, false);
        let mut env = Env::new();
        env.push_frame();
        Self {
            ctx,
            scopes,
            env,
            analyzer: ExprAnalyzer::new(),
            current: root,
        }
    }

    /// Rewrite a component function. On error the caller keeps the original.
    pub fn optimize_component(mut self, func: FunctionDecl) -> Result<FunctionDecl, CompileError> {
        for param in &func.params {
            self.declare_pattern(&param.pattern);
        }
        let FunctionDecl {
            name,
            params,
            return_type,
            body,
            is_async,
            span,
        } = func;
        let body_span = body.span;
        for statement in body.statements {
            self.optimize_statement(statement)?;
        }
        let statements = self.scopes.finalize(self.current, self.ctx);
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body: BlockStatement {
                statements,
                span: body_span,
            },
            is_async,
            span,
        })
    }

    /// Rewrite an arrow component (`const View = (props) => ...`).
    pub fn optimize_arrow(mut self, arrow: ArrowFunction) -> Result<ArrowFunction, CompileError> {
        for param in &arrow.params {
            self.declare_pattern(&param.pattern);
        }
        let ArrowFunction {
            params,
            return_type,
            body,
            is_async,
            span,
        } = arrow;
        match body {
            ArrowBody::Block(block) => {
                let body_span = block.span;
                for statement in block.statements {
                    self.optimize_statement(statement)?;
                }
                let statements = self.scopes.finalize(self.current, self.ctx);
                Ok(ArrowFunction {
                    params,
                    return_type,
                    body: ArrowBody::Block(BlockStatement {
                        statements,
                        span: body_span,
                    }),
                    is_async,
                    span,
                })
            }
            ArrowBody::Expression(value) => {
                let optimized = self.optimize_expression(*value)?;
                let optimized = self.memoize_result(optimized)?;
                self.emit(Statement::Return(ReturnStatement {
                    value: Some(optimized.expr),
                    span: Span::synthetic(),
                }));
                let statements = self.scopes.finalize(self.current, self.ctx);
                Ok(ArrowFunction {
                    params,
                    return_type,
                    body: ArrowBody::Block(synth::block(statements)),
                    is_async,
                    span,
                })
            }
        }
    }

    // ========================================================================
    // Scope & environment plumbing
    // ========================================================================

    fn emit(&mut self, statement: Statement) {
        self.scopes.push_statement(self.current, statement);
    }

    fn enter_scope(&mut self, is_loop: bool) -> ScopeId {
        let child = self.scopes.create(Some(self.current), is_loop);
        self.env.push_frame();
        let previous = self.current;
        self.current = child;
        previous
    }

    fn exit_scope(&mut self, previous: ScopeId) -> ScopeId {
        debug_assert!(self.env.depth() > 1, "root frame popped");
        let finished = self.current;
        self.env.pop_frame();
        self.current = previous;
        finished
    }

    fn declare_pattern(&mut self, pattern: &Pattern) {
        let mut ids = Vec::new();
        pattern.bindings(&mut ids);
        let names: Vec<_> = ids.iter().map(|id| id.name).collect();
        for name in names {
            self.env.declare(name);
        }
    }

    fn declare_fresh(&mut self, prefix: &str) -> (Identifier, crate::env::BindingId) {
        let id = self.ctx.fresh(prefix);
        let binding = self.env.declare(id.name);
        (id, binding)
    }

    fn expr_is_constant(&mut self, expr: &Expression) -> bool {
        let cx = AnalyzerCx {
            scopes: &self.scopes,
            current: self.current,
            env: &self.env,
            preset: &self.ctx.preset,
            interner: &self.ctx.interner,
        };
        self.analyzer.is_constant(expr, &cx)
    }

    // ========================================================================
    // createMemo
    // ========================================================================

    /// Install a cache slot for `expr` guarded per `deps`, and return the
    /// fresh value identifier standing in for it.
    fn create_memo(
        &mut self,
        expr: Expression,
        deps: MemoDeps,
        kind: CacheKind,
    ) -> Result<Optimized, CompileError> {
        let original = expr.as_identifier().map(|id| id.name);
        let deps = match deps {
            MemoDeps::Exprs(list) if list.is_empty() => MemoDeps::Auto,
            other => other,
        };

        let (header, index) = self.scopes.alloc_slot(self.current, kind, self.ctx);
        let (value_id, value_binding) = self.declare_fresh("v");

        let result = match deps {
            MemoDeps::OneTime => {
                // let v = i in h ? h[i] : (h[i] = expr);
                let test = synth::binary(
                    BinaryOperator::In,
                    synth::int(index),
                    synth::ident(header.clone()),
                );
                let init = synth::conditional(
                    test,
                    synth::slot(header.clone(), index),
                    synth::assign(synth::slot(header, index), expr),
                );
                self.emit(synth::let_stmt(value_id.clone(), Some(init)));
                self.scopes.mark_constant(self.current, value_binding);
                Optimized::constant(synth::ident(value_id))
            }
            MemoDeps::Auto => {
                // Bind non-identifier inputs first so the value is computed
                // exactly once per invocation.
                let source = match expr {
                    id @ Expression::Identifier(_) => id,
                    other => {
                        let (tmp, _) = self.declare_fresh("t");
                        self.emit(synth::let_stmt(tmp.clone(), Some(other)));
                        synth::ident(tmp)
                    }
                };
                let equals_fn = self.ctx.runtime(RuntimeFn::Equals);
                let guard = synth::call(
                    synth::ident(equals_fn),
                    vec![
                        synth::ident(header.clone()),
                        synth::int(index),
                        source.clone(),
                    ],
                );
                let (eq_id, _) = self.declare_fresh("eq");
                self.emit(synth::let_stmt(eq_id.clone(), Some(guard)));
                let init = synth::conditional(
                    synth::ident(eq_id.clone()),
                    synth::slot(header.clone(), index),
                    synth::assign(synth::slot(header, index), source),
                );
                self.emit(synth::let_stmt(value_id.clone(), Some(init)));
                Optimized {
                    expr: synth::ident(value_id),
                    deps: vec![synth::ident(eq_id)],
                    constant: false,
                }
            }
            MemoDeps::Exprs(list) => {
                let guard = self.fold_dependencies(list);
                let guard_id = match guard {
                    Expression::Identifier(id) => id,
                    complex => {
                        let (eq_id, _) = self.declare_fresh("eq");
                        self.emit(synth::let_stmt(eq_id.clone(), Some(complex)));
                        eq_id
                    }
                };
                let init = synth::conditional(
                    synth::ident(guard_id.clone()),
                    synth::slot(header.clone(), index),
                    synth::assign(synth::slot(header, index), expr),
                );
                self.emit(synth::let_stmt(value_id.clone(), Some(init)));
                Optimized {
                    expr: synth::ident(value_id),
                    deps: vec![synth::ident(guard_id)],
                    constant: false,
                }
            }
        };

        // De-duplicate later reads: the original binding (when the input was
        // an identifier) and the fresh value id both map to this result.
        if let Some(name) = original {
            if let Some(binding) = self.env.resolve(name) {
                self.scopes
                    .record_optimized(self.current, binding, result.clone());
            }
        }
        self.scopes
            .record_optimized(self.current, value_binding, result.clone());

        Ok(result)
    }

    /// AND-fold dependency guards left-to-right, skipping duplicate
    /// identifiers (fresh guard names are unique, so symbol equality is
    /// binding identity here).
    fn fold_dependencies(&mut self, deps: Vec<Expression>) -> Expression {
        let mut seen: FxHashSet<cachet_parser::Symbol> = FxHashSet::default();
        let mut folded: Option<Expression> = None;
        for dep in deps {
            if let Expression::Identifier(id) = &dep {
                if !seen.insert(id.name) {
                    continue;
                }
            }
            folded = Some(match folded {
                None => dep,
                Some(acc) => synth::logical(LogicalOperator::And, acc, dep),
            });
        }
        folded.expect("dependency list cannot dedupe to empty")
    }

    /// Optimize and, when the result has no guard yet, memoize it so it can
    /// serve as a dependency of an enclosing expression.
    fn create_dependency(&mut self, expr: Expression) -> Result<Optimized, CompileError> {
        let optimized = self.optimize_expression(expr)?;
        if optimized.constant || !optimized.deps.is_empty() {
            return Ok(optimized);
        }
        match optimized.expr {
            id @ Expression::Identifier(_) => self.optimize_expression(id),
            other => self.create_memo(other, MemoDeps::Auto, CacheKind::Memo),
        }
    }

    /// Wrap a finished result in one more memo keyed by its own deps
    /// (returned and thrown values hold the downstream-visible slot).
    fn memoize_result(&mut self, optimized: Optimized) -> Result<Optimized, CompileError> {
        if optimized.constant {
            return Ok(optimized);
        }
        let deps = if optimized.deps.is_empty() {
            MemoDeps::Auto
        } else {
            MemoDeps::Exprs(optimized.deps)
        };
        self.create_memo(optimized.expr, deps, CacheKind::Memo)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn optimize_expression(&mut self, expr: Expression) -> Result<Optimized, CompileError> {
        if self.expr_is_constant(&expr) {
            if requires_memo_host(&expr) {
                return self.create_memo(expr, MemoDeps::OneTime, CacheKind::Memo);
            }
            return Ok(Optimized::constant(expr));
        }

        match expr {
            Expression::Paren(paren) => self.optimize_expression(*paren.expression),
            Expression::TypeCast(cast) => self.optimize_expression(*cast.expression),
            Expression::Identifier(id) => self.optimize_identifier(id),
            expr @ (Expression::Member(_) | Expression::Index(_)) => {
                let (rebuilt, deps) = self.memoize_member(expr)?;
                self.create_memo(rebuilt, MemoDeps::Exprs(deps), CacheKind::Memo)
            }
            Expression::Conditional(conditional) => self.optimize_conditional(conditional),
            Expression::Logical(logical) => self.optimize_logical(logical),
            Expression::Binary(binary) => self.optimize_binary(binary),
            Expression::Unary(unary) => self.optimize_unary(unary),
            Expression::Update(update) => self.optimize_update(update),
            Expression::Call(call) => self.optimize_call(call),
            Expression::New(new) => self.optimize_new(new),
            expr @ (Expression::Function(_) | Expression::Arrow(_)) => {
                self.optimize_function_expression(expr)
            }
            Expression::Assignment(assignment) => self.optimize_assignment(assignment),
            Expression::Array(array) => self.optimize_array(array),
            Expression::Object(object) => self.optimize_object(object),
            Expression::Sequence(sequence) => self.optimize_sequence(sequence),
            Expression::TaggedTemplate(tagged) => self.optimize_tagged_template(tagged),
            Expression::Template(template) => self.optimize_template(template),
            expr @ (Expression::JsxElement(_) | Expression::JsxFragment(_)) => {
                self.optimize_jsx(expr)
            }
            Expression::Await(await_expr) => {
                let argument = self.create_dependency(*await_expr.argument)?;
                let deps = argument.deps.clone();
                Ok(Optimized {
                    expr: Expression::Await(AwaitExpression {
                        argument: Box::new(argument.expr),
                        span: await_expr.span,
                    }),
                    deps,
                    constant: false,
                })
            }
            // Anything unrecognized is left untouched and treated invariant
            other => Ok(Optimized::constant(other)),
        }
    }

    fn optimize_identifier(&mut self, id: Identifier) -> Result<Optimized, CompileError> {
        match self.env.resolve(id.name) {
            // Foreign binding or global
            None => Ok(Optimized::constant(Expression::Identifier(id))),
            Some(binding) => {
                if let Some(found) = self.scopes.lookup_optimized(self.current, binding) {
                    return Ok(found.clone());
                }
                self.create_memo(
                    Expression::Identifier(id),
                    MemoDeps::Auto,
                    CacheKind::Memo,
                )
            }
        }
    }

    /// Memoize a member/index aggregate: the receiver (and computed key)
    /// become dependencies; the access itself is rebuilt around them.
    fn memoize_member(
        &mut self,
        expr: Expression,
    ) -> Result<(Expression, Vec<Expression>), CompileError> {
        match expr {
            Expression::Member(member) => {
                let object = self.create_dependency(*member.object)?;
                let deps = object.deps.clone();
                Ok((
                    Expression::Member(MemberExpression {
                        object: Box::new(object.expr),
                        property: member.property,
                        optional: member.optional,
                        span: member.span,
                    }),
                    deps,
                ))
            }
            Expression::Index(index) => {
                let object = self.create_dependency(*index.object)?;
                let mut deps = object.deps.clone();
                let key = self.create_dependency(*index.index)?;
                deps.extend(key.deps.clone());
                Ok((
                    Expression::Index(IndexExpression {
                        object: Box::new(object.expr),
                        index: Box::new(key.expr),
                        span: index.span,
                    }),
                    deps,
                ))
            }
            other => {
                let optimized = self.create_dependency(other)?;
                let deps = optimized.deps.clone();
                Ok((optimized.expr, deps))
            }
        }
    }

    /// Lower `t ? a : b` to an if/else over a fresh result binding, with a
    /// branch scope per arm. The result is opaque to callers.
    fn optimize_conditional(
        &mut self,
        conditional: ConditionalExpression,
    ) -> Result<Optimized, CompileError> {
        let test = self.optimize_expression(*conditional.test)?;
        let (result_id, _) = self.declare_fresh("v");
        self.emit(synth::let_stmt(result_id.clone(), None));

        let previous = self.enter_scope(false);
        let consequent = self.optimize_expression(*conditional.consequent)?;
        self.emit(synth::expr_stmt(synth::assign(
            synth::ident(result_id.clone()),
            consequent.expr,
        )));
        let scope = self.exit_scope(previous);
        let then_statements = self.scopes.finalize(scope, self.ctx);

        let previous = self.enter_scope(false);
        let alternate = self.optimize_expression(*conditional.alternate)?;
        self.emit(synth::expr_stmt(synth::assign(
            synth::ident(result_id.clone()),
            alternate.expr,
        )));
        let scope = self.exit_scope(previous);
        let else_statements = self.scopes.finalize(scope, self.ctx);

        self.emit(synth::if_stmt(
            test.expr,
            then_statements,
            Some(else_statements),
        ));
        Ok(Optimized {
            expr: synth::ident(result_id),
            deps: Vec::new(),
            constant: false,
        })
    }

    /// For `&&`, `||`, and `??`: evaluate the left eagerly, the right
    /// in a guarded branch scope, preserving short-circuit order.
    fn optimize_logical(&mut self, logical: LogicalExpression) -> Result<Optimized, CompileError> {
        let left = self.optimize_expression(*logical.left)?;
        let (result_id, _) = self.declare_fresh("v");
        self.emit(synth::let_stmt(result_id.clone(), Some(left.expr)));

        let previous = self.enter_scope(false);
        let right = self.optimize_expression(*logical.right)?;
        self.emit(synth::expr_stmt(synth::assign(
            synth::ident(result_id.clone()),
            right.expr,
        )));
        let scope = self.exit_scope(previous);
        let branch_statements = self.scopes.finalize(scope, self.ctx);

        let test = match logical.operator {
            LogicalOperator::Or => synth::not(synth::ident(result_id.clone())),
            LogicalOperator::NullishCoalescing => synth::binary(
                BinaryOperator::Equal,
                synth::ident(result_id.clone()),
                synth::null(),
            ),
            LogicalOperator::And => synth::ident(result_id.clone()),
        };
        self.emit(synth::if_stmt(test, branch_statements, None));
        Ok(Optimized {
            expr: synth::ident(result_id),
            deps: Vec::new(),
            constant: false,
        })
    }

    fn optimize_binary(&mut self, binary: BinaryExpression) -> Result<Optimized, CompileError> {
        // The pipeline operator passes through unmodified
        if binary.operator == BinaryOperator::Pipeline {
            return Ok(Optimized {
                expr: Expression::Binary(binary),
                deps: Vec::new(),
                constant: false,
            });
        }

        let left = self.create_dependency(*binary.left)?;
        let right = self.create_dependency(*binary.right)?;
        let mut deps = left.deps.clone();
        deps.extend(right.deps.clone());
        let rebuilt = Expression::Binary(BinaryExpression {
            operator: binary.operator,
            left: Box::new(left.expr),
            right: Box::new(right.expr),
            span: binary.span,
        });
        self.create_memo(rebuilt, MemoDeps::Exprs(deps), CacheKind::Memo)
    }

    fn optimize_unary(&mut self, unary: UnaryExpression) -> Result<Optimized, CompileError> {
        // delete writes its operand; treat it like an assignment
        if unary.operator == UnaryOperator::Delete {
            let (target, deps) = self.optimize_lval(*unary.operand, true)?;
            return Ok(Optimized {
                expr: Expression::Unary(UnaryExpression {
                    operator: UnaryOperator::Delete,
                    operand: Box::new(target),
                    span: unary.span,
                }),
                deps,
                constant: false,
            });
        }

        let operand = self.create_dependency(*unary.operand)?;
        let rebuilt = Expression::Unary(UnaryExpression {
            operator: unary.operator,
            operand: Box::new(operand.expr),
            span: unary.span,
        });
        if operand.constant {
            return Ok(Optimized::constant(rebuilt));
        }
        let deps = operand.deps.clone();
        self.create_memo(rebuilt, MemoDeps::Exprs(deps), CacheKind::Memo)
    }

    fn optimize_update(&mut self, update: UpdateExpression) -> Result<Optimized, CompileError> {
        let (target, deps) = self.optimize_lval(*update.argument, true)?;
        Ok(Optimized {
            expr: Expression::Update(UpdateExpression {
                operator: update.operator,
                prefix: update.prefix,
                argument: Box::new(target),
                span: update.span,
            }),
            deps,
            constant: false,
        })
    }

    fn optimize_assignment(
        &mut self,
        assignment: AssignmentExpression,
    ) -> Result<Optimized, CompileError> {
        let (left, mut deps) = self.optimize_lval(*assignment.left, true)?;
        let right = self.create_dependency(*assignment.right)?;
        deps.extend(right.deps.clone());
        Ok(Optimized {
            expr: Expression::Assignment(AssignmentExpression {
                operator: assignment.operator,
                left: Box::new(left),
                right: Box::new(right.expr),
                span: assignment.span,
            }),
            deps,
            constant: false,
        })
    }

    /// Rewrite an assignment target. `dirty` invalidates identifier bindings
    /// so later reads re-memoize against the new value. Destructuring
    /// targets pass through without invalidation.
    fn optimize_lval(
        &mut self,
        expr: Expression,
        dirty: bool,
    ) -> Result<(Expression, Vec<Expression>), CompileError> {
        match expr {
            Expression::Identifier(id) => {
                if dirty {
                    if let Some(binding) = self.env.resolve(id.name) {
                        self.scopes.invalidate(self.current, binding);
                    }
                }
                Ok((Expression::Identifier(id), Vec::new()))
            }
            expr @ (Expression::Member(_) | Expression::Index(_)) => self.memoize_member(expr),
            expr @ (Expression::Array(_) | Expression::Object(_)) => Ok((expr, Vec::new())),
            Expression::Paren(paren) => self.optimize_lval(*paren.expression, dirty),
            other => Err(CompileError::UnsupportedAssignmentTarget {
                span: *other.span(),
            }),
        }
    }

    fn optimize_array(&mut self, array: ArrayExpression) -> Result<Optimized, CompileError> {
        let mut deps = Vec::new();
        let mut elements = Vec::with_capacity(array.elements.len());
        for element in array.elements {
            elements.push(match element {
                Some(ArrayElement::Expression(expr)) => {
                    let optimized = self.create_dependency(expr)?;
                    deps.extend(optimized.deps.clone());
                    Some(ArrayElement::Expression(optimized.expr))
                }
                Some(ArrayElement::Spread(expr)) => {
                    let optimized = self.create_dependency(expr)?;
                    deps.extend(optimized.deps.clone());
                    Some(ArrayElement::Spread(optimized.expr))
                }
                None => None,
            });
        }
        let rebuilt = Expression::Array(ArrayExpression {
            elements,
            span: array.span,
        });
        self.create_memo(rebuilt, aggregate_deps(deps), CacheKind::Memo)
    }

    fn optimize_object(&mut self, object: ObjectExpression) -> Result<Optimized, CompileError> {
        let mut deps = Vec::new();
        let mut properties = Vec::with_capacity(object.properties.len());
        for property in object.properties {
            properties.push(match property {
                ObjectProperty::Property(prop) => {
                    let key = self.optimize_property_key(prop.key, &mut deps)?;
                    let value = self.create_dependency(prop.value)?;
                    deps.extend(value.deps.clone());
                    ObjectProperty::Property(Property {
                        key,
                        value: value.expr,
                        shorthand: false,
                        span: prop.span,
                    })
                }
                ObjectProperty::Method(method) => {
                    let ObjectMethod {
                        key,
                        params,
                        body,
                        is_async,
                        span,
                    } = method;
                    let key = self.optimize_property_key(key, &mut deps)?;
                    let analysis =
                        captures::analyze_params_body(&params, &body, &self.ctx.interner);
                    for name in analysis.free {
                        if self.env.resolve(name).is_some() {
                            let read = self.optimize_expression(Expression::Identifier(
                                Identifier::synthetic(name),
                            ))?;
                            deps.extend(read.deps.clone());
                        }
                    }
                    ObjectProperty::Method(ObjectMethod {
                        key,
                        params,
                        body,
                        is_async,
                        span,
                    })
                }
                ObjectProperty::Spread(spread) => {
                    let argument = self.create_dependency(spread.argument)?;
                    deps.extend(argument.deps.clone());
                    ObjectProperty::Spread(SpreadProperty {
                        argument: argument.expr,
                        span: spread.span,
                    })
                }
            });
        }
        let rebuilt = Expression::Object(ObjectExpression {
            properties,
            span: object.span,
        });
        self.create_memo(rebuilt, aggregate_deps(deps), CacheKind::Memo)
    }

    fn optimize_property_key(
        &mut self,
        key: PropertyKey,
        deps: &mut Vec<Expression>,
    ) -> Result<PropertyKey, CompileError> {
        Ok(match key {
            PropertyKey::Computed(expr) => {
                let optimized = self.create_dependency(expr)?;
                deps.extend(optimized.deps.clone());
                PropertyKey::Computed(optimized.expr)
            }
            other => other,
        })
    }

    fn optimize_sequence(&mut self, sequence: SequenceExpression) -> Result<Optimized, CompileError> {
        let mut expressions = Vec::with_capacity(sequence.expressions.len());
        for expr in sequence.expressions {
            expressions.push(self.optimize_expression(expr)?.expr);
        }
        Ok(Optimized {
            expr: Expression::Sequence(SequenceExpression {
                expressions,
                span: sequence.span,
            }),
            deps: Vec::new(),
            constant: false,
        })
    }

    fn optimize_template(&mut self, template: TemplateLiteral) -> Result<Optimized, CompileError> {
        let mut deps = Vec::new();
        let mut parts = Vec::with_capacity(template.parts.len());
        for part in template.parts {
            parts.push(match part {
                TemplatePart::Expression(expr) => {
                    let optimized = self.create_dependency(*expr)?;
                    deps.extend(optimized.deps.clone());
                    TemplatePart::Expression(Box::new(optimized.expr))
                }
                text => text,
            });
        }
        let rebuilt = Expression::Template(TemplateLiteral {
            parts,
            span: template.span,
        });
        self.create_memo(rebuilt, MemoDeps::Exprs(deps), CacheKind::Memo)
    }

    fn optimize_tagged_template(
        &mut self,
        tagged: TaggedTemplateExpression,
    ) -> Result<Optimized, CompileError> {
        let mut deps = Vec::new();
        let tag = self.optimize_callee(*tagged.tag, &mut deps)?;
        let mut parts = Vec::with_capacity(tagged.quasi.parts.len());
        for part in tagged.quasi.parts {
            parts.push(match part {
                TemplatePart::Expression(expr) => {
                    let optimized = self.create_dependency(*expr)?;
                    deps.extend(optimized.deps.clone());
                    TemplatePart::Expression(Box::new(optimized.expr))
                }
                text => text,
            });
        }
        let rebuilt = Expression::TaggedTemplate(TaggedTemplateExpression {
            tag: Box::new(tag),
            quasi: TemplateLiteral {
                parts,
                span: tagged.quasi.span,
            },
            span: tagged.span,
        });
        self.create_memo(rebuilt, MemoDeps::Exprs(deps), CacheKind::Memo)
    }

    fn optimize_function_expression(
        &mut self,
        expr: Expression,
    ) -> Result<Optimized, CompileError> {
        let analysis = captures::analyze_function(&expr, &self.ctx.interner);
        let mut deps = Vec::new();
        for name in analysis.free {
            if self.env.resolve(name).is_some() {
                let read = self
                    .optimize_expression(Expression::Identifier(Identifier::synthetic(name)))?;
                deps.extend(read.deps.clone());
            }
        }
        self.create_memo(expr, aggregate_deps(deps), CacheKind::Memo)
    }

    // ========================================================================
    // Calls & hooks
    // ========================================================================

    fn optimize_call(&mut self, call: CallExpression) -> Result<Optimized, CompileError> {
        match ExprAnalyzer::classify_hook_call(&call, &self.ctx.preset, &self.ctx.interner) {
            Some(HookKind::Memo) => self.optimize_hook_memo(call),
            Some(HookKind::Callback) => self.optimize_hook_callback(call),
            Some(HookKind::Ref) => self.optimize_hook_ref(call),
            Some(HookKind::Effect) => self.optimize_hook_effect(call),
            Some(HookKind::Custom) => self.optimize_hook_custom(call),
            Some(HookKind::Skip) | None => self.optimize_plain_call(call),
        }
    }

    /// Member callees keep their receiver binding: the object is memoized as
    /// a dependency while the method read stays in call position.
    fn optimize_callee(
        &mut self,
        callee: Expression,
        deps: &mut Vec<Expression>,
    ) -> Result<Expression, CompileError> {
        match callee {
            expr @ (Expression::Member(_) | Expression::Index(_)) => {
                let (rebuilt, callee_deps) = self.memoize_member(expr)?;
                deps.extend(callee_deps);
                Ok(rebuilt)
            }
            other => {
                let optimized = self.create_dependency(other)?;
                deps.extend(optimized.deps.clone());
                Ok(optimized.expr)
            }
        }
    }

    fn optimize_arguments(
        &mut self,
        arguments: Vec<Argument>,
        deps: &mut Vec<Expression>,
    ) -> Result<Vec<Argument>, CompileError> {
        let mut out = Vec::with_capacity(arguments.len());
        for argument in arguments {
            out.push(match argument {
                Argument::Expression(expr) => {
                    let optimized = self.create_dependency(expr)?;
                    deps.extend(optimized.deps.clone());
                    Argument::Expression(optimized.expr)
                }
                Argument::Spread(spread) => {
                    let optimized = self.create_dependency(spread.argument)?;
                    deps.extend(optimized.deps.clone());
                    Argument::Spread(SpreadElement {
                        argument: optimized.expr,
                        span: spread.span,
                    })
                }
            });
        }
        Ok(out)
    }

    fn optimize_plain_call(&mut self, call: CallExpression) -> Result<Optimized, CompileError> {
        let mut deps = Vec::new();
        let callee = self.optimize_callee(*call.callee, &mut deps)?;
        let arguments = self.optimize_arguments(call.arguments, &mut deps)?;
        let rebuilt = Expression::Call(CallExpression {
            callee: Box::new(callee),
            arguments,
            optional: call.optional,
            span: call.span,
        });
        self.create_memo(rebuilt, MemoDeps::Exprs(deps), CacheKind::Memo)
    }

    fn optimize_new(&mut self, new: NewExpression) -> Result<Optimized, CompileError> {
        let mut deps = Vec::new();
        let callee = self.optimize_callee(*new.callee, &mut deps)?;
        let arguments = self.optimize_arguments(new.arguments, &mut deps)?;
        let rebuilt = Expression::New(NewExpression {
            callee: Box::new(callee),
            arguments,
            span: new.span,
        });
        self.create_memo(rebuilt, aggregate_deps(deps), CacheKind::Memo)
    }

    fn optimize_hook_memo(&mut self, call: CallExpression) -> Result<Optimized, CompileError> {
        let hook = self.hook_name(&call);
        let span = call.span;
        let mut arguments = call.arguments.into_iter();
        let callback = match arguments.next() {
            Some(Argument::Expression(expr)) => expr,
            Some(Argument::Spread(spread)) => {
                return Err(CompileError::InvalidHookArgument {
                    hook,
                    span: spread.span,
                })
            }
            None => return Err(CompileError::InvalidHookArgument { hook, span }),
        };

        match arguments.next() {
            Some(Argument::Expression(dep_arg)) => {
                let deps = self.extract_hook_deps(dep_arg)?;
                let invoked = call_expression(callback);
                self.create_memo(invoked, deps, CacheKind::Memo)
            }
            Some(Argument::Spread(spread)) => Err(CompileError::InvalidHookArgument {
                hook,
                span: spread.span,
            }),
            None => {
                let optimized = self.optimize_expression(callback)?;
                let deps = if optimized.constant {
                    MemoDeps::OneTime
                } else {
                    MemoDeps::Exprs(optimized.deps.clone())
                };
                let invoked = call_expression(optimized.expr);
                self.create_memo(invoked, deps, CacheKind::Memo)
            }
        }
    }

    fn optimize_hook_callback(&mut self, call: CallExpression) -> Result<Optimized, CompileError> {
        let hook = self.hook_name(&call);
        let span = call.span;
        let mut arguments = call.arguments.into_iter();
        let callback = match arguments.next() {
            Some(Argument::Expression(expr)) => expr,
            Some(Argument::Spread(spread)) => {
                return Err(CompileError::InvalidHookArgument {
                    hook,
                    span: spread.span,
                })
            }
            None => return Err(CompileError::InvalidHookArgument { hook, span }),
        };

        match arguments.next() {
            Some(Argument::Expression(dep_arg)) => {
                let deps = self.extract_hook_deps(dep_arg)?;
                self.create_memo(callback, deps, CacheKind::Memo)
            }
            Some(Argument::Spread(spread)) => Err(CompileError::InvalidHookArgument {
                hook,
                span: spread.span,
            }),
            // Closure analysis already supplies the dependencies
            None => self.optimize_expression(callback),
        }
    }

    fn optimize_hook_ref(&mut self, call: CallExpression) -> Result<Optimized, CompileError> {
        let init = match call.arguments.into_iter().next() {
            None => None,
            Some(Argument::Expression(expr)) => Some(expr),
            Some(Argument::Spread(spread)) => Some(Expression::Index(IndexExpression {
                object: Box::new(spread.argument),
                index: Box::new(synth::int(0)),
                span: spread.span,
            })),
        };
        let current_value = match init {
            Some(expr) => synth::logical(
                LogicalOperator::NullishCoalescing,
                expr,
                synth::void_zero(),
            ),
            None => synth::void_zero(),
        };
        let current_key = Identifier::synthetic(self.ctx.interner.intern("current"));
        let cell = Expression::Object(ObjectExpression {
            properties: vec![ObjectProperty::Property(Property {
                key: PropertyKey::Identifier(current_key),
                value: current_value,
                shorthand: false,
                span: Span::synthetic(),
            })],
            span: Span::synthetic(),
        });
        self.create_memo(cell, MemoDeps::OneTime, CacheKind::Ref)
    }

    /// Effects are never cached; their second argument is normalized to an
    /// array holding the memoized dependency value, so the scheduler re-runs
    /// the effect exactly when the inputs change identity.
    fn optimize_hook_effect(&mut self, call: CallExpression) -> Result<Optimized, CompileError> {
        let hook = self.hook_name(&call);
        let span = call.span;
        let callee = call.callee;
        let mut arguments = call.arguments.into_iter();
        let callback = match arguments.next() {
            Some(Argument::Expression(expr)) => expr,
            Some(Argument::Spread(spread)) => {
                return Err(CompileError::InvalidHookArgument {
                    hook,
                    span: spread.span,
                })
            }
            None => return Err(CompileError::InvalidHookArgument { hook, span }),
        };

        let (first, dep_value, deps) = match arguments.next() {
            Some(Argument::Expression(dep_arg)) => {
                let optimized = self.optimize_expression(dep_arg)?;
                (callback, optimized.expr, optimized.deps)
            }
            Some(Argument::Spread(spread)) => {
                return Err(CompileError::InvalidHookArgument {
                    hook,
                    span: spread.span,
                })
            }
            None => {
                let optimized = self.optimize_expression(callback)?;
                (optimized.expr.clone(), optimized.expr, optimized.deps)
            }
        };

        let dep_array = Expression::Array(ArrayExpression {
            elements: vec![Some(ArrayElement::Expression(dep_value))],
            span: Span::synthetic(),
        });
        Ok(Optimized {
            expr: Expression::Call(CallExpression {
                callee,
                arguments: vec![
                    Argument::Expression(first),
                    Argument::Expression(dep_array),
                ],
                optional: false,
                span,
            }),
            deps,
            constant: false,
        })
    }

    /// User hooks are stateful: arguments are memoized, the call is not.
    fn optimize_hook_custom(&mut self, call: CallExpression) -> Result<Optimized, CompileError> {
        let mut deps = Vec::new();
        let callee = self.optimize_callee(*call.callee, &mut deps)?;
        let arguments = self.optimize_arguments(call.arguments, &mut deps)?;
        Ok(Optimized {
            expr: Expression::Call(CallExpression {
                callee: Box::new(callee),
                arguments,
                optional: call.optional,
                span: call.span,
            }),
            deps,
            constant: false,
        })
    }

    /// Derive a hook's dependency guards from its `deps` argument. A literal
    /// empty array means the value never recomputes.
    fn extract_hook_deps(&mut self, dep_arg: Expression) -> Result<MemoDeps, CompileError> {
        match dep_arg {
            Expression::Array(array) => {
                if array.elements.is_empty() {
                    return Ok(MemoDeps::OneTime);
                }
                let mut deps = Vec::new();
                for element in array.elements.into_iter().flatten() {
                    match element {
                        ArrayElement::Expression(expr) | ArrayElement::Spread(expr) => {
                            let optimized = self.create_dependency(expr)?;
                            deps.extend(optimized.deps.clone());
                        }
                    }
                }
                if deps.is_empty() {
                    Ok(MemoDeps::OneTime)
                } else {
                    Ok(MemoDeps::Exprs(deps))
                }
            }
            other => {
                let optimized = self.create_dependency(other)?;
                if optimized.constant {
                    Ok(MemoDeps::OneTime)
                } else {
                    Ok(MemoDeps::Exprs(optimized.deps))
                }
            }
        }
    }

    fn hook_name(&self, call: &CallExpression) -> String {
        match call.callee.as_ref() {
            Expression::Identifier(id) => self.ctx.interner.resolve(id.name).to_string(),
            Expression::Member(member) => {
                self.ctx.interner.resolve(member.property.name).to_string()
            }
            _ => "<hook>".to_string(),
        }
    }

    // ========================================================================
    // JSX
    // ========================================================================

    fn optimize_jsx(&mut self, expr: Expression) -> Result<Optimized, CompileError> {
        if !self.ctx.preset.memoize_jsx {
            return Ok(Optimized {
                expr,
                deps: Vec::new(),
                constant: false,
            });
        }
        match expr {
            Expression::JsxElement(element) => {
                let (element, deps) = self.optimize_jsx_element(element)?;
                self.create_memo(
                    Expression::JsxElement(element),
                    aggregate_deps(deps),
                    CacheKind::Memo,
                )
            }
            Expression::JsxFragment(fragment) => {
                let (children, deps) = self.optimize_jsx_children(fragment.children)?;
                self.create_memo(
                    Expression::JsxFragment(JsxFragment {
                        children,
                        span: fragment.span,
                    }),
                    aggregate_deps(deps),
                    CacheKind::Memo,
                )
            }
            _ => unreachable!(),
        }
    }

    fn optimize_jsx_element(
        &mut self,
        element: JsxElement,
    ) -> Result<(JsxElement, Vec<Expression>), CompileError> {
        let JsxElement {
            opening,
            children,
            closing,
            span,
        } = element;
        let JsxOpeningElement {
            name: opening_name,
            attributes: source_attributes,
            self_closing,
            span: opening_span,
        } = opening;

        let mut deps = Vec::new();
        let mut attributes = Vec::with_capacity(source_attributes.len());
        for attribute in source_attributes {
            attributes.push(match attribute {
                JsxAttribute::Attribute { name, value, span } => {
                    let value = match value {
                        Some(JsxAttributeValue::Expression(expr)) => {
                            let optimized = self.create_dependency(expr)?;
                            deps.extend(optimized.deps.clone());
                            Some(JsxAttributeValue::Expression(optimized.expr))
                        }
                        Some(JsxAttributeValue::Element(nested)) => {
                            let optimized = self.optimize_jsx(Expression::JsxElement(*nested))?;
                            deps.extend(optimized.deps.clone());
                            Some(JsxAttributeValue::Expression(optimized.expr))
                        }
                        Some(JsxAttributeValue::Fragment(nested)) => {
                            let optimized = self.optimize_jsx(Expression::JsxFragment(*nested))?;
                            deps.extend(optimized.deps.clone());
                            Some(JsxAttributeValue::Expression(optimized.expr))
                        }
                        other => other,
                    };
                    JsxAttribute::Attribute { name, value, span }
                }
                JsxAttribute::Spread { argument, span } => {
                    let optimized = self.create_dependency(argument)?;
                    deps.extend(optimized.deps.clone());
                    JsxAttribute::Spread {
                        argument: optimized.expr,
                        span,
                    }
                }
            });
        }

        let (children, child_deps) = self.optimize_jsx_children(children)?;
        deps.extend(child_deps);

        Ok((
            JsxElement {
                opening: JsxOpeningElement {
                    name: opening_name,
                    attributes,
                    self_closing,
                    span: opening_span,
                },
                children,
                closing,
                span,
            },
            deps,
        ))
    }

    /// Children recurse; nested elements are replaced by expression
    /// containers holding their memoized form.
    fn optimize_jsx_children(
        &mut self,
        children: Vec<JsxChild>,
    ) -> Result<(Vec<JsxChild>, Vec<Expression>), CompileError> {
        let mut deps = Vec::new();
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            out.push(match child {
                text @ JsxChild::Text(_) => text,
                JsxChild::Expression(expr) => match expr.expression {
                    Some(expression) => {
                        let optimized = self.create_dependency(expression)?;
                        deps.extend(optimized.deps.clone());
                        JsxChild::Expression(JsxExpression {
                            expression: Some(optimized.expr),
                            span: expr.span,
                        })
                    }
                    None => JsxChild::Expression(expr),
                },
                JsxChild::Element(nested) => {
                    let optimized = self.optimize_jsx(Expression::JsxElement(nested))?;
                    deps.extend(optimized.deps.clone());
                    JsxChild::Expression(JsxExpression {
                        expression: Some(optimized.expr),
                        span: Span::synthetic(),
                    })
                }
                JsxChild::Fragment(nested) => {
                    let optimized = self.optimize_jsx(Expression::JsxFragment(nested))?;
                    deps.extend(optimized.deps.clone());
                    JsxChild::Expression(JsxExpression {
                        expression: Some(optimized.expr),
                        span: Span::synthetic(),
                    })
                }
            });
        }
        Ok((out, deps))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn optimize_statement(&mut self, statement: Statement) -> Result<(), CompileError> {
        if self.ctx.skip.contains(statement.span()) {
            self.emit(statement);
            return Ok(());
        }

        match statement {
            Statement::Expression(stmt) => {
                let optimized = self.optimize_expression(stmt.expression)?;
                self.emit(synth::expr_stmt(optimized.expr));
            }
            Statement::VariableDecl(decl) => self.optimize_variable_decl(decl)?,
            Statement::Return(stmt) => match stmt.value {
                Some(value) => {
                    let optimized = self.optimize_expression(value)?;
                    let optimized = self.memoize_result(optimized)?;
                    self.emit(Statement::Return(ReturnStatement {
                        value: Some(optimized.expr),
                        span: stmt.span,
                    }));
                }
                None => self.emit(Statement::Return(stmt)),
            },
            Statement::Throw(stmt) => {
                let optimized = self.optimize_expression(stmt.value)?;
                let optimized = self.memoize_result(optimized)?;
                self.emit(Statement::Throw(ThrowStatement {
                    value: optimized.expr,
                    span: stmt.span,
                }));
            }
            Statement::Block(block) => {
                let statements = self.optimize_into_child(Statement::Block(block))?;
                self.emit(Statement::Block(synth::block(statements)));
            }
            Statement::If(stmt) => {
                let condition = self.optimize_expression(stmt.condition)?;
                let then_statements = self.optimize_into_child(*stmt.then_branch)?;
                let else_statements = match stmt.else_branch {
                    Some(branch) => Some(self.optimize_into_child(*branch)?),
                    None => None,
                };
                self.emit(Statement::If(IfStatement {
                    condition: condition.expr,
                    then_branch: Box::new(Statement::Block(synth::block(then_statements))),
                    else_branch: else_statements
                        .map(|stmts| Box::new(Statement::Block(synth::block(stmts)))),
                    span: stmt.span,
                }));
            }
            Statement::While(stmt) => {
                let lowering = self.optimize_loop(*stmt.body, |_| {})?;
                self.emit_loop(lowering, |body| {
                    Statement::While(WhileStatement {
                        condition: stmt.condition,
                        body,
                        span: stmt.span,
                    })
                });
            }
            Statement::DoWhile(stmt) => {
                let lowering = self.optimize_loop(*stmt.body, |_| {})?;
                self.emit_loop(lowering, |body| {
                    Statement::DoWhile(DoWhileStatement {
                        body,
                        condition: stmt.condition,
                        span: stmt.span,
                    })
                });
            }
            Statement::For(stmt) => {
                let init = stmt.init;
                let lowering = self.optimize_loop(*stmt.body, |me| {
                    if let Some(ForInit::VariableDecl(decl)) = &init {
                        for declarator in &decl.declarators {
                            me.declare_pattern(&declarator.pattern);
                        }
                    }
                })?;
                self.emit_loop(lowering, |body| {
                    Statement::For(ForStatement {
                        init,
                        test: stmt.test,
                        update: stmt.update,
                        body,
                        span: stmt.span,
                    })
                });
            }
            Statement::ForIn(stmt) => {
                let right = self.optimize_expression(stmt.right)?;
                let left = stmt.left;
                let lowering = self.optimize_loop(*stmt.body, |me| {
                    if let ForHead::VariableDecl(decl) = &left {
                        for declarator in &decl.declarators {
                            me.declare_pattern(&declarator.pattern);
                        }
                    }
                })?;
                self.emit_loop(lowering, |body| {
                    Statement::ForIn(ForInStatement {
                        left,
                        right: right.expr,
                        body,
                        span: stmt.span,
                    })
                });
            }
            Statement::ForOf(stmt) => {
                let right = self.optimize_expression(stmt.right)?;
                let left = stmt.left;
                let lowering = self.optimize_loop(*stmt.body, |me| {
                    if let ForHead::VariableDecl(decl) = &left {
                        for declarator in &decl.declarators {
                            me.declare_pattern(&declarator.pattern);
                        }
                    }
                })?;
                self.emit_loop(lowering, |body| {
                    Statement::ForOf(ForOfStatement {
                        left,
                        right: right.expr,
                        body,
                        span: stmt.span,
                    })
                });
            }
            Statement::Switch(stmt) => {
                let discriminant = self.optimize_expression(stmt.discriminant)?;
                let mut cases = Vec::with_capacity(stmt.cases.len());
                for case in stmt.cases {
                    let previous = self.enter_scope(false);
                    for consequent in case.consequent {
                        self.optimize_statement(consequent)?;
                    }
                    let scope = self.exit_scope(previous);
                    let consequent = self.scopes.finalize(scope, self.ctx);
                    cases.push(SwitchCase {
                        test: case.test,
                        consequent,
                        span: case.span,
                    });
                }
                self.emit(Statement::Switch(SwitchStatement {
                    discriminant: discriminant.expr,
                    cases,
                    span: stmt.span,
                }));
            }
            Statement::Try(stmt) => {
                let block = self.optimize_into_child(Statement::Block(stmt.block))?;
                let handler = match stmt.handler {
                    Some(handler) => {
                        let previous = self.enter_scope(false);
                        if let Some(param) = &handler.param {
                            self.declare_pattern(param);
                        }
                        for body_stmt in handler.body.statements {
                            self.optimize_statement(body_stmt)?;
                        }
                        let scope = self.exit_scope(previous);
                        let statements = self.scopes.finalize(scope, self.ctx);
                        Some(CatchClause {
                            param: handler.param,
                            body: synth::block(statements),
                            span: handler.span,
                        })
                    }
                    None => None,
                };
                let finalizer = match stmt.finalizer {
                    Some(finalizer) => {
                        let statements =
                            self.optimize_into_child(Statement::Block(finalizer))?;
                        Some(synth::block(statements))
                    }
                    None => None,
                };
                self.emit(Statement::Try(TryStatement {
                    block: synth::block(block),
                    handler,
                    finalizer,
                    span: stmt.span,
                }));
            }
            Statement::Labeled(stmt) => {
                if stmt.body.is_loop() {
                    // Keep the label directly on the emitted loop so labeled
                    // break/continue still resolve; the loop's cache
                    // declaration lands before the label.
                    let before = self.scopes.get(self.current).statements.len();
                    self.optimize_statement(*stmt.body)?;
                    let scope = self.scopes.get_mut(self.current);
                    if scope.statements.len() > before {
                        let body = scope.statements.pop().unwrap();
                        scope.statements.push(Statement::Labeled(LabeledStatement {
                            label: stmt.label,
                            body: Box::new(body),
                            span: stmt.span,
                        }));
                    }
                } else {
                    let statements = self.optimize_into_child(*stmt.body)?;
                    self.emit(Statement::Labeled(LabeledStatement {
                        label: stmt.label,
                        body: Box::new(Statement::Block(synth::block(statements))),
                        span: stmt.span,
                    }));
                }
            }
            Statement::FunctionDecl(decl) => {
                self.env.declare(decl.name.name);
                self.emit(Statement::FunctionDecl(decl));
            }
            other => self.emit(other),
        }
        Ok(())
    }

    fn optimize_variable_decl(&mut self, decl: VariableDecl) -> Result<(), CompileError> {
        for declarator in decl.declarators {
            match (declarator.pattern, declarator.init) {
                (Pattern::Identifier(id), Some(init)) => {
                    let optimized = self.optimize_expression(init)?;
                    self.emit(Statement::VariableDecl(VariableDecl {
                        kind: decl.kind,
                        declarators: vec![VariableDeclarator {
                            pattern: Pattern::Identifier(id.clone()),
                            type_annotation: declarator.type_annotation,
                            init: Some(optimized.expr.clone()),
                            span: declarator.span,
                        }],
                        span: declarator.span,
                    }));
                    let binding = self.env.declare(id.name);
                    if optimized.constant {
                        self.scopes.mark_constant(self.current, binding);
                    }
                    // Only stable replacements may short-circuit later reads;
                    // substituting a rewritten call would re-evaluate it.
                    if optimized.constant || optimized.expr.is_identifier() {
                        self.scopes
                            .record_optimized(self.current, binding, optimized);
                    }
                }
                (pattern, Some(init)) => {
                    // Destructuring: initializer still optimized, bindings
                    // untracked.
                    let optimized = self.optimize_expression(init)?;
                    self.emit(Statement::VariableDecl(VariableDecl {
                        kind: decl.kind,
                        declarators: vec![VariableDeclarator {
                            pattern: pattern.clone(),
                            type_annotation: declarator.type_annotation,
                            init: Some(optimized.expr),
                            span: declarator.span,
                        }],
                        span: declarator.span,
                    }));
                    self.declare_pattern(&pattern);
                }
                (pattern, None) => {
                    self.emit(Statement::VariableDecl(VariableDecl {
                        kind: decl.kind,
                        declarators: vec![VariableDeclarator {
                            pattern: pattern.clone(),
                            type_annotation: declarator.type_annotation,
                            init: None,
                            span: declarator.span,
                        }],
                        span: declarator.span,
                    }));
                    self.declare_pattern(&pattern);
                }
            }
        }
        Ok(())
    }

    /// Optimize a statement (or a block's statements) into a fresh child
    /// scope and return the finalized output.
    fn optimize_into_child(&mut self, statement: Statement) -> Result<Vec<Statement>, CompileError> {
        let previous = self.enter_scope(false);
        let result = match statement {
            Statement::Block(block) => {
                let mut outcome = Ok(());
                for inner in block.statements {
                    outcome = self.optimize_statement(inner);
                    if outcome.is_err() {
                        break;
                    }
                }
                outcome
            }
            other => self.optimize_statement(other),
        };
        let scope = self.exit_scope(previous);
        result?;
        Ok(self.scopes.finalize(scope, self.ctx))
    }

    /// Optimize a loop body into a loop scope; `bind` pre-declares head
    /// bindings so body reads resolve to them.
    fn optimize_loop(
        &mut self,
        body: Statement,
        bind: impl FnOnce(&mut Self),
    ) -> Result<LoopLowering, CompileError> {
        let previous = self.enter_scope(true);
        bind(self);
        let result = match body {
            Statement::Block(block) => {
                let mut outcome = Ok(());
                for inner in block.statements {
                    outcome = self.optimize_statement(inner);
                    if outcome.is_err() {
                        break;
                    }
                }
                outcome
            }
            other => self.optimize_statement(other),
        };
        let scope = self.exit_scope(previous);
        result?;
        Ok(self.scopes.finalize_loop(scope, self.ctx))
    }

    /// Emit a lowered loop: its cache declaration (if any) first, then the
    /// rebuilt loop with the finalized body.
    fn emit_loop(
        &mut self,
        lowering: LoopLowering,
        rebuild: impl FnOnce(Box<Statement>) -> Statement,
    ) {
        if let Some(outer) = lowering.outer {
            self.emit(outer);
        }
        let body = Box::new(Statement::Block(synth::block(lowering.body)));
        self.emit(rebuild(body));
    }
}

/// `fn` → `fn()`
fn call_expression(callee: Expression) -> Expression {
    Expression::Call(CallExpression {
        callee: Box::new(callee),
        arguments: Vec::new(),
        optional: false,
        span: Span::synthetic(),
    })
}
