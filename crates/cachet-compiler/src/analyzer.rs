//! Expression analysis
//!
//! Two questions get asked of every expression the optimizer visits: is it
//! constant (invariant across invocations of the rewritten component), and,
//! for calls, is the callee a recognized hook. Constancy is judged purely
//! from binding origins and expression shape; referential equality of inputs
//! is the only signal the pass works with, so a call of a foreign function
//! counts as constant.

use crate::captures;
use crate::env::Env;
use crate::preset::{CompiledPreset, HookKind};
use crate::scope::{ScopeId, ScopeTree};
use cachet_parser::ast::*;
use cachet_parser::{Interner, Span, Symbol};
use rustc_hash::FxHashMap;

/// Borrowed view of the optimizer state the analyzer consults.
pub struct AnalyzerCx<'a> {
    pub scopes: &'a ScopeTree,
    pub current: ScopeId,
    pub env: &'a Env,
    pub preset: &'a CompiledPreset,
    pub interner: &'a Interner,
}

impl AnalyzerCx<'_> {
    /// A name is constant when it is foreign (unresolved) or registered in a
    /// constants set along the scope chain.
    fn name_is_constant(&self, name: Symbol) -> bool {
        match self.env.resolve(name) {
            None => true,
            Some(binding) => self.scopes.binding_is_constant(self.current, binding),
        }
    }

    /// Whether a callee symbol names a hook (registered or `useXxx`-shaped).
    /// `Skip` registrations behave like ordinary calls.
    fn name_is_hook(&self, name: Symbol) -> bool {
        match self.preset.hook_kind(name) {
            Some(HookKind::Skip) => false,
            Some(_) => true,
            None => {
                self.preset.use_prefix_custom
                    && self.preset.is_hook_name(self.interner.resolve(name))
            }
        }
    }
}

/// Classifier for constancy and hook calls, with a per-node result cache.
#[derive(Debug, Default)]
pub struct ExprAnalyzer {
    cache: FxHashMap<Span, bool>,
}

impl ExprAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a call's callee against the preset.
    ///
    /// Returns `None` for ordinary calls. Recognition goes by callee name:
    /// a plain identifier or the final member of a path (`React.useMemo`).
    pub fn classify_hook_call(
        call: &CallExpression,
        preset: &CompiledPreset,
        interner: &Interner,
    ) -> Option<HookKind> {
        let name = callee_name(&call.callee)?;
        if let Some(kind) = preset.hook_kind(name) {
            return Some(kind);
        }
        if preset.use_prefix_custom && preset.is_hook_name(interner.resolve(name)) {
            return Some(HookKind::Custom);
        }
        None
    }

    /// True iff the expression is invariant across invocations: every
    /// identifier it reads is foreign or registered constant, and it contains
    /// no hook call, no write, no await, and no JSX the preset memoizes.
    pub fn is_constant(&mut self, expr: &Expression, cx: &AnalyzerCx<'_>) -> bool {
        let span = *expr.span();
        if !span.is_synthetic() {
            if let Some(&cached) = self.cache.get(&span) {
                return cached;
            }
        }
        let result = self.check(expr, cx);
        if !span.is_synthetic() {
            self.cache.insert(span, result);
        }
        result
    }

    fn check(&mut self, expr: &Expression, cx: &AnalyzerCx<'_>) -> bool {
        match expr {
            Expression::Int(_)
            | Expression::Float(_)
            | Expression::String(_)
            | Expression::Boolean(_)
            | Expression::Null(_)
            | Expression::This(_) => true,

            // Templates re-stringify their inputs; treated as dynamic
            Expression::Template(_) | Expression::TaggedTemplate(_) => false,

            Expression::Identifier(id) => cx.name_is_constant(id.name),

            Expression::Paren(paren) => self.check(&paren.expression, cx),
            Expression::TypeCast(cast) => self.check(&cast.expression, cx),

            Expression::Member(member) => self.check(&member.object, cx),
            Expression::Index(index) => {
                self.check(&index.object, cx) && self.check(&index.index, cx)
            }

            Expression::Call(call) => {
                if Self::classify_hook_call(call, cx.preset, cx.interner)
                    .is_some_and(|kind| kind != HookKind::Skip)
                {
                    return false;
                }
                self.check(&call.callee, cx) && self.arguments_constant(&call.arguments, cx)
            }
            Expression::New(new) => {
                self.check(&new.callee, cx) && self.arguments_constant(&new.arguments, cx)
            }

            Expression::Unary(unary) => {
                unary.operator != UnaryOperator::Delete && self.check(&unary.operand, cx)
            }
            Expression::Update(_) => false,
            Expression::Binary(binary) => {
                binary.operator != BinaryOperator::Pipeline
                    && self.check(&binary.left, cx)
                    && self.check(&binary.right, cx)
            }
            Expression::Logical(logical) => {
                self.check(&logical.left, cx) && self.check(&logical.right, cx)
            }
            Expression::Conditional(conditional) => {
                self.check(&conditional.test, cx)
                    && self.check(&conditional.consequent, cx)
                    && self.check(&conditional.alternate, cx)
            }
            Expression::Assignment(_) => false,
            Expression::Sequence(sequence) => {
                sequence.expressions.iter().all(|e| self.check(e, cx))
            }

            Expression::Array(array) => array.elements.iter().flatten().all(|element| {
                match element {
                    ArrayElement::Expression(e) | ArrayElement::Spread(e) => self.check(e, cx),
                }
            }),
            Expression::Object(object) => object.properties.iter().all(|property| {
                match property {
                    ObjectProperty::Property(prop) => {
                        let key_ok = match &prop.key {
                            PropertyKey::Computed(key) => self.check(key, cx),
                            _ => true,
                        };
                        key_ok && self.check(&prop.value, cx)
                    }
                    ObjectProperty::Method(method) => {
                        let key_ok = match &method.key {
                            PropertyKey::Computed(key) => self.check(key, cx),
                            _ => true,
                        };
                        key_ok
                            && self.function_is_constant(
                                captures::analyze_params_body(
                                    &method.params,
                                    &method.body,
                                    cx.interner,
                                ),
                                cx,
                            )
                    }
                    ObjectProperty::Spread(spread) => self.check(&spread.argument, cx),
                }
            }),

            Expression::Function(_) | Expression::Arrow(_) => {
                self.function_is_constant(captures::analyze_function(expr, cx.interner), cx)
            }

            Expression::Await(_) => false,

            Expression::JsxElement(_) | Expression::JsxFragment(_) => {
                if cx.preset.memoize_jsx {
                    // The runtime memoizes JSX, so elements are never constant
                    false
                } else {
                    self.jsx_constant(expr, cx)
                }
            }
        }
    }

    fn arguments_constant(&mut self, arguments: &[Argument], cx: &AnalyzerCx<'_>) -> bool {
        arguments.iter().all(|argument| match argument {
            Argument::Expression(e) => self.check(e, cx),
            Argument::Spread(spread) => self.check(&spread.argument, cx),
        })
    }

    /// A function literal is constant when its body performs no writes,
    /// never awaits, calls no hooks, and reads only constant names.
    fn function_is_constant(
        &mut self,
        analysis: captures::FunctionAnalysis,
        cx: &AnalyzerCx<'_>,
    ) -> bool {
        !analysis.has_assignment
            && !analysis.has_await
            && !analysis.callees.iter().any(|&name| cx.name_is_hook(name))
            && analysis.free.iter().all(|&name| cx.name_is_constant(name))
    }

    /// With JSX memoization off, an element is constant when its dynamic
    /// parts are.
    fn jsx_constant(&mut self, expr: &Expression, cx: &AnalyzerCx<'_>) -> bool {
        match expr {
            Expression::JsxElement(element) => self.jsx_element_constant(element, cx),
            Expression::JsxFragment(fragment) => self.jsx_children_constant(&fragment.children, cx),
            _ => unreachable!(),
        }
    }

    fn jsx_element_constant(&mut self, element: &JsxElement, cx: &AnalyzerCx<'_>) -> bool {
        let name_ok = match &element.opening.name {
            JsxElementName::Identifier(id) => {
                element.opening.name.is_intrinsic(cx.interner) || cx.name_is_constant(id.name)
            }
            _ => true,
        };
        name_ok
            && element.opening.attributes.iter().all(|attribute| {
                match attribute {
                    JsxAttribute::Attribute { value, .. } => match value {
                        Some(JsxAttributeValue::Expression(e)) => self.check(e, cx),
                        Some(JsxAttributeValue::Element(nested)) => {
                            self.jsx_element_constant(nested, cx)
                        }
                        Some(JsxAttributeValue::Fragment(nested)) => {
                            self.jsx_children_constant(&nested.children, cx)
                        }
                        Some(JsxAttributeValue::StringLiteral(_)) | None => true,
                    },
                    JsxAttribute::Spread { argument, .. } => self.check(argument, cx),
                }
            })
            && self.jsx_children_constant(&element.children, cx)
    }

    fn jsx_children_constant(&mut self, children: &[JsxChild], cx: &AnalyzerCx<'_>) -> bool {
        children.iter().all(|child| match child {
            JsxChild::Text(_) => true,
            JsxChild::Element(element) => self.jsx_element_constant(element, cx),
            JsxChild::Fragment(fragment) => self.jsx_children_constant(&fragment.children, cx),
            JsxChild::Expression(expr) => match &expr.expression {
                Some(expression) => self.check(expression, cx),
                None => true,
            },
        })
    }
}

/// Extract the name a call is recognized by: identifier callees and the
/// final property of member callees.
fn callee_name(callee: &Expression) -> Option<Symbol> {
    match callee {
        Expression::Identifier(id) => Some(id.name),
        Expression::Member(member) => Some(member.property.name),
        Expression::Paren(paren) => callee_name(&paren.expression),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;
    use crate::preset::Preset;
    use crate::scope::ScopeTree;

    struct Fixture {
        interner: Interner,
        preset: CompiledPreset,
        scopes: ScopeTree,
        root: ScopeId,
        env: Env,
    }

    fn fixture(locals: &[&str]) -> Fixture {
        let mut interner = Interner::new();
        let preset = CompiledPreset::compile(&Preset::default(), &mut interner);
        let mut scopes = ScopeTree::new();
        let root = scopes.create(None, false);
        let mut env = Env::new();
        env.push_frame();
        for local in locals {
            let sym = interner.intern(local);
            env.declare(sym);
        }
        Fixture {
            interner,
            preset,
            scopes,
            root,
            env,
        }
    }

    #[test]
    fn test_classify_hook_call_by_name() {
        let mut fx = fixture(&[]);
        let use_memo = fx.interner.intern("useMemo");
        let call = CallExpression {
            callee: Box::new(Expression::Identifier(Identifier::synthetic(use_memo))),
            arguments: vec![],
            optional: false,
            span: Span::synthetic(),
        };
        assert_eq!(
            ExprAnalyzer::classify_hook_call(&call, &fx.preset, &fx.interner),
            Some(HookKind::Memo)
        );

        let custom = fx.interner.intern("useQuery");
        let call = CallExpression {
            callee: Box::new(Expression::Identifier(Identifier::synthetic(custom))),
            arguments: vec![],
            optional: false,
            span: Span::synthetic(),
        };
        assert_eq!(
            ExprAnalyzer::classify_hook_call(&call, &fx.preset, &fx.interner),
            Some(HookKind::Custom)
        );

        let plain = fx.interner.intern("render");
        let call = CallExpression {
            callee: Box::new(Expression::Identifier(Identifier::synthetic(plain))),
            arguments: vec![],
            optional: false,
            span: Span::synthetic(),
        };
        assert_eq!(
            ExprAnalyzer::classify_hook_call(&call, &fx.preset, &fx.interner),
            None
        );
    }

    #[test]
    fn test_foreign_identifier_is_constant() {
        let mut fx = fixture(&["local"]);
        let foreign = fx.interner.intern("FOREIGN");
        let local = fx.interner.intern("local");

        let cx = AnalyzerCx {
            scopes: &fx.scopes,
            current: fx.root,
            env: &fx.env,
            preset: &fx.preset,
            interner: &fx.interner,
        };
        let mut analyzer = ExprAnalyzer::new();
        assert!(analyzer.is_constant(
            &Expression::Identifier(Identifier::synthetic(foreign)),
            &cx
        ));
        assert!(!analyzer.is_constant(
            &Expression::Identifier(Identifier::synthetic(local)),
            &cx
        ));
    }

    #[test]
    fn test_registered_constant_binding() {
        let mut fx = fixture(&["stable"]);
        let stable = fx.interner.intern("stable");
        let binding = fx.env.resolve(stable).unwrap();
        fx.scopes.mark_constant(fx.root, binding);

        let cx = AnalyzerCx {
            scopes: &fx.scopes,
            current: fx.root,
            env: &fx.env,
            preset: &fx.preset,
            interner: &fx.interner,
        };
        let mut analyzer = ExprAnalyzer::new();
        assert!(analyzer.is_constant(
            &Expression::Identifier(Identifier::synthetic(stable)),
            &cx
        ));
    }

    #[test]
    fn test_hook_call_is_never_constant() {
        let mut fx = fixture(&[]);
        let use_memo = fx.interner.intern("useMemo");
        let call = Expression::Call(CallExpression {
            callee: Box::new(Expression::Identifier(Identifier::synthetic(use_memo))),
            arguments: vec![],
            optional: false,
            span: Span::synthetic(),
        });
        let cx = AnalyzerCx {
            scopes: &fx.scopes,
            current: fx.root,
            env: &fx.env,
            preset: &fx.preset,
            interner: &fx.interner,
        };
        let mut analyzer = ExprAnalyzer::new();
        assert!(!analyzer.is_constant(&call, &cx));
    }
}
