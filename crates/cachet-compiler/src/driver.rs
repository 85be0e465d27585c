//! Module driver
//!
//! Walks a parsed module, rewrites every component it finds (top-level or
//! exported function declarations and arrow consts with capitalized names),
//! and prepends one deduplicated import declaration per runtime source. A
//! component that fails to rewrite keeps its original body and contributes a
//! diagnostic; there are no partial rewrites.

use crate::context::StateContext;
use crate::error::CompileError;
use crate::optimizer::Optimizer;
use crate::preset::Preset;
use crate::simplify::Simplifier;
use cachet_parser::ast::*;
use cachet_parser::Interner;

/// Result of compiling one module.
pub struct CompileOutput {
    pub module: Module,
    pub interner: Interner,
    pub errors: Vec<CompileError>,
}

/// Rewrite every component in a module.
pub fn compile_module(module: Module, interner: Interner, preset: &Preset) -> CompileOutput {
    let mut ctx = StateContext::new(interner, preset);
    let mut errors = Vec::new();

    let rewritten: Vec<Statement> = module
        .statements
        .into_iter()
        .map(|statement| rewrite_statement(statement, &mut ctx, &mut errors))
        .collect();

    let mut statements = ctx.imports.to_import_decls(&mut ctx.interner);
    statements.extend(rewritten);

    CompileOutput {
        module: Module {
            statements,
            span: module.span,
        },
        interner: ctx.interner,
        errors,
    }
}

fn rewrite_statement(
    statement: Statement,
    ctx: &mut StateContext,
    errors: &mut Vec<CompileError>,
) -> Statement {
    match statement {
        Statement::FunctionDecl(func) if is_component_name(&func.name, &ctx.interner) => {
            Statement::FunctionDecl(rewrite_function(func, ctx, errors))
        }
        Statement::Export(ExportDecl::Declaration(inner)) => {
            let inner = rewrite_statement(*inner, ctx, errors);
            Statement::Export(ExportDecl::Declaration(Box::new(inner)))
        }
        Statement::VariableDecl(decl) => {
            Statement::VariableDecl(rewrite_variable_decl(decl, ctx, errors))
        }
        other => other,
    }
}

fn rewrite_function(
    func: FunctionDecl,
    ctx: &mut StateContext,
    errors: &mut Vec<CompileError>,
) -> FunctionDecl {
    let original = func.clone();
    let simplified = Simplifier::new(&ctx.interner).simplify_function(func);
    match Optimizer::new(ctx).optimize_component(simplified) {
        Ok(rewritten) => rewritten,
        Err(error) => {
            errors.push(error);
            original
        }
    }
}

/// `const View = (props) => ...` counts as a component when the binding name
/// is capitalized.
fn rewrite_variable_decl(
    decl: VariableDecl,
    ctx: &mut StateContext,
    errors: &mut Vec<CompileError>,
) -> VariableDecl {
    let kind = decl.kind;
    let span = decl.span;
    let declarators = decl
        .declarators
        .into_iter()
        .map(|declarator| {
            let VariableDeclarator {
                pattern,
                type_annotation,
                init,
                span,
            } = declarator;
            let is_component = matches!(
                &pattern,
                Pattern::Identifier(id) if is_component_name(id, &ctx.interner)
            );
            let init = match (is_component, init) {
                (true, Some(Expression::Arrow(arrow))) => {
                    let original = arrow.clone();
                    let simplified = simplify_arrow(arrow, ctx);
                    Some(match Optimizer::new(ctx).optimize_arrow(simplified) {
                        Ok(rewritten) => Expression::Arrow(rewritten),
                        Err(error) => {
                            errors.push(error);
                            Expression::Arrow(original)
                        }
                    })
                }
                (_, other) => other,
            };
            VariableDeclarator {
                pattern,
                type_annotation,
                init,
                span,
            }
        })
        .collect();
    VariableDecl {
        kind,
        declarators,
        span,
    }
}

fn simplify_arrow(arrow: ArrowFunction, ctx: &StateContext) -> ArrowFunction {
    let simplifier = Simplifier::new(&ctx.interner);
    let ArrowFunction {
        params,
        return_type,
        body,
        is_async,
        span,
    } = arrow;
    let body = match body {
        ArrowBody::Block(block) => ArrowBody::Block(BlockStatement {
            statements: simplifier.statements(block.statements),
            span: block.span,
        }),
        ArrowBody::Expression(expr) => {
            ArrowBody::Expression(Box::new(simplifier.expression(*expr)))
        }
    };
    ArrowFunction {
        params,
        return_type,
        body,
        is_async,
        span,
    }
}

/// Components are identified by the capitalized-name convention.
fn is_component_name(name: &Identifier, interner: &Interner) -> bool {
    interner
        .resolve(name.name)
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase())
}
