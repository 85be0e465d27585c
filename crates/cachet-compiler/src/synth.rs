//! Synthesized AST node helpers
//!
//! Small constructors for the node shapes the optimizer emits over and over.
//! Everything built here carries synthetic spans.

use cachet_parser::ast::*;
use cachet_parser::Span;

pub(crate) fn ident(id: Identifier) -> Expression {
    Expression::Identifier(id)
}

pub(crate) fn int(value: u32) -> Expression {
    Expression::Int(IntLiteral {
        value: value as i64,
        span: Span::synthetic(),
    })
}

pub(crate) fn null() -> Expression {
    Expression::Null(Span::synthetic())
}

pub(crate) fn void_zero() -> Expression {
    Expression::Unary(UnaryExpression {
        operator: UnaryOperator::Void,
        operand: Box::new(Expression::Int(IntLiteral {
            value: 0,
            span: Span::synthetic(),
        })),
        span: Span::synthetic(),
    })
}

pub(crate) fn not(expr: Expression) -> Expression {
    Expression::Unary(UnaryExpression {
        operator: UnaryOperator::Not,
        operand: Box::new(expr),
        span: Span::synthetic(),
    })
}

pub(crate) fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        span: Span::synthetic(),
    })
}

pub(crate) fn logical(
    operator: LogicalOperator,
    left: Expression,
    right: Expression,
) -> Expression {
    Expression::Logical(LogicalExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        span: Span::synthetic(),
    })
}

pub(crate) fn assign(target: Expression, value: Expression) -> Expression {
    Expression::Assignment(AssignmentExpression {
        operator: AssignmentOperator::Assign,
        left: Box::new(target),
        right: Box::new(value),
        span: Span::synthetic(),
    })
}

pub(crate) fn conditional(test: Expression, consequent: Expression, alternate: Expression) -> Expression {
    Expression::Conditional(ConditionalExpression {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
        span: Span::synthetic(),
    })
}

/// `header[index]`
pub(crate) fn slot(header: Identifier, index: u32) -> Expression {
    Expression::Index(IndexExpression {
        object: Box::new(ident(header)),
        index: Box::new(int(index)),
        span: Span::synthetic(),
    })
}

pub(crate) fn call(callee: Expression, arguments: Vec<Expression>) -> Expression {
    Expression::Call(CallExpression {
        callee: Box::new(callee),
        arguments: arguments.into_iter().map(Argument::Expression).collect(),
        optional: false,
        span: Span::synthetic(),
    })
}

/// `++counter`
pub(crate) fn pre_increment(target: Identifier) -> Expression {
    Expression::Update(UpdateExpression {
        operator: UpdateOperator::Increment,
        prefix: true,
        argument: Box::new(ident(target)),
        span: Span::synthetic(),
    })
}

/// `let name = init;` (or `let name;`)
pub(crate) fn let_stmt(name: Identifier, init: Option<Expression>) -> Statement {
    let span = Span::synthetic();
    Statement::VariableDecl(VariableDecl {
        kind: VariableKind::Let,
        declarators: vec![VariableDeclarator {
            pattern: Pattern::Identifier(name),
            type_annotation: None,
            init,
            span,
        }],
        span,
    })
}

/// `let a = x, b = y;`
pub(crate) fn let_multi(declarators: Vec<(Identifier, Expression)>) -> Statement {
    let span = Span::synthetic();
    Statement::VariableDecl(VariableDecl {
        kind: VariableKind::Let,
        declarators: declarators
            .into_iter()
            .map(|(name, init)| VariableDeclarator {
                pattern: Pattern::Identifier(name),
                type_annotation: None,
                init: Some(init),
                span,
            })
            .collect(),
        span,
    })
}

pub(crate) fn expr_stmt(expression: Expression) -> Statement {
    let span = *expression.span();
    Statement::Expression(ExpressionStatement { expression, span })
}

pub(crate) fn block(statements: Vec<Statement>) -> BlockStatement {
    BlockStatement {
        statements,
        span: Span::synthetic(),
    }
}

pub(crate) fn if_stmt(
    condition: Expression,
    then_statements: Vec<Statement>,
    else_statements: Option<Vec<Statement>>,
) -> Statement {
    Statement::If(IfStatement {
        condition,
        then_branch: Box::new(Statement::Block(block(then_statements))),
        else_branch: else_statements.map(|stmts| Box::new(Statement::Block(block(stmts)))),
        span: Span::synthetic(),
    })
}

/// Merge adjacent `let` declarations into multi-declarator form.
pub(crate) fn coalesce_lets(statements: Vec<Statement>) -> Vec<Statement> {
    let mut out: Vec<Statement> = Vec::with_capacity(statements.len());
    for statement in statements {
        match (out.last_mut(), statement) {
            (
                Some(Statement::VariableDecl(last)),
                Statement::VariableDecl(next),
            ) if last.kind == VariableKind::Let && next.kind == VariableKind::Let => {
                last.declarators.extend(next.declarators);
            }
            (_, statement) => out.push(statement),
        }
    }
    out
}
