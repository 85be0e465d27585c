//! Truthiness pre-pass
//!
//! Folds conditionals, logicals, and obvious unary forms whose tests are
//! literal, so the optimizer sees fewer indeterminate branches. Only
//! primitive literals evaluate; arrays, objects, and functions stay
//! indeterminate: reference values coerce in ways a static pass should not
//! guess at.

use cachet_parser::ast::*;
use cachet_parser::Span;

/// Compile-time truthiness of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truthiness {
    Truthy,
    Falsy,
    Nullish,
    Indeterminate,
}

impl Truthiness {
    /// Determinate and coercing to false (`null` included).
    pub fn is_false(self) -> bool {
        matches!(self, Truthiness::Falsy | Truthiness::Nullish)
    }

    pub fn is_determinate(self) -> bool {
        self != Truthiness::Indeterminate
    }
}

/// Evaluate a literal expression's truthiness.
pub fn evaluate(expr: &Expression) -> Truthiness {
    match expr {
        Expression::Boolean(lit) => {
            if lit.value {
                Truthiness::Truthy
            } else {
                Truthiness::Falsy
            }
        }
        Expression::Null(_) => Truthiness::Nullish,
        Expression::Int(lit) => {
            if lit.value != 0 {
                Truthiness::Truthy
            } else {
                Truthiness::Falsy
            }
        }
        Expression::Float(lit) => {
            if lit.value != 0.0 && !lit.value.is_nan() {
                Truthiness::Truthy
            } else {
                Truthiness::Falsy
            }
        }
        // String truthiness needs the interner; Simplifier::truthiness
        // resolves it
        Expression::String(_) => Truthiness::Indeterminate,
        Expression::Paren(paren) => evaluate(&paren.expression),
        Expression::TypeCast(cast) => evaluate(&cast.expression),
        _ => Truthiness::Indeterminate,
    }
}

/// The simplifier. Carries the interner so string literals evaluate too.
pub struct Simplifier<'a> {
    interner: &'a cachet_parser::Interner,
}

impl<'a> Simplifier<'a> {
    pub fn new(interner: &'a cachet_parser::Interner) -> Self {
        Self { interner }
    }

    fn truthiness(&self, expr: &Expression) -> Truthiness {
        match expr {
            Expression::String(lit) => {
                if self.interner.resolve(lit.value).is_empty() {
                    Truthiness::Falsy
                } else {
                    Truthiness::Truthy
                }
            }
            Expression::Paren(paren) => self.truthiness(&paren.expression),
            Expression::TypeCast(cast) => self.truthiness(&cast.expression),
            other => evaluate(other),
        }
    }

    /// Simplify a function body in place.
    pub fn simplify_function(&self, func: FunctionDecl) -> FunctionDecl {
        let FunctionDecl {
            name,
            params,
            return_type,
            body,
            is_async,
            span,
        } = func;
        FunctionDecl {
            name,
            params,
            return_type,
            body: BlockStatement {
                statements: self.statements(body.statements),
                span: body.span,
            },
            is_async,
            span,
        }
    }

    pub fn statements(&self, statements: Vec<Statement>) -> Vec<Statement> {
        statements
            .into_iter()
            .filter_map(|statement| self.statement(statement))
            .collect()
    }

    /// Simplify one statement. `None` means the statement folded away.
    pub fn statement(&self, statement: Statement) -> Option<Statement> {
        Some(match statement {
            Statement::If(stmt) => {
                let condition = self.expression(stmt.condition);
                match self.truthiness(&condition) {
                    Truthiness::Truthy => return self.statement(*stmt.then_branch),
                    t if t.is_false() => {
                        return stmt.else_branch.and_then(|branch| self.statement(*branch))
                    }
                    _ => Statement::If(IfStatement {
                        condition,
                        then_branch: Box::new(
                            self.statement(*stmt.then_branch)
                                .unwrap_or(Statement::Empty(Span::synthetic())),
                        ),
                        else_branch: stmt
                            .else_branch
                            .and_then(|branch| self.statement(*branch))
                            .map(Box::new),
                        span: stmt.span,
                    }),
                }
            }
            Statement::While(stmt) => {
                let condition = self.expression(stmt.condition);
                if self.truthiness(&condition).is_false() {
                    return None;
                }
                Statement::While(WhileStatement {
                    condition,
                    body: Box::new(
                        self.statement(*stmt.body)
                            .unwrap_or(Statement::Empty(Span::synthetic())),
                    ),
                    span: stmt.span,
                })
            }
            Statement::DoWhile(stmt) => Statement::DoWhile(DoWhileStatement {
                body: Box::new(
                    self.statement(*stmt.body)
                        .unwrap_or(Statement::Empty(Span::synthetic())),
                ),
                condition: self.expression(stmt.condition),
                span: stmt.span,
            }),
            Statement::Block(block) => Statement::Block(BlockStatement {
                statements: self.statements(block.statements),
                span: block.span,
            }),
            Statement::Expression(stmt) => Statement::Expression(ExpressionStatement {
                expression: self.expression(stmt.expression),
                span: stmt.span,
            }),
            Statement::VariableDecl(decl) => Statement::VariableDecl(VariableDecl {
                kind: decl.kind,
                declarators: decl
                    .declarators
                    .into_iter()
                    .map(|declarator| VariableDeclarator {
                        pattern: declarator.pattern,
                        type_annotation: declarator.type_annotation,
                        init: declarator.init.map(|init| self.expression(init)),
                        span: declarator.span,
                    })
                    .collect(),
                span: decl.span,
            }),
            Statement::Return(stmt) => Statement::Return(ReturnStatement {
                value: stmt.value.map(|value| self.expression(value)),
                span: stmt.span,
            }),
            Statement::Throw(stmt) => Statement::Throw(ThrowStatement {
                value: self.expression(stmt.value),
                span: stmt.span,
            }),
            Statement::For(stmt) => Statement::For(ForStatement {
                init: stmt.init.map(|init| match init {
                    ForInit::Expression(expr) => ForInit::Expression(self.expression(expr)),
                    other => other,
                }),
                test: stmt.test.map(|test| self.expression(test)),
                update: stmt.update.map(|update| self.expression(update)),
                body: Box::new(
                    self.statement(*stmt.body)
                        .unwrap_or(Statement::Empty(Span::synthetic())),
                ),
                span: stmt.span,
            }),
            Statement::ForIn(stmt) => Statement::ForIn(ForInStatement {
                left: stmt.left,
                right: self.expression(stmt.right),
                body: Box::new(
                    self.statement(*stmt.body)
                        .unwrap_or(Statement::Empty(Span::synthetic())),
                ),
                span: stmt.span,
            }),
            Statement::ForOf(stmt) => Statement::ForOf(ForOfStatement {
                left: stmt.left,
                right: self.expression(stmt.right),
                body: Box::new(
                    self.statement(*stmt.body)
                        .unwrap_or(Statement::Empty(Span::synthetic())),
                ),
                span: stmt.span,
            }),
            Statement::Switch(stmt) => Statement::Switch(SwitchStatement {
                discriminant: self.expression(stmt.discriminant),
                cases: stmt
                    .cases
                    .into_iter()
                    .map(|case| SwitchCase {
                        test: case.test,
                        consequent: self.statements(case.consequent),
                        span: case.span,
                    })
                    .collect(),
                span: stmt.span,
            }),
            Statement::Try(stmt) => Statement::Try(TryStatement {
                block: BlockStatement {
                    statements: self.statements(stmt.block.statements),
                    span: stmt.block.span,
                },
                handler: stmt.handler.map(|handler| CatchClause {
                    param: handler.param,
                    body: BlockStatement {
                        statements: self.statements(handler.body.statements),
                        span: handler.body.span,
                    },
                    span: handler.span,
                }),
                finalizer: stmt.finalizer.map(|finalizer| BlockStatement {
                    statements: self.statements(finalizer.statements),
                    span: finalizer.span,
                }),
                span: stmt.span,
            }),
            Statement::Labeled(stmt) => Statement::Labeled(LabeledStatement {
                label: stmt.label,
                body: Box::new(
                    self.statement(*stmt.body)
                        .unwrap_or(Statement::Empty(Span::synthetic())),
                ),
                span: stmt.span,
            }),
            other => other,
        })
    }

    /// Simplify an expression bottom-up.
    pub fn expression(&self, expression: Expression) -> Expression {
        match expression {
            Expression::Conditional(conditional) => {
                let test = self.expression(*conditional.test);
                match self.truthiness(&test) {
                    Truthiness::Truthy => self.expression(*conditional.consequent),
                    t if t.is_false() => self.expression(*conditional.alternate),
                    _ => Expression::Conditional(ConditionalExpression {
                        test: Box::new(test),
                        consequent: Box::new(self.expression(*conditional.consequent)),
                        alternate: Box::new(self.expression(*conditional.alternate)),
                        span: conditional.span,
                    }),
                }
            }
            Expression::Logical(logical) => {
                let left = self.expression(*logical.left);
                let truthiness = self.truthiness(&left);
                match logical.operator {
                    LogicalOperator::NullishCoalescing if truthiness.is_determinate() => {
                        if truthiness == Truthiness::Nullish {
                            self.expression(*logical.right)
                        } else {
                            left
                        }
                    }
                    LogicalOperator::Or if truthiness.is_determinate() => {
                        if truthiness.is_false() {
                            self.expression(*logical.right)
                        } else {
                            left
                        }
                    }
                    LogicalOperator::And if truthiness.is_determinate() => {
                        if truthiness == Truthiness::Truthy {
                            self.expression(*logical.right)
                        } else {
                            left
                        }
                    }
                    _ => Expression::Logical(LogicalExpression {
                        left: Box::new(left),
                        right: Box::new(self.expression(*logical.right)),
                        operator: logical.operator,
                        span: logical.span,
                    }),
                }
            }
            Expression::Unary(unary) => {
                let operand = self.expression(*unary.operand);
                let truthiness = self.truthiness(&operand);
                match unary.operator {
                    UnaryOperator::Void if truthiness.is_determinate() => {
                        Expression::Unary(UnaryExpression {
                            operator: UnaryOperator::Void,
                            operand: Box::new(Expression::Int(IntLiteral {
                                value: 0,
                                span: Span::synthetic(),
                            })),
                            span: unary.span,
                        })
                    }
                    UnaryOperator::Not if truthiness.is_determinate() => {
                        Expression::Boolean(BooleanLiteral {
                            value: truthiness.is_false(),
                            span: unary.span,
                        })
                    }
                    operator => Expression::Unary(UnaryExpression {
                        operator,
                        operand: Box::new(operand),
                        span: unary.span,
                    }),
                }
            }
            Expression::Paren(paren) => Expression::Paren(ParenthesizedExpression {
                expression: Box::new(self.expression(*paren.expression)),
                span: paren.span,
            }),
            Expression::Binary(binary) => Expression::Binary(BinaryExpression {
                operator: binary.operator,
                left: Box::new(self.expression(*binary.left)),
                right: Box::new(self.expression(*binary.right)),
                span: binary.span,
            }),
            Expression::Sequence(sequence) => Expression::Sequence(SequenceExpression {
                expressions: sequence
                    .expressions
                    .into_iter()
                    .map(|expr| self.expression(expr))
                    .collect(),
                span: sequence.span,
            }),
            Expression::Call(call) => Expression::Call(CallExpression {
                callee: Box::new(self.expression(*call.callee)),
                arguments: self.arguments(call.arguments),
                optional: call.optional,
                span: call.span,
            }),
            Expression::New(new) => Expression::New(NewExpression {
                callee: Box::new(self.expression(*new.callee)),
                arguments: self.arguments(new.arguments),
                span: new.span,
            }),
            Expression::Member(member) => Expression::Member(MemberExpression {
                object: Box::new(self.expression(*member.object)),
                property: member.property,
                optional: member.optional,
                span: member.span,
            }),
            Expression::Index(index) => Expression::Index(IndexExpression {
                object: Box::new(self.expression(*index.object)),
                index: Box::new(self.expression(*index.index)),
                span: index.span,
            }),
            Expression::Assignment(assignment) => Expression::Assignment(AssignmentExpression {
                operator: assignment.operator,
                left: assignment.left,
                right: Box::new(self.expression(*assignment.right)),
                span: assignment.span,
            }),
            Expression::Array(array) => Expression::Array(ArrayExpression {
                elements: array
                    .elements
                    .into_iter()
                    .map(|element| {
                        element.map(|element| match element {
                            ArrayElement::Expression(e) => {
                                ArrayElement::Expression(self.expression(e))
                            }
                            ArrayElement::Spread(e) => ArrayElement::Spread(self.expression(e)),
                        })
                    })
                    .collect(),
                span: array.span,
            }),
            Expression::Object(object) => Expression::Object(ObjectExpression {
                properties: object
                    .properties
                    .into_iter()
                    .map(|property| match property {
                        ObjectProperty::Property(prop) => ObjectProperty::Property(Property {
                            key: prop.key,
                            value: self.expression(prop.value),
                            shorthand: prop.shorthand,
                            span: prop.span,
                        }),
                        ObjectProperty::Spread(spread) => ObjectProperty::Spread(SpreadProperty {
                            argument: self.expression(spread.argument),
                            span: spread.span,
                        }),
                        method => method,
                    })
                    .collect(),
                span: object.span,
            }),
            Expression::Template(template) => Expression::Template(TemplateLiteral {
                parts: template
                    .parts
                    .into_iter()
                    .map(|part| match part {
                        TemplatePart::Expression(expr) => {
                            TemplatePart::Expression(Box::new(self.expression(*expr)))
                        }
                        text => text,
                    })
                    .collect(),
                span: template.span,
            }),
            other => other,
        }
    }

    fn arguments(&self, arguments: Vec<Argument>) -> Vec<Argument> {
        arguments
            .into_iter()
            .map(|argument| match argument {
                Argument::Expression(e) => Argument::Expression(self.expression(e)),
                Argument::Spread(spread) => Argument::Spread(SpreadElement {
                    argument: self.expression(spread.argument),
                    span: spread.span,
                }),
            })
            .collect()
    }
}
