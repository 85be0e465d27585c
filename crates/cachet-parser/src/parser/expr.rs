//! Expression parsing
//!
//! Precedence climbing over the binary operator table, with dedicated
//! handling for assignment, conditional, pipeline, unary/update, postfix
//! chains, and primaries. Arrow functions are disambiguated from
//! parenthesized expressions by scanning for the matching `)` and looking at
//! what follows; uncertain cases are resolved by speculative parsing with
//! position restore.

use super::precedence::{get_precedence, is_right_associative, Precedence};
use super::{jsx, stmt, types, ParseError, Parser, MAX_PARSE_DEPTH};
use crate::ast::*;
use crate::interner::Symbol;
use crate::token::{Token, TemplatePart as TokenTemplatePart};

/// Parse a full expression, including comma sequences.
pub fn parse_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let first = parse_assignment(parser)?;
    if !parser.check(&Token::Comma) {
        return Ok(first);
    }

    let start_span = *first.span();
    let mut expressions = vec![first];
    while parser.check(&Token::Comma) {
        parser.advance();
        expressions.push(parse_assignment(parser)?);
    }
    let span = parser.combine_spans(&start_span, expressions.last().unwrap().span());
    Ok(Expression::Sequence(SequenceExpression { expressions, span }))
}

/// Parse an assignment-level expression (no top-level comma).
pub fn parse_assignment(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.depth += 1;
    if parser.depth > MAX_PARSE_DEPTH {
        parser.depth -= 1;
        return Err(ParseError::depth_limit(parser.current_span()));
    }
    let result = parse_assignment_inner(parser);
    parser.depth -= 1;
    result
}

fn parse_assignment_inner(parser: &mut Parser) -> Result<Expression, ParseError> {
    // Arrow functions first: they bind looser than any operator.
    match parser.current() {
        Token::Identifier(_) if parser.peek() == Some(&Token::Arrow) => {
            return parse_arrow_from_identifier(parser, false);
        }
        Token::Async => {
            if let Some(Token::Identifier(_)) = parser.peek() {
                if parser.peek2() == Some(&Token::Arrow) {
                    parser.advance(); // async
                    return parse_arrow_from_identifier(parser, true);
                }
            }
            if parser.peek() == Some(&Token::LeftParen) {
                if let Some(arrow) = try_parse_parenthesized_arrow(parser, true)? {
                    return Ok(arrow);
                }
            }
        }
        Token::LeftParen => {
            if let Some(arrow) = try_parse_parenthesized_arrow(parser, false)? {
                return Ok(arrow);
            }
        }
        _ => {}
    }

    let left = parse_pipeline(parser)?;

    let operator = match parser.current() {
        Token::Equal => AssignmentOperator::Assign,
        Token::PlusEqual => AssignmentOperator::AddAssign,
        Token::MinusEqual => AssignmentOperator::SubAssign,
        Token::StarEqual => AssignmentOperator::MulAssign,
        Token::SlashEqual => AssignmentOperator::DivAssign,
        Token::PercentEqual => AssignmentOperator::ModAssign,
        Token::AmpEqual => AssignmentOperator::AndAssign,
        Token::PipeEqual => AssignmentOperator::OrAssign,
        Token::CaretEqual => AssignmentOperator::XorAssign,
        Token::LessLessEqual => AssignmentOperator::LeftShiftAssign,
        Token::GreaterGreaterEqual => AssignmentOperator::RightShiftAssign,
        Token::GreaterGreaterGreaterEqual => AssignmentOperator::UnsignedRightShiftAssign,
        _ => return Ok(left),
    };

    if !is_assignment_target(&left) {
        return Err(ParseError::invalid_syntax(
            "Invalid assignment target",
            *left.span(),
        ));
    }

    parser.advance();
    let right = parse_assignment(parser)?;
    let span = parser.combine_spans(left.span(), right.span());
    Ok(Expression::Assignment(AssignmentExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }))
}

fn is_assignment_target(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::Identifier(_)
            | Expression::Member(_)
            | Expression::Index(_)
            | Expression::Array(_)
            | Expression::Object(_)
    )
}

/// Parse the pipeline level: a |> f |> g
fn parse_pipeline(parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut left = parse_conditional(parser)?;
    while parser.check(&Token::PipeGreater) {
        parser.advance();
        let right = parse_conditional(parser)?;
        let span = parser.combine_spans(left.span(), right.span());
        left = Expression::Binary(BinaryExpression {
            operator: BinaryOperator::Pipeline,
            left: Box::new(left),
            right: Box::new(right),
            span,
        });
    }
    Ok(left)
}

/// Parse the conditional level: test ? consequent : alternate
fn parse_conditional(parser: &mut Parser) -> Result<Expression, ParseError> {
    let test = parse_binary(parser, Precedence::NullCoalescing as u8)?;
    if !parser.check(&Token::Question) {
        return Ok(test);
    }
    parser.advance();
    let consequent = parse_assignment(parser)?;
    parser.expect(Token::Colon)?;
    let alternate = parse_assignment(parser)?;
    let span = parser.combine_spans(test.span(), alternate.span());
    Ok(Expression::Conditional(ConditionalExpression {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
        span,
    }))
}

/// Precedence-climbing parse of binary and logical operators.
fn parse_binary(parser: &mut Parser, min_prec: u8) -> Result<Expression, ParseError> {
    let mut left = parse_unary(parser)?;

    loop {
        // `expr as Type` binds like a relational operator
        if parser.check(&Token::As) && Precedence::Relational as u8 >= min_prec {
            parser.advance();
            let target_type = types::parse_type_annotation(parser)?;
            let span = parser.combine_spans(left.span(), &target_type.span);
            left = Expression::TypeCast(TypeCastExpression {
                expression: Box::new(left),
                target_type,
                span,
            });
            continue;
        }

        if parser.no_in && matches!(parser.current(), Token::In) {
            break;
        }

        let prec = get_precedence(parser.current());
        if (prec as u8) < min_prec || prec < Precedence::NullCoalescing {
            break;
        }

        let op_token = parser.advance();
        let next_min = if is_right_associative(&op_token) {
            prec as u8
        } else {
            prec as u8 + 1
        };
        let right = parse_binary(parser, next_min)?;
        let span = parser.combine_spans(left.span(), right.span());

        left = match logical_operator(&op_token) {
            Some(operator) => Expression::Logical(LogicalExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                span,
            }),
            None => Expression::Binary(BinaryExpression {
                operator: binary_operator(&op_token, &span)?,
                left: Box::new(left),
                right: Box::new(right),
                span,
            }),
        };
    }

    Ok(left)
}

fn logical_operator(token: &Token) -> Option<LogicalOperator> {
    match token {
        Token::AmpAmp => Some(LogicalOperator::And),
        Token::PipePipe => Some(LogicalOperator::Or),
        Token::QuestionQuestion => Some(LogicalOperator::NullishCoalescing),
        _ => None,
    }
}

fn binary_operator(token: &Token, span: &crate::token::Span) -> Result<BinaryOperator, ParseError> {
    Ok(match token {
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Subtract,
        Token::Star => BinaryOperator::Multiply,
        Token::Slash => BinaryOperator::Divide,
        Token::Percent => BinaryOperator::Modulo,
        Token::StarStar => BinaryOperator::Exponent,
        Token::EqualEqual => BinaryOperator::Equal,
        Token::BangEqual => BinaryOperator::NotEqual,
        Token::EqualEqualEqual => BinaryOperator::StrictEqual,
        Token::BangEqualEqual => BinaryOperator::StrictNotEqual,
        Token::Less => BinaryOperator::LessThan,
        Token::LessEqual => BinaryOperator::LessEqual,
        Token::Greater => BinaryOperator::GreaterThan,
        Token::GreaterEqual => BinaryOperator::GreaterEqual,
        Token::Amp => BinaryOperator::BitwiseAnd,
        Token::Pipe => BinaryOperator::BitwiseOr,
        Token::Caret => BinaryOperator::BitwiseXor,
        Token::LessLess => BinaryOperator::LeftShift,
        Token::GreaterGreater => BinaryOperator::RightShift,
        Token::GreaterGreaterGreater => BinaryOperator::UnsignedRightShift,
        Token::In => BinaryOperator::In,
        Token::Instanceof => BinaryOperator::Instanceof,
        Token::PipeGreater => BinaryOperator::Pipeline,
        other => {
            return Err(ParseError::invalid_syntax(
                format!("'{}' is not a binary operator", other),
                *span,
            ))
        }
    })
}

/// Parse unary, update, and await prefixes.
fn parse_unary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    let operator = match parser.current() {
        Token::Bang => Some(UnaryOperator::Not),
        Token::Tilde => Some(UnaryOperator::BitwiseNot),
        Token::Plus => Some(UnaryOperator::Plus),
        Token::Minus => Some(UnaryOperator::Minus),
        Token::Typeof => Some(UnaryOperator::Typeof),
        Token::Void => Some(UnaryOperator::Void),
        Token::Delete => Some(UnaryOperator::Delete),
        _ => None,
    };
    if let Some(operator) = operator {
        parser.advance();
        let operand = parse_unary(parser)?;
        let span = parser.combine_spans(&start_span, operand.span());
        return Ok(Expression::Unary(UnaryExpression {
            operator,
            operand: Box::new(operand),
            span,
        }));
    }

    match parser.current() {
        Token::PlusPlus | Token::MinusMinus => {
            let operator = if parser.check(&Token::PlusPlus) {
                UpdateOperator::Increment
            } else {
                UpdateOperator::Decrement
            };
            parser.advance();
            let argument = parse_unary(parser)?;
            let span = parser.combine_spans(&start_span, argument.span());
            Ok(Expression::Update(UpdateExpression {
                operator,
                prefix: true,
                argument: Box::new(argument),
                span,
            }))
        }
        Token::Await => {
            parser.advance();
            let argument = parse_unary(parser)?;
            let span = parser.combine_spans(&start_span, argument.span());
            Ok(Expression::Await(AwaitExpression {
                argument: Box::new(argument),
                span,
            }))
        }
        _ => parse_postfix(parser),
    }
}

/// Parse postfix chains: member access, indexing, calls, tagged templates,
/// and postfix updates.
fn parse_postfix(parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut expr = parse_primary(parser)?;

    loop {
        match parser.current() {
            Token::Dot => {
                parser.advance();
                let property = parser.expect_identifier()?;
                let span = parser.combine_spans(expr.span(), &property.span);
                expr = Expression::Member(MemberExpression {
                    object: Box::new(expr),
                    property,
                    optional: false,
                    span,
                });
            }
            Token::QuestionDot => {
                parser.advance();
                match parser.current() {
                    Token::LeftParen => {
                        let arguments = parse_arguments(parser)?;
                        let end_span = parser.current_span();
                        let span = parser.combine_spans(expr.span(), &end_span);
                        expr = Expression::Call(CallExpression {
                            callee: Box::new(expr),
                            arguments,
                            optional: true,
                            span,
                        });
                    }
                    Token::LeftBracket => {
                        parser.advance();
                        let index = parse_expression(parser)?;
                        let end_span = parser.current_span();
                        parser.expect(Token::RightBracket)?;
                        let span = parser.combine_spans(expr.span(), &end_span);
                        expr = Expression::Index(IndexExpression {
                            object: Box::new(expr),
                            index: Box::new(index),
                            span,
                        });
                    }
                    _ => {
                        let property = parser.expect_identifier()?;
                        let span = parser.combine_spans(expr.span(), &property.span);
                        expr = Expression::Member(MemberExpression {
                            object: Box::new(expr),
                            property,
                            optional: true,
                            span,
                        });
                    }
                }
            }
            Token::LeftBracket => {
                parser.advance();
                let index = parse_expression(parser)?;
                let end_span = parser.current_span();
                parser.expect(Token::RightBracket)?;
                let span = parser.combine_spans(expr.span(), &end_span);
                expr = Expression::Index(IndexExpression {
                    object: Box::new(expr),
                    index: Box::new(index),
                    span,
                });
            }
            Token::LeftParen => {
                let arguments = parse_arguments(parser)?;
                let end_span = parser.current_span();
                let span = parser.combine_spans(expr.span(), &end_span);
                expr = Expression::Call(CallExpression {
                    callee: Box::new(expr),
                    arguments,
                    optional: false,
                    span,
                });
            }
            Token::TemplateLiteral(_) => {
                let template_span = parser.current_span();
                let Token::TemplateLiteral(parts) = parser.advance() else {
                    unreachable!();
                };
                let quasi = parse_template_parts(parser, parts, template_span)?;
                let span = parser.combine_spans(expr.span(), &quasi.span);
                expr = Expression::TaggedTemplate(TaggedTemplateExpression {
                    tag: Box::new(expr),
                    quasi,
                    span,
                });
            }
            Token::PlusPlus | Token::MinusMinus => {
                let operator = if parser.check(&Token::PlusPlus) {
                    UpdateOperator::Increment
                } else {
                    UpdateOperator::Decrement
                };
                let end_span = parser.current_span();
                parser.advance();
                let span = parser.combine_spans(expr.span(), &end_span);
                expr = Expression::Update(UpdateExpression {
                    operator,
                    prefix: false,
                    argument: Box::new(expr),
                    span,
                });
                break;
            }
            _ => break,
        }
    }

    Ok(expr)
}

/// Parse a call argument list: (a, ...rest)
pub(super) fn parse_arguments(parser: &mut Parser) -> Result<Vec<Argument>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut arguments = Vec::new();
    while !parser.check(&Token::RightParen) && !parser.at_eof() {
        if parser.check(&Token::DotDotDot) {
            let start_span = parser.current_span();
            parser.advance();
            let argument = parse_assignment(parser)?;
            let span = parser.combine_spans(&start_span, argument.span());
            arguments.push(Argument::Spread(SpreadElement { argument, span }));
        } else {
            arguments.push(Argument::Expression(parse_assignment(parser)?));
        }
        if !parser.check(&Token::RightParen) {
            parser.expect(Token::Comma)?;
        }
    }
    parser.expect(Token::RightParen)?;
    Ok(arguments)
}

/// Parse a primary expression.
fn parse_primary(parser: &mut Parser) -> Result<Expression, ParseError> {
    let span = parser.current_span();
    match parser.current().clone() {
        Token::IntLiteral(value) => {
            parser.advance();
            Ok(Expression::Int(IntLiteral { value, span }))
        }
        Token::FloatLiteral(value) => {
            parser.advance();
            Ok(Expression::Float(FloatLiteral { value, span }))
        }
        Token::StringLiteral(value) => {
            parser.advance();
            Ok(Expression::String(StringLiteral { value, span }))
        }
        Token::TemplateLiteral(parts) => {
            parser.advance();
            let template = parse_template_parts(parser, parts, span)?;
            Ok(Expression::Template(template))
        }
        Token::True => {
            parser.advance();
            Ok(Expression::Boolean(BooleanLiteral { value: true, span }))
        }
        Token::False => {
            parser.advance();
            Ok(Expression::Boolean(BooleanLiteral { value: false, span }))
        }
        Token::Null => {
            parser.advance();
            Ok(Expression::Null(span))
        }
        Token::This => {
            parser.advance();
            Ok(Expression::This(span))
        }
        Token::Identifier(name) => {
            parser.advance();
            Ok(Expression::Identifier(Identifier::new(name, span)))
        }
        Token::LeftParen => {
            parser.advance();
            let expression = parse_expression(parser)?;
            let end_span = parser.current_span();
            parser.expect(Token::RightParen)?;
            Ok(Expression::Paren(ParenthesizedExpression {
                expression: Box::new(expression),
                span: parser.combine_spans(&span, &end_span),
            }))
        }
        Token::LeftBracket => parse_array_literal(parser),
        Token::LeftBrace => parse_object_literal(parser),
        Token::Function => parse_function_expression(parser, false),
        Token::Async => {
            if parser.peek() == Some(&Token::Function) {
                parser.advance();
                parse_function_expression(parser, true)
            } else {
                Err(parser.unexpected_token(&[Token::Function]))
            }
        }
        Token::New => parse_new_expression(parser),
        Token::Less => {
            if jsx::looks_like_jsx(parser) {
                jsx::parse_jsx(parser)
            } else {
                Err(parser.unexpected_token(&[Token::Identifier(Symbol::dummy())]))
            }
        }
        _ => Err(parser.unexpected_token(&[Token::Identifier(Symbol::dummy())])),
    }
}

/// Parse an array literal: [1, , ...rest]
fn parse_array_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBracket)?;

    let mut elements = Vec::new();
    while !parser.check(&Token::RightBracket) && !parser.at_eof() {
        if parser.check(&Token::Comma) {
            // Elision: [1, , 3]
            elements.push(None);
            parser.advance();
            continue;
        }
        let element = if parser.check(&Token::DotDotDot) {
            parser.advance();
            ArrayElement::Spread(parse_assignment(parser)?)
        } else {
            ArrayElement::Expression(parse_assignment(parser)?)
        };
        elements.push(Some(element));
        if !parser.check(&Token::RightBracket) {
            parser.expect(Token::Comma)?;
        }
    }

    let end_span = parser.current_span();
    parser.expect(Token::RightBracket)?;
    Ok(Expression::Array(ArrayExpression {
        elements,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

/// Parse an object literal: { a: 1, b, m() {}, ...rest }
fn parse_object_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;

    let mut properties = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        if parser.check(&Token::DotDotDot) {
            let spread_start = parser.current_span();
            parser.advance();
            let argument = parse_assignment(parser)?;
            let span = parser.combine_spans(&spread_start, argument.span());
            properties.push(ObjectProperty::Spread(SpreadProperty { argument, span }));
        } else {
            let is_async = parser.check(&Token::Async)
                && matches!(parser.peek(), Some(Token::Identifier(_)))
                && parser.peek2() == Some(&Token::LeftParen);
            if is_async {
                parser.advance();
            }

            let prop_start = parser.current_span();
            let key = parse_property_key(parser)?;

            if parser.check(&Token::LeftParen) {
                // Method shorthand: m(a, b) { ... }
                let params = stmt::parse_parameters(parser)?;
                let body = stmt::parse_block(parser)?;
                let span = parser.combine_spans(&prop_start, &body.span);
                properties.push(ObjectProperty::Method(ObjectMethod {
                    key,
                    params,
                    body,
                    is_async,
                    span,
                }));
            } else if parser.check(&Token::Colon) {
                parser.advance();
                let value = parse_assignment(parser)?;
                let span = parser.combine_spans(&prop_start, value.span());
                properties.push(ObjectProperty::Property(Property {
                    key,
                    value,
                    shorthand: false,
                    span,
                }));
            } else {
                // Shorthand: { a }
                let PropertyKey::Identifier(id) = &key else {
                    return Err(ParseError::invalid_syntax(
                        "Shorthand property must be an identifier",
                        prop_start,
                    ));
                };
                let value = Expression::Identifier(id.clone());
                properties.push(ObjectProperty::Property(Property {
                    key,
                    value,
                    shorthand: true,
                    span: prop_start,
                }));
            }
        }

        if !parser.check(&Token::RightBrace) {
            parser.expect(Token::Comma)?;
        }
    }

    let end_span = parser.current_span();
    parser.expect(Token::RightBrace)?;
    Ok(Expression::Object(ObjectExpression {
        properties,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

/// Parse a property key: name, "name", 0, or [expr]
fn parse_property_key(parser: &mut Parser) -> Result<PropertyKey, ParseError> {
    let span = parser.current_span();
    match parser.current().clone() {
        Token::Identifier(name) => {
            parser.advance();
            Ok(PropertyKey::Identifier(Identifier::new(name, span)))
        }
        Token::StringLiteral(value) => {
            parser.advance();
            Ok(PropertyKey::StringLiteral(StringLiteral { value, span }))
        }
        Token::IntLiteral(value) => {
            parser.advance();
            Ok(PropertyKey::IntLiteral(IntLiteral { value, span }))
        }
        Token::LeftBracket => {
            parser.advance();
            let expr = parse_assignment(parser)?;
            parser.expect(Token::RightBracket)?;
            Ok(PropertyKey::Computed(expr))
        }
        _ => Err(parser.unexpected_token(&[Token::Identifier(Symbol::dummy())])),
    }
}

/// Parse a function expression: function name?(params) { ... }
fn parse_function_expression(parser: &mut Parser, is_async: bool) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Function)?;

    let name = if let Token::Identifier(sym) = parser.current() {
        let id = Identifier::new(*sym, parser.current_span());
        parser.advance();
        Some(id)
    } else {
        None
    };

    let params = stmt::parse_parameters(parser)?;
    let return_type = if parser.check(&Token::Colon) {
        parser.advance();
        Some(types::parse_type_annotation(parser)?)
    } else {
        None
    };
    let body = stmt::parse_block(parser)?;
    let span = parser.combine_spans(&start_span, &body.span);

    Ok(Expression::Function(FunctionExpression {
        name,
        params,
        return_type,
        body,
        is_async,
        span,
    }))
}

/// Parse a new expression: new Point(1, 2)
fn parse_new_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::New)?;

    // Callee is a member chain without calls
    let mut callee = parse_primary(parser)?;
    loop {
        match parser.current() {
            Token::Dot => {
                parser.advance();
                let property = parser.expect_identifier()?;
                let span = parser.combine_spans(callee.span(), &property.span);
                callee = Expression::Member(MemberExpression {
                    object: Box::new(callee),
                    property,
                    optional: false,
                    span,
                });
            }
            Token::LeftBracket => {
                parser.advance();
                let index = parse_expression(parser)?;
                let end_span = parser.current_span();
                parser.expect(Token::RightBracket)?;
                let span = parser.combine_spans(callee.span(), &end_span);
                callee = Expression::Index(IndexExpression {
                    object: Box::new(callee),
                    index: Box::new(index),
                    span,
                });
            }
            _ => break,
        }
    }

    let arguments = if parser.check(&Token::LeftParen) {
        parse_arguments(parser)?
    } else {
        Vec::new()
    };

    let end_span = parser.current_span();
    Ok(Expression::New(NewExpression {
        callee: Box::new(callee),
        arguments,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

/// Build a template literal AST from lexed parts, parsing interpolations.
pub(super) fn parse_template_parts(
    parser: &mut Parser,
    parts: Vec<TokenTemplatePart>,
    span: crate::token::Span,
) -> Result<TemplateLiteral, ParseError> {
    let mut ast_parts = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            TokenTemplatePart::String(sym) => ast_parts.push(TemplatePart::String(sym)),
            TokenTemplatePart::Expression(tokens) => {
                let interner = std::mem::take(&mut parser.interner);
                let mut sub = Parser::from_tokens(tokens, interner);
                let result = parse_expression(&mut sub);
                parser.interner = std::mem::take(&mut sub.interner);
                let expr = result?;
                ast_parts.push(TemplatePart::Expression(Box::new(expr)));
            }
        }
    }
    Ok(TemplateLiteral {
        parts: ast_parts,
        span,
    })
}

// ============================================================================
// Arrow Functions
// ============================================================================

/// Parse `x => body` where the current token is the single identifier param.
fn parse_arrow_from_identifier(
    parser: &mut Parser,
    is_async: bool,
) -> Result<Expression, ParseError> {
    let id = parser.expect_identifier()?;
    let start_span = id.span;
    let param = Parameter {
        span: id.span,
        pattern: Pattern::Identifier(id),
        type_annotation: None,
        default_value: None,
    };
    parser.expect(Token::Arrow)?;
    parse_arrow_body(parser, vec![param], None, is_async, start_span)
}

/// Try to parse `(params) => body` / `(params): T => body`.
///
/// Scans for the matching `)` first; if the token after it cannot begin an
/// arrow, no tokens are consumed. A `:` after the `)` is ambiguous (it may
/// close a conditional branch), so that case is resolved by speculative
/// parsing with restore.
fn try_parse_parenthesized_arrow(
    parser: &mut Parser,
    is_async: bool,
) -> Result<Option<Expression>, ParseError> {
    let paren_pos = if is_async {
        parser.mark() + 1
    } else {
        parser.mark()
    };
    let Some(after) = scan_matching_paren(parser, paren_pos) else {
        return Ok(None);
    };
    if !matches!(
        parser.token_at(after),
        Some(Token::Arrow) | Some(Token::Colon)
    ) {
        return Ok(None);
    }

    let mark = parser.mark();
    if is_async {
        parser.advance();
    }
    match parse_arrow_tail(parser, is_async) {
        Ok(arrow) => Ok(Some(arrow)),
        Err(_) => {
            parser.restore(mark);
            Ok(None)
        }
    }
}

/// Index just past the `)` matching the `(` at `open`, or None.
fn scan_matching_paren(parser: &Parser, open: usize) -> Option<usize> {
    if !matches!(parser.token_at(open), Some(Token::LeftParen)) {
        return None;
    }
    let mut depth = 0usize;
    let mut pos = open;
    loop {
        match parser.token_at(pos)? {
            Token::LeftParen => depth += 1,
            Token::RightParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            Token::Eof => return None,
            _ => {}
        }
        pos += 1;
    }
}

fn parse_arrow_tail(parser: &mut Parser, is_async: bool) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    let params = stmt::parse_parameters(parser)?;
    let return_type = if parser.check(&Token::Colon) {
        parser.advance();
        Some(types::parse_type_annotation(parser)?)
    } else {
        None
    };
    parser.expect(Token::Arrow)?;
    parse_arrow_body(parser, params, return_type, is_async, start_span)
}

fn parse_arrow_body(
    parser: &mut Parser,
    params: Vec<Parameter>,
    return_type: Option<TypeAnnotation>,
    is_async: bool,
    start_span: crate::token::Span,
) -> Result<Expression, ParseError> {
    let (body, end_span) = if parser.check(&Token::LeftBrace) {
        let block = stmt::parse_block(parser)?;
        let span = block.span;
        (ArrowBody::Block(block), span)
    } else {
        let expr = parse_assignment(parser)?;
        let span = *expr.span();
        (ArrowBody::Expression(Box::new(expr)), span)
    };
    Ok(Expression::Arrow(ArrowFunction {
        params,
        return_type,
        body,
        is_async,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}
