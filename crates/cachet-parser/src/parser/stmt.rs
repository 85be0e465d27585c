//! Statement parsing

use super::{expr, pattern, types, ParseError, Parser, MAX_PARSE_DEPTH};
use crate::ast::*;
use crate::interner::Symbol;
use crate::token::{Span, Token};

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    parser.depth += 1;
    if parser.depth > MAX_PARSE_DEPTH {
        parser.depth -= 1;
        return Err(ParseError::depth_limit(parser.current_span()));
    }
    let result = parse_statement_inner(parser);
    parser.depth -= 1;
    result
}

fn parse_statement_inner(parser: &mut Parser) -> Result<Statement, ParseError> {
    match parser.current() {
        Token::Let | Token::Const | Token::Var => {
            let decl = parse_variable_declaration(parser)?;
            parser.eat_semicolon();
            Ok(Statement::VariableDecl(decl))
        }
        Token::Function => parse_function_declaration(parser, false),
        Token::Async if parser.peek() == Some(&Token::Function) => {
            parser.advance();
            parse_function_declaration(parser, true)
        }
        Token::Type => parse_type_alias(parser),
        Token::If => parse_if_statement(parser),
        Token::While => parse_while_statement(parser),
        Token::Do => parse_do_while_statement(parser),
        Token::For => parse_for_statement(parser),
        Token::Switch => parse_switch_statement(parser),
        Token::Try => parse_try_statement(parser),
        Token::Return => parse_return_statement(parser),
        Token::Break => parse_break_statement(parser),
        Token::Continue => parse_continue_statement(parser),
        Token::Throw => parse_throw_statement(parser),
        Token::Import => parse_import_declaration(parser),
        Token::Export => parse_export_declaration(parser),
        Token::LeftBrace => {
            let block = parse_block(parser)?;
            Ok(Statement::Block(block))
        }
        Token::Semicolon => {
            let span = parser.current_span();
            parser.advance();
            Ok(Statement::Empty(span))
        }
        // Labeled statement: name: <statement>
        Token::Identifier(_) if parser.peek() == Some(&Token::Colon) => {
            let label = parser.expect_identifier()?;
            parser.expect(Token::Colon)?;
            let body = parse_statement(parser)?;
            let span = parser.combine_spans(&label.span, body.span());
            Ok(Statement::Labeled(LabeledStatement {
                label,
                body: Box::new(body),
                span,
            }))
        }
        _ => {
            let start_span = parser.current_span();
            let expression = expr::parse_expression(parser)?;
            parser.eat_semicolon();
            let span = parser.combine_spans(&start_span, expression.span());
            Ok(Statement::Expression(ExpressionStatement { expression, span }))
        }
    }
}

/// Parse a braced block: { statements }
pub fn parse_block(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let mut statements = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        statements.push(parse_statement(parser)?);
    }
    let end_span = parser.current_span();
    parser.expect(Token::RightBrace)?;
    Ok(BlockStatement {
        statements,
        span: parser.combine_spans(&start_span, &end_span),
    })
}

// ============================================================================
// Variable Declarations
// ============================================================================

/// Parse a variable declaration: let x = 1, y = 2
///
/// Does not consume a trailing semicolon; callers that expect one eat it.
pub(super) fn parse_variable_declaration(parser: &mut Parser) -> Result<VariableDecl, ParseError> {
    let start_span = parser.current_span();
    let kind = match parser.current() {
        Token::Let => VariableKind::Let,
        Token::Const => VariableKind::Const,
        Token::Var => VariableKind::Var,
        _ => return Err(parser.unexpected_token(&[Token::Let, Token::Const, Token::Var])),
    };
    parser.advance();

    let mut declarators = Vec::new();
    loop {
        let decl_start = parser.current_span();
        let pat = pattern::parse_pattern(parser)?;
        let type_annotation = if parser.check(&Token::Colon) {
            parser.advance();
            Some(types::parse_type_annotation(parser)?)
        } else {
            None
        };
        let init = if parser.check(&Token::Equal) {
            parser.advance();
            Some(expr::parse_assignment(parser)?)
        } else {
            None
        };
        let end_span = match &init {
            Some(e) => *e.span(),
            None => *pat.span(),
        };
        declarators.push(VariableDeclarator {
            pattern: pat,
            type_annotation,
            init,
            span: parser.combine_spans(&decl_start, &end_span),
        });

        if parser.check(&Token::Comma) {
            parser.advance();
        } else {
            break;
        }
    }

    let end = declarators.last().map(|d| d.span).unwrap_or(start_span);
    Ok(VariableDecl {
        kind,
        declarators,
        span: parser.combine_spans(&start_span, &end),
    })
}

// ============================================================================
// Function Declarations
// ============================================================================

fn parse_function_declaration(parser: &mut Parser, is_async: bool) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Function)?;
    let name = parser.expect_identifier()?;
    let params = parse_parameters(parser)?;
    let return_type = if parser.check(&Token::Colon) {
        parser.advance();
        Some(types::parse_type_annotation(parser)?)
    } else {
        None
    };
    let body = parse_block(parser)?;
    let span = parser.combine_spans(&start_span, &body.span);
    Ok(Statement::FunctionDecl(FunctionDecl {
        name,
        params,
        return_type,
        body,
        is_async,
        span,
    }))
}

/// Parse a parenthesized parameter list: (a, b: T = 1, ...rest is not supported)
pub(crate) fn parse_parameters(parser: &mut Parser) -> Result<Vec<Parameter>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut params = Vec::new();
    while !parser.check(&Token::RightParen) && !parser.at_eof() {
        let start_span = parser.current_span();
        let pat = pattern::parse_pattern(parser)?;
        let type_annotation = if parser.check(&Token::Colon) {
            parser.advance();
            Some(types::parse_type_annotation(parser)?)
        } else {
            None
        };
        let default_value = if parser.check(&Token::Equal) {
            parser.advance();
            Some(expr::parse_assignment(parser)?)
        } else {
            None
        };
        let end_span = parser.current_span();
        params.push(Parameter {
            pattern: pat,
            type_annotation,
            default_value,
            span: parser.combine_spans(&start_span, &end_span),
        });
        if !parser.check(&Token::RightParen) {
            parser.expect(Token::Comma)?;
        }
    }
    parser.expect(Token::RightParen)?;
    Ok(params)
}

// ============================================================================
// Type Aliases
// ============================================================================

fn parse_type_alias(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Type)?;
    let name = parser.expect_identifier()?;
    parser.expect(Token::Equal)?;
    let type_annotation = types::parse_type_annotation(parser)?;
    parser.eat_semicolon();
    let span = parser.combine_spans(&start_span, &type_annotation.span);
    Ok(Statement::TypeAliasDecl(TypeAliasDecl {
        name,
        type_annotation,
        span,
    }))
}

// ============================================================================
// Control Flow
// ============================================================================

fn parse_if_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::If)?;
    parser.expect(Token::LeftParen)?;
    let condition = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    let then_branch = parse_statement(parser)?;
    let else_branch = if parser.check(&Token::Else) {
        parser.advance();
        Some(Box::new(parse_statement(parser)?))
    } else {
        None
    };
    let end_span = else_branch
        .as_ref()
        .map(|s| *s.span())
        .unwrap_or(*then_branch.span());
    Ok(Statement::If(IfStatement {
        condition,
        then_branch: Box::new(then_branch),
        else_branch,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

fn parse_while_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::While)?;
    parser.expect(Token::LeftParen)?;
    let condition = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    let body = parse_statement(parser)?;
    let span = parser.combine_spans(&start_span, body.span());
    Ok(Statement::While(WhileStatement {
        condition,
        body: Box::new(body),
        span,
    }))
}

fn parse_do_while_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Do)?;
    let body = parse_statement(parser)?;
    parser.expect(Token::While)?;
    parser.expect(Token::LeftParen)?;
    let condition = expr::parse_expression(parser)?;
    let end_span = parser.current_span();
    parser.expect(Token::RightParen)?;
    parser.eat_semicolon();
    Ok(Statement::DoWhile(DoWhileStatement {
        body: Box::new(body),
        condition,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

/// Parse for / for-in / for-of, distinguished after the head.
fn parse_for_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::For)?;
    parser.expect(Token::LeftParen)?;

    // Empty init: for (; test; update)
    if parser.check(&Token::Semicolon) {
        parser.advance();
        return parse_c_style_for(parser, start_span, None);
    }

    if matches!(parser.current(), Token::Let | Token::Const | Token::Var) {
        let decl = parse_variable_declaration(parser)?;
        match parser.current() {
            Token::In => {
                parser.advance();
                let head = ForHead::VariableDecl(decl);
                let right = expr::parse_expression(parser)?;
                parser.expect(Token::RightParen)?;
                let body = parse_statement(parser)?;
                let span = parser.combine_spans(&start_span, body.span());
                return Ok(Statement::ForIn(ForInStatement {
                    left: head,
                    right,
                    body: Box::new(body),
                    span,
                }));
            }
            Token::Of => {
                parser.advance();
                let head = ForHead::VariableDecl(decl);
                let right = expr::parse_assignment(parser)?;
                parser.expect(Token::RightParen)?;
                let body = parse_statement(parser)?;
                let span = parser.combine_spans(&start_span, body.span());
                return Ok(Statement::ForOf(ForOfStatement {
                    left: head,
                    right,
                    body: Box::new(body),
                    span,
                }));
            }
            _ => {
                parser.expect(Token::Semicolon)?;
                return parse_c_style_for(parser, start_span, Some(ForInit::VariableDecl(decl)));
            }
        }
    }

    // Expression head: either `for (x in/of y)` or a C-style init.
    parser.no_in = true;
    let head_expr = expr::parse_expression(parser);
    parser.no_in = false;
    let head_expr = head_expr?;

    match parser.current() {
        Token::In => {
            parser.advance();
            let head = ForHead::Pattern(expression_to_pattern(parser, head_expr)?);
            let right = expr::parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            let body = parse_statement(parser)?;
            let span = parser.combine_spans(&start_span, body.span());
            Ok(Statement::ForIn(ForInStatement {
                left: head,
                right,
                body: Box::new(body),
                span,
            }))
        }
        Token::Of => {
            parser.advance();
            let head = ForHead::Pattern(expression_to_pattern(parser, head_expr)?);
            let right = expr::parse_assignment(parser)?;
            parser.expect(Token::RightParen)?;
            let body = parse_statement(parser)?;
            let span = parser.combine_spans(&start_span, body.span());
            Ok(Statement::ForOf(ForOfStatement {
                left: head,
                right,
                body: Box::new(body),
                span,
            }))
        }
        _ => {
            parser.expect(Token::Semicolon)?;
            parse_c_style_for(parser, start_span, Some(ForInit::Expression(head_expr)))
        }
    }
}

fn parse_c_style_for(
    parser: &mut Parser,
    start_span: Span,
    init: Option<ForInit>,
) -> Result<Statement, ParseError> {
    let test = if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(expr::parse_expression(parser)?)
    };
    parser.expect(Token::Semicolon)?;
    let update = if parser.check(&Token::RightParen) {
        None
    } else {
        Some(expr::parse_expression(parser)?)
    };
    parser.expect(Token::RightParen)?;
    let body = parse_statement(parser)?;
    let span = parser.combine_spans(&start_span, body.span());
    Ok(Statement::For(ForStatement {
        init,
        test,
        update,
        body: Box::new(body),
        span,
    }))
}

/// Reinterpret an already-parsed expression as a for-head pattern.
fn expression_to_pattern(_parser: &Parser, expr: Expression) -> Result<Pattern, ParseError> {
    match expr {
        Expression::Identifier(id) => Ok(Pattern::Identifier(id)),
        other => Err(ParseError::invalid_syntax(
            "Unsupported for-loop target",
            *other.span(),
        )
        .with_suggestion("Use an identifier or a declaration: for (const x of items)")),
    }
}

fn parse_switch_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Switch)?;
    parser.expect(Token::LeftParen)?;
    let discriminant = expr::parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    parser.expect(Token::LeftBrace)?;

    let mut cases = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let case_start = parser.current_span();
        let test = match parser.current() {
            Token::Case => {
                parser.advance();
                Some(expr::parse_expression(parser)?)
            }
            Token::Default => {
                parser.advance();
                None
            }
            _ => return Err(parser.unexpected_token(&[Token::Case, Token::Default])),
        };
        parser.expect(Token::Colon)?;

        let mut consequent = Vec::new();
        while !matches!(
            parser.current(),
            Token::Case | Token::Default | Token::RightBrace | Token::Eof
        ) {
            consequent.push(parse_statement(parser)?);
        }
        let end_span = parser.current_span();
        cases.push(SwitchCase {
            test,
            consequent,
            span: parser.combine_spans(&case_start, &end_span),
        });
    }

    let end_span = parser.current_span();
    parser.expect(Token::RightBrace)?;
    Ok(Statement::Switch(SwitchStatement {
        discriminant,
        cases,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

fn parse_try_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Try)?;
    let block = parse_block(parser)?;

    let handler = if parser.check(&Token::Catch) {
        let catch_start = parser.current_span();
        parser.advance();
        let param = if parser.check(&Token::LeftParen) {
            parser.advance();
            let pat = pattern::parse_pattern(parser)?;
            parser.expect(Token::RightParen)?;
            Some(pat)
        } else {
            None
        };
        let body = parse_block(parser)?;
        let span = parser.combine_spans(&catch_start, &body.span);
        Some(CatchClause { param, body, span })
    } else {
        None
    };

    let finalizer = if parser.check(&Token::Finally) {
        parser.advance();
        Some(parse_block(parser)?)
    } else {
        None
    };

    if handler.is_none() && finalizer.is_none() {
        return Err(ParseError::invalid_syntax(
            "try statement requires catch or finally",
            start_span,
        ));
    }

    let end_span = finalizer
        .as_ref()
        .map(|b| b.span)
        .or_else(|| handler.as_ref().map(|h| h.span))
        .unwrap_or(block.span);
    Ok(Statement::Try(TryStatement {
        block,
        handler,
        finalizer,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

fn parse_return_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Return)?;
    let value = if parser.check(&Token::Semicolon)
        || parser.check(&Token::RightBrace)
        || parser.at_eof()
    {
        None
    } else {
        Some(expr::parse_expression(parser)?)
    };
    parser.eat_semicolon();
    let end_span = value.as_ref().map(|v| *v.span()).unwrap_or(start_span);
    Ok(Statement::Return(ReturnStatement {
        value,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

fn parse_break_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Break)?;
    let label = if let Token::Identifier(sym) = parser.current() {
        let id = Identifier::new(*sym, parser.current_span());
        parser.advance();
        Some(id)
    } else {
        None
    };
    parser.eat_semicolon();
    Ok(Statement::Break(BreakStatement {
        span: label
            .as_ref()
            .map(|l| parser.combine_spans(&start_span, &l.span))
            .unwrap_or(start_span),
        label,
    }))
}

fn parse_continue_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Continue)?;
    let label = if let Token::Identifier(sym) = parser.current() {
        let id = Identifier::new(*sym, parser.current_span());
        parser.advance();
        Some(id)
    } else {
        None
    };
    parser.eat_semicolon();
    Ok(Statement::Continue(ContinueStatement {
        span: label
            .as_ref()
            .map(|l| parser.combine_spans(&start_span, &l.span))
            .unwrap_or(start_span),
        label,
    }))
}

fn parse_throw_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Throw)?;
    let value = expr::parse_expression(parser)?;
    parser.eat_semicolon();
    let span = parser.combine_spans(&start_span, value.span());
    Ok(Statement::Throw(ThrowStatement { value, span }))
}

// ============================================================================
// Modules
// ============================================================================

fn parse_import_declaration(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Import)?;

    let mut specifiers = Vec::new();
    match parser.current() {
        Token::Star => {
            parser.advance();
            parser.expect(Token::As)?;
            specifiers.push(ImportSpecifier::Namespace(parser.expect_identifier()?));
        }
        Token::LeftBrace => {
            parse_named_import_specifiers(parser, &mut specifiers)?;
        }
        Token::Identifier(_) => {
            specifiers.push(ImportSpecifier::Default(parser.expect_identifier()?));
            if parser.check(&Token::Comma) {
                parser.advance();
                parse_named_import_specifiers(parser, &mut specifiers)?;
            }
        }
        _ => {
            return Err(parser.unexpected_token(&[
                Token::Star,
                Token::LeftBrace,
                Token::Identifier(Symbol::dummy()),
            ]))
        }
    }

    parser.expect(Token::From)?;
    let source_span = parser.current_span();
    let Token::StringLiteral(value) = parser.current().clone() else {
        return Err(parser.unexpected_token(&[Token::StringLiteral(Symbol::dummy())]));
    };
    parser.advance();
    parser.eat_semicolon();

    Ok(Statement::Import(ImportDecl {
        specifiers,
        source: StringLiteral {
            value,
            span: source_span,
        },
        span: parser.combine_spans(&start_span, &source_span),
    }))
}

fn parse_named_import_specifiers(
    parser: &mut Parser,
    out: &mut Vec<ImportSpecifier>,
) -> Result<(), ParseError> {
    parser.expect(Token::LeftBrace)?;
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let name = parser.expect_identifier()?;
        let alias = if parser.check(&Token::As) {
            parser.advance();
            Some(parser.expect_identifier()?)
        } else {
            None
        };
        out.push(ImportSpecifier::Named { name, alias });
        if !parser.check(&Token::RightBrace) {
            parser.expect(Token::Comma)?;
        }
    }
    parser.expect(Token::RightBrace)?;
    Ok(())
}

fn parse_export_declaration(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Export)?;

    match parser.current() {
        Token::Star => {
            parser.advance();
            parser.expect(Token::From)?;
            let source_span = parser.current_span();
            let Token::StringLiteral(value) = parser.current().clone() else {
                return Err(parser.unexpected_token(&[Token::StringLiteral(Symbol::dummy())]));
            };
            parser.advance();
            parser.eat_semicolon();
            Ok(Statement::Export(ExportDecl::All {
                source: StringLiteral {
                    value,
                    span: source_span,
                },
                span: parser.combine_spans(&start_span, &source_span),
            }))
        }
        Token::LeftBrace => {
            parser.advance();
            let mut specifiers = Vec::new();
            while !parser.check(&Token::RightBrace) && !parser.at_eof() {
                let name = parser.expect_identifier()?;
                let alias = if parser.check(&Token::As) {
                    parser.advance();
                    Some(parser.expect_identifier()?)
                } else {
                    None
                };
                specifiers.push(ExportSpecifier { name, alias });
                if !parser.check(&Token::RightBrace) {
                    parser.expect(Token::Comma)?;
                }
            }
            let end_span = parser.current_span();
            parser.expect(Token::RightBrace)?;

            let source = if parser.check(&Token::From) {
                parser.advance();
                let source_span = parser.current_span();
                let Token::StringLiteral(value) = parser.current().clone() else {
                    return Err(parser.unexpected_token(&[Token::StringLiteral(Symbol::dummy())]));
                };
                parser.advance();
                Some(StringLiteral {
                    value,
                    span: source_span,
                })
            } else {
                None
            };
            parser.eat_semicolon();
            Ok(Statement::Export(ExportDecl::Named {
                specifiers,
                source,
                span: parser.combine_spans(&start_span, &end_span),
            }))
        }
        _ => {
            let decl = parse_statement(parser)?;
            Ok(Statement::Export(ExportDecl::Declaration(Box::new(decl))))
        }
    }
}
