//! Type annotation parsing
//!
//! Types are parsed for fidelity and then erased by every pass, so this
//! grammar covers the shapes that show up in component sources: named types
//! with arguments, array shorthand, unions, object types, and function types.

use super::{ParseError, Parser};
use crate::ast::*;
use crate::interner::Symbol;
use crate::token::Token;

/// Parse a type annotation (after the `:` has been consumed).
pub fn parse_type_annotation(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let first = parse_postfix_type(parser)?;
    if !parser.check(&Token::Pipe) {
        return Ok(first);
    }

    let start_span = first.span;
    let mut members = vec![first];
    while parser.check(&Token::Pipe) {
        parser.advance();
        members.push(parse_postfix_type(parser)?);
    }
    let end_span = members.last().unwrap().span;
    Ok(TypeAnnotation {
        kind: TypeKind::Union(members),
        span: parser.combine_spans(&start_span, &end_span),
    })
}

/// Parse a primary type plus `[]` suffixes.
fn parse_postfix_type(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let mut ty = parse_primary_type(parser)?;
    while parser.check(&Token::LeftBracket) && parser.peek() == Some(&Token::RightBracket) {
        parser.advance();
        let end_span = parser.current_span();
        parser.advance();
        let span = parser.combine_spans(&ty.span, &end_span);
        ty = TypeAnnotation {
            kind: TypeKind::Array(Box::new(ty)),
            span,
        };
    }
    Ok(ty)
}

fn parse_primary_type(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let start_span = parser.current_span();
    match parser.current() {
        Token::Identifier(_) => {
            let name = parser.expect_identifier()?;
            let mut args = Vec::new();
            let mut end_span = name.span;
            if parser.check(&Token::Less) {
                parser.advance();
                while !parser.check(&Token::Greater) && !parser.at_eof() {
                    args.push(parse_type_annotation(parser)?);
                    if !parser.check(&Token::Greater) {
                        parser.expect(Token::Comma)?;
                    }
                }
                end_span = parser.current_span();
                parser.expect(Token::Greater)?;
            }
            Ok(TypeAnnotation {
                kind: TypeKind::Named { name, args },
                span: parser.combine_spans(&start_span, &end_span),
            })
        }
        Token::Null => {
            parser.advance();
            let name = Identifier::new(parser.intern("null"), start_span);
            Ok(TypeAnnotation {
                kind: TypeKind::Named { name, args: vec![] },
                span: start_span,
            })
        }
        Token::LeftBrace => parse_object_type(parser),
        Token::LeftParen => parse_function_type(parser),
        _ => Err(parser.unexpected_token(&[
            Token::Identifier(Symbol::dummy()),
            Token::LeftBrace,
            Token::LeftParen,
        ])),
    }
}

/// Parse an object type: { label: string; count?: number }
fn parse_object_type(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;

    let mut fields = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let name = parser.expect_identifier()?;
        let optional = if parser.check(&Token::Question) {
            parser.advance();
            true
        } else {
            false
        };
        parser.expect(Token::Colon)?;
        let annotation = parse_type_annotation(parser)?;
        let span = parser.combine_spans(&name.span, &annotation.span);
        fields.push(TypeField {
            name,
            optional,
            annotation,
            span,
        });
        if parser.check(&Token::Semicolon) || parser.check(&Token::Comma) {
            parser.advance();
        }
    }

    let end_span = parser.current_span();
    parser.expect(Token::RightBrace)?;
    Ok(TypeAnnotation {
        kind: TypeKind::Object(fields),
        span: parser.combine_spans(&start_span, &end_span),
    })
}

/// Parse a function type: (x: number, y: string) => boolean
fn parse_function_type(parser: &mut Parser) -> Result<TypeAnnotation, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftParen)?;

    let mut params = Vec::new();
    while !parser.check(&Token::RightParen) && !parser.at_eof() {
        // Parameter names are optional and ignored: (x: T) or (T)
        if matches!(parser.current(), Token::Identifier(_)) && parser.peek() == Some(&Token::Colon)
        {
            parser.advance();
            parser.advance();
        }
        params.push(parse_type_annotation(parser)?);
        if !parser.check(&Token::RightParen) {
            parser.expect(Token::Comma)?;
        }
    }
    parser.expect(Token::RightParen)?;
    parser.expect(Token::Arrow)?;
    let return_type = parse_type_annotation(parser)?;
    let span = parser.combine_spans(&start_span, &return_type.span);

    Ok(TypeAnnotation {
        kind: TypeKind::Function {
            params,
            return_type: Box::new(return_type),
        },
        span,
    })
}
