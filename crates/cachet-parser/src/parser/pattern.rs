//! Pattern parsing (binding targets and destructuring)

use super::{expr, ParseError, Parser};
use crate::ast::*;
use crate::interner::Symbol;
use crate::token::Token;

/// Parse a binding pattern: identifier, array, or object destructuring.
pub fn parse_pattern(parser: &mut Parser) -> Result<Pattern, ParseError> {
    match parser.current() {
        Token::Identifier(_) => Ok(Pattern::Identifier(parser.expect_identifier()?)),
        Token::LeftBracket => parse_array_pattern(parser),
        Token::LeftBrace => parse_object_pattern(parser),
        _ => Err(parser.unexpected_token(&[
            Token::Identifier(Symbol::dummy()),
            Token::LeftBracket,
            Token::LeftBrace,
        ])),
    }
}

/// Parse an array pattern: [a, , b = 1, ...rest]
fn parse_array_pattern(parser: &mut Parser) -> Result<Pattern, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBracket)?;

    let mut elements = Vec::new();
    while !parser.check(&Token::RightBracket) && !parser.at_eof() {
        if parser.check(&Token::Comma) {
            elements.push(None);
            parser.advance();
            continue;
        }
        if parser.check(&Token::DotDotDot) {
            parser.advance();
            let rest = parse_pattern(parser)?;
            elements.push(Some(ArrayPatternElement::Rest(rest)));
        } else {
            let pattern = parse_pattern(parser)?;
            let default = if parser.check(&Token::Equal) {
                parser.advance();
                Some(expr::parse_assignment(parser)?)
            } else {
                None
            };
            elements.push(Some(ArrayPatternElement::Element { pattern, default }));
        }
        if !parser.check(&Token::RightBracket) {
            parser.expect(Token::Comma)?;
        }
    }

    let end_span = parser.current_span();
    parser.expect(Token::RightBracket)?;
    Ok(Pattern::Array(ArrayPattern {
        elements,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}

/// Parse an object pattern: { a, b: alias = 1, ...rest }
fn parse_object_pattern(parser: &mut Parser) -> Result<Pattern, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::LeftBrace)?;

    let mut properties = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        if parser.check(&Token::DotDotDot) {
            let rest_start = parser.current_span();
            parser.advance();
            let pattern = parse_pattern(parser)?;
            let span = parser.combine_spans(&rest_start, pattern.span());
            properties.push(ObjectPatternProperty::Rest { pattern, span });
        } else {
            let key = parser.expect_identifier()?;
            let prop_start = key.span;
            let value = if parser.check(&Token::Colon) {
                parser.advance();
                Some(parse_pattern(parser)?)
            } else {
                None
            };
            let default = if parser.check(&Token::Equal) {
                parser.advance();
                Some(expr::parse_assignment(parser)?)
            } else {
                None
            };
            let end_span = parser.current_span();
            properties.push(ObjectPatternProperty::Property {
                key,
                value,
                default,
                span: parser.combine_spans(&prop_start, &end_span),
            });
        }
        if !parser.check(&Token::RightBrace) {
            parser.expect(Token::Comma)?;
        }
    }

    let end_span = parser.current_span();
    parser.expect(Token::RightBrace)?;
    Ok(Pattern::Object(ObjectPattern {
        properties,
        span: parser.combine_spans(&start_span, &end_span),
    }))
}
