//! JSX parsing for view syntax
//!
//! JSX elements and fragments are parsed as expressions. Text children are
//! reassembled from the ordinary token stream, which is adequate for
//! compiler-pass sources; exact whitespace fidelity is not a goal.

use super::{expr, ParseError, Parser};
use crate::ast::*;
use crate::interner::Symbol;
use crate::token::Token;

/// Check if `<` at the current position starts JSX rather than a comparison.
pub fn looks_like_jsx(parser: &Parser) -> bool {
    matches!(
        parser.peek(),
        Some(Token::Identifier(_)) | Some(Token::Greater)
    )
}

/// Parse a JSX element or fragment. Current token must be `<`.
pub fn parse_jsx(parser: &mut Parser) -> Result<Expression, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Less)?;

    // Fragment: <>
    if parser.check(&Token::Greater) {
        return parse_jsx_fragment(parser, start_span);
    }

    if parser.check(&Token::Slash) {
        return Err(ParseError::invalid_syntax(
            "Unexpected JSX closing tag",
            parser.current_span(),
        ));
    }

    let opening = parse_jsx_opening_element(parser)?;

    if opening.self_closing {
        let span = parser.combine_spans(&start_span, &opening.span);
        return Ok(Expression::JsxElement(JsxElement {
            opening,
            children: vec![],
            closing: None,
            span,
        }));
    }

    let children = parse_jsx_children(parser)?;
    let closing = parse_jsx_closing_element(parser, &opening.name)?;
    let span = parser.combine_spans(&start_span, &closing.span);

    Ok(Expression::JsxElement(JsxElement {
        opening,
        children,
        closing: Some(closing),
        span,
    }))
}

/// Parse a JSX fragment: <>children</>
fn parse_jsx_fragment(
    parser: &mut Parser,
    start_span: crate::token::Span,
) -> Result<Expression, ParseError> {
    parser.expect(Token::Greater)?;
    let children = parse_jsx_children(parser)?;

    parser.expect(Token::Less)?;
    parser.expect(Token::Slash)?;
    let closing_span = parser.current_span();
    parser.expect(Token::Greater)?;

    Ok(Expression::JsxFragment(JsxFragment {
        children,
        span: parser.combine_spans(&start_span, &closing_span),
    }))
}

/// Parse a JSX opening element: <div className="foo"> or <div />
fn parse_jsx_opening_element(parser: &mut Parser) -> Result<JsxOpeningElement, ParseError> {
    let start_span = parser.current_span();
    let name = parse_jsx_element_name(parser)?;

    let mut attributes = vec![];
    while !parser.check(&Token::Greater) && !parser.check(&Token::Slash) && !parser.at_eof() {
        attributes.push(parse_jsx_attribute(parser)?);
    }

    let self_closing = if parser.check(&Token::Slash) {
        parser.advance();
        true
    } else {
        false
    };

    let end_span = parser.current_span();
    parser.expect(Token::Greater)?;

    Ok(JsxOpeningElement {
        name,
        attributes,
        self_closing,
        span: parser.combine_spans(&start_span, &end_span),
    })
}

/// Parse a JSX closing element: </div>
fn parse_jsx_closing_element(
    parser: &mut Parser,
    expected_name: &JsxElementName,
) -> Result<JsxClosingElement, ParseError> {
    let start_span = parser.current_span();
    parser.expect(Token::Less)?;
    parser.expect(Token::Slash)?;
    let name = parse_jsx_element_name(parser)?;

    if name.to_string(&parser.interner) != expected_name.to_string(&parser.interner) {
        return Err(ParseError::invalid_syntax(
            format!(
                "Expected closing tag for '{}', found '{}'",
                expected_name.to_string(&parser.interner),
                name.to_string(&parser.interner)
            ),
            parser.current_span(),
        ));
    }

    let end_span = parser.current_span();
    parser.expect(Token::Greater)?;

    Ok(JsxClosingElement {
        name,
        span: parser.combine_spans(&start_span, &end_span),
    })
}

/// Parse a JSX element name: div, Button, UI.Button, svg:path
fn parse_jsx_element_name(parser: &mut Parser) -> Result<JsxElementName, ParseError> {
    let id = parser.expect_identifier()?;

    // Namespaced name: svg:path
    if parser.check(&Token::Colon) {
        parser.advance();
        let name = parser.expect_identifier()?;
        return Ok(JsxElementName::Namespaced {
            namespace: id,
            name,
        });
    }

    // Member expression: UI.Button
    let mut result = JsxElementName::Identifier(id);
    while parser.check(&Token::Dot) {
        parser.advance();
        let property = parser.expect_identifier()?;
        result = JsxElementName::Member {
            object: Box::new(result),
            property,
        };
    }
    Ok(result)
}

/// Parse a JSX attribute: className="foo", onClick={handler}, {...props}
fn parse_jsx_attribute(parser: &mut Parser) -> Result<JsxAttribute, ParseError> {
    let start_span = parser.current_span();

    // Spread attribute: {...props}
    if parser.check(&Token::LeftBrace) {
        parser.advance();
        if !parser.check(&Token::DotDotDot) {
            return Err(ParseError::invalid_syntax(
                "Expected spread operator after '{' in JSX attribute",
                parser.current_span(),
            ));
        }
        parser.advance();
        let argument = expr::parse_assignment(parser)?;
        let end_span = parser.current_span();
        parser.expect(Token::RightBrace)?;
        let span = parser.combine_spans(&start_span, &end_span);
        return Ok(JsxAttribute::Spread { argument, span });
    }

    let name = parse_jsx_attribute_name(parser)?;
    let value = if parser.check(&Token::Equal) {
        parser.advance();
        Some(parse_jsx_attribute_value(parser)?)
    } else {
        // Boolean attribute: <input disabled />
        None
    };

    let span = parser.combine_spans(&start_span, &parser.current_span());
    Ok(JsxAttribute::Attribute { name, value, span })
}

/// Parse a JSX attribute name: className, data-value, xml:lang
fn parse_jsx_attribute_name(parser: &mut Parser) -> Result<JsxAttributeName, ParseError> {
    let start_span = parser.current_span();
    let Token::Identifier(first) = parser.current().clone() else {
        return Err(parser.unexpected_token(&[Token::Identifier(Symbol::dummy())]));
    };
    let mut full_name = parser.resolve(first).to_string();
    parser.advance();

    // Hyphenated attribute: data-value, aria-label
    while parser.check(&Token::Minus) {
        parser.advance();
        let Token::Identifier(part) = parser.current().clone() else {
            return Err(parser.unexpected_token(&[Token::Identifier(Symbol::dummy())]));
        };
        full_name.push('-');
        full_name.push_str(parser.resolve(part));
        parser.advance();
    }

    let name = parser.intern(&full_name);
    let id = Identifier::new(name, start_span);

    // Namespaced attribute: xml:lang
    if parser.check(&Token::Colon) {
        parser.advance();
        let local = parser.expect_identifier()?;
        return Ok(JsxAttributeName::Namespaced {
            namespace: id,
            name: local,
        });
    }

    Ok(JsxAttributeName::Identifier(id))
}

/// Parse a JSX attribute value: "string" or {expression}
fn parse_jsx_attribute_value(parser: &mut Parser) -> Result<JsxAttributeValue, ParseError> {
    match parser.current().clone() {
        Token::StringLiteral(value) => {
            let span = parser.current_span();
            parser.advance();
            Ok(JsxAttributeValue::StringLiteral(StringLiteral {
                value,
                span,
            }))
        }
        Token::LeftBrace => {
            parser.advance();
            let value = expr::parse_assignment(parser)?;
            parser.expect(Token::RightBrace)?;
            Ok(JsxAttributeValue::Expression(value))
        }
        Token::Less => {
            let jsx = parse_jsx(parser)?;
            match jsx {
                Expression::JsxElement(elem) => Ok(JsxAttributeValue::Element(Box::new(elem))),
                Expression::JsxFragment(frag) => Ok(JsxAttributeValue::Fragment(Box::new(frag))),
                _ => unreachable!(),
            }
        }
        _ => Err(parser.unexpected_token(&[
            Token::StringLiteral(Symbol::dummy()),
            Token::LeftBrace,
            Token::Less,
        ])),
    }
}

/// Parse JSX children until a closing tag (`</...`) is next.
fn parse_jsx_children(parser: &mut Parser) -> Result<Vec<JsxChild>, ParseError> {
    let mut children = vec![];
    loop {
        if parser.check(&Token::Less) && parser.peek() == Some(&Token::Slash) {
            break;
        }
        if parser.at_eof() {
            return Err(ParseError::unexpected_eof(
                vec![Token::Less],
                parser.current_span(),
            ));
        }
        children.push(parse_jsx_child(parser)?);
    }
    Ok(children)
}

/// Parse a single JSX child: text, {expression}, or a nested element.
fn parse_jsx_child(parser: &mut Parser) -> Result<JsxChild, ParseError> {
    match parser.current() {
        Token::LeftBrace => {
            let start_span = parser.current_span();
            parser.advance();
            let expression = if parser.check(&Token::RightBrace) {
                None
            } else {
                Some(expr::parse_assignment(parser)?)
            };
            let end_span = parser.current_span();
            parser.expect(Token::RightBrace)?;
            Ok(JsxChild::Expression(JsxExpression {
                expression,
                span: parser.combine_spans(&start_span, &end_span),
            }))
        }
        Token::Less => {
            let jsx = parse_jsx(parser)?;
            match jsx {
                Expression::JsxElement(elem) => Ok(JsxChild::Element(elem)),
                Expression::JsxFragment(frag) => Ok(JsxChild::Fragment(frag)),
                _ => unreachable!(),
            }
        }
        _ => parse_jsx_text(parser),
    }
}

/// Reassemble JSX text from the ordinary token stream until `<` or `{`.
fn parse_jsx_text(parser: &mut Parser) -> Result<JsxChild, ParseError> {
    let start_span = parser.current_span();
    let mut text = String::new();

    while !parser.check(&Token::Less) && !parser.check(&Token::LeftBrace) && !parser.at_eof() {
        let piece = match parser.current() {
            Token::Identifier(sym) | Token::StringLiteral(sym) => {
                parser.resolve(*sym).to_string()
            }
            Token::IntLiteral(n) => n.to_string(),
            Token::FloatLiteral(n) => n.to_string(),
            other => format!("{}", other),
        };
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&piece);
        parser.advance();
    }

    let span = parser.combine_spans(&start_span, &parser.current_span());
    Ok(JsxChild::Text(JsxText { value: text, span }))
}
