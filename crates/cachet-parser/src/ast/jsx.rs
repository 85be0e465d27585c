//! JSX AST nodes
//!
//! JSX elements and fragments are ordinary expressions in the dialect. The
//! memoization pass rewrites their dynamic parts; everything else treats them
//! as opaque view values.

use super::*;
use crate::interner::Interner;
use crate::token::Span;

/// JSX element: <div className="foo">Hello</div>
#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    /// Opening tag with name and attributes
    pub opening: JsxOpeningElement,

    /// Children elements, text, or expressions
    pub children: Vec<JsxChild>,

    /// Optional closing tag (None for self-closing)
    pub closing: Option<JsxClosingElement>,

    pub span: Span,
}

/// JSX opening tag: <div className="foo">
#[derive(Debug, Clone, PartialEq)]
pub struct JsxOpeningElement {
    pub name: JsxElementName,
    pub attributes: Vec<JsxAttribute>,
    /// Self-closing? <div />
    pub self_closing: bool,
    pub span: Span,
}

/// JSX closing tag: </div>
#[derive(Debug, Clone, PartialEq)]
pub struct JsxClosingElement {
    pub name: JsxElementName,
    pub span: Span,
}

/// JSX element name
#[derive(Debug, Clone, PartialEq)]
pub enum JsxElementName {
    /// Simple identifier: div, Button
    Identifier(Identifier),

    /// Namespaced: svg:path
    Namespaced {
        namespace: Identifier,
        name: Identifier,
    },

    /// Member expression: UI.Button
    Member {
        object: Box<JsxElementName>,
        property: Identifier,
    },
}

impl JsxElementName {
    /// Get the string representation of the name
    pub fn to_string(&self, interner: &Interner) -> String {
        match self {
            JsxElementName::Identifier(id) => interner.resolve(id.name).to_string(),
            JsxElementName::Namespaced { namespace, name } => format!(
                "{}:{}",
                interner.resolve(namespace.name),
                interner.resolve(name.name)
            ),
            JsxElementName::Member { object, property } => format!(
                "{}.{}",
                object.to_string(interner),
                interner.resolve(property.name)
            ),
        }
    }

    /// Check if this is an intrinsic element (lowercase tag)
    pub fn is_intrinsic(&self, interner: &Interner) -> bool {
        match self {
            JsxElementName::Identifier(id) => interner
                .resolve(id.name)
                .chars()
                .next()
                .is_some_and(|c| c.is_lowercase()),
            _ => false,
        }
    }
}

/// JSX attribute
#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttribute {
    /// Regular attribute: className="foo", onClick={handler}
    Attribute {
        name: JsxAttributeName,
        value: Option<JsxAttributeValue>,
        span: Span,
    },

    /// Spread attribute: {...props}
    Spread { argument: Expression, span: Span },
}

/// JSX attribute name
#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttributeName {
    /// Simple: className
    Identifier(Identifier),

    /// Namespaced: xml:lang
    Namespaced {
        namespace: Identifier,
        name: Identifier,
    },
}

/// JSX attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttributeValue {
    /// String literal: "value"
    StringLiteral(StringLiteral),

    /// Expression: {value}
    Expression(Expression),

    /// Nested element: prop={<div />}
    Element(Box<JsxElement>),

    /// Fragment: prop={<>...</>}
    Fragment(Box<JsxFragment>),
}

/// JSX child node
#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    /// Text content
    Text(JsxText),

    /// Element: <div />
    Element(JsxElement),

    /// Fragment: <>...</>
    Fragment(JsxFragment),

    /// Expression: {value}
    Expression(JsxExpression),
}

/// JSX text content
#[derive(Debug, Clone, PartialEq)]
pub struct JsxText {
    pub value: String,
    pub span: Span,
}

/// JSX expression container: {value}
#[derive(Debug, Clone, PartialEq)]
pub struct JsxExpression {
    /// None for empty {}
    pub expression: Option<Expression>,
    pub span: Span,
}

/// JSX fragment: <>children</>
#[derive(Debug, Clone, PartialEq)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
    pub span: Span,
}
