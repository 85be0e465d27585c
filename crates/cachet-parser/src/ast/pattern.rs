//! Pattern AST nodes (destructuring targets)

use super::*;
use crate::token::Span;

/// Binding pattern: an identifier or a destructuring shape
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Simple identifier: x
    Identifier(Identifier),

    /// Array destructuring: [a, b, ...rest]
    Array(ArrayPattern),

    /// Object destructuring: { a, b: alias, ...rest }
    Object(ObjectPattern),
}

impl Pattern {
    /// Get the span of this pattern
    pub fn span(&self) -> &Span {
        match self {
            Pattern::Identifier(id) => &id.span,
            Pattern::Array(p) => &p.span,
            Pattern::Object(p) => &p.span,
        }
    }

    /// Check if this pattern is a plain identifier
    pub fn is_identifier(&self) -> bool {
        matches!(self, Pattern::Identifier(_))
    }

    /// Collect every identifier this pattern binds, in source order.
    pub fn bindings<'a>(&'a self, out: &mut Vec<&'a Identifier>) {
        match self {
            Pattern::Identifier(id) => out.push(id),
            Pattern::Array(arr) => {
                for element in arr.elements.iter().flatten() {
                    match element {
                        ArrayPatternElement::Element { pattern, .. } => pattern.bindings(out),
                        ArrayPatternElement::Rest(pattern) => pattern.bindings(out),
                    }
                }
            }
            Pattern::Object(obj) => {
                for prop in &obj.properties {
                    match prop {
                        ObjectPatternProperty::Property { key, value, .. } => match value {
                            Some(pattern) => pattern.bindings(out),
                            None => out.push(key),
                        },
                        ObjectPatternProperty::Rest { pattern, .. } => pattern.bindings(out),
                    }
                }
            }
        }
    }
}

/// Array destructuring pattern: [a, , b = 1, ...rest]
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    /// `None` entries are holes: [a, , c]
    pub elements: Vec<Option<ArrayPatternElement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayPatternElement {
    Element {
        pattern: Pattern,
        default: Option<Expression>,
    },
    Rest(Pattern),
}

/// Object destructuring pattern: { a, b: alias = 1, ...rest }
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    pub properties: Vec<ObjectPatternProperty>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatternProperty {
    Property {
        key: Identifier,
        /// `None` for shorthand `{ a }`, `Some` for `{ a: target }`
        value: Option<Pattern>,
        default: Option<Expression>,
        span: Span,
    },
    Rest {
        pattern: Pattern,
        span: Span,
    },
}
