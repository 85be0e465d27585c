//! Type annotation AST nodes
//!
//! Annotations are parsed so sources round-trip, but every compiler pass
//! erases them: no checking, no inference.

use super::*;
use crate::token::Span;

/// A type annotation: `: T`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Named type with optional arguments: string, Array<T>
    Named {
        name: Identifier,
        args: Vec<TypeAnnotation>,
    },

    /// Array shorthand: T[]
    Array(Box<TypeAnnotation>),

    /// Union: A | B
    Union(Vec<TypeAnnotation>),

    /// Object type: { label: string; count?: number }
    Object(Vec<TypeField>),

    /// Function type: (x: number) => string
    Function {
        params: Vec<TypeAnnotation>,
        return_type: Box<TypeAnnotation>,
    },
}

/// A field inside an object type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeField {
    pub name: Identifier,
    pub optional: bool,
    pub annotation: TypeAnnotation,
    pub span: Span,
}
