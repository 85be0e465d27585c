//! Error types for the memoization pass
//!
//! Compile errors are static and fatal for the component being rewritten: the
//! driver keeps the original body and reports the diagnostic. Recoverable
//! situations (unknown expression kinds, destructuring targets) are passive
//! fallbacks, not errors.

use cachet_parser::Span;
use thiserror::Error;

/// Errors raised while rewriting a component.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    /// An assignment target the pass cannot classify for invalidation
    #[error("Unsupported assignment target")]
    UnsupportedAssignmentTarget {
        /// Location of the target expression
        span: Span,
    },

    /// A hook call whose argument is not a plain expression
    #[error("Hook '{hook}' expects an expression argument")]
    InvalidHookArgument {
        /// Hook name as written in source
        hook: String,
        /// Location of the offending argument (or the call when missing)
        span: Span,
    },
}

impl CompileError {
    /// Get the span associated with this error.
    pub fn span(&self) -> Span {
        match self {
            CompileError::UnsupportedAssignmentTarget { span }
            | CompileError::InvalidHookArgument { span, .. } => *span,
        }
    }
}
