//! Cachet dialect parser
//!
//! Lexer, AST, parser, and source printer for the Cachet component dialect:
//! a TypeScript flavor with JSX that component sources are written in.
//!
//! # Example
//!
//! ```
//! let source = r#"
//!     function Greeting(props: { name: string }) {
//!         return <h1>{props.name}</h1>;
//!     }
//! "#;
//!
//! let (module, interner) = cachet_parser::parse(source).unwrap();
//! assert_eq!(module.len(), 1);
//! let printed = cachet_parser::printer::print_module(&module, &interner);
//! assert!(printed.contains("function Greeting"));
//! ```

pub mod ast;
pub mod interner;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

pub use interner::{Interner, Symbol};
pub use lexer::{LexError, Lexer};
pub use parser::{parse, ParseError, ParseFailure, Parser};
pub use token::{Span, Token};
