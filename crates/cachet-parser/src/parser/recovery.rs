//! Error recovery
//!
//! After a parse error, skip tokens until a statement boundary so later
//! statements can still be parsed and reported against.

use super::Parser;
use crate::token::Token;

/// Advance to the next plausible statement boundary.
pub fn sync_to_statement_boundary(parser: &mut Parser) {
    while !parser.at_eof() {
        match parser.current() {
            Token::Semicolon => {
                parser.advance();
                return;
            }
            Token::RightBrace
            | Token::Let
            | Token::Const
            | Token::Var
            | Token::Function
            | Token::If
            | Token::While
            | Token::Do
            | Token::For
            | Token::Switch
            | Token::Try
            | Token::Return
            | Token::Break
            | Token::Continue
            | Token::Throw
            | Token::Import
            | Token::Export => return,
            _ => {
                parser.advance();
            }
        }
    }
}
