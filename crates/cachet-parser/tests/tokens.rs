use cachet_parser::{Span, Token};

#[test]
fn test_token_display() {
    assert_eq!(Token::Function.to_string(), "function");
    assert_eq!(Token::Arrow.to_string(), "=>");
    assert_eq!(Token::QuestionQuestion.to_string(), "??");
    assert_eq!(Token::PipeGreater.to_string(), "|>");
    assert_eq!(Token::DotDotDot.to_string(), "...");
    assert_eq!(Token::IntLiteral(42).to_string(), "42");
    assert_eq!(Token::Eof.to_string(), "EOF");
}

#[test]
fn test_keyword_classification() {
    assert!(Token::Const.is_keyword());
    assert!(Token::Typeof.is_keyword());
    assert!(Token::Of.is_keyword());
    assert!(!Token::Plus.is_keyword());
    assert!(!Token::IntLiteral(1).is_keyword());
}

#[test]
fn test_literal_classification() {
    assert!(Token::IntLiteral(0).is_literal());
    assert!(Token::True.is_literal());
    assert!(Token::Null.is_literal());
    assert!(!Token::Const.is_literal());
}

#[test]
fn test_expression_starters() {
    assert!(Token::LeftParen.starts_expression());
    assert!(Token::Bang.starts_expression());
    assert!(Token::New.starts_expression());
    assert!(Token::Less.starts_expression()); // JSX
    assert!(!Token::RightBrace.starts_expression());
    assert!(!Token::Semicolon.starts_expression());
}

#[test]
fn test_span_accessors() {
    let span = Span::new(4, 10, 2, 1);
    assert_eq!(span.len(), 6);
    assert!(!span.is_empty());

    let merged = span.merge(&Span::new(12, 20, 3, 1));
    assert_eq!(merged.start, 4);
    assert_eq!(merged.end, 20);
}

#[test]
fn test_synthetic_span() {
    assert!(Span::synthetic().is_synthetic());
    assert!(!Span::new(0, 3, 1, 1).is_synthetic());
}
