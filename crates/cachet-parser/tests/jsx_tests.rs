use cachet_parser::ast::*;
use cachet_parser::Interner;

fn parse_expr(source: &str) -> (Expression, Interner) {
    let wrapped = format!("let __probe = {};", source);
    let (module, interner) = cachet_parser::parse(&wrapped).expect("parse failure");
    let Statement::VariableDecl(decl) = module.statements.into_iter().next().unwrap() else {
        panic!("expected declaration");
    };
    (decl.declarators.into_iter().next().unwrap().init.unwrap(), interner)
}

#[test]
fn test_self_closing_element() {
    let (expr, interner) = parse_expr("<img src=\"photo.jpg\" />");
    let Expression::JsxElement(element) = expr else {
        panic!("expected JSX element");
    };
    assert!(element.opening.self_closing);
    assert!(element.closing.is_none());
    assert_eq!(element.opening.name.to_string(&interner), "img");
    assert_eq!(element.opening.attributes.len(), 1);
}

#[test]
fn test_element_with_expression_attribute() {
    let (expr, interner) = parse_expr("<Button onClick={handler} disabled />");
    let Expression::JsxElement(element) = expr else {
        panic!("expected JSX element");
    };
    assert_eq!(element.opening.attributes.len(), 2);
    let JsxAttribute::Attribute { name, value, .. } = &element.opening.attributes[0] else {
        panic!("expected attribute");
    };
    let JsxAttributeName::Identifier(id) = name else {
        panic!("expected simple name");
    };
    assert_eq!(interner.resolve(id.name), "onClick");
    assert!(matches!(value, Some(JsxAttributeValue::Expression(_))));
    let JsxAttribute::Attribute { value, .. } = &element.opening.attributes[1] else {
        panic!("expected attribute");
    };
    assert!(value.is_none());
}

#[test]
fn test_spread_attribute() {
    let (expr, _) = parse_expr("<Panel {...props} />");
    let Expression::JsxElement(element) = expr else {
        panic!("expected JSX element");
    };
    assert!(matches!(
        element.opening.attributes[0],
        JsxAttribute::Spread { .. }
    ));
}

#[test]
fn test_children_mix() {
    let (expr, _) = parse_expr("<div>hello {name} <b>world</b></div>");
    let Expression::JsxElement(element) = expr else {
        panic!("expected JSX element");
    };
    assert!(element
        .children
        .iter()
        .any(|child| matches!(child, JsxChild::Text(_))));
    assert!(element
        .children
        .iter()
        .any(|child| matches!(child, JsxChild::Expression(_))));
    assert!(element
        .children
        .iter()
        .any(|child| matches!(child, JsxChild::Element(_))));
}

#[test]
fn test_fragment() {
    let (expr, _) = parse_expr("<>{a}{b}</>");
    let Expression::JsxFragment(fragment) = expr else {
        panic!("expected fragment");
    };
    assert_eq!(fragment.children.len(), 2);
}

#[test]
fn test_member_element_name() {
    let (expr, interner) = parse_expr("<UI.Button label=\"ok\" />");
    let Expression::JsxElement(element) = expr else {
        panic!("expected element");
    };
    assert_eq!(element.opening.name.to_string(&interner), "UI.Button");
    assert!(!element.opening.name.is_intrinsic(&interner));
}

#[test]
fn test_hyphenated_attribute_name() {
    let (expr, interner) = parse_expr("<div data-id={id} />");
    let Expression::JsxElement(element) = expr else {
        panic!("expected element");
    };
    let JsxAttribute::Attribute { name: JsxAttributeName::Identifier(id), .. } =
        &element.opening.attributes[0]
    else {
        panic!("expected attribute");
    };
    assert_eq!(interner.resolve(id.name), "data-id");
}

#[test]
fn test_nested_element_in_attribute() {
    let (expr, _) = parse_expr("<Slot content=<b>hi</b> />");
    let Expression::JsxElement(element) = expr else {
        panic!("expected element");
    };
    let JsxAttribute::Attribute { value, .. } = &element.opening.attributes[0] else {
        panic!("expected attribute");
    };
    assert!(matches!(value, Some(JsxAttributeValue::Element(_))));
}

#[test]
fn test_jsx_inside_conditional() {
    let (expr, _) = parse_expr("ready ? <Done /> : null");
    let Expression::Conditional(conditional) = expr else {
        panic!("expected conditional");
    };
    assert!(matches!(*conditional.consequent, Expression::JsxElement(_)));
}

#[test]
fn test_less_than_is_not_jsx() {
    let (expr, _) = parse_expr("a < 3");
    assert!(matches!(
        expr,
        Expression::Binary(BinaryExpression {
            operator: BinaryOperator::LessThan,
            ..
        })
    ));
}

#[test]
fn test_mismatched_closing_tag_is_an_error() {
    let result = cachet_parser::parse("let x = <div>text</span>;");
    assert!(result.is_err());
}
