use cachet_parser::ast::*;

fn parse(source: &str) -> Vec<Statement> {
    let (module, _) = cachet_parser::parse(source).expect("parse failure");
    module.statements
}

#[test]
fn test_variable_declarations() {
    let statements = parse("let a = 1, b; const c: number = 2; var d = 3;");
    let Statement::VariableDecl(decl) = &statements[0] else {
        panic!("expected let");
    };
    assert_eq!(decl.kind, VariableKind::Let);
    assert_eq!(decl.declarators.len(), 2);
    assert!(decl.declarators[1].init.is_none());

    let Statement::VariableDecl(decl) = &statements[1] else {
        panic!("expected const");
    };
    assert_eq!(decl.kind, VariableKind::Const);
    assert!(decl.declarators[0].type_annotation.is_some());

    let Statement::VariableDecl(decl) = &statements[2] else {
        panic!("expected var");
    };
    assert_eq!(decl.kind, VariableKind::Var);
}

#[test]
fn test_destructuring_declarations() {
    let statements = parse("const { a, b: alias = 1, ...rest } = props; let [x, , y] = pair;");
    let Statement::VariableDecl(decl) = &statements[0] else {
        panic!("expected const");
    };
    let Pattern::Object(object) = &decl.declarators[0].pattern else {
        panic!("expected object pattern");
    };
    assert_eq!(object.properties.len(), 3);

    let Statement::VariableDecl(decl) = &statements[1] else {
        panic!("expected let");
    };
    let Pattern::Array(array) = &decl.declarators[0].pattern else {
        panic!("expected array pattern");
    };
    assert_eq!(array.elements.len(), 3);
    assert!(array.elements[1].is_none());
}

#[test]
fn test_function_declaration() {
    let statements = parse("function Row(props: { label: string }): string { return props.label; }");
    let Statement::FunctionDecl(func) = &statements[0] else {
        panic!("expected function");
    };
    assert_eq!(func.params.len(), 1);
    assert!(func.params[0].type_annotation.is_some());
    assert!(func.return_type.is_some());
    assert_eq!(func.body.statements.len(), 1);
}

#[test]
fn test_if_else_chain() {
    let statements = parse("if (a) { b(); } else if (c) { d(); } else { e(); }");
    let Statement::If(stmt) = &statements[0] else {
        panic!("expected if");
    };
    assert!(matches!(*stmt.then_branch, Statement::Block(_)));
    assert!(matches!(
        stmt.else_branch.as_deref(),
        Some(Statement::If(_))
    ));
}

#[test]
fn test_loops() {
    let statements = parse(
        "for (let i = 0; i < n; i++) { work(i); }\n\
         for (const key in table) { use(key); }\n\
         for (const item of items) { use(item); }\n\
         while (busy) { spin(); }\n\
         do { step(); } while (more);",
    );
    assert!(matches!(&statements[0], Statement::For(f) if f.init.is_some() && f.test.is_some() && f.update.is_some()));
    assert!(matches!(&statements[1], Statement::ForIn(_)));
    assert!(matches!(&statements[2], Statement::ForOf(f) if matches!(f.left, ForHead::VariableDecl(_))));
    assert!(matches!(&statements[3], Statement::While(_)));
    assert!(matches!(&statements[4], Statement::DoWhile(_)));
}

#[test]
fn test_for_in_with_existing_binding() {
    let statements = parse("for (key in table) { use(key); }");
    let Statement::ForIn(stmt) = &statements[0] else {
        panic!("expected for-in");
    };
    assert!(matches!(stmt.left, ForHead::Pattern(Pattern::Identifier(_))));
}

#[test]
fn test_switch_statement() {
    let statements = parse(
        "switch (mode) { case 1: a(); break; case 2: b(); break; default: c(); }",
    );
    let Statement::Switch(stmt) = &statements[0] else {
        panic!("expected switch");
    };
    assert_eq!(stmt.cases.len(), 3);
    assert!(stmt.cases[2].test.is_none());
    assert_eq!(stmt.cases[0].consequent.len(), 2);
}

#[test]
fn test_try_catch_finally() {
    let statements = parse("try { risky(); } catch (err) { report(err); } finally { cleanup(); }");
    let Statement::Try(stmt) = &statements[0] else {
        panic!("expected try");
    };
    assert!(stmt.handler.is_some());
    assert!(stmt.finalizer.is_some());
    assert!(stmt.handler.as_ref().unwrap().param.is_some());
}

#[test]
fn test_labeled_statement() {
    let statements = parse("outer: for (const x of xs) { if (x) { continue outer; } break outer; }");
    let Statement::Labeled(stmt) = &statements[0] else {
        panic!("expected label");
    };
    assert!(matches!(*stmt.body, Statement::ForOf(_)));
}

#[test]
fn test_block_statement() {
    let statements = parse("{ let x = 1; use(x); }");
    let Statement::Block(block) = &statements[0] else {
        panic!("expected block");
    };
    assert_eq!(block.statements.len(), 2);
}

#[test]
fn test_imports_and_exports() {
    let statements = parse(
        "import { cache as c, equals } from \"cachet/runtime\";\n\
         import * as React from \"react\";\n\
         import Default from \"./widget\";\n\
         export function Panel() { return null; }\n\
         export { Panel as Main };",
    );
    let Statement::Import(decl) = &statements[0] else {
        panic!("expected import");
    };
    assert_eq!(decl.specifiers.len(), 2);
    assert!(matches!(&statements[1], Statement::Import(d) if matches!(d.specifiers[0], ImportSpecifier::Namespace(_))));
    assert!(matches!(&statements[2], Statement::Import(d) if matches!(d.specifiers[0], ImportSpecifier::Default(_))));
    assert!(matches!(&statements[3], Statement::Export(ExportDecl::Declaration(_))));
    assert!(matches!(&statements[4], Statement::Export(ExportDecl::Named { .. })));
}

#[test]
fn test_type_alias() {
    let statements = parse("type Props = { label: string; count?: number };");
    let Statement::TypeAliasDecl(decl) = &statements[0] else {
        panic!("expected type alias");
    };
    assert!(matches!(decl.type_annotation.kind, TypeKind::Object(_)));
}

#[test]
fn test_return_and_throw() {
    let statements = parse("function f() { if (bad) { throw err; } return 1; }");
    let Statement::FunctionDecl(func) = &statements[0] else {
        panic!("expected function");
    };
    assert_eq!(func.body.statements.len(), 2);
}

#[test]
fn test_parse_error_reports_location() {
    let result = cachet_parser::parse("let = 5;");
    assert!(result.is_err());
}
