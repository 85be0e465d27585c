use cachet_parser::printer::{print_expression, print_module, print_statement};

/// Parse, print, re-parse, re-print: the second print must be identical.
/// This is the printer's stability contract; exact whitespace of the first
/// print is canonical output, not source fidelity.
fn assert_stable(source: &str) {
    let (module, interner) = cachet_parser::parse(source).expect("parse failure");
    let first = print_module(&module, &interner);
    let (reparsed, reparsed_interner) =
        cachet_parser::parse(&first).unwrap_or_else(|e| panic!("reparse failure: {e}\n{first}"));
    let second = print_module(&reparsed, &reparsed_interner);
    assert_eq!(first, second, "printer output is not stable");
}

#[test]
fn test_expressions_round_trip() {
    assert_stable("let x = a + b * c - d / e % f;");
    assert_stable("let x = a && b || c;");
    assert_stable("let x = a ?? b;");
    assert_stable("let x = cond ? left : right;");
    assert_stable("let x = !a;");
    assert_stable("let x = typeof a;");
    assert_stable("let x = -a ** 2;");
    assert_stable("let x = (a, b, c);");
    assert_stable("let x = obj.path[0].leaf;");
    assert_stable("let x = f(1, \"two\", ...rest);");
    assert_stable("let x = new Map(entries);");
    assert_stable("let x = [1, 2, ...more];");
    assert_stable("let x = { a: 1, b: two, m(v) { return v; } };");
    assert_stable("let x = (n) => n * 2;");
    assert_stable("let x = value |> clean;");
    assert_stable("let x = 0 in slots ? slots[0] : (slots[0] = init);");
}

#[test]
fn test_statements_round_trip() {
    assert_stable("function Row(props) { return props.label; }");
    assert_stable("if (a) { b(); } else { c(); }");
    assert_stable("for (let i = 0; i < n; i++) { work(i); }");
    assert_stable("for (const item of items) { use(item); }");
    assert_stable("for (const key in table) { use(key); }");
    assert_stable("while (busy) { spin(); }");
    assert_stable("do { step(); } while (more);");
    assert_stable("switch (mode) {\n  case 1: a(); break;\n  default: b();\n}");
    assert_stable("try { risky(); } catch (err) { report(err); } finally { done(); }");
    assert_stable("outer: for (const x of xs) { break outer; }");
    assert_stable("throw bad;");
    assert_stable("import { cache as c } from \"cachet/runtime\";");
    assert_stable("export function Panel() { return null; }");
    assert_stable("let a = 1, b = 2;");
    assert_stable("const { x, y: alias } = point;");
}

#[test]
fn test_jsx_round_trip() {
    assert_stable("let v = <div className=\"row\">{label}</div>;");
    assert_stable("let v = <Button onClick={go} disabled />;");
    assert_stable("let v = <Panel {...props}><Child /></Panel>;");
    assert_stable("let v = <>{a}{b}</>;");
}

#[test]
fn test_template_round_trip() {
    assert_stable("let s = `count: ${n}`;");
    assert_stable("let s = tag`count: ${n + 1}`;");
}

#[test]
fn test_expression_printer_shapes() {
    let (module, interner) = cachet_parser::parse("let x = a ?? b || c;").unwrap();
    let cachet_parser::ast::Statement::VariableDecl(decl) = &module.statements[0] else {
        panic!("expected declaration");
    };
    let init = decl.declarators[0].init.as_ref().unwrap();
    // ?? binds loosest, so the || chain stays unparenthesized
    assert_eq!(print_expression(init, &interner), "a ?? b || c");
}

#[test]
fn test_statement_printer_keeps_object_statement_parsable() {
    let (module, interner) = cachet_parser::parse("let o = { a: 1 };").unwrap();
    let printed = print_statement(&module.statements[0], &interner);
    assert_eq!(printed, "let o = { a: 1 };");
}
