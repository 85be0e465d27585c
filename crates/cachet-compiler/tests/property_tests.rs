//! Universal invariants of rewritten output: slot contiguity, single writes,
//! header isolation, constant propagation, and transform idempotence.

mod common;

use cachet_compiler::{CompileError, HookKind, HookRegistration, Optimizer, Preset, StateContext};
use cachet_parser::ast::Statement;
use cachet_parser::printer::{print_module, print_statement};
use common::{analyzed, compile, compile_with, printed, HeaderKind};

/// A component exercising most control-flow shapes at once.
const KITCHEN_SINK: &str = "\
function Dashboard(props, rows) {\n\
  const title = props.title;\n\
  let total = 0;\n\
  for (const row of rows) {\n\
    use(row.value);\n\
  }\n\
  if (props.ready) {\n\
    send(title);\n\
  } else {\n\
    send(props.fallback);\n\
  }\n\
  const view = props.big ? <Big t={title} /> : <Small t={title} />;\n\
  return view;\n\
}";

#[test]
fn test_slot_contiguity_across_shapes() {
    let analysis = analyzed(KITCHEN_SINK);
    common::assert_slot_contiguity(&analysis);
}

#[test]
fn test_single_write_per_slot() {
    let analysis = analyzed(KITCHEN_SINK);
    common::assert_single_write(&analysis);
}

#[test]
fn test_header_isolation() {
    let source = "function Mix(v) {\n\
                  const r = useRef(v);\n\
                  const doubled = v * 2;\n\
                  return doubled;\n\
                  }";
    let analysis = analyzed(source);
    common::assert_header_isolation(&analysis);
    assert_eq!(analysis.headers_of_kind(HeaderKind::Cache).len(), 1);
    assert_eq!(analysis.headers_of_kind(HeaderKind::Ref).len(), 1);
}

#[test]
fn test_constant_expressions_allocate_no_slots() {
    // Only foreign-binding reads and literals: no memo slot, no imports
    let out = printed("function Version() { return MAJOR + 1; }");
    assert!(!out.contains("_cache"), "{out}");
    assert!(!out.contains("import"), "{out}");
    assert!(out.contains("return MAJOR + 1;"), "{out}");
}

#[test]
fn test_constant_folding_before_optimizing() {
    // The simplifier removes the dead branch before slots are allocated
    let out = printed("function Flag(a) { if (false) { use(a); } return 1; }");
    assert!(!out.contains("if"), "{out}");
    assert!(!out.contains("use(a)"), "{out}");
}

#[test]
fn test_rewritten_output_without_components_is_untouched() {
    // Rewrite, rename the component away, and run the pass again: no-op.
    let out = printed("function Sum(p) { return p.x + p.y; }");
    let lowered = out.replace("function Sum", "function sum");

    let second = compile(&lowered);
    assert!(second.errors.is_empty());
    let reprinted = print_module(&second.module, &second.interner);
    assert_eq!(reprinted, lowered);
}

#[test]
fn test_helpers_are_not_rewritten() {
    let out = printed("function helper(p) { return p.x + p.y; }");
    assert!(!out.contains("_cache"), "{out}");
    assert!(out.contains("return p.x + p.y;"), "{out}");
}

#[test]
fn test_arrow_component_rewritten() {
    let out = printed("const Label = (p) => p.text;");
    assert!(out.contains("_cache(_useMemo"), "{out}");
    assert!(out.contains("return _v"), "{out}");
}

#[test]
fn test_exported_component_rewritten() {
    let out = printed("export function Panel(p) { return p.x; }");
    assert!(out.contains("export function Panel"), "{out}");
    assert!(out.contains("_cache(_useMemo"), "{out}");
}

#[test]
fn test_runtime_import_is_deduplicated() {
    let out = printed(
        "function A(p) { return p.x; }\n\
         function B(p) { return p.y; }",
    );
    assert_eq!(out.matches("from \"cachet/runtime\"").count(), 1, "{out}");
    assert_eq!(out.matches("from \"react\"").count(), 1, "{out}");
}

#[test]
fn test_jsx_untouched_when_preset_disables_it() {
    let mut preset = Preset::default();
    preset.memoize_jsx = false;
    let output = compile_with("function View(p) { return <div>{p.x}</div>; }", &preset);
    assert!(output.errors.is_empty());
    let out = print_module(&output.module, &output.interner);
    // The element is not given a slot of its own
    assert!(out.contains("<div>{p.x}</div>") || out.contains("return <div>"), "{out}");
}

#[test]
fn test_registered_skip_hook_is_ordinary() {
    let mut preset = Preset::default();
    preset.hooks.push(HookRegistration {
        name: "useFlag".to_string(),
        kind: HookKind::Skip,
    });
    let output = compile_with("function F() { return useFlag(); }", &preset);
    assert!(output.errors.is_empty());
    let out = print_module(&output.module, &output.interner);
    // Treated like a plain foreign call: constant, no hook handling
    assert!(out.contains("return useFlag();"), "{out}");
}

#[test]
fn test_hook_with_spread_argument_is_a_diagnostic() {
    let output = compile("function Bad(args) { return useMemo(...args); }");
    assert_eq!(output.errors.len(), 1);
    assert!(matches!(
        output.errors[0],
        CompileError::InvalidHookArgument { .. }
    ));
    // The diagnostic points at the offending argument
    assert!(output.errors[0].span().start > 0);
    // The component body is left untouched
    let out = print_module(&output.module, &output.interner);
    assert!(out.contains("useMemo(...args)"), "{out}");
    assert!(!out.contains("_cache"), "{out}");
}

#[test]
fn test_failed_component_does_not_block_others() {
    let output = compile(
        "function Bad(args) { return useMemo(...args); }\n\
         function Good(p) { return p.x; }",
    );
    assert_eq!(output.errors.len(), 1);
    let out = print_module(&output.module, &output.interner);
    assert!(out.contains("_cache(_useMemo"), "{out}");
    assert!(out.contains("useMemo(...args)"), "{out}");
}

#[test]
fn test_loop_slots_live_in_loop_branch() {
    let analysis = analyzed(
        "function Each(items) { for (const it of items) { use(it.v); } return null; }",
    );
    // A dynamically-sized loop array exists, plus a per-iteration branch
    let branches = analysis.headers_of_kind(HeaderKind::Branch);
    assert!(branches.len() >= 2, "{:?}", analysis.headers);
    assert!(analysis
        .headers
        .values()
        .any(|info| info.kind == HeaderKind::Branch && info.size == 0));
    common::assert_slot_contiguity(&analysis);
    common::assert_header_isolation(&analysis);
}

#[test]
fn test_skip_marked_statement_is_emitted_unchanged() {
    let (module, interner) =
        cachet_parser::parse("function Raw(p) { send(p.x); return null; }").unwrap();
    let Some(Statement::FunctionDecl(func)) = module.statements.into_iter().next() else {
        panic!("expected function declaration");
    };
    let skip_span = *func.body.statements[0].span();

    let mut ctx = StateContext::new(interner, &Preset::default());
    ctx.skip.insert(skip_span);
    let rewritten = Optimizer::new(&mut ctx).optimize_component(func).unwrap();

    let out = print_statement(&Statement::FunctionDecl(rewritten), &ctx.interner);
    assert!(out.contains("send(p.x);"), "{out}");
    assert!(!out.contains("_cache"), "{out}");
}

#[test]
fn test_while_loop_condition_untouched() {
    let out = printed("function Spin(n) { while (more()) { use(n); } return null; }");
    assert!(out.contains("while (more())"), "{out}");
}
