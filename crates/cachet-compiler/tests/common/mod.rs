//! Shared helpers for the rewrite tests: compile wrappers and structural
//! walkers that recover cache headers and slot usage from emitted output.

use cachet_compiler::{compile_module, CompileOutput, Preset};
use cachet_parser::ast::*;
use cachet_parser::printer::print_module;
use cachet_parser::Interner;
use rustc_hash::FxHashMap;

/// Compile a source file with the default preset.
pub fn compile(source: &str) -> CompileOutput {
    let (module, interner) = cachet_parser::parse(source).expect("parse failure");
    compile_module(module, interner, &Preset::default())
}

/// Compile with a custom preset.
pub fn compile_with(source: &str, preset: &Preset) -> CompileOutput {
    let (module, interner) = cachet_parser::parse(source).expect("parse failure");
    compile_module(module, interner, preset)
}

/// Compile and print, asserting no diagnostics.
pub fn printed(source: &str) -> String {
    let output = compile(source);
    assert!(output.errors.is_empty(), "diagnostics: {:?}", output.errors);
    print_module(&output.module, &output.interner)
}

// ============================================================================
// Slot analysis
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Cache,
    Ref,
    Branch,
}

#[derive(Debug, Clone)]
pub struct HeaderInfo {
    pub kind: HeaderKind,
    /// Declared slot count (the final argument of cache/ref/branch)
    pub size: i64,
    /// Parent header name, for branch headers
    pub parent: Option<String>,
}

/// Everything slot-shaped found in rewritten output.
#[derive(Debug, Default)]
pub struct SlotAnalysis {
    pub headers: FxHashMap<String, HeaderInfo>,
    /// `h[i]` reads plus `equals(h, i, _)` probes
    pub reads: Vec<(String, i64)>,
    /// `h[i] = _` assignment sites
    pub writes: Vec<(String, i64)>,
    /// Constant parent-slot indices consumed by branch headers
    pub branch_parent_slots: Vec<(String, i64)>,
}

impl SlotAnalysis {
    /// All referenced indices of one header, from every source combined.
    pub fn indices_of(&self, header: &str) -> Vec<i64> {
        let mut out: Vec<i64> = self
            .reads
            .iter()
            .chain(self.writes.iter())
            .filter(|(h, _)| h == header)
            .map(|(_, i)| *i)
            .chain(
                self.branch_parent_slots
                    .iter()
                    .filter(|(h, _)| h == header)
                    .map(|(_, i)| *i),
            )
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn headers_of_kind(&self, kind: HeaderKind) -> Vec<&String> {
        self.headers
            .iter()
            .filter(|(_, info)| info.kind == kind)
            .map(|(name, _)| name)
            .collect()
    }

    /// Root kind of a header, following branch parents.
    pub fn root_kind(&self, header: &str) -> Option<HeaderKind> {
        let mut cursor = header.to_string();
        for _ in 0..64 {
            let info = self.headers.get(&cursor)?;
            match info.kind {
                HeaderKind::Cache => return Some(HeaderKind::Cache),
                HeaderKind::Ref => return Some(HeaderKind::Ref),
                HeaderKind::Branch => match &info.parent {
                    Some(parent) => cursor = parent.clone(),
                    None => return None,
                },
            }
        }
        None
    }
}

struct Walker<'a> {
    interner: &'a Interner,
    analysis: SlotAnalysis,
}

/// Walk a rewritten module, recovering headers and slot usage.
pub fn analyze(module: &Module, interner: &Interner) -> SlotAnalysis {
    let mut walker = Walker {
        interner,
        analysis: SlotAnalysis::default(),
    };
    for statement in &module.statements {
        walker.statement(statement);
    }
    walker.analysis
}

/// Convenience: compile, assert clean, analyze.
pub fn analyzed(source: &str) -> SlotAnalysis {
    let output = compile(source);
    assert!(output.errors.is_empty(), "diagnostics: {:?}", output.errors);
    analyze(&output.module, &output.interner)
}

impl Walker<'_> {
    fn name(&self, id: &Identifier) -> String {
        self.interner.resolve(id.name).to_string()
    }

    fn int_arg(argument: Option<&Argument>) -> Option<i64> {
        match argument {
            Some(Argument::Expression(Expression::Int(lit))) => Some(lit.value),
            _ => None,
        }
    }

    fn ident_arg(argument: Option<&Argument>) -> Option<&Identifier> {
        match argument {
            Some(Argument::Expression(Expression::Identifier(id))) => Some(id),
            _ => None,
        }
    }

    fn header_declaration(&mut self, declarator: &VariableDeclarator) {
        let Pattern::Identifier(name) = &declarator.pattern else {
            return;
        };
        let Some(Expression::Call(call)) = &declarator.init else {
            return;
        };
        let Expression::Identifier(callee) = call.callee.as_ref() else {
            return;
        };
        let kind = match self.name(callee).as_str() {
            "_cache" => HeaderKind::Cache,
            "_ref" => HeaderKind::Ref,
            "_branch" => HeaderKind::Branch,
            _ => return,
        };
        let info = match kind {
            HeaderKind::Cache | HeaderKind::Ref => HeaderInfo {
                kind,
                size: Self::int_arg(call.arguments.get(1)).unwrap_or(-1),
                parent: None,
            },
            HeaderKind::Branch => {
                let parent = Self::ident_arg(call.arguments.first()).map(|id| self.name(id));
                if let (Some(parent), Some(slot)) =
                    (parent.clone(), Self::int_arg(call.arguments.get(1)))
                {
                    self.analysis.branch_parent_slots.push((parent, slot));
                }
                HeaderInfo {
                    kind,
                    size: Self::int_arg(call.arguments.get(2)).unwrap_or(-1),
                    parent,
                }
            }
        };
        self.analysis.headers.insert(self.name(name), info);
    }

    fn slot_of(&self, expr: &Expression) -> Option<(String, i64)> {
        let Expression::Index(index) = expr else {
            return None;
        };
        let Expression::Identifier(object) = index.object.as_ref() else {
            return None;
        };
        let Expression::Int(lit) = index.index.as_ref() else {
            return None;
        };
        Some((self.name(object), lit.value))
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VariableDecl(decl) => {
                for declarator in &decl.declarators {
                    self.header_declaration(declarator);
                    if let Some(init) = &declarator.init {
                        self.expression(init);
                    }
                }
            }
            Statement::FunctionDecl(decl) => self.block(&decl.body),
            Statement::Expression(stmt) => self.expression(&stmt.expression),
            Statement::Block(block) => self.block(block),
            Statement::If(stmt) => {
                self.expression(&stmt.condition);
                self.statement(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.statement(else_branch);
                }
            }
            Statement::Switch(stmt) => {
                self.expression(&stmt.discriminant);
                for case in &stmt.cases {
                    if let Some(test) = &case.test {
                        self.expression(test);
                    }
                    for consequent in &case.consequent {
                        self.statement(consequent);
                    }
                }
            }
            Statement::While(stmt) => {
                self.expression(&stmt.condition);
                self.statement(&stmt.body);
            }
            Statement::DoWhile(stmt) => {
                self.statement(&stmt.body);
                self.expression(&stmt.condition);
            }
            Statement::For(stmt) => {
                match &stmt.init {
                    Some(ForInit::VariableDecl(decl)) => {
                        for declarator in &decl.declarators {
                            if let Some(init) = &declarator.init {
                                self.expression(init);
                            }
                        }
                    }
                    Some(ForInit::Expression(expr)) => self.expression(expr),
                    None => {}
                }
                if let Some(test) = &stmt.test {
                    self.expression(test);
                }
                if let Some(update) = &stmt.update {
                    self.expression(update);
                }
                self.statement(&stmt.body);
            }
            Statement::ForIn(stmt) => {
                self.expression(&stmt.right);
                self.statement(&stmt.body);
            }
            Statement::ForOf(stmt) => {
                self.expression(&stmt.right);
                self.statement(&stmt.body);
            }
            Statement::Return(stmt) => {
                if let Some(value) = &stmt.value {
                    self.expression(value);
                }
            }
            Statement::Throw(stmt) => self.expression(&stmt.value),
            Statement::Try(stmt) => {
                self.block(&stmt.block);
                if let Some(handler) = &stmt.handler {
                    self.block(&handler.body);
                }
                if let Some(finalizer) = &stmt.finalizer {
                    self.block(finalizer);
                }
            }
            Statement::Labeled(stmt) => self.statement(&stmt.body),
            Statement::Export(ExportDecl::Declaration(inner)) => self.statement(inner),
            _ => {}
        }
    }

    fn block(&mut self, block: &BlockStatement) {
        for statement in &block.statements {
            self.statement(statement);
        }
    }

    fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Assignment(assignment) => {
                match self.slot_of(&assignment.left) {
                    Some(slot) => self.analysis.writes.push(slot),
                    None => self.expression(&assignment.left),
                }
                self.expression(&assignment.right);
            }
            Expression::Index(_) => {
                if let Some(slot) = self.slot_of(expression) {
                    self.analysis.reads.push(slot);
                } else if let Expression::Index(index) = expression {
                    self.expression(&index.object);
                    self.expression(&index.index);
                }
            }
            Expression::Call(call) => {
                if let Expression::Identifier(callee) = call.callee.as_ref() {
                    if self.name(callee) == "_equals" {
                        if let (Some(header), Some(slot)) = (
                            Self::ident_arg(call.arguments.first()),
                            Self::int_arg(call.arguments.get(1)),
                        ) {
                            let header = self.name(header);
                            self.analysis.reads.push((header, slot));
                        }
                    }
                }
                self.expression(&call.callee);
                for argument in &call.arguments {
                    match argument {
                        Argument::Expression(expr) => self.expression(expr),
                        Argument::Spread(spread) => self.expression(&spread.argument),
                    }
                }
            }
            Expression::New(new) => {
                self.expression(&new.callee);
                for argument in &new.arguments {
                    match argument {
                        Argument::Expression(expr) => self.expression(expr),
                        Argument::Spread(spread) => self.expression(&spread.argument),
                    }
                }
            }
            Expression::Member(member) => self.expression(&member.object),
            Expression::Unary(unary) => self.expression(&unary.operand),
            Expression::Update(update) => self.expression(&update.argument),
            Expression::Binary(binary) => {
                self.expression(&binary.left);
                self.expression(&binary.right);
            }
            Expression::Logical(logical) => {
                self.expression(&logical.left);
                self.expression(&logical.right);
            }
            Expression::Conditional(conditional) => {
                self.expression(&conditional.test);
                self.expression(&conditional.consequent);
                self.expression(&conditional.alternate);
            }
            Expression::Sequence(sequence) => {
                for expr in &sequence.expressions {
                    self.expression(expr);
                }
            }
            Expression::Paren(paren) => self.expression(&paren.expression),
            Expression::TypeCast(cast) => self.expression(&cast.expression),
            Expression::Await(await_expr) => self.expression(&await_expr.argument),
            Expression::Array(array) => {
                for element in array.elements.iter().flatten() {
                    match element {
                        ArrayElement::Expression(expr) | ArrayElement::Spread(expr) => {
                            self.expression(expr)
                        }
                    }
                }
            }
            Expression::Object(object) => {
                for property in &object.properties {
                    match property {
                        ObjectProperty::Property(prop) => {
                            if let PropertyKey::Computed(key) = &prop.key {
                                self.expression(key);
                            }
                            self.expression(&prop.value);
                        }
                        ObjectProperty::Method(method) => self.block(&method.body),
                        ObjectProperty::Spread(spread) => self.expression(&spread.argument),
                    }
                }
            }
            Expression::Template(template) => {
                for part in &template.parts {
                    if let TemplatePart::Expression(expr) = part {
                        self.expression(expr);
                    }
                }
            }
            Expression::TaggedTemplate(tagged) => {
                self.expression(&tagged.tag);
                for part in &tagged.quasi.parts {
                    if let TemplatePart::Expression(expr) = part {
                        self.expression(expr);
                    }
                }
            }
            Expression::Function(func) => self.block(&func.body),
            Expression::Arrow(arrow) => match &arrow.body {
                ArrowBody::Expression(expr) => self.expression(expr),
                ArrowBody::Block(block) => self.block(block),
            },
            Expression::JsxElement(element) => self.jsx_element(element),
            Expression::JsxFragment(fragment) => {
                for child in &fragment.children {
                    self.jsx_child(child);
                }
            }
            _ => {}
        }
    }

    fn jsx_element(&mut self, element: &JsxElement) {
        for attribute in &element.opening.attributes {
            match attribute {
                JsxAttribute::Attribute { value, .. } => match value {
                    Some(JsxAttributeValue::Expression(expr)) => self.expression(expr),
                    Some(JsxAttributeValue::Element(nested)) => self.jsx_element(nested),
                    Some(JsxAttributeValue::Fragment(nested)) => {
                        for child in &nested.children {
                            self.jsx_child(child);
                        }
                    }
                    _ => {}
                },
                JsxAttribute::Spread { argument, .. } => self.expression(argument),
            }
        }
        for child in &element.children {
            self.jsx_child(child);
        }
    }

    fn jsx_child(&mut self, child: &JsxChild) {
        match child {
            JsxChild::Text(_) => {}
            JsxChild::Element(element) => self.jsx_element(element),
            JsxChild::Fragment(fragment) => {
                for child in &fragment.children {
                    self.jsx_child(child);
                }
            }
            JsxChild::Expression(expr) => {
                if let Some(expression) = &expr.expression {
                    self.expression(expression);
                }
            }
        }
    }
}

// ============================================================================
// Property assertions
// ============================================================================

/// Every fixed-size header's referenced slots are exactly `[0, size)`.
pub fn assert_slot_contiguity(analysis: &SlotAnalysis) {
    for (name, info) in &analysis.headers {
        if info.size < 0 {
            continue; // dynamically-sized loop branch
        }
        if info.size == 0 && info.kind == HeaderKind::Branch {
            continue; // loop-level array, indexed per iteration
        }
        let expected: Vec<i64> = (0..info.size).collect();
        assert_eq!(
            analysis.indices_of(name),
            expected,
            "header {name} (size {}) has non-contiguous slots",
            info.size
        );
    }
}

/// Each slot has at most one assignment site in the output.
pub fn assert_single_write(analysis: &SlotAnalysis) {
    let mut counts: FxHashMap<(String, i64), usize> = FxHashMap::default();
    for write in &analysis.writes {
        *counts.entry(write.clone()).or_default() += 1;
    }
    for ((header, index), count) in counts {
        assert!(
            count <= 1,
            "slot {header}[{index}] written at {count} sites"
        );
    }
}

/// Memo and ref caches never mix: every header chains to exactly one root.
pub fn assert_header_isolation(analysis: &SlotAnalysis) {
    for name in analysis.headers.keys() {
        assert!(
            analysis.root_kind(name).is_some(),
            "header {name} does not resolve to a cache or ref root"
        );
    }
    for (header, _) in analysis.reads.iter().chain(analysis.writes.iter()) {
        assert!(
            analysis.headers.contains_key(header),
            "slot access against undeclared header {header}"
        );
    }
}
