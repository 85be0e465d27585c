//! Closure capture analysis
//!
//! Collects the free variables of a function literal (the names it reads
//! from enclosing scopes) together with the facts the constancy check needs:
//! whether the body writes bindings, awaits, and which callee names it
//! invokes. Free variables are reported in first-reference order, which
//! keeps dependency lists deterministic.

use cachet_parser::ast::*;
use cachet_parser::{Interner, Symbol};
use rustc_hash::FxHashSet;

/// Everything the optimizer wants to know about one function literal.
#[derive(Debug, Clone, Default)]
pub struct FunctionAnalysis {
    /// Free variables in first-reference order
    pub free: Vec<Symbol>,
    /// Body contains an assignment, update, or delete
    pub has_assignment: bool,
    /// Body contains an await
    pub has_await: bool,
    /// Callee names invoked anywhere in the body
    pub callees: Vec<Symbol>,
}

/// Analyze a function or arrow expression.
///
/// # Panics
///
/// Panics if `expr` is not a function or arrow expression.
pub fn analyze_function(expr: &Expression, interner: &Interner) -> FunctionAnalysis {
    match expr {
        Expression::Function(func) => analyze_params_body(&func.params, &func.body, interner),
        Expression::Arrow(arrow) => {
            let mut collector = Collector::new(interner);
            collector.push_frame();
            for param in &arrow.params {
                collector.bind_parameter(param);
            }
            match &arrow.body {
                ArrowBody::Expression(expr) => collector.expression(expr),
                ArrowBody::Block(block) => collector.statements(&block.statements),
            }
            collector.pop_frame();
            collector.finish()
        }
        other => panic!("not a function literal: {:?}", other.span()),
    }
}

/// Analyze an explicit parameter list and block body (object methods).
pub fn analyze_params_body(
    params: &[Parameter],
    body: &BlockStatement,
    interner: &Interner,
) -> FunctionAnalysis {
    let mut collector = Collector::new(interner);
    collector.push_frame();
    for param in params {
        collector.bind_parameter(param);
    }
    collector.statements(&body.statements);
    collector.pop_frame();
    collector.finish()
}

struct Collector<'a> {
    interner: &'a Interner,
    bound: Vec<FxHashSet<Symbol>>,
    seen: FxHashSet<Symbol>,
    free: Vec<Symbol>,
    has_assignment: bool,
    has_await: bool,
    callees: Vec<Symbol>,
}

impl<'a> Collector<'a> {
    fn new(interner: &'a Interner) -> Self {
        Self {
            interner,
            bound: Vec::new(),
            seen: FxHashSet::default(),
            free: Vec::new(),
            has_assignment: false,
            has_await: false,
            callees: Vec::new(),
        }
    }

    fn finish(self) -> FunctionAnalysis {
        FunctionAnalysis {
            free: self.free,
            has_assignment: self.has_assignment,
            has_await: self.has_await,
            callees: self.callees,
        }
    }

    fn push_frame(&mut self) {
        self.bound.push(FxHashSet::default());
    }

    fn pop_frame(&mut self) {
        self.bound.pop();
    }

    fn bind(&mut self, name: Symbol) {
        if let Some(frame) = self.bound.last_mut() {
            frame.insert(name);
        }
    }

    fn is_bound(&self, name: Symbol) -> bool {
        self.bound.iter().any(|frame| frame.contains(&name))
    }

    fn reference(&mut self, name: Symbol) {
        if !self.is_bound(name) && self.seen.insert(name) {
            self.free.push(name);
        }
    }

    fn bind_parameter(&mut self, param: &Parameter) {
        if let Some(default) = &param.default_value {
            self.expression(default);
        }
        self.bind_pattern(&param.pattern);
    }

    fn bind_pattern(&mut self, pattern: &Pattern) {
        let mut names = Vec::new();
        pattern.bindings(&mut names);
        for id in names {
            self.bind(id.name);
        }
        // Defaults buried in the pattern still read the enclosing scope
        self.pattern_defaults(pattern);
    }

    fn pattern_defaults(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Identifier(_) => {}
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    match element {
                        ArrayPatternElement::Element { pattern, default } => {
                            if let Some(default) = default {
                                self.expression(default);
                            }
                            self.pattern_defaults(pattern);
                        }
                        ArrayPatternElement::Rest(pattern) => self.pattern_defaults(pattern),
                    }
                }
            }
            Pattern::Object(object) => {
                for property in &object.properties {
                    match property {
                        ObjectPatternProperty::Property { value, default, .. } => {
                            if let Some(default) = default {
                                self.expression(default);
                            }
                            if let Some(value) = value {
                                self.pattern_defaults(value);
                            }
                        }
                        ObjectPatternProperty::Rest { pattern, .. } => {
                            self.pattern_defaults(pattern)
                        }
                    }
                }
            }
        }
    }

    fn statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VariableDecl(decl) => {
                for declarator in &decl.declarators {
                    if let Some(init) = &declarator.init {
                        self.expression(init);
                    }
                    self.bind_pattern(&declarator.pattern);
                }
            }
            Statement::FunctionDecl(decl) => {
                self.bind(decl.name.name);
                self.push_frame();
                for param in &decl.params {
                    self.bind_parameter(param);
                }
                self.statements(&decl.body.statements);
                self.pop_frame();
            }
            Statement::Expression(stmt) => self.expression(&stmt.expression),
            Statement::Block(block) => {
                self.push_frame();
                self.statements(&block.statements);
                self.pop_frame();
            }
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
                    self.push_frame();
                    self.statements(&case.consequent);
                    self.pop_frame();
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
                self.push_frame();
                match &stmt.init {
                    Some(ForInit::VariableDecl(decl)) => {
                        for declarator in &decl.declarators {
                            if let Some(init) = &declarator.init {
                                self.expression(init);
                            }
                            self.bind_pattern(&declarator.pattern);
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
                self.pop_frame();
            }
            Statement::ForIn(stmt) => self.for_head_body(&stmt.left, &stmt.right, &stmt.body),
            Statement::ForOf(stmt) => self.for_head_body(&stmt.left, &stmt.right, &stmt.body),
            Statement::Return(stmt) => {
                if let Some(value) = &stmt.value {
                    self.expression(value);
                }
            }
            Statement::Throw(stmt) => self.expression(&stmt.value),
            Statement::Try(stmt) => {
                self.push_frame();
                self.statements(&stmt.block.statements);
                self.pop_frame();
                if let Some(handler) = &stmt.handler {
                    self.push_frame();
                    if let Some(param) = &handler.param {
                        self.bind_pattern(param);
                    }
                    self.statements(&handler.body.statements);
                    self.pop_frame();
                }
                if let Some(finalizer) = &stmt.finalizer {
                    self.push_frame();
                    self.statements(&finalizer.statements);
                    self.pop_frame();
                }
            }
            Statement::Labeled(stmt) => self.statement(&stmt.body),
            Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Empty(_)
            | Statement::TypeAliasDecl(_)
            | Statement::Import(_)
            | Statement::Export(_) => {}
        }
    }

    fn for_head_body(&mut self, left: &ForHead, right: &Expression, body: &Statement) {
        self.expression(right);
        self.push_frame();
        match left {
            ForHead::VariableDecl(decl) => {
                for declarator in &decl.declarators {
                    self.bind_pattern(&declarator.pattern);
                }
            }
            ForHead::Pattern(Pattern::Identifier(id)) => self.reference(id.name),
            ForHead::Pattern(pattern) => self.pattern_defaults(pattern),
        }
        self.statement(body);
        self.pop_frame();
    }

    fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Identifier(id) => self.reference(id.name),
            Expression::Int(_)
            | Expression::Float(_)
            | Expression::String(_)
            | Expression::Boolean(_)
            | Expression::Null(_)
            | Expression::This(_) => {}
            Expression::Template(template) => {
                for part in &template.parts {
                    if let TemplatePart::Expression(expr) = part {
                        self.expression(expr);
                    }
                }
            }
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
                        ObjectProperty::Method(method) => {
                            if let PropertyKey::Computed(key) = &method.key {
                                self.expression(key);
                            }
                            self.push_frame();
                            for param in &method.params {
                                self.bind_parameter(param);
                            }
                            self.statements(&method.body.statements);
                            self.pop_frame();
                        }
                        ObjectProperty::Spread(spread) => self.expression(&spread.argument),
                    }
                }
            }
            Expression::Function(func) => {
                self.push_frame();
                if let Some(name) = &func.name {
                    self.bind(name.name);
                }
                for param in &func.params {
                    self.bind_parameter(param);
                }
                self.statements(&func.body.statements);
                self.pop_frame();
            }
            Expression::Arrow(arrow) => {
                self.push_frame();
                for param in &arrow.params {
                    self.bind_parameter(param);
                }
                match &arrow.body {
                    ArrowBody::Expression(expr) => self.expression(expr),
                    ArrowBody::Block(block) => self.statements(&block.statements),
                }
                self.pop_frame();
            }
            Expression::Unary(unary) => {
                if unary.operator == UnaryOperator::Delete {
                    self.has_assignment = true;
                }
                self.expression(&unary.operand);
            }
            Expression::Update(update) => {
                self.has_assignment = true;
                self.expression(&update.argument);
            }
            Expression::Binary(binary) => {
                self.expression(&binary.left);
                self.expression(&binary.right);
            }
            Expression::Logical(logical) => {
                self.expression(&logical.left);
                self.expression(&logical.right);
            }
            Expression::Assignment(assignment) => {
                self.has_assignment = true;
                self.expression(&assignment.left);
                self.expression(&assignment.right);
            }
            Expression::Conditional(conditional) => {
                self.expression(&conditional.test);
                self.expression(&conditional.consequent);
                self.expression(&conditional.alternate);
            }
            Expression::Call(call) => {
                self.record_callee(&call.callee);
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
            Expression::Index(index) => {
                self.expression(&index.object);
                self.expression(&index.index);
            }
            Expression::Sequence(sequence) => {
                for expr in &sequence.expressions {
                    self.expression(expr);
                }
            }
            Expression::TaggedTemplate(tagged) => {
                self.record_callee(&tagged.tag);
                self.expression(&tagged.tag);
                for part in &tagged.quasi.parts {
                    if let TemplatePart::Expression(expr) = part {
                        self.expression(expr);
                    }
                }
            }
            Expression::Await(await_expr) => {
                self.has_await = true;
                self.expression(&await_expr.argument);
            }
            Expression::Paren(paren) => self.expression(&paren.expression),
            Expression::TypeCast(cast) => self.expression(&cast.expression),
            Expression::JsxElement(element) => self.jsx_element(element),
            Expression::JsxFragment(fragment) => self.jsx_children(&fragment.children),
        }
    }

    fn record_callee(&mut self, callee: &Expression) {
        match callee {
            Expression::Identifier(id) => self.callees.push(id.name),
            Expression::Member(member) => self.callees.push(member.property.name),
            Expression::Paren(paren) => self.record_callee(&paren.expression),
            _ => {}
        }
    }

    fn jsx_element(&mut self, element: &JsxElement) {
        self.jsx_name(&element.opening.name);
        for attribute in &element.opening.attributes {
            match attribute {
                JsxAttribute::Attribute { value, .. } => match value {
                    Some(JsxAttributeValue::Expression(expr)) => self.expression(expr),
                    Some(JsxAttributeValue::Element(nested)) => self.jsx_element(nested),
                    Some(JsxAttributeValue::Fragment(nested)) => {
                        self.jsx_children(&nested.children)
                    }
                    Some(JsxAttributeValue::StringLiteral(_)) | None => {}
                },
                JsxAttribute::Spread { argument, .. } => self.expression(argument),
            }
        }
        self.jsx_children(&element.children);
    }

    fn jsx_children(&mut self, children: &[JsxChild]) {
        for child in children {
            match child {
                JsxChild::Text(_) => {}
                JsxChild::Element(element) => self.jsx_element(element),
                JsxChild::Fragment(fragment) => self.jsx_children(&fragment.children),
                JsxChild::Expression(expr) => {
                    if let Some(expression) = &expr.expression {
                        self.expression(expression);
                    }
                }
            }
        }
    }

    /// Component references in element position count as reads; intrinsic
    /// lowercase tags do not.
    fn jsx_name(&mut self, name: &JsxElementName) {
        match name {
            JsxElementName::Identifier(id) => {
                if !name.is_intrinsic(self.interner) {
                    self.reference(id.name);
                }
            }
            JsxElementName::Member { object, .. } => self.jsx_name(object),
            JsxElementName::Namespaced { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(source: &str) -> (Expression, Interner) {
        let wrapped = format!("let __probe = {};", source);
        let (module, interner) = cachet_parser::parse(&wrapped).unwrap();
        let Statement::VariableDecl(decl) = module.statements.into_iter().next().unwrap() else {
            panic!("expected declaration");
        };
        (decl.declarators.into_iter().next().unwrap().init.unwrap(), interner)
    }

    #[test]
    fn test_parameters_are_bound() {
        let (expr, interner) = parse_expr("(a, b) => a + b + c");
        let analysis = analyze_function(&expr, &interner);
        let names: Vec<&str> = analysis.free.iter().map(|s| interner.resolve(*s)).collect();
        assert_eq!(names, vec!["c"]);
    }

    #[test]
    fn test_locals_are_bound() {
        let (expr, interner) = parse_expr("() => { let x = outer; return x; }");
        let analysis = analyze_function(&expr, &interner);
        let names: Vec<&str> = analysis.free.iter().map(|s| interner.resolve(*s)).collect();
        assert_eq!(names, vec!["outer"]);
    }

    #[test]
    fn test_first_reference_order() {
        let (expr, interner) = parse_expr("() => b + a + b");
        let analysis = analyze_function(&expr, &interner);
        let names: Vec<&str> = analysis.free.iter().map(|s| interner.resolve(*s)).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_assignment_and_await_flags() {
        let (expr, interner) = parse_expr("() => { count = count + 1; }");
        let analysis = analyze_function(&expr, &interner);
        assert!(analysis.has_assignment);
        assert!(!analysis.has_await);

        let (expr, interner) = parse_expr("async () => { await job(); }");
        let analysis = analyze_function(&expr, &interner);
        assert!(analysis.has_await);
    }

    #[test]
    fn test_jsx_component_name_is_a_reference() {
        let (expr, interner) = parse_expr("() => <Button label={text} />");
        let analysis = analyze_function(&expr, &interner);
        let names: Vec<&str> = analysis.free.iter().map(|s| interner.resolve(*s)).collect();
        assert_eq!(names, vec!["Button", "text"]);
    }

    #[test]
    fn test_intrinsic_tag_is_not_a_reference() {
        let (expr, interner) = parse_expr("() => <div>{item}</div>");
        let analysis = analyze_function(&expr, &interner);
        let names: Vec<&str> = analysis.free.iter().map(|s| interner.resolve(*s)).collect();
        assert_eq!(names, vec!["item"]);
    }

    #[test]
    fn test_callees_recorded() {
        let (expr, interner) = parse_expr("() => useQuery(key)");
        let analysis = analyze_function(&expr, &interner);
        let names: Vec<&str> = analysis.callees.iter().map(|s| interner.resolve(*s)).collect();
        assert_eq!(names, vec!["useQuery"]);
    }
}
