//! Source printer
//!
//! Renders an AST back to canonical source text. Used by tests and
//! diagnostics to inspect rewritten components; it makes no attempt to
//! preserve original formatting and is not a code generator with fidelity
//! obligations.

use crate::ast::*;
use crate::interner::Interner;

// Precedence levels mirroring the parser's table (higher = tighter).
const PREC_SEQUENCE: u8 = 0;
const PREC_ASSIGN: u8 = 1;
const PREC_PIPELINE: u8 = 2;
const PREC_CONDITIONAL: u8 = 3;
const PREC_NULLISH: u8 = 4;
const PREC_OR: u8 = 5;
const PREC_AND: u8 = 6;
const PREC_BIT_OR: u8 = 7;
const PREC_BIT_XOR: u8 = 8;
const PREC_BIT_AND: u8 = 9;
const PREC_EQUALITY: u8 = 10;
const PREC_RELATIONAL: u8 = 11;
const PREC_SHIFT: u8 = 12;
const PREC_ADDITIVE: u8 = 13;
const PREC_MULTIPLICATIVE: u8 = 14;
const PREC_EXPONENT: u8 = 15;
const PREC_UNARY: u8 = 16;
const PREC_POSTFIX: u8 = 17;
const PREC_CALL: u8 = 18;
const PREC_PRIMARY: u8 = 20;

/// Print a whole module.
pub fn print_module(module: &Module, interner: &Interner) -> String {
    let mut printer = Printer::new(interner);
    for statement in &module.statements {
        printer.statement(statement);
        printer.newline();
    }
    printer.finish()
}

/// Print a single statement.
pub fn print_statement(statement: &Statement, interner: &Interner) -> String {
    let mut printer = Printer::new(interner);
    printer.statement(statement);
    printer.finish()
}

/// Print a single expression.
pub fn print_expression(expression: &Expression, interner: &Interner) -> String {
    let mut printer = Printer::new(interner);
    printer.expression(expression, PREC_SEQUENCE);
    printer.finish()
}

struct Printer<'a> {
    interner: &'a Interner,
    out: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn new(interner: &'a Interner) -> Self {
        Self {
            interner,
            out: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn name(&mut self, id: &Identifier) {
        let s = self.interner.resolve(id.name);
        self.out.push_str(s);
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VariableDecl(decl) => {
                self.variable_decl(decl);
                self.push(";");
            }
            Statement::FunctionDecl(decl) => self.function_decl(decl),
            Statement::TypeAliasDecl(decl) => {
                self.push("type ");
                self.name(&decl.name);
                self.push(" = ");
                self.type_annotation(&decl.type_annotation);
                self.push(";");
            }
            Statement::Import(decl) => self.import_decl(decl),
            Statement::Export(decl) => self.export_decl(decl),
            Statement::Expression(stmt) => {
                // An object or function at statement start would re-parse as a
                // block or declaration, so keep it parenthesized.
                let needs_parens = matches!(
                    stmt.expression,
                    Expression::Object(_) | Expression::Function(_)
                );
                if needs_parens {
                    self.push("(");
                }
                self.expression(&stmt.expression, PREC_SEQUENCE);
                if needs_parens {
                    self.push(")");
                }
                self.push(";");
            }
            Statement::Block(block) => self.block(block),
            Statement::If(stmt) => {
                self.push("if (");
                self.expression(&stmt.condition, PREC_SEQUENCE);
                self.push(") ");
                self.statement_as_body(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.push(" else ");
                    self.statement_as_body(else_branch);
                }
            }
            Statement::Switch(stmt) => {
                self.push("switch (");
                self.expression(&stmt.discriminant, PREC_SEQUENCE);
                self.push(") {");
                self.indent += 1;
                for case in &stmt.cases {
                    self.newline();
                    match &case.test {
                        Some(test) => {
                            self.push("case ");
                            self.expression(test, PREC_SEQUENCE);
                            self.push(":");
                        }
                        None => self.push("default:"),
                    }
                    self.indent += 1;
                    for stmt in &case.consequent {
                        self.newline();
                        self.statement(stmt);
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            Statement::While(stmt) => {
                self.push("while (");
                self.expression(&stmt.condition, PREC_SEQUENCE);
                self.push(") ");
                self.statement_as_body(&stmt.body);
            }
            Statement::DoWhile(stmt) => {
                self.push("do ");
                self.statement_as_body(&stmt.body);
                self.push(" while (");
                self.expression(&stmt.condition, PREC_SEQUENCE);
                self.push(");");
            }
            Statement::For(stmt) => {
                self.push("for (");
                match &stmt.init {
                    Some(ForInit::VariableDecl(decl)) => self.variable_decl(decl),
                    Some(ForInit::Expression(expr)) => self.expression(expr, PREC_SEQUENCE),
                    None => {}
                }
                self.push("; ");
                if let Some(test) = &stmt.test {
                    self.expression(test, PREC_SEQUENCE);
                }
                self.push("; ");
                if let Some(update) = &stmt.update {
                    self.expression(update, PREC_SEQUENCE);
                }
                self.push(") ");
                self.statement_as_body(&stmt.body);
            }
            Statement::ForIn(stmt) => {
                self.push("for (");
                self.for_head(&stmt.left);
                self.push(" in ");
                self.expression(&stmt.right, PREC_SEQUENCE);
                self.push(") ");
                self.statement_as_body(&stmt.body);
            }
            Statement::ForOf(stmt) => {
                self.push("for (");
                self.for_head(&stmt.left);
                self.push(" of ");
                self.expression(&stmt.right, PREC_ASSIGN);
                self.push(") ");
                self.statement_as_body(&stmt.body);
            }
            Statement::Break(stmt) => {
                self.push("break");
                if let Some(label) = &stmt.label {
                    self.push(" ");
                    self.name(label);
                }
                self.push(";");
            }
            Statement::Continue(stmt) => {
                self.push("continue");
                if let Some(label) = &stmt.label {
                    self.push(" ");
                    self.name(label);
                }
                self.push(";");
            }
            Statement::Return(stmt) => {
                self.push("return");
                if let Some(value) = &stmt.value {
                    self.push(" ");
                    self.expression(value, PREC_SEQUENCE);
                }
                self.push(";");
            }
            Statement::Throw(stmt) => {
                self.push("throw ");
                self.expression(&stmt.value, PREC_SEQUENCE);
                self.push(";");
            }
            Statement::Try(stmt) => {
                self.push("try ");
                self.block(&stmt.block);
                if let Some(handler) = &stmt.handler {
                    self.push(" catch ");
                    if let Some(param) = &handler.param {
                        self.push("(");
                        self.pattern(param);
                        self.push(") ");
                    }
                    self.block(&handler.body);
                }
                if let Some(finalizer) = &stmt.finalizer {
                    self.push(" finally ");
                    self.block(finalizer);
                }
            }
            Statement::Labeled(stmt) => {
                self.name(&stmt.label);
                self.push(": ");
                self.statement(&stmt.body);
            }
            Statement::Empty(_) => self.push(";"),
        }
    }

    /// Print a statement used as a loop/if body, keeping blocks compact.
    fn statement_as_body(&mut self, statement: &Statement) {
        match statement {
            Statement::Block(block) => self.block(block),
            other => self.statement(other),
        }
    }

    fn block(&mut self, block: &BlockStatement) {
        self.push("{");
        self.indent += 1;
        for statement in &block.statements {
            self.newline();
            self.statement(statement);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn variable_decl(&mut self, decl: &VariableDecl) {
        self.push(match decl.kind {
            VariableKind::Let => "let ",
            VariableKind::Const => "const ",
            VariableKind::Var => "var ",
        });
        for (i, declarator) in decl.declarators.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.pattern(&declarator.pattern);
            if let Some(annotation) = &declarator.type_annotation {
                self.push(": ");
                self.type_annotation(annotation);
            }
            if let Some(init) = &declarator.init {
                self.push(" = ");
                self.expression(init, PREC_ASSIGN);
            }
        }
    }

    fn function_decl(&mut self, decl: &FunctionDecl) {
        if decl.is_async {
            self.push("async ");
        }
        self.push("function ");
        self.name(&decl.name);
        self.parameters(&decl.params);
        if let Some(return_type) = &decl.return_type {
            self.push(": ");
            self.type_annotation(return_type);
        }
        self.push(" ");
        self.block(&decl.body);
    }

    fn parameters(&mut self, params: &[Parameter]) {
        self.push("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.pattern(&param.pattern);
            if let Some(annotation) = &param.type_annotation {
                self.push(": ");
                self.type_annotation(annotation);
            }
            if let Some(default) = &param.default_value {
                self.push(" = ");
                self.expression(default, PREC_ASSIGN);
            }
        }
        self.push(")");
    }

    fn for_head(&mut self, head: &ForHead) {
        match head {
            ForHead::VariableDecl(decl) => self.variable_decl(decl),
            ForHead::Pattern(pattern) => self.pattern(pattern),
        }
    }

    fn import_decl(&mut self, decl: &ImportDecl) {
        self.push("import ");
        let mut named_open = false;
        for (i, spec) in decl.specifiers.iter().enumerate() {
            match spec {
                ImportSpecifier::Default(id) => {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.name(id);
                }
                ImportSpecifier::Namespace(id) => {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.push("* as ");
                    self.name(id);
                }
                ImportSpecifier::Named { name, alias } => {
                    if !named_open {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.push("{ ");
                        named_open = true;
                    } else {
                        self.push(", ");
                    }
                    self.name(name);
                    if let Some(alias) = alias {
                        self.push(" as ");
                        self.name(alias);
                    }
                }
            }
        }
        if named_open {
            self.push(" }");
        }
        self.push(" from ");
        self.string_literal(&decl.source);
        self.push(";");
    }

    fn export_decl(&mut self, decl: &ExportDecl) {
        match decl {
            ExportDecl::Declaration(stmt) => {
                self.push("export ");
                self.statement(stmt);
            }
            ExportDecl::Named {
                specifiers, source, ..
            } => {
                self.push("export { ");
                for (i, spec) in specifiers.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.name(&spec.name);
                    if let Some(alias) = &spec.alias {
                        self.push(" as ");
                        self.name(alias);
                    }
                }
                self.push(" }");
                if let Some(source) = source {
                    self.push(" from ");
                    self.string_literal(source);
                }
                self.push(";");
            }
            ExportDecl::All { source, .. } => {
                self.push("export * from ");
                self.string_literal(source);
                self.push(";");
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self, expression: &Expression, min_prec: u8) {
        let prec = expression_precedence(expression);
        let needs_parens = prec < min_prec;
        if needs_parens {
            self.push("(");
        }
        self.expression_inner(expression);
        if needs_parens {
            self.push(")");
        }
    }

    fn expression_inner(&mut self, expression: &Expression) {
        match expression {
            Expression::Int(lit) => self.push(&lit.value.to_string()),
            Expression::Float(lit) => self.push(&format_float(lit.value)),
            Expression::String(lit) => self.string_literal(lit),
            Expression::Template(template) => self.template(template),
            Expression::Boolean(lit) => self.push(if lit.value { "true" } else { "false" }),
            Expression::Null(_) => self.push("null"),
            Expression::This(_) => self.push("this"),
            Expression::Identifier(id) => self.name(id),
            Expression::Array(array) => {
                self.push("[");
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match element {
                        Some(ArrayElement::Expression(expr)) => {
                            self.expression(expr, PREC_ASSIGN)
                        }
                        Some(ArrayElement::Spread(expr)) => {
                            self.push("...");
                            self.expression(expr, PREC_ASSIGN);
                        }
                        None => {}
                    }
                }
                self.push("]");
            }
            Expression::Object(object) => {
                if object.properties.is_empty() {
                    self.push("{}");
                    return;
                }
                self.push("{ ");
                for (i, property) in object.properties.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match property {
                        ObjectProperty::Property(prop) => {
                            if prop.shorthand {
                                if let PropertyKey::Identifier(id) = &prop.key {
                                    self.name(id);
                                    continue;
                                }
                            }
                            self.property_key(&prop.key);
                            self.push(": ");
                            self.expression(&prop.value, PREC_ASSIGN);
                        }
                        ObjectProperty::Method(method) => {
                            if method.is_async {
                                self.push("async ");
                            }
                            self.property_key(&method.key);
                            self.parameters(&method.params);
                            self.push(" ");
                            self.block(&method.body);
                        }
                        ObjectProperty::Spread(spread) => {
                            self.push("...");
                            self.expression(&spread.argument, PREC_ASSIGN);
                        }
                    }
                }
                self.push(" }");
            }
            Expression::Function(func) => {
                if func.is_async {
                    self.push("async ");
                }
                self.push("function ");
                if let Some(name) = &func.name {
                    self.name(name);
                }
                self.parameters(&func.params);
                self.push(" ");
                self.block(&func.body);
            }
            Expression::Arrow(arrow) => {
                if arrow.is_async {
                    self.push("async ");
                }
                self.parameters(&arrow.params);
                self.push(" => ");
                match &arrow.body {
                    ArrowBody::Expression(expr) => {
                        // An object body would parse as a block
                        if matches!(**expr, Expression::Object(_)) {
                            self.push("(");
                            self.expression(expr, PREC_ASSIGN);
                            self.push(")");
                        } else {
                            self.expression(expr, PREC_ASSIGN);
                        }
                    }
                    ArrowBody::Block(block) => self.block(block),
                }
            }
            Expression::Unary(unary) => {
                self.push(match unary.operator {
                    UnaryOperator::Plus => "+",
                    UnaryOperator::Minus => "-",
                    UnaryOperator::Not => "!",
                    UnaryOperator::BitwiseNot => "~",
                    UnaryOperator::Typeof => "typeof ",
                    UnaryOperator::Void => "void ",
                    UnaryOperator::Delete => "delete ",
                });
                self.expression(&unary.operand, PREC_UNARY);
            }
            Expression::Update(update) => {
                let op = match update.operator {
                    UpdateOperator::Increment => "++",
                    UpdateOperator::Decrement => "--",
                };
                if update.prefix {
                    self.push(op);
                    self.expression(&update.argument, PREC_UNARY);
                } else {
                    self.expression(&update.argument, PREC_POSTFIX);
                    self.push(op);
                }
            }
            Expression::Binary(binary) => {
                let prec = binary_precedence(binary.operator);
                let (left_min, right_min) = if binary.operator == BinaryOperator::Exponent {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.expression(&binary.left, left_min);
                self.push(" ");
                self.push(binary_operator_str(binary.operator));
                self.push(" ");
                self.expression(&binary.right, right_min);
            }
            Expression::Logical(logical) => {
                let prec = logical_precedence(logical.operator);
                self.expression(&logical.left, prec);
                self.push(match logical.operator {
                    LogicalOperator::And => " && ",
                    LogicalOperator::Or => " || ",
                    LogicalOperator::NullishCoalescing => " ?? ",
                });
                self.expression(&logical.right, prec + 1);
            }
            Expression::Assignment(assignment) => {
                self.expression(&assignment.left, PREC_UNARY);
                self.push(match assignment.operator {
                    AssignmentOperator::Assign => " = ",
                    AssignmentOperator::AddAssign => " += ",
                    AssignmentOperator::SubAssign => " -= ",
                    AssignmentOperator::MulAssign => " *= ",
                    AssignmentOperator::DivAssign => " /= ",
                    AssignmentOperator::ModAssign => " %= ",
                    AssignmentOperator::AndAssign => " &= ",
                    AssignmentOperator::OrAssign => " |= ",
                    AssignmentOperator::XorAssign => " ^= ",
                    AssignmentOperator::LeftShiftAssign => " <<= ",
                    AssignmentOperator::RightShiftAssign => " >>= ",
                    AssignmentOperator::UnsignedRightShiftAssign => " >>>= ",
                });
                self.expression(&assignment.right, PREC_ASSIGN);
            }
            Expression::Conditional(conditional) => {
                self.expression(&conditional.test, PREC_NULLISH);
                self.push(" ? ");
                self.expression(&conditional.consequent, PREC_ASSIGN + 1);
                self.push(" : ");
                self.expression(&conditional.alternate, PREC_ASSIGN + 1);
            }
            Expression::Call(call) => {
                self.expression(&call.callee, PREC_CALL);
                if call.optional {
                    self.push("?.");
                }
                self.arguments(&call.arguments);
            }
            Expression::New(new) => {
                self.push("new ");
                self.expression(&new.callee, PREC_CALL);
                self.arguments(&new.arguments);
            }
            Expression::Member(member) => {
                self.expression(&member.object, PREC_CALL);
                self.push(if member.optional { "?." } else { "." });
                self.name(&member.property);
            }
            Expression::Index(index) => {
                self.expression(&index.object, PREC_CALL);
                self.push("[");
                self.expression(&index.index, PREC_SEQUENCE);
                self.push("]");
            }
            Expression::Sequence(sequence) => {
                for (i, expr) in sequence.expressions.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expression(expr, PREC_ASSIGN);
                }
            }
            Expression::TaggedTemplate(tagged) => {
                self.expression(&tagged.tag, PREC_CALL);
                self.template(&tagged.quasi);
            }
            Expression::Await(await_expr) => {
                self.push("await ");
                self.expression(&await_expr.argument, PREC_UNARY);
            }
            Expression::Paren(paren) => {
                self.push("(");
                self.expression(&paren.expression, PREC_SEQUENCE);
                self.push(")");
            }
            Expression::TypeCast(cast) => {
                self.expression(&cast.expression, PREC_RELATIONAL);
                self.push(" as ");
                self.type_annotation(&cast.target_type);
            }
            Expression::JsxElement(element) => self.jsx_element(element),
            Expression::JsxFragment(fragment) => self.jsx_fragment(fragment),
        }
    }

    fn arguments(&mut self, arguments: &[Argument]) {
        self.push("(");
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            match argument {
                Argument::Expression(expr) => self.expression(expr, PREC_ASSIGN),
                Argument::Spread(spread) => {
                    self.push("...");
                    self.expression(&spread.argument, PREC_ASSIGN);
                }
            }
        }
        self.push(")");
    }

    fn property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Identifier(id) => self.name(id),
            PropertyKey::StringLiteral(lit) => self.string_literal(lit),
            PropertyKey::IntLiteral(lit) => self.push(&lit.value.to_string()),
            PropertyKey::Computed(expr) => {
                self.push("[");
                self.expression(expr, PREC_ASSIGN);
                self.push("]");
            }
        }
    }

    fn string_literal(&mut self, lit: &StringLiteral) {
        let value = self.interner.resolve(lit.value).to_string();
        self.push("\"");
        for c in value.chars() {
            match c {
                '"' => self.push("\\\""),
                '\\' => self.push("\\\\"),
                '\n' => self.push("\\n"),
                '\r' => self.push("\\r"),
                '\t' => self.push("\\t"),
                other => self.out.push(other),
            }
        }
        self.push("\"");
    }

    fn template(&mut self, template: &TemplateLiteral) {
        self.push("`");
        for part in &template.parts {
            match part {
                TemplatePart::String(sym) => {
                    let text = self.interner.resolve(*sym).to_string();
                    for c in text.chars() {
                        match c {
                            '`' => self.push("\\`"),
                            '\\' => self.push("\\\\"),
                            '$' => self.push("\\$"),
                            other => self.out.push(other),
                        }
                    }
                }
                TemplatePart::Expression(expr) => {
                    self.push("${");
                    self.expression(expr, PREC_SEQUENCE);
                    self.push("}");
                }
            }
        }
        self.push("`");
    }

    // ========================================================================
    // JSX
    // ========================================================================

    fn jsx_element(&mut self, element: &JsxElement) {
        self.push("<");
        self.jsx_name(&element.opening.name);
        for attribute in &element.opening.attributes {
            self.push(" ");
            self.jsx_attribute(attribute);
        }
        if element.opening.self_closing {
            self.push(" />");
            return;
        }
        self.push(">");
        for child in &element.children {
            self.jsx_child(child);
        }
        self.push("</");
        self.jsx_name(&element.opening.name);
        self.push(">");
    }

    fn jsx_fragment(&mut self, fragment: &JsxFragment) {
        self.push("<>");
        for child in &fragment.children {
            self.jsx_child(child);
        }
        self.push("</>");
    }

    fn jsx_name(&mut self, name: &JsxElementName) {
        let rendered = name.to_string(self.interner);
        self.push(&rendered);
    }

    fn jsx_attribute(&mut self, attribute: &JsxAttribute) {
        match attribute {
            JsxAttribute::Attribute { name, value, .. } => {
                match name {
                    JsxAttributeName::Identifier(id) => self.name(id),
                    JsxAttributeName::Namespaced { namespace, name } => {
                        self.name(namespace);
                        self.push(":");
                        self.name(name);
                    }
                }
                if let Some(value) = value {
                    self.push("=");
                    match value {
                        JsxAttributeValue::StringLiteral(lit) => self.string_literal(lit),
                        JsxAttributeValue::Expression(expr) => {
                            self.push("{");
                            self.expression(expr, PREC_ASSIGN);
                            self.push("}");
                        }
                        JsxAttributeValue::Element(element) => self.jsx_element(element),
                        JsxAttributeValue::Fragment(fragment) => self.jsx_fragment(fragment),
                    }
                }
            }
            JsxAttribute::Spread { argument, .. } => {
                self.push("{...");
                self.expression(argument, PREC_ASSIGN);
                self.push("}");
            }
        }
    }

    fn jsx_child(&mut self, child: &JsxChild) {
        match child {
            JsxChild::Text(text) => self.push(&text.value),
            JsxChild::Element(element) => self.jsx_element(element),
            JsxChild::Fragment(fragment) => self.jsx_fragment(fragment),
            JsxChild::Expression(expr) => {
                self.push("{");
                if let Some(expression) = &expr.expression {
                    self.expression(expression, PREC_ASSIGN);
                }
                self.push("}");
            }
        }
    }

    // ========================================================================
    // Patterns & Types
    // ========================================================================

    fn pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Identifier(id) => self.name(id),
            Pattern::Array(array) => {
                self.push("[");
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match element {
                        Some(ArrayPatternElement::Element { pattern, default }) => {
                            self.pattern(pattern);
                            if let Some(default) = default {
                                self.push(" = ");
                                self.expression(default, PREC_ASSIGN);
                            }
                        }
                        Some(ArrayPatternElement::Rest(pattern)) => {
                            self.push("...");
                            self.pattern(pattern);
                        }
                        None => {}
                    }
                }
                self.push("]");
            }
            Pattern::Object(object) => {
                self.push("{ ");
                for (i, property) in object.properties.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    match property {
                        ObjectPatternProperty::Property {
                            key,
                            value,
                            default,
                            ..
                        } => {
                            self.name(key);
                            if let Some(value) = value {
                                self.push(": ");
                                self.pattern(value);
                            }
                            if let Some(default) = default {
                                self.push(" = ");
                                self.expression(default, PREC_ASSIGN);
                            }
                        }
                        ObjectPatternProperty::Rest { pattern, .. } => {
                            self.push("...");
                            self.pattern(pattern);
                        }
                    }
                }
                self.push(" }");
            }
        }
    }

    fn type_annotation(&mut self, annotation: &TypeAnnotation) {
        match &annotation.kind {
            TypeKind::Named { name, args } => {
                self.name(name);
                if !args.is_empty() {
                    self.push("<");
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.type_annotation(arg);
                    }
                    self.push(">");
                }
            }
            TypeKind::Array(inner) => {
                self.type_annotation(inner);
                self.push("[]");
            }
            TypeKind::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.push(" | ");
                    }
                    self.type_annotation(member);
                }
            }
            TypeKind::Object(fields) => {
                self.push("{ ");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        self.push("; ");
                    }
                    self.name(&field.name);
                    if field.optional {
                        self.push("?");
                    }
                    self.push(": ");
                    self.type_annotation(&field.annotation);
                }
                self.push(" }");
            }
            TypeKind::Function {
                params,
                return_type,
            } => {
                self.push("(");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.type_annotation(param);
                }
                self.push(") => ");
                self.type_annotation(return_type);
            }
        }
    }
}

fn expression_precedence(expression: &Expression) -> u8 {
    match expression {
        Expression::Sequence(_) => PREC_SEQUENCE,
        Expression::Assignment(_) | Expression::Arrow(_) => PREC_ASSIGN,
        Expression::Conditional(_) => PREC_CONDITIONAL,
        Expression::Binary(binary) => binary_precedence(binary.operator),
        Expression::Logical(logical) => logical_precedence(logical.operator),
        Expression::TypeCast(_) => PREC_RELATIONAL,
        Expression::Unary(_) | Expression::Await(_) => PREC_UNARY,
        Expression::Update(update) => {
            if update.prefix {
                PREC_UNARY
            } else {
                PREC_POSTFIX
            }
        }
        Expression::Call(_)
        | Expression::New(_)
        | Expression::Member(_)
        | Expression::Index(_)
        | Expression::TaggedTemplate(_) => PREC_CALL,
        _ => PREC_PRIMARY,
    }
}

fn binary_precedence(operator: BinaryOperator) -> u8 {
    match operator {
        BinaryOperator::Pipeline => PREC_PIPELINE,
        BinaryOperator::BitwiseOr => PREC_BIT_OR,
        BinaryOperator::BitwiseXor => PREC_BIT_XOR,
        BinaryOperator::BitwiseAnd => PREC_BIT_AND,
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::StrictEqual
        | BinaryOperator::StrictNotEqual => PREC_EQUALITY,
        BinaryOperator::LessThan
        | BinaryOperator::LessEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterEqual
        | BinaryOperator::In
        | BinaryOperator::Instanceof => PREC_RELATIONAL,
        BinaryOperator::LeftShift | BinaryOperator::RightShift | BinaryOperator::UnsignedRightShift => {
            PREC_SHIFT
        }
        BinaryOperator::Add | BinaryOperator::Subtract => PREC_ADDITIVE,
        BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => {
            PREC_MULTIPLICATIVE
        }
        BinaryOperator::Exponent => PREC_EXPONENT,
    }
}

fn logical_precedence(operator: LogicalOperator) -> u8 {
    match operator {
        LogicalOperator::NullishCoalescing => PREC_NULLISH,
        LogicalOperator::Or => PREC_OR,
        LogicalOperator::And => PREC_AND,
    }
}

fn binary_operator_str(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Modulo => "%",
        BinaryOperator::Exponent => "**",
        BinaryOperator::Equal => "==",
        BinaryOperator::NotEqual => "!=",
        BinaryOperator::StrictEqual => "===",
        BinaryOperator::StrictNotEqual => "!==",
        BinaryOperator::LessThan => "<",
        BinaryOperator::LessEqual => "<=",
        BinaryOperator::GreaterThan => ">",
        BinaryOperator::GreaterEqual => ">=",
        BinaryOperator::BitwiseAnd => "&",
        BinaryOperator::BitwiseOr => "|",
        BinaryOperator::BitwiseXor => "^",
        BinaryOperator::LeftShift => "<<",
        BinaryOperator::RightShift => ">>",
        BinaryOperator::UnsignedRightShift => ">>>",
        BinaryOperator::In => "in",
        BinaryOperator::Instanceof => "instanceof",
        BinaryOperator::Pipeline => "|>",
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
