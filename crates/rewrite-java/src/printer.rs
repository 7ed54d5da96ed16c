//! Source generation from the tree.
//!
//! The printer never invents formatting: every byte comes from a prefix, a
//! padding space, or a token the node kind implies. Unmodified trees print
//! back to their input exactly.

use crate::tree::*;

/// Trait for types that can generate their source code representation
pub trait ToSource {
    fn to_source(&self) -> String;
}

impl ToSource for J {
    fn to_source(&self) -> String {
        let mut out = String::new();
        print_tree(&mut out, self);
        out
    }
}

pub fn print_compilation_unit(cu: &CompilationUnit) -> String {
    let mut out = String::new();
    out.push_str(cu.prefix.as_str());
    if let Some(package) = &cu.package {
        print_tree(&mut out, &package.element);
        out.push_str(package.after.as_str());
        out.push(';');
    }
    for import in &cu.imports {
        print_tree(&mut out, &import.element);
        out.push_str(import.after.as_str());
        out.push(';');
    }
    for class in &cu.types {
        print_tree(&mut out, class);
    }
    out.push_str(cu.eof.as_str());
    out
}

/// Dotted name of an identifier or field access chain, without formatting
pub fn qualified_name(tree: &J) -> String {
    match tree {
        J::Identifier(ident) => ident.simple_name.clone(),
        J::FieldAccess(access) => format!(
            "{}.{}",
            qualified_name(&access.target),
            qualified_name(&access.name.element)
        ),
        J::ParameterizedType(parameterized) => qualified_name(&parameterized.clazz),
        other => other.to_source().trim().to_string(),
    }
}

fn print_modifiers(out: &mut String, modifiers: &[Modifier]) {
    for modifier in modifiers {
        out.push_str(modifier.prefix.as_str());
        out.push_str(&modifier.text);
    }
}

fn print_right_padded(out: &mut String, padded: &RightPadded<J>) {
    print_tree(out, &padded.element);
    out.push_str(padded.after.as_str());
}

/// Statement in a block or a control-flow body, with its `;` if it needs one
fn print_statement(out: &mut String, padded: &RightPadded<J>) {
    print_right_padded(out, padded);
    if padded.element.needs_semicolon() {
        out.push(';');
    }
}

fn print_separated(out: &mut String, elements: &[RightPadded<J>], separator: &str) {
    for (i, padded) in elements.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        print_right_padded(out, padded);
    }
}

fn print_container(out: &mut String, container: &Container<J>, open: &str, separator: &str, close: &str) {
    out.push_str(container.before.as_str());
    out.push_str(open);
    print_separated(out, &container.elements, separator);
    out.push_str(close);
}

pub fn print_tree(out: &mut String, tree: &J) {
    if let J::CompilationUnit(cu) = tree {
        out.push_str(&print_compilation_unit(cu));
        return;
    }
    out.push_str(tree.prefix().as_str());
    match tree {
        J::CompilationUnit(_) => {}
        J::Package(package) => {
            out.push_str("package");
            print_tree(out, &package.name);
        }
        J::Import(import) => {
            out.push_str("import");
            if let Some(space) = &import.static_keyword {
                out.push_str(space.as_str());
                out.push_str("static");
            }
            print_tree(out, &import.qualid);
        }
        J::ClassDeclaration(class) => {
            print_modifiers(out, &class.modifiers);
            out.push_str(class.kind_prefix.as_str());
            out.push_str(class.kind.keyword());
            print_tree(out, &class.name);
            if let Some(extends) = &class.extends {
                out.push_str(extends.before.as_str());
                out.push_str("extends");
                print_tree(out, &extends.element);
            }
            if let Some(implements) = &class.implements {
                let keyword = if class.kind == ClassKind::Interface { "extends" } else { "implements" };
                print_container(out, implements, keyword, ",", "");
            }
            print_tree(out, &class.body);
        }
        J::EnumValueSet(set) => {
            print_separated(out, &set.enums, ",");
            if set.trailing_comma {
                out.push(',');
            }
        }
        J::EnumValue(value) => {
            print_tree(out, &value.name);
            if let Some(arguments) = &value.arguments {
                print_container(out, arguments, "(", ",", ")");
            }
        }
        J::MethodDeclaration(method) => {
            print_modifiers(out, &method.modifiers);
            if let Some(return_type) = &method.return_type {
                print_tree(out, return_type);
            }
            print_tree(out, &method.name);
            print_container(out, &method.parameters, "(", ",", ")");
            if let Some(throws) = &method.throws {
                print_container(out, throws, "throws", ",", "");
            }
            if let Some(body) = &method.body {
                print_tree(out, body);
            }
        }
        J::VariableDeclarations(decls) => {
            print_modifiers(out, &decls.modifiers);
            if let Some(type_expr) = &decls.type_expr {
                print_tree(out, type_expr);
            }
            if let Some(varargs) = &decls.varargs {
                out.push_str(varargs.as_str());
                out.push_str("...");
            }
            print_separated(out, &decls.vars, ",");
        }
        J::NamedVariable(variable) => {
            print_tree(out, &variable.name);
            if let Some(initializer) = &variable.initializer {
                out.push_str(initializer.before.as_str());
                out.push('=');
                print_tree(out, &initializer.element);
            }
        }
        J::Block(block) => {
            out.push('{');
            for statement in &block.statements {
                print_statement(out, statement);
            }
            out.push_str(block.end.as_str());
            out.push('}');
        }
        J::If(iff) => {
            out.push_str("if");
            print_tree(out, &iff.condition);
            print_statement(out, &iff.then_part);
            if let Some(else_part) = &iff.else_part {
                print_tree(out, else_part);
            }
        }
        J::Else(els) => {
            out.push_str("else");
            print_statement(out, &els.body);
        }
        J::WhileLoop(while_loop) => {
            out.push_str("while");
            print_tree(out, &while_loop.condition);
            print_statement(out, &while_loop.body);
        }
        J::DoWhileLoop(do_while) => {
            out.push_str("do");
            print_statement(out, &do_while.body);
            out.push_str(do_while.while_condition.before.as_str());
            out.push_str("while");
            print_tree(out, &do_while.while_condition.element);
        }
        J::ForLoop(for_loop) => {
            out.push_str("for");
            print_tree(out, &for_loop.control);
            print_statement(out, &for_loop.body);
        }
        J::ForControl(control) => {
            out.push('(');
            print_separated(out, &control.init, ",");
            out.push(';');
            print_right_padded(out, &control.condition);
            out.push(';');
            print_separated(out, &control.update, ",");
            out.push(')');
        }
        J::ForEachLoop(for_each) => {
            out.push_str("for");
            print_tree(out, &for_each.control);
            print_statement(out, &for_each.body);
        }
        J::ForEachControl(control) => {
            out.push('(');
            print_right_padded(out, &control.variable);
            out.push(':');
            print_right_padded(out, &control.iterable);
            out.push(')');
        }
        J::Return(ret) => {
            out.push_str("return");
            if let Some(expression) = &ret.expression {
                print_tree(out, expression);
            }
        }
        J::Throw(throw) => {
            out.push_str("throw");
            print_tree(out, &throw.exception);
        }
        J::Break(brk) => {
            out.push_str("break");
            if let Some(label) = &brk.label {
                print_tree(out, label);
            }
        }
        J::Continue(cont) => {
            out.push_str("continue");
            if let Some(label) = &cont.label {
                print_tree(out, label);
            }
        }
        J::Assignment(assignment) => {
            print_tree(out, &assignment.variable);
            out.push_str(assignment.assignment.before.as_str());
            out.push('=');
            print_tree(out, &assignment.assignment.element);
        }
        J::AssignmentOperation(op) => {
            print_tree(out, &op.variable);
            out.push_str(op.operator.before.as_str());
            out.push_str(op.operator.element.symbol());
            print_tree(out, &op.assignment);
        }
        J::Binary(binary) => {
            print_tree(out, &binary.left);
            out.push_str(binary.operator.before.as_str());
            out.push_str(binary.operator.element.symbol());
            print_tree(out, &binary.right);
        }
        J::Unary(unary) => {
            let operator = unary.operator.element;
            if operator.is_prefix() {
                out.push_str(operator.symbol());
                print_tree(out, &unary.expression);
            } else {
                print_tree(out, &unary.expression);
                out.push_str(unary.operator.before.as_str());
                out.push_str(operator.symbol());
            }
        }
        J::Ternary(ternary) => {
            print_tree(out, &ternary.condition);
            out.push_str(ternary.true_part.before.as_str());
            out.push('?');
            print_tree(out, &ternary.true_part.element);
            out.push_str(ternary.false_part.before.as_str());
            out.push(':');
            print_tree(out, &ternary.false_part.element);
        }
        J::Parentheses(parens) => {
            out.push('(');
            print_right_padded(out, &parens.tree);
            out.push(')');
        }
        J::ControlParentheses(parens) => {
            out.push('(');
            print_right_padded(out, &parens.tree);
            out.push(')');
        }
        J::MethodInvocation(method) => {
            if let Some(select) = &method.select {
                print_right_padded(out, select);
                out.push('.');
            }
            print_tree(out, &method.name);
            print_container(out, &method.arguments, "(", ",", ")");
        }
        J::FieldAccess(access) => {
            print_tree(out, &access.target);
            out.push_str(access.name.before.as_str());
            out.push('.');
            print_tree(out, &access.name.element);
        }
        J::Identifier(ident) => out.push_str(&ident.simple_name),
        J::Literal(literal) => out.push_str(&literal.value_source),
        J::NewClass(new_class) => {
            out.push_str("new");
            print_tree(out, &new_class.clazz);
            print_container(out, &new_class.arguments, "(", ",", ")");
            if let Some(body) = &new_class.body {
                print_tree(out, body);
            }
        }
        J::Lambda(lambda) => {
            let parameters = &lambda.parameters;
            if parameters.parenthesized {
                out.push('(');
                print_separated(out, &parameters.params, ",");
                out.push(')');
            } else {
                print_separated(out, &parameters.params, ",");
            }
            out.push_str(lambda.arrow.as_str());
            out.push_str("->");
            print_tree(out, &lambda.body);
        }
        J::MemberReference(reference) => {
            print_tree(out, &reference.containing);
            out.push_str(reference.reference.before.as_str());
            out.push_str("::");
            print_tree(out, &reference.reference.element);
        }
        J::ArrayAccess(access) => {
            print_tree(out, &access.indexed);
            out.push_str(access.open.as_str());
            out.push('[');
            print_right_padded(out, &access.index);
            out.push(']');
        }
        J::InstanceOf(instance_of) => {
            print_right_padded(out, &instance_of.expression);
            out.push_str("instanceof");
            print_tree(out, &instance_of.clazz);
        }
        J::TypeCast(cast) => {
            print_tree(out, &cast.clazz);
            print_tree(out, &cast.expression);
        }
        J::PrimitiveType(primitive) => out.push_str(primitive.primitive.keyword()),
        J::ArrayType(array) => {
            print_tree(out, &array.element_type);
            out.push_str(array.open.as_str());
            out.push('[');
            out.push_str(array.close.as_str());
            out.push(']');
        }
        J::ParameterizedType(parameterized) => {
            print_tree(out, &parameterized.clazz);
            print_container(out, &parameterized.type_parameters, "<", ",", ">");
        }
        J::Empty(_) => {}
    }
}
