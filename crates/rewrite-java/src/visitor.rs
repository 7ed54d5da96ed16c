//! Visitor dispatch over the Java node set.
//!
//! Every variant has a `visit_*` hook on [`JavaVisitor`] whose default
//! delegates to the matching `walk_*` function. A walk visits each child in
//! source order, checks that the returned node fits the slot it goes back
//! into, and rebuilds the parent only if some child came back as a different
//! instance.
//!
//! Concrete visitors implement [`TreeVisitor`] by forwarding to [`dispatch`]:
//!
//! ```ignore
//! impl TreeVisitor<J, ExecutionContext> for MyVisitor {
//!     fn dispatch(&self, tree: &J, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
//!         dispatch(self, tree, p, cx)
//!     }
//! }
//! ```

use std::sync::Arc;

use rewrite_core::{Traversal, TreeVisitor, VisitError, VisitResult};

use crate::tree::*;

/// What a child slot accepts
#[derive(Debug, Clone, Copy)]
enum Shape {
    Any,
    Expression,
    /// An expression, or `Empty` in an empty argument list
    OptionalExpression,
    Statement,
    TypeTree,
    ExpressionOrType,
    ExpressionOrBlock,
    Exactly(JKind),
}

impl Shape {
    fn accepts(self, tree: &J) -> bool {
        match self {
            Shape::Any => true,
            Shape::Expression => tree.is_expression(),
            Shape::OptionalExpression => tree.is_expression() || tree.kind() == JKind::Empty,
            Shape::Statement => tree.is_statement(),
            Shape::TypeTree => tree.is_type_tree(),
            Shape::ExpressionOrType => tree.is_expression() || tree.is_type_tree(),
            Shape::ExpressionOrBlock => tree.is_expression() || tree.kind() == JKind::Block,
            Shape::Exactly(kind) => tree.kind() == kind,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Any => "any node",
            Shape::Expression => "an expression",
            Shape::OptionalExpression => "an expression or empty",
            Shape::Statement => "a statement",
            Shape::TypeTree => "a type",
            Shape::ExpressionOrType => "an expression or type",
            Shape::ExpressionOrBlock => "an expression or block",
            Shape::Exactly(kind) => kind.name(),
        }
    }

    fn check(self, tree: J) -> VisitResult<J> {
        if self.accepts(&tree) {
            Ok(tree)
        } else {
            Err(VisitError::wrong_shape(self.describe(), &tree))
        }
    }
}

/// Child-visiting state for one walk: tracks whether any child changed
struct Walk<'a, V: ?Sized, P: ?Sized> {
    visitor: &'a V,
    p: &'a P,
    cx: &'a mut Traversal<J>,
    changed: bool,
}

impl<'a, V, P> Walk<'a, V, P>
where
    V: TreeVisitor<J, P> + ?Sized,
    P: ?Sized,
{
    fn new(visitor: &'a V, p: &'a P, cx: &'a mut Traversal<J>) -> Self {
        Self {
            visitor,
            p,
            cx,
            changed: false,
        }
    }

    fn tree(&mut self, tree: &J, shape: Shape) -> VisitResult<J> {
        let visited = shape.check(self.visitor.visit(tree, self.p, self.cx)?)?;
        if !visited.is_same(tree) {
            self.changed = true;
        }
        Ok(visited)
    }

    fn optional(&mut self, tree: &Option<J>, shape: Shape) -> VisitResult<Option<J>> {
        tree.as_ref().map(|t| self.tree(t, shape)).transpose()
    }

    fn trees(&mut self, trees: &[J], shape: Shape) -> VisitResult<Vec<J>> {
        trees.iter().map(|t| self.tree(t, shape)).collect()
    }

    fn right(&mut self, padded: &RightPadded<J>, shape: Shape) -> VisitResult<RightPadded<J>> {
        Ok(padded.with_element(self.tree(&padded.element, shape)?))
    }

    fn optional_right(&mut self, padded: &Option<RightPadded<J>>, shape: Shape) -> VisitResult<Option<RightPadded<J>>> {
        padded.as_ref().map(|p| self.right(p, shape)).transpose()
    }

    fn left(&mut self, padded: &LeftPadded<J>, shape: Shape) -> VisitResult<LeftPadded<J>> {
        Ok(padded.with_element(self.tree(&padded.element, shape)?))
    }

    fn optional_left(&mut self, padded: &Option<LeftPadded<J>>, shape: Shape) -> VisitResult<Option<LeftPadded<J>>> {
        padded.as_ref().map(|p| self.left(p, shape)).transpose()
    }

    fn list(&mut self, elements: &[RightPadded<J>], shape: Shape) -> VisitResult<Vec<RightPadded<J>>> {
        elements.iter().map(|e| self.right(e, shape)).collect()
    }

    fn container(&mut self, container: &Container<J>, shape: Shape) -> VisitResult<Container<J>> {
        Ok(container.with_elements(self.list(&container.elements, shape)?))
    }

    fn optional_container(
        &mut self,
        container: &Option<Container<J>>,
        shape: Shape,
    ) -> VisitResult<Option<Container<J>>> {
        container.as_ref().map(|c| self.container(c, shape)).transpose()
    }
}

macro_rules! java_visitor {
    ($($variant:ident => $visit:ident, $walk:ident;)*) => {
        /// Per-variant hooks over the Java tree. Override a hook to intercept
        /// a variant; call the matching `walk_*` to keep the default descent.
        pub trait JavaVisitor<P: ?Sized>: TreeVisitor<J, P> {
            $(
                fn $visit(&self, node: &Arc<$variant>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J> {
                    $walk(self, node, p, cx)
                }
            )*
        }

        /// Exhaustive routing of a node to its `visit_*` hook
        pub fn dispatch<V, P>(visitor: &V, tree: &J, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
        where
            V: JavaVisitor<P> + ?Sized,
            P: ?Sized,
        {
            match tree {
                $(J::$variant(node) => visitor.$visit(node, p, cx),)*
            }
        }
    };
}

java_visitor! {
    CompilationUnit => visit_compilation_unit, walk_compilation_unit;
    Package => visit_package, walk_package;
    Import => visit_import, walk_import;
    ClassDeclaration => visit_class_declaration, walk_class_declaration;
    EnumValueSet => visit_enum_value_set, walk_enum_value_set;
    EnumValue => visit_enum_value, walk_enum_value;
    MethodDeclaration => visit_method_declaration, walk_method_declaration;
    VariableDeclarations => visit_variable_declarations, walk_variable_declarations;
    NamedVariable => visit_named_variable, walk_named_variable;
    Block => visit_block, walk_block;
    If => visit_if, walk_if;
    Else => visit_else, walk_else;
    WhileLoop => visit_while_loop, walk_while_loop;
    DoWhileLoop => visit_do_while_loop, walk_do_while_loop;
    ForLoop => visit_for_loop, walk_for_loop;
    ForControl => visit_for_control, walk_for_control;
    ForEachLoop => visit_for_each_loop, walk_for_each_loop;
    ForEachControl => visit_for_each_control, walk_for_each_control;
    Return => visit_return, walk_return;
    Throw => visit_throw, walk_throw;
    Break => visit_break, walk_break;
    Continue => visit_continue, walk_continue;
    Assignment => visit_assignment, walk_assignment;
    AssignmentOperation => visit_assignment_operation, walk_assignment_operation;
    Binary => visit_binary, walk_binary;
    Unary => visit_unary, walk_unary;
    Ternary => visit_ternary, walk_ternary;
    Parentheses => visit_parentheses, walk_parentheses;
    ControlParentheses => visit_control_parentheses, walk_control_parentheses;
    MethodInvocation => visit_method_invocation, walk_method_invocation;
    FieldAccess => visit_field_access, walk_field_access;
    Identifier => visit_identifier, walk_identifier;
    Literal => visit_literal, walk_literal;
    NewClass => visit_new_class, walk_new_class;
    Lambda => visit_lambda, walk_lambda;
    MemberReference => visit_member_reference, walk_member_reference;
    ArrayAccess => visit_array_access, walk_array_access;
    InstanceOf => visit_instance_of, walk_instance_of;
    TypeCast => visit_type_cast, walk_type_cast;
    PrimitiveType => visit_primitive_type, walk_primitive_type;
    ArrayType => visit_array_type, walk_array_type;
    ParameterizedType => visit_parameterized_type, walk_parameterized_type;
    Empty => visit_empty, walk_empty;
}

pub fn walk_compilation_unit<V, P>(v: &V, node: &Arc<CompilationUnit>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let package = w.optional_right(&node.package, Shape::Exactly(JKind::Package))?;
    let imports = w.list(&node.imports, Shape::Exactly(JKind::Import))?;
    let types = w.trees(&node.types, Shape::Exactly(JKind::ClassDeclaration))?;
    Ok(if w.changed {
        CompilationUnit {
            package,
            imports,
            types,
            ..(**node).clone()
        }
        .into()
    } else {
        J::CompilationUnit(node.clone())
    })
}

pub fn walk_package<V, P>(v: &V, node: &Arc<Package>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let name = w.tree(&node.name, Shape::TypeTree)?;
    Ok(if w.changed {
        Package { name, ..(**node).clone() }.into()
    } else {
        J::Package(node.clone())
    })
}

pub fn walk_import<V, P>(v: &V, node: &Arc<Import>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let qualid = w.tree(&node.qualid, Shape::TypeTree)?;
    Ok(if w.changed {
        Import { qualid, ..(**node).clone() }.into()
    } else {
        J::Import(node.clone())
    })
}

pub fn walk_class_declaration<V, P>(v: &V, node: &Arc<ClassDeclaration>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let name = w.tree(&node.name, Shape::Exactly(JKind::Identifier))?;
    let extends = w.optional_left(&node.extends, Shape::TypeTree)?;
    let implements = w.optional_container(&node.implements, Shape::TypeTree)?;
    let body = w.tree(&node.body, Shape::Exactly(JKind::Block))?;
    Ok(if w.changed {
        ClassDeclaration {
            name,
            extends,
            implements,
            body,
            ..(**node).clone()
        }
        .into()
    } else {
        J::ClassDeclaration(node.clone())
    })
}

pub fn walk_enum_value_set<V, P>(v: &V, node: &Arc<EnumValueSet>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let enums = w.list(&node.enums, Shape::Exactly(JKind::EnumValue))?;
    Ok(if w.changed {
        EnumValueSet { enums, ..(**node).clone() }.into()
    } else {
        J::EnumValueSet(node.clone())
    })
}

pub fn walk_enum_value<V, P>(v: &V, node: &Arc<EnumValue>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let name = w.tree(&node.name, Shape::Exactly(JKind::Identifier))?;
    let arguments = w.optional_container(&node.arguments, Shape::OptionalExpression)?;
    Ok(if w.changed {
        EnumValue {
            name,
            arguments,
            ..(**node).clone()
        }
        .into()
    } else {
        J::EnumValue(node.clone())
    })
}

pub fn walk_method_declaration<V, P>(
    v: &V,
    node: &Arc<MethodDeclaration>,
    p: &P,
    cx: &mut Traversal<J>,
) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let return_type = w.optional(&node.return_type, Shape::TypeTree)?;
    let name = w.tree(&node.name, Shape::Exactly(JKind::Identifier))?;
    let parameters = w.container(&node.parameters, Shape::Any)?;
    let throws = w.optional_container(&node.throws, Shape::TypeTree)?;
    let body = w.optional(&node.body, Shape::Exactly(JKind::Block))?;
    Ok(if w.changed {
        MethodDeclaration {
            return_type,
            name,
            parameters,
            throws,
            body,
            ..(**node).clone()
        }
        .into()
    } else {
        J::MethodDeclaration(node.clone())
    })
}

pub fn walk_variable_declarations<V, P>(
    v: &V,
    node: &Arc<VariableDeclarations>,
    p: &P,
    cx: &mut Traversal<J>,
) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let type_expr = w.optional(&node.type_expr, Shape::TypeTree)?;
    let vars = w.list(&node.vars, Shape::Exactly(JKind::NamedVariable))?;
    Ok(if w.changed {
        VariableDeclarations {
            type_expr,
            vars,
            ..(**node).clone()
        }
        .into()
    } else {
        J::VariableDeclarations(node.clone())
    })
}

pub fn walk_named_variable<V, P>(v: &V, node: &Arc<NamedVariable>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let name = w.tree(&node.name, Shape::Exactly(JKind::Identifier))?;
    let initializer = w.optional_left(&node.initializer, Shape::Expression)?;
    Ok(if w.changed {
        NamedVariable {
            name,
            initializer,
            ..(**node).clone()
        }
        .into()
    } else {
        J::NamedVariable(node.clone())
    })
}

pub fn walk_block<V, P>(v: &V, node: &Arc<Block>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let statements = w.list(&node.statements, Shape::Statement)?;
    Ok(if w.changed {
        Block {
            statements,
            ..(**node).clone()
        }
        .into()
    } else {
        J::Block(node.clone())
    })
}

pub fn walk_if<V, P>(v: &V, node: &Arc<If>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let condition = w.tree(&node.condition, Shape::Exactly(JKind::ControlParentheses))?;
    let then_part = w.right(&node.then_part, Shape::Statement)?;
    let else_part = w.optional(&node.else_part, Shape::Exactly(JKind::Else))?;
    Ok(if w.changed {
        If {
            condition,
            then_part,
            else_part,
            ..(**node).clone()
        }
        .into()
    } else {
        J::If(node.clone())
    })
}

pub fn walk_else<V, P>(v: &V, node: &Arc<Else>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let body = w.right(&node.body, Shape::Statement)?;
    Ok(if w.changed {
        Else { body, ..(**node).clone() }.into()
    } else {
        J::Else(node.clone())
    })
}

pub fn walk_while_loop<V, P>(v: &V, node: &Arc<WhileLoop>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let condition = w.tree(&node.condition, Shape::Exactly(JKind::ControlParentheses))?;
    let body = w.right(&node.body, Shape::Statement)?;
    Ok(if w.changed {
        WhileLoop {
            condition,
            body,
            ..(**node).clone()
        }
        .into()
    } else {
        J::WhileLoop(node.clone())
    })
}

pub fn walk_do_while_loop<V, P>(v: &V, node: &Arc<DoWhileLoop>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let body = w.right(&node.body, Shape::Statement)?;
    let while_condition = w.left(&node.while_condition, Shape::Exactly(JKind::ControlParentheses))?;
    Ok(if w.changed {
        DoWhileLoop {
            body,
            while_condition,
            ..(**node).clone()
        }
        .into()
    } else {
        J::DoWhileLoop(node.clone())
    })
}

pub fn walk_for_loop<V, P>(v: &V, node: &Arc<ForLoop>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let control = w.tree(&node.control, Shape::Exactly(JKind::ForControl))?;
    let body = w.right(&node.body, Shape::Statement)?;
    Ok(if w.changed {
        ForLoop {
            control,
            body,
            ..(**node).clone()
        }
        .into()
    } else {
        J::ForLoop(node.clone())
    })
}

pub fn walk_for_control<V, P>(v: &V, node: &Arc<ForControl>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let init = w.list(&node.init, Shape::Statement)?;
    let condition = w.right(&node.condition, Shape::OptionalExpression)?;
    let update = w.list(&node.update, Shape::OptionalExpression)?;
    Ok(if w.changed {
        ForControl {
            init,
            condition,
            update,
            ..(**node).clone()
        }
        .into()
    } else {
        J::ForControl(node.clone())
    })
}

pub fn walk_for_each_loop<V, P>(v: &V, node: &Arc<ForEachLoop>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let control = w.tree(&node.control, Shape::Exactly(JKind::ForEachControl))?;
    let body = w.right(&node.body, Shape::Statement)?;
    Ok(if w.changed {
        ForEachLoop {
            control,
            body,
            ..(**node).clone()
        }
        .into()
    } else {
        J::ForEachLoop(node.clone())
    })
}

pub fn walk_for_each_control<V, P>(v: &V, node: &Arc<ForEachControl>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let variable = w.right(&node.variable, Shape::Exactly(JKind::VariableDeclarations))?;
    let iterable = w.right(&node.iterable, Shape::Expression)?;
    Ok(if w.changed {
        ForEachControl {
            variable,
            iterable,
            ..(**node).clone()
        }
        .into()
    } else {
        J::ForEachControl(node.clone())
    })
}

pub fn walk_return<V, P>(v: &V, node: &Arc<Return>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let expression = w.optional(&node.expression, Shape::Expression)?;
    Ok(if w.changed {
        Return {
            expression,
            ..(**node).clone()
        }
        .into()
    } else {
        J::Return(node.clone())
    })
}

pub fn walk_throw<V, P>(v: &V, node: &Arc<Throw>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let exception = w.tree(&node.exception, Shape::Expression)?;
    Ok(if w.changed {
        Throw {
            exception,
            ..(**node).clone()
        }
        .into()
    } else {
        J::Throw(node.clone())
    })
}

pub fn walk_break<V, P>(v: &V, node: &Arc<Break>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let label = w.optional(&node.label, Shape::Exactly(JKind::Identifier))?;
    Ok(if w.changed {
        Break { label, ..(**node).clone() }.into()
    } else {
        J::Break(node.clone())
    })
}

pub fn walk_continue<V, P>(v: &V, node: &Arc<Continue>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let label = w.optional(&node.label, Shape::Exactly(JKind::Identifier))?;
    Ok(if w.changed {
        Continue { label, ..(**node).clone() }.into()
    } else {
        J::Continue(node.clone())
    })
}

pub fn walk_assignment<V, P>(v: &V, node: &Arc<Assignment>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let variable = w.tree(&node.variable, Shape::Expression)?;
    let assignment = w.left(&node.assignment, Shape::Expression)?;
    Ok(if w.changed {
        Assignment {
            variable,
            assignment,
            ..(**node).clone()
        }
        .into()
    } else {
        J::Assignment(node.clone())
    })
}

pub fn walk_assignment_operation<V, P>(
    v: &V,
    node: &Arc<AssignmentOperation>,
    p: &P,
    cx: &mut Traversal<J>,
) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let variable = w.tree(&node.variable, Shape::Expression)?;
    let assignment = w.tree(&node.assignment, Shape::Expression)?;
    Ok(if w.changed {
        AssignmentOperation {
            variable,
            assignment,
            ..(**node).clone()
        }
        .into()
    } else {
        J::AssignmentOperation(node.clone())
    })
}

pub fn walk_binary<V, P>(v: &V, node: &Arc<Binary>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let left = w.tree(&node.left, Shape::Expression)?;
    let right = w.tree(&node.right, Shape::Expression)?;
    Ok(if w.changed {
        Binary {
            left,
            right,
            ..(**node).clone()
        }
        .into()
    } else {
        J::Binary(node.clone())
    })
}

pub fn walk_unary<V, P>(v: &V, node: &Arc<Unary>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let expression = w.tree(&node.expression, Shape::Expression)?;
    Ok(if w.changed {
        Unary {
            expression,
            ..(**node).clone()
        }
        .into()
    } else {
        J::Unary(node.clone())
    })
}

pub fn walk_ternary<V, P>(v: &V, node: &Arc<Ternary>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let condition = w.tree(&node.condition, Shape::Expression)?;
    let true_part = w.left(&node.true_part, Shape::Expression)?;
    let false_part = w.left(&node.false_part, Shape::Expression)?;
    Ok(if w.changed {
        Ternary {
            condition,
            true_part,
            false_part,
            ..(**node).clone()
        }
        .into()
    } else {
        J::Ternary(node.clone())
    })
}

pub fn walk_parentheses<V, P>(v: &V, node: &Arc<Parentheses>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let tree = w.right(&node.tree, Shape::Expression)?;
    Ok(if w.changed {
        Parentheses { tree, ..(**node).clone() }.into()
    } else {
        J::Parentheses(node.clone())
    })
}

pub fn walk_control_parentheses<V, P>(
    v: &V,
    node: &Arc<ControlParentheses>,
    p: &P,
    cx: &mut Traversal<J>,
) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let tree = w.right(&node.tree, Shape::ExpressionOrType)?;
    Ok(if w.changed {
        ControlParentheses { tree, ..(**node).clone() }.into()
    } else {
        J::ControlParentheses(node.clone())
    })
}

pub fn walk_method_invocation<V, P>(v: &V, node: &Arc<MethodInvocation>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let select = w.optional_right(&node.select, Shape::Expression)?;
    let name = w.tree(&node.name, Shape::Exactly(JKind::Identifier))?;
    let arguments = w.container(&node.arguments, Shape::OptionalExpression)?;
    Ok(if w.changed {
        MethodInvocation {
            select,
            name,
            arguments,
            ..(**node).clone()
        }
        .into()
    } else {
        J::MethodInvocation(node.clone())
    })
}

pub fn walk_field_access<V, P>(v: &V, node: &Arc<FieldAccess>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let target = w.tree(&node.target, Shape::ExpressionOrType)?;
    let name = w.left(&node.name, Shape::Exactly(JKind::Identifier))?;
    Ok(if w.changed {
        FieldAccess {
            target,
            name,
            ..(**node).clone()
        }
        .into()
    } else {
        J::FieldAccess(node.clone())
    })
}

pub fn walk_identifier<V, P>(_v: &V, node: &Arc<Identifier>, _p: &P, _cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    Ok(J::Identifier(node.clone()))
}

pub fn walk_literal<V, P>(_v: &V, node: &Arc<Literal>, _p: &P, _cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    Ok(J::Literal(node.clone()))
}

pub fn walk_new_class<V, P>(v: &V, node: &Arc<NewClass>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let clazz = w.tree(&node.clazz, Shape::TypeTree)?;
    let arguments = w.container(&node.arguments, Shape::OptionalExpression)?;
    let body = w.optional(&node.body, Shape::Exactly(JKind::Block))?;
    Ok(if w.changed {
        NewClass {
            clazz,
            arguments,
            body,
            ..(**node).clone()
        }
        .into()
    } else {
        J::NewClass(node.clone())
    })
}

pub fn walk_lambda<V, P>(v: &V, node: &Arc<Lambda>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let params = w.list(&node.parameters.params, Shape::Any)?;
    let body = w.tree(&node.body, Shape::ExpressionOrBlock)?;
    Ok(if w.changed {
        Lambda {
            parameters: LambdaParameters {
                parenthesized: node.parameters.parenthesized,
                params,
            },
            body,
            ..(**node).clone()
        }
        .into()
    } else {
        J::Lambda(node.clone())
    })
}

pub fn walk_member_reference<V, P>(v: &V, node: &Arc<MemberReference>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let containing = w.tree(&node.containing, Shape::ExpressionOrType)?;
    let reference = w.left(&node.reference, Shape::Exactly(JKind::Identifier))?;
    Ok(if w.changed {
        MemberReference {
            containing,
            reference,
            ..(**node).clone()
        }
        .into()
    } else {
        J::MemberReference(node.clone())
    })
}

pub fn walk_array_access<V, P>(v: &V, node: &Arc<ArrayAccess>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let indexed = w.tree(&node.indexed, Shape::Expression)?;
    let index = w.right(&node.index, Shape::Expression)?;
    Ok(if w.changed {
        ArrayAccess {
            indexed,
            index,
            ..(**node).clone()
        }
        .into()
    } else {
        J::ArrayAccess(node.clone())
    })
}

pub fn walk_instance_of<V, P>(v: &V, node: &Arc<InstanceOf>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let expression = w.right(&node.expression, Shape::Expression)?;
    let clazz = w.tree(&node.clazz, Shape::TypeTree)?;
    Ok(if w.changed {
        InstanceOf {
            expression,
            clazz,
            ..(**node).clone()
        }
        .into()
    } else {
        J::InstanceOf(node.clone())
    })
}

pub fn walk_type_cast<V, P>(v: &V, node: &Arc<TypeCast>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let clazz = w.tree(&node.clazz, Shape::Exactly(JKind::ControlParentheses))?;
    let expression = w.tree(&node.expression, Shape::Expression)?;
    Ok(if w.changed {
        TypeCast {
            clazz,
            expression,
            ..(**node).clone()
        }
        .into()
    } else {
        J::TypeCast(node.clone())
    })
}

pub fn walk_primitive_type<V, P>(_v: &V, node: &Arc<PrimitiveType>, _p: &P, _cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    Ok(J::PrimitiveType(node.clone()))
}

pub fn walk_array_type<V, P>(v: &V, node: &Arc<ArrayType>, p: &P, cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let element_type = w.tree(&node.element_type, Shape::TypeTree)?;
    Ok(if w.changed {
        ArrayType {
            element_type,
            ..(**node).clone()
        }
        .into()
    } else {
        J::ArrayType(node.clone())
    })
}

pub fn walk_parameterized_type<V, P>(
    v: &V,
    node: &Arc<ParameterizedType>,
    p: &P,
    cx: &mut Traversal<J>,
) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut w = Walk::new(v, p, cx);
    let clazz = w.tree(&node.clazz, Shape::TypeTree)?;
    let type_parameters = w.container(&node.type_parameters, Shape::Any)?;
    Ok(if w.changed {
        ParameterizedType {
            clazz,
            type_parameters,
            ..(**node).clone()
        }
        .into()
    } else {
        J::ParameterizedType(node.clone())
    })
}

pub fn walk_empty<V, P>(_v: &V, node: &Arc<Empty>, _p: &P, _cx: &mut Traversal<J>) -> VisitResult<J>
where
    V: JavaVisitor<P> + ?Sized,
    P: ?Sized,
{
    Ok(J::Empty(node.clone()))
}
