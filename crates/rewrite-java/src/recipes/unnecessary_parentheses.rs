//! Remove parentheses that change neither evaluation order nor
//! readability, as configured by [`UnnecessaryParenthesesStyle`].

use std::sync::Arc;

use rewrite_core::{ExecutionContext, Recipe, RecipeError, SourceFile, Traversal, TreeVisitor, VisitResult};
use serde::{Deserialize, Serialize};

use super::unwrap_parentheses::UnwrapParentheses;
use super::visit_java_file;
use crate::tree::*;
use crate::visitor::*;

const UNWRAP_TARGET: &str = "unnecessaryParenthesesUnwrapTarget";

/// Which parenthesized forms count as unnecessary. Everything is enabled
/// by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnnecessaryParenthesesStyle {
    pub ident: bool,
    pub num_double: bool,
    pub num_float: bool,
    pub num_int: bool,
    pub num_long: bool,
    pub str_literal: bool,
    pub literal_null: bool,
    pub literal_false: bool,
    pub literal_true: bool,
    pub assign: bool,
    pub bit_and_assign: bool,
    pub bit_or_assign: bool,
    /// `>>>=`
    pub bit_shift_right_assign: bool,
    pub bit_xor_assign: bool,
    /// `>>=`
    pub sr_assign: bool,
    /// `<<=`
    pub sl_assign: bool,
    pub minus_assign: bool,
    pub div_assign: bool,
    pub plus_assign: bool,
    pub star_assign: bool,
    pub mod_assign: bool,
    pub expr: bool,
}

impl Default for UnnecessaryParenthesesStyle {
    fn default() -> Self {
        Self {
            ident: true,
            num_double: true,
            num_float: true,
            num_int: true,
            num_long: true,
            str_literal: true,
            literal_null: true,
            literal_false: true,
            literal_true: true,
            assign: true,
            bit_and_assign: true,
            bit_or_assign: true,
            bit_shift_right_assign: true,
            bit_xor_assign: true,
            sr_assign: true,
            sl_assign: true,
            minus_assign: true,
            div_assign: true,
            plus_assign: true,
            star_assign: true,
            mod_assign: true,
            expr: true,
        }
    }
}

impl UnnecessaryParenthesesStyle {
    fn literal(&self, literal: &Literal) -> bool {
        match literal.primitive {
            Primitive::Int => self.num_int,
            Primitive::Long => self.num_long,
            Primitive::Float => self.num_float,
            Primitive::Double => self.num_double,
            Primitive::String => self.str_literal,
            Primitive::Null => self.literal_null,
            Primitive::Boolean => match literal.value_source.as_str() {
                "true" => self.literal_true,
                "false" => self.literal_false,
                _ => false,
            },
            _ => false,
        }
    }

    fn assignment_operation(&self, operator: AssignmentOperator) -> bool {
        match operator {
            AssignmentOperator::Addition => self.plus_assign,
            AssignmentOperator::Subtraction => self.minus_assign,
            AssignmentOperator::Multiplication => self.star_assign,
            AssignmentOperator::Division => self.div_assign,
            AssignmentOperator::Modulo => self.mod_assign,
            AssignmentOperator::BitAnd => self.bit_and_assign,
            AssignmentOperator::BitOr => self.bit_or_assign,
            AssignmentOperator::BitXor => self.bit_xor_assign,
            AssignmentOperator::LeftShift => self.sl_assign,
            AssignmentOperator::RightShift => self.sr_assign,
            AssignmentOperator::UnsignedRightShift => self.bit_shift_right_assign,
        }
    }
}

pub struct UnnecessaryParenthesesVisitor {
    style: UnnecessaryParenthesesStyle,
}

impl UnnecessaryParenthesesVisitor {
    pub fn new(style: UnnecessaryParenthesesStyle) -> Self {
        Self { style }
    }

    /// Flag the enclosing parentheses when they wrap nothing but this leaf
    fn flag_leaf(&self, kind: JKind, cx: &mut Traversal<J>) {
        if matches!(cx.cursor().parent_value(), Some(J::Parentheses(_))) {
            cx.put_message_on_first_enclosing(JKind::Parentheses, UNWRAP_TARGET, kind);
        }
    }
}

/// `tree` with `condition`'s parentheses removed when it is a nested
/// parenthesized expression
fn unwrap_nested(tree: J, condition: Option<&J>, p: &ExecutionContext, cx: &Traversal<J>) -> VisitResult<J> {
    match condition {
        Some(parens @ J::Parentheses(_)) => UnwrapParentheses::unwrap_in(parens, &tree, p, cx),
        _ => Ok(tree),
    }
}

fn control_tree(control: &J) -> Option<&J> {
    match control {
        J::ControlParentheses(control) => Some(&control.tree.element),
        _ => None,
    }
}

impl TreeVisitor<J, ExecutionContext> for UnnecessaryParenthesesVisitor {
    fn dispatch(&self, tree: &J, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        dispatch(self, tree, p, cx)
    }
}

impl JavaVisitor<ExecutionContext> for UnnecessaryParenthesesVisitor {
    fn visit_parentheses(
        &self,
        node: &Arc<Parentheses>,
        p: &ExecutionContext,
        cx: &mut Traversal<J>,
    ) -> VisitResult<J> {
        let mut visited = walk_parentheses(self, node, p, cx)?;
        if let Some(JKind::Identifier | JKind::Literal) = cx.poll_nearest_message::<JKind>(UNWRAP_TARGET) {
            visited = UnwrapParentheses::unwrap_in(&visited, &visited, p, cx)?;
        }
        if let J::Parentheses(parens) = &visited {
            if matches!(cx.cursor().parent_value(), Some(J::Parentheses(_))) {
                return Ok(parens.tree.element.with_prefix(Space::EMPTY));
            }
        }
        Ok(visited)
    }

    fn visit_identifier(&self, node: &Arc<Identifier>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        if self.style.ident {
            self.flag_leaf(JKind::Identifier, cx);
        }
        walk_identifier(self, node, p, cx)
    }

    fn visit_literal(&self, node: &Arc<Literal>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        if self.style.literal(node) {
            self.flag_leaf(JKind::Literal, cx);
        }
        walk_literal(self, node, p, cx)
    }

    fn visit_assignment(&self, node: &Arc<Assignment>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        let visited = walk_assignment(self, node, p, cx)?;
        match &visited {
            J::Assignment(assignment) if self.style.assign => {
                let value = assignment.assignment.element.clone();
                unwrap_nested(visited, Some(&value), p, cx)
            }
            _ => Ok(visited),
        }
    }

    fn visit_assignment_operation(
        &self,
        node: &Arc<AssignmentOperation>,
        p: &ExecutionContext,
        cx: &mut Traversal<J>,
    ) -> VisitResult<J> {
        let visited = walk_assignment_operation(self, node, p, cx)?;
        match &visited {
            J::AssignmentOperation(operation) if self.style.assignment_operation(operation.operator.element) => {
                let value = operation.assignment.clone();
                unwrap_nested(visited, Some(&value), p, cx)
            }
            _ => Ok(visited),
        }
    }

    fn visit_named_variable(
        &self,
        node: &Arc<NamedVariable>,
        p: &ExecutionContext,
        cx: &mut Traversal<J>,
    ) -> VisitResult<J> {
        let visited = walk_named_variable(self, node, p, cx)?;
        match &visited {
            J::NamedVariable(variable) if self.style.assign => {
                let initializer = variable.initializer.as_ref().map(|i| i.element.clone());
                unwrap_nested(visited, initializer.as_ref(), p, cx)
            }
            _ => Ok(visited),
        }
    }

    fn visit_return(&self, node: &Arc<Return>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        let visited = walk_return(self, node, p, cx)?;
        match &visited {
            J::Return(ret) if self.style.expr => {
                let expression = ret.expression.clone();
                unwrap_nested(visited, expression.as_ref(), p, cx)
            }
            _ => Ok(visited),
        }
    }

    fn visit_if(&self, node: &Arc<If>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        let visited = walk_if(self, node, p, cx)?;
        let condition = match &visited {
            J::If(if_) => control_tree(&if_.condition).cloned(),
            _ => None,
        };
        unwrap_nested(visited, condition.as_ref(), p, cx)
    }

    fn visit_while_loop(&self, node: &Arc<WhileLoop>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        let visited = walk_while_loop(self, node, p, cx)?;
        let condition = match &visited {
            J::WhileLoop(while_) => control_tree(&while_.condition).cloned(),
            _ => None,
        };
        unwrap_nested(visited, condition.as_ref(), p, cx)
    }

    fn visit_do_while_loop(
        &self,
        node: &Arc<DoWhileLoop>,
        p: &ExecutionContext,
        cx: &mut Traversal<J>,
    ) -> VisitResult<J> {
        let visited = walk_do_while_loop(self, node, p, cx)?;
        let condition = match &visited {
            J::DoWhileLoop(do_while) => control_tree(&do_while.while_condition.element).cloned(),
            _ => None,
        };
        unwrap_nested(visited, condition.as_ref(), p, cx)
    }

    fn visit_for_control(&self, node: &Arc<ForControl>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        let visited = walk_for_control(self, node, p, cx)?;
        let condition = match &visited {
            J::ForControl(control) => Some(control.condition.element.clone()),
            _ => None,
        };
        unwrap_nested(visited, condition.as_ref(), p, cx)
    }

    fn visit_lambda(&self, node: &Arc<Lambda>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        let visited = walk_lambda(self, node, p, cx)?;
        let J::Lambda(lambda) = &visited else {
            return Ok(visited);
        };
        let single_untyped = match lambda.parameters.params.as_slice() {
            [param] => matches!(&param.element, J::VariableDeclarations(decl) if decl.type_expr.is_none()),
            _ => false,
        };
        if lambda.parameters.parenthesized && single_untyped {
            return Ok(Lambda {
                parameters: LambdaParameters {
                    parenthesized: false,
                    ..lambda.parameters.clone()
                },
                ..(**lambda).clone()
            }
            .into());
        }
        Ok(visited)
    }
}

/// Removes redundant parentheses around identifiers, literals, assigned
/// values, returned expressions and control conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnnecessaryParentheses {
    pub style: UnnecessaryParenthesesStyle,
}

impl UnnecessaryParentheses {
    pub const NAME: &'static str = "UnnecessaryParentheses";

    pub fn with_style(style: UnnecessaryParenthesesStyle) -> Self {
        Self { style }
    }
}

impl Recipe for UnnecessaryParentheses {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Remove unnecessary parentheses"
    }

    fn description(&self) -> &str {
        "Removes parentheses that do not change evaluation order, such as around single identifiers and literals."
    }

    fn transform_file(
        &self,
        source: &Arc<dyn SourceFile>,
        ctx: &ExecutionContext,
    ) -> Result<Arc<dyn SourceFile>, RecipeError> {
        visit_java_file(Self::NAME, &UnnecessaryParenthesesVisitor::new(self.style.clone()), source, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_style_defaults_to_everything() {
        let style: UnnecessaryParenthesesStyle = serde_json::from_value(json!({ "ident": false })).unwrap();
        assert!(!style.ident);
        assert!(style.num_int);
        assert!(style.bit_shift_right_assign);
    }

    #[test]
    fn test_literal_flags() {
        let style = UnnecessaryParenthesesStyle {
            literal_true: false,
            ..Default::default()
        };
        let literal = |value: &str, primitive| Literal {
            meta: Default::default(),
            prefix: Space::EMPTY,
            value_source: value.to_string(),
            primitive,
        };

        assert!(!style.literal(&literal("true", Primitive::Boolean)));
        assert!(style.literal(&literal("false", Primitive::Boolean)));
        assert!(style.literal(&literal("1L", Primitive::Long)));
        assert!(!style.literal(&literal("'c'", Primitive::Char)));
    }
}
