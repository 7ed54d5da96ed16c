//! `a.equals(b)` on an enum receiver becomes `a == b`, and a negated call
//! becomes `a != b`.

use std::sync::Arc;

use rewrite_core::{
    Applicability, Cursor, ExecutionContext, Meta, Recipe, RecipeError, SourceFile, Traversal, TreeId, TreeVisitor,
    VisitResult,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::visit_java_file;
use crate::search::{MethodMatcher, UsesMethod};
use crate::tree::*;
use crate::visitor::{dispatch, walk_method_invocation, walk_unary, JavaVisitor};

const REMOVE_UNARY_NOT: &str = "REMOVE_UNARY_NOT";

pub struct CompareEnumsVisitor {
    matcher: MethodMatcher,
}

/// An invocation that stands alone as a statement has no value to compare
fn is_statement_position(cursor: &Cursor<J>, id: TreeId) -> bool {
    match cursor.parent_value() {
        Some(
            J::Block(_)
            | J::Else(_)
            | J::If(_)
            | J::WhileLoop(_)
            | J::DoWhileLoop(_)
            | J::ForLoop(_)
            | J::ForEachLoop(_),
        ) => true,
        Some(J::ForControl(control)) => control.condition.element.id() != id,
        _ => false,
    }
}

/// Whether an equality expression replacing child `id` of `parent` needs
/// parentheses to keep binding the same way
fn needs_parentheses(parent: Option<&J>, id: TreeId) -> bool {
    match parent {
        Some(J::Binary(binary)) => binary.operator.element.precedence() >= BinaryOperator::Equal.precedence(),
        Some(J::Unary(_) | J::TypeCast(_) | J::InstanceOf(_) | J::FieldAccess(_) | J::MemberReference(_)) => true,
        Some(J::MethodInvocation(invocation)) => invocation.select.as_ref().is_some_and(|s| s.element.id() == id),
        Some(J::ArrayAccess(access)) => access.indexed.id() == id,
        _ => false,
    }
}

fn parenthesize(tree: J) -> J {
    let prefix = tree.prefix().clone();
    Parentheses {
        meta: Meta::new(),
        prefix,
        tree: RightPadded::build(tree.with_prefix(Space::EMPTY)),
    }
    .into()
}

fn strip_parentheses(tree: &J) -> &J {
    match tree {
        J::Parentheses(parens) => strip_parentheses(&parens.tree.element),
        other => other,
    }
}

impl CompareEnumsVisitor {
    pub fn new() -> Self {
        Self {
            matcher: enum_equals(),
        }
    }
}

impl Default for CompareEnumsVisitor {
    fn default() -> Self {
        Self::new()
    }
}

/// `java.lang.Enum equals(java.lang.Object)`
fn enum_equals() -> MethodMatcher {
    MethodMatcher::new("java.lang.Enum", "equals", &["java.lang.Object"])
}

impl TreeVisitor<J, ExecutionContext> for CompareEnumsVisitor {
    fn dispatch(&self, tree: &J, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        dispatch(self, tree, p, cx)
    }
}

impl JavaVisitor<ExecutionContext> for CompareEnumsVisitor {
    fn visit_method_invocation(
        &self,
        node: &Arc<MethodInvocation>,
        p: &ExecutionContext,
        cx: &mut Traversal<J>,
    ) -> VisitResult<J> {
        let visited = walk_method_invocation(self, node, p, cx)?;
        let J::MethodInvocation(invocation) = &visited else {
            return Ok(visited);
        };
        let (Some(select), [argument]) = (&invocation.select, invocation.arguments.elements.as_slice()) else {
            return Ok(visited);
        };
        if !self.matcher.matches_invocation(invocation)
            || !argument.element.is_expression()
            || is_statement_position(cx.cursor(), node.meta.id)
        {
            return Ok(visited);
        }

        let negation = cx
            .cursor()
            .ancestors()
            .find(|tree| tree.kind() != JKind::Parentheses)
            .and_then(|tree| match tree {
                J::Unary(unary) if unary.operator.element == UnaryOperator::Not => Some(unary.meta.id),
                _ => None,
            });
        if let Some(unary) = negation {
            cx.put_message_on_first_enclosing(JKind::Unary, REMOVE_UNARY_NOT, unary);
        }
        let operator = if negation.is_some() {
            BinaryOperator::NotEqual
        } else {
            BinaryOperator::Equal
        };
        debug!(operator = operator.symbol(), "replacing enum equals()");

        let comparison: J = Binary {
            meta: Meta::new(),
            prefix: invocation.prefix.clone(),
            left: select.element.clone(),
            operator: LeftPadded::new(Space::single_space(), operator),
            right: argument.element.with_prefix(Space::single_space()),
            binary_type: JavaType::Primitive(Primitive::Boolean),
        }
        .into();

        if negation.is_none() && needs_parentheses(cx.cursor().parent_value(), node.meta.id) {
            return Ok(parenthesize(comparison));
        }
        Ok(comparison)
    }

    fn visit_unary(&self, node: &Arc<Unary>, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        let visited = walk_unary(self, node, p, cx)?;
        if cx.poll_nearest_message::<TreeId>(REMOVE_UNARY_NOT) != Some(node.meta.id) {
            return Ok(visited);
        }
        let J::Unary(unary) = &visited else {
            return Ok(visited);
        };
        let comparison = strip_parentheses(&unary.expression).with_prefix(unary.prefix.clone());
        if needs_parentheses(cx.cursor().parent_value(), node.meta.id) {
            return Ok(parenthesize(comparison));
        }
        Ok(comparison)
    }
}

/// Replaces `equals()` between enum values with `==`, which is null safe
/// and checked at compile time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareEnumsWithEqualityOperator {}

impl CompareEnumsWithEqualityOperator {
    pub const NAME: &'static str = "CompareEnumsWithEqualityOperator";
}

impl Recipe for CompareEnumsWithEqualityOperator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Enum values should be compared with \"==\""
    }

    fn description(&self) -> &str {
        "Replaces `Enum equals(java.lang.Object)` with an `==` comparison, and negated calls with `!=`."
    }

    fn applicability_test(&self) -> Option<Arc<dyn Applicability>> {
        Some(Arc::new(UsesMethod::new(enum_equals())))
    }

    fn transform_file(
        &self,
        source: &Arc<dyn SourceFile>,
        ctx: &ExecutionContext,
    ) -> Result<Arc<dyn SourceFile>, RecipeError> {
        visit_java_file(Self::NAME, &CompareEnumsVisitor::new(), source, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(operator: BinaryOperator) -> J {
        Binary {
            meta: Meta::new(),
            prefix: Space::EMPTY,
            left: Identifier::build(Space::EMPTY, "a", JavaType::Unknown),
            operator: LeftPadded::new(Space::single_space(), operator),
            right: Identifier::build(Space::single_space(), "b", JavaType::Unknown),
            binary_type: JavaType::Primitive(Primitive::Boolean),
        }
        .into()
    }

    #[test]
    fn test_needs_parentheses_by_precedence() {
        let id = TreeId::random();
        assert!(!needs_parentheses(Some(&binary(BinaryOperator::And)), id));
        assert!(!needs_parentheses(Some(&binary(BinaryOperator::Or)), id));
        assert!(needs_parentheses(Some(&binary(BinaryOperator::Equal)), id));
        assert!(needs_parentheses(Some(&binary(BinaryOperator::Addition)), id));
        assert!(!needs_parentheses(None, id));
    }

    #[test]
    fn test_parenthesize_moves_prefix_outside() {
        let wrapped = parenthesize(binary(BinaryOperator::Equal).with_prefix(Space::single_space()));
        let J::Parentheses(parens) = &wrapped else {
            panic!("expected parentheses");
        };
        assert_eq!(parens.prefix.as_str(), " ");
        assert!(parens.tree.element.prefix().is_empty());
    }
}
