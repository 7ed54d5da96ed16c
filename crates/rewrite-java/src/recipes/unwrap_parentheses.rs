//! Single-purpose edit: replace one parenthesized expression with its
//! contents. Other recipes delegate to it with an explicit target.

use std::sync::Arc;

use rewrite_core::{Cursor, ExecutionContext, Traversal, TreeId, TreeVisitor, VisitResult};

use crate::tree::*;
use crate::visitor::{dispatch, walk_parentheses, JavaVisitor};

pub struct UnwrapParentheses {
    target: TreeId,
}

impl UnwrapParentheses {
    pub fn new(target: TreeId) -> Self {
        Self { target }
    }

    /// Unwrap `parens` somewhere inside `tree`, where `tree` sits at the
    /// current position of `cx`
    pub fn unwrap_in(parens: &J, tree: &J, p: &ExecutionContext, cx: &Traversal<J>) -> VisitResult<J> {
        let parent = cx.cursor().parent().unwrap_or_default();
        Self::new(parens.id()).visit_at(tree, p, &parent)
    }
}

/// Whether the parentheses at `cursor` can go without changing the
/// meaning or the syntax of the parent
pub fn is_unwrappable(cursor: &Cursor<J>) -> bool {
    let Some(J::Parentheses(parens)) = cursor.value() else {
        return false;
    };
    match cursor.parent_value() {
        Some(J::If(_) | J::WhileLoop(_) | J::TypeCast(_)) => false,
        Some(J::DoWhileLoop(do_while)) => do_while.while_condition.element.id() != parens.meta.id,
        Some(J::Unary(_)) => !matches!(
            parens.tree.element,
            J::Assignment(_) | J::Binary(_) | J::Ternary(_) | J::InstanceOf(_)
        ),
        // `(a)instanceof T` must not become `ainstanceof T`
        Some(J::InstanceOf(instance_of)) => {
            instance_of.expression.element.id() != parens.meta.id || !instance_of.expression.after.is_empty()
        }
        _ => true,
    }
}

impl TreeVisitor<J, ExecutionContext> for UnwrapParentheses {
    fn dispatch(&self, tree: &J, p: &ExecutionContext, cx: &mut Traversal<J>) -> VisitResult<J> {
        dispatch(self, tree, p, cx)
    }
}

impl JavaVisitor<ExecutionContext> for UnwrapParentheses {
    fn visit_parentheses(
        &self,
        node: &Arc<Parentheses>,
        p: &ExecutionContext,
        cx: &mut Traversal<J>,
    ) -> VisitResult<J> {
        if node.meta.id == self.target && is_unwrappable(cx.cursor()) {
            let mut prefix = node.prefix.clone();
            // `return(x)` must not become `returnx`
            if prefix.is_empty() && matches!(cx.cursor().parent_value(), Some(J::Return(_) | J::Throw(_))) {
                prefix = Space::single_space();
            }
            return Ok(node.tree.element.with_prefix(prefix));
        }
        walk_parentheses(self, node, p, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_compilation_unit;
    use crate::printer::ToSource;
    use pretty_assertions::assert_eq;

    /// Finds the first parentheses node in a tree
    fn first_parentheses(tree: &J) -> Option<J> {
        struct Find(std::cell::RefCell<Option<J>>);

        impl TreeVisitor<J, ()> for Find {
            fn dispatch(&self, tree: &J, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
                dispatch(self, tree, p, cx)
            }
        }

        impl JavaVisitor<()> for Find {
            fn visit_parentheses(&self, node: &Arc<Parentheses>, p: &(), cx: &mut Traversal<J>) -> VisitResult<J> {
                self.0.borrow_mut().get_or_insert_with(|| J::Parentheses(node.clone()));
                walk_parentheses(self, node, p, cx)
            }
        }

        let find = Find(Default::default());
        find.visit_root(tree, &()).ok()?;
        find.0.into_inner()
    }

    fn unwrap_first(source: &str) -> String {
        let tree = J::from(parse_compilation_unit(source).unwrap());
        let parens = first_parentheses(&tree).unwrap();
        UnwrapParentheses::new(parens.id())
            .visit_root(&tree, &ExecutionContext::new())
            .unwrap()
            .to_source()
    }

    #[test]
    fn test_unwrap_keeps_prefix() {
        assert_eq!(
            unwrap_first("class A {\n    int f(int a) {\n        int b = (a);\n        return b;\n    }\n}\n"),
            "class A {\n    int f(int a) {\n        int b = a;\n        return b;\n    }\n}\n"
        );
    }

    #[test]
    fn test_return_gets_space() {
        assert_eq!(
            unwrap_first("class A {\n    int f(int a) {\n        return(a);\n    }\n}\n"),
            "class A {\n    int f(int a) {\n        return a;\n    }\n}\n"
        );
    }

    #[test]
    fn test_instanceof_needs_separation() {
        let source = "class A {\n    boolean f(Object a) {\n        return (a)instanceof String;\n    }\n}\n";
        assert_eq!(unwrap_first(source), source);
        assert_eq!(
            unwrap_first("class A {\n    boolean f(Object a) {\n        return (a) instanceof String;\n    }\n}\n"),
            "class A {\n    boolean f(Object a) {\n        return a instanceof String;\n    }\n}\n"
        );
    }

    #[test]
    fn test_negated_binary_is_kept() {
        let source = "class A {\n    boolean f(int a) {\n        return !(a > 1);\n    }\n}\n";
        assert_eq!(unwrap_first(source), source);
    }
}
