//! Visitor dispatch over properties trees.

use std::sync::Arc;

use rewrite_core::{Traversal, TreeVisitor, VisitError, VisitResult};

use crate::tree::*;

/// Per-variant hooks. Defaults descend and rebuild only what changed.
pub trait PropertiesVisitor<P: ?Sized>: TreeVisitor<Properties, P> {
    fn visit_file(&self, node: &Arc<File>, p: &P, cx: &mut Traversal<Properties>) -> VisitResult<Properties> {
        walk_file(self, node, p, cx)
    }

    fn visit_entry(&self, node: &Arc<Entry>, p: &P, cx: &mut Traversal<Properties>) -> VisitResult<Properties> {
        walk_entry(self, node, p, cx)
    }

    fn visit_value(&self, node: &Arc<Value>, _p: &P, _cx: &mut Traversal<Properties>) -> VisitResult<Properties> {
        Ok(Properties::Value(node.clone()))
    }

    fn visit_comment(&self, node: &Arc<Comment>, _p: &P, _cx: &mut Traversal<Properties>) -> VisitResult<Properties> {
        Ok(Properties::Comment(node.clone()))
    }
}

pub fn dispatch<V, P>(visitor: &V, tree: &Properties, p: &P, cx: &mut Traversal<Properties>) -> VisitResult<Properties>
where
    V: PropertiesVisitor<P> + ?Sized,
    P: ?Sized,
{
    match tree {
        Properties::File(node) => visitor.visit_file(node, p, cx),
        Properties::Entry(node) => visitor.visit_entry(node, p, cx),
        Properties::Value(node) => visitor.visit_value(node, p, cx),
        Properties::Comment(node) => visitor.visit_comment(node, p, cx),
    }
}

pub fn walk_file<V, P>(v: &V, node: &Arc<File>, p: &P, cx: &mut Traversal<Properties>) -> VisitResult<Properties>
where
    V: PropertiesVisitor<P> + ?Sized,
    P: ?Sized,
{
    let mut changed = false;
    let mut content = Vec::with_capacity(node.content.len());
    for child in &node.content {
        let visited = v.visit(child, p, cx)?;
        if !matches!(visited, Properties::Entry(_) | Properties::Comment(_)) {
            return Err(VisitError::wrong_shape("an entry or comment", &visited));
        }
        changed |= !visited.is_same(child);
        content.push(visited);
    }
    Ok(if changed {
        File {
            content,
            ..(**node).clone()
        }
        .into()
    } else {
        Properties::File(node.clone())
    })
}

pub fn walk_entry<V, P>(v: &V, node: &Arc<Entry>, p: &P, cx: &mut Traversal<Properties>) -> VisitResult<Properties>
where
    V: PropertiesVisitor<P> + ?Sized,
    P: ?Sized,
{
    let value = v.visit(&node.value, p, cx)?;
    if !matches!(value, Properties::Value(_)) {
        return Err(VisitError::wrong_shape(PropertiesKind::Value.name(), &value));
    }
    Ok(if value.is_same(&node.value) {
        Properties::Entry(node.clone())
    } else {
        Entry {
            value,
            ..(**node).clone()
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_properties;
    use rewrite_core::Meta;

    struct Noop;

    impl TreeVisitor<Properties, ()> for Noop {
        fn dispatch(&self, tree: &Properties, p: &(), cx: &mut Traversal<Properties>) -> VisitResult<Properties> {
            dispatch(self, tree, p, cx)
        }
    }

    impl PropertiesVisitor<()> for Noop {}

    /// Puts a comment where a value belongs
    struct Broken;

    impl TreeVisitor<Properties, ()> for Broken {
        fn dispatch(&self, tree: &Properties, p: &(), cx: &mut Traversal<Properties>) -> VisitResult<Properties> {
            dispatch(self, tree, p, cx)
        }
    }

    impl PropertiesVisitor<()> for Broken {
        fn visit_value(&self, node: &Arc<Value>, _p: &(), _cx: &mut Traversal<Properties>) -> VisitResult<Properties> {
            Ok(Comment {
                meta: Meta::new(),
                prefix: node.prefix.clone(),
                delimiter: CommentDelimiter::Hash,
                message: node.text.clone(),
            }
            .into())
        }
    }

    fn file() -> Properties {
        Properties::from(parse_properties("# c\na=1\nb=2\n").unwrap())
    }

    #[test]
    fn test_noop_keeps_identity() {
        let tree = file();
        assert!(Noop.visit_root(&tree, &()).unwrap().is_same(&tree));
    }

    #[test]
    fn test_value_slot_checked() {
        let err = Broken.visit_root(&file(), &()).unwrap_err();
        assert!(matches!(err, VisitError::WrongShape { expected: "Value", .. }));
    }
}
