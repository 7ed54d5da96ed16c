//! Language-independent visitor plumbing.
//!
//! Each language crate implements [`TreeVisitor::dispatch`] as an exhaustive
//! match over its node set; the frame bookkeeping around every visit lives
//! here so no language can forget it.

use crate::cursor::{Cursor, Traversal};
use crate::tree::{Tree, TreeId};

/// Defects raised while visiting a tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VisitError {
    /// A visit returned a node that cannot occupy the position it was
    /// returned into
    #[error("visitor returned {found} where {expected} is required (node {id})")]
    WrongShape {
        expected: &'static str,
        found: String,
        id: TreeId,
    },

    /// A visit required an enclosing node that is not on the cursor path
    #[error("no enclosing {kind} on the cursor path")]
    MissingAncestor { kind: String },
}

impl VisitError {
    pub fn wrong_shape<T: Tree>(expected: &'static str, found: &T) -> Self {
        VisitError::WrongShape {
            expected,
            found: format!("{:?}", found.kind()),
            id: found.id(),
        }
    }

    /// Node the defect was reported against, if any
    pub fn node_id(&self) -> Option<TreeId> {
        match self {
            VisitError::WrongShape { id, .. } => Some(*id),
            VisitError::MissingAncestor { .. } => None,
        }
    }
}

pub type VisitResult<T> = Result<T, VisitError>;

/// A tree-stateless transformation over nodes of type `T`.
///
/// Visitors may hold configuration, never per-tree state; everything a
/// single traversal needs lives in the [`Traversal`] passed along. `P` is the
/// caller's context parameter, usually an `ExecutionContext`.
pub trait TreeVisitor<T: Tree, P: ?Sized> {
    /// Route `tree` to the handler for its variant. Called with the frame for
    /// `tree` already pushed.
    fn dispatch(&self, tree: &T, p: &P, cx: &mut Traversal<T>) -> VisitResult<T>;

    /// Visit one node, pushing and popping its cursor frame
    fn visit(&self, tree: &T, p: &P, cx: &mut Traversal<T>) -> VisitResult<T> {
        cx.enter(tree.clone());
        let result = self.dispatch(tree, p, cx);
        cx.exit();
        result
    }

    /// Visit a whole tree with a fresh traversal
    fn visit_root(&self, tree: &T, p: &P) -> VisitResult<T> {
        let mut cx = Traversal::new();
        self.visit(tree, p, &mut cx)
    }

    /// Visit `tree` as if it sat below `parent`, so ancestor lookups still
    /// work. Messages of the outer traversal are not visible.
    fn visit_at(&self, tree: &T, p: &P, parent: &Cursor<T>) -> VisitResult<T> {
        let mut cx = Traversal::at(parent.clone());
        self.visit(tree, p, &mut cx)
    }
}
