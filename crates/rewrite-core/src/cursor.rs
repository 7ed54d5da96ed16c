//! Traversal-scoped ancestry chain and its message side-table.
//!
//! A [`Cursor`] is an immutable singly-linked list of frames with shared
//! tails: descending allocates one frame and never touches the parent chain,
//! so sibling cursors share every ancestor frame.
//!
//! Messages do not live on the frames. A [`Traversal`] owns a side-table keyed
//! by frame id and drops a frame's messages when the visit of that frame
//! returns, so nothing survives the traversal and siblings never see each
//! other's entries.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::tree::Tree;
use crate::visitor::VisitError;

static NEXT_FRAME: AtomicU64 = AtomicU64::new(1);

/// Identity of one cursor frame, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

impl FrameId {
    fn next() -> Self {
        Self(NEXT_FRAME.fetch_add(1, Ordering::Relaxed))
    }
}

struct Frame<T> {
    id: FrameId,
    value: T,
    parent: Option<Arc<Frame<T>>>,
}

/// Position in a tree: the current node and every ancestor above it
pub struct Cursor<T> {
    head: Option<Arc<Frame<T>>>,
}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<T> Default for Cursor<T> {
    fn default() -> Self {
        Self::root()
    }
}

impl<T> Cursor<T> {
    /// Cursor above the root of a tree: no frames at all
    pub fn root() -> Self {
        Self { head: None }
    }

    /// New cursor one level deeper. O(1); `self` is left untouched.
    pub fn descend(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Frame {
                id: FrameId::next(),
                value,
                parent: self.head.clone(),
            })),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.head.as_deref().map(|frame| &frame.value)
    }

    pub fn frame_id(&self) -> Option<FrameId> {
        self.head.as_deref().map(|frame| frame.id)
    }

    pub fn is_root(&self) -> bool {
        self.head.is_none()
    }

    /// Cursor positioned at the parent frame
    pub fn parent(&self) -> Option<Cursor<T>> {
        self.head.as_deref().map(|frame| Cursor {
            head: frame.parent.clone(),
        })
    }

    pub fn parent_value(&self) -> Option<&T> {
        self.head
            .as_deref()
            .and_then(|frame| frame.parent.as_deref())
            .map(|frame| &frame.value)
    }

    pub fn depth(&self) -> usize {
        self.path().count()
    }

    /// Current node followed by each ancestor up to the root
    pub fn path(&self) -> impl Iterator<Item = &T> {
        self.frames().map(|frame| &frame.value)
    }

    /// Ancestors only, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &T> {
        self.path().skip(1)
    }

    /// Walk up from the parent to the first cursor whose value satisfies
    /// `predicate`
    pub fn ancestor_where(&self, predicate: impl Fn(&T) -> bool) -> Option<Cursor<T>> {
        let mut current = self.parent()?;
        loop {
            if predicate(current.value()?) {
                return Some(current);
            }
            current = current.parent()?;
        }
    }

    /// Shares frames with `other`. Sibling cursors always share their parent.
    pub fn shares_frame_with(&self, other: &Cursor<T>) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn frames(&self) -> Frames<'_, T> {
        Frames {
            next: self.head.as_deref(),
        }
    }
}

impl<T: Tree> Cursor<T> {
    /// Nearest ancestor (excluding the current node) of the given kind
    pub fn nearest_ancestor(&self, kind: T::Kind) -> Result<&T, VisitError> {
        self.ancestors()
            .find(|value| value.kind() == kind)
            .ok_or_else(|| VisitError::MissingAncestor {
                kind: format!("{kind:?}"),
            })
    }

    /// Cursor for the nearest frame of `kind`, starting at the current node
    pub fn first_enclosing(&self, kind: T::Kind) -> Option<Cursor<T>> {
        let mut current = self.clone();
        loop {
            if current.value()?.kind() == kind {
                return Some(current);
            }
            current = current.parent()?;
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.path()).finish()
    }
}

struct Frames<'a, T> {
    next: Option<&'a Frame<T>>,
}

impl<'a, T> Iterator for Frames<'a, T> {
    type Item = &'a Frame<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.next?;
        self.next = frame.parent.as_deref();
        Some(frame)
    }
}

type Slot = HashMap<&'static str, Box<dyn Any>>;

/// State of one in-progress traversal: the cursor plus per-frame messages.
///
/// Owned by a single visit call and never shared across threads.
pub struct Traversal<T> {
    cursor: Cursor<T>,
    messages: HashMap<FrameId, Slot>,
}

impl<T> Default for Traversal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Traversal<T> {
    pub fn new() -> Self {
        Self::at(Cursor::root())
    }

    /// Start a traversal below an existing position, e.g. when a visitor
    /// delegates a local edit to another visitor
    pub fn at(cursor: Cursor<T>) -> Self {
        Self {
            cursor,
            messages: HashMap::new(),
        }
    }

    pub fn cursor(&self) -> &Cursor<T> {
        &self.cursor
    }

    /// Push a frame for `value`
    pub fn enter(&mut self, value: T) {
        self.cursor = self.cursor.descend(value);
    }

    /// Pop the current frame, discarding its messages
    pub fn exit(&mut self) {
        if let Some(id) = self.cursor.frame_id() {
            self.messages.remove(&id);
        }
        if let Some(parent) = self.cursor.parent() {
            self.cursor = parent;
        }
    }

    /// Store `value` on the current frame
    pub fn put_message<V: Any>(&mut self, key: &'static str, value: V) {
        if let Some(id) = self.cursor.frame_id() {
            self.messages.entry(id).or_default().insert(key, Box::new(value));
        }
    }

    /// Read without clearing. Current frame only.
    pub fn get_message<V: Any>(&self, key: &'static str) -> Option<&V> {
        let id = self.cursor.frame_id()?;
        self.messages.get(&id)?.get(key)?.downcast_ref::<V>()
    }

    /// Read and clear a message on the current frame.
    ///
    /// Ancestor frames are not consulted. A value stored under `key` with a
    /// different type is left in place.
    pub fn poll_nearest_message<V: Any>(&mut self, key: &'static str) -> Option<V> {
        let id = self.cursor.frame_id()?;
        let slot = self.messages.get_mut(&id)?;
        if !slot.get(key)?.is::<V>() {
            return None;
        }
        let value = slot.remove(key)?;
        value.downcast::<V>().ok().map(|boxed| *boxed)
    }
}

impl<T: Tree> Traversal<T> {
    /// Store `value` on the nearest frame of `kind`, the current frame
    /// included. Returns false and stores nothing when no such frame is on
    /// the path.
    pub fn put_message_on_first_enclosing<V: Any>(&mut self, kind: T::Kind, key: &'static str, value: V) -> bool {
        let Some(id) = self.cursor.first_enclosing(kind).and_then(|c| c.frame_id()) else {
            return false;
        };
        self.messages.entry(id).or_default().insert(key, Box::new(value));
        true
    }

    pub fn nearest_ancestor(&self, kind: T::Kind) -> Result<&T, VisitError> {
        self.cursor.nearest_ancestor(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::Markers;
    use crate::tree::TreeId;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Block,
        Group,
        Leaf,
    }

    #[derive(Debug, Clone)]
    struct Node {
        id: TreeId,
        kind: Kind,
        markers: Markers,
    }

    impl Node {
        fn new(kind: Kind) -> Self {
            Self {
                id: TreeId::random(),
                kind,
                markers: Markers::empty(),
            }
        }
    }

    impl Tree for Node {
        type Kind = Kind;

        fn id(&self) -> TreeId {
            self.id
        }

        fn kind(&self) -> Kind {
            self.kind
        }

        fn markers(&self) -> &Markers {
            &self.markers
        }

        fn is_same(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    #[test]
    fn test_descend_shares_parent_chain() {
        let root = Cursor::root().descend(Node::new(Kind::Block));
        let group = root.descend(Node::new(Kind::Group));
        let left = group.descend(Node::new(Kind::Leaf));
        let right = group.descend(Node::new(Kind::Leaf));

        assert!(left.parent().is_some_and(|p| p.shares_frame_with(&group)));
        assert!(right.parent().is_some_and(|p| p.shares_frame_with(&group)));
        assert_eq!(group.depth(), 2);
        assert_eq!(left.depth(), 3);
    }

    #[test]
    fn test_nearest_ancestor() {
        let cursor = Cursor::root()
            .descend(Node::new(Kind::Block))
            .descend(Node::new(Kind::Group))
            .descend(Node::new(Kind::Leaf));

        assert_eq!(cursor.nearest_ancestor(Kind::Block).map(|n| n.kind), Ok(Kind::Block));
        // the current node is not its own ancestor
        assert!(matches!(
            cursor.nearest_ancestor(Kind::Leaf),
            Err(VisitError::MissingAncestor { .. })
        ));
    }

    #[test]
    fn test_message_reaches_enclosing_frame() {
        let mut cx = Traversal::new();
        cx.enter(Node::new(Kind::Group));
        cx.enter(Node::new(Kind::Leaf));

        assert!(cx.put_message_on_first_enclosing(Kind::Group, "flag", 7u32));
        // the leaf's own frame holds nothing
        assert_eq!(cx.poll_nearest_message::<u32>("flag"), None);

        cx.exit();
        assert_eq!(cx.poll_nearest_message::<u32>("flag"), Some(7));
        // consumed exactly once
        assert_eq!(cx.poll_nearest_message::<u32>("flag"), None);
    }

    #[test]
    fn test_missing_enclosing_frame_is_no_op() {
        let mut cx = Traversal::new();
        cx.enter(Node::new(Kind::Block));
        cx.enter(Node::new(Kind::Leaf));

        assert!(!cx.put_message_on_first_enclosing(Kind::Group, "flag", true));
        cx.exit();
        assert_eq!(cx.poll_nearest_message::<bool>("flag"), None);
    }

    #[test]
    fn test_sibling_never_sees_message() {
        let mut cx = Traversal::new();
        cx.enter(Node::new(Kind::Group));

        cx.enter(Node::new(Kind::Group));
        cx.enter(Node::new(Kind::Leaf));
        cx.put_message_on_first_enclosing(Kind::Group, "flag", "left");
        cx.exit();
        // inner group returns without consuming; its slot is dropped
        cx.exit();

        cx.enter(Node::new(Kind::Group));
        cx.enter(Node::new(Kind::Leaf));
        cx.exit();
        assert_eq!(cx.poll_nearest_message::<&str>("flag"), None);
        cx.exit();

        assert_eq!(cx.poll_nearest_message::<&str>("flag"), None);
    }

    #[test]
    fn test_poll_with_wrong_type_leaves_value() {
        let mut cx: Traversal<Node> = Traversal::new();
        cx.enter(Node::new(Kind::Leaf));
        cx.put_message("count", 3usize);

        assert_eq!(cx.poll_nearest_message::<u32>("count"), None);
        assert_eq!(cx.get_message::<usize>("count"), Some(&3));
    }
}
