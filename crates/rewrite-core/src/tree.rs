use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::marker::Markers;

/// Stable identity of a syntactic element.
///
/// Generated once when a node is created and carried through every edit that
/// still represents "the same" element. Freshly synthesized elements get a
/// new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(pub Uuid);

impl TreeId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TreeId {
    fn default() -> Self {
        Self::random()
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Identity and markers of a node.
///
/// Neither participates in structural equality: two `Meta` values always
/// compare equal, so deriving `PartialEq` on a node compares only its
/// syntax and formatting.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub id: TreeId,
    pub markers: Markers,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(&self, markers: Markers) -> Self {
        Self {
            id: self.id,
            markers,
        }
    }
}

impl PartialEq for Meta {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Contract every language's node set satisfies.
///
/// Implementations are closed sum types whose variants hold their payload
/// behind `Arc`, so cloning is cheap and reference identity is observable
/// through [`Tree::is_same`].
pub trait Tree: Clone + fmt::Debug {
    /// Field-less discriminant used for "nearest ancestor of kind" lookups.
    type Kind: Copy + Eq + fmt::Debug;

    fn id(&self) -> TreeId;

    fn kind(&self) -> Self::Kind;

    fn markers(&self) -> &Markers;

    /// Reference identity: true only when both handles point at the same
    /// allocation, i.e. nothing was rebuilt.
    fn is_same(&self, other: &Self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_ignored_by_equality() {
        let a = Meta::new();
        let b = Meta::new();
        assert_ne!(a.id, b.id);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tree_id_display_is_short() {
        let id = TreeId::random();
        assert_eq!(id.to_string().len(), 8);
    }
}
