//! Out-of-band metadata attached to a single node.
//!
//! Markers are never mutated in place. Adding or replacing one produces a new
//! `Markers` value, which the owner installs on a new node instance.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::tree::TreeId;

/// A typed piece of metadata attached to exactly one node
pub trait Marker: Any + Send + Sync + fmt::Debug {
    fn id(&self) -> TreeId;

    fn as_any(&self) -> &dyn Any;
}

/// Immutable collection of markers on one node
#[derive(Clone, Default)]
pub struct Markers {
    entries: Vec<Arc<dyn Marker>>,
}

impl Markers {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Marker>> {
        self.entries.iter()
    }

    /// First marker of type `M`, if any
    pub fn find_first<M: Marker>(&self) -> Option<&M> {
        self.entries
            .iter()
            .find_map(|marker| marker.as_any().downcast_ref::<M>())
    }

    pub fn contains<M: Marker>(&self) -> bool {
        self.find_first::<M>().is_some()
    }

    /// New collection with `marker` appended
    pub fn add(&self, marker: impl Marker) -> Self {
        let mut entries = self.entries.clone();
        entries.push(Arc::new(marker));
        Self { entries }
    }

    /// New collection where every marker of type `M` is dropped
    pub fn remove<M: Marker>(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|marker| marker.as_any().downcast_ref::<M>().is_none())
                .cloned()
                .collect(),
        }
    }

    /// New collection where `M` markers are replaced by `marker`
    pub fn set<M: Marker>(&self, marker: M) -> Self {
        self.remove::<M>().add(marker)
    }

    /// Element-wise comparison by marker identity
    pub fn same_entries(&self, other: &Markers) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|(a, b)| a.id() == b.id())
    }
}

impl fmt::Debug for Markers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

/// Flags a node as a search hit
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: TreeId,
    pub description: Option<String>,
}

impl SearchResult {
    pub fn new(description: Option<String>) -> Self {
        Self {
            id: TreeId::random(),
            description,
        }
    }
}

impl Marker for SearchResult {
    fn id(&self) -> TreeId {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Attached to a source file whose bytes could not be parsed
#[derive(Debug, Clone)]
pub struct ParseExceptionResult {
    pub id: TreeId,
    pub parser: String,
    pub message: String,
}

impl ParseExceptionResult {
    pub fn new(parser: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: TreeId::random(),
            parser: parser.into(),
            message: message.into(),
        }
    }
}

impl Marker for ParseExceptionResult {
    fn id(&self) -> TreeId {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Attached to a source file on which a recipe raised a defect
#[derive(Debug, Clone)]
pub struct RecipeFailure {
    pub id: TreeId,
    pub recipe: String,
    pub message: String,
}

impl RecipeFailure {
    pub fn new(recipe: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: TreeId::random(),
            recipe: recipe.into(),
            message: message.into(),
        }
    }
}

impl Marker for RecipeFailure {
    fn id(&self) -> TreeId {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
