//! Paths addressing nodes by child index from the root

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Child-index path from the document root to a node
///
/// The empty path is the root; `[2, 1, 0]` is the first child of the
/// second child of the third page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(pub SmallVec<[usize; 6]>);

impl NodePath {
    /// The root path
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    /// Build a path from child indices
    pub fn from_slice(indices: &[usize]) -> Self {
        Self(SmallVec::from_slice(indices))
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.0.push(index);
        path
    }

    /// Path of the parent, or `None` for the root
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(SmallVec::from_slice(&self.0[..self.0.len() - 1])))
    }

    /// Index of this node within its parent
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Number of steps from the root
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the top-level page this path lies in
    pub fn page_index(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Check if `self` equals `other` or lies inside it
    pub fn starts_with(&self, other: &NodePath) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }

    /// Check if `self` lies strictly inside `other`
    pub fn is_inside(&self, other: &NodePath) -> bool {
        self.0.len() > other.0.len() && self.starts_with(other)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl From<&[usize]> for NodePath {
    fn from(indices: &[usize]) -> Self {
        Self::from_slice(indices)
    }
}
