//! Positions and selections

use crate::document::{Document, NodePath};
use serde::{Deserialize, Serialize};

/// Position in the document as (node path, offset within that node)
///
/// For text leaves the offset is a byte offset into the text; for other
/// nodes it is a child index.
#[derive(Debug, Clone, PartialEq, Eq, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub path: NodePath,
    pub offset: usize,
}

impl Position {
    /// Create a new position
    pub fn new(path: NodePath, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Position at the start of the node at `path`
    pub fn at(path: NodePath) -> Self {
        Self { path, offset: 0 }
    }
}

/// Text selection (anchor + head)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// The anchor point (fixed during extension)
    pub anchor: Position,
    /// The head point (moves during extension)
    pub head: Position,
}

impl Selection {
    /// Create a new selection
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor)
    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position.clone(),
            head: position,
        }
    }

    /// Cursor at the first position of the document
    pub fn at_start(doc: &Document) -> Self {
        Self::collapsed(Position::at(doc.first_position_in(0).unwrap_or_default()))
    }

    /// Check if selection is collapsed
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Get ordered start and end positions
    pub fn ordered(&self) -> (&Position, &Position) {
        if self.anchor <= self.head {
            (&self.anchor, &self.head)
        } else {
            (&self.head, &self.anchor)
        }
    }

    /// Index of the page holding the anchor
    pub fn page_index(&self) -> Option<usize> {
        self.anchor.path.page_index()
    }

    /// Check if the anchor lies inside a table cell
    pub fn in_table_cell(&self, doc: &Document) -> bool {
        doc.ancestors(&self.anchor.path)
            .iter()
            .any(|n| n.kind.is_table_cell())
    }
}
