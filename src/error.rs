//! Error types for the editor and its pagination subsystem
//!
//! Errors are split by subsystem:
//! - Step errors (a transformation does not fit the tree it is applied to)
//! - Document errors (a loaded tree breaks the page-container invariant)
//! - Pagination errors (measurement was not possible; recovered locally)
//!
//! Pagination never surfaces its errors to the user. The page plugin logs
//! them and skips the pass; the next edit retries.

use crate::document::{NodeKind, NodePath};
use thiserror::Error;

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Top-level error type for the editor
#[derive(Error, Debug)]
pub enum EditorError {
    /// A step could not be applied
    #[error("Step error: {0}")]
    Step(#[from] StepError),

    /// The document tree is malformed
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a document failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while applying a step to a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    /// The path does not resolve to a node
    #[error("No node at path {path:?}")]
    InvalidPath { path: NodePath },

    /// A child index is out of range for its parent
    #[error("Index {index} out of bounds for {len} children at {parent:?}")]
    IndexOutOfBounds {
        parent: NodePath,
        index: usize,
        len: usize,
    },

    /// A text step targets a node that holds no text
    #[error("Node at {path:?} is a {kind:?}, not a text node")]
    NotText { path: NodePath, kind: NodeKind },

    /// A text range is outside the node's text or splits a character
    #[error("Text range {start}..{end} invalid at {path:?}")]
    InvalidTextRange {
        path: NodePath,
        start: usize,
        end: usize,
    },

    /// A node cannot be moved into its own subtree
    #[error("Cannot move {from:?} into its own subtree at {to:?}")]
    MoveIntoSelf { from: NodePath, to: NodePath },

    /// The root node cannot be replaced or removed
    #[error("The document root cannot be targeted")]
    RootTargeted,

    /// Only page containers may sit at the top level, and one must remain
    #[error("Top level must hold at least one page and only pages, got {kind:?}")]
    InvalidTopLevel { kind: NodeKind },
}

/// Errors raised when a document breaks its structural invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// A top-level child is not a page container
    #[error("Top-level child {index} is a {kind:?}, expected a page")]
    NonPageTopLevel { index: usize, kind: NodeKind },

    /// The root holds no page at all
    #[error("Document has no pages")]
    NoPages,

    /// The root node is not a document node
    #[error("Root node is a {kind:?}, expected a document")]
    NotADocument { kind: NodeKind },
}

/// Errors raised by a pagination pass
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaginationError {
    /// A node is not attached to a render surface yet
    #[error("Measurement unavailable for {kind:?} (id {id:?})")]
    MeasurementUnavailable { kind: NodeKind, id: Option<String> },

    /// The planned moves did not apply to the working copy
    #[error("Reflow plan invalid: {0}")]
    Plan(#[from] StepError),
}
