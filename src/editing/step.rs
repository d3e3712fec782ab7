//! Invertible tree steps

use crate::document::{Attrs, Document, Node, NodeKind, NodePath};
use crate::editing::Position;
use crate::error::StepError;

/// One atomic change to the document tree
///
/// Applying a step returns its inverse, so a list of applied steps can be
/// reverted by applying the inverses in reverse order.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Insert a node as the `index`-th child of `parent`
    InsertNode {
        parent: NodePath,
        index: usize,
        node: Node,
    },
    /// Remove the `index`-th child of `parent`
    RemoveNode { parent: NodePath, index: usize },
    /// Move a node; the destination is addressed in the tree after removal
    MoveNode {
        from_parent: NodePath,
        from_index: usize,
        to_parent: NodePath,
        to_index: usize,
    },
    /// Replace a node's attributes
    SetAttrs { path: NodePath, attrs: Attrs },
    /// Insert text into a text leaf at a byte offset
    InsertText {
        path: NodePath,
        offset: usize,
        text: String,
    },
    /// Delete a byte range of a text leaf
    DeleteText {
        path: NodePath,
        start: usize,
        end: usize,
    },
}

impl Step {
    /// Create an insert step
    pub fn insert(parent: NodePath, index: usize, node: Node) -> Self {
        Self::InsertNode {
            parent,
            index,
            node,
        }
    }

    /// Create a remove step
    pub fn remove(parent: NodePath, index: usize) -> Self {
        Self::RemoveNode { parent, index }
    }

    /// Create a move step
    pub fn move_node(from_parent: NodePath, from_index: usize, to_parent: NodePath, to_index: usize) -> Self {
        Self::MoveNode {
            from_parent,
            from_index,
            to_parent,
            to_index,
        }
    }

    /// Apply this step to the document, returning the inverse step
    pub fn apply(&self, doc: &mut Document) -> Result<Step, StepError> {
        match self {
            Step::InsertNode {
                parent,
                index,
                node,
            } => {
                if parent.is_root() && node.kind != NodeKind::Page {
                    return Err(StepError::InvalidTopLevel { kind: node.kind });
                }
                insert_child(doc, parent, *index, node.clone())?;
                Ok(Step::remove(parent.clone(), *index))
            }
            Step::RemoveNode { parent, index } => {
                if parent.is_root() && doc.page_count() <= 1 {
                    return Err(StepError::InvalidTopLevel {
                        kind: NodeKind::Page,
                    });
                }
                let node = remove_child(doc, parent, *index)?;
                Ok(Step::insert(parent.clone(), *index, node))
            }
            Step::MoveNode {
                from_parent,
                from_index,
                to_parent,
                to_index,
            } => {
                let moved = from_parent.child(*from_index);
                if to_parent.starts_with(&moved) {
                    return Err(StepError::MoveIntoSelf {
                        from: moved,
                        to: to_parent.clone(),
                    });
                }
                if from_parent.is_root() != to_parent.is_root() {
                    let kind = doc
                        .node_at(&moved)
                        .map(|n| n.kind)
                        .ok_or_else(|| StepError::InvalidPath { path: moved.clone() })?;
                    return Err(StepError::InvalidTopLevel { kind });
                }
                let node = remove_child(doc, from_parent, *from_index)?;
                if let Err(err) = insert_child(doc, to_parent, *to_index, node.clone()) {
                    // Put the node back so a failed step leaves no trace
                    insert_child(doc, from_parent, *from_index, node)?;
                    return Err(err);
                }
                Ok(Step::move_node(
                    to_parent.clone(),
                    *to_index,
                    from_parent.clone(),
                    *from_index,
                ))
            }
            Step::SetAttrs { path, attrs } => {
                if path.is_root() {
                    return Err(StepError::RootTargeted);
                }
                let node = doc.node_at_mut(path)?;
                let old = std::mem::replace(&mut node.attrs, attrs.clone());
                Ok(Step::SetAttrs {
                    path: path.clone(),
                    attrs: old,
                })
            }
            Step::InsertText { path, offset, text } => {
                let node = text_node_mut(doc, path)?;
                if *offset > node.text.len() || !node.text.is_char_boundary(*offset) {
                    return Err(StepError::InvalidTextRange {
                        path: path.clone(),
                        start: *offset,
                        end: *offset,
                    });
                }
                node.text.insert_str(*offset, text);
                Ok(Step::DeleteText {
                    path: path.clone(),
                    start: *offset,
                    end: offset + text.len(),
                })
            }
            Step::DeleteText { path, start, end } => {
                let node = text_node_mut(doc, path)?;
                let valid = start <= end
                    && *end <= node.text.len()
                    && node.text.is_char_boundary(*start)
                    && node.text.is_char_boundary(*end);
                if !valid {
                    return Err(StepError::InvalidTextRange {
                        path: path.clone(),
                        start: *start,
                        end: *end,
                    });
                }
                let removed: String = node.text.drain(*start..*end).collect();
                Ok(Step::InsertText {
                    path: path.clone(),
                    offset: *start,
                    text: removed,
                })
            }
        }
    }

    /// Map a position through this step
    pub fn map(&self, pos: &Position) -> Position {
        match self {
            Step::InsertNode { parent, index, .. } => {
                let mut mapped = Position::new(map_insert(&pos.path, parent, *index), pos.offset);
                if pos.path == *parent && pos.offset >= *index {
                    mapped.offset += 1;
                }
                mapped
            }
            Step::RemoveNode { parent, index } => match map_remove(&pos.path, parent, *index) {
                Some(path) => {
                    let mut mapped = Position::new(path, pos.offset);
                    if pos.path == *parent && pos.offset > *index {
                        mapped.offset -= 1;
                    }
                    mapped
                }
                None => Position::new(parent.clone(), *index),
            },
            Step::MoveNode {
                from_parent,
                from_index,
                to_parent,
                to_index,
            } => {
                let moved = from_parent.child(*from_index);
                if pos.path.starts_with(&moved) {
                    let mut path = to_parent.child(*to_index);
                    path.0.extend_from_slice(&pos.path.as_slice()[moved.depth()..]);
                    return Position::new(path, pos.offset);
                }
                let removed = map_remove(&pos.path, from_parent, *from_index).unwrap_or_else(|| pos.path.clone());
                Position::new(map_insert(&removed, to_parent, *to_index), pos.offset)
            }
            Step::SetAttrs { .. } => pos.clone(),
            Step::InsertText { path, offset, text } => {
                if pos.path == *path && pos.offset >= *offset {
                    Position::new(pos.path.clone(), pos.offset + text.len())
                } else {
                    pos.clone()
                }
            }
            Step::DeleteText { path, start, end } => {
                if pos.path != *path || pos.offset <= *start {
                    pos.clone()
                } else if pos.offset <= *end {
                    Position::new(pos.path.clone(), *start)
                } else {
                    Position::new(pos.path.clone(), pos.offset - (end - start))
                }
            }
        }
    }

    /// Check if this step changes the document structure (not only text)
    pub fn is_structural(&self) -> bool {
        !matches!(self, Step::InsertText { .. } | Step::DeleteText { .. })
    }
}

fn insert_child(doc: &mut Document, parent: &NodePath, index: usize, node: Node) -> Result<(), StepError> {
    let target = doc.node_at_mut(parent)?;
    if index > target.children.len() {
        return Err(StepError::IndexOutOfBounds {
            parent: parent.clone(),
            index,
            len: target.children.len(),
        });
    }
    target.children.insert(index, node);
    Ok(())
}

fn remove_child(doc: &mut Document, parent: &NodePath, index: usize) -> Result<Node, StepError> {
    let target = doc.node_at_mut(parent)?;
    if index >= target.children.len() {
        return Err(StepError::IndexOutOfBounds {
            parent: parent.clone(),
            index,
            len: target.children.len(),
        });
    }
    Ok(target.children.remove(index))
}

fn text_node_mut<'a>(doc: &'a mut Document, path: &NodePath) -> Result<&'a mut Node, StepError> {
    let node = doc.node_at_mut(path)?;
    if !node.kind.is_text() {
        return Err(StepError::NotText {
            path: path.clone(),
            kind: node.kind,
        });
    }
    Ok(node)
}

/// Shift a path for a node inserted as `parent[index]`
fn map_insert(path: &NodePath, parent: &NodePath, index: usize) -> NodePath {
    let depth = parent.depth();
    if path.is_inside(parent) && path.0[depth] >= index {
        let mut mapped = path.clone();
        mapped.0[depth] += 1;
        mapped
    } else {
        path.clone()
    }
}

/// Shift a path for the removal of `parent[index]`; `None` if it was removed
fn map_remove(path: &NodePath, parent: &NodePath, index: usize) -> Option<NodePath> {
    let depth = parent.depth();
    if !path.is_inside(parent) {
        return Some(path.clone());
    }
    let at = path.0[depth];
    if at == index {
        return None;
    }
    let mut mapped = path.clone();
    if at > index {
        mapped.0[depth] -= 1;
    }
    Some(mapped)
}
