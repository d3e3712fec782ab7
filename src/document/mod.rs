//! Document model: a tree of page containers holding flowing content

mod node;
mod path;
pub mod schema;

pub use node::{Attrs, Node, NodeKind};
pub use path::NodePath;

use crate::error::{DocumentError, StepError};

/// The document tree
///
/// Top-level children of the root are exclusively page containers, in
/// reading order, and there is always at least one.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding one empty page
    pub fn new() -> Self {
        Self {
            root: Node::with_children(NodeKind::Doc, vec![schema::page()]),
        }
    }

    /// Create a document from page nodes
    pub fn from_pages(pages: Vec<Node>) -> Result<Self, DocumentError> {
        Self::from_root(Node::with_children(NodeKind::Doc, pages))
    }

    /// Create a document with all blocks on a single page
    pub fn from_blocks(blocks: Vec<Node>) -> Self {
        Self {
            root: Node::with_children(NodeKind::Doc, vec![schema::page_with(blocks)]),
        }
    }

    /// Wrap a root node, checking the page-container invariant
    pub fn from_root(root: Node) -> Result<Self, DocumentError> {
        if root.kind != NodeKind::Doc {
            return Err(DocumentError::NotADocument { kind: root.kind });
        }
        if root.children.is_empty() {
            return Err(DocumentError::NoPages);
        }
        if let Some((index, page)) = root
            .children
            .iter()
            .enumerate()
            .find(|(_, c)| c.kind != NodeKind::Page)
        {
            return Err(DocumentError::NonPageTopLevel {
                index,
                kind: page.kind,
            });
        }
        Ok(Self { root })
    }

    /// Parse a document from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let root: Node = serde_json::from_str(json)?;
        Ok(Self::from_root(root)?)
    }

    /// Serialize the document to JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Page containers in reading order
    pub fn pages(&self) -> &[Node] {
        &self.root.children
    }

    pub fn page_count(&self) -> usize {
        self.root.children.len()
    }

    pub fn page(&self, index: usize) -> Option<&Node> {
        self.root.children.get(index)
    }

    /// Path of the body region of a page
    pub fn body_path(&self, page_index: usize) -> Option<NodePath> {
        let body = self.page(page_index)?.body_index()?;
        Some(NodePath::from_slice(&[page_index, body]))
    }

    /// Blocks of a page's body
    pub fn body_blocks(&self, page_index: usize) -> &[Node] {
        self.page(page_index)
            .and_then(Node::body)
            .map(|b| b.children.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a path to a node
    pub fn node_at(&self, path: &NodePath) -> Option<&Node> {
        let mut node = &self.root;
        for &index in path.as_slice() {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// Resolve a path to a mutable node
    pub(crate) fn node_at_mut(&mut self, path: &NodePath) -> Result<&mut Node, StepError> {
        let mut node = &mut self.root;
        for &index in path.as_slice() {
            node = node
                .children
                .get_mut(index)
                .ok_or_else(|| StepError::InvalidPath { path: path.clone() })?;
        }
        Ok(node)
    }

    /// Nodes from the root down to (and including) the node at `path`
    pub fn ancestors(&self, path: &NodePath) -> Vec<&Node> {
        let mut out = Vec::with_capacity(path.depth() + 1);
        let mut node = &self.root;
        out.push(node);
        for &index in path.as_slice() {
            match node.children.get(index) {
                Some(child) => {
                    node = child;
                    out.push(node);
                }
                None => break,
            }
        }
        out
    }

    /// Every node below the root with its path, in document order
    pub fn descendants(&self) -> Vec<(NodePath, &Node)> {
        fn walk<'a>(node: &'a Node, path: &NodePath, out: &mut Vec<(NodePath, &'a Node)>) {
            for (i, child) in node.children.iter().enumerate() {
                let child_path = path.child(i);
                out.push((child_path.clone(), child));
                walk(child, &child_path, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &NodePath::root(), &mut out);
        out
    }

    /// First text-bearing position inside a page body, or the body itself
    pub fn first_position_in(&self, page_index: usize) -> Option<NodePath> {
        let mut path = self.body_path(page_index)?;
        let mut node = self.node_at(&path)?;
        while let Some(child) = node.first_child() {
            path = path.child(0);
            node = child;
        }
        Some(path)
    }

    /// Content leaves in document order, rendered as comparable strings
    ///
    /// Relocating nodes between pages leaves this list unchanged.
    pub fn leaf_signature(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.for_each_descendant(&mut |node| {
            if node.kind.is_leaf() {
                out.push(format!("{}:{}", node.kind.name(), node.text));
            }
        });
        out
    }
}
