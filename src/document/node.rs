//! Node types, attributes and the tree node itself

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// The kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    /// Document root
    Doc,
    /// One physical page
    Page,
    /// Static header region of a page
    PageHeader,
    /// Flowing-content region of a page
    PageBody,
    /// Static footer region of a page
    PageFooter,
    Paragraph,
    /// Heading with level (1-6)
    Heading { level: u8 },
    /// Inline text leaf
    Text,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    Image,
    Iframe,
    CodeBlock,
    TableOfContents,
    Video,
    HorizontalRule,
    BarCode,
}

impl NodeKind {
    /// Node types whose internal structure must never be split across pages
    pub const ATOMIC: [NodeKind; 5] = [
        NodeKind::Image,
        NodeKind::Iframe,
        NodeKind::CodeBlock,
        NodeKind::TableOfContents,
        NodeKind::Video,
    ];

    /// Check if this is one of the atomic (unsplittable) kinds
    pub fn is_atomic(&self) -> bool {
        Self::ATOMIC.contains(self)
    }

    /// Check if this is a table cell or header cell
    pub fn is_table_cell(&self) -> bool {
        matches!(self, NodeKind::TableCell | NodeKind::TableHeader)
    }

    /// Check if this node carries text
    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text)
    }

    /// Check if nodes of this kind are content leaves
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::Text
                | NodeKind::Image
                | NodeKind::Iframe
                | NodeKind::Video
                | NodeKind::HorizontalRule
                | NodeKind::BarCode
        )
    }

    /// Check if this is a page region (header, body or footer)
    pub fn is_page_region(&self) -> bool {
        matches!(
            self,
            NodeKind::PageHeader | NodeKind::PageBody | NodeKind::PageFooter
        )
    }

    /// Get the line height multiplier for text in this kind of block
    pub fn line_height_multiplier(&self) -> f32 {
        match self {
            NodeKind::Heading { level } => match level {
                1 => 1.5,
                2 => 1.4,
                3 => 1.3,
                _ => 1.2,
            },
            _ => 1.0,
        }
    }

    /// Get the spacing after a block of this kind (in line heights)
    pub fn spacing_after(&self) -> f32 {
        match self {
            NodeKind::Paragraph => 1.0,
            NodeKind::Heading { .. } => 0.5,
            NodeKind::CodeBlock => 0.5,
            _ => 0.0,
        }
    }

    /// Stable name used by the JS bridge and the tracked-type list
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Page => "page",
            NodeKind::PageHeader => "pageHeader",
            NodeKind::PageBody => "pageBody",
            NodeKind::PageFooter => "pageFooter",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::Text => "text",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell => "tableCell",
            NodeKind::TableHeader => "tableHeader",
            NodeKind::Image => "image",
            NodeKind::Iframe => "iframe",
            NodeKind::CodeBlock => "codeBlock",
            NodeKind::TableOfContents => "toc",
            NodeKind::Video => "video",
            NodeKind::HorizontalRule => "horizontalRule",
            NodeKind::BarCode => "barcode",
        }
    }
}

/// Node attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attrs {
    /// Stable identifier, assigned by the identity pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Shared by the fragments of a table split across pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Intrinsic width of media nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Intrinsic height of media nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

impl Attrs {
    /// Attributes with only an identifier set
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with no attributes and no children
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Attrs::default(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Create a container node
    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::new(kind)
        }
    }

    /// Set the identifier (builder style)
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.attrs.id = Some(id.into());
        self
    }

    /// Set the intrinsic height (builder style)
    pub fn height(mut self, height: f32) -> Self {
        self.attrs.height = Some(height);
        self
    }

    /// Get the identifier, if any
    pub fn node_id(&self) -> Option<&str> {
        self.attrs.id.as_deref()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }

    /// Index of the body region if this is a page
    pub fn body_index(&self) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.kind == NodeKind::PageBody)
    }

    /// The body region if this is a page
    pub fn body(&self) -> Option<&Node> {
        self.body_index().map(|i| &self.children[i])
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.kind.is_text() {
            out.push_str(&self.text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Visit this node and every descendant in document order
    pub fn for_each_descendant<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.for_each_descendant(f);
        }
    }

    /// Mutable variant of [`Node::for_each_descendant`]
    pub fn for_each_descendant_mut<F: FnMut(&mut Node)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.for_each_descendant_mut(f);
        }
    }

    /// Hash of the rendered content, ignoring identifiers
    ///
    /// Two nodes with the same hash render to the same height on a given
    /// surface, so the hash keys measurement caches.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash_content(&mut hasher);
        hasher.finish()
    }

    fn hash_content<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.text.hash(state);
        self.attrs.width.map(f32::to_bits).hash(state);
        self.attrs.height.map(f32::to_bits).hash(state);
        self.children.len().hash(state);
        for child in &self.children {
            child.hash_content(state);
        }
    }
}
