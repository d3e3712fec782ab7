//! Canonical node constructors
//!
//! Every structural node the pagination subsystem creates goes through
//! these functions so pages, bodies and tables always have the shape the
//! detector and the reflow engine expect.

use super::node::{Node, NodeKind};

/// An empty page: header, empty body, footer
pub fn page() -> Node {
    page_with(Vec::new())
}

/// A page whose body holds the given blocks
pub fn page_with(blocks: Vec<Node>) -> Node {
    Node::with_children(
        NodeKind::Page,
        vec![
            Node::new(NodeKind::PageHeader),
            Node::with_children(NodeKind::PageBody, blocks),
            Node::new(NodeKind::PageFooter),
        ],
    )
}

/// A text leaf
pub fn text(content: impl Into<String>) -> Node {
    Node {
        text: content.into(),
        ..Node::new(NodeKind::Text)
    }
}

/// A paragraph holding one text leaf (or none for empty text)
pub fn paragraph(content: &str) -> Node {
    let children = if content.is_empty() {
        Vec::new()
    } else {
        vec![text(content)]
    };
    Node::with_children(NodeKind::Paragraph, children)
}

/// A heading clamped to levels 1-6
pub fn heading(level: u8, content: &str) -> Node {
    Node::with_children(
        NodeKind::Heading {
            level: level.clamp(1, 6),
        },
        vec![text(content)],
    )
}

/// A table cell holding one paragraph
pub fn cell(content: &str) -> Node {
    Node::with_children(NodeKind::TableCell, vec![paragraph(content)])
}

/// A table row of plain cells
pub fn row(cells: &[&str]) -> Node {
    Node::with_children(NodeKind::TableRow, cells.iter().map(|c| cell(c)).collect())
}

/// A table from rows
pub fn table(rows: Vec<Node>) -> Node {
    Node::with_children(NodeKind::Table, rows)
}

/// An empty table carrying the group of `source`, used to continue a
/// split table on the next page
pub fn table_fragment(source: &Node) -> Node {
    let mut fragment = Node::new(NodeKind::Table);
    fragment.attrs.group_id = source.attrs.group_id.clone();
    fragment.attrs.class = source.attrs.class.clone();
    fragment
}

/// An image of known intrinsic size
pub fn image(width: f32, height: f32) -> Node {
    let mut node = Node::new(NodeKind::Image);
    node.attrs.width = Some(width);
    node.attrs.height = Some(height);
    node
}

/// A code block holding its source as one text leaf
pub fn code_block(source: &str) -> Node {
    Node::with_children(NodeKind::CodeBlock, vec![text(source)])
}
