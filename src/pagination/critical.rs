//! Critical-point classification: page bodies that must not be split

use crate::document::{Node, NodeKind};

/// Check if a page body is held entirely by one unsplittable block
///
/// True when the body has exactly one child and that child is either a
/// single-row table or one of the atomic kinds. Such a page is allowed to
/// overflow instead of triggering a new page.
pub fn is_critical_point(body: &Node) -> bool {
    if body.child_count() != 1 {
        return false;
    }
    body.first_child().map(is_unsplittable_block).unwrap_or(false)
}

/// Check if a page is a critical point (by its body region)
pub fn is_critical_page(page: &Node) -> bool {
    page.body().map(is_critical_point).unwrap_or(false)
}

/// Check if a block can never be divided between pages
pub fn is_unsplittable_block(block: &Node) -> bool {
    (block.kind == NodeKind::Table && block.child_count() == 1) || block.kind.is_atomic()
}

/// Check if a block may be split by rows
pub fn is_row_splittable(block: &Node) -> bool {
    block.kind == NodeKind::Table && block.child_count() > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::schema;

    fn body(blocks: Vec<Node>) -> Node {
        Node::with_children(NodeKind::PageBody, blocks)
    }

    #[test]
    fn test_single_atomic_child() {
        assert!(is_critical_point(&body(vec![schema::image(10.0, 900.0)])));
        assert!(is_critical_point(&body(vec![schema::code_block("fn main() {}")])));
        assert!(is_critical_point(&body(vec![Node::new(NodeKind::Video)])));
    }

    #[test]
    fn test_single_row_table_only() {
        let one_row = schema::table(vec![schema::row(&["a"])]);
        let two_rows = schema::table(vec![schema::row(&["a"]), schema::row(&["b"])]);
        assert!(is_critical_point(&body(vec![one_row])));
        assert!(!is_critical_point(&body(vec![two_rows.clone()])));
        assert!(is_row_splittable(&two_rows));
    }

    #[test]
    fn test_not_critical() {
        assert!(!is_critical_point(&body(vec![])));
        assert!(!is_critical_point(&body(vec![schema::paragraph("a")])));
        assert!(!is_critical_point(&body(vec![
            schema::image(1.0, 1.0),
            schema::paragraph("a")
        ])));
    }

    #[test]
    fn test_critical_page() {
        assert!(is_critical_page(&schema::page_with(vec![schema::image(1.0, 1.0)])));
        assert!(!is_critical_page(&schema::page()));
    }
}
