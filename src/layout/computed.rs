//! Detached measurement surface mirroring the live document
//!
//! The surface lays nodes out off-screen at the current body width and
//! caches the resulting heights by content hash. The reflow engine plans
//! candidate layouts against it without touching the visible editor.
//! Changing the page geometry rebuilds the surface from scratch.

use crate::document::{Document, Node, NodeKind};
use crate::layout::font::FontMetrics;
use crate::layout::geometry::{GeometryProber, Measurement};
use crate::layout::line_break::LineBreaker;
use crate::layout::PageOptions;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};

/// Padding around the content of a table cell, top plus bottom
pub const CELL_PADDING: f32 = 8.0;

/// Detached surface measuring nodes by laying them out
#[derive(Debug)]
pub struct ComputedSurface {
    metrics: FontMetrics,
    line_breaker: LineBreaker,
    body_width: Cell<f32>,
    /// Heights of laid-out nodes keyed by content hash
    cache: RefCell<FxHashMap<u64, f32>>,
}

impl ComputedSurface {
    /// Build a surface for the given page geometry
    pub fn new(options: &PageOptions, metrics: FontMetrics) -> Self {
        Self {
            metrics,
            line_breaker: LineBreaker::new(),
            body_width: Cell::new(options.body_width()),
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Width text is laid out at
    pub fn body_width(&self) -> f32 {
        self.body_width.get()
    }

    /// Number of cached measurements
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    fn layout(&self, node: &Node, width: f32) -> Measurement {
        match node.kind {
            NodeKind::Image | NodeKind::Iframe | NodeKind::Video | NodeKind::BarCode => {
                // Media without an intrinsic height has not loaded yet
                match node.attrs.height {
                    Some(height) => Measurement::height(height),
                    None => Measurement::Detached,
                }
            }
            NodeKind::HorizontalRule => Measurement::height(self.metrics.line_height),
            NodeKind::Text
            | NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::CodeBlock => {
                let text = node.text_content();
                let layout = self
                    .line_breaker
                    .layout_text(&text, node.kind, width, &self.metrics);
                Measurement::height(layout.total_height)
            }
            NodeKind::TableRow => {
                let cells = node.child_count().max(1) as f32;
                let cell_width = width / cells;
                let mut tallest: f32 = 0.0;
                for cell in &node.children {
                    match self.measure_at(cell, cell_width) {
                        Measurement::Rendered(g) => tallest = tallest.max(g.height),
                        Measurement::Detached => return Measurement::Detached,
                    }
                }
                Measurement::height(tallest)
            }
            NodeKind::TableCell | NodeKind::TableHeader => {
                match self.sum_children(node, width - CELL_PADDING) {
                    Measurement::Rendered(g) => Measurement::height(g.height + CELL_PADDING),
                    detached => detached,
                }
            }
            NodeKind::TableOfContents if node.children.is_empty() => {
                Measurement::height(self.metrics.line_height)
            }
            _ => self.sum_children(node, width),
        }
    }

    fn sum_children(&self, node: &Node, width: f32) -> Measurement {
        let mut total = 0.0;
        for child in &node.children {
            match self.measure_at(child, width) {
                Measurement::Rendered(g) => total += g.height,
                Measurement::Detached => return Measurement::Detached,
            }
        }
        Measurement::height(total)
    }

    fn measure_at(&self, node: &Node, width: f32) -> Measurement {
        let key = cache_key(node, width);
        if let Some(height) = self.cache.borrow().get(&key) {
            return Measurement::height(*height);
        }
        let measured = self.layout(node, width);
        if let Measurement::Rendered(g) = measured {
            self.cache.borrow_mut().insert(key, g.height);
        }
        measured
    }
}

impl GeometryProber for ComputedSurface {
    fn measure(&self, node: &Node) -> Measurement {
        self.measure_at(node, self.body_width.get())
    }

    fn rebuild(&self, options: &PageOptions) {
        self.body_width.set(options.body_width());
        self.cache.borrow_mut().clear();
        tracing::debug!(body_width = options.body_width(), "rebuilt computed surface");
    }

    fn discard_stale(&self, doc: &Document) {
        let width = self.body_width.get();
        let mut live = FxHashSet::default();
        for (_, node) in doc.descendants() {
            live.insert(cache_key(node, width));
        }
        let mut cache = self.cache.borrow_mut();
        let before = cache.len();
        // Nested nodes cached at narrower widths are dropped too; they are
        // cheap to lay out again.
        cache.retain(|key, _| live.contains(key));
        if cache.len() != before {
            tracing::trace!(dropped = before - cache.len(), "discarded stale measurements");
        }
    }
}

fn cache_key(node: &Node, width: f32) -> u64 {
    node.content_hash() ^ u64::from(width.to_bits()).rotate_left(32)
}
