//! Geometry probing: how tall a node renders

use crate::document::{Document, Node, NodeKind};
use crate::error::PaginationError;
use crate::layout::PageOptions;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Layout metrics of a rendered node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub height: f32,
}

/// Result of probing a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// The node is rendered and has this geometry
    Rendered(Geometry),
    /// The node is not attached to any render surface yet
    Detached,
}

impl Measurement {
    /// Rendered measurement of the given height
    pub fn height(height: f32) -> Self {
        Measurement::Rendered(Geometry { height })
    }

    /// Occupied height; zero for detached nodes
    pub fn height_or_zero(&self) -> f32 {
        match self {
            Measurement::Rendered(g) => g.height,
            Measurement::Detached => 0.0,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Measurement::Detached)
    }
}

/// Reads the rendered height of nodes
///
/// Probing never mutates the document. Implementations that cache must do
/// so behind interior mutability.
pub trait GeometryProber {
    /// Measure one node
    fn measure(&self, node: &Node) -> Measurement;

    /// Page geometry changed; rebuild any detached surface
    fn rebuild(&self, _options: &PageOptions) {}

    /// Drop anything measured for nodes no longer in `doc`
    fn discard_stale(&self, _doc: &Document) {}
}

/// Sum of the heights of `nodes`, failing on the first detached node
pub fn total_height(prober: &dyn GeometryProber, nodes: &[Node]) -> Result<f32, PaginationError> {
    nodes.iter().try_fold(0.0, |acc, node| Ok(acc + strict_height(prober, node)?))
}

/// Height of one node, failing if it is detached
pub fn strict_height(prober: &dyn GeometryProber, node: &Node) -> Result<f32, PaginationError> {
    match prober.measure(node) {
        Measurement::Rendered(g) => Ok(g.height),
        Measurement::Detached => Err(PaginationError::MeasurementUnavailable {
            kind: node.kind,
            id: node.attrs.id.clone(),
        }),
    }
}

/// Sum of the heights of `nodes`, counting detached nodes as zero
pub fn lenient_total_height(prober: &dyn GeometryProber, nodes: &[Node]) -> f32 {
    nodes.iter().map(|n| prober.measure(n).height_or_zero()).sum()
}

/// The probers the page plugin measures with
///
/// `view` reads the live rendering and feeds the overflow detector;
/// `surface` is the detached mirror the reflow engine plans against.
#[derive(Clone)]
pub struct NodeGeometryProviders {
    pub view: Rc<dyn GeometryProber>,
    pub surface: Rc<dyn GeometryProber>,
}

impl NodeGeometryProviders {
    pub fn new(view: Rc<dyn GeometryProber>, surface: Rc<dyn GeometryProber>) -> Self {
        Self { view, surface }
    }

    /// One prober for both roles, as in headless use
    pub fn headless(prober: Rc<dyn GeometryProber>) -> Self {
        Self {
            view: prober.clone(),
            surface: prober,
        }
    }
}

/// Deterministic prober returning scripted heights
///
/// Heights are looked up by node identifier. Containers without a scripted
/// height sum their children (table rows, cells). Anything else falls back
/// to the default height, or is reported detached when there is none.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProber {
    heights: FxHashMap<String, f32>,
    default_height: Option<f32>,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the height of the node with identifier `id`
    pub fn with_height(mut self, id: impl Into<String>, height: f32) -> Self {
        self.heights.insert(id.into(), height);
        self
    }

    /// Height for nodes with nothing scripted
    pub fn with_default(mut self, height: f32) -> Self {
        self.default_height = Some(height);
        self
    }

    pub fn set_height(&mut self, id: impl Into<String>, height: f32) {
        self.heights.insert(id.into(), height);
    }
}

impl GeometryProber for ScriptedProber {
    fn measure(&self, node: &Node) -> Measurement {
        if let Some(height) = node.node_id().and_then(|id| self.heights.get(id)) {
            return Measurement::height(*height);
        }

        match node.kind {
            NodeKind::Table | NodeKind::PageBody => {
                let mut total = 0.0;
                for child in &node.children {
                    match self.measure(child) {
                        Measurement::Rendered(g) => total += g.height,
                        Measurement::Detached => return Measurement::Detached,
                    }
                }
                Measurement::height(total)
            }
            NodeKind::TableRow => {
                let mut tallest: f32 = 0.0;
                for cell in &node.children {
                    match self.measure(cell) {
                        Measurement::Rendered(g) => tallest = tallest.max(g.height),
                        Measurement::Detached => return Measurement::Detached,
                    }
                }
                match self.default_height {
                    Some(default) if node.children.is_empty() => Measurement::height(default),
                    _ => Measurement::height(tallest),
                }
            }
            _ => match self.default_height {
                Some(height) => Measurement::height(height),
                None => Measurement::Detached,
            },
        }
    }
}
