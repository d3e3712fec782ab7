//! Page geometry, node measurement and the detached computed surface

mod computed;
pub mod font;
mod geometry;
mod line_break;
mod options;

pub use computed::{ComputedSurface, CELL_PADDING};
pub use font::FontMetrics;
pub use geometry::{
    lenient_total_height, strict_height, total_height, Geometry, GeometryProber, Measurement,
    NodeGeometryProviders, ScriptedProber,
};
pub use line_break::{LineBreaker, LineLayout, TextLayout};
pub use options::{
    Margins, Orientation, PageOptionResolver, PageOptions, PageSize, SharedPageOptions,
};
