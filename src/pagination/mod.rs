//! Pagination runtime: state, measurement and reflow

pub mod critical;
mod detector;
mod machine;
mod reflow;
mod state;
mod timer;

pub use critical::{is_critical_page, is_critical_point, is_row_splittable, is_unsplittable_block};
pub use detector::{Measured, OverflowDetector};
pub use machine::{Phase, PhaseEvent};
pub use reflow::{Intents, ReflowEngine, ReflowPlan};
pub use state::PaginationState;
pub use timer::{Debounce, TimerToken};
