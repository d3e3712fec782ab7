//! Editing model: selection, steps and transactions

mod selection;
mod step;
mod transaction;

pub use selection::{Position, Selection};
pub use step::Step;
pub use transaction::{Meta, PluginKey, Transaction};
