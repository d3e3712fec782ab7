//! Transactions and their metadata channel

use crate::document::Node;
use crate::editing::{Selection, Step};
use crate::layout::PageOptions;

/// Identifies the plugin that produced an appended transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKey {
    Pagination,
    Identity,
}

/// Metadata attached to a transaction
///
/// Every field is optional: `None` means "not set on this transaction",
/// which reducers treat differently from an explicit `false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    /// The measured page needs a new page
    pub inserting: Option<bool>,
    /// The measured page shrank and may be reclaimed
    pub deleting: Option<bool>,
    /// Measured body height of the selection's page
    pub body_height: Option<f32>,
    /// Suspend (`true`) or resume (`false`) pagination
    pub prevent_pagination: Option<bool>,
    /// Text composition started (`true`) or ended (`false`)
    pub composition: Option<bool>,
    /// Force an identifier sweep
    pub init_split: Option<bool>,
    /// The editor finished initializing
    pub ready: Option<bool>,
    /// Produced by the overflow detector's own measurement
    pub measurement: bool,
    /// Record this transaction in the undo history (default: yes)
    pub add_to_history: Option<bool>,
    /// Fold this transaction into the previous history entry
    pub join_history: bool,
    /// Plugin that appended this transaction
    pub appended_by: Option<PluginKey>,
    /// Body height to restore when replaying history
    pub restore_body_height: Option<f32>,
    /// Page geometry to switch to before the steps apply
    pub page_options: Option<PageOptions>,
}

/// A group of steps applied atomically, with selection and metadata
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    steps: Vec<Step>,
    selection: Option<Selection>,
    pub meta: Meta,
}

impl Transaction {
    /// Create an empty transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a metadata-only transaction
    pub fn with_meta(meta: Meta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    /// Append a step
    pub fn step(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Append several steps
    pub fn extend(&mut self, steps: impl IntoIterator<Item = Step>) -> &mut Self {
        self.steps.extend(steps);
        self
    }

    /// Set an explicit selection to apply after the steps
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Check if this transaction changes the document
    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Check if this transaction changes structure, not only text
    pub fn structure_changed(&self) -> bool {
        self.steps.iter().any(Step::is_structural)
    }

    /// Check if history should record this transaction
    pub fn add_to_history(&self) -> bool {
        self.meta.add_to_history.unwrap_or(true)
    }

    /// Nodes this transaction inserts, for paste-like inspection
    pub fn inserted_nodes(&self) -> impl Iterator<Item = &Node> {
        self.steps.iter().filter_map(|step| match step {
            Step::InsertNode { node, .. } => Some(node),
            _ => None,
        })
    }
}
