//! Pagination state and its reducer

use crate::editing::Transaction;

/// Pagination state, versioned with the document
///
/// The state is plain data produced by [`PaginationState::apply`] from the
/// previous state and a transaction, so replaying history is replaying the
/// reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    /// Pagination is enabled (editor ready and not suspended)
    pub run_enabled: bool,
    /// The last measurement asked for a new page
    pub insert_pending: bool,
    /// The last measurement asked to reclaim space
    pub delete_pending: bool,
    /// Text composition (IME) is in progress
    pub composition_active: bool,
    /// Body height recorded by the last measurement
    pub recorded_body_height: f32,
    /// No measurement has run since the editor became ready
    pub is_initial: bool,
    /// Count of document-changing transactions
    pub generation: u64,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationState {
    /// Initial state: disabled until the editor is ready
    pub fn new() -> Self {
        Self {
            run_enabled: false,
            insert_pending: false,
            delete_pending: false,
            composition_active: false,
            recorded_body_height: 0.0,
            is_initial: true,
            generation: 0,
        }
    }

    /// Produce the state after `tr`
    ///
    /// Intents only live for the transaction that carries them.
    pub fn apply(&self, tr: &Transaction) -> Self {
        let meta = &tr.meta;
        let mut next = self.clone();

        next.insert_pending = meta.inserting.unwrap_or(false);
        next.delete_pending = meta.deleting.unwrap_or(false) && !next.insert_pending;

        if let Some(height) = meta.body_height.or(meta.restore_body_height) {
            next.recorded_body_height = height;
        }
        if meta.measurement {
            next.is_initial = false;
        }
        if let Some(active) = meta.composition {
            next.composition_active = active;
        }
        if meta.ready == Some(true) {
            next.run_enabled = true;
        }
        if let Some(prevent) = meta.prevent_pagination {
            next.run_enabled = !prevent;
        }
        if tr.doc_changed() {
            next.generation += 1;
        }
        next
    }

    /// Check if the last measurement carries an intent for the reflow engine
    pub fn has_intent(&self) -> bool {
        self.insert_pending || self.delete_pending
    }
}
