//! Undo/redo of committed transaction groups

use crate::editing::{Meta, Selection, Step, Transaction};
use crate::layout::PageOptions;

/// One undoable edit: a root transaction and everything appended to it
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Forward steps in application order
    pub steps: Vec<Step>,
    /// Inverse steps in application order (undo applies them reversed)
    pub inverses: Vec<Step>,
    /// Selection before the edit
    pub selection_before: Selection,
    /// Selection after the edit
    pub selection_after: Selection,
    /// Recorded body height before the edit
    pub body_height_before: f32,
    /// Recorded body height after the edit
    pub body_height_after: f32,
    /// Page geometry before and after, when the edit changed it
    pub page_options: Option<(PageOptions, PageOptions)>,
    /// Timestamp for grouping (milliseconds)
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.page_options.is_none()
    }
}

/// Undo/redo stacks
///
/// Follow-up transactions marked `join_history` (pagination of an edit
/// that was committed earlier) fold into the last entry, so one undo
/// reverts an edit together with its reflow.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Record a committed group
    pub fn record(&mut self, entry: HistoryEntry, join: bool) {
        if entry.is_empty() {
            return;
        }
        if join {
            // Nothing to join on a fresh history: the change is the
            // document's starting layout
            self.merge_with_last(entry);
            return;
        }

        // Clear redo stack on new edit
        self.redo_stack.clear();
        self.undo_stack.push(entry);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    fn merge_with_last(&mut self, entry: HistoryEntry) {
        if let Some(last) = self.undo_stack.last_mut() {
            last.steps.extend(entry.steps);
            last.inverses.extend(entry.inverses);
            last.selection_after = entry.selection_after;
            last.body_height_after = entry.body_height_after;
            if let Some((before, after)) = entry.page_options {
                let before = last.page_options.map_or(before, |(first, _)| first);
                last.page_options = Some((before, after));
            }
            last.timestamp = entry.timestamp;
        }
    }

    /// Transaction reverting the last entry
    pub fn undo(&mut self) -> Option<Transaction> {
        let entry = self.undo_stack.pop()?;
        let mut tr = replay_transaction(entry.body_height_before, entry.page_options.map(|(before, _)| before));
        tr.extend(entry.inverses.iter().rev().cloned());
        tr.set_selection(entry.selection_before.clone());
        self.redo_stack.push(entry);
        Some(tr)
    }

    /// Transaction re-applying the last undone entry
    pub fn redo(&mut self) -> Option<Transaction> {
        let entry = self.redo_stack.pop()?;
        let mut tr = replay_transaction(entry.body_height_after, entry.page_options.map(|(_, after)| after));
        tr.extend(entry.steps.iter().cloned());
        tr.set_selection(entry.selection_after.clone());
        self.undo_stack.push(entry);
        Some(tr)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn replay_transaction(body_height: f32, page_options: Option<PageOptions>) -> Transaction {
    Transaction::with_meta(Meta {
        add_to_history: Some(false),
        restore_body_height: Some(body_height),
        page_options,
        ..Meta::default()
    })
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
