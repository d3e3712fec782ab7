//! Editor plugins and the state they observe
//!
//! The editor calls plugin hooks at fixed points of its dispatch loop:
//! `append_transaction` after a transaction is applied, `view_update` once
//! the whole group is committed, `handle_event` for raw input and `tick`
//! when the clock advances.

mod id;
mod page;

pub use id::{fresh_id, id_plugin, IdPlugin, DEFAULT_TRACKED};
pub use page::{page_plugin, PagePlugin, PaginationConfig};

use crate::document::{Document, Node};
use crate::editing::{PluginKey, Selection, Step, Transaction};
use crate::error::StepError;
use crate::pagination::PaginationState;
use serde::{Deserialize, Serialize};

/// Snapshot of everything a plugin may read
#[derive(Debug, Clone)]
pub struct EditorState {
    pub doc: Document,
    pub selection: Selection,
    pub pagination: PaginationState,
}

impl EditorState {
    /// State for `doc` with the cursor at its start
    pub fn new(doc: Document) -> Self {
        let selection = Selection::at_start(&doc);
        Self {
            doc,
            selection,
            pagination: PaginationState::new(),
        }
    }

    /// Apply a transaction, returning the new state and the inverse steps
    /// in application order
    pub fn apply(&self, tr: &Transaction) -> Result<(EditorState, Vec<Step>), StepError> {
        let mut doc = self.doc.clone();
        let mut selection = self.selection.clone();
        let mut inverses = Vec::with_capacity(tr.steps().len());

        for step in tr.steps() {
            inverses.push(step.apply(&mut doc)?);
            selection = Selection::new(step.map(&selection.anchor), step.map(&selection.head));
        }
        if let Some(explicit) = tr.selection() {
            selection = explicit.clone();
        }

        let state = EditorState {
            doc,
            selection,
            pagination: self.pagination.apply(tr),
        };
        Ok((state, inverses))
    }
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    /// Check if a shortcut modifier is held (shift does not count)
    pub fn is_shortcut(&self) -> bool {
        self.ctrl || self.meta || self.alt
    }
}

/// Raw input events forwarded from the view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    CompositionStart,
    CompositionEnd,
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

/// Hooks into the editor's dispatch loop
pub trait Plugin {
    fn key(&self) -> PluginKey;

    /// Follow-up transaction for `trs`, which this plugin has not seen yet
    fn append_transaction(
        &mut self,
        _trs: &[Transaction],
        _old: &EditorState,
        _new: &EditorState,
    ) -> Option<Transaction> {
        None
    }

    /// Called once per committed group; `trs` holds the root transaction
    /// and everything appended to it
    fn view_update(
        &mut self,
        _trs: &[Transaction],
        _prev: &EditorState,
        _state: &EditorState,
    ) -> Option<Transaction> {
        None
    }

    /// React to a raw input event
    fn handle_event(
        &mut self,
        _event: &InputEvent,
        _state: &EditorState,
        _now_ms: u64,
    ) -> Option<Transaction> {
        None
    }

    /// Fire timers due at `now_ms`
    fn tick(&mut self, _state: &EditorState, _now_ms: u64) -> Option<Transaction> {
        None
    }

    /// When this plugin next needs a tick
    fn due_at(&self) -> Option<u64> {
        None
    }

    /// Rewrite pasted nodes before they are inserted
    fn transform_pasted(&self, nodes: Vec<Node>) -> Vec<Node> {
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{schema, NodePath};
    use crate::editing::{Meta, Position};

    #[test]
    fn test_apply_maps_selection() {
        let doc = Document::from_blocks(vec![schema::paragraph("a"), schema::paragraph("b")]);
        let mut state = EditorState::new(doc);
        state.selection = Selection::collapsed(Position::new(NodePath::from_slice(&[0, 1, 1, 0]), 1));

        let mut tr = Transaction::new();
        tr.step(Step::insert(NodePath::root(), 1, schema::page()));
        tr.step(Step::move_node(
            NodePath::from_slice(&[0, 1]),
            1,
            NodePath::from_slice(&[1, 1]),
            0,
        ));
        let (next, inverses) = state.apply(&tr).unwrap();

        assert_eq!(inverses.len(), 2);
        assert_eq!(next.doc.page_count(), 2);
        assert_eq!(next.selection.anchor.path, NodePath::from_slice(&[1, 1, 0, 0]));
        assert_eq!(next.selection.anchor.offset, 1);
        assert_eq!(next.pagination.generation, 1);
    }

    #[test]
    fn test_apply_failure_leaves_state() {
        let state = EditorState::new(Document::new());
        let mut tr = Transaction::with_meta(Meta::default());
        tr.step(Step::remove(NodePath::from_slice(&[0, 1]), 3));
        assert!(state.apply(&tr).is_err());
        assert_eq!(state.doc, Document::new());
    }

    #[test]
    fn test_input_event_json() {
        let event: InputEvent = serde_json::from_str(r#"{"type":"keyDown","key":"a"}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::KeyDown {
                key: "a".to_string(),
                modifiers: Modifiers::default(),
            }
        );
        let event: InputEvent = serde_json::from_str(r#"{"type":"compositionEnd"}"#).unwrap();
        assert_eq!(event, InputEvent::CompositionEnd);
    }

    #[test]
    fn test_shortcut_modifiers() {
        assert!(!Modifiers::default().is_shortcut());
        assert!(!Modifiers { shift: true, ..Modifiers::default() }.is_shortcut());
        assert!(Modifiers { ctrl: true, ..Modifiers::default() }.is_shortcut());
    }
}
