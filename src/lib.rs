//! page-flow: pagination engine for a page-based rich-text editor
//!
//! This crate keeps a document of page containers within their page body
//! height while it is edited:
//! - Overflow/underflow detection on the page under the selection
//! - Reflow that moves whole blocks (and table rows) across page boundaries
//! - Atomic content (images, code blocks, single-row tables) never split
//! - Suspension during text composition and fast typing
//! - Unique node identifiers for tracked node kinds
//! - Undo/redo where an edit and its reflow are one step

pub mod document;
pub mod editing;
pub mod error;
pub mod layout;
pub mod pagination;
pub mod plugin;
pub mod undo;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmEditor;

// Re-export primary types
pub use document::{schema, Attrs, Document, Node, NodeKind, NodePath};
pub use editing::{Meta, PluginKey, Position, Selection, Step, Transaction};
pub use error::{DocumentError, EditorError, PaginationError, Result, StepError};
pub use layout::{
    ComputedSurface, FontMetrics, GeometryProber, Measurement, NodeGeometryProviders,
    PageOptionResolver, PageOptions, PageSize, ScriptedProber, SharedPageOptions,
};
pub use pagination::{is_critical_point, PaginationState, Phase, ReflowEngine};
pub use plugin::{
    id_plugin, page_plugin, EditorState, InputEvent, Modifiers, PaginationConfig, Plugin,
    DEFAULT_TRACKED,
};
pub use undo::{History, HistoryEntry};

use std::collections::VecDeque;

/// The editor: document state, plugins and history
pub struct Editor {
    state: EditorState,
    plugins: Vec<Box<dyn Plugin>>,
    history: History,
    options: SharedPageOptions,
}

impl Editor {
    /// Create an editor with the page and identity plugins installed
    pub fn new(doc: Document, options: SharedPageOptions, providers: NodeGeometryProviders) -> Result<Self> {
        Self::with_config(doc, options, providers, PaginationConfig::default(), DEFAULT_TRACKED)
    }

    /// Create an editor with explicit pagination delays and tracked kinds
    pub fn with_config(
        doc: Document,
        options: SharedPageOptions,
        providers: NodeGeometryProviders,
        config: PaginationConfig,
        tracked: &[NodeKind],
    ) -> Result<Self> {
        let plugins: Vec<Box<dyn Plugin>> = vec![
            Box::new(page_plugin(options.clone(), providers, config)),
            Box::new(id_plugin(tracked)),
        ];
        Self::with_plugins(doc, options, plugins)
    }

    /// Create an editor with the given plugins, then signal ready
    pub fn with_plugins(doc: Document, options: SharedPageOptions, plugins: Vec<Box<dyn Plugin>>) -> Result<Self> {
        let mut editor = Self {
            state: EditorState::new(doc),
            plugins,
            history: History::default(),
            options,
        };
        editor.dispatch(Transaction::with_meta(Meta {
            ready: Some(true),
            init_split: Some(true),
            add_to_history: Some(false),
            ..Meta::default()
        }))?;
        Ok(editor)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Document {
        &self.state.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.state.pagination
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Page containers in order
    pub fn pages(&self) -> &[Node] {
        self.state.doc.pages()
    }

    pub fn page_count(&self) -> usize {
        self.state.doc.page_count()
    }

    /// Current page options
    pub fn page_options(&self) -> PageOptions {
        self.options.borrow().current_page_options()
    }

    /// Apply a transaction and everything it triggers
    ///
    /// Follow-ups returned from view updates are queued and committed in
    /// order after the current group, never recursively. Only a failure
    /// of `tr` itself is returned; a failing follow-up is logged and
    /// dropped.
    pub fn dispatch(&mut self, tr: Transaction) -> Result<()> {
        let (trs, prev) = self.commit(tr)?;
        let mut queue = self.view_update(&trs, &prev);

        while let Some(follow) = queue.pop_front() {
            match self.commit(follow) {
                Ok((trs, prev)) => queue.extend(self.view_update(&trs, &prev)),
                Err(err) => tracing::warn!(error = %err, "follow-up transaction dropped"),
            }
        }
        Ok(())
    }

    /// Apply a root transaction, run the append loop and record history
    fn commit(&mut self, root: Transaction) -> Result<(Vec<Transaction>, EditorState)> {
        let prev = self.state.clone();
        let (mut state, mut inverses) = prev.apply(&root)?;
        let geometry = root.meta.page_options.and_then(|options| {
            let mut resolver = self.options.borrow_mut();
            let before = resolver.current_page_options();
            resolver.set(options);
            (before != options).then_some((before, options))
        });
        let mut trs = vec![root];

        let mut seen = vec![0usize; self.plugins.len()];
        let mut before = vec![prev.clone(); self.plugins.len()];
        loop {
            let mut appended = false;
            for (i, plugin) in self.plugins.iter_mut().enumerate() {
                if seen[i] >= trs.len() {
                    continue;
                }
                let Some(mut tr) = plugin.append_transaction(&trs[seen[i]..], &before[i], &state) else {
                    seen[i] = trs.len();
                    before[i] = state.clone();
                    continue;
                };
                tr.meta.appended_by = Some(plugin.key());
                match state.apply(&tr) {
                    Ok((next, inv)) => {
                        state = next;
                        inverses.extend(inv);
                        trs.push(tr);
                        appended = true;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, plugin = ?plugin.key(), "appended transaction dropped");
                    }
                }
                seen[i] = trs.len();
                before[i] = state.clone();
            }
            if !appended {
                break;
            }
        }

        let root = &trs[0];
        if root.add_to_history() {
            let entry = HistoryEntry {
                steps: trs.iter().flat_map(|tr| tr.steps().iter().cloned()).collect(),
                inverses,
                selection_before: prev.selection.clone(),
                selection_after: state.selection.clone(),
                body_height_before: prev.pagination.recorded_body_height,
                body_height_after: state.pagination.recorded_body_height,
                page_options: geometry,
                timestamp: undo::current_timestamp(),
            };
            self.history.record(entry, root.meta.join_history);
        }

        tracing::trace!(
            transactions = trs.len(),
            pages = state.doc.page_count(),
            "committed"
        );
        self.state = state;
        Ok((trs, prev))
    }

    fn view_update(&mut self, trs: &[Transaction], prev: &EditorState) -> VecDeque<Transaction> {
        self.plugins
            .iter_mut()
            .filter_map(|plugin| plugin.view_update(trs, prev, &self.state))
            .collect()
    }

    /// Insert text at the selection head
    ///
    /// The head must be in a text node, or in an empty paragraph, heading
    /// or code block, which then receives its first text node.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        let head = self.state.selection.head.clone();
        let node = self
            .state
            .doc
            .node_at(&head.path)
            .ok_or_else(|| StepError::InvalidPath { path: head.path.clone() })?;

        let mut tr = Transaction::new();
        if node.kind.is_text() {
            tr.step(Step::InsertText {
                path: head.path,
                offset: head.offset,
                text: text.to_string(),
            });
        } else if accepts_text(node) {
            let path = head.path.child(0);
            tr.step(Step::insert(head.path, 0, schema::text(text)));
            tr.set_selection(Selection::collapsed(Position::new(path, text.len())));
        } else {
            return Err(StepError::NotText {
                path: head.path,
                kind: node.kind,
            }
            .into());
        }
        self.dispatch(tr)
    }

    /// Delete a byte range of the text node at `path`
    pub fn delete_text(&mut self, path: NodePath, start: usize, end: usize) -> Result<()> {
        let mut tr = Transaction::new();
        tr.step(Step::DeleteText { path, start, end });
        self.dispatch(tr)
    }

    /// Insert a block into a page body and put the cursor in it
    pub fn insert_block(&mut self, page: usize, index: usize, node: Node) -> Result<()> {
        let body = self.body_path(page)?;
        let mut cursor = body.child(index);
        let mut inner = &node;
        while let Some(child) = inner.first_child() {
            cursor = cursor.child(0);
            inner = child;
        }

        let mut tr = Transaction::new();
        tr.step(Step::insert(body, index, node));
        tr.set_selection(Selection::collapsed(Position::at(cursor)));
        self.dispatch(tr)
    }

    /// Remove a block from a page body
    pub fn remove_block(&mut self, page: usize, index: usize) -> Result<()> {
        let body = self.body_path(page)?;
        let mut tr = Transaction::new();
        tr.step(Step::remove(body.clone(), index));
        tr.set_selection(Selection::collapsed(Position::new(body, index)));
        self.dispatch(tr)
    }

    /// Move the selection without changing the document
    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        let mut tr = Transaction::with_meta(Meta {
            add_to_history: Some(false),
            ..Meta::default()
        });
        tr.set_selection(selection);
        self.dispatch(tr)
    }

    /// Paste blocks after the block holding the selection
    pub fn paste(&mut self, nodes: Vec<Node>) -> Result<()> {
        let nodes = self
            .plugins
            .iter()
            .fold(nodes, |nodes, plugin| plugin.transform_pasted(nodes));
        if nodes.is_empty() {
            return Ok(());
        }

        let page = self.state.selection.page_index().unwrap_or(0);
        let body = self.body_path(page)?;
        let head = &self.state.selection.head.path;
        let index = if head.is_inside(&body) {
            head.as_slice()[body.depth()] + 1
        } else {
            self.state.doc.body_blocks(page).len()
        };

        let count = nodes.len();
        let mut tr = Transaction::new();
        for (offset, node) in nodes.into_iter().enumerate() {
            tr.step(Step::insert(body.clone(), index + offset, node));
        }
        tr.set_selection(Selection::collapsed(Position::at(body.child(index + count - 1))));
        self.dispatch(tr)
    }

    /// Undo the last edit; returns false when there is nothing to undo
    pub fn undo(&mut self) -> Result<bool> {
        let Some(tr) = self.history.undo() else {
            return Ok(false);
        };
        self.dispatch(tr)?;
        Ok(true)
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> Result<bool> {
        let Some(tr) = self.history.redo() else {
            return Ok(false);
        };
        self.dispatch(tr)?;
        Ok(true)
    }

    /// Forward a raw input event to the plugins
    pub fn handle_event(&mut self, event: &InputEvent, now_ms: u64) -> Result<()> {
        let trs: Vec<_> = self
            .plugins
            .iter_mut()
            .filter_map(|plugin| plugin.handle_event(event, &self.state, now_ms))
            .collect();
        for tr in trs {
            self.dispatch(tr)?;
        }
        Ok(())
    }

    /// Advance plugin timers to `now_ms`
    pub fn tick(&mut self, now_ms: u64) -> Result<()> {
        let trs: Vec<_> = self
            .plugins
            .iter_mut()
            .filter_map(|plugin| plugin.tick(&self.state, now_ms))
            .collect();
        for tr in trs {
            self.dispatch(tr)?;
        }
        Ok(())
    }

    /// Earliest time a plugin timer is due
    pub fn next_tick_at(&self) -> Option<u64> {
        self.plugins.iter().filter_map(|plugin| plugin.due_at()).min()
    }

    /// Change the page geometry and repaginate the whole document
    ///
    /// The change and its reflow are one history entry, so undo restores
    /// the previous geometry along with the previous layout.
    pub fn set_page_options(&mut self, options: PageOptions) -> Result<()> {
        if options == self.page_options() {
            return Ok(());
        }
        tracing::debug!(body_height = options.body_height(), "page options changed");

        // A delete intent runs both the merge and the split pass
        self.dispatch(Transaction::with_meta(Meta {
            page_options: Some(options),
            deleting: Some(true),
            measurement: true,
            ..Meta::default()
        }))
    }

    fn body_path(&self, page: usize) -> Result<NodePath> {
        self.state.doc.body_path(page).ok_or_else(|| {
            StepError::InvalidPath {
                path: NodePath::from_slice(&[page]),
            }
            .into()
        })
    }
}

fn accepts_text(node: &Node) -> bool {
    node.children.is_empty()
        && matches!(
            node.kind,
            NodeKind::Paragraph | NodeKind::Heading { .. } | NodeKind::CodeBlock
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rustc_hash::FxHashSet;
    use std::rc::Rc;

    const BUDGET: f32 = 800.0;

    fn editor(doc: Document, prober: ScriptedProber) -> Editor {
        Editor::new(
            doc,
            PageOptionResolver::shared(PageOptions::with_body_height(BUDGET)),
            NodeGeometryProviders::headless(Rc::new(prober)),
        )
        .unwrap()
    }

    fn para(id: &str) -> Node {
        schema::paragraph(id).id(id)
    }

    fn page_ids(editor: &Editor) -> Vec<Vec<String>> {
        (0..editor.page_count())
            .map(|p| {
                editor
                    .doc()
                    .body_blocks(p)
                    .iter()
                    .filter_map(|b| b.attrs.id.clone())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_ready_assigns_ids() {
        let editor = editor(
            Document::from_blocks(vec![schema::paragraph("a")]),
            ScriptedProber::new().with_default(10.0),
        );
        assert!(editor.pagination().run_enabled);
        assert!(!editor.pagination().is_initial);
        assert!(editor.pages()[0].attrs.id.is_some());
        assert!(editor.doc().body_blocks(0)[0].attrs.id.is_some());
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn test_scenario_a_overflow_creates_page() {
        let prober = ScriptedProber::new().with_height("a", 750.0).with_height("b", 100.0);
        let mut editor = editor(Document::from_blocks(vec![para("a")]), prober);

        editor.insert_block(0, 1, para("b")).unwrap();
        assert_eq!(page_ids(&editor), vec![vec!["a"], vec!["b"]]);
        // The cursor followed the moved block
        assert_eq!(editor.selection().page_index(), Some(1));
        assert!(editor.pages()[1].attrs.id.is_some());
    }

    #[test]
    fn test_undo_reverts_edit_and_reflow() {
        let prober = ScriptedProber::new().with_height("a", 750.0).with_height("b", 100.0);
        let mut editor = editor(Document::from_blocks(vec![para("a")]), prober);
        editor.insert_block(0, 1, para("b")).unwrap();
        assert_eq!(editor.history().undo_depth(), 1);

        assert!(editor.undo().unwrap());
        assert_eq!(page_ids(&editor), vec![vec!["a"]]);
        assert_eq!(editor.pagination().recorded_body_height, 750.0);

        assert!(editor.redo().unwrap());
        assert_eq!(page_ids(&editor), vec![vec!["a"], vec!["b"]]);
        assert!(!editor.redo().unwrap());
    }

    #[test]
    fn test_scenario_b_oversized_table_left_alone() {
        let table = schema::table(vec![schema::row(&["x"]).id("r")]).id("t");
        let prober = ScriptedProber::new().with_height("t", 900.0);
        let mut editor = editor(Document::from_blocks(vec![table]), prober);
        assert_eq!(editor.page_count(), 1);

        editor
            .set_selection(Selection::collapsed(Position::at(NodePath::from_slice(&[0, 1]))))
            .unwrap();
        editor.remove_block(0, 0).unwrap();
        editor
            .insert_block(0, 0, schema::table(vec![schema::row(&["y"])]).id("t"))
            .unwrap();
        assert_eq!(editor.page_count(), 1);
        assert_eq!(editor.doc().body_blocks(0)[0].child_count(), 1);
    }

    #[test]
    fn test_scenario_c_underflow_removes_page() {
        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a"), para("b")]),
            schema::page_with(vec![para("c")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new()
            .with_height("a", 100.0)
            .with_height("b", 300.0)
            .with_height("c", 500.0);
        let mut editor = editor(doc, prober);
        assert_eq!(editor.page_count(), 2);
        assert_eq!(editor.pagination().recorded_body_height, 400.0);

        editor.remove_block(0, 1).unwrap();
        assert_eq!(page_ids(&editor), vec![vec!["a", "c"]]);
    }

    #[test]
    fn test_scenario_d_composition_defers_reflow() {
        let prober = ScriptedProber::new().with_height("a", 750.0).with_height("b", 100.0);
        let mut editor = editor(Document::from_blocks(vec![para("a")]), prober);

        editor.handle_event(&InputEvent::CompositionStart, 0).unwrap();
        editor.insert_block(0, 1, para("b")).unwrap();
        assert_eq!(editor.page_count(), 1);

        editor.handle_event(&InputEvent::CompositionEnd, 1_000).unwrap();
        assert_eq!(editor.next_tick_at(), Some(1_300));
        editor.tick(1_299).unwrap();
        assert_eq!(editor.page_count(), 1);

        editor.tick(1_300).unwrap();
        assert_eq!(page_ids(&editor), vec![vec!["a"], vec!["b"]]);
        assert!(editor.next_tick_at().is_none());
    }

    #[test]
    fn test_typing_burst_coalesces() {
        let prober = ScriptedProber::new().with_height("a", 750.0).with_default(100.0);
        let mut editor = editor(Document::from_blocks(vec![para("a")]), prober);
        let key = InputEvent::KeyDown {
            key: "Enter".to_string(),
            modifiers: Modifiers::default(),
        };

        editor.handle_event(&key, 0).unwrap();
        editor.insert_block(0, 1, schema::paragraph("")).unwrap();
        editor.handle_event(&key, 200).unwrap();
        editor.insert_text("typed").unwrap();
        editor.tick(500).unwrap();
        assert_eq!(editor.page_count(), 1);

        editor.tick(700).unwrap();
        assert_eq!(editor.page_count(), 2);
        assert_eq!(editor.doc().body_blocks(1)[0].text_content(), "typed");
    }

    #[test]
    fn test_edits_in_table_cells_not_measured() {
        let table = schema::table(vec![schema::row(&["x"]), schema::row(&["y"])]);
        let prober = ScriptedProber::new().with_default(300.0);
        let mut editor = editor(Document::from_blocks(vec![table]), prober);
        assert_eq!(editor.page_count(), 1);

        let text = NodePath::from_slice(&[0, 1, 0, 1, 0, 0, 0]);
        editor
            .set_selection(Selection::collapsed(Position::new(text, 1)))
            .unwrap();
        editor.insert_text("z").unwrap();
        assert_eq!(editor.page_count(), 1);
        assert_eq!(editor.doc().body_blocks(0)[0].text_content(), "xyz");
    }

    #[test]
    fn test_paste_gets_fresh_ids() {
        let prober = ScriptedProber::new().with_default(10.0);
        let mut editor = editor(Document::from_blocks(vec![para("a")]), prober);
        editor.paste(vec![para("a"), para("a")]).unwrap();

        let ids: Vec<_> = page_ids(&editor).concat();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], "a");
        let unique: FxHashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_set_page_options_repaginates() {
        let doc = Document::from_blocks(vec![para("a"), para("b"), para("c")]);
        let prober = ScriptedProber::new().with_default(300.0);
        let mut editor = editor(doc, prober);
        assert_eq!(editor.page_count(), 2);

        editor
            .set_page_options(PageOptions::with_body_height(1000.0))
            .unwrap();
        assert_eq!(editor.page_count(), 1);

        editor
            .set_page_options(PageOptions::with_body_height(350.0))
            .unwrap();
        assert_eq!(editor.page_count(), 3);
    }

    #[test]
    fn test_page_options_undo_restores_geometry_and_keeps_redo() {
        let doc = Document::from_blocks(vec![para("a"), para("b"), para("c")]);
        let prober = ScriptedProber::new().with_default(300.0);
        let mut editor = editor(doc, prober);
        assert_eq!(editor.page_count(), 2);

        let tall = PageOptions::with_body_height(1000.0);
        editor.set_page_options(tall).unwrap();
        assert_eq!(editor.page_count(), 1);

        assert!(editor.undo().unwrap());
        assert_eq!(editor.page_options(), PageOptions::with_body_height(BUDGET));
        assert_eq!(page_ids(&editor), vec![vec!["a", "b"], vec!["c"]]);
        assert!(editor.history().can_redo());

        assert!(editor.redo().unwrap());
        assert_eq!(editor.page_options(), tall);
        assert_eq!(editor.page_count(), 1);
    }

    #[test]
    fn test_emptied_page_before_oversized_image_removed() {
        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a")]),
            schema::page_with(vec![schema::image(100.0, 900.0).id("img")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new().with_height("a", 100.0).with_height("img", 900.0);
        let mut editor = editor(doc, prober);
        assert_eq!(editor.page_count(), 2);

        editor.remove_block(0, 0).unwrap();
        assert_eq!(page_ids(&editor), vec![vec!["img"]]);
    }

    #[test]
    fn test_loaded_document_consolidates_underfull_pages() {
        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a")]),
            schema::page(),
            schema::page_with(vec![para("b")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new().with_height("a", 100.0).with_height("b", 100.0);
        let editor = editor(doc, prober);
        assert_eq!(page_ids(&editor), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_computed_surface_paginates_long_document() {
        let options = PageOptions::default();
        let surface = Rc::new(ComputedSurface::new(&options, FontMetrics::default()));
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(12);
        let blocks = (0..40).map(|_| schema::paragraph(&text)).collect();
        let doc = Document::from_blocks(blocks);
        let signature = doc.leaf_signature();

        let editor = Editor::new(
            doc,
            PageOptionResolver::shared(options),
            NodeGeometryProviders::headless(surface.clone()),
        )
        .unwrap();

        assert!(editor.page_count() > 1);
        assert_eq!(editor.doc().leaf_signature(), signature);
        for page in 0..editor.page_count() {
            let blocks = editor.doc().body_blocks(page);
            let height = layout::lenient_total_height(surface.as_ref(), blocks);
            assert!(blocks.len() == 1 || height <= options.body_height());
        }
    }

    #[test]
    fn test_invalid_edit_reports_error() {
        let mut editor = editor(Document::new(), ScriptedProber::new());
        let err = editor.remove_block(0, 5).unwrap_err();
        assert!(matches!(err, EditorError::Step(StepError::IndexOutOfBounds { .. })));
        assert!(editor.insert_block(3, 0, para("x")).is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert { page: usize, index: usize },
        Remove { page: usize, index: usize },
        Paste { page: usize, count: usize },
        Undo,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0..8usize, 0..12usize).prop_map(|(page, index)| Op::Insert { page, index }),
            2 => (0..8usize, 0..12usize).prop_map(|(page, index)| Op::Remove { page, index }),
            1 => (0..8usize, 1..5usize).prop_map(|(page, count)| Op::Paste { page, count }),
            1 => Just(Op::Undo),
        ]
    }

    fn assert_ids_unique(editor: &Editor) {
        let mut seen = FxHashSet::default();
        for (_, node) in editor.doc().descendants() {
            if node.kind == NodeKind::Paragraph || node.kind == NodeKind::Page {
                let id = node.attrs.id.clone().expect("tracked node without id");
                assert!(seen.insert(id), "duplicate id");
            }
        }
    }

    proptest! {
        #[test]
        fn editing_keeps_ids_unique_and_pages_within_budget(ops in prop::collection::vec(op(), 1..30)) {
            let prober = ScriptedProber::new().with_default(100.0);
            let mut editor = editor(Document::new(), prober);

            for op in ops {
                let pages = editor.page_count();
                match op {
                    Op::Insert { page, index } => {
                        let page = page % pages;
                        let index = index % (editor.doc().body_blocks(page).len() + 1);
                        editor.insert_block(page, index, schema::paragraph("p")).unwrap();
                    }
                    Op::Remove { page, index } => {
                        let page = page % pages;
                        let len = editor.doc().body_blocks(page).len();
                        if len > 0 {
                            editor.remove_block(page, index % len).unwrap();
                        }
                    }
                    Op::Paste { page, count } => {
                        let page = page % pages;
                        let body = editor.doc().body_path(page).unwrap();
                        editor.set_selection(Selection::collapsed(Position::at(body))).unwrap();
                        editor.paste(vec![para("dup"); count]).unwrap();
                    }
                    Op::Undo => {
                        editor.undo().unwrap();
                    }
                }

                assert_ids_unique(&editor);
                prop_assert!(editor.page_count() >= 1);
                for page in 0..editor.page_count() {
                    let blocks = editor.doc().body_blocks(page);
                    prop_assert!(blocks.len() <= 8, "page {} holds {} blocks", page, blocks.len());
                }
            }
        }
    }
}
