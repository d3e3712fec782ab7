//! Reflow engine: splits overflowing pages and merges underfull ones
//!
//! The engine plans against a working copy of the document. Every move is
//! applied to the copy as it is recorded, so later decisions see the tree
//! as it will be after the earlier moves, and the recorded steps replay
//! verbatim on the real document. A failed measurement abandons the whole
//! plan; nothing is emitted and the next change retries.

use crate::document::{schema, Document, Node, NodeKind, NodePath};
use crate::editing::{Meta, PluginKey, Step, Transaction};
use crate::error::PaginationError;
use crate::layout::{strict_height, total_height, GeometryProber, PageOptions};
use crate::pagination::critical::is_row_splittable;
use crate::plugin::fresh_id;

/// Which passes a reflow runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intents {
    pub inserting: bool,
    pub deleting: bool,
}

/// The moves produced by one reflow pass
#[derive(Debug, Clone, Default)]
pub struct ReflowPlan {
    pub steps: Vec<Step>,
    pub pages_added: usize,
    pub pages_removed: usize,
}

impl ReflowPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Combine all moves into one transaction
    pub fn into_transaction(self) -> Option<Transaction> {
        if self.steps.is_empty() {
            return None;
        }
        let mut tr = Transaction::with_meta(Meta {
            appended_by: Some(PluginKey::Pagination),
            ..Meta::default()
        });
        tr.extend(self.steps);
        Some(tr)
    }
}

/// Plans page splits and merges within a body height budget
#[derive(Debug, Clone, Default)]
pub struct ReflowEngine {
    /// Page option revision the surface was last built for
    surface_revision: Option<u64>,
}

impl ReflowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the detached surface if the page geometry changed, and drop
    /// measurements of nodes that left the document
    pub fn refresh_surface(
        &mut self,
        prober: &dyn GeometryProber,
        doc: &Document,
        options: &PageOptions,
        revision: u64,
    ) {
        if self.surface_revision != Some(revision) {
            prober.rebuild(options);
            self.surface_revision = Some(revision);
        }
        prober.discard_stale(doc);
    }

    /// Plan one reflow pass
    pub fn run(
        &self,
        doc: &Document,
        intents: Intents,
        budget: f32,
        prober: &dyn GeometryProber,
    ) -> Result<ReflowPlan, PaginationError> {
        let mut planner = Planner {
            work: doc.clone(),
            plan: ReflowPlan::default(),
            prober,
            budget,
        };

        if intents.deleting {
            planner.merge_pass()?;
        }
        if intents.inserting || intents.deleting {
            planner.split_pass()?;
        }

        tracing::debug!(
            steps = planner.plan.steps.len(),
            pages_added = planner.plan.pages_added,
            pages_removed = planner.plan.pages_removed,
            "planned reflow"
        );
        Ok(planner.plan)
    }
}

struct Planner<'a> {
    work: Document,
    plan: ReflowPlan,
    prober: &'a dyn GeometryProber,
    budget: f32,
}

impl Planner<'_> {
    fn apply(&mut self, step: Step) -> Result<(), PaginationError> {
        step.apply(&mut self.work)?;
        self.plan.steps.push(step);
        Ok(())
    }

    fn blocks(&self, page: usize) -> &[Node] {
        self.work.body_blocks(page)
    }

    /// Pull leading content of each page back into the page before it
    ///
    /// A multi-row table that does not fit whole gives its leading rows to
    /// a fragment closing the previous page. Pages left empty are removed
    /// unless they are the last one standing.
    fn merge_pass(&mut self) -> Result<(), PaginationError> {
        let mut i = 1;
        while i < self.work.page_count() {
            let (Some(prev_body), Some(body)) = (self.work.body_path(i - 1), self.work.body_path(i)) else {
                i += 1;
                continue;
            };
            let mut used = total_height(self.prober, self.blocks(i - 1))?;

            while let Some(first) = self.blocks(i).first() {
                let prev_len = self.blocks(i - 1).len();
                let continues_table = self
                    .blocks(i - 1)
                    .last()
                    .map(|last| same_table_group(last, first))
                    .unwrap_or(false);

                if continues_table {
                    used = self.rejoin_rows(&prev_body, prev_len - 1, &body, used)?;
                    if self.blocks(i)[0].children.is_empty() {
                        self.apply(Step::remove(body.clone(), 0))?;
                        continue;
                    }
                    break;
                }

                let height = strict_height(self.prober, first)?;
                if used + height <= self.budget {
                    self.apply(Step::move_node(body.clone(), 0, prev_body.clone(), prev_len))?;
                    used += height;
                    continue;
                }

                if is_row_splittable(first) {
                    let fit = self.rows_fitting(first, self.budget - used)?;
                    if fit > 0 {
                        self.pull_rows(&prev_body, &body, fit)?;
                    }
                }
                break;
            }

            if self.work.page_count() > 1 {
                if self.blocks(i - 1).is_empty() {
                    // Nothing fit; the next page takes this one's place
                    self.apply(Step::remove(NodePath::root(), i - 1))?;
                    self.plan.pages_removed += 1;
                    i = (i - 1).max(1);
                    continue;
                }
                if self.blocks(i).is_empty() {
                    self.apply(Step::remove(NodePath::root(), i))?;
                    self.plan.pages_removed += 1;
                    continue;
                }
            }
            i += 1;
        }
        Ok(())
    }

    /// Move the first `fit` rows of the table heading `body` into a new
    /// fragment closing `prev_body`
    fn pull_rows(&mut self, prev_body: &NodePath, body: &NodePath, fit: usize) -> Result<(), PaginationError> {
        let source = body.child(0);
        self.ensure_group(&source)?;
        let Some(fragment) = self.work.node_at(&source).map(schema::table_fragment) else {
            return Ok(());
        };

        let end = self.work.node_at(prev_body).map(Node::child_count).unwrap_or(0);
        self.apply(Step::insert(prev_body.clone(), end, fragment))?;
        let target = prev_body.child(end);
        for offset in 0..fit {
            self.apply(Step::move_node(source.clone(), 0, target.clone(), offset))?;
        }
        Ok(())
    }

    /// Give the table at `path` a group so its fragments can find each other
    fn ensure_group(&mut self, path: &NodePath) -> Result<(), PaginationError> {
        let Some(table) = self.work.node_at(path) else {
            return Ok(());
        };
        if table.attrs.group_id.is_some() {
            return Ok(());
        }
        let mut attrs = table.attrs.clone();
        attrs.group_id = Some(fresh_id());
        self.apply(Step::SetAttrs {
            path: path.clone(),
            attrs,
        })
    }

    /// Fold the block after `index` on `page` into the block at `index`
    /// when both are fragments of one table
    fn join_fragments(&mut self, page: usize, index: usize) -> Result<(), PaginationError> {
        let blocks = self.blocks(page);
        if index + 1 >= blocks.len() || !same_table_group(&blocks[index], &blocks[index + 1]) {
            return Ok(());
        }
        let end = blocks[index].child_count();
        let rows = blocks[index + 1].child_count();
        let Some(body) = self.work.body_path(page) else {
            return Ok(());
        };

        let target = body.child(index);
        let source = body.child(index + 1);
        for offset in 0..rows {
            self.apply(Step::move_node(source.clone(), 0, target.clone(), end + offset))?;
        }
        self.apply(Step::remove(body, index + 1))
    }

    /// Move rows of the table fragment heading `body` back into the fragment
    /// closing `prev_body` while they fit
    fn rejoin_rows(
        &mut self,
        prev_body: &NodePath,
        prev_table: usize,
        body: &NodePath,
        mut used: f32,
    ) -> Result<f32, PaginationError> {
        let target = prev_body.child(prev_table);
        let source = body.child(0);
        loop {
            let Some(row) = self.work.node_at(&source).and_then(Node::first_child) else {
                break;
            };
            let height = strict_height(self.prober, row)?;
            if used + height > self.budget {
                break;
            }
            let end = self.work.node_at(&target).map(Node::child_count).unwrap_or(0);
            self.apply(Step::move_node(source.clone(), 0, target.clone(), end))?;
            used += height;
        }
        Ok(used)
    }

    /// Push trailing content of each overflowing page onto the next page
    fn split_pass(&mut self) -> Result<(), PaginationError> {
        let mut i = 0;
        while i < self.work.page_count() {
            if self.work.body_path(i).is_none() {
                i += 1;
                continue;
            }

            let heights = self
                .blocks(i)
                .iter()
                .map(|b| strict_height(self.prober, b))
                .collect::<Result<Vec<_>, _>>()?;

            let mut used = 0.0;
            let mut overflow_at = None;
            for (k, height) in heights.iter().enumerate() {
                if used + height > self.budget {
                    overflow_at = Some(k);
                    break;
                }
                used += height;
            }
            let Some(k) = overflow_at else {
                i += 1;
                continue;
            };

            if is_row_splittable(&self.blocks(i)[k]) {
                let room = self.budget - used;
                let rows = self.blocks(i)[k].children.len();
                let mut fit = self.rows_fitting(&self.blocks(i)[k], room)?;
                // A row taller than a whole page stays put
                if fit == 0 && k == 0 {
                    fit = 1;
                }
                if fit > 0 && fit < rows {
                    self.split_table(i, k, fit)?;
                    i += 1;
                    continue;
                }
            }

            // The first block always stays, even if it alone overflows
            let keep = k.max(1);
            if keep >= self.blocks(i).len() {
                tracing::debug!(page = i, "single block exceeds the page body, left to overflow");
                i += 1;
                continue;
            }
            self.move_tail(i, keep)?;
            i += 1;
        }
        Ok(())
    }

    fn rows_fitting(&self, table: &Node, room: f32) -> Result<usize, PaginationError> {
        let mut used = 0.0;
        for (index, row) in table.children.iter().enumerate() {
            let height = strict_height(self.prober, row)?;
            if used + height > room {
                return Ok(index);
            }
            used += height;
        }
        Ok(table.children.len())
    }

    /// Body path of the page after `page`, creating that page if needed
    fn ensure_next_page(&mut self, page: usize) -> Result<NodePath, PaginationError> {
        if let Some(body) = self.work.body_path(page + 1) {
            return Ok(body);
        }
        self.apply(Step::insert(NodePath::root(), page + 1, schema::page()))?;
        self.plan.pages_added += 1;
        Ok(self
            .work
            .body_path(page + 1)
            .unwrap_or_else(|| NodePath::from_slice(&[page + 1, 1])))
    }

    /// Move blocks `keep..` of `page` to the front of the next page
    fn move_tail(&mut self, page: usize, keep: usize) -> Result<(), PaginationError> {
        let body = self
            .work
            .body_path(page)
            .unwrap_or_else(|| NodePath::from_slice(&[page, 1]));
        let count = self.blocks(page).len() - keep;
        let next = self.ensure_next_page(page)?;
        for offset in 0..count {
            self.apply(Step::move_node(body.clone(), keep, next.clone(), offset))?;
        }
        self.join_fragments(page + 1, count - 1)
    }

    /// Split the table at block `k` of `page` after `fit` rows
    fn split_table(&mut self, page: usize, k: usize, fit: usize) -> Result<(), PaginationError> {
        let body = self
            .work
            .body_path(page)
            .unwrap_or_else(|| NodePath::from_slice(&[page, 1]));
        let table_path = body.child(k);
        self.ensure_group(&table_path)?;

        let fragment = schema::table_fragment(&self.blocks(page)[k]);
        let rows = self.blocks(page)[k].children.len();
        let trailing = self.blocks(page).len() - k - 1;

        let next = self.ensure_next_page(page)?;
        // Rows go in front of the fragment already continuing this table,
        // which is only adjacent when nothing follows the table here
        let continued = trailing == 0
            && self
                .blocks(page + 1)
                .first()
                .map(|first| same_table_group(&self.blocks(page)[k], first))
                .unwrap_or(false);
        if !continued {
            self.apply(Step::insert(next.clone(), 0, fragment))?;
        }
        let fragment_path = next.child(0);
        for offset in 0..rows - fit {
            self.apply(Step::move_node(table_path.clone(), fit, fragment_path.clone(), offset))?;
        }
        for offset in 0..trailing {
            self.apply(Step::move_node(body.clone(), k + 1, next.clone(), 1 + offset))?;
        }
        Ok(())
    }
}

fn same_table_group(a: &Node, b: &Node) -> bool {
    a.kind == NodeKind::Table
        && b.kind == NodeKind::Table
        && a.attrs.group_id.is_some()
        && a.attrs.group_id == b.attrs.group_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ScriptedProber;
    use proptest::prelude::*;

    const BUDGET: f32 = 800.0;

    fn para(id: &str) -> Node {
        schema::paragraph(id).id(id)
    }

    fn apply_plan(doc: &Document, plan: &ReflowPlan) -> Document {
        let mut out = doc.clone();
        for step in &plan.steps {
            step.apply(&mut out).unwrap();
        }
        out
    }

    fn page_ids(doc: &Document) -> Vec<Vec<String>> {
        doc.pages()
            .iter()
            .map(|p| {
                p.body()
                    .map(|b| b.children.iter().filter_map(|c| c.attrs.id.clone()).collect())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn inserting() -> Intents {
        Intents {
            inserting: true,
            deleting: false,
        }
    }

    fn deleting() -> Intents {
        Intents {
            inserting: false,
            deleting: true,
        }
    }

    #[test]
    fn test_overflow_moves_tail_to_new_page() {
        let doc = Document::from_blocks(vec![para("a"), para("b")]);
        let prober = ScriptedProber::new().with_height("a", 750.0).with_height("b", 100.0);
        let plan = ReflowEngine::new().run(&doc, inserting(), BUDGET, &prober).unwrap();
        assert_eq!(plan.pages_added, 1);

        let after = apply_plan(&doc, &plan);
        assert_eq!(page_ids(&after), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_overflow_prepends_to_existing_page() {
        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a"), para("b")]),
            schema::page_with(vec![para("c")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new()
            .with_height("a", 700.0)
            .with_height("b", 200.0)
            .with_height("c", 100.0);
        let plan = ReflowEngine::new().run(&doc, inserting(), BUDGET, &prober).unwrap();
        assert_eq!(plan.pages_added, 0);
        assert_eq!(page_ids(&apply_plan(&doc, &plan)), vec![vec!["a"], vec!["b", "c"]]);
    }

    #[test]
    fn test_overflow_cascades() {
        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a"), para("b")]),
            schema::page_with(vec![para("c")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new()
            .with_height("a", 500.0)
            .with_height("b", 500.0)
            .with_height("c", 500.0);
        let plan = ReflowEngine::new().run(&doc, inserting(), BUDGET, &prober).unwrap();
        assert_eq!(
            page_ids(&apply_plan(&doc, &plan)),
            vec![vec!["a"], vec!["b"], vec!["c"]]
        );
    }

    #[test]
    fn test_single_oversized_table_left_alone() {
        let table = schema::table(vec![schema::row(&["x"])]).id("t");
        let doc = Document::from_blocks(vec![table]);
        let prober = ScriptedProber::new().with_height("t", 900.0);
        let plan = ReflowEngine::new().run(&doc, inserting(), BUDGET, &prober).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_atomic_moves_whole() {
        let doc = Document::from_blocks(vec![para("a"), schema::image(100.0, 300.0).id("img")]);
        let prober = ScriptedProber::new().with_height("a", 600.0).with_height("img", 300.0);
        let plan = ReflowEngine::new().run(&doc, inserting(), BUDGET, &prober).unwrap();
        let after = apply_plan(&doc, &plan);
        assert_eq!(page_ids(&after), vec![vec!["a"], vec!["img"]]);
        assert_eq!(after.body_blocks(1)[0], doc.body_blocks(0)[1]);
    }

    #[test]
    fn test_multi_row_table_splits_by_row() {
        let table = schema::table(vec![
            schema::row(&["1"]).id("r1"),
            schema::row(&["2"]).id("r2"),
            schema::row(&["3"]).id("r3"),
        ])
        .id("t");
        let doc = Document::from_blocks(vec![para("a"), table, para("z")]);
        let prober = ScriptedProber::new()
            .with_height("a", 400.0)
            .with_height("r1", 300.0)
            .with_height("r2", 300.0)
            .with_height("r3", 300.0)
            .with_height("z", 50.0);
        let plan = ReflowEngine::new().run(&doc, inserting(), BUDGET, &prober).unwrap();
        let after = apply_plan(&doc, &plan);

        let first = &after.body_blocks(0)[1];
        let fragment = &after.body_blocks(1)[0];
        assert_eq!(first.child_count(), 1);
        assert_eq!(fragment.child_count(), 2);
        assert!(first.attrs.group_id.is_some());
        assert_eq!(first.attrs.group_id, fragment.attrs.group_id);
        assert_eq!(after.body_blocks(1)[1].node_id(), Some("z"));
        assert_eq!(after.leaf_signature(), doc.leaf_signature());
    }

    #[test]
    fn test_split_table_rejoins_on_underflow() {
        let mut head = schema::table(vec![schema::row(&["1"]).id("r1")]);
        head.attrs.group_id = Some("g".to_string());
        let mut tail = schema::table(vec![schema::row(&["2"]).id("r2")]);
        tail.attrs.group_id = Some("g".to_string());

        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a"), head]),
            schema::page_with(vec![tail]),
        ])
        .unwrap();
        let prober = ScriptedProber::new()
            .with_height("a", 100.0)
            .with_height("r1", 100.0)
            .with_height("r2", 100.0);
        let plan = ReflowEngine::new().run(&doc, deleting(), BUDGET, &prober).unwrap();
        let after = apply_plan(&doc, &plan);

        assert_eq!(after.page_count(), 1);
        assert_eq!(after.body_blocks(0).len(), 2);
        assert_eq!(after.body_blocks(0)[1].child_count(), 2);
    }

    #[test]
    fn test_underflow_merges_and_removes_page() {
        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a")]),
            schema::page_with(vec![para("c")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new().with_height("a", 100.0).with_height("c", 200.0);
        let plan = ReflowEngine::new().run(&doc, deleting(), BUDGET, &prober).unwrap();
        assert_eq!(plan.pages_removed, 1);
        assert_eq!(page_ids(&apply_plan(&doc, &plan)), vec![vec!["a", "c"]]);
    }

    #[test]
    fn test_underflow_pulls_partially() {
        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a")]),
            schema::page_with(vec![para("b"), para("c")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new()
            .with_height("a", 300.0)
            .with_height("b", 400.0)
            .with_height("c", 400.0);
        let plan = ReflowEngine::new().run(&doc, deleting(), BUDGET, &prober).unwrap();
        assert_eq!(plan.pages_removed, 0);
        assert_eq!(page_ids(&apply_plan(&doc, &plan)), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_empty_page_before_oversized_block_removed() {
        let doc = Document::from_pages(vec![
            schema::page(),
            schema::page_with(vec![schema::image(100.0, 900.0).id("img")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new().with_height("img", 900.0);
        let engine = ReflowEngine::new();
        let plan = engine.run(&doc, deleting(), BUDGET, &prober).unwrap();
        assert_eq!(plan.pages_removed, 1);

        let after = apply_plan(&doc, &plan);
        assert_eq!(page_ids(&after), vec![vec!["img"]]);
        assert!(engine.run(&after, deleting(), BUDGET, &prober).unwrap().is_empty());
    }

    #[test]
    fn test_underflow_splits_table_into_free_room() {
        let table = schema::table(vec![
            schema::row(&["1"]).id("r1"),
            schema::row(&["2"]).id("r2"),
            schema::row(&["3"]).id("r3"),
        ])
        .id("t");
        let doc = Document::from_pages(vec![schema::page(), schema::page_with(vec![table])]).unwrap();
        let prober = ScriptedProber::new()
            .with_height("r1", 113.0)
            .with_height("r2", 471.0)
            .with_height("r3", 217.0);
        let engine = ReflowEngine::new();
        let plan = engine.run(&doc, deleting(), BUDGET, &prober).unwrap();
        let after = apply_plan(&doc, &plan);

        assert_eq!(after.page_count(), 2);
        let head = &after.body_blocks(0)[0];
        let tail = &after.body_blocks(1)[0];
        assert_eq!(head.child_count(), 2);
        assert_eq!(tail.child_count(), 1);
        assert!(head.attrs.group_id.is_some());
        assert_eq!(head.attrs.group_id, tail.attrs.group_id);
        assert_eq!(after.leaf_signature(), doc.leaf_signature());

        assert!(engine.run(&after, deleting(), BUDGET, &prober).unwrap().is_empty());
    }

    #[test]
    fn test_moved_fragment_joins_its_continuation() {
        let mut head = schema::table(vec![schema::row(&["1"]).id("r1")]);
        head.attrs.group_id = Some("g".to_string());
        let mut tail = schema::table(vec![schema::row(&["2"]).id("r2")]);
        tail.attrs.group_id = Some("g".to_string());

        let doc = Document::from_pages(vec![
            schema::page_with(vec![para("a"), head]),
            schema::page_with(vec![tail, para("z")]),
        ])
        .unwrap();
        let prober = ScriptedProber::new()
            .with_height("a", 700.0)
            .with_height("r1", 300.0)
            .with_height("r2", 100.0)
            .with_height("z", 50.0);
        let plan = ReflowEngine::new().run(&doc, inserting(), BUDGET, &prober).unwrap();
        let after = apply_plan(&doc, &plan);

        assert_eq!(after.body_blocks(0).len(), 1);
        assert_eq!(after.body_blocks(1).len(), 2);
        assert_eq!(after.body_blocks(1)[0].child_count(), 2);
        assert_eq!(after.leaf_signature(), doc.leaf_signature());
    }

    #[test]
    fn test_sole_empty_page_survives() {
        let doc = Document::new();
        let prober = ScriptedProber::new();
        let plan = ReflowEngine::new().run(&doc, deleting(), BUDGET, &prober).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_empty_trailing_page_removed() {
        let doc = Document::from_pages(vec![schema::page_with(vec![para("a")]), schema::page()]).unwrap();
        let prober = ScriptedProber::new().with_height("a", 100.0);
        let plan = ReflowEngine::new().run(&doc, deleting(), BUDGET, &prober).unwrap();
        assert_eq!(apply_plan(&doc, &plan).page_count(), 1);
    }

    #[test]
    fn test_unmeasurable_aborts_without_steps() {
        let doc = Document::from_blocks(vec![para("a"), para("b")]);
        let prober = ScriptedProber::new().with_height("a", 900.0);
        let err = ReflowEngine::new().run(&doc, inserting(), BUDGET, &prober).unwrap_err();
        assert!(matches!(err, PaginationError::MeasurementUnavailable { .. }));
    }

    #[test]
    fn test_into_transaction_tags_plugin() {
        assert!(ReflowPlan::default().into_transaction().is_none());
        let plan = ReflowPlan {
            steps: vec![Step::insert(NodePath::root(), 1, schema::page())],
            ..ReflowPlan::default()
        };
        let tr = plan.into_transaction().unwrap();
        assert_eq!(tr.meta.appended_by, Some(PluginKey::Pagination));
    }

    #[derive(Debug, Clone)]
    enum Block {
        Para(u32),
        Image(u32),
        Table(Vec<u32>),
    }

    fn block() -> impl Strategy<Value = Block> {
        prop_oneof![
            4 => (1u32..500).prop_map(Block::Para),
            1 => (100u32..1000).prop_map(Block::Image),
            2 => prop::collection::vec(50u32..900, 2..5).prop_map(Block::Table),
        ]
    }

    fn arbitrary_doc() -> impl Strategy<Value = (Document, ScriptedProber)> {
        prop::collection::vec(prop::collection::vec(block(), 0..6), 1..4).prop_map(|pages| {
            let mut prober = ScriptedProber::new();
            let mut n = 0;
            let mut next_id = |height: u32, prober: &mut ScriptedProber| {
                let id = format!("b{n}");
                n += 1;
                prober.set_height(id.clone(), height as f32);
                id
            };
            let pages = pages
                .into_iter()
                .map(|blocks| {
                    let blocks = blocks
                        .into_iter()
                        .map(|block| match block {
                            Block::Para(h) => para(&next_id(h, &mut prober)),
                            Block::Image(h) => schema::image(100.0, h as f32).id(next_id(h, &mut prober)),
                            Block::Table(rows) => schema::table(
                                rows.into_iter()
                                    .map(|h| schema::row(&["cell"]).id(next_id(h, &mut prober)))
                                    .collect(),
                            ),
                        })
                        .collect();
                    schema::page_with(blocks)
                })
                .collect();
            (Document::from_pages(pages).unwrap(), prober)
        })
    }

    proptest! {
        #[test]
        fn reflow_keeps_content_and_budget((doc, prober) in arbitrary_doc(), deleting in any::<bool>()) {
            let intents = Intents { inserting: !deleting, deleting };
            let engine = ReflowEngine::new();
            let plan = engine.run(&doc, intents, BUDGET, &prober).unwrap();
            let after = apply_plan(&doc, &plan);

            prop_assert_eq!(after.leaf_signature(), doc.leaf_signature());
            prop_assert!(after.page_count() >= 1);
            if deleting && after.page_count() > 1 {
                for page in 0..after.page_count() {
                    prop_assert!(!after.body_blocks(page).is_empty(), "page {} left empty", page);
                }
            }
            for page in 0..after.page_count() {
                let blocks = after.body_blocks(page);
                if blocks.len() > 1 {
                    prop_assert!(total_height(&prober, blocks).unwrap() <= BUDGET);
                }
            }

            // A second pass over the result is a no-op
            let again = engine.run(&after, intents, BUDGET, &prober).unwrap();
            prop_assert!(again.is_empty());
        }
    }
}
