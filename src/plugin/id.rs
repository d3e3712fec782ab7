//! Identity assignment: unique identifiers for tracked node kinds

use crate::document::{Node, NodeKind};
use crate::editing::{PluginKey, Step, Transaction};
use crate::plugin::{EditorState, Plugin};
use crate::undo::current_timestamp;
use rustc_hash::FxHashSet;
use std::mem::{discriminant, Discriminant};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Node kinds that receive identifiers unless configured otherwise
pub const DEFAULT_TRACKED: &[NodeKind] = &[
    NodeKind::Page,
    NodeKind::Paragraph,
    NodeKind::Heading { level: 1 },
    NodeKind::Table,
    NodeKind::TableRow,
    NodeKind::Image,
    NodeKind::Iframe,
    NodeKind::CodeBlock,
    NodeKind::TableOfContents,
    NodeKind::Video,
];

static NEXT_ID: AtomicU64 = AtomicU64::new(1);
static SESSION: OnceLock<String> = OnceLock::new();

/// A fresh identifier, unique within this process
///
/// Identifiers are a per-session prefix followed by a counter, both in
/// base 36, so documents edited in different sessions rarely collide.
pub fn fresh_id() -> String {
    let session = SESSION.get_or_init(|| base36(current_timestamp() % 36u64.pow(5)));
    let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{session}{}", base36(n))
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Appends identifier assignments after structural changes
pub struct IdPlugin {
    tracked: FxHashSet<Discriminant<NodeKind>>,
}

/// Create the identity plugin for the given node kinds
///
/// Kinds match by variant, so any `Heading` level tracks every heading.
pub fn id_plugin(tracked: &[NodeKind]) -> IdPlugin {
    IdPlugin {
        tracked: tracked.iter().map(discriminant).collect(),
    }
}

impl IdPlugin {
    pub fn tracks(&self, kind: &NodeKind) -> bool {
        self.tracked.contains(&discriminant(kind))
    }

    /// Steps giving every tracked node a unique identifier
    ///
    /// The first occurrence of an identifier keeps it; nodes without one
    /// and later duplicates get a fresh identifier.
    pub fn sweep(&self, state: &EditorState) -> Vec<Step> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut steps = Vec::new();

        for (path, node) in state.doc.descendants() {
            let current = node.attrs.id.as_deref();
            let needs_id = self.tracks(&node.kind) && current.map_or(true, |id| seen.contains(id));
            if needs_id {
                let mut attrs = node.attrs.clone();
                let id = fresh_id();
                seen.insert(id.clone());
                attrs.id = Some(id);
                steps.push(Step::SetAttrs { path, attrs });
            } else if let Some(id) = current {
                seen.insert(id.to_string());
            }
        }
        steps
    }
}

impl Plugin for IdPlugin {
    fn key(&self) -> PluginKey {
        PluginKey::Identity
    }

    fn append_transaction(
        &mut self,
        trs: &[Transaction],
        _old: &EditorState,
        new: &EditorState,
    ) -> Option<Transaction> {
        let foreign = || trs.iter().filter(|tr| tr.meta.appended_by != Some(PluginKey::Identity));
        let forced = foreign().any(|tr| tr.meta.init_split == Some(true));
        if !forced && !foreign().any(Transaction::structure_changed) {
            return None;
        }

        let steps = self.sweep(new);
        if steps.is_empty() {
            return None;
        }
        tracing::debug!(assigned = steps.len(), forced, "assigned node identifiers");

        let mut tr = Transaction::new();
        tr.extend(steps);
        Some(tr)
    }
}

/// Give every non-text node of a pasted slice a fresh identifier
pub(crate) fn reassign_ids(nodes: &mut [Node]) {
    for node in nodes {
        node.for_each_descendant_mut(&mut |child| {
            if !child.kind.is_text() {
                child.attrs.id = Some(fresh_id());
            }
        });
    }
}
