//! The page plugin: overflow detection, reflow and input suspension

use super::id::reassign_ids;
use crate::document::Node;
use crate::editing::{Meta, PluginKey, Transaction};
use crate::layout::{NodeGeometryProviders, SharedPageOptions};
use crate::pagination::{Debounce, Intents, OverflowDetector, Phase, PhaseEvent, ReflowEngine};
use crate::plugin::{EditorState, InputEvent, Plugin};

/// Quiescence delays of the page plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Delay before pagination resumes after composition ends
    pub composition_delay_ms: u64,
    /// Delay before pagination resumes after the last plain key press
    pub keystroke_delay_ms: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            composition_delay_ms: 300,
            keystroke_delay_ms: 500,
        }
    }
}

/// Detector and reflow engine installed as one plugin
pub struct PagePlugin {
    options: SharedPageOptions,
    providers: NodeGeometryProviders,
    config: PaginationConfig,
    phase: Phase,
    resume: Debounce<()>,
    engine: ReflowEngine,
}

/// Create the page plugin
pub fn page_plugin(
    options: SharedPageOptions,
    providers: NodeGeometryProviders,
    config: PaginationConfig,
) -> PagePlugin {
    PagePlugin {
        options,
        providers,
        config,
        phase: Phase::default(),
        resume: Debounce::new(),
        engine: ReflowEngine::new(),
    }
}

impl PagePlugin {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Follow the run state recorded in `state`; returns true when
    /// pagination just resumed
    fn sync_phase(&mut self, state: &EditorState) -> bool {
        let pagination = &state.pagination;
        let runnable = pagination.run_enabled && !pagination.composition_active;
        let before = self.phase;
        self.phase = match (before, runnable) {
            (Phase::Disabled, true) => before.next(PhaseEvent::Ready),
            (Phase::Suspended, true) => before.next(PhaseEvent::Resume),
            (_, false) => before.next(PhaseEvent::Suspend),
            (phase, true) => phase,
        };
        before == Phase::Suspended && self.phase == Phase::Idle
    }

    fn suspend_meta(&self) -> Meta {
        Meta {
            prevent_pagination: Some(true),
            add_to_history: Some(false),
            ..Meta::default()
        }
    }
}

impl Plugin for PagePlugin {
    fn key(&self) -> PluginKey {
        PluginKey::Pagination
    }

    fn append_transaction(
        &mut self,
        trs: &[Transaction],
        _old: &EditorState,
        new: &EditorState,
    ) -> Option<Transaction> {
        if !new.pagination.run_enabled {
            return None;
        }
        let measured = trs
            .iter()
            .filter(|tr| tr.meta.appended_by != Some(PluginKey::Pagination))
            .rev()
            .find(|tr| tr.meta.measurement)?;
        let intents = Intents {
            inserting: measured.meta.inserting == Some(true),
            deleting: measured.meta.deleting == Some(true),
        };
        if !intents.inserting && !intents.deleting {
            return None;
        }

        let (options, revision) = {
            let resolver = self.options.borrow();
            (resolver.current_page_options(), resolver.revision())
        };
        let surface = self.providers.surface.as_ref();
        self.engine.refresh_surface(surface, &new.doc, &options, revision);

        let result = self.engine.run(&new.doc, intents, options.body_height(), surface);
        self.phase = self.phase.next(PhaseEvent::ReflowFinished);
        match result {
            Ok(plan) => plan.into_transaction(),
            Err(err) => {
                tracing::warn!(error = %err, "reflow pass abandoned");
                None
            }
        }
    }

    fn view_update(
        &mut self,
        trs: &[Transaction],
        prev: &EditorState,
        state: &EditorState,
    ) -> Option<Transaction> {
        let resumed = self.sync_phase(state);
        // Our own measurement round, reflow included
        if trs.iter().any(|tr| tr.meta.measurement) {
            return None;
        }

        let doc_changed = state.pagination.generation != prev.pagination.generation;
        if !doc_changed && !resumed && !state.pagination.is_initial {
            return None;
        }
        if !self.phase.accepts_changes() {
            return None;
        }
        self.phase = self.phase.next(PhaseEvent::ChangeCommitted);

        let budget = self.options.borrow().current_page_options().body_height();
        let detector = OverflowDetector::new(budget);
        let view = self.providers.view.as_ref();
        let measured = if state.pagination.is_initial {
            detector.measure_document(&state.doc, &state.selection, &state.pagination, view)
        } else {
            detector.measure(
                &state.doc,
                &state.selection,
                &state.pagination,
                state.pagination.recorded_body_height,
                view,
            )
        };

        let Some(measured) = measured else {
            self.phase = self.phase.next(PhaseEvent::Measured { intent: false });
            return None;
        };
        self.phase = self.phase.next(PhaseEvent::Measured {
            intent: measured.has_intent(),
        });

        let mut meta = measured.to_meta();
        // After undo/redo a reflow is an edit of its own
        if trs.iter().any(|tr| tr.meta.restore_body_height.is_some()) {
            meta.join_history = false;
        }
        Some(Transaction::with_meta(meta))
    }

    fn handle_event(
        &mut self,
        event: &InputEvent,
        _state: &EditorState,
        now_ms: u64,
    ) -> Option<Transaction> {
        match event {
            InputEvent::CompositionStart => {
                self.resume.cancel();
                Some(Transaction::with_meta(Meta {
                    composition: Some(true),
                    ..self.suspend_meta()
                }))
            }
            InputEvent::CompositionEnd => {
                self.resume.schedule(now_ms, self.config.composition_delay_ms, ());
                Some(Transaction::with_meta(Meta {
                    composition: Some(false),
                    add_to_history: Some(false),
                    ..Meta::default()
                }))
            }
            InputEvent::KeyDown { modifiers, .. } if !modifiers.is_shortcut() => {
                self.resume.schedule(now_ms, self.config.keystroke_delay_ms, ());
                Some(Transaction::with_meta(self.suspend_meta()))
            }
            InputEvent::KeyDown { .. } => None,
        }
    }

    fn tick(&mut self, _state: &EditorState, now_ms: u64) -> Option<Transaction> {
        self.resume.take_due(now_ms)?;
        tracing::trace!(now_ms, "pagination resumed");
        Some(Transaction::with_meta(Meta {
            prevent_pagination: Some(false),
            add_to_history: Some(false),
            ..Meta::default()
        }))
    }

    fn due_at(&self) -> Option<u64> {
        self.resume.due_at()
    }

    fn transform_pasted(&self, mut nodes: Vec<Node>) -> Vec<Node> {
        reassign_ids(&mut nodes);
        nodes
    }
}
