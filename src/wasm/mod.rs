//! WASM bindings for the editor
//!
//! Documents, nodes, selections and events cross the boundary as JSON
//! strings. Rendered heights come from a JS callback taking a node id and
//! returning its height in pixels, or `undefined` when the node is not on
//! screen yet.

use crate::document::{Document, Node};
use crate::editing::Selection;
use crate::error::EditorError;
use crate::layout::{
    ComputedSurface, FontMetrics, GeometryProber, Measurement, NodeGeometryProviders,
    PageOptionResolver, PageOptions, PageSize, SharedPageOptions,
};
use crate::plugin::InputEvent;
use crate::Editor;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Geometry prober backed by a JS measuring callback
pub struct JsProber {
    callback: js_sys::Function,
}

impl JsProber {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

impl GeometryProber for JsProber {
    fn measure(&self, node: &Node) -> Measurement {
        let Some(id) = node.node_id() else {
            return Measurement::Detached;
        };
        match self.callback.call1(&JsValue::NULL, &JsValue::from_str(id)) {
            Ok(value) => value
                .as_f64()
                .map(|height| Measurement::height(height as f32))
                .unwrap_or(Measurement::Detached),
            Err(_) => Measurement::Detached,
        }
    }
}

/// WASM-exposed editor wrapper
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
    options: SharedPageOptions,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor for a JSON document on A4 pages
    ///
    /// `measure` is called with a node id and returns the rendered height.
    #[wasm_bindgen(constructor)]
    pub fn new(doc_json: &str, measure: js_sys::Function) -> Result<WasmEditor, JsValue> {
        let doc = if doc_json.trim().is_empty() {
            Document::new()
        } else {
            Document::from_json(doc_json).map_err(to_js)?
        };
        let page = PageOptions::default();
        let options = PageOptionResolver::shared(page);
        let providers = NodeGeometryProviders::new(
            Rc::new(JsProber::new(measure)),
            Rc::new(ComputedSurface::new(&page, FontMetrics::default())),
        );
        let editor = Editor::new(doc, options.clone(), providers).map_err(to_js)?;
        Ok(Self { editor, options })
    }

    /// Insert text at the selection head
    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, text: &str) -> Result<(), JsValue> {
        self.editor.insert_text(text).map_err(to_js)
    }

    /// Insert a block given as JSON into a page body
    #[wasm_bindgen(js_name = insertBlock)]
    pub fn insert_block(&mut self, page: usize, index: usize, node_json: &str) -> Result<(), JsValue> {
        let node: Node = serde_json::from_str(node_json).map_err(|e| to_js(e.into()))?;
        self.editor.insert_block(page, index, node).map_err(to_js)
    }

    /// Remove a block from a page body
    #[wasm_bindgen(js_name = removeBlock)]
    pub fn remove_block(&mut self, page: usize, index: usize) -> Result<(), JsValue> {
        self.editor.remove_block(page, index).map_err(to_js)
    }

    /// Paste a JSON array of blocks after the selection's block
    pub fn paste(&mut self, nodes_json: &str) -> Result<(), JsValue> {
        let nodes: Vec<Node> = serde_json::from_str(nodes_json).map_err(|e| to_js(e.into()))?;
        self.editor.paste(nodes).map_err(to_js)
    }

    /// Set the selection from JSON (`{"anchor": .., "head": ..}`)
    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&mut self, selection_json: &str) -> Result<(), JsValue> {
        let selection: Selection = serde_json::from_str(selection_json).map_err(|e| to_js(e.into()))?;
        self.editor.set_selection(selection).map_err(to_js)
    }

    /// Undo last operation
    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.editor.undo().map_err(to_js)
    }

    /// Redo last undone operation
    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.editor.redo().map_err(to_js)
    }

    /// Forward a DOM input event given as JSON
    #[wasm_bindgen(js_name = handleEvent)]
    pub fn handle_event(&mut self, event_json: &str, now_ms: f64) -> Result<(), JsValue> {
        let event: InputEvent = serde_json::from_str(event_json).map_err(|e| to_js(e.into()))?;
        self.editor.handle_event(&event, now_ms as u64).map_err(to_js)
    }

    /// Advance timers; call at `nextTickAt()`
    pub fn tick(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.editor.tick(now_ms as u64).map_err(to_js)
    }

    /// When `tick` should next be called, if at all
    #[wasm_bindgen(js_name = nextTickAt)]
    pub fn next_tick_at(&self) -> Option<f64> {
        self.editor.next_tick_at().map(|t| t as f64)
    }

    /// Switch to a named page size (A3, A4, A5, B5, Letter, Legal)
    #[wasm_bindgen(js_name = setPageSize)]
    pub fn set_page_size(&mut self, name: &str) -> Result<bool, JsValue> {
        let Some(size) = PageSize::preset(name) else {
            return Ok(false);
        };
        let options = PageOptions {
            size,
            ..self.editor.page_options()
        };
        self.editor.set_page_options(options).map_err(to_js)?;
        Ok(true)
    }

    /// Replace the page options with JSON
    #[wasm_bindgen(js_name = setPageOptions)]
    pub fn set_page_options(&mut self, options_json: &str) -> Result<(), JsValue> {
        let options: PageOptions = serde_json::from_str(options_json).map_err(|e| to_js(e.into()))?;
        self.editor.set_page_options(options).map_err(to_js)
    }

    /// Get the document as JSON
    #[wasm_bindgen(js_name = getDocument)]
    pub fn get_document(&self) -> Result<String, JsValue> {
        self.editor.doc().to_json().map_err(to_js)
    }

    /// Get page count
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.editor.page_count()
    }

    /// Get pagination status (returns JSON)
    #[wasm_bindgen(js_name = getPaginationInfo)]
    pub fn get_pagination_info(&self) -> String {
        let pagination = self.editor.pagination();
        let info = PaginationInfo {
            page_count: self.editor.page_count(),
            body_height: self.options.borrow().current_page_options().body_height(),
            recorded_body_height: pagination.recorded_body_height,
            run_enabled: pagination.run_enabled,
            composition_active: pagination.composition_active,
            can_undo: self.editor.history().can_undo(),
            can_redo: self.editor.history().can_redo(),
        };
        serde_json::to_string(&info).unwrap_or_default()
    }
}

/// Serializable pagination status for JS
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page_count: usize,
    pub body_height: f32,
    pub recorded_body_height: f32,
    pub run_enabled: bool,
    pub composition_active: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

fn to_js(err: EditorError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
