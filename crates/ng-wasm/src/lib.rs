//! WASM bridge for the node graph editor.
//!
//! Compiled via `wasm-pack build --target web`. The host forwards DOM
//! events in canvas pixels and paints through [`NodeGraphCanvas::render`];
//! hosts that render their own DOM can read the graph back as JSON instead.

mod logger;
mod render2d;

use ng_core::NodeId;
use ng_core::geometry::Point;
use ng_core::record::NodeRecord;
use ng_editor::{
    Editor, EditorConfig, InputEvent, MenuAction, Modifiers, PointerButton, Response, Viewport,
};
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The WASM-facing editor controller.
///
/// All interaction from JS goes through this struct.
#[wasm_bindgen]
pub struct NodeGraphCanvas {
    editor: Editor,
    width: f64,
    height: f64,
    /// `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl NodeGraphCanvas {
    /// Create an editor with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        Self::build(width, height, EditorConfig::default())
    }

    /// Create an editor from a JSON settings object. Missing keys take
    /// their defaults.
    pub fn with_config(
        width: f64,
        height: f64,
        config_json: &str,
    ) -> Result<NodeGraphCanvas, JsValue> {
        let config = EditorConfig::from_json(config_json).map_err(to_js)?;
        Ok(Self::build(width, height, config))
    }

    fn build(width: f64, height: f64, config: EditorConfig) -> Self {
        logger::init(log::LevelFilter::Warn);
        log::info!("node graph editor {width}x{height}");
        Self {
            editor: Editor::new(config),
            width,
            height,
            dark_mode: false,
        }
    }

    /// Render the current frame to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        render2d::render_scene(
            ctx,
            &self.editor.scene(),
            self.editor.viewport(),
            self.width,
            self.height,
            &theme,
        );
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Advance eased node movement by one frame. Keep calling from
    /// `requestAnimationFrame` while this returns `true`.
    pub fn tick(&mut self) -> bool {
        self.editor.tick()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// `button` is the DOM `MouseEvent.button` code. Returns a response
    /// object as JSON: `{"redraw":bool,"animate":bool,"action":string|null}`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(button) = PointerButton::from_dom(button) else {
            return response_json(Response::NONE);
        };
        self.dispatch(InputEvent::PointerDown {
            x,
            y,
            button,
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::PointerMove { x, y })
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::PointerUp { x, y })
    }

    pub fn handle_click(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::Click { x, y })
    }

    pub fn handle_wheel(&mut self, x: f32, y: f32, delta_y: f32) -> String {
        self.dispatch(InputEvent::Wheel { x, y, delta_y })
    }

    /// The host should `preventDefault()` the browser menu before calling.
    pub fn handle_context_menu(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::ContextMenu { x, y })
    }

    /// `key` is `KeyboardEvent.key`. A non-null `action` in the response
    /// names a clipboard operation the host must perform (`copy`, `cut`,
    /// `paste`) using [`copy_selection`](Self::copy_selection) and friends.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        self.dispatch(InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    /// Run a context-menu item by name (`"add_node"` or `"delete"`).
    pub fn activate_menu_item(&mut self, name: &str) -> bool {
        let action = match name {
            "add_node" => MenuAction::AddNode,
            "delete" => MenuAction::Delete,
            _ => return false,
        };
        self.editor.activate_menu(action).redraw
    }

    fn dispatch(&mut self, event: InputEvent) -> String {
        response_json(self.editor.handle(&event))
    }

    // ─── Graph editing ───────────────────────────────────────────────────

    /// Add a node described by a node record (`type`, `x`, `y`, optional
    /// `fields`, `data`, `ports`). Returns the new node's id.
    pub fn add_node_json(&mut self, record_json: &str) -> Result<f64, JsValue> {
        let record: NodeRecord = serde_json::from_str(record_json).map_err(to_js)?;
        let node = record.instantiate(self.editor.registry()).map_err(to_js)?;
        let id = self.editor.add_node(node).map_err(to_js)?;
        Ok(id.raw() as f64)
    }

    pub fn remove_node(&mut self, id: f64) -> bool {
        self.editor.remove_node(node_id(id)).is_some()
    }

    /// Connect `from`'s output to `to`'s input. `false` when refused.
    pub fn connect(&mut self, from: f64, to: f64) -> Result<bool, JsValue> {
        self.editor.connect(node_id(from), node_id(to)).map_err(to_js)
    }

    pub fn disconnect(&mut self, from: f64, to: f64) -> bool {
        self.editor.disconnect(node_id(from), node_id(to))
    }

    /// Write a field value coming from a host form control.
    pub fn set_field_value(&mut self, id: f64, key: &str, value_json: &str) -> Result<(), JsValue> {
        let value: serde_json::Value = serde_json::from_str(value_json).map_err(to_js)?;
        self.editor
            .set_field_value(node_id(id), key, &value)
            .map_err(to_js)
    }

    /// Move a node immediately, without easing.
    pub fn place_node(&mut self, id: f64, x: f32, y: f32) {
        self.editor.place_node(node_id(id), Point::new(x, y));
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_all(&mut self) -> bool {
        self.editor.select_all()
    }

    pub fn clear_selection(&mut self) -> bool {
        self.editor.clear_selection()
    }

    /// Selected node ids as a JSON array.
    pub fn get_selected_ids(&self) -> String {
        let ids: Vec<u64> = self.editor.selection().iter().map(|id| id.raw()).collect();
        json!(ids).to_string()
    }

    /// Remove every selected node. Returns how many were removed.
    pub fn delete_selected(&mut self) -> u32 {
        self.editor.delete_selection() as u32
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Selection as clipboard JSON, or `undefined` when nothing is selected.
    pub fn copy_selection(&self) -> Option<String> {
        self.editor.copy_selection()
    }

    pub fn cut_selection(&mut self) -> Option<String> {
        self.editor.cut_selection()
    }

    /// Paste clipboard JSON at the last pointer position. Text that is not
    /// a graph record is ignored.
    pub fn paste(&mut self, text: &str) -> bool {
        self.editor.paste(text)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn export_json(&self) -> Result<String, JsValue> {
        self.editor.export_json().map_err(to_js)
    }

    /// Replace the graph with a serialized one. On error the current graph
    /// is kept.
    pub fn import_json(&mut self, text: &str) -> Result<(), JsValue> {
        self.editor.import_json(text).map_err(to_js)
    }

    /// Compact binary snapshot for host-side storage.
    pub fn snapshot(&self) -> Result<Vec<u8>, JsValue> {
        self.editor.snapshot().map_err(to_js)
    }

    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.editor.restore(bytes).map_err(to_js)
    }

    // ─── Host queries ────────────────────────────────────────────────────

    /// Events queued since the last call, as a JSON array.
    pub fn drain_events_json(&mut self) -> String {
        serde_json::to_string(&self.editor.drain_events()).unwrap_or_else(|_| "[]".to_string())
    }

    /// `[{"from":id,"to":id,"d":"M ..."}]` for SVG hosts.
    pub fn connection_paths_json(&self) -> String {
        let paths: Vec<_> = self
            .editor
            .connection_paths()
            .into_iter()
            .map(|(from, to, d)| json!({ "from": from, "to": to, "d": d }))
            .collect();
        json!(paths).to_string()
    }

    /// `{"tx","ty","scale"}` so DOM hosts can apply the same CSS transform.
    pub fn viewport_json(&self) -> String {
        let vp = self.editor.viewport();
        json!({ "tx": vp.tx, "ty": vp.ty, "scale": vp.scale }).to_string()
    }

    pub fn set_viewport(&mut self, tx: f32, ty: f32, scale: f32) {
        let cfg = self.editor.config();
        let scale = scale.clamp(cfg.min_scale, cfg.max_scale);
        self.editor.set_viewport(Viewport { tx, ty, scale });
    }
}

/// Change console verbosity (`"error"` .. `"trace"`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logger::init(log::LevelFilter::Warn);
    log::set_max_level(logger::parse_level(level));
}

fn node_id(raw: f64) -> NodeId {
    NodeId::from_raw(raw as u64)
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn response_json(r: Response) -> String {
    json!({
        "redraw": r.redraw,
        "animate": r.animate,
        "action": r.host_action.map(|a| a.name()),
    })
    .to_string()
}
