//! The editor coordinator.
//!
//! Owns the graph and every interaction subsystem, routes each
//! [`InputEvent`] to the one that handles it, and queues [`EditorEvent`]s
//! for the host. All positions arriving from the host are screen pixels.
//!
//! A click runs these steps in order, each seeing the previous one's
//! changes: close the context menu (or activate the item under the
//! pointer), consume a pending drag's suppressed click, replace the
//! selection with the clicked node, fire button fields, then drive the
//! connection gesture.

use crate::animation::Animator;
use crate::clipboard;
use crate::config::EditorConfig;
use crate::connect::{ConnectGesture, ConnectState};
use crate::gesture::{Gesture, MoveGesture, PanGesture, RectSelect};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::menu::{ContextMenu, MenuAction, MenuTarget, OpenMenu};
use crate::selection::Selection;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::viewport::Viewport;
use ng_core::field::FieldValue;
use ng_core::geometry::Point;
use ng_core::model::Node;
use ng_core::port::{PortDirection, PortRef};
use ng_core::record::GraphRecord;
use ng_core::{FieldRegistry, GraphError, NodeGraph, NodeId};
use ng_render::{DrawList, HitTarget, SceneState, build_scene, hit_test, hit_test_rect};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    NodeAdded {
        id: NodeId,
    },
    NodeRemoved {
        id: NodeId,
    },
    Connected {
        from: NodeId,
        to: NodeId,
    },
    Disconnected {
        from: NodeId,
        to: NodeId,
    },
    SelectionChanged {
        ids: Vec<NodeId>,
    },
    ButtonPressed {
        node: NodeId,
        label: String,
        action: Option<String>,
    },
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Response {
    /// Something visible changed.
    pub redraw: bool,
    /// Nodes are easing; call [`Editor::tick`] every frame until it
    /// returns `false`.
    pub animate: bool,
    /// A clipboard shortcut the host must service.
    pub host_action: Option<ShortcutAction>,
}

impl Response {
    pub const NONE: Response = Response {
        redraw: false,
        animate: false,
        host_action: None,
    };

    pub const REDRAW: Response = Response {
        redraw: true,
        animate: false,
        host_action: None,
    };

    fn redraw_if(changed: bool) -> Self {
        if changed { Self::REDRAW } else { Self::NONE }
    }
}

pub struct Editor {
    graph: NodeGraph,
    viewport: Viewport,
    selection: Selection,
    animator: Animator,
    gesture: Gesture,
    connect: ConnectGesture,
    menu: ContextMenu,
    config: EditorConfig,
    registry: FieldRegistry,
    events: VecDeque<EditorEvent>,
    /// Last known pointer position, in world space.
    cursor: Point,
    /// Set when a drag ended; swallows the click that follows it.
    suppress_click: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            graph: NodeGraph::with_metrics(config.metrics),
            viewport: Viewport::default(),
            selection: Selection::new(),
            animator: Animator::new(),
            gesture: Gesture::Idle,
            connect: ConnectGesture::default(),
            menu: ContextMenu::default(),
            config,
            registry: FieldRegistry::with_builtins(),
            events: VecDeque::new(),
            cursor: Point::ZERO,
            suppress_click: false,
        }
    }

    /// Use a registry with additional field types for paste and import.
    pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = registry;
        self
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn selection(&self) -> &[NodeId] {
        self.selection.ids()
    }

    pub fn connect_state(&self) -> ConnectState {
        self.connect.state()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn menu(&self) -> Option<&OpenMenu> {
        self.menu.current()
    }

    pub fn cursor_world(&self) -> Point {
        self.cursor
    }

    /// Move the paste anchor without a pointer event.
    pub fn set_cursor_world(&mut self, p: Point) {
        self.cursor = p;
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    // ─── Graph editing ───────────────────────────────────────────────────

    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let id = self.graph.add_node(node)?;
        self.events.push_back(EditorEvent::NodeAdded { id });
        self.rehighlight();
        Ok(id)
    }

    /// Remove a node, tearing down its connections first.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        if !self.graph.contains(id) {
            return None;
        }
        for edge in self.graph.connections_of(id) {
            if let Some(conn) = self.graph.remove_connection(edge) {
                self.events.push_back(EditorEvent::Disconnected {
                    from: conn.from,
                    to: conn.to,
                });
            }
        }
        if self.selection.forget(id) {
            self.emit_selection();
        }
        self.animator.forget(id);
        self.connect.forget(&mut self.graph, id);
        let node = self.graph.remove_node(id)?;
        self.events.push_back(EditorEvent::NodeRemoved { id });
        self.rehighlight();
        Some(node)
    }

    /// Connect `from`'s output to `to`'s input. Returns `false` when the
    /// ports refuse the pairing.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<bool, GraphError> {
        let made = self.graph.connect(from, to)?.is_some();
        if made {
            self.events.push_back(EditorEvent::Connected { from, to });
            self.rehighlight();
        }
        Ok(made)
    }

    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> bool {
        let removed = self.graph.disconnect(from, to);
        if removed {
            self.events.push_back(EditorEvent::Disconnected { from, to });
            self.rehighlight();
        }
        removed
    }

    /// Write a field value coming from the host's form control.
    pub fn set_field_value(
        &mut self,
        node: NodeId,
        key: &str,
        value: &FieldValue,
    ) -> Result<(), GraphError> {
        let target = self.graph.node_mut(node).ok_or(GraphError::Detached(node))?;
        target.set_value(key, value)?;
        Ok(())
    }

    /// Move a node immediately, without easing.
    pub fn place_node(&mut self, id: NodeId, p: Point) {
        self.animator.forget(id);
        if let Some(node) = self.graph.node_mut(id) {
            node.animating = false;
        }
        self.graph.place(id, p);
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: NodeId) -> bool {
        let changed = self.selection.add(&mut self.graph, Some(id));
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn deselect(&mut self, id: NodeId) -> bool {
        let changed = self.selection.remove(&mut self.graph, id);
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear(&mut self.graph);
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn set_selection(&mut self, ids: &[NodeId]) -> bool {
        let changed = self.selection.set(&mut self.graph, ids);
        if changed {
            self.emit_selection();
        }
        changed
    }

    pub fn select_all(&mut self) -> bool {
        let ids = self.graph.node_ids().to_vec();
        self.set_selection(&ids)
    }

    /// Remove every selected node. Returns how many were removed.
    pub fn delete_selection(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        ids.into_iter()
            .filter(|id| self.remove_node(*id).is_some())
            .count()
    }

    fn emit_selection(&mut self) {
        self.events.push_back(EditorEvent::SelectionChanged {
            ids: self.selection.ids().to_vec(),
        });
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// The selected sub-graph as clipboard text, or `None` with nothing
    /// selected.
    pub fn copy_selection(&self) -> Option<String> {
        if self.selection.is_empty() {
            return None;
        }
        match clipboard::encode(&self.graph, self.selection.ids()) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("copy failed: {e}");
                None
            }
        }
    }

    /// Copy, then delete the selection.
    pub fn cut_selection(&mut self) -> Option<String> {
        let text = self.copy_selection()?;
        self.delete_selection();
        Some(text)
    }

    /// Paste clipboard text centered on the cursor. The pasted nodes become
    /// the selection. Text that is not a sub-graph document is ignored and
    /// `false` is returned; nothing changes in that case.
    pub fn paste(&mut self, text: &str) -> bool {
        let Some(record) = clipboard::decode(text) else {
            return false;
        };
        let ids = match record.instantiate_into(&mut self.graph, &self.registry, Some(self.cursor)) {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("paste rejected: {e}");
                return false;
            }
        };
        self.announce(&ids);
        self.set_selection(&ids);
        self.rehighlight();
        log::debug!("pasted {} nodes", ids.len());
        true
    }

    // ─── Whole-graph import / export ─────────────────────────────────────

    pub fn export_record(&self) -> GraphRecord {
        let mut record = GraphRecord::capture(&self.graph, |_| true);
        record.viewport = Some(self.viewport.to_record());
        record
    }

    pub fn export_json(&self) -> Result<String, GraphError> {
        self.export_record().to_json()
    }

    /// Compact binary snapshot of the same document.
    pub fn snapshot(&self) -> Result<Vec<u8>, GraphError> {
        self.export_record().to_msgpack()
    }

    pub fn import_json(&mut self, text: &str) -> Result<(), GraphError> {
        let record = GraphRecord::from_json(text)?;
        self.load(&record)
    }

    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), GraphError> {
        let record = GraphRecord::from_msgpack(bytes)?;
        self.load(&record)
    }

    /// Replace the whole graph. Nodes get fresh ids. On error the current
    /// graph is left as it was.
    pub fn load(&mut self, record: &GraphRecord) -> Result<(), GraphError> {
        let mut fresh = NodeGraph::with_metrics(self.config.metrics);
        let ids = record.instantiate_into(&mut fresh, &self.registry, None)?;

        let old_wires: Vec<_> = self.graph.connections().map(|(_, c)| (c.from, c.to)).collect();
        for (from, to) in old_wires {
            self.events.push_back(EditorEvent::Disconnected { from, to });
        }
        for id in self.graph.node_ids().to_vec() {
            self.events.push_back(EditorEvent::NodeRemoved { id });
        }
        if !self.selection.is_empty() {
            self.selection = Selection::new();
            self.emit_selection();
        }
        self.graph = fresh;
        self.animator.clear();
        self.connect = ConnectGesture::default();
        self.gesture = Gesture::Idle;
        self.menu.close();
        self.suppress_click = false;
        if let Some(vp) = &record.viewport {
            self.viewport = Viewport::from_record(vp, &self.config);
        }
        self.announce(&ids);
        log::debug!("loaded graph with {} nodes", ids.len());
        Ok(())
    }

    /// Queue added/connected events for freshly inserted nodes.
    fn announce(&mut self, ids: &[NodeId]) {
        let set: HashSet<NodeId> = ids.iter().copied().collect();
        for id in ids {
            self.events.push_back(EditorEvent::NodeAdded { id: *id });
        }
        let conns: Vec<_> = self
            .graph
            .connections()
            .filter(|(_, c)| set.contains(&c.from) && set.contains(&c.to))
            .map(|(_, c)| (c.from, c.to))
            .collect();
        for (from, to) in conns {
            self.events.push_back(EditorEvent::Connected { from, to });
        }
    }

    // ─── Frame ───────────────────────────────────────────────────────────

    /// Advance eased movement by one frame. Returns `true` while more
    /// frames are needed.
    pub fn tick(&mut self) -> bool {
        self.animator
            .tick(&mut self.graph, self.config.ease_factor, self.config.settle_epsilon)
    }

    pub fn hit(&self, world: Point) -> HitTarget {
        hit_test(
            &self.graph,
            world,
            self.selection.bounds(&self.graph, self.config.selection_padding),
            self.config.wire_hit_tolerance / self.viewport.scale,
        )
    }

    pub fn scene(&self) -> DrawList {
        let marquee = match &self.gesture {
            Gesture::RectSelect(rs) => Some(self.viewport.screen_rect_to_world(rs.rect())),
            _ => None,
        };
        let state = SceneState {
            grid: Some(self.viewport.grid(self.config.grid_size)),
            selection_bounds: self
                .selection
                .bounds(&self.graph, self.config.selection_padding),
            marquee,
            preview: self.connect.preview(&self.graph, self.cursor),
            menu: self.menu.view(),
        };
        build_scene(&self.graph, &state)
    }

    /// SVG path data per connection, for DOM hosts.
    pub fn connection_paths(&self) -> Vec<(NodeId, NodeId, String)> {
        self.graph
            .connections()
            .map(|(_, c)| (c.from, c.to, c.path_data()))
            .collect()
    }

    // ─── Input routing ───────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) -> Response {
        match event {
            InputEvent::PointerDown { x, y, button, .. } => {
                self.pointer_down(Point::new(*x, *y), *button)
            }
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::Click { x, y } => self.click(Point::new(*x, *y)),
            InputEvent::Wheel { x, y, delta_y } => {
                let changed = self
                    .viewport
                    .zoom_at(Point::new(*x, *y), *delta_y, &self.config);
                Response::redraw_if(changed)
            }
            InputEvent::ContextMenu { x, y } => self.context_menu(Point::new(*x, *y)),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers),
        }
    }

    fn pointer_down(&mut self, screen: Point, button: PointerButton) -> Response {
        let world = self.viewport.screen_to_world(screen);
        self.cursor = world;
        let target = self.hit(world);
        log::trace!("pointer down {button:?} on {target:?}");

        if button == self.config.pan_button && target == HitTarget::Background {
            self.gesture = Gesture::Pan(PanGesture::start(screen));
            return Response::NONE;
        }
        if button != PointerButton::Primary {
            return Response::NONE;
        }

        match target {
            HitTarget::Node(id) => {
                self.select(id);
                self.gesture = Gesture::NodeDrag(MoveGesture::start(&self.graph, &[id], world, screen));
                Response::REDRAW
            }
            HitTarget::SelectionBounds => {
                let ids = self.selection.ids().to_vec();
                self.gesture = Gesture::BoundsDrag(MoveGesture::start(&self.graph, &ids, world, screen));
                Response::NONE
            }
            HitTarget::Background => {
                let threshold = self.config.drag_threshold;
                self.gesture = Gesture::RectSelect(RectSelect::start(screen, threshold));
                Response::NONE
            }
            _ => Response::NONE,
        }
    }

    fn pointer_move(&mut self, screen: Point) -> Response {
        let world = self.viewport.screen_to_world(screen);
        self.cursor = world;
        let mut response = Response::redraw_if(self.connect.is_armed());

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Pan(pan) => {
                pan.update(screen, &mut self.viewport);
                response.redraw = true;
            }
            Gesture::NodeDrag(drag) | Gesture::BoundsDrag(drag) => {
                drag.update(world, screen, &mut self.graph, &mut self.animator, &self.config);
                response.animate = self.animator.is_running();
                response.redraw |= response.animate;
            }
            Gesture::RectSelect(rs) => {
                rs.update(screen);
                response.redraw = true;
            }
        }
        response
    }

    fn pointer_up(&mut self, screen: Point) -> Response {
        match std::mem::take(&mut self.gesture) {
            Gesture::RectSelect(mut rs) => {
                rs.update(screen);
                if rs.moved() {
                    let rect = self.viewport.screen_rect_to_world(rs.rect());
                    let ids = hit_test_rect(&self.graph, rect);
                    self.set_selection(&ids);
                    self.suppress_click = true;
                }
                Response::REDRAW
            }
            Gesture::BoundsDrag(drag) => {
                if drag.moved() {
                    self.suppress_click = true;
                }
                Response::NONE
            }
            Gesture::NodeDrag(_) | Gesture::Pan(_) | Gesture::Idle => Response::NONE,
        }
    }

    fn click(&mut self, screen: Point) -> Response {
        if let Some(action) = self.menu.item_at(screen) {
            return self.activate_menu(action);
        }
        let mut redraw = self.menu.close();

        if std::mem::take(&mut self.suppress_click) {
            return Response::redraw_if(redraw);
        }

        let world = self.viewport.screen_to_world(screen);
        self.cursor = world;
        let target = self.hit(world);
        log::trace!("click on {target:?}");

        // Selection follows the clicked node body only.
        let selected: Vec<NodeId> = match target {
            HitTarget::Node(id) => vec![id],
            _ => Vec::new(),
        };
        redraw |= self.set_selection(&selected);

        if let HitTarget::Field { node, index } = target {
            self.press_field(node, index);
        }

        match target {
            HitTarget::Connection(edge) => {
                if let Some((from, to)) = self.connect.detach(&mut self.graph, edge) {
                    self.events.push_back(EditorEvent::Disconnected { from, to });
                }
                redraw = true;
            }
            HitTarget::Port(PortRef {
                node,
                direction: PortDirection::Output,
            }) => {
                redraw |= self.connect.arm(&mut self.graph, node);
            }
            HitTarget::Port(PortRef {
                node,
                direction: PortDirection::Input,
            }) => {
                let source = self.connect.source();
                match self.connect.commit(&mut self.graph, node) {
                    Ok(Some(_)) => {
                        if let Some(from) = source {
                            self.events.push_back(EditorEvent::Connected { from, to: node });
                        }
                        redraw = true;
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("connect failed: {e}"),
                }
            }
            _ if self.connect.is_armed() => {
                self.connect.cancel(&mut self.graph);
                redraw = true;
            }
            _ => {}
        }
        Response::redraw_if(redraw)
    }

    fn press_field(&mut self, node: NodeId, index: usize) {
        let Some(field) = self.graph.node(node).and_then(|n| n.fields().get(index)) else {
            return;
        };
        if field.key().is_some() {
            return;
        }
        self.events.push_back(EditorEvent::ButtonPressed {
            node,
            label: field.label().to_string(),
            action: field.action().map(str::to_string),
        });
    }

    fn context_menu(&mut self, screen: Point) -> Response {
        let world = self.viewport.screen_to_world(screen);
        self.cursor = world;
        let target = match self.hit(world) {
            HitTarget::Node(id) => MenuTarget::Node(id),
            _ => MenuTarget::Background,
        };
        self.menu.open(screen, world, target);
        Response::REDRAW
    }

    /// Run a context-menu item and close the menu.
    pub fn activate_menu(&mut self, action: MenuAction) -> Response {
        let Some(menu) = self.menu.current().cloned() else {
            return Response::NONE;
        };
        self.menu.close();
        match (action, menu.target) {
            (MenuAction::AddNode, _) => {
                let node = Node::new(&self.config.default_node_type, menu.world.x, menu.world.y);
                if let Err(e) = self.add_node(node) {
                    log::warn!("add node failed: {e}");
                }
            }
            (MenuAction::Delete, MenuTarget::Node(id)) => {
                self.remove_node(id);
            }
            (MenuAction::Delete, MenuTarget::Background) => {}
        }
        Response::REDRAW
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) -> Response {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return Response::NONE;
        };
        log::debug!("shortcut {}", action.name());
        match action {
            ShortcutAction::Delete => Response::redraw_if(self.delete_selection() > 0),
            ShortcutAction::Cancel => {
                let armed = self.connect.is_armed();
                if armed {
                    self.connect.cancel(&mut self.graph);
                }
                let closed = self.menu.close();
                Response::redraw_if(armed || closed)
            }
            ShortcutAction::SelectAll => Response::redraw_if(self.select_all()),
            ShortcutAction::Copy | ShortcutAction::Cut | ShortcutAction::Paste => Response {
                host_action: Some(action),
                ..Response::NONE
            },
        }
    }

    /// Keep the disabled hints current after the graph changed under an
    /// armed connection.
    fn rehighlight(&mut self) {
        if self.connect.is_armed() {
            self.connect.highlight(&mut self.graph);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_core::fields::{ButtonField, IntegerField};
    use ng_core::port::Port;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    fn drag(ed: &mut Editor, from: (f32, f32), to: (f32, f32)) {
        ed.handle(&down(from.0, from.1));
        ed.handle(&InputEvent::PointerMove { x: to.0, y: to.1 });
        ed.handle(&InputEvent::PointerUp { x: to.0, y: to.1 });
        ed.handle(&InputEvent::Click { x: to.0, y: to.1 });
    }

    fn click(ed: &mut Editor, x: f32, y: f32) -> Response {
        ed.handle(&InputEvent::Click { x, y })
    }

    fn two_nodes(ed: &mut Editor) -> (NodeId, NodeId) {
        let a = ed.add_node(Node::new("A", 0.0, 0.0)).unwrap();
        let b = ed.add_node(Node::new("B", 300.0, 0.0)).unwrap();
        (a, b)
    }

    #[test]
    fn click_selects_node_and_background_clears() {
        let mut ed = Editor::default();
        let (a, _) = two_nodes(&mut ed);
        click(&mut ed, 90.0, 10.0);
        assert_eq!(ed.selection(), &[a]);
        click(&mut ed, 600.0, 600.0);
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn rubber_band_selects_contained_and_survives_click() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        let c = ed.add_node(Node::new("C", 0.0, 300.0)).unwrap();
        drag(&mut ed, (-10.0, -10.0), (500.0, 100.0));
        assert_eq!(ed.selection(), &[a, b]);
        assert!(!ed.selection().contains(&c));
        // The next click is an ordinary one again.
        click(&mut ed, 600.0, 600.0);
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn bounds_drag_moves_every_selected_node() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        ed.set_selection(&[a, b]);
        // Between the two nodes, inside the padded bounds.
        ed.handle(&down(240.0, 10.0));
        assert!(matches!(ed.gesture(), Gesture::BoundsDrag(_)));
        let r = ed.handle(&InputEvent::PointerMove { x: 280.0, y: 70.0 });
        assert!(r.animate);
        ed.handle(&InputEvent::PointerUp { x: 280.0, y: 70.0 });
        assert!(ed.gesture().is_idle());
        click(&mut ed, 280.0, 70.0);
        assert_eq!(ed.selection(), &[a, b]);

        while ed.tick() {}
        let pa = ed.graph().node(a).unwrap().position();
        let pb = ed.graph().node(b).unwrap().position();
        assert!((pa.x - 40.0).abs() <= 0.5 && (pa.y - 60.0).abs() <= 0.5);
        assert!((pb.x - 340.0).abs() <= 0.5 && (pb.y - 60.0).abs() <= 0.5);
    }

    #[test]
    fn node_drag_eases_to_snapped_target() {
        let mut ed = Editor::default();
        let (a, _) = two_nodes(&mut ed);
        ed.handle(&down(10.0, 10.0));
        ed.handle(&InputEvent::PointerMove { x: 57.0, y: 31.0 });
        ed.handle(&InputEvent::PointerUp { x: 57.0, y: 31.0 });
        assert_eq!(ed.graph().node(a).unwrap().wish_pos, Point::new(40.0, 20.0));
        let mut frames = 0;
        while ed.tick() {
            frames += 1;
        }
        assert!(frames > 1);
    }

    #[test]
    fn pan_with_middle_button() {
        let mut ed = Editor::default();
        ed.handle(&InputEvent::PointerDown {
            x: 100.0,
            y: 100.0,
            button: PointerButton::Middle,
            modifiers: Modifiers::NONE,
        });
        ed.handle(&InputEvent::PointerMove { x: 130.0, y: 90.0 });
        ed.handle(&InputEvent::PointerUp { x: 130.0, y: 90.0 });
        assert_eq!((ed.viewport().tx, ed.viewport().ty), (30.0, -10.0));
        assert!(ed.gesture().is_idle());
    }

    #[test]
    fn connection_gesture_end_to_end() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        ed.drain_events();

        // Arm from A's output, commit on B's input.
        click(&mut ed, 180.0, 14.0);
        assert_eq!(ed.connect_state(), ConnectState::Armed(a));
        click(&mut ed, 300.0, 14.0);
        assert_eq!(ed.connect_state(), ConnectState::Idle);
        assert!(ed.graph().node(a).unwrap().output.connection_to(b).is_some());
        assert!(ed.drain_events().contains(&EditorEvent::Connected { from: a, to: b }));

        // Clicking the wire detaches it and re-arms from A.
        click(&mut ed, 240.0, 14.0);
        assert_eq!(ed.connect_state(), ConnectState::Armed(a));
        assert_eq!(ed.graph().connections().count(), 0);

        // Clicking the background cancels.
        click(&mut ed, 600.0, 600.0);
        assert_eq!(ed.connect_state(), ConnectState::Idle);
    }

    #[test]
    fn armed_preview_follows_pointer() {
        let mut ed = Editor::default();
        let (a, _) = two_nodes(&mut ed);
        ed.connect.arm(&mut ed.graph, a);
        let r = ed.handle(&InputEvent::PointerMove { x: 250.0, y: 90.0 });
        assert!(r.redraw);
        let preview = ed
            .scene()
            .into_iter()
            .find_map(|cmd| match cmd {
                ng_render::DrawCmd::Wire { path, preview: true } => Some(path),
                _ => None,
            })
            .unwrap();
        assert_eq!(preview.to, Point::new(250.0, 90.0));
    }

    #[test]
    fn delete_key_removes_selection_and_wires() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        ed.connect(a, b).unwrap();
        ed.select(a);
        let r = ed.handle(&InputEvent::Key {
            key: "Delete".into(),
            modifiers: Modifiers::NONE,
        });
        assert!(r.redraw);
        assert!(!ed.graph().contains(a));
        assert_eq!(ed.graph().node(b).unwrap().input.connection_count(), 0);
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn clipboard_keys_go_to_host() {
        let mut ed = Editor::default();
        let r = ed.handle(&InputEvent::Key {
            key: "v".into(),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        });
        assert_eq!(r.host_action, Some(ShortcutAction::Paste));
    }

    #[test]
    fn context_menu_add_and_delete() {
        let mut ed = Editor::default();
        let (a, _) = two_nodes(&mut ed);

        ed.handle(&InputEvent::ContextMenu { x: 90.0, y: 10.0 });
        assert_eq!(ed.menu().unwrap().items, vec![MenuAction::AddNode, MenuAction::Delete]);
        // Second item: Delete.
        click(&mut ed, 100.0, 40.0);
        assert!(!ed.graph().contains(a));
        assert!(ed.menu().is_none());

        ed.handle(&InputEvent::ContextMenu { x: 700.0, y: 500.0 });
        assert_eq!(ed.menu().unwrap().items, vec![MenuAction::AddNode]);
        ed.activate_menu(MenuAction::AddNode);
        let added = ed.graph().nodes().last().unwrap();
        assert_eq!(added.node_type.as_str(), "node");
        assert_eq!(added.position(), Point::new(700.0, 500.0));
    }

    #[test]
    fn any_click_closes_menu() {
        let mut ed = Editor::default();
        ed.handle(&InputEvent::ContextMenu { x: 10.0, y: 10.0 });
        assert!(click(&mut ed, 500.0, 500.0).redraw);
        assert!(ed.menu().is_none());
    }

    #[test]
    fn button_field_click_is_reported() {
        let mut ed = Editor::default();
        let id = ed
            .add_node(
                Node::new("A", 0.0, 0.0)
                    .with_field(IntegerField::new("Count"))
                    .with_field(ButtonField::new("Run").with_action("run")),
            )
            .unwrap();
        ed.drain_events();
        click(&mut ed, 90.0, 60.0);
        assert_eq!(
            ed.drain_events(),
            vec![EditorEvent::ButtonPressed {
                node: id,
                label: "Run".into(),
                action: Some("run".into()),
            }]
        );
        click(&mut ed, 90.0, 40.0);
        assert!(ed.drain_events().is_empty());
    }

    #[test]
    fn paste_centers_on_cursor_and_selects() {
        let mut ed = Editor::default();
        ed.handle(&InputEvent::PointerMove { x: 300.0, y: 300.0 });
        let text = r#"{"nodes":[{"id":5,"type":"A","x":0,"y":0,"ports":{"input":{"allow":[],"many":true},"output":{"many":true}}}],"connections":[]}"#;
        assert!(ed.paste(text));
        assert_eq!(ed.graph().len(), 1);
        let node = ed.graph().nodes().next().unwrap();
        assert_ne!(node.id.raw(), 5);
        assert_eq!(ed.graph().bounds(node.id).unwrap().center(), Point::new(300.0, 300.0));
        assert_eq!(ed.selection(), &[node.id]);
        assert!(node.input.many);
    }

    #[test]
    fn bad_paste_changes_nothing() {
        let mut ed = Editor::default();
        let (a, _) = two_nodes(&mut ed);
        ed.select(a);
        assert!(!ed.paste("not json"));
        assert!(!ed.paste(r#"{"nodes":[]}"#));
        assert!(!ed.paste(r#"{"nodes":[{"id":1,"type":"A","x":0,"y":0,"fields":[{"type":"nope","label":"x"}]}],"connections":[]}"#));
        assert_eq!(ed.graph().len(), 2);
        assert_eq!(ed.selection(), &[a]);
    }

    #[test]
    fn copy_paste_duplicates_subgraph() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        ed.connect(a, b).unwrap();
        ed.set_selection(&[a, b]);
        let text = ed.copy_selection().unwrap();
        ed.set_cursor_world(Point::new(1000.0, 1000.0));
        assert!(ed.paste(&text));
        assert_eq!(ed.graph().len(), 4);
        assert_eq!(ed.graph().connections().count(), 2);
        assert_eq!(ed.selection().len(), 2);
        assert!(!ed.selection().contains(&a));
    }

    #[test]
    fn cut_removes_selection() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        ed.select(b);
        let text = ed.cut_selection().unwrap();
        assert!(text.contains("\"B\""));
        assert_eq!(ed.graph().node_ids(), &[a]);
        assert_eq!(ed.copy_selection(), None);
    }

    #[test]
    fn import_replaces_graph_and_viewport() {
        let mut src = Editor::default();
        let a = src
            .add_node(Node::new("A", 0.0, 0.0).with_field(IntegerField::new("Count").with_default(2)))
            .unwrap();
        let b = src
            .add_node(Node::new("B", 300.0, 0.0).with_input(Port::input().with_allow(&["A"])))
            .unwrap();
        src.connect(a, b).unwrap();
        src.set_viewport(Viewport {
            tx: 12.0,
            ty: -4.0,
            scale: 1.5,
        });
        let text = src.export_json().unwrap();

        let mut dst = Editor::default();
        dst.add_node(Node::new("Old", 0.0, 0.0)).unwrap();
        dst.import_json(&text).unwrap();
        assert_eq!(dst.graph().len(), 2);
        assert_eq!(dst.graph().connections().count(), 1);
        assert_eq!(dst.viewport().scale, 1.5);
        let first = dst.graph().nodes().next().unwrap();
        assert_eq!(first.data()["count"], json!(2));
    }

    #[test]
    fn load_disconnects_old_wires_before_removing_nodes() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        ed.connect(a, b).unwrap();
        ed.drain_events();
        ed.import_json(r#"{"nodes":[],"connections":[]}"#).unwrap();
        assert_eq!(
            ed.drain_events(),
            vec![
                EditorEvent::Disconnected { from: a, to: b },
                EditorEvent::NodeRemoved { id: a },
                EditorEvent::NodeRemoved { id: b },
            ]
        );
    }

    #[test]
    fn wire_between_selected_nodes_can_be_detached() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        ed.connect(a, b).unwrap();
        ed.set_selection(&[a, b]);
        let (from, to) = {
            let (_, c) = ed.graph().connections().next().unwrap();
            (c.path.from, c.path.to)
        };
        let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
        assert_eq!(ed.hit(mid), HitTarget::Connection(ed.graph().connections().next().unwrap().0));
        click(&mut ed, mid.x, mid.y);
        assert_eq!(ed.graph().connections().count(), 0);
        assert_eq!(ed.connect_state(), ConnectState::Armed(a));
    }

    #[test]
    fn failed_import_keeps_current_graph() {
        let mut ed = Editor::default();
        two_nodes(&mut ed);
        assert!(ed.import_json("{").is_err());
        assert!(
            ed.import_json(r#"{"nodes":[{"id":1,"type":"A","x":0,"y":0,"fields":[{"type":"nope","label":"x"}]}],"connections":[]}"#)
                .is_err()
        );
        assert_eq!(ed.graph().len(), 2);
    }

    #[test]
    fn snapshot_restore() {
        let mut ed = Editor::default();
        let (a, b) = two_nodes(&mut ed);
        ed.connect(a, b).unwrap();
        let bytes = ed.snapshot().unwrap();
        let mut other = Editor::default();
        other.restore(&bytes).unwrap();
        assert_eq!(other.graph().len(), 2);
        assert_eq!(other.graph().connections().count(), 1);
    }

    #[test]
    fn deselect_reports_and_cursor_tracks_pointer() {
        let mut ed = Editor::default();
        let (a, _) = two_nodes(&mut ed);
        ed.select(a);
        ed.drain_events();
        assert!(ed.deselect(a));
        assert!(!ed.deselect(a));
        assert_eq!(ed.drain_events(), vec![EditorEvent::SelectionChanged { ids: vec![] }]);
        ed.handle(&InputEvent::PointerMove { x: 40.0, y: 60.0 });
        assert_eq!(ed.cursor_world(), Point::new(40.0, 60.0));
    }

    #[test]
    fn paste_uses_the_editor_registry() {
        let text = r#"{"nodes":[{"id":1,"type":"A","x":0,"y":0,"fields":[{"type":"text","label":"Name"}]}],"connections":[]}"#;
        let mut bare = Editor::default().with_registry(FieldRegistry::new());
        assert!(!bare.paste(text));
        let mut ed = Editor::default();
        assert!(ed.paste(text));
        assert_eq!(ed.graph().nodes().next().unwrap().data()["name"], json!(""));
    }

    #[test]
    fn wheel_zooms_toward_cursor() {
        let mut ed = Editor::default();
        let r = ed.handle(&InputEvent::Wheel {
            x: 100.0,
            y: 100.0,
            delta_y: -120.0,
        });
        assert!(r.redraw);
        assert_eq!(ed.viewport().scale, 1.2);
        let world = ed.viewport().screen_to_world(Point::new(100.0, 100.0));
        assert!((world.x - 100.0).abs() < 1e-3);
    }
}
