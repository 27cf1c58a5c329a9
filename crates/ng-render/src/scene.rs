//! Graph → backend-neutral draw commands.
//!
//! Commands are emitted back to front. Everything is in world coordinates
//! except [`DrawCmd::Grid`] and [`DrawCmd::Menu`], which are screen-space;
//! a backend applies the view transform to the rest.

use ng_core::field::FieldControl;
use ng_core::geometry::{BezierPath, Point, Rect};
use ng_core::port::{PortDirection, PortRef};
use ng_core::{NodeGraph, NodeId};

/// Background grid placement, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStyle {
    /// Cell size after zoom.
    pub size: f32,
    pub offset: Point,
}

/// An open context menu, anchored in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub origin: Point,
    /// `(label, shortcut hint)` per item.
    pub items: Vec<(String, Option<String>)>,
}

/// Editor-side overlays drawn on top of the graph.
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    pub grid: Option<GridStyle>,
    pub selection_bounds: Option<Rect>,
    pub marquee: Option<Rect>,
    /// Wire following the pointer while a connection is being drawn.
    pub preview: Option<BezierPath>,
    pub menu: Option<MenuView>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Grid(GridStyle),
    Wire {
        path: BezierPath,
        preview: bool,
    },
    NodeBox {
        id: NodeId,
        rect: Rect,
        title: String,
        header_height: f32,
        active: bool,
        disabled: bool,
    },
    FieldRow {
        node: NodeId,
        index: usize,
        rect: Rect,
        control: FieldControl,
    },
    Port {
        port: PortRef,
        center: Point,
        radius: f32,
        connected: bool,
    },
    SelectionBounds(Rect),
    Marquee(Rect),
    Menu(MenuView),
}

pub type DrawList = Vec<DrawCmd>;

/// Build the full frame for `graph` plus the editor overlays.
pub fn build_scene(graph: &NodeGraph, state: &SceneState) -> DrawList {
    let metrics = &graph.metrics;
    let mut out = DrawList::new();

    if let Some(grid) = state.grid {
        out.push(DrawCmd::Grid(grid));
    }

    for (_, conn) in graph.connections() {
        out.push(DrawCmd::Wire {
            path: conn.path,
            preview: false,
        });
    }

    for node in graph.nodes() {
        out.push(DrawCmd::NodeBox {
            id: node.id,
            rect: metrics.bounds(node),
            title: node.node_type.as_str().to_string(),
            header_height: metrics.header_height,
            active: node.active,
            disabled: node.disabled,
        });
        for (index, (field, rect)) in node
            .fields()
            .iter()
            .zip(metrics.field_rows(node))
            .enumerate()
        {
            out.push(DrawCmd::FieldRow {
                node: node.id,
                index,
                rect,
                control: field.render(),
            });
        }
        for direction in [PortDirection::Input, PortDirection::Output] {
            out.push(DrawCmd::Port {
                port: PortRef {
                    node: node.id,
                    direction,
                },
                center: metrics.port_center(node, direction),
                radius: metrics.port_radius,
                connected: node.port(direction).connection_count() > 0,
            });
        }
    }

    if let Some(path) = state.preview {
        out.push(DrawCmd::Wire {
            path,
            preview: true,
        });
    }
    if let Some(rect) = state.selection_bounds {
        out.push(DrawCmd::SelectionBounds(rect));
    }
    if let Some(rect) = state.marquee {
        out.push(DrawCmd::Marquee(rect));
    }
    if let Some(menu) = &state.menu {
        out.push(DrawCmd::Menu(menu.clone()));
    }

    log::trace!("scene: {} commands", out.len());
    out
}
