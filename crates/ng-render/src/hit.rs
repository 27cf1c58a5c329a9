//! Hit testing: world point → editor target.
//!
//! Targets are resolved in a fixed priority order: ports, field rows, node
//! bodies (topmost first), the selection bounding box, connection wires,
//! and finally the background. Nodes are painted in insertion order, so
//! the last node is the topmost one.

use kurbo::{CubicBez, ParamCurveNearest};
use ng_core::geometry::{BezierPath, Point, Rect};
use ng_core::port::{PortDirection, PortRef};
use ng_core::{EdgeIndex, NodeGraph, NodeId};

/// Curve-distance accuracy passed to kurbo's nearest-point solver.
const NEAREST_ACCURACY: f64 = 1e-3;

/// What sits under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Port(PortRef),
    Field { node: NodeId, index: usize },
    Node(NodeId),
    SelectionBounds,
    Connection(EdgeIndex),
    Background,
}

impl HitTarget {
    /// The node this target belongs to, if any.
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            HitTarget::Port(p) => Some(p.node),
            HitTarget::Field { node, .. } | HitTarget::Node(node) => Some(node),
            _ => None,
        }
    }
}

/// Find what is at world position `p`.
///
/// `selection_bounds` is the padded box around a multi-node selection, if
/// one is shown. `wire_tolerance` is the maximum world distance from a
/// connection curve that still counts as a hit.
pub fn hit_test(
    graph: &NodeGraph,
    p: Point,
    selection_bounds: Option<Rect>,
    wire_tolerance: f32,
) -> HitTarget {
    let metrics = &graph.metrics;
    let mut topmost_first: Vec<_> = graph.nodes().collect();
    topmost_first.reverse();

    // Ports stick out past the node edge, so they are checked before bodies.
    let r2 = metrics.port_radius * metrics.port_radius;
    for node in &topmost_first {
        for direction in [PortDirection::Input, PortDirection::Output] {
            let c = metrics.port_center(node, direction);
            let (dx, dy) = (p.x - c.x, p.y - c.y);
            if dx * dx + dy * dy <= r2 {
                return HitTarget::Port(PortRef {
                    node: node.id,
                    direction,
                });
            }
        }
    }

    for node in &topmost_first {
        if !metrics.bounds(node).contains(p) {
            continue;
        }
        if let Some(index) = metrics.field_rows(node).iter().position(|row| row.contains(p)) {
            return HitTarget::Field {
                node: node.id,
                index,
            };
        }
        return HitTarget::Node(node.id);
    }

    // Wires inside the selection box stay clickable; the box only covers
    // empty background.
    if let Some(edge) = nearest_connection(graph, p, wire_tolerance) {
        return HitTarget::Connection(edge);
    }

    if let Some(bounds) = selection_bounds
        && bounds.contains(p)
    {
        return HitTarget::SelectionBounds;
    }

    HitTarget::Background
}

/// Nodes whose whole rectangle lies inside `rect`, in insertion order.
/// Partial overlap does not count.
pub fn hit_test_rect(graph: &NodeGraph, rect: Rect) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| rect.contains_rect(&graph.metrics.bounds(n)))
        .map(|n| n.id)
        .collect()
}

/// Distance from `p` to a connection curve.
pub fn distance_to_path(path: &BezierPath, p: Point) -> f32 {
    let curve = to_cubic(path);
    let nearest = curve.nearest(kurbo::Point::new(p.x as f64, p.y as f64), NEAREST_ACCURACY);
    nearest.distance_sq.sqrt() as f32
}

fn nearest_connection(graph: &NodeGraph, p: Point, tolerance: f32) -> Option<EdgeIndex> {
    graph
        .connections()
        .map(|(edge, conn)| (edge, distance_to_path(&conn.path, p)))
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(edge, _)| edge)
}

fn to_cubic(path: &BezierPath) -> CubicBez {
    let pt = |p: Point| kurbo::Point::new(p.x as f64, p.y as f64);
    CubicBez::new(pt(path.from), pt(path.c1), pt(path.c2), pt(path.to))
}
