//! Core graph data model.
//!
//! Nodes live in a `StableDiGraph`; every edge is a [`Connection`] directed
//! from a node's output port to another node's input port. Both endpoint
//! ports index the edge by peer id, and [`NodeGraph::connect`] /
//! [`NodeGraph::remove_connection`] are the only paths that touch those
//! maps, so the two sides cannot drift apart.

use crate::error::{FieldError, GraphError};
use crate::field::{Field, FieldValue};
use crate::geometry::{BezierPath, Point, Rect, lerp};
use crate::id::{NodeId, NodeType};
use crate::layout::NodeMetrics;
use crate::port::{Candidate, Port, PortDirection, PortRef};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use serde_json::Map;
use std::collections::HashMap;

// ─── Node ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub x: f32,
    pub y: f32,
    /// Target position while easing toward a drag destination.
    pub wish_pos: Point,
    /// Registered with the animation scheduler.
    pub animating: bool,
    /// Selection marker.
    pub active: bool,
    /// Cannot accept the source of the connection currently being drawn.
    pub disabled: bool,
    pub input: Port,
    pub output: Port,
    fields: Vec<Box<dyn Field>>,
}

impl Node {
    /// A detached node with a fresh id and default ports.
    pub fn new(node_type: &str, x: f32, y: f32) -> Self {
        Self {
            id: NodeId::next(),
            node_type: NodeType::intern(node_type),
            x,
            y,
            wish_pos: Point::new(x, y),
            animating: false,
            active: false,
            disabled: false,
            input: Port::input(),
            output: Port::output(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: impl Field + 'static) -> Self {
        self.fields.push(Box::new(field));
        self
    }

    pub fn with_fields(mut self, fields: Vec<Box<dyn Field>>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_input(mut self, port: Port) -> Self {
        self.input = Port {
            direction: PortDirection::Input,
            ..port
        };
        self
    }

    pub fn with_output(mut self, port: Port) -> Self {
        self.output = Port {
            direction: PortDirection::Output,
            ..port
        };
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Jump to a position without easing.
    pub fn place(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
        self.wish_pos = p;
    }

    pub fn fields(&self) -> &[Box<dyn Field>] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&dyn Field> {
        self.fields
            .iter()
            .find(|f| f.key() == Some(key))
            .map(|f| f.as_ref())
    }

    /// Current value of every keyed field.
    pub fn data(&self) -> Map<String, FieldValue> {
        self.fields
            .iter()
            .filter_map(|f| Some((f.key()?.to_string(), f.value()?)))
            .collect()
    }

    pub fn set_value(&mut self, key: &str, value: &FieldValue) -> Result<(), FieldError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.key() == Some(key))
            .ok_or_else(|| FieldError::UnknownKey(key.to_string()))?;
        field.set_value(value)
    }

    pub fn port(&self, direction: PortDirection) -> &Port {
        match direction {
            PortDirection::Input => &self.input,
            PortDirection::Output => &self.output,
        }
    }

    fn port_mut(&mut self, direction: PortDirection) -> &mut Port {
        match direction {
            PortDirection::Input => &mut self.input,
            PortDirection::Output => &mut self.output,
        }
    }

    pub fn candidate(&self) -> Candidate {
        Candidate {
            node: self.id,
            node_type: self.node_type,
        }
    }

    /// One easing frame toward `wish_pos`. Returns `true` once both axes
    /// are within `epsilon`, clearing `animating`.
    pub fn ease_step(&mut self, factor: f32, epsilon: f32) -> bool {
        self.x = lerp(self.x, self.wish_pos.x, factor);
        self.y = lerp(self.y, self.wish_pos.y, factor);
        let settled = (self.x - self.wish_pos.x).abs() <= epsilon
            && (self.y - self.wish_pos.y).abs() <= epsilon;
        if settled {
            self.animating = false;
        }
        settled
    }
}

// ─── Connection ──────────────────────────────────────────────────────────

/// A directed edge from `from`'s output port to `to`'s input port.
#[derive(Debug, Clone)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    /// Rendered curve; refreshed whenever either endpoint moves.
    pub path: BezierPath,
}

impl Connection {
    pub fn from_port(&self) -> PortRef {
        PortRef::output(self.from)
    }

    pub fn to_port(&self) -> PortRef {
        PortRef::input(self.to)
    }

    /// SVG path data of the current curve.
    pub fn path_data(&self) -> String {
        self.path.to_svg_d()
    }
}

// ─── Graph ───────────────────────────────────────────────────────────────

/// All live nodes and the connections between them.
#[derive(Debug, Default)]
pub struct NodeGraph {
    pub graph: StableDiGraph<Node, Connection>,
    pub id_index: HashMap<NodeId, NodeIndex>,
    /// Insertion order of live nodes.
    order: Vec<NodeId>,
    pub metrics: NodeMetrics,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: NodeMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Attach a node. Its id must not already be live in this graph.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let id = node.id;
        if self.contains(id) {
            return Err(GraphError::DuplicateId(id));
        }
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        self.order.push(id);
        log::debug!("add node {id}");
        Ok(id)
    }

    /// Detach a node, tearing down all of its connections first.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let idx = *self.id_index.get(&id)?;
        for edge in self.connections_of(id) {
            self.remove_connection(edge);
        }
        self.id_index.remove(&id);
        self.order.retain(|n| *n != id);
        log::debug!("remove node {id}");
        self.graph.remove_node(idx)
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.id_index.clear();
        self.order.clear();
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let idx = *self.id_index.get(&id)?;
        self.graph.node_weight_mut(idx)
    }

    /// Live node ids in insertion order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Live nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(|id| self.node(*id))
    }

    pub fn port(&self, port: PortRef) -> Option<&Port> {
        self.node(port.node).map(|n| n.port(port.direction))
    }

    /// Whether `port` would accept a connection from `candidate`.
    ///
    /// With `None`, only checks whether the port has room for another
    /// connection (the test used before arming an output port).
    pub fn can_connect(&self, port: PortRef, candidate: Option<PortRef>) -> bool {
        let Some(node) = self.node(port.node) else {
            return false;
        };
        let candidate = match candidate {
            None => None,
            Some(c) if c.direction == port.direction => return false,
            Some(c) => match self.node(c.node) {
                Some(peer) => Some(peer.candidate()),
                None => return false,
            },
        };
        node.port(port.direction).can_connect(node.id, candidate)
    }

    /// Connect `from`'s output to `to`'s input.
    ///
    /// Returns `Ok(None)` when either port refuses the pairing; nothing is
    /// changed in that case.
    ///
    /// # Errors
    /// `GraphError::Detached` if either node is not in this graph.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<Option<EdgeIndex>, GraphError> {
        let from_idx = *self.id_index.get(&from).ok_or(GraphError::Detached(from))?;
        let to_idx = *self.id_index.get(&to).ok_or(GraphError::Detached(to))?;

        let out = PortRef::output(from);
        let inp = PortRef::input(to);
        if !self.can_connect(out, Some(inp)) || !self.can_connect(inp, Some(out)) {
            log::debug!("refused connection {from} -> {to}");
            return Ok(None);
        }

        let path = BezierPath::between(
            self.metrics.port_center(&self.graph[from_idx], PortDirection::Output),
            self.metrics.port_center(&self.graph[to_idx], PortDirection::Input),
        );
        let edge = self.graph.add_edge(from_idx, to_idx, Connection { from, to, path });
        self.graph[from_idx].output.connections.insert(to, edge);
        self.graph[to_idx].input.connections.insert(from, edge);
        log::debug!("connect {from} -> {to}");
        Ok(Some(edge))
    }

    /// Remove the connection `from -> to`, if any.
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> bool {
        let edge = self
            .node(from)
            .and_then(|n| n.output.connection_to(to));
        match edge {
            Some(edge) => self.remove_connection(edge).is_some(),
            None => false,
        }
    }

    /// Remove a connection and both ports' references to it.
    pub fn remove_connection(&mut self, edge: EdgeIndex) -> Option<Connection> {
        let conn = self.graph.remove_edge(edge)?;
        if let Some(n) = self.node_mut(conn.from) {
            n.port_mut(PortDirection::Output).connections.remove(&conn.to);
        }
        if let Some(n) = self.node_mut(conn.to) {
            n.port_mut(PortDirection::Input).connections.remove(&conn.from);
        }
        log::debug!("disconnect {} -> {}", conn.from, conn.to);
        Some(conn)
    }

    pub fn connection(&self, edge: EdgeIndex) -> Option<&Connection> {
        self.graph.edge_weight(edge)
    }

    pub fn connections(&self) -> impl Iterator<Item = (EdgeIndex, &Connection)> + '_ {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_weight(e).map(|c| (e, c)))
    }

    /// Every connection touching `id`, incoming and outgoing.
    pub fn connections_of(&self, id: NodeId) -> Vec<EdgeIndex> {
        match self.node(id) {
            Some(n) => n
                .input
                .connections
                .values()
                .chain(n.output.connections.values())
                .copied()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Recompute the curves of every connection touching `id`.
    pub fn refresh_paths(&mut self, id: NodeId) {
        for edge in self.connections_of(id) {
            let Some((from, to)) = self.connection(edge).map(|c| (c.from, c.to)) else {
                continue;
            };
            let (Some(a), Some(b)) = (
                self.port_center(PortRef::output(from)),
                self.port_center(PortRef::input(to)),
            ) else {
                continue;
            };
            if let Some(conn) = self.graph.edge_weight_mut(edge) {
                conn.path = BezierPath::between(a, b);
            }
        }
    }

    /// World-space center of a port.
    pub fn port_center(&self, port: PortRef) -> Option<Point> {
        self.node(port.node)
            .map(|n| self.metrics.port_center(n, port.direction))
    }

    /// World-space rectangle of a node.
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|n| self.metrics.bounds(n))
    }

    /// Move a node immediately (no easing) and redraw its connections.
    pub fn place(&mut self, id: NodeId, p: Point) {
        if let Some(n) = self.node_mut(id) {
            n.place(p);
            self.refresh_paths(id);
        }
    }
}
