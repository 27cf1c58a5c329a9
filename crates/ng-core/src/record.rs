//! Interchange records: the JSON document used for save/load and for the
//! clipboard, plus msgpack snapshots of the same shape.
//!
//! ```text
//! Graph   := { viewport?: {scale, tx, ty}, nodes: [NodeRec], connections: [ConnRec] }
//! NodeRec := { id, type, x, y, data, fields: [FieldRec], ports: { input, output } }
//! PortRec := { allow?: [string], many: bool }
//! ConnRec := { from: nodeId, to: nodeId }   // from.output -> to.input
//! ```
//!
//! Connections refer to nodes by id, never by object identity, so the same
//! ids can be re-resolved when the record is instantiated.

use crate::error::GraphError;
use crate::field::{FieldRecord, FieldRegistry};
use crate::geometry::{Point, Rect};
use crate::id::NodeId;
use crate::model::{Node, NodeGraph};
use crate::port::Port;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRecord {
    pub scale: f32,
    pub tx: f32,
    pub ty: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Absent in clipboard payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportRecord>,
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Identity within the record; only used to resolve connections.
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(deserialize_with = "coord")]
    pub x: i64,
    #[serde(deserialize_with = "coord")]
    pub y: i64,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
    #[serde(default)]
    pub ports: PortsRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortsRecord {
    pub input: PortRecord,
    pub output: PortRecord,
}

impl Default for PortsRecord {
    fn default() -> Self {
        Self {
            input: PortRecord::from_port(&Port::input()),
            output: PortRecord::from_port(&Port::output()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,
    pub many: bool,
}

impl PortRecord {
    pub fn from_port(port: &Port) -> Self {
        Self {
            allow: port.allow.iter().map(|t| t.as_str().to_string()).collect(),
            many: port.many,
        }
    }

    fn apply(&self, port: Port) -> Port {
        let allow: Vec<&str> = self.allow.iter().map(String::as_str).collect();
        port.with_many(self.many).with_allow(&allow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub from: u64,
    pub to: u64,
}

/// Positions are integers on the wire; accept floats from hand-written
/// documents and round them.
fn coord<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let v = f64::deserialize(deserializer)?;
    Ok(v.round() as i64)
}

impl NodeRecord {
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id.raw(),
            node_type: node.node_type.as_str().to_string(),
            x: node.x.round() as i64,
            y: node.y.round() as i64,
            data: node.data(),
            fields: node.fields().iter().map(|f| f.to_record()).collect(),
            ports: PortsRecord {
                input: PortRecord::from_port(&node.input),
                output: PortRecord::from_port(&node.output),
            },
        }
    }

    /// Build a detached node with a fresh id.
    ///
    /// Data values override field defaults; data keys without a matching
    /// field are ignored so the node's data keys always equal its field keys.
    pub fn instantiate(&self, registry: &FieldRegistry) -> Result<Node, GraphError> {
        let fields = registry.build_all(&self.fields)?;
        let mut node = Node::new(&self.node_type, self.x as f32, self.y as f32)
            .with_fields(fields)
            .with_input(self.ports.input.apply(Port::input()))
            .with_output(self.ports.output.apply(Port::output()));
        for (key, value) in &self.data {
            if node.field(key).is_some() {
                node.set_value(key, value)?;
            }
        }
        Ok(node)
    }
}

impl GraphRecord {
    /// Capture the nodes matching `keep` and every connection whose both
    /// endpoints are kept.
    pub fn capture(graph: &NodeGraph, keep: impl Fn(NodeId) -> bool) -> Self {
        let nodes: Vec<NodeRecord> = graph
            .nodes()
            .filter(|n| keep(n.id))
            .map(NodeRecord::from_node)
            .collect();
        let connections = graph
            .connections()
            .filter(|(_, c)| keep(c.from) && keep(c.to))
            .map(|(_, c)| ConnectionRecord {
                from: c.from.raw(),
                to: c.to.raw(),
            })
            .collect();
        Self {
            viewport: None,
            nodes,
            connections,
        }
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, GraphError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, GraphError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    /// Add the record's nodes and connections to `graph` under fresh ids.
    ///
    /// Every node is built before anything is inserted, so a bad field
    /// record leaves `graph` untouched. When `anchor` is given the group is
    /// translated so the center of its bounding box lands on it.
    /// Connections naming an id that is not in `nodes`, or refused by the
    /// ports, are skipped individually.
    ///
    /// Returns the new node ids in record order.
    pub fn instantiate_into(
        &self,
        graph: &mut NodeGraph,
        registry: &FieldRegistry,
        anchor: Option<Point>,
    ) -> Result<Vec<NodeId>, GraphError> {
        let mut built = self
            .nodes
            .iter()
            .map(|rec| Ok((rec.id, rec.instantiate(registry)?)))
            .collect::<Result<Vec<(u64, Node)>, GraphError>>()?;

        if let Some(anchor) = anchor
            && let Some(bbox) = Rect::union_all(built.iter().map(|(_, n)| graph.metrics.bounds(n)))
        {
            let center = bbox.center();
            let (dx, dy) = (anchor.x - center.x, anchor.y - center.y);
            for (_, node) in &mut built {
                let p = node.position().offset(dx, dy);
                node.place(p);
            }
        }

        let mut mapping: HashMap<u64, NodeId> = HashMap::with_capacity(built.len());
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(built.len());
        for (old, node) in built {
            if !seen.insert(old) {
                log::warn!("node id {old} appears twice in record; connections resolve to the last copy");
            }
            let id = graph.add_node(node)?;
            mapping.insert(old, id);
            ids.push(id);
        }

        for conn in &self.connections {
            let (Some(from), Some(to)) = (mapping.get(&conn.from), mapping.get(&conn.to)) else {
                log::debug!("dropping connection {} -> {}: endpoint not in record", conn.from, conn.to);
                continue;
            };
            graph.connect(*from, *to)?;
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{ButtonField, IntegerField, SelectField};
    use crate::port::PortRef;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> (NodeGraph, Vec<NodeId>) {
        let mut g = NodeGraph::new();
        let a = g
            .add_node(
                Node::new("Source", 10.4, 20.6)
                    .with_field(IntegerField::new("Count").with_default(3))
                    .with_field(ButtonField::new("Run")),
            )
            .unwrap();
        let b = g
            .add_node(
                Node::new("Sink", 300.0, 0.0)
                    .with_field(SelectField::new("Mode", &["fast", "slow"]))
                    .with_input(Port::input().with_allow(&["Source"])),
            )
            .unwrap();
        let c = g.add_node(Node::new("Other", 0.0, 200.0)).unwrap();
        g.connect(a, b).unwrap();
        (g, vec![a, b, c])
    }

    #[test]
    fn node_record_shape() {
        let (g, ids) = sample();
        let rec = NodeRecord::from_node(g.node(ids[0]).unwrap());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], json!(ids[0].raw()));
        assert_eq!(json["type"], json!("Source"));
        assert_eq!(json["x"], json!(10));
        assert_eq!(json["y"], json!(21));
        assert_eq!(json["data"], json!({"count": 3}));
        assert_eq!(json["ports"], json!({"input": {"many": false}, "output": {"many": true}}));
        assert_eq!(json["fields"][1], json!({"type": "button", "label": "Run", "inline": false}));
    }

    #[test]
    fn capture_drops_half_selected_connections() {
        let (g, ids) = sample();
        let both = GraphRecord::capture(&g, |id| id == ids[0] || id == ids[1]);
        assert_eq!(both.connections.len(), 1);
        let one = GraphRecord::capture(&g, |id| id == ids[0] || id == ids[2]);
        assert_eq!(one.nodes.len(), 2);
        assert!(one.connections.is_empty());
    }

    #[test]
    fn instantiate_remaps_ids_and_keeps_topology() {
        let (g, ids) = sample();
        let mut rec = GraphRecord::capture(&g, |_| true);
        rec.nodes[1].data.insert("mode".into(), json!("slow"));

        let mut fresh = NodeGraph::new();
        let new_ids = rec
            .instantiate_into(&mut fresh, &FieldRegistry::with_builtins(), None)
            .unwrap();
        assert_eq!(new_ids.len(), 3);
        assert!(new_ids.iter().all(|id| !ids.contains(id)));
        let sink = fresh.node(new_ids[1]).unwrap();
        assert_eq!(sink.data()["mode"], json!("slow"));
        assert_eq!(sink.input.allow.len(), 1);
        assert!(sink.input.connection_to(new_ids[0]).is_some());
        assert!(fresh.can_connect(PortRef::output(new_ids[2]), None));
    }

    #[test]
    fn unresolved_connection_is_skipped() {
        let text = r#"{"nodes":[{"id":1,"type":"A","x":0,"y":0}],"connections":[{"from":1,"to":99}]}"#;
        let rec = GraphRecord::from_json(text).unwrap();
        let mut g = NodeGraph::new();
        let ids = rec
            .instantiate_into(&mut g, &FieldRegistry::with_builtins(), None)
            .unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(g.connections().count(), 0);
    }

    #[test]
    fn unknown_field_type_leaves_graph_untouched() {
        let text = r#"{"nodes":[
            {"id":1,"type":"A","x":0,"y":0},
            {"id":2,"type":"B","x":0,"y":0,"fields":[{"type":"slider","label":"V"}]}
        ],"connections":[]}"#;
        let rec = GraphRecord::from_json(text).unwrap();
        let mut g = NodeGraph::new();
        assert!(rec.instantiate_into(&mut g, &FieldRegistry::with_builtins(), None).is_err());
        assert!(g.is_empty());
    }

    #[test]
    fn anchor_recenters_group() {
        let text = r#"{"nodes":[{"id":5,"type":"A","x":0,"y":0}],"connections":[]}"#;
        let rec = GraphRecord::from_json(text).unwrap();
        let mut g = NodeGraph::new();
        let ids = rec
            .instantiate_into(&mut g, &FieldRegistry::with_builtins(), Some(Point::new(300.0, 300.0)))
            .unwrap();
        let center = g.bounds(ids[0]).unwrap().center();
        assert_eq!(center, Point::new(300.0, 300.0));
    }

    #[test]
    fn float_positions_are_rounded() {
        let rec: NodeRecord =
            serde_json::from_str(r#"{"id":1,"type":"A","x":10.6,"y":-3.2}"#).unwrap();
        assert_eq!((rec.x, rec.y), (11, -3));
        assert_eq!(rec.ports, PortsRecord::default());
    }

    #[test]
    fn msgpack_snapshot_roundtrip() {
        let (g, _) = sample();
        let mut rec = GraphRecord::capture(&g, |_| true);
        rec.viewport = Some(ViewportRecord {
            scale: 1.5,
            tx: -20.0,
            ty: 4.0,
        });
        let bytes = rec.to_msgpack().unwrap();
        assert_eq!(GraphRecord::from_msgpack(&bytes).unwrap(), rec);
    }

    #[test]
    fn missing_shape_is_rejected() {
        assert!(GraphRecord::from_json(r#"{"nodes":[]}"#).is_err());
        assert!(GraphRecord::from_json("not json").is_err());
    }
}
