//! Clipboard payloads: the `{nodes, connections}` sub-graph shape, as
//! `text/plain` JSON.

use ng_core::record::GraphRecord;
use ng_core::{GraphError, NodeGraph, NodeId};
use std::collections::HashSet;

/// Serialize `ids` and the connections running between them. A connection
/// with only one endpoint in `ids` is left out entirely.
pub fn encode(graph: &NodeGraph, ids: &[NodeId]) -> Result<String, GraphError> {
    let keep: HashSet<NodeId> = ids.iter().copied().collect();
    GraphRecord::capture(graph, |id| keep.contains(&id)).to_json()
}

/// Parse clipboard text. Anything that is not a `{nodes, connections}`
/// document yields `None`.
pub fn decode(text: &str) -> Option<GraphRecord> {
    match GraphRecord::from_json(text) {
        Ok(mut record) => {
            record.viewport = None;
            Some(record)
        }
        Err(e) => {
            log::warn!("ignoring clipboard contents: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_core::model::Node;
    use pretty_assertions::assert_eq;

    #[test]
    fn connection_needs_both_endpoints() {
        let mut g = NodeGraph::new();
        let a = g.add_node(Node::new("A", 0.0, 0.0)).unwrap();
        let b = g.add_node(Node::new("B", 300.0, 0.0)).unwrap();
        let c = g.add_node(Node::new("C", 0.0, 300.0)).unwrap();
        g.connect(a, b).unwrap();

        let ab = decode(&encode(&g, &[a, b]).unwrap()).unwrap();
        assert_eq!(ab.connections.len(), 1);
        assert_eq!((ab.connections[0].from, ab.connections[0].to), (a.raw(), b.raw()));

        let ac = decode(&encode(&g, &[a, c]).unwrap()).unwrap();
        assert_eq!(ac.nodes.len(), 2);
        assert!(ac.connections.is_empty());

        let b_only = decode(&encode(&g, &[b]).unwrap()).unwrap();
        assert!(b_only.connections.is_empty());
    }

    #[test]
    fn payload_has_no_viewport() {
        let g = NodeGraph::new();
        let text = encode(&g, &[]).unwrap();
        assert_eq!(text, r#"{"nodes":[],"connections":[]}"#);
    }

    #[test]
    fn junk_is_rejected() {
        assert!(decode("hello").is_none());
        assert!(decode(r#"{"nodes": 3, "connections": []}"#).is_none());
        assert!(decode(r#"[1, 2]"#).is_none());
    }
}
