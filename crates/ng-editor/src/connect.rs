//! Connection gesture: idle or armed with a pending output port.
//!
//! While armed, every node whose input cannot accept the pending source is
//! flagged `disabled` as a visual hint. The flag never gates anything;
//! [`NodeGraph::connect`] still validates the pairing.

use ng_core::geometry::{BezierPath, Point};
use ng_core::port::PortRef;
use ng_core::{EdgeIndex, GraphError, NodeGraph, NodeId};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
    #[default]
    Idle,
    /// Output port of this node is the pending source.
    Armed(NodeId),
}

#[derive(Debug, Default)]
pub struct ConnectGesture {
    state: ConnectState,
}

impl ConnectGesture {
    pub fn state(&self) -> ConnectState {
        self.state
    }

    pub fn source(&self) -> Option<NodeId> {
        match self.state {
            ConnectState::Armed(id) => Some(id),
            ConnectState::Idle => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.source().is_some()
    }

    /// Arm with `node`'s output port if it has room for another connection.
    pub fn arm(&mut self, graph: &mut NodeGraph, node: NodeId) -> bool {
        if !graph.can_connect(PortRef::output(node), None) {
            log::debug!("output of {node} is full; not arming");
            return false;
        }
        self.state = ConnectState::Armed(node);
        self.highlight(graph);
        true
    }

    /// Return to idle and clear the disabled hints.
    pub fn cancel(&mut self, graph: &mut NodeGraph) {
        self.state = ConnectState::Idle;
        self.highlight(graph);
    }

    /// Try to connect the pending source to `target`'s input.
    ///
    /// On success returns the new edge and goes idle. A refused pairing
    /// leaves the gesture armed.
    pub fn commit(
        &mut self,
        graph: &mut NodeGraph,
        target: NodeId,
    ) -> Result<Option<EdgeIndex>, GraphError> {
        let Some(source) = self.source() else {
            return Ok(None);
        };
        if !graph.can_connect(PortRef::input(target), Some(PortRef::output(source))) {
            return Ok(None);
        }
        let edge = graph.connect(source, target)?;
        if edge.is_some() {
            self.cancel(graph);
        }
        Ok(edge)
    }

    /// Remove `edge` and arm with its former source, so the user can drop
    /// the loose end somewhere else.
    pub fn detach(&mut self, graph: &mut NodeGraph, edge: EdgeIndex) -> Option<(NodeId, NodeId)> {
        let conn = graph.remove_connection(edge)?;
        self.state = ConnectState::Armed(conn.from);
        self.highlight(graph);
        Some((conn.from, conn.to))
    }

    /// Forget a source node that is leaving the graph.
    pub fn forget(&mut self, graph: &mut NodeGraph, id: NodeId) {
        if self.source() == Some(id) {
            self.cancel(graph);
        }
    }

    /// Wire from the pending source to `pointer` (world space).
    pub fn preview(&self, graph: &NodeGraph, pointer: Point) -> Option<BezierPath> {
        let from = graph.port_center(PortRef::output(self.source()?))?;
        Some(BezierPath::between(from, pointer))
    }

    /// Recompute `disabled` on every node for the current state.
    pub fn highlight(&self, graph: &mut NodeGraph) {
        let source = self.source();
        let flags: Vec<(NodeId, bool)> = graph
            .node_ids()
            .iter()
            .map(|&id| {
                let disabled = match source {
                    Some(src) if src != id => {
                        !graph.can_connect(PortRef::input(id), Some(PortRef::output(src)))
                    }
                    _ => false,
                };
                (id, disabled)
            })
            .collect();
        for (id, disabled) in flags {
            if let Some(node) = graph.node_mut(id) {
                node.disabled = disabled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_core::model::Node;
    use ng_core::port::Port;
    use pretty_assertions::assert_eq;

    fn setup() -> (NodeGraph, NodeId, NodeId, NodeId) {
        let mut g = NodeGraph::new();
        let src = g.add_node(Node::new("Source", 0.0, 0.0)).unwrap();
        let sink = g
            .add_node(Node::new("Sink", 300.0, 0.0).with_input(Port::input().with_allow(&["Source"])))
            .unwrap();
        let picky = g
            .add_node(Node::new("Picky", 300.0, 200.0).with_input(Port::input().with_allow(&["Other"])))
            .unwrap();
        (g, src, sink, picky)
    }

    fn disabled(g: &NodeGraph) -> Vec<NodeId> {
        g.nodes().filter(|n| n.disabled).map(|n| n.id).collect()
    }

    #[test]
    fn arm_highlights_incompatible_inputs() {
        let (mut g, src, _, picky) = setup();
        let mut gesture = ConnectGesture::default();
        assert!(gesture.arm(&mut g, src));
        assert_eq!(disabled(&g), vec![picky]);
        gesture.cancel(&mut g);
        assert_eq!(disabled(&g), Vec::<NodeId>::new());
        assert_eq!(gesture.state(), ConnectState::Idle);
    }

    #[test]
    fn commit_connects_and_goes_idle() {
        let (mut g, src, sink, picky) = setup();
        let mut gesture = ConnectGesture::default();
        gesture.arm(&mut g, src);
        assert_eq!(gesture.commit(&mut g, picky).unwrap(), None);
        assert!(gesture.is_armed());
        let edge = gesture.commit(&mut g, sink).unwrap();
        assert!(edge.is_some());
        assert!(!gesture.is_armed());
        assert!(disabled(&g).is_empty());
    }

    #[test]
    fn detach_rearms_from_former_source() {
        let (mut g, src, sink, _) = setup();
        let edge = g.connect(src, sink).unwrap().unwrap();
        let mut gesture = ConnectGesture::default();
        assert_eq!(gesture.detach(&mut g, edge), Some((src, sink)));
        assert_eq!(gesture.source(), Some(src));
        assert_eq!(g.connections().count(), 0);
        let preview = gesture.preview(&g, Point::new(250.0, 50.0)).unwrap();
        assert_eq!(preview.from, Point::new(180.0, 14.0));
    }

    #[test]
    fn full_output_cannot_arm() {
        let mut g = NodeGraph::new();
        let a = g
            .add_node(Node::new("A", 0.0, 0.0).with_output(Port::output().with_many(false)))
            .unwrap();
        let b = g.add_node(Node::new("B", 300.0, 0.0)).unwrap();
        g.connect(a, b).unwrap();
        let mut gesture = ConnectGesture::default();
        assert!(!gesture.arm(&mut g, a));
        assert!(!gesture.is_armed());
    }
}
