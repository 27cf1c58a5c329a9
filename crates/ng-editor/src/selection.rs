//! Selected nodes.
//!
//! Membership is ordered and duplicate-free, and each member's `active`
//! flag is kept equal to its membership. Every edit returns whether the
//! membership changed so the editor can report it.

use ng_core::geometry::Rect;
use ng_core::{NodeGraph, NodeId};

#[derive(Debug, Default, Clone)]
pub struct Selection {
    members: Vec<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// Add a node. No-op for `None`, for members, and for nodes not in
    /// `graph`.
    pub fn add(&mut self, graph: &mut NodeGraph, id: Option<NodeId>) -> bool {
        let Some(id) = id else {
            return false;
        };
        if self.contains(id) {
            return false;
        }
        let Some(node) = graph.node_mut(id) else {
            return false;
        };
        node.active = true;
        self.members.push(id);
        true
    }

    pub fn remove(&mut self, graph: &mut NodeGraph, id: NodeId) -> bool {
        let Some(pos) = self.members.iter().position(|n| *n == id) else {
            return false;
        };
        self.members.remove(pos);
        if let Some(node) = graph.node_mut(id) {
            node.active = false;
        }
        true
    }

    pub fn clear(&mut self, graph: &mut NodeGraph) -> bool {
        if self.members.is_empty() {
            return false;
        }
        for id in self.members.drain(..) {
            if let Some(node) = graph.node_mut(id) {
                node.active = false;
            }
        }
        true
    }

    /// Replace the membership with `ids`.
    pub fn set(&mut self, graph: &mut NodeGraph, ids: &[NodeId]) -> bool {
        let before = self.members.clone();
        self.clear(graph);
        for id in ids {
            self.add(graph, Some(*id));
        }
        before != self.members
    }

    /// Forget a node that left the graph without touching its flags.
    pub fn forget(&mut self, id: NodeId) -> bool {
        let before = self.members.len();
        self.members.retain(|n| *n != id);
        before != self.members.len()
    }

    /// Padded box around the selected nodes, shown only for two or more.
    pub fn bounds(&self, graph: &NodeGraph, padding: f32) -> Option<Rect> {
        if self.members.len() < 2 {
            return None;
        }
        Rect::union_all(self.members.iter().filter_map(|id| graph.bounds(*id)))
            .map(|r| r.inflate(padding))
    }
}
