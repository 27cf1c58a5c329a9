//! Per-frame easing scheduler.
//!
//! One scheduler drives every moving node. A node registers once (guarded
//! by its `animating` flag) and is dropped after the frame in which it
//! settles, so repeated drags never stack up duplicate loops.

use ng_core::{NodeGraph, NodeId};
use smallvec::SmallVec;

#[derive(Debug, Default)]
pub struct Animator {
    active: SmallVec<[NodeId; 8]>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start easing `id` toward its `wish_pos`. No-op if it is already
    /// registered or not in the graph.
    pub fn register(&mut self, graph: &mut NodeGraph, id: NodeId) {
        let Some(node) = graph.node_mut(id) else {
            return;
        };
        if node.animating {
            return;
        }
        node.animating = true;
        self.active.push(id);
        log::trace!("animate {id}");
    }

    pub fn is_running(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advance every registered node by one frame and redraw its wires.
    /// Returns `true` while any node is still moving.
    pub fn tick(&mut self, graph: &mut NodeGraph, factor: f32, epsilon: f32) -> bool {
        self.active.retain(|id| {
            let settled = match graph.node_mut(*id) {
                Some(node) => node.ease_step(factor, epsilon),
                None => true,
            };
            graph.refresh_paths(*id);
            !settled
        });
        self.is_running()
    }

    /// Drop a node that is leaving the graph.
    pub fn forget(&mut self, id: NodeId) {
        self.active.retain(|n| *n != id);
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
