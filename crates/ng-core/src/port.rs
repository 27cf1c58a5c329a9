//! Ports: the connection endpoints every node owns.
//!
//! Each node has exactly one input port and one output port. A port keeps a
//! map from its peer node to the connecting edge, so the owning node id plus
//! a direction identifies a port and the peer id identifies a connection.

use crate::id::{NodeId, NodeType};
use petgraph::graph::EdgeIndex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// Stable handle to a port: owning node + direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: NodeId,
    pub direction: PortDirection,
}

impl PortRef {
    pub const fn input(node: NodeId) -> Self {
        Self {
            node,
            direction: PortDirection::Input,
        }
    }

    pub const fn output(node: NodeId) -> Self {
        Self {
            node,
            direction: PortDirection::Output,
        }
    }
}

/// What a port needs to know about a prospective peer.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub node: NodeId,
    pub node_type: NodeType,
}

#[derive(Debug, Clone)]
pub struct Port {
    pub direction: PortDirection,
    /// Multiplicity policy: `false` allows at most one connection.
    pub many: bool,
    /// Input ports only: permitted source node types. Empty allows all.
    pub allow: SmallVec<[NodeType; 2]>,
    /// Peer node → connecting edge.
    pub(crate) connections: HashMap<NodeId, EdgeIndex>,
}

impl Port {
    /// Input port: single connection, no allow-list.
    pub fn input() -> Self {
        Self {
            direction: PortDirection::Input,
            many: false,
            allow: SmallVec::new(),
            connections: HashMap::new(),
        }
    }

    /// Output port: any number of connections.
    pub fn output() -> Self {
        Self {
            direction: PortDirection::Output,
            many: true,
            allow: SmallVec::new(),
            connections: HashMap::new(),
        }
    }

    pub fn with_many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    /// Restrict an input port to sources of the given node types.
    pub fn with_allow(mut self, types: &[&str]) -> Self {
        self.allow = types.iter().map(|t| NodeType::intern(t)).collect();
        self
    }

    pub fn is_occupied(&self) -> bool {
        !self.many && !self.connections.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connection_to(&self, peer: NodeId) -> Option<EdgeIndex> {
        self.connections.get(&peer).copied()
    }

    /// Peer node ids, in no particular order.
    pub fn peers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.connections.keys().copied()
    }

    /// Whether this port, owned by `owner`, would accept `candidate`.
    ///
    /// With no candidate only the multiplicity policy is checked; that is
    /// the test for arming an output port.
    pub fn can_connect(&self, owner: NodeId, candidate: Option<Candidate>) -> bool {
        if self.is_occupied() {
            return false;
        }
        let Some(candidate) = candidate else {
            return true;
        };
        if candidate.node == owner || self.connections.contains_key(&candidate.node) {
            return false;
        }
        match self.direction {
            PortDirection::Input => {
                self.allow.is_empty() || self.allow.contains(&candidate.node_type)
            }
            PortDirection::Output => true,
        }
    }
}
