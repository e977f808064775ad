// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connections between node ports.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A directed edge from an output port to an input port within one stage
/// graph. Equality is by the full quadruple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Source node
    pub from_node: NodeId,
    /// Output port index on the source
    pub from_port: u32,
    /// Target node
    pub to_node: NodeId,
    /// Input port index on the target
    pub to_port: u32,
}

impl Connection {
    /// Create a connection record.
    pub fn new(from_node: NodeId, from_port: u32, to_node: NodeId, to_port: u32) -> Self {
        Self {
            from_node,
            from_port,
            to_node,
            to_port,
        }
    }

    /// Check if this connection involves the given node.
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection drives the given input port.
    pub fn targets(&self, to_node: NodeId, to_port: u32) -> bool {
        self.to_node == to_node && self.to_port == to_port
    }
}
