// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-stage graph storage: node slots, connections, id allocation.

use crate::connection::Connection;
use crate::error::GraphError;
use crate::node::{NodeId, OutputNode, ShaderNode};
use crate::stage::{ShaderMode, Stage};
use indexmap::IndexMap;
use std::collections::HashSet;

/// A node together with its editor canvas position. The two are inserted
/// and removed as one unit.
#[derive(Debug, Clone)]
struct NodeSlot {
    node: ShaderNode,
    position: [f32; 2],
}

/// The graph of one shader stage: nodes keyed by id, a connection list, and
/// the id watermark.
///
/// One `StageGraph` serves both a shader's top level and a group's
/// internals; the containers stack a set of these per stage. Ids are handed
/// out by [`allocate_id`](Self::allocate_id) and strictly increase for the
/// lifetime of the graph, so a removed node's id is never reissued.
#[derive(Debug, Clone)]
pub struct StageGraph {
    nodes: IndexMap<NodeId, NodeSlot>,
    connections: Vec<Connection>,
    next_id: NodeId,
}

impl Default for StageGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl StageGraph {
    /// Create an empty graph. Ids below [`NodeId::FIRST_FREE`] stay
    /// reserved for built-ins.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            connections: Vec::new(),
            next_id: NodeId::FIRST_FREE,
        }
    }

    /// Insert `node` at `id`.
    ///
    /// Fails with [`GraphError::DuplicateId`] when the id is occupied,
    /// leaving the graph untouched. Inserting at or above the watermark
    /// advances it, so later allocations stay unique.
    pub fn add_node(
        &mut self,
        node: ShaderNode,
        position: [f32; 2],
        id: NodeId,
    ) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        self.nodes.insert(id, NodeSlot { node, position });
        if id >= self.next_id {
            self.next_id = NodeId(id.0 + 1);
        }
        Ok(())
    }

    /// Remove the node at `id`, handing it back along with dropping every
    /// connection that touches it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<ShaderNode, GraphError> {
        let slot = self
            .nodes
            .shift_remove(&id)
            .ok_or(GraphError::NodeNotFound(id))?;
        let before = self.connections.len();
        self.connections.retain(|c| !c.involves_node(id));
        let dropped = before - self.connections.len();
        if dropped > 0 {
            tracing::debug!("Removed node {:?} and {} connection(s)", id, dropped);
        }
        Ok(slot.node)
    }

    /// Get the node at `id`.
    pub fn node(&self, id: NodeId) -> Option<&ShaderNode> {
        self.nodes.get(&id).map(|slot| &slot.node)
    }

    /// Get the node at `id` mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ShaderNode> {
        self.nodes.get_mut(&id).map(|slot| &mut slot.node)
    }

    /// All present ids, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Iterate nodes with their ids, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ShaderNode)> {
        self.nodes.iter().map(|(id, slot)| (*id, &slot.node))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hand out the next free id and advance the watermark past it.
    ///
    /// The result is `max(watermark, highest existing id + 1)`. Consecutive
    /// calls return strictly increasing ids whether or not anything is
    /// inserted in between, and removals never lower the watermark.
    pub fn allocate_id(&mut self) -> NodeId {
        let ceiling = self.nodes.keys().map(|id| id.0 + 1).max().unwrap_or(0);
        let id = NodeId(self.next_id.0.max(ceiling));
        self.next_id = NodeId(id.0 + 1);
        id
    }

    /// Move the node at `id` to `position`.
    pub fn set_position(&mut self, id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        let slot = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        slot.position = position;
        Ok(())
    }

    /// Editor canvas position of the node at `id`.
    pub fn position(&self, id: NodeId) -> Option<[f32; 2]> {
        self.nodes.get(&id).map(|slot| slot.position)
    }

    /// Check whether [`connect`](Self::connect) would succeed.
    pub fn can_connect(
        &self,
        from_node: NodeId,
        from_port: u32,
        to_node: NodeId,
        to_port: u32,
    ) -> bool {
        self.validate_connection(from_node, from_port, to_node, to_port)
            .is_ok()
    }

    /// Connect an output port to an input port.
    ///
    /// On success the edge set contains the quadruple exactly once; on
    /// failure the precise rejection is returned and nothing changes.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: u32,
        to_node: NodeId,
        to_port: u32,
    ) -> Result<(), GraphError> {
        self.validate_connection(from_node, from_port, to_node, to_port)?;
        self.connections
            .push(Connection::new(from_node, from_port, to_node, to_port));
        tracing::debug!(
            "Connected {:?}:{} -> {:?}:{}",
            from_node,
            from_port,
            to_node,
            to_port
        );
        Ok(())
    }

    fn validate_connection(
        &self,
        from_node: NodeId,
        from_port: u32,
        to_node: NodeId,
        to_port: u32,
    ) -> Result<(), GraphError> {
        // Both endpoints must exist
        let source = self
            .node(from_node)
            .ok_or(GraphError::NodeNotFound(from_node))?;
        let target = self
            .node(to_node)
            .ok_or(GraphError::NodeNotFound(to_node))?;

        // Port indices must be in range for the layouts
        let source_kind = source
            .output_port_kind(from_port)
            .ok_or(GraphError::InvalidPort {
                node: from_node,
                port: from_port,
            })?;
        let target_kind = target
            .input_port_kind(to_port)
            .ok_or(GraphError::InvalidPort {
                node: to_node,
                port: to_port,
            })?;

        if !source_kind.can_connect_to(target_kind) {
            return Err(GraphError::TypeMismatch);
        }

        // One driver per input port
        if self.connections.iter().any(|c| c.targets(to_node, to_port)) {
            return Err(GraphError::PortAlreadyConnected {
                node: to_node,
                port: to_port,
            });
        }

        if from_node == to_node {
            return Err(GraphError::SelfLoop);
        }

        // The edge closes a cycle iff the target already reaches the source
        if self.reaches(to_node, from_node) {
            return Err(GraphError::CycleRejected);
        }

        Ok(())
    }

    // Whether `from` reaches `to` by walking connections downstream.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut visited = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            for connection in self.connections.iter().filter(|c| c.from_node == id) {
                stack.push(connection.to_node);
            }
        }
        false
    }

    /// Remove exactly the edge `(from_node, from_port) -> (to_node, to_port)`.
    pub fn disconnect(
        &mut self,
        from_node: NodeId,
        from_port: u32,
        to_node: NodeId,
        to_port: u32,
    ) -> Result<Connection, GraphError> {
        let target = Connection::new(from_node, from_port, to_node, to_port);
        let index = self
            .connections
            .iter()
            .position(|c| *c == target)
            .ok_or(GraphError::ConnectionNotFound)?;
        Ok(self.connections.remove(index))
    }

    /// Every connection in this graph.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Drop connections that no longer validate against the current node
    /// layouts; returns how many went away.
    ///
    /// Useful after an edit that changes a node's ports, such as a vector
    /// operator switching width.
    pub fn prune_invalid_connections(&mut self) -> usize {
        let nodes = &self.nodes;
        let before = self.connections.len();
        self.connections.retain(|c| {
            let Some(source) = nodes.get(&c.from_node) else {
                return false;
            };
            let Some(target) = nodes.get(&c.to_node) else {
                return false;
            };
            let Some(from_kind) = source.node.output_port_kind(c.from_port) else {
                return false;
            };
            let Some(to_kind) = target.node.input_port_kind(c.to_port) else {
                return false;
            };
            from_kind.can_connect_to(to_kind)
        });
        before - self.connections.len()
    }

    /// Node ids in dependency order: every node appears after the nodes
    /// driving its inputs.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();
        let mut order = Vec::new();

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                self.visit(*node_id, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        temp_mark: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), GraphError> {
        if temp_mark.contains(&node_id) {
            return Err(GraphError::CycleRejected);
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        temp_mark.insert(node_id);

        for connection in self.connections.iter().filter(|c| c.to_node == node_id) {
            self.visit(connection.from_node, visited, temp_mark, order)?;
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }

    /// Rebuild every output node's layout for a new `(mode, stage)` pair.
    pub(crate) fn rebuild_outputs(&mut self, mode: ShaderMode, stage: Stage) {
        for slot in self.nodes.values_mut() {
            if let ShaderNode::Output(output) = &mut slot.node {
                *output = OutputNode::new(mode, stage);
            }
        }
    }
}

/// One [`StageGraph`] per real stage, indexed by [`Stage`]. Shared plumbing
/// for the shader's top level and for group internals.
#[derive(Debug, Clone, Default)]
pub(crate) struct StageSet {
    graphs: [StageGraph; Stage::COUNT],
}

impl StageSet {
    pub(crate) fn get(&self, stage: Stage) -> Option<&StageGraph> {
        stage.index().map(|i| &self.graphs[i])
    }

    pub(crate) fn get_mut(&mut self, stage: Stage) -> Option<&mut StageGraph> {
        stage.index().map(move |i| &mut self.graphs[i])
    }

    pub(crate) fn require(&self, stage: Stage) -> Result<&StageGraph, GraphError> {
        self.get(stage).ok_or(GraphError::InvalidStage)
    }

    pub(crate) fn require_mut(&mut self, stage: Stage) -> Result<&mut StageGraph, GraphError> {
        self.get_mut(stage).ok_or(GraphError::InvalidStage)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (Stage, &mut StageGraph)> {
        Stage::ALL.into_iter().zip(self.graphs.iter_mut())
    }
}
