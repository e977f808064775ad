// SPDX-License-Identifier: MIT OR Apache-2.0
//! Group nodes: nested sub-graphs with their own id space.

use crate::connection::Connection;
use crate::error::GraphError;
use crate::graph::{StageGraph, StageSet};
use crate::node::{NodeId, ShaderNode};
use crate::stage::Stage;

/// A node that owns a private set of stage graphs.
///
/// Each stage's internal graph has an id space independent of the parent
/// graph and of every other group: the integer `5` inside a group and `5`
/// in the parent name unrelated nodes. Internal graphs start empty; the
/// group's Input/Output interface markers are ordinary nodes recognized by
/// variant, not by flag or reserved id.
///
/// Externally a group is a fixed vec4 pass-through (one `in`, one `out`),
/// so edits inside the group never invalidate connections in the parent.
#[derive(Debug, Clone, Default)]
pub struct GroupNode {
    stages: StageSet,
}

impl GroupNode {
    /// Create a group with empty internals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node` into the internal graph of `stage` at `id`.
    pub fn add_internal_node(
        &mut self,
        stage: Stage,
        node: ShaderNode,
        position: [f32; 2],
        id: NodeId,
    ) -> Result<(), GraphError> {
        self.stages.require_mut(stage)?.add_node(node, position, id)
    }

    /// Remove the internal node at `id`, with every connection touching it.
    pub fn remove_internal_node(
        &mut self,
        stage: Stage,
        id: NodeId,
    ) -> Result<ShaderNode, GraphError> {
        self.stages.require_mut(stage)?.remove_node(id)
    }

    /// Get an internal node.
    pub fn internal_node(&self, stage: Stage, id: NodeId) -> Option<&ShaderNode> {
        self.stages.get(stage)?.node(id)
    }

    /// Get an internal node mutably.
    pub fn internal_node_mut(&mut self, stage: Stage, id: NodeId) -> Option<&mut ShaderNode> {
        self.stages.get_mut(stage)?.node_mut(id)
    }

    /// Ids of the internal nodes of `stage`; empty for the sentinel.
    pub fn internal_node_ids(&self, stage: Stage) -> impl Iterator<Item = NodeId> + '_ {
        self.stages
            .get(stage)
            .into_iter()
            .flat_map(StageGraph::node_ids)
    }

    /// Internal nodes of `stage` with their ids; empty for the sentinel.
    pub fn internal_nodes(
        &self,
        stage: Stage,
    ) -> impl Iterator<Item = (NodeId, &ShaderNode)> {
        self.stages
            .get(stage)
            .into_iter()
            .flat_map(StageGraph::nodes)
    }

    /// Number of internal nodes in `stage`; `0` for the sentinel.
    pub fn internal_node_count(&self, stage: Stage) -> usize {
        self.stages.get(stage).map_or(0, StageGraph::node_count)
    }

    /// Hand out the next free internal id for `stage`.
    ///
    /// Independent of the parent graph's allocator; consecutive calls
    /// return strictly increasing ids.
    pub fn allocate_internal_node_id(&mut self, stage: Stage) -> Result<NodeId, GraphError> {
        Ok(self.stages.require_mut(stage)?.allocate_id())
    }

    /// Move an internal node.
    pub fn set_internal_node_position(
        &mut self,
        stage: Stage,
        id: NodeId,
        position: [f32; 2],
    ) -> Result<(), GraphError> {
        self.stages.require_mut(stage)?.set_position(id, position)
    }

    /// Canvas position of an internal node.
    pub fn internal_node_position(&self, stage: Stage, id: NodeId) -> Option<[f32; 2]> {
        self.stages.get(stage)?.position(id)
    }

    /// Check whether
    /// [`connect_internal_nodes`](Self::connect_internal_nodes) would
    /// succeed.
    pub fn can_connect_internal_nodes(
        &self,
        stage: Stage,
        from_node: NodeId,
        from_port: u32,
        to_node: NodeId,
        to_port: u32,
    ) -> bool {
        self.stages
            .get(stage)
            .is_some_and(|graph| graph.can_connect(from_node, from_port, to_node, to_port))
    }

    /// Connect two internal ports within `stage`.
    pub fn connect_internal_nodes(
        &mut self,
        stage: Stage,
        from_node: NodeId,
        from_port: u32,
        to_node: NodeId,
        to_port: u32,
    ) -> Result<(), GraphError> {
        self.stages
            .require_mut(stage)?
            .connect(from_node, from_port, to_node, to_port)
    }

    /// Remove one internal connection.
    pub fn disconnect_internal_nodes(
        &mut self,
        stage: Stage,
        from_node: NodeId,
        from_port: u32,
        to_node: NodeId,
        to_port: u32,
    ) -> Result<Connection, GraphError> {
        self.stages
            .require_mut(stage)?
            .disconnect(from_node, from_port, to_node, to_port)
    }

    /// Internal connections of `stage`; empty for the sentinel.
    pub fn internal_connections(&self, stage: Stage) -> &[Connection] {
        self.stages.get(stage).map_or(&[], StageGraph::connections)
    }

    /// Internal node ids of `stage` in dependency order.
    pub fn internal_topological_order(&self, stage: Stage) -> Result<Vec<NodeId>, GraphError> {
        self.stages.require(stage)?.topological_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ColorConstant, InputNode, NodeKind, OutputNode};
    use crate::shader::ShaderGraph;
    use crate::stage::ShaderMode;

    fn color(value: [f32; 4]) -> ShaderNode {
        ShaderNode::ColorConstant(ColorConstant { value })
    }

    #[test]
    fn test_internal_ids_are_unique_and_increasing() {
        let mut group = GroupNode::new();
        let a = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        let b = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        assert_ne!(a, b);
        assert_eq!(b.0, a.0 + 1);
    }

    #[test]
    fn test_internal_id_space_is_per_stage() {
        let mut group = GroupNode::new();
        let fragment = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        let vertex = group.allocate_internal_node_id(Stage::Vertex).unwrap();
        // Equal integers, different spaces; both inserts succeed
        assert_eq!(fragment, vertex);
        group
            .add_internal_node(Stage::Fragment, color([1.0; 4]), [0.0, 0.0], fragment)
            .unwrap();
        group
            .add_internal_node(Stage::Vertex, color([0.0; 4]), [0.0, 0.0], vertex)
            .unwrap();
        assert_eq!(group.internal_node_count(Stage::Fragment), 1);
        assert_eq!(group.internal_node_count(Stage::Vertex), 1);
    }

    #[test]
    fn test_group_id_space_is_independent_of_parent() {
        let mut shader = ShaderGraph::new(ShaderMode::CanvasItem);
        let group_id = shader.allocate_node_id(Stage::Fragment).unwrap();
        shader
            .add_node(
                Stage::Fragment,
                ShaderNode::from(GroupNode::new()),
                [100.0, 100.0],
                group_id,
            )
            .unwrap();

        // Interleave allocations from both spaces
        let parent_id = shader.allocate_node_id(Stage::Fragment).unwrap();
        let group = shader
            .node_mut(Stage::Fragment, group_id)
            .and_then(ShaderNode::as_group_mut)
            .unwrap();
        let internal_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();

        // The internal space starts at the same floor as a fresh graph
        assert_eq!(internal_id, NodeId::FIRST_FREE);
        group
            .add_internal_node(Stage::Fragment, color([1.0; 4]), [0.0, 0.0], internal_id)
            .unwrap();
        shader
            .add_node(Stage::Fragment, color([0.5; 4]), [0.0, 0.0], parent_id)
            .unwrap();

        // An id equal to the parent's group id is free inside the group
        group_sanity(&shader, group_id, parent_id, internal_id);
    }

    fn group_sanity(shader: &ShaderGraph, group_id: NodeId, parent_id: NodeId, internal_id: NodeId) {
        let group = shader
            .node(Stage::Fragment, group_id)
            .and_then(ShaderNode::as_group)
            .unwrap();
        assert!(group.internal_node(Stage::Fragment, internal_id).is_some());
        assert!(group.internal_node(Stage::Fragment, parent_id).is_none());
        assert!(shader.node(Stage::Fragment, parent_id).is_some());
    }

    #[test]
    fn test_duplicate_internal_id_is_rejected() {
        let mut group = GroupNode::new();
        group
            .add_internal_node(Stage::Fragment, color([0.0; 4]), [0.0, 0.0], NodeId(5))
            .unwrap();
        let result =
            group.add_internal_node(Stage::Fragment, color([1.0; 4]), [100.0, 0.0], NodeId(5));
        assert!(matches!(result, Err(GraphError::DuplicateId(NodeId(5)))));
        assert_eq!(group.internal_node_count(Stage::Fragment), 1);
        // The allocator steps past the explicit id
        assert_eq!(
            group.allocate_internal_node_id(Stage::Fragment).unwrap(),
            NodeId(6)
        );
    }

    #[test]
    fn test_sentinel_stage_is_rejected() {
        let mut group = GroupNode::new();
        assert!(matches!(
            group.add_internal_node(Stage::Max, color([0.0; 4]), [0.0, 0.0], NodeId(2)),
            Err(GraphError::InvalidStage)
        ));
        assert!(matches!(
            group.allocate_internal_node_id(Stage::Max),
            Err(GraphError::InvalidStage)
        ));
        assert!(group.internal_node(Stage::Max, NodeId(0)).is_none());
        assert_eq!(group.internal_node_count(Stage::Max), 0);
        assert!(group.internal_connections(Stage::Max).is_empty());
        assert!(!group.can_connect_internal_nodes(Stage::Max, NodeId(2), 0, NodeId(3), 0));
        for stage in Stage::ALL {
            assert_eq!(group.internal_node_count(stage), 0);
        }
    }

    #[test]
    fn test_group_editing_workflow() {
        // Mirrors the editor flow: group in a fresh canvas-item shader,
        // interface nodes, a user node, one internal connection.
        let mut shader = ShaderGraph::new(ShaderMode::CanvasItem);
        assert_eq!(
            shader.node_ids(Stage::Fragment).collect::<Vec<_>>(),
            vec![NodeId::OUTPUT]
        );

        let group_id = shader.allocate_node_id(Stage::Fragment).unwrap();
        assert_eq!(group_id, NodeId(2));
        shader
            .add_node(
                Stage::Fragment,
                ShaderNode::from(GroupNode::new()),
                [100.0, 100.0],
                group_id,
            )
            .unwrap();
        let ids: Vec<_> = shader.node_ids(Stage::Fragment).collect();
        assert_eq!(ids, vec![NodeId(0), NodeId(2)]);

        let group = shader
            .node_mut(Stage::Fragment, group_id)
            .and_then(ShaderNode::as_group_mut)
            .unwrap();

        let input_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(
                Stage::Fragment,
                ShaderNode::Input(InputNode::new("GroupInput")),
                [-200.0, 0.0],
                input_id,
            )
            .unwrap();
        let output_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(
                Stage::Fragment,
                ShaderNode::Output(OutputNode::new(ShaderMode::CanvasItem, Stage::Fragment)),
                [200.0, 0.0],
                output_id,
            )
            .unwrap();
        let color_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(
                Stage::Fragment,
                color([1.0, 0.5, 0.0, 1.0]),
                [0.0, 100.0],
                color_id,
            )
            .unwrap();

        assert_eq!(
            (input_id, output_id, color_id),
            (NodeId(2), NodeId(3), NodeId(4))
        );
        assert_eq!(group.internal_node_count(Stage::Fragment), 3);

        // The interface pair is recognizable by variant
        let kinds: Vec<_> = group
            .internal_nodes(Stage::Fragment)
            .map(|(_, node)| node.kind())
            .collect();
        assert!(kinds.contains(&NodeKind::Input));
        assert!(kinds.contains(&NodeKind::Output));

        // Wire the color constant into the output's color port
        assert!(group.can_connect_internal_nodes(Stage::Fragment, color_id, 0, output_id, 0));
        group
            .connect_internal_nodes(Stage::Fragment, color_id, 0, output_id, 0)
            .unwrap();

        let connections = group.internal_connections(Stage::Fragment);
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].from_node, color_id);
        assert_eq!(connections[0].from_port, 0);
        assert_eq!(connections[0].to_node, output_id);
        assert_eq!(connections[0].to_port, 0);
    }

    #[test]
    fn test_internal_remove_cascades() {
        let mut group = GroupNode::new();
        let color_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(Stage::Fragment, color([1.0; 4]), [0.0, 0.0], color_id)
            .unwrap();
        let output_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(
                Stage::Fragment,
                ShaderNode::Output(OutputNode::new(ShaderMode::CanvasItem, Stage::Fragment)),
                [200.0, 0.0],
                output_id,
            )
            .unwrap();
        group
            .connect_internal_nodes(Stage::Fragment, color_id, 0, output_id, 0)
            .unwrap();

        group.remove_internal_node(Stage::Fragment, color_id).unwrap();
        assert!(group.internal_connections(Stage::Fragment).is_empty());
        assert!(group.internal_node(Stage::Fragment, output_id).is_some());
    }

    #[test]
    fn test_internal_disconnect() {
        let mut group = GroupNode::new();
        let color_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(Stage::Fragment, color([1.0; 4]), [0.0, 0.0], color_id)
            .unwrap();
        let output_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(
                Stage::Fragment,
                ShaderNode::Output(OutputNode::new(ShaderMode::CanvasItem, Stage::Fragment)),
                [200.0, 0.0],
                output_id,
            )
            .unwrap();
        group
            .connect_internal_nodes(Stage::Fragment, color_id, 0, output_id, 0)
            .unwrap();

        group
            .disconnect_internal_nodes(Stage::Fragment, color_id, 0, output_id, 0)
            .unwrap();
        assert!(group.internal_connections(Stage::Fragment).is_empty());
        assert!(matches!(
            group.disconnect_internal_nodes(Stage::Fragment, color_id, 0, output_id, 0),
            Err(GraphError::ConnectionNotFound)
        ));
    }

    #[test]
    fn test_internal_position_roundtrip() {
        let mut group = GroupNode::new();
        let id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(Stage::Fragment, color([1.0; 4]), [-200.0, 0.0], id)
            .unwrap();
        assert_eq!(
            group.internal_node_position(Stage::Fragment, id),
            Some([-200.0, 0.0])
        );
        group
            .set_internal_node_position(Stage::Fragment, id, [37.5, -12.25])
            .unwrap();
        assert_eq!(
            group.internal_node_position(Stage::Fragment, id),
            Some([37.5, -12.25])
        );
    }

    #[test]
    fn test_internal_topological_order() {
        let mut group = GroupNode::new();
        let color_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(Stage::Fragment, color([1.0; 4]), [0.0, 0.0], color_id)
            .unwrap();
        let output_id = group.allocate_internal_node_id(Stage::Fragment).unwrap();
        group
            .add_internal_node(
                Stage::Fragment,
                ShaderNode::Output(OutputNode::new(ShaderMode::CanvasItem, Stage::Fragment)),
                [200.0, 0.0],
                output_id,
            )
            .unwrap();
        group
            .connect_internal_nodes(Stage::Fragment, color_id, 0, output_id, 0)
            .unwrap();

        let order = group.internal_topological_order(Stage::Fragment).unwrap();
        let pos = |id: NodeId| order.iter().position(|x| *x == id).unwrap();
        assert!(pos(color_id) < pos(output_id));
    }
}
