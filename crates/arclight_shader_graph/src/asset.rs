// SPDX-License-Identifier: MIT OR Apache-2.0
//! Replay-based persistence for shader graphs.
//!
//! An asset is an ordered script of the mutations that rebuild a graph: per
//! stage, node records first, then connections, recursing into group
//! internals. Loading replays the script through the same `add_node` /
//! `connect` entry points the editor uses, so a damaged asset fails with
//! the same [`GraphError`] a live edit would.

use crate::connection::Connection;
use crate::error::GraphError;
use crate::group::GroupNode;
use crate::node::{
    ColorConstant, FloatConstant, FloatOp, InputNode, NodeId, OutputNode, ShaderNode,
    VectorConstant, VectorOp,
};
use crate::shader::{ShaderGraph, Varying};
use crate::stage::{ShaderMode, Stage};
use serde::{Deserialize, Serialize};

/// Serializable payload of one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeSpec {
    /// Stage input reader
    Input(InputNode),
    /// Stage output sink
    Output(OutputNode),
    /// RGBA constant
    ColorConstant(ColorConstant),
    /// Scalar constant
    FloatConstant(FloatConstant),
    /// Vector constant
    VectorConstant(VectorConstant),
    /// Scalar operator
    FloatOp(FloatOp),
    /// Vector operator
    VectorOp(VectorOp),
    /// Nested group, stored as its own replay script
    Group(GroupAsset),
}

impl NodeSpec {
    /// Capture a live node as its serializable payload.
    pub fn capture(node: &ShaderNode) -> Self {
        match node {
            ShaderNode::Input(n) => Self::Input(n.clone()),
            ShaderNode::Output(n) => Self::Output(*n),
            ShaderNode::ColorConstant(n) => Self::ColorConstant(*n),
            ShaderNode::FloatConstant(n) => Self::FloatConstant(*n),
            ShaderNode::VectorConstant(n) => Self::VectorConstant(*n),
            ShaderNode::FloatOp(n) => Self::FloatOp(*n),
            ShaderNode::VectorOp(n) => Self::VectorOp(*n),
            ShaderNode::Group(group) => Self::Group(GroupAsset::capture(group)),
        }
    }

    fn materialize(&self) -> Result<ShaderNode, GraphError> {
        Ok(match self {
            Self::Input(n) => ShaderNode::Input(n.clone()),
            Self::Output(n) => ShaderNode::Output(*n),
            Self::ColorConstant(n) => ShaderNode::ColorConstant(*n),
            Self::FloatConstant(n) => ShaderNode::FloatConstant(*n),
            Self::VectorConstant(n) => ShaderNode::VectorConstant(*n),
            Self::FloatOp(n) => ShaderNode::FloatOp(*n),
            Self::VectorOp(n) => ShaderNode::VectorOp(*n),
            Self::Group(asset) => ShaderNode::from(asset.materialize()?),
        })
    }
}

/// One node in a stage script: where it goes and what it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id to insert at
    pub id: NodeId,
    /// Node payload
    pub node: NodeSpec,
    /// Editor canvas position
    pub position: [f32; 2],
}

/// Replay script for one stage: node insertions, then connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage these records belong to
    pub stage: Stage,
    /// Node insertions, in insertion order
    pub nodes: Vec<NodeRecord>,
    /// Connections, replayed after every node exists
    pub connections: Vec<Connection>,
}

/// A group's internals as replay scripts, one per populated stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupAsset {
    /// Scripts for the stages that hold anything
    pub stages: Vec<StageRecord>,
}

impl GroupAsset {
    /// Capture a group's internals.
    pub fn capture(group: &GroupNode) -> Self {
        let mut stages = Vec::new();
        for stage in Stage::ALL {
            let mut nodes = Vec::new();
            for (id, node) in group.internal_nodes(stage) {
                let position = group.internal_node_position(stage, id).unwrap_or_default();
                nodes.push(NodeRecord {
                    id,
                    node: NodeSpec::capture(node),
                    position,
                });
            }
            let connections = group.internal_connections(stage).to_vec();
            if nodes.is_empty() && connections.is_empty() {
                continue;
            }
            stages.push(StageRecord {
                stage,
                nodes,
                connections,
            });
        }
        Self { stages }
    }

    fn materialize(&self) -> Result<GroupNode, GraphError> {
        let mut group = GroupNode::new();
        for record in &self.stages {
            for node_record in &record.nodes {
                group.add_internal_node(
                    record.stage,
                    node_record.node.materialize()?,
                    node_record.position,
                    node_record.id,
                )?;
            }
            for c in &record.connections {
                group.connect_internal_nodes(
                    record.stage,
                    c.from_node,
                    c.from_port,
                    c.to_node,
                    c.to_port,
                )?;
            }
        }
        Ok(group)
    }
}

/// A complete shader graph as a replay script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderGraphAsset {
    /// Format version for compatibility checks
    pub version: u32,
    /// Shader mode
    pub mode: ShaderMode,
    /// Per-stage scripts; empty stages are omitted
    pub stages: Vec<StageRecord>,
    /// Declared varyings
    pub varyings: Vec<Varying>,
}

impl ShaderGraphAsset {
    /// Current asset format version.
    pub const FORMAT_VERSION: u32 = 1;

    /// Capture `graph` as a replay script.
    ///
    /// Every node is recorded, the built-in output at id 0 included, so a
    /// load reproduces the graph verbatim even when built-ins were moved or
    /// removed.
    pub fn save(graph: &ShaderGraph) -> Self {
        let mut stages = Vec::new();
        for stage in Stage::ALL {
            let mut nodes = Vec::new();
            for (id, node) in graph.nodes(stage) {
                let position = graph.node_position(stage, id).unwrap_or_default();
                nodes.push(NodeRecord {
                    id,
                    node: NodeSpec::capture(node),
                    position,
                });
            }
            let connections = graph.connections(stage).to_vec();
            if nodes.is_empty() && connections.is_empty() {
                continue;
            }
            stages.push(StageRecord {
                stage,
                nodes,
                connections,
            });
        }
        Self {
            version: Self::FORMAT_VERSION,
            mode: graph.mode(),
            stages,
            varyings: graph.varyings().cloned().collect(),
        }
    }

    /// Replay this script into a live graph.
    pub fn load(&self) -> Result<ShaderGraph, GraphError> {
        let mut graph = ShaderGraph::bare(self.mode);
        for record in &self.stages {
            for node_record in &record.nodes {
                graph.add_node(
                    record.stage,
                    node_record.node.materialize()?,
                    node_record.position,
                    node_record.id,
                )?;
            }
            for c in &record.connections {
                graph.connect(record.stage, c.from_node, c.from_port, c.to_node, c.to_port)?;
            }
        }
        for varying in &self.varyings {
            graph.add_varying(varying.clone())?;
        }
        tracing::debug!(
            "Loaded shader graph asset with {} stage record(s)",
            self.stages.len()
        );
        Ok(graph)
    }

    /// Serialize to RON text.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON text.
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}
