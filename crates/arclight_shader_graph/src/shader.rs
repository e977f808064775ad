// SPDX-License-Identifier: MIT OR Apache-2.0
//! Top-level shader graph: mode, per-stage graphs, varyings.

use crate::connection::Connection;
use crate::error::GraphError;
use crate::graph::{StageGraph, StageSet};
use crate::node::{NodeId, OutputNode, ShaderNode};
use crate::port::PortKind;
use crate::stage::{ShaderMode, Stage};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Stages a varying is written in and read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaryingMode {
    /// Written in vertex, readable in fragment and light
    VertexToFragLight,
    /// Written in fragment, readable in light
    FragToLight,
}

/// A user-declared value carried between stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Varying {
    /// Name, unique per shader
    pub name: String,
    /// Write/read stages
    pub mode: VaryingMode,
    /// Value kind; samplers cannot be carried
    pub kind: PortKind,
}

/// A complete visual shader: a [`ShaderMode`] plus one node graph per stage.
///
/// Construction materializes every stage with its built-in output node at
/// [`NodeId::OUTPUT`], so a fresh graph's node list for any stage is `{0}`.
/// All graph operations take the [`Stage`] first; the sentinel stage fails
/// mutations with [`GraphError::InvalidStage`] and reads as absent.
#[derive(Debug, Clone)]
pub struct ShaderGraph {
    mode: ShaderMode,
    stages: StageSet,
    varyings: IndexMap<String, Varying>,
}

impl Default for ShaderGraph {
    fn default() -> Self {
        Self::new(ShaderMode::default())
    }
}

impl ShaderGraph {
    /// Create a graph for `mode` with the built-in outputs in place.
    pub fn new(mode: ShaderMode) -> Self {
        let mut graph = Self::bare(mode);
        for (stage, stage_graph) in graph.stages.iter_mut() {
            let output = ShaderNode::Output(OutputNode::new(mode, stage));
            let seeded = stage_graph.add_node(output, [0.0, 0.0], NodeId::OUTPUT);
            debug_assert!(seeded.is_ok());
        }
        graph
    }

    /// Graph without built-in outputs. The asset loader replays saved
    /// records onto this, id 0 included.
    pub(crate) fn bare(mode: ShaderMode) -> Self {
        Self {
            mode,
            stages: StageSet::default(),
            varyings: IndexMap::new(),
        }
    }

    /// Current shader mode.
    pub fn mode(&self) -> ShaderMode {
        self.mode
    }

    /// Switch the shader mode.
    ///
    /// Every output node is rebuilt with the layout for the new mode, and
    /// connections that no longer validate against the changed layouts are
    /// dropped. Group internals keep their own output nodes as constructed.
    pub fn set_mode(&mut self, mode: ShaderMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        let mut dropped = 0;
        for (stage, stage_graph) in self.stages.iter_mut() {
            stage_graph.rebuild_outputs(mode, stage);
            dropped += stage_graph.prune_invalid_connections();
        }
        if dropped > 0 {
            tracing::debug!("Mode switch to {:?} dropped {} connection(s)", mode, dropped);
        }
    }

    /// Insert `node` into `stage` at `id`.
    pub fn add_node(
        &mut self,
        stage: Stage,
        node: ShaderNode,
        position: [f32; 2],
        id: NodeId,
    ) -> Result<(), GraphError> {
        self.stages.require_mut(stage)?.add_node(node, position, id)
    }

    /// Remove the node at `id` from `stage`, with every connection touching
    /// it, handing the node back.
    pub fn remove_node(&mut self, stage: Stage, id: NodeId) -> Result<ShaderNode, GraphError> {
        self.stages.require_mut(stage)?.remove_node(id)
    }

    /// Get a node.
    pub fn node(&self, stage: Stage, id: NodeId) -> Option<&ShaderNode> {
        self.stages.get(stage)?.node(id)
    }

    /// Get a node mutably.
    pub fn node_mut(&mut self, stage: Stage, id: NodeId) -> Option<&mut ShaderNode> {
        self.stages.get_mut(stage)?.node_mut(id)
    }

    /// Ids present in `stage`; empty for the sentinel.
    pub fn node_ids(&self, stage: Stage) -> impl Iterator<Item = NodeId> + '_ {
        self.stages
            .get(stage)
            .into_iter()
            .flat_map(StageGraph::node_ids)
    }

    /// Nodes of `stage` with their ids; empty for the sentinel.
    pub fn nodes(&self, stage: Stage) -> impl Iterator<Item = (NodeId, &ShaderNode)> {
        self.stages
            .get(stage)
            .into_iter()
            .flat_map(StageGraph::nodes)
    }

    /// Number of nodes in `stage`; `0` for the sentinel.
    pub fn node_count(&self, stage: Stage) -> usize {
        self.stages.get(stage).map_or(0, StageGraph::node_count)
    }

    /// Hand out the next free id for `stage` and advance its watermark.
    pub fn allocate_node_id(&mut self, stage: Stage) -> Result<NodeId, GraphError> {
        Ok(self.stages.require_mut(stage)?.allocate_id())
    }

    /// Move a node.
    pub fn set_node_position(
        &mut self,
        stage: Stage,
        id: NodeId,
        position: [f32; 2],
    ) -> Result<(), GraphError> {
        self.stages.require_mut(stage)?.set_position(id, position)
    }

    /// Canvas position of a node.
    pub fn node_position(&self, stage: Stage, id: NodeId) -> Option<[f32; 2]> {
        self.stages.get(stage)?.position(id)
    }

    /// Check whether [`connect`](Self::connect) would succeed.
    pub fn can_connect(
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

    /// Connect two ports within `stage`.
    pub fn connect(
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

    /// Remove one connection from `stage`.
    pub fn disconnect(
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

    /// Connections of `stage`; empty for the sentinel.
    pub fn connections(&self, stage: Stage) -> &[Connection] {
        self.stages.get(stage).map_or(&[], StageGraph::connections)
    }

    /// Node ids of `stage` in dependency order.
    pub fn topological_order(&self, stage: Stage) -> Result<Vec<NodeId>, GraphError> {
        self.stages.require(stage)?.topological_order()
    }

    /// Declare a varying.
    ///
    /// Rejects samplers and duplicate names.
    pub fn add_varying(&mut self, varying: Varying) -> Result<(), GraphError> {
        if varying.kind == PortKind::Sampler {
            return Err(GraphError::InvalidVaryingKind);
        }
        if self.varyings.contains_key(&varying.name) {
            return Err(GraphError::DuplicateVarying(varying.name));
        }
        tracing::debug!("Added varying '{}'", varying.name);
        self.varyings.insert(varying.name.clone(), varying);
        Ok(())
    }

    /// Whether a varying named `name` is declared.
    pub fn has_varying(&self, name: &str) -> bool {
        self.varyings.contains_key(name)
    }

    /// Remove the varying `name`, handing it back.
    pub fn remove_varying(&mut self, name: &str) -> Result<Varying, GraphError> {
        self.varyings
            .shift_remove(name)
            .ok_or_else(|| GraphError::VaryingNotFound(name.to_string()))
    }

    /// Declared varyings, in declaration order.
    pub fn varyings(&self) -> impl Iterator<Item = &Varying> {
        self.varyings.values()
    }
}
