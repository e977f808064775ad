// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor-side bookkeeping for group editing sessions.
//!
//! The graph model itself has no notion of "currently edited"; an editor
//! tracks that here and routes node lookups through [`GroupEditMode`] so the
//! rest of its UI code does not care which graph is on screen.

use crate::error::GraphError;
use crate::group::GroupNode;
use crate::node::{InputNode, NodeId, NodeKind, OutputNode, ShaderNode};
use crate::shader::ShaderGraph;
use crate::stage::{ShaderMode, Stage};

/// Location of a group node within its parent graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupTarget {
    /// Stage holding the group node
    pub stage: Stage,
    /// Group node id in the parent graph
    pub group_id: NodeId,
}

/// Which graph the editor is currently showing.
///
/// While a group is open, lookups resolve into that group's internal
/// graphs; otherwise they resolve into the top-level graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupEditMode {
    target: Option<GroupTarget>,
}

impl GroupEditMode {
    /// Start outside of any group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the group at `(stage, group_id)` for editing.
    pub fn open(&mut self, stage: Stage, group_id: NodeId) {
        self.target = Some(GroupTarget { stage, group_id });
        tracing::debug!("Editing group {:?} in {:?}", group_id, stage);
    }

    /// Return to the top-level graph.
    pub fn close(&mut self) {
        self.target = None;
    }

    /// Whether a group is open for editing.
    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    /// The group currently open, if any.
    pub fn target(&self) -> Option<GroupTarget> {
        self.target
    }

    /// Resolve a node lookup against the graph the editor is showing.
    ///
    /// While editing, `stage` and `id` address the open group's internals;
    /// otherwise they address `graph` directly. A stale target (the group
    /// was removed, or the id no longer names a group) resolves to `None`.
    pub fn resolve_node<'a>(
        &self,
        graph: &'a ShaderGraph,
        stage: Stage,
        id: NodeId,
    ) -> Option<&'a ShaderNode> {
        match self.target {
            Some(target) => graph
                .node(target.stage, target.group_id)?
                .as_group()?
                .internal_node(stage, id),
            None => graph.node(stage, id),
        }
    }
}

/// Whether `node` is a group interface marker (an input or output node).
///
/// Interface nodes carry no flag and no reserved id; they are recognized by
/// variant alone. Editors typically refuse to delete them while their group
/// is open.
pub fn is_interface_node(node: &ShaderNode) -> bool {
    matches!(node.kind(), NodeKind::Input | NodeKind::Output)
}

/// Whether `group` already holds an input and an output interface node for
/// `stage`, as `(has_input, has_output)`.
pub fn interface_presence(group: &GroupNode, stage: Stage) -> (bool, bool) {
    let mut has_input = false;
    let mut has_output = false;
    for (_, node) in group.internal_nodes(stage) {
        match node.kind() {
            NodeKind::Input => has_input = true,
            NodeKind::Output => has_output = true,
            _ => {}
        }
    }
    (has_input, has_output)
}

/// Make sure `group` holds an interface pair for `stage`, creating whichever
/// half is missing with allocator-assigned ids.
///
/// Existing interface nodes are kept, so the call is idempotent. Returns the
/// ids of the `(input, output)` pair.
pub fn ensure_group_interface(
    group: &mut GroupNode,
    stage: Stage,
    mode: ShaderMode,
) -> Result<(NodeId, NodeId), GraphError> {
    let mut input_id = None;
    let mut output_id = None;
    for (id, node) in group.internal_nodes(stage) {
        match node.kind() {
            NodeKind::Input if input_id.is_none() => input_id = Some(id),
            NodeKind::Output if output_id.is_none() => output_id = Some(id),
            _ => {}
        }
    }

    let input_id = match input_id {
        Some(id) => id,
        None => {
            let id = group.allocate_internal_node_id(stage)?;
            group.add_internal_node(
                stage,
                ShaderNode::Input(InputNode::new("color")),
                [-200.0, 0.0],
                id,
            )?;
            id
        }
    };
    let output_id = match output_id {
        Some(id) => id,
        None => {
            let id = group.allocate_internal_node_id(stage)?;
            group.add_internal_node(
                stage,
                ShaderNode::Output(OutputNode::new(mode, stage)),
                [200.0, 0.0],
                id,
            )?;
            id
        }
    };
    Ok((input_id, output_id))
}
