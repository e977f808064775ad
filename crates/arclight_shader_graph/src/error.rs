// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors shared by graph mutations and the id allocator.

use crate::node::NodeId;

/// Error produced by shader graph mutations.
///
/// Read-only lookups report absence through `Option` instead; these variants
/// are for operations that were asked to change something and could not.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The stage sentinel (or an out-of-range stage index) was passed
    #[error("Invalid shader stage")]
    InvalidStage,

    /// Node id already occupied
    #[error("Node id already in use: {0:?}")]
    DuplicateId(NodeId),

    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port index out of range for the node's layout
    #[error("No such port on {node:?}: {port}")]
    InvalidPort {
        /// Node whose layout was consulted
        node: NodeId,
        /// Offending port index
        port: u32,
    },

    /// Source and target port kinds are incompatible
    #[error("Incompatible port kinds")]
    TypeMismatch,

    /// The edge would close a cycle
    #[error("Connection would create a cycle")]
    CycleRejected,

    /// The input port already has a driver
    #[error("Input port already connected: {node:?} port {port}")]
    PortAlreadyConnected {
        /// Target node
        node: NodeId,
        /// Target input port index
        port: u32,
    },

    /// Source and target are the same node
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// No such connection to remove
    #[error("Connection not found")]
    ConnectionNotFound,

    /// A varying with this name already exists
    #[error("Varying already exists: {0}")]
    DuplicateVarying(String),

    /// No varying with this name
    #[error("Varying not found: {0}")]
    VaryingNotFound(String),

    /// Samplers cannot be carried between stages
    #[error("Invalid varying kind")]
    InvalidVaryingKind,
}
