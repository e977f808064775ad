// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual shader graph model for the Arclight editor.
//!
//! This crate holds the data model a shader editor manipulates:
//! - Stage-keyed node graphs with typed ports
//! - Group nodes owning nested graphs with independent id spaces
//! - Connection validation: port kinds, single drivers, cycle rejection
//! - Replay-script assets for persistence
//!
//! ## Architecture
//!
//! One [`StageGraph`] per shader stage stores node slots, connections and a
//! monotonic id watermark. [`ShaderGraph`] keys a full set of stage graphs
//! by [`Stage`] and owns shader-wide state (mode, varyings), seeding each
//! stage with its built-in output node. [`GroupNode`] owns a second,
//! independent set of stage graphs for its internals; its `internal_*`
//! operations mirror the top-level surface. Rendering, code generation and
//! UI live in other crates; this one only guards graph consistency.

pub mod asset;
pub mod connection;
pub mod editing;
pub mod error;
pub mod graph;
pub mod group;
pub mod node;
pub mod port;
pub mod shader;
pub mod stage;

pub use asset::{GroupAsset, NodeRecord, NodeSpec, ShaderGraphAsset, StageRecord};
pub use connection::Connection;
pub use editing::{GroupEditMode, GroupTarget};
pub use error::GraphError;
pub use graph::StageGraph;
pub use group::GroupNode;
pub use node::{NodeId, NodeKind, ShaderNode};
pub use port::PortKind;
pub use shader::{ShaderGraph, Varying, VaryingMode};
pub use stage::{ShaderMode, Stage};
