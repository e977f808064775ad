// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader node variants and their port layouts.
//!
//! Nodes form a closed sum type: consumers match on the variant (or on
//! [`NodeKind`]) instead of downcasting. Port layouts are derived from the
//! variant's own data, so a node answers port queries without needing the
//! graph it sits in.

use crate::group::GroupNode;
use crate::port::PortKind;
use crate::stage::{ShaderMode, Stage};
use serde::{Deserialize, Serialize};

/// Identifier of a node within one stage graph.
///
/// Ids are plain integers handed out by the graph's monotonic allocator.
/// Ids below [`NodeId::FIRST_FREE`] are reserved for built-in nodes;
/// [`NodeId::OUTPUT`] is the conventional id of a stage's output node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Conventional id of a stage's built-in output node.
    pub const OUTPUT: NodeId = NodeId(0);
    /// First id the allocator hands out; `0` and `1` stay reserved.
    pub const FIRST_FREE: NodeId = NodeId(2);
}

/// Discriminant for [`ShaderNode`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Reads a built-in stage input
    Input,
    /// Terminates a stage with its write targets
    Output,
    /// RGBA color constant
    ColorConstant,
    /// Scalar constant
    FloatConstant,
    /// 3D vector constant
    VectorConstant,
    /// Scalar binary operator
    FloatOp,
    /// Vector binary operator
    VectorOp,
    /// Nested sub-graph
    Group,
}

/// Reads a built-in stage input such as `uv`, `normal` or `time`.
///
/// The single output port's kind follows the input name; names outside the
/// catalog read as scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputNode {
    input_name: String,
}

impl InputNode {
    /// Create a reader for the named built-in.
    pub fn new(input_name: impl Into<String>) -> Self {
        Self {
            input_name: input_name.into(),
        }
    }

    /// Name of the built-in this node reads.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Point this node at another built-in; the output kind follows.
    pub fn set_input_name(&mut self, input_name: impl Into<String>) {
        self.input_name = input_name.into();
    }

    /// Kind of the single output port, resolved from the input name.
    pub fn output_kind(&self) -> PortKind {
        match self.input_name.as_str() {
            "uv" | "screen_uv" | "point_coord" => PortKind::Vector2,
            "vertex" | "normal" | "tangent" | "binormal" | "view" | "velocity" => {
                PortKind::Vector3
            }
            "color" | "albedo" | "fragcoord" => PortKind::Vector4,
            "model_matrix" | "view_matrix" | "projection_matrix" => PortKind::Transform,
            "front_facing" => PortKind::Boolean,
            "screen_texture" | "depth_texture" => PortKind::Sampler,
            // time, delta, alpha and any unknown name read as a scalar
            _ => PortKind::Scalar,
        }
    }
}

impl Default for InputNode {
    fn default() -> Self {
        Self::new("time")
    }
}

/// Terminates a stage; its input ports are the stage's write targets.
///
/// The port layout is fixed by the `(mode, stage)` pair given at
/// construction. Pairs the mode does not drive have no ports at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNode {
    mode: ShaderMode,
    stage: Stage,
}

impl OutputNode {
    /// Create the output sink for one `(mode, stage)` pair.
    pub fn new(mode: ShaderMode, stage: Stage) -> Self {
        Self { mode, stage }
    }

    /// Shader mode this output was built for.
    pub fn mode(&self) -> ShaderMode {
        self.mode
    }

    /// Stage this output terminates.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Input port layout for this `(mode, stage)` pair.
    pub fn input_ports(&self) -> &'static [(&'static str, PortKind)] {
        match (self.mode, self.stage) {
            (ShaderMode::Spatial, Stage::Vertex) => &[
                ("vertex", PortKind::Vector3),
                ("normal", PortKind::Vector3),
                ("tangent", PortKind::Vector3),
                ("uv", PortKind::Vector2),
            ],
            (ShaderMode::Spatial, Stage::Fragment) => &[
                ("albedo", PortKind::Vector3),
                ("metallic", PortKind::Scalar),
                ("roughness", PortKind::Scalar),
                ("emission", PortKind::Vector3),
                ("alpha", PortKind::Scalar),
                ("normal_map", PortKind::Vector3),
            ],
            (ShaderMode::Spatial, Stage::Light) => &[
                ("diffuse", PortKind::Vector3),
                ("specular", PortKind::Vector3),
                ("alpha", PortKind::Scalar),
            ],
            (ShaderMode::CanvasItem, Stage::Vertex) => {
                &[("vertex", PortKind::Vector2), ("uv", PortKind::Vector2)]
            }
            (ShaderMode::CanvasItem, Stage::Fragment) => &[
                ("color", PortKind::Vector4),
                ("normal_map", PortKind::Vector3),
            ],
            (ShaderMode::CanvasItem, Stage::Light) => &[("light", PortKind::Vector4)],
            (ShaderMode::Particles, Stage::Start | Stage::Process) => &[
                ("color", PortKind::Vector4),
                ("velocity", PortKind::Vector3),
                ("custom", PortKind::Vector4),
                ("transform", PortKind::Transform),
                ("active", PortKind::Boolean),
            ],
            (ShaderMode::Particles, Stage::Collide) => &[
                ("velocity", PortKind::Vector3),
                ("transform", PortKind::Transform),
            ],
            (ShaderMode::Sky, Stage::Sky) => &[
                ("color", PortKind::Vector3),
                ("alpha", PortKind::Scalar),
                ("fog", PortKind::Vector4),
            ],
            (ShaderMode::Fog, Stage::Fog) => &[
                ("density", PortKind::Scalar),
                ("albedo", PortKind::Vector3),
                ("emission", PortKind::Vector3),
            ],
            _ => &[],
        }
    }
}

/// RGBA color constant with a single vec4 output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorConstant {
    /// Constant value, RGBA
    pub value: [f32; 4],
}

impl Default for ColorConstant {
    fn default() -> Self {
        Self {
            value: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Scalar constant with a single float output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloatConstant {
    /// Constant value
    pub value: f32,
}

/// 3D vector constant with a single vec3 output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorConstant {
    /// Constant value
    pub value: [f32; 3],
}

/// Component-wise binary operator applied by [`FloatOp`] and [`VectorOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    /// `a + b`
    #[default]
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
}

/// Vector width a [`VectorOp`] operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VectorArity {
    /// Two components
    Vec2,
    /// Three components
    #[default]
    Vec3,
    /// Four components
    Vec4,
}

impl VectorArity {
    /// Port kind carrying this width.
    pub fn port_kind(self) -> PortKind {
        match self {
            VectorArity::Vec2 => PortKind::Vector2,
            VectorArity::Vec3 => PortKind::Vector3,
            VectorArity::Vec4 => PortKind::Vector4,
        }
    }
}

/// Binary operator over two scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FloatOp {
    /// Operator applied to the two inputs
    pub op: Operator,
}

/// Component-wise binary operator over two vectors of the same width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VectorOp {
    /// Operator applied component-wise
    pub op: Operator,
    /// Width of both inputs and the output
    pub arity: VectorArity,
}

/// A node in a shader graph.
#[derive(Debug, Clone)]
pub enum ShaderNode {
    /// Reads a built-in stage input
    Input(InputNode),
    /// Terminates a stage
    Output(OutputNode),
    /// RGBA constant
    ColorConstant(ColorConstant),
    /// Scalar constant
    FloatConstant(FloatConstant),
    /// 3D vector constant
    VectorConstant(VectorConstant),
    /// Scalar binary operator
    FloatOp(FloatOp),
    /// Vector binary operator
    VectorOp(VectorOp),
    /// Nested sub-graph with its own id space
    Group(Box<GroupNode>),
}

impl ShaderNode {
    /// The variant discriminant.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Input(_) => NodeKind::Input,
            Self::Output(_) => NodeKind::Output,
            Self::ColorConstant(_) => NodeKind::ColorConstant,
            Self::FloatConstant(_) => NodeKind::FloatConstant,
            Self::VectorConstant(_) => NodeKind::VectorConstant,
            Self::FloatOp(_) => NodeKind::FloatOp,
            Self::VectorOp(_) => NodeKind::VectorOp,
            Self::Group(_) => NodeKind::Group,
        }
    }

    /// Number of input ports.
    pub fn input_port_count(&self) -> u32 {
        match self {
            Self::Input(_)
            | Self::ColorConstant(_)
            | Self::FloatConstant(_)
            | Self::VectorConstant(_) => 0,
            Self::Output(output) => output.input_ports().len() as u32,
            Self::FloatOp(_) | Self::VectorOp(_) => 2,
            Self::Group(_) => 1,
        }
    }

    /// Kind of input port `port`, `None` when out of range.
    pub fn input_port_kind(&self, port: u32) -> Option<PortKind> {
        match self {
            Self::Input(_)
            | Self::ColorConstant(_)
            | Self::FloatConstant(_)
            | Self::VectorConstant(_) => None,
            Self::Output(output) => {
                output.input_ports().get(port as usize).map(|(_, kind)| *kind)
            }
            Self::FloatOp(_) => (port < 2).then_some(PortKind::Scalar),
            Self::VectorOp(op) => (port < 2).then_some(op.arity.port_kind()),
            Self::Group(_) => (port == 0).then_some(PortKind::Vector4),
        }
    }

    /// Name of input port `port`, `None` when out of range.
    pub fn input_port_name(&self, port: u32) -> Option<&str> {
        match self {
            Self::Input(_)
            | Self::ColorConstant(_)
            | Self::FloatConstant(_)
            | Self::VectorConstant(_) => None,
            Self::Output(output) => {
                output.input_ports().get(port as usize).map(|(name, _)| *name)
            }
            Self::FloatOp(_) | Self::VectorOp(_) => match port {
                0 => Some("a"),
                1 => Some("b"),
                _ => None,
            },
            Self::Group(_) => (port == 0).then_some("in"),
        }
    }

    /// Number of output ports.
    pub fn output_port_count(&self) -> u32 {
        match self {
            Self::Output(_) => 0,
            _ => 1,
        }
    }

    /// Kind of output port `port`, `None` when out of range.
    pub fn output_port_kind(&self, port: u32) -> Option<PortKind> {
        if port >= self.output_port_count() {
            return None;
        }
        match self {
            Self::Input(input) => Some(input.output_kind()),
            Self::Output(_) => None,
            Self::ColorConstant(_) | Self::Group(_) => Some(PortKind::Vector4),
            Self::FloatConstant(_) | Self::FloatOp(_) => Some(PortKind::Scalar),
            Self::VectorConstant(_) => Some(PortKind::Vector3),
            Self::VectorOp(op) => Some(op.arity.port_kind()),
        }
    }

    /// Name of output port `port`, `None` when out of range.
    pub fn output_port_name(&self, port: u32) -> Option<&str> {
        if port >= self.output_port_count() {
            return None;
        }
        match self {
            Self::Input(input) => Some(input.input_name()),
            Self::Output(_) => None,
            Self::ColorConstant(_) => Some("color"),
            Self::FloatConstant(_) => Some("value"),
            Self::VectorConstant(_) => Some("vector"),
            Self::FloatOp(_) | Self::VectorOp(_) => Some("result"),
            Self::Group(_) => Some("out"),
        }
    }

    /// Borrow the group payload, `None` for other variants.
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Mutably borrow the group payload, `None` for other variants.
    pub fn as_group_mut(&mut self) -> Option<&mut GroupNode> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }
}

impl From<GroupNode> for ShaderNode {
    fn from(group: GroupNode) -> Self {
        Self::Group(Box::new(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_catalog_resolution() {
        assert_eq!(InputNode::new("uv").output_kind(), PortKind::Vector2);
        assert_eq!(InputNode::new("normal").output_kind(), PortKind::Vector3);
        assert_eq!(InputNode::new("color").output_kind(), PortKind::Vector4);
        assert_eq!(InputNode::new("time").output_kind(), PortKind::Scalar);
        assert_eq!(
            InputNode::new("model_matrix").output_kind(),
            PortKind::Transform
        );
        assert_eq!(
            InputNode::new("screen_texture").output_kind(),
            PortKind::Sampler
        );
        // Names outside the catalog read as scalars
        assert_eq!(InputNode::new("GroupInput").output_kind(), PortKind::Scalar);
    }

    #[test]
    fn test_input_rename_changes_output_kind() {
        let mut input = InputNode::new("uv");
        assert_eq!(input.output_kind(), PortKind::Vector2);
        input.set_input_name("normal");
        assert_eq!(input.input_name(), "normal");
        assert_eq!(input.output_kind(), PortKind::Vector3);
    }

    #[test]
    fn test_output_layout_follows_mode_and_stage() {
        let spatial_vertex = OutputNode::new(ShaderMode::Spatial, Stage::Vertex);
        assert_eq!(spatial_vertex.input_ports().len(), 4);
        assert_eq!(spatial_vertex.input_ports()[0], ("vertex", PortKind::Vector3));

        let canvas_fragment = OutputNode::new(ShaderMode::CanvasItem, Stage::Fragment);
        assert_eq!(canvas_fragment.input_ports()[0], ("color", PortKind::Vector4));

        let fog = OutputNode::new(ShaderMode::Fog, Stage::Fog);
        assert_eq!(fog.input_ports()[0], ("density", PortKind::Scalar));
    }

    #[test]
    fn test_output_layout_empty_for_undriven_pairs() {
        assert!(OutputNode::new(ShaderMode::CanvasItem, Stage::Process)
            .input_ports()
            .is_empty());
        assert!(OutputNode::new(ShaderMode::Sky, Stage::Vertex)
            .input_ports()
            .is_empty());
        assert!(OutputNode::new(ShaderMode::Spatial, Stage::Max)
            .input_ports()
            .is_empty());
    }

    #[test]
    fn test_output_node_has_no_output_ports() {
        let node = ShaderNode::Output(OutputNode::new(ShaderMode::Spatial, Stage::Fragment));
        assert_eq!(node.output_port_count(), 0);
        assert_eq!(node.output_port_kind(0), None);
        assert!(node.input_port_count() > 0);
        assert_eq!(node.input_port_name(0), Some("albedo"));
    }

    #[test]
    fn test_constant_output_kinds() {
        let color = ShaderNode::ColorConstant(ColorConstant::default());
        assert_eq!(color.output_port_kind(0), Some(PortKind::Vector4));
        assert_eq!(color.input_port_count(), 0);
        assert_eq!(color.input_port_kind(0), None);

        let float = ShaderNode::FloatConstant(FloatConstant { value: 2.5 });
        assert_eq!(float.output_port_kind(0), Some(PortKind::Scalar));

        let vector = ShaderNode::VectorConstant(VectorConstant::default());
        assert_eq!(vector.output_port_kind(0), Some(PortKind::Vector3));
    }

    #[test]
    fn test_op_ports_follow_arity() {
        let float_op = ShaderNode::FloatOp(FloatOp { op: Operator::Multiply });
        assert_eq!(float_op.input_port_count(), 2);
        assert_eq!(float_op.input_port_kind(1), Some(PortKind::Scalar));
        assert_eq!(float_op.output_port_kind(0), Some(PortKind::Scalar));
        assert_eq!(float_op.input_port_name(0), Some("a"));
        assert_eq!(float_op.input_port_name(1), Some("b"));

        let vec_op = ShaderNode::VectorOp(VectorOp {
            op: Operator::Add,
            arity: VectorArity::Vec4,
        });
        assert_eq!(vec_op.input_port_kind(0), Some(PortKind::Vector4));
        assert_eq!(vec_op.output_port_kind(0), Some(PortKind::Vector4));
        assert_eq!(vec_op.input_port_kind(2), None);
    }

    #[test]
    fn test_group_passthrough_ports() {
        let node = ShaderNode::from(GroupNode::new());
        assert_eq!(node.kind(), NodeKind::Group);
        assert_eq!(node.input_port_count(), 1);
        assert_eq!(node.input_port_kind(0), Some(PortKind::Vector4));
        assert_eq!(node.output_port_kind(0), Some(PortKind::Vector4));
        assert_eq!(node.input_port_name(0), Some("in"));
        assert_eq!(node.output_port_name(0), Some("out"));
        assert!(node.as_group().is_some());
    }

    #[test]
    fn test_port_queries_out_of_range() {
        let node = ShaderNode::FloatConstant(FloatConstant::default());
        assert_eq!(node.output_port_kind(1), None);
        assert_eq!(node.output_port_name(1), None);
        assert_eq!(node.input_port_name(0), None);
    }
}
