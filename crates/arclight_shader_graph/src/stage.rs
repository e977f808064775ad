// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader stages and shader modes.

use serde::{Deserialize, Serialize};

/// A shader pipeline stage.
///
/// Every graph owns one sub-graph per stage; which stages actually produce
/// code depends on the [`ShaderMode`]. `Max` is an upper-bound sentinel, not
/// a stage: operations handed `Max` fail with
/// [`InvalidStage`](crate::GraphError::InvalidStage) or report absence, they
/// never panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Stage {
    /// Vertex processing (spatial and canvas-item shaders)
    Vertex = 0,
    /// Fragment shading (spatial and canvas-item shaders)
    Fragment = 1,
    /// Per-light shading (spatial and canvas-item shaders)
    Light = 2,
    /// Particle emission (particle shaders)
    Start = 3,
    /// Particle simulation step (particle shaders)
    Process = 4,
    /// Particle collision response (particle shaders)
    Collide = 5,
    /// Sky rendering (sky shaders)
    Sky = 6,
    /// Volumetric fog (fog shaders)
    Fog = 7,
    /// Upper-bound sentinel; never a valid stage
    Max = 8,
}

impl Stage {
    /// Number of real stages; excludes the `Max` sentinel.
    pub const COUNT: usize = 8;

    /// Every real stage, in pipeline order.
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::Vertex,
        Stage::Fragment,
        Stage::Light,
        Stage::Start,
        Stage::Process,
        Stage::Collide,
        Stage::Sky,
        Stage::Fog,
    ];

    /// Index into per-stage storage; `None` for the sentinel.
    pub fn index(self) -> Option<usize> {
        match self {
            Stage::Max => None,
            _ => Some(self as usize),
        }
    }

    /// The stage stored at `index`, rejecting out-of-range values.
    pub fn from_index(index: usize) -> Option<Stage> {
        Stage::ALL.get(index).copied()
    }
}

/// Shader mode, which decides the stages a graph drives and the write
/// targets its output nodes expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShaderMode {
    /// 3D material shading
    #[default]
    Spatial,
    /// 2D material shading
    CanvasItem,
    /// Particle simulation
    Particles,
    /// Sky rendering
    Sky,
    /// Volumetric fog
    Fog,
}

impl ShaderMode {
    /// The stages this mode drives, in pipeline order.
    pub fn stages(self) -> &'static [Stage] {
        match self {
            ShaderMode::Spatial | ShaderMode::CanvasItem => {
                &[Stage::Vertex, Stage::Fragment, Stage::Light]
            }
            ShaderMode::Particles => &[Stage::Start, Stage::Process, Stage::Collide],
            ShaderMode::Sky => &[Stage::Sky],
            ShaderMode::Fog => &[Stage::Fog],
        }
    }

    /// Whether `stage` produces code under this mode.
    pub fn drives(self, stage: Stage) -> bool {
        self.stages().contains(&stage)
    }
}
