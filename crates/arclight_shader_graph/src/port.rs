// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port kinds and the connection compatibility policy.

use serde::{Deserialize, Serialize};

/// Data kind that flows through a shader port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortKind {
    /// Single float
    Scalar,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector / color
    Vector4,
    /// Boolean value
    Boolean,
    /// 4x4 matrix
    Transform,
    /// Texture sampler
    Sampler,
}

impl PortKind {
    /// Check if a value of this kind can drive a port of kind `other`.
    ///
    /// Kinds match themselves, and a scalar broadcasts into any vector.
    /// Nothing else converts implicitly: vectors of different widths,
    /// booleans, transforms and samplers only accept their own kind.
    pub fn can_connect_to(self, other: PortKind) -> bool {
        if self == other {
            return true;
        }
        matches!(
            (self, other),
            (
                Self::Scalar,
                Self::Vector2 | Self::Vector3 | Self::Vector4
            )
        )
    }

    /// Whether this kind is one of the vector kinds.
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Vector2 | Self::Vector3 | Self::Vector4)
    }
}
