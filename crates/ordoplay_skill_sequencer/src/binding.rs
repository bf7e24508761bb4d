// SPDX-License-Identifier: MIT OR Apache-2.0
//! Actor, attach-point and asset references used by clips.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor ID for the owner of a skill session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Create a new random actor ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identifier of an external asset (animation, sound, prefab, mask).
///
/// Clips only store the identifier; resolving it to a loaded asset is the
/// host's job, done before or after (de)serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetRef(pub String);

impl AssetRef {
    /// Create an asset reference from an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named attach point on the owning actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BindPoint {
    /// Actor root transform
    #[default]
    Root,
    /// Head bone
    Head,
    /// Chest / spine bone
    Chest,
    /// Left hand bone
    LeftHand,
    /// Right hand bone
    RightHand,
    /// Left foot bone
    LeftFoot,
    /// Right foot bone
    RightFoot,
    /// Weapon socket
    Weapon,
    /// Custom bone, resolved by name
    Custom,
}

impl BindPoint {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Head => "Head",
            Self::Chest => "Chest",
            Self::LeftHand => "Left Hand",
            Self::RightHand => "Right Hand",
            Self::LeftFoot => "Left Foot",
            Self::RightFoot => "Right Foot",
            Self::Weapon => "Weapon",
            Self::Custom => "Custom",
        }
    }
}

/// Binding of a clip to an attach point on the owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttachBinding {
    /// Attach point
    pub bind_point: BindPoint,
    /// Bone name when `bind_point` is `Custom`
    pub custom_name: Option<String>,
    /// Local position offset
    pub offset: [f32; 3],
    /// Local rotation offset (euler degrees)
    pub rotation: [f32; 3],
}

impl AttachBinding {
    /// Bind to a standard attach point
    pub fn point(bind_point: BindPoint) -> Self {
        Self {
            bind_point,
            ..Self::default()
        }
    }

    /// Bind to a custom bone by name
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            bind_point: BindPoint::Custom,
            custom_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the local offset
    pub fn with_offset(mut self, offset: [f32; 3]) -> Self {
        self.offset = offset;
        self
    }
}

/// Host-side transform handle returned by bone lookups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformRef {
    /// Host handle of the transform
    pub handle: u64,
    /// World position at lookup time
    pub position: [f32; 3],
    /// World rotation (euler degrees) at lookup time
    pub rotation: [f32; 3],
}

impl TransformRef {
    /// Position with a local offset applied (rotation ignored)
    pub fn offset_position(&self, offset: [f32; 3]) -> [f32; 3] {
        [
            self.position[0] + offset[0],
            self.position[1] + offset[1],
            self.position[2] + offset[2],
        ]
    }
}
