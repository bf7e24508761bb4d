// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip definitions for the sequencer.
//!
//! A clip is the unit of scheduling: a `[start_time, end_time)` interval plus
//! a typed payload describing the effect a process performs while the clip is
//! active.

use crate::binding::{AssetRef, AttachBinding};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime type of a clip, used as the process binding key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClipType {
    /// Animation playback
    Animation,
    /// Audio playback
    Audio,
    /// Object spawn
    Spawn,
    /// Damage detection volume
    DamageDetect,
    /// Camera effect
    Camera,
    /// Generic skill event
    Event,
    /// Owner movement
    Movement,
}

impl ClipType {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Animation => "Animation",
            Self::Audio => "Audio",
            Self::Spawn => "Spawn",
            Self::DamageDetect => "Damage Detect",
            Self::Camera => "Camera",
            Self::Event => "Event",
            Self::Movement => "Movement",
        }
    }

    /// Get the clip color
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Animation => [100, 150, 255],
            Self::Audio => [200, 100, 255],
            Self::Spawn => [150, 255, 100],
            Self::DamageDetect => [255, 90, 90],
            Self::Camera => [255, 100, 150],
            Self::Event => [255, 200, 100],
            Self::Movement => [100, 220, 220],
        }
    }

    /// All clip types
    pub fn all() -> &'static [ClipType] {
        &[
            ClipType::Animation,
            ClipType::Audio,
            ClipType::Spawn,
            ClipType::DamageDetect,
            ClipType::Camera,
            ClipType::Event,
            ClipType::Movement,
        ]
    }
}

/// Animation playback parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Animation asset
    pub animation: AssetRef,
    /// Target animation layer
    pub layer: u32,
    /// Cross-fade duration in seconds
    pub fade_duration: f32,
    /// Playback speed (multiplied by the session speed)
    pub speed: f32,
    /// Layer mask override applied while the clip is active
    pub mask: Option<AssetRef>,
}

impl AnimationClip {
    /// Create animation parameters for a layer
    pub fn new(animation: impl Into<String>, layer: u32) -> Self {
        Self {
            animation: AssetRef::new(animation),
            layer,
            fade_duration: 0.1,
            speed: 1.0,
            mask: None,
        }
    }

    /// Set the layer mask override
    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = Some(AssetRef::new(mask));
        self
    }
}

/// Audio playback parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    /// Sound asset
    pub sound: AssetRef,
    /// Volume (0 to 1)
    pub volume: f32,
    /// Pitch multiplier
    pub pitch: f32,
    /// Loop the sound while the clip is active
    pub looping: bool,
    /// Play positionally at an attach point
    pub attach: Option<AttachBinding>,
    /// Stop the sound when the clip exits
    pub stop_on_exit: bool,
}

impl AudioClip {
    /// Create audio parameters
    pub fn new(sound: impl Into<String>) -> Self {
        Self {
            sound: AssetRef::new(sound),
            volume: 1.0,
            pitch: 1.0,
            looping: false,
            attach: None,
            stop_on_exit: true,
        }
    }
}

/// Object spawn parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnClip {
    /// Prefab asset
    pub prefab: AssetRef,
    /// Where to spawn on the owner
    pub attach: AttachBinding,
    /// Tag passed to the spawned object
    pub tag: String,
    /// Detach from the owner after spawning
    pub detach: bool,
    /// Destroy the object when the clip exits (ignored for detached objects)
    pub destroy_on_exit: bool,
}

impl SpawnClip {
    /// Create spawn parameters
    pub fn new(prefab: impl Into<String>, attach: AttachBinding) -> Self {
        Self {
            prefab: AssetRef::new(prefab),
            attach,
            tag: String::new(),
            detach: false,
            destroy_on_exit: true,
        }
    }
}

/// Hit volume shape for damage detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitShape {
    /// Sphere
    Sphere {
        /// Radius
        radius: f32,
    },
    /// Oriented box
    Box {
        /// Half extents
        half_extents: [f32; 3],
    },
    /// Horizontal sector in front of the attach point
    Sector {
        /// Radius
        radius: f32,
        /// Opening angle in degrees
        angle: f32,
    },
}

impl Default for HitShape {
    fn default() -> Self {
        Self::Sphere { radius: 1.0 }
    }
}

/// Damage detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageDetectClip {
    /// Detection volume
    pub shape: HitShape,
    /// Where the volume is anchored
    pub attach: AttachBinding,
    /// Tag reported with each detection
    pub event_tag: String,
    /// Classification tags (e.g. "melee", "fire")
    pub tags: Vec<String>,
    /// Run one detection immediately on enter
    pub detect_on_enter: bool,
    /// Maximum number of targets per activation
    pub max_targets: Option<u32>,
}

impl DamageDetectClip {
    /// Create detection parameters
    pub fn new(shape: HitShape, event_tag: impl Into<String>) -> Self {
        Self {
            shape,
            attach: AttachBinding::default(),
            event_tag: event_tag.into(),
            tags: Vec::new(),
            detect_on_enter: true,
            max_targets: None,
        }
    }
}

/// Camera effect kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraEffect {
    /// Camera shake
    Shake {
        /// Amplitude
        intensity: f32,
        /// Oscillation frequency in Hz
        frequency: f32,
    },
    /// Field-of-view change
    FieldOfView {
        /// Target FOV in degrees
        fov: f32,
    },
    /// Radial blur
    RadialBlur {
        /// Blur strength
        strength: f32,
    },
}

/// Camera effect parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraClip {
    /// Effect to apply
    pub effect: CameraEffect,
    /// Blend in/out duration
    pub blend_duration: f32,
}

/// Generic event parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventClip {
    /// Event name/type
    pub event_name: String,
    /// Additional parameters
    pub parameters: IndexMap<String, String>,
}

impl EventClip {
    /// Create an event with no parameters
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            parameters: IndexMap::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Owner movement parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementClip {
    /// Total displacement over the clip duration
    pub displacement: [f32; 3],
    /// Displacement is in the owner's local space
    pub local_space: bool,
}

/// Typed payload of a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipKind {
    /// Animation playback
    Animation(AnimationClip),
    /// Audio playback
    Audio(AudioClip),
    /// Object spawn
    Spawn(SpawnClip),
    /// Damage detection
    DamageDetect(DamageDetectClip),
    /// Camera effect
    Camera(CameraClip),
    /// Generic event
    Event(EventClip),
    /// Owner movement
    Movement(MovementClip),
}

impl ClipKind {
    /// Runtime type of this payload
    pub fn clip_type(&self) -> ClipType {
        match self {
            Self::Animation(_) => ClipType::Animation,
            Self::Audio(_) => ClipType::Audio,
            Self::Spawn(_) => ClipType::Spawn,
            Self::DamageDetect(_) => ClipType::DamageDetect,
            Self::Camera(_) => ClipType::Camera,
            Self::Event(_) => ClipType::Event,
            Self::Movement(_) => ClipType::Movement,
        }
    }

    /// Asset references held by this payload
    pub fn asset_refs(&self) -> Vec<&AssetRef> {
        match self {
            Self::Animation(anim) => std::iter::once(&anim.animation)
                .chain(anim.mask.as_ref())
                .collect(),
            Self::Audio(audio) => vec![&audio.sound],
            Self::Spawn(spawn) => vec![&spawn.prefab],
            Self::DamageDetect(_) | Self::Camera(_) | Self::Event(_) | Self::Movement(_) => {
                Vec::new()
            }
        }
    }
}

/// A timed clip on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Display name
    pub name: String,
    /// Start time in seconds
    pub start_time: f32,
    /// Duration in seconds
    pub duration: f32,
    /// Disabled clips are never scheduled
    pub enabled: bool,
    /// Typed payload
    pub kind: ClipKind,
}

impl Clip {
    /// Create a new clip
    pub fn new(name: impl Into<String>, start_time: f32, duration: f32, kind: ClipKind) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            start_time,
            duration,
            enabled: true,
            kind,
        }
    }

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Exclusive end of the active interval
    pub fn end_time(&self) -> f32 {
        self.start_time + self.duration
    }

    /// Whether `time` lies in `[start_time, end_time)`
    pub fn contains(&self, time: f32) -> bool {
        time >= self.start_time && time < self.end_time()
    }

    /// Whether the two half-open intervals intersect
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start_time < other.end_time() && other.start_time < self.end_time()
    }

    /// Runtime type of this clip
    pub fn clip_type(&self) -> ClipType {
        self.kind.clip_type()
    }

    /// Normalized progress of `time` through the clip, clamped to `[0, 1]`
    pub fn progress(&self, time: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((time - self.start_time) / self.duration).clamp(0.0, 1.0)
    }
}
