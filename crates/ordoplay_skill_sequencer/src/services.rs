// SPDX-License-Identifier: MIT OR Apache-2.0
//! Capability interfaces supplied by the host engine.
//!
//! Processes reach these through the
//! [`ExecutionContext`](crate::context::ExecutionContext) service locator,
//! registered as `Arc<dyn Trait>`. All methods take `&self`; implementations
//! that need mutation use interior mutability. Any of them may be absent, in
//! which case the processes that need them do nothing.

use crate::binding::{ActorId, AssetRef, BindPoint, TransformRef};
use crate::clip::{CameraEffect, HitShape};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Handle of a playing sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundId(pub u64);

/// Handle of a spawned object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnHandle(pub u64);

/// Handle of a running camera effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraEffectHandle(pub u64);

/// Host identifier of a damageable target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// Animation graph of the owning actor
pub trait AnimationBridge: Send + Sync {
    /// Build the playable graph
    fn initialize(&self);
    /// Tear down the playable graph
    fn clear_graph(&self);
    /// Cross-fade to an animation on a layer
    fn play_animation(&self, animation: &AssetRef, layer: u32, fade_duration: f32, speed: f32);
    /// Set the playback speed of a layer
    fn set_layer_speed(&self, layer: u32, speed: f32);
    /// Replace the mask of a layer (`None` clears it)
    fn set_layer_mask(&self, layer: u32, mask: Option<&AssetRef>);
    /// Current mask of a layer
    fn layer_mask(&self, layer: u32) -> Option<AssetRef>;
    /// Sample the graph at an absolute time
    fn evaluate(&self, time: f32);
    /// Advance the graph by a delta
    fn manual_update(&self, delta_time: f32);
}

/// Arguments for starting a sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundArgs {
    /// Volume (0 to 1)
    pub volume: f32,
    /// Pitch multiplier
    pub pitch: f32,
    /// Loop until stopped
    pub looping: bool,
    /// World position for spatial sounds
    pub position: Option<[f32; 3]>,
}

/// Audio playback
pub trait AudioBridge: Send + Sync {
    /// Start a sound; `None` if it could not be played
    fn play_sound(&self, sound: &AssetRef, args: &SoundArgs) -> Option<SoundId>;
    /// Stop a sound
    fn stop_sound(&self, id: SoundId);
    /// Update a playing sound
    fn update_sound(&self, id: SoundId, volume: f32, pitch: f32, time: f32);
    /// Stop every sound started through this bridge
    fn stop_all(&self);
}

/// Object spawning
pub trait SpawnBridge: Send + Sync {
    /// Spawn a prefab; `None` if it could not be spawned
    fn spawn_object(
        &self,
        prefab: &AssetRef,
        position: [f32; 3],
        rotation: [f32; 3],
        tag: &str,
        detach: bool,
        parent: Option<&TransformRef>,
    ) -> Option<SpawnHandle>;
    /// Destroy a spawned object
    fn destroy_spawned_object(&self, handle: SpawnHandle);
}

/// A damage detection result
#[derive(Debug, Clone, PartialEq)]
pub struct DamageData {
    /// Detecting actor
    pub source: Option<ActorId>,
    /// Newly hit targets
    pub targets: Vec<TargetId>,
    /// Event tag of the detecting clip
    pub event_tag: String,
    /// Classification tags
    pub tags: Vec<String>,
}

/// Receiver of damage detections
pub trait DamageBridge: Send + Sync {
    /// Called when targets are detected
    fn on_damage_detect(&self, data: &DamageData);
}

/// Physics overlap query used by damage detection
pub trait HitQuery: Send + Sync {
    /// Targets inside `shape` placed at `position`/`rotation`
    fn overlap(&self, shape: &HitShape, position: [f32; 3], rotation: [f32; 3]) -> Vec<TargetId>;
}

/// Generic skill events
pub trait EventBridge: Send + Sync {
    /// Fire a named event
    fn on_skill_event(&self, name: &str, parameters: &IndexMap<String, String>);
}

/// Owning actor lookups
pub trait ActorBridge: Send + Sync {
    /// Resolve an attach point
    fn bone(&self, bind_point: BindPoint, custom_name: Option<&str>) -> Option<TransformRef>;
    /// Move the actor
    fn translate(&self, delta: [f32; 3], local_space: bool);
}

/// Camera effects
pub trait CameraBridge: Send + Sync {
    /// Start an effect
    fn start_effect(&self, effect: &CameraEffect, blend_duration: f32) -> Option<CameraEffectHandle>;
    /// Stop an effect
    fn stop_effect(&self, handle: CameraEffectHandle, blend_duration: f32);
    /// Stop every running effect
    fn stop_all_effects(&self);
}
