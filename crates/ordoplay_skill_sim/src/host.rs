// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless host implementing every capability bridge.
//!
//! Each bridge call is logged and buffered as a line of text; the simulation
//! drains the buffer after every step and stamps it with the session time.

use indexmap::IndexMap;
use ordoplay_skill_sequencer::services::{
    ActorBridge, AnimationBridge, AudioBridge, CameraBridge, CameraEffectHandle, DamageBridge,
    DamageData, EventBridge, HitQuery, SoundArgs, SoundId, SpawnBridge, SpawnHandle, TargetId,
};
use ordoplay_skill_sequencer::{
    AssetRef, BindPoint, CameraEffect, ExecutionContext, HitShape, TransformRef,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct HostState {
    calls: Vec<String>,
    next_handle: u64,
    masks: HashMap<u32, AssetRef>,
    position: [f32; 3],
}

impl HostState {
    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Logging stand-in for the engine
#[derive(Default)]
pub struct SimHost {
    state: Mutex<HostState>,
    targets: Vec<TargetId>,
}

impl SimHost {
    /// Create a host whose hit queries report `targets`
    pub fn new(targets: impl IntoIterator<Item = u64>) -> Self {
        Self {
            state: Mutex::default(),
            targets: targets.into_iter().map(TargetId).collect(),
        }
    }

    /// Register this host as every service on a context
    pub fn install(self: &Arc<Self>, ctx: &mut ExecutionContext) {
        ctx.add_service::<dyn AnimationBridge>(self.clone());
        ctx.add_service::<dyn AudioBridge>(self.clone());
        ctx.add_service::<dyn SpawnBridge>(self.clone());
        ctx.add_service::<dyn DamageBridge>(self.clone());
        ctx.add_service::<dyn HitQuery>(self.clone());
        ctx.add_service::<dyn EventBridge>(self.clone());
        ctx.add_service::<dyn ActorBridge>(self.clone());
        ctx.add_service::<dyn CameraBridge>(self.clone());
    }

    /// Take the calls recorded since the last drain
    pub fn drain_calls(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().calls)
    }

    /// Accumulated actor translation
    pub fn position(&self) -> [f32; 3] {
        self.state.lock().position
    }

    fn record(&self, call: String) {
        tracing::debug!(target: "ordoplay_skill_sim::host", "{}", call);
        self.state.lock().calls.push(call);
    }
}

impl AnimationBridge for SimHost {
    fn initialize(&self) {
        self.record("animation.initialize".into());
    }

    fn clear_graph(&self) {
        self.record("animation.clear_graph".into());
    }

    fn play_animation(&self, animation: &AssetRef, layer: u32, fade_duration: f32, speed: f32) {
        self.record(format!(
            "animation.play {} layer={} fade={} speed={}",
            animation, layer, fade_duration, speed
        ));
    }

    fn set_layer_speed(&self, _layer: u32, _speed: f32) {}

    fn set_layer_mask(&self, layer: u32, mask: Option<&AssetRef>) {
        {
            let mut state = self.state.lock();
            match mask {
                Some(mask) => state.masks.insert(layer, mask.clone()),
                None => state.masks.remove(&layer),
            };
        }
        let shown = mask.map_or("none", AssetRef::as_str);
        self.record(format!("animation.mask layer={} {}", layer, shown));
    }

    fn layer_mask(&self, layer: u32) -> Option<AssetRef> {
        self.state.lock().masks.get(&layer).cloned()
    }

    fn evaluate(&self, time: f32) {
        self.record(format!("animation.evaluate {:.3}", time));
    }

    fn manual_update(&self, _delta_time: f32) {}
}

impl AudioBridge for SimHost {
    fn play_sound(&self, sound: &AssetRef, args: &SoundArgs) -> Option<SoundId> {
        let id = self.state.lock().handle();
        self.record(format!(
            "audio.play {} id={} volume={} looping={}",
            sound, id, args.volume, args.looping
        ));
        Some(SoundId(id))
    }

    fn stop_sound(&self, id: SoundId) {
        self.record(format!("audio.stop {}", id.0));
    }

    fn update_sound(&self, _id: SoundId, _volume: f32, _pitch: f32, _time: f32) {}

    fn stop_all(&self) {
        self.record("audio.stop_all".into());
    }
}

impl SpawnBridge for SimHost {
    fn spawn_object(
        &self,
        prefab: &AssetRef,
        position: [f32; 3],
        _rotation: [f32; 3],
        tag: &str,
        detach: bool,
        _parent: Option<&TransformRef>,
    ) -> Option<SpawnHandle> {
        let id = self.state.lock().handle();
        self.record(format!(
            "spawn.create {} id={} tag={} detach={} at={:?}",
            prefab, id, tag, detach, position
        ));
        Some(SpawnHandle(id))
    }

    fn destroy_spawned_object(&self, handle: SpawnHandle) {
        self.record(format!("spawn.destroy {}", handle.0));
    }
}

impl DamageBridge for SimHost {
    fn on_damage_detect(&self, data: &DamageData) {
        let targets: Vec<u64> = data.targets.iter().map(|t| t.0).collect();
        self.record(format!("damage.detect {} targets={:?}", data.event_tag, targets));
    }
}

impl HitQuery for SimHost {
    fn overlap(&self, _shape: &HitShape, _position: [f32; 3], _rotation: [f32; 3]) -> Vec<TargetId> {
        self.targets.clone()
    }
}

impl EventBridge for SimHost {
    fn on_skill_event(&self, name: &str, parameters: &IndexMap<String, String>) {
        self.record(format!("event.fire {} {:?}", name, parameters));
    }
}

impl ActorBridge for SimHost {
    fn bone(&self, bind_point: BindPoint, _custom_name: Option<&str>) -> Option<TransformRef> {
        let height = match bind_point {
            BindPoint::Head => 1.7,
            BindPoint::Chest => 1.3,
            BindPoint::LeftHand | BindPoint::RightHand | BindPoint::Weapon => 1.0,
            BindPoint::Root | BindPoint::LeftFoot | BindPoint::RightFoot | BindPoint::Custom => 0.0,
        };
        let origin = self.state.lock().position;
        Some(TransformRef {
            handle: bind_point as u64,
            position: [origin[0], origin[1] + height, origin[2]],
            rotation: [0.0; 3],
        })
    }

    fn translate(&self, delta: [f32; 3], _local_space: bool) {
        let mut state = self.state.lock();
        for (axis, d) in state.position.iter_mut().zip(delta) {
            *axis += d;
        }
    }
}

impl CameraBridge for SimHost {
    fn start_effect(&self, effect: &CameraEffect, blend_duration: f32) -> Option<CameraEffectHandle> {
        let id = self.state.lock().handle();
        self.record(format!("camera.start {:?} id={} blend={}", effect, id, blend_duration));
        Some(CameraEffectHandle(id))
    }

    fn stop_effect(&self, handle: CameraEffectHandle, _blend_duration: f32) {
        self.record(format!("camera.stop {}", handle.0));
    }

    fn stop_all_effects(&self) {
        self.record("camera.stop_all".into());
    }
}
