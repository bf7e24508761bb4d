// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recording mocks shared by the unit tests.

use crate::binding::{AssetRef, BindPoint, TransformRef};
use crate::clip::{CameraEffect, Clip, ClipType, HitShape};
use crate::context::ExecutionContext;
use crate::process::{PlayMode, Process};
use crate::registry::ProcessRegistry;
use crate::services::{
    ActorBridge, AnimationBridge, AudioBridge, CameraBridge, CameraEffectHandle, DamageBridge,
    DamageData, EventBridge, HitQuery, SoundArgs, SoundId, SpawnBridge, SpawnHandle, TargetId,
};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Lifecycle call observed by a probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Enable,
    Enter,
    Update { time: f32, delta: f32 },
    Exit,
    Disable,
    Cleanup,
}

impl Call {
    pub fn is_update(&self) -> bool {
        matches!(self, Call::Update { .. })
    }
}

/// Ordered log of probe calls, keyed by clip name
#[derive(Default)]
pub struct CallLog {
    entries: Mutex<Vec<(String, Call)>>,
}

impl CallLog {
    pub fn record(&self, name: &str, call: Call) {
        self.entries.lock().push((name.to_string(), call));
    }

    pub fn entries(&self) -> Vec<(String, Call)> {
        self.entries.lock().clone()
    }

    pub fn calls_for(&self, name: &str) -> Vec<Call> {
        self.entries
            .lock()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, c)| *c)
            .collect()
    }

    pub fn count(&self, name: &str, call: Call) -> usize {
        self.calls_for(name).into_iter().filter(|c| *c == call).count()
    }

    pub fn updates_for(&self, name: &str) -> usize {
        self.calls_for(name).iter().filter(|c| c.is_update()).count()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Process that records every lifecycle call into the session's `CallLog`
#[derive(Default)]
pub struct ProbeProcess {
    name: String,
    log: Option<Arc<CallLog>>,
}

impl ProbeProcess {
    fn record(&self, call: Call) {
        if let Some(log) = &self.log {
            log.record(&self.name, call);
        }
    }
}

impl Process for ProbeProcess {
    fn initialize(&mut self, clip: &Clip, ctx: &mut ExecutionContext) {
        self.name = clip.name.clone();
        self.log = ctx.service::<CallLog>();
    }

    fn reset(&mut self) {
        self.name.clear();
        self.log = None;
    }

    fn on_enable(&mut self, ctx: &mut ExecutionContext) {
        self.record(Call::Enable);
        ctx.register_system_cleanup("probe", |ctx| {
            if let Some(log) = ctx.service::<CallLog>() {
                log.record("system", Call::Cleanup);
            }
        });
    }

    fn on_enter(&mut self, _ctx: &mut ExecutionContext) {
        self.record(Call::Enter);
    }

    fn on_update(&mut self, _ctx: &mut ExecutionContext, current_time: f32, delta_time: f32) {
        self.record(Call::Update {
            time: current_time,
            delta: delta_time,
        });
    }

    fn on_exit(&mut self, _ctx: &mut ExecutionContext) {
        self.record(Call::Exit);
    }

    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {
        self.record(Call::Disable);
    }
}

/// Registry binding `ProbeProcess` to every clip type in the given modes
pub fn probe_registry(modes: &[PlayMode]) -> ProcessRegistry {
    let mut registry = ProcessRegistry::new();
    for clip_type in ClipType::all() {
        for mode in modes {
            registry.register::<ProbeProcess>(*clip_type, *mode);
        }
    }
    registry
}

/// Shared string log for bridge mocks
#[derive(Default)]
pub struct Calls(Mutex<Vec<String>>);

impl Calls {
    pub fn push(&self, call: String) {
        self.0.lock().push(call);
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[derive(Default)]
pub struct RecordingAnimation {
    pub calls: Calls,
    masks: Mutex<HashMap<u32, Option<String>>>,
}

impl RecordingAnimation {
    pub fn set_initial_mask(&self, layer: u32, mask: Option<&str>) {
        self.masks.lock().insert(layer, mask.map(str::to_string));
    }

    pub fn current_mask(&self, layer: u32) -> Option<String> {
        self.masks.lock().get(&layer).cloned().flatten()
    }
}

impl AnimationBridge for RecordingAnimation {
    fn initialize(&self) {
        self.calls.push("initialize".into());
    }

    fn clear_graph(&self) {
        self.calls.push("clear_graph".into());
    }

    fn play_animation(&self, animation: &AssetRef, layer: u32, fade_duration: f32, speed: f32) {
        self.calls.push(format!(
            "play_animation {} layer={} fade={} speed={}",
            animation, layer, fade_duration, speed
        ));
    }

    fn set_layer_speed(&self, layer: u32, speed: f32) {
        self.calls.push(format!("set_layer_speed {} {}", layer, speed));
    }

    fn set_layer_mask(&self, layer: u32, mask: Option<&AssetRef>) {
        self.masks.lock().insert(layer, mask.map(|m| m.0.clone()));
    }

    fn layer_mask(&self, layer: u32) -> Option<AssetRef> {
        self.current_mask(layer).map(AssetRef)
    }

    fn evaluate(&self, time: f32) {
        self.calls.push(format!("evaluate {}", time));
    }

    fn manual_update(&self, delta_time: f32) {
        self.calls.push(format!("manual_update {}", delta_time));
    }
}

#[derive(Default)]
pub struct RecordingAudio {
    pub calls: Calls,
    next_id: Mutex<u64>,
    pub fail: Mutex<bool>,
}

impl AudioBridge for RecordingAudio {
    fn play_sound(&self, sound: &AssetRef, args: &SoundArgs) -> Option<SoundId> {
        if *self.fail.lock() {
            return None;
        }
        let mut next = self.next_id.lock();
        *next += 1;
        self.calls
            .push(format!("play_sound {} id={} volume={}", sound, *next, args.volume));
        Some(SoundId(*next))
    }

    fn stop_sound(&self, id: SoundId) {
        self.calls.push(format!("stop_sound {}", id.0));
    }

    fn update_sound(&self, id: SoundId, _volume: f32, _pitch: f32, time: f32) {
        self.calls.push(format!("update_sound {} t={}", id.0, time));
    }

    fn stop_all(&self) {
        self.calls.push("stop_all".into());
    }
}

#[derive(Default)]
pub struct RecordingSpawn {
    pub calls: Calls,
    next_id: Mutex<u64>,
    pub last_position: Mutex<Option<[f32; 3]>>,
}

impl SpawnBridge for RecordingSpawn {
    fn spawn_object(
        &self,
        prefab: &AssetRef,
        position: [f32; 3],
        _rotation: [f32; 3],
        tag: &str,
        detach: bool,
        parent: Option<&TransformRef>,
    ) -> Option<SpawnHandle> {
        let mut next = self.next_id.lock();
        *next += 1;
        *self.last_position.lock() = Some(position);
        self.calls.push(format!(
            "spawn {} id={} tag={} detach={} parent={}",
            prefab,
            *next,
            tag,
            detach,
            parent.map_or(0, |p| p.handle)
        ));
        Some(SpawnHandle(*next))
    }

    fn destroy_spawned_object(&self, handle: SpawnHandle) {
        self.calls.push(format!("destroy {}", handle.0));
    }
}

#[derive(Default)]
pub struct RecordingDamage {
    pub detections: Mutex<Vec<DamageData>>,
}

impl DamageBridge for RecordingDamage {
    fn on_damage_detect(&self, data: &DamageData) {
        self.detections.lock().push(data.clone());
    }
}

/// Hit query returning whatever targets the test put in range
#[derive(Default)]
pub struct StaticHitQuery {
    pub targets: Mutex<Vec<TargetId>>,
}

impl HitQuery for StaticHitQuery {
    fn overlap(&self, _shape: &HitShape, _position: [f32; 3], _rotation: [f32; 3]) -> Vec<TargetId> {
        self.targets.lock().clone()
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    pub events: Mutex<Vec<(String, IndexMap<String, String>)>>,
}

impl EventBridge for RecordingEvents {
    fn on_skill_event(&self, name: &str, parameters: &IndexMap<String, String>) {
        self.events.lock().push((name.to_string(), parameters.clone()));
    }
}

/// Actor whose bones all sit at `origin`; accumulates translations
#[derive(Default)]
pub struct StubActor {
    pub origin: [f32; 3],
    pub moved: Mutex<[f32; 3]>,
}

impl ActorBridge for StubActor {
    fn bone(&self, bind_point: BindPoint, _custom_name: Option<&str>) -> Option<TransformRef> {
        Some(TransformRef {
            handle: bind_point as u64 + 100,
            position: self.origin,
            rotation: [0.0; 3],
        })
    }

    fn translate(&self, delta: [f32; 3], _local_space: bool) {
        let mut moved = self.moved.lock();
        for (axis, d) in moved.iter_mut().zip(delta) {
            *axis += d;
        }
    }
}

#[derive(Default)]
pub struct RecordingCamera {
    pub calls: Calls,
    next_id: Mutex<u64>,
}

impl CameraBridge for RecordingCamera {
    fn start_effect(&self, effect: &CameraEffect, _blend_duration: f32) -> Option<CameraEffectHandle> {
        let mut next = self.next_id.lock();
        *next += 1;
        let kind = match effect {
            CameraEffect::Shake { .. } => "shake",
            CameraEffect::FieldOfView { .. } => "fov",
            CameraEffect::RadialBlur { .. } => "blur",
        };
        self.calls.push(format!("start {} id={}", kind, *next));
        Some(CameraEffectHandle(*next))
    }

    fn stop_effect(&self, handle: CameraEffectHandle, _blend_duration: f32) {
        self.calls.push(format!("stop {}", handle.0));
    }

    fn stop_all_effects(&self) {
        self.calls.push("stop_all".into());
    }
}
