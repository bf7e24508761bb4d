// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in processes, one module per clip kind.
//!
//! Each module exposes `register`, which adds its rows to a
//! [`ProcessRegistry`]. Damage detection and generic events are runtime-only;
//! in preview mode those clips are data without a process.

pub mod animation;
pub mod audio;
pub mod camera;
pub mod damage;
pub mod event;
pub mod movement;
pub mod spawn;

pub use animation::AnimationProcess;
pub use audio::AudioProcess;
pub use camera::CameraProcess;
pub use damage::DamageDetectProcess;
pub use event::EventProcess;
pub use movement::MovementProcess;
pub use spawn::SpawnProcess;

use crate::binding::{AttachBinding, TransformRef};
use crate::context::ExecutionContext;
use crate::registry::ProcessRegistry;
use crate::services::ActorBridge;

/// Register every built-in process
pub fn register_builtin(registry: &mut ProcessRegistry) {
    animation::register(registry);
    audio::register(registry);
    camera::register(registry);
    damage::register(registry);
    event::register(registry);
    movement::register(registry);
    spawn::register(registry);
}

/// World placement of an attach binding on the owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Placement {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub parent: Option<TransformRef>,
}

/// Resolve an attach binding through the actor bridge.
///
/// Without an actor bridge, or for an unknown bone, the offset is used as a
/// world position.
pub(crate) fn resolve_attach(ctx: &mut ExecutionContext, attach: &AttachBinding) -> Placement {
    let parent = ctx
        .service::<dyn ActorBridge>()
        .and_then(|actor| actor.bone(attach.bind_point, attach.custom_name.as_deref()));

    match parent {
        Some(bone) => Placement {
            position: bone.offset_position(attach.offset),
            rotation: [
                bone.rotation[0] + attach.rotation[0],
                bone.rotation[1] + attach.rotation[1],
                bone.rotation[2] + attach.rotation[2],
            ],
            parent: Some(bone),
        },
        None => Placement {
            position: attach.offset,
            rotation: attach.rotation,
            parent: None,
        },
    }
}
