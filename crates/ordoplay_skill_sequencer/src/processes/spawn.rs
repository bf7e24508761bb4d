// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object spawn process.

use crate::clip::{Clip, ClipKind, ClipType, SpawnClip};
use crate::context::ExecutionContext;
use crate::process::{PlayMode, Process};
use crate::processes::resolve_attach;
use crate::registry::ProcessRegistry;
use crate::services::{SpawnBridge, SpawnHandle};
use std::sync::Arc;

/// Register for both modes
pub fn register(registry: &mut ProcessRegistry) {
    registry.register::<SpawnProcess>(ClipType::Spawn, PlayMode::Runtime);
    registry.register::<SpawnProcess>(ClipType::Spawn, PlayMode::Preview);
}

/// Spawns a [`SpawnClip`] prefab on enter.
///
/// Attached objects are destroyed on exit unless `destroy_on_exit` is off;
/// detached objects are left to the host.
#[derive(Default)]
pub struct SpawnProcess {
    params: Option<SpawnClip>,
    bridge: Option<Arc<dyn SpawnBridge>>,
    spawned: Option<SpawnHandle>,
}

impl Process for SpawnProcess {
    fn initialize(&mut self, clip: &Clip, _ctx: &mut ExecutionContext) {
        if let ClipKind::Spawn(params) = &clip.kind {
            self.params = Some(params.clone());
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn on_enable(&mut self, ctx: &mut ExecutionContext) {
        self.bridge = ctx.service::<dyn SpawnBridge>();
    }

    fn on_enter(&mut self, ctx: &mut ExecutionContext) {
        let Some(params) = &self.params else {
            return;
        };
        let Some(bridge) = self.bridge.clone() else {
            return;
        };

        let placement = resolve_attach(ctx, &params.attach);
        self.spawned = bridge.spawn_object(
            &params.prefab,
            placement.position,
            placement.rotation,
            &params.tag,
            params.detach,
            placement.parent.as_ref(),
        );
        if self.spawned.is_none() {
            tracing::warn!("Failed to spawn {}", params.prefab);
        }
    }

    fn on_exit(&mut self, _ctx: &mut ExecutionContext) {
        let Some(handle) = self.spawned.take() else {
            return;
        };
        let destroy = self
            .params
            .as_ref()
            .is_some_and(|p| p.destroy_on_exit && !p.detach);
        if let (true, Some(bridge)) = (destroy, &self.bridge) {
            bridge.destroy_spawned_object(handle);
        }
    }

    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {
        self.bridge = None;
    }
}
