// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera effect process.

use crate::clip::{CameraClip, Clip, ClipKind, ClipType};
use crate::context::ExecutionContext;
use crate::process::{PlayMode, Process};
use crate::registry::ProcessRegistry;
use crate::services::{CameraBridge, CameraEffectHandle};
use std::sync::Arc;

/// System cleanup key shared by every camera process
pub const CLEANUP_KEY: &str = "camera_bridge";

/// Register for both modes
pub fn register(registry: &mut ProcessRegistry) {
    registry.register::<CameraProcess>(ClipType::Camera, PlayMode::Runtime);
    registry.register::<CameraProcess>(ClipType::Camera, PlayMode::Preview);
}

/// Runs a [`CameraClip`] effect while active
#[derive(Default)]
pub struct CameraProcess {
    params: Option<CameraClip>,
    bridge: Option<Arc<dyn CameraBridge>>,
    effect: Option<CameraEffectHandle>,
}

impl Process for CameraProcess {
    fn initialize(&mut self, clip: &Clip, _ctx: &mut ExecutionContext) {
        if let ClipKind::Camera(params) = &clip.kind {
            self.params = Some(params.clone());
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn on_enable(&mut self, ctx: &mut ExecutionContext) {
        self.bridge = ctx.service::<dyn CameraBridge>();
        if self.bridge.is_some() {
            ctx.register_system_cleanup(CLEANUP_KEY, |ctx| {
                if let Some(bridge) = ctx.service::<dyn CameraBridge>() {
                    bridge.stop_all_effects();
                }
            });
        }
    }

    fn on_enter(&mut self, _ctx: &mut ExecutionContext) {
        if let (Some(params), Some(bridge)) = (&self.params, &self.bridge) {
            self.effect = bridge.start_effect(&params.effect, params.blend_duration);
        }
    }

    fn on_exit(&mut self, _ctx: &mut ExecutionContext) {
        let Some(handle) = self.effect.take() else {
            return;
        };
        if let (Some(params), Some(bridge)) = (&self.params, &self.bridge) {
            bridge.stop_effect(handle, params.blend_duration);
        }
    }

    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {
        self.bridge = None;
    }
}
