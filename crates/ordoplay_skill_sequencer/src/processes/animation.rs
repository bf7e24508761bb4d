// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation playback process.
//!
//! Plays the clip's animation on its layer and, while active, narrows the
//! layer through the context's mask stack. In preview mode there is no engine
//! update driving the graph, so the process samples it itself.

use crate::binding::AssetRef;
use crate::clip::{AnimationClip, Clip, ClipKind, ClipType};
use crate::context::ExecutionContext;
use crate::process::{PlayMode, Process};
use crate::registry::ProcessRegistry;
use crate::services::AnimationBridge;
use std::sync::Arc;

/// System cleanup key shared by every animation process
pub const CLEANUP_KEY: &str = "animation_bridge";

/// Register for both modes
pub fn register(registry: &mut ProcessRegistry) {
    registry.register::<AnimationProcess>(ClipType::Animation, PlayMode::Runtime);
    registry.register::<AnimationProcess>(ClipType::Animation, PlayMode::Preview);
}

/// Plays an [`AnimationClip`]
#[derive(Default)]
pub struct AnimationProcess {
    params: Option<AnimationClip>,
    start_time: f32,
    bridge: Option<Arc<dyn AnimationBridge>>,
    pushed_mask: Option<AssetRef>,
}

impl Process for AnimationProcess {
    fn initialize(&mut self, clip: &Clip, _ctx: &mut ExecutionContext) {
        if let ClipKind::Animation(params) = &clip.kind {
            self.params = Some(params.clone());
        }
        self.start_time = clip.start_time;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn on_enable(&mut self, ctx: &mut ExecutionContext) {
        self.bridge = ctx.service::<dyn AnimationBridge>();
        let Some(bridge) = self.bridge.clone() else {
            return;
        };

        // first animation process of the session builds the graph
        let first = ctx.register_system_cleanup(CLEANUP_KEY, |ctx| {
            if let Some(bridge) = ctx.service::<dyn AnimationBridge>() {
                bridge.clear_graph();
            }
        });
        if first {
            bridge.initialize();
        }
    }

    fn on_enter(&mut self, ctx: &mut ExecutionContext) {
        let (Some(params), Some(bridge)) = (&self.params, &self.bridge) else {
            return;
        };

        if let Some(mask) = &params.mask {
            ctx.push_layer_mask(params.layer, mask.clone());
            self.pushed_mask = Some(mask.clone());
        }
        bridge.play_animation(
            &params.animation,
            params.layer,
            params.fade_duration,
            params.speed * ctx.speed(),
        );
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext, current_time: f32, delta_time: f32) {
        let (Some(params), Some(bridge)) = (&self.params, &self.bridge) else {
            return;
        };

        let speed = params.speed * ctx.speed();
        bridge.set_layer_speed(params.layer, speed);

        if ctx.mode() == PlayMode::Preview {
            if delta_time > 0.0 {
                bridge.manual_update(delta_time * params.speed);
            } else {
                bridge.evaluate((current_time - self.start_time) * params.speed);
            }
        }
    }

    fn on_exit(&mut self, ctx: &mut ExecutionContext) {
        if let (Some(params), Some(mask)) = (&self.params, self.pushed_mask.take()) {
            ctx.pop_layer_mask(params.layer, &mask);
        }
    }

    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {
        self.bridge = None;
    }
}
