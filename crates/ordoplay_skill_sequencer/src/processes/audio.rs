// SPDX-License-Identifier: MIT OR Apache-2.0
//! Audio playback process.

use crate::clip::{AudioClip, Clip, ClipKind, ClipType};
use crate::context::ExecutionContext;
use crate::process::{PlayMode, Process};
use crate::processes::resolve_attach;
use crate::registry::ProcessRegistry;
use crate::services::{AudioBridge, SoundArgs, SoundId};
use std::sync::Arc;

/// System cleanup key shared by every audio process
pub const CLEANUP_KEY: &str = "audio_bridge";

/// Register for both modes
pub fn register(registry: &mut ProcessRegistry) {
    registry.register::<AudioProcess>(ClipType::Audio, PlayMode::Runtime);
    registry.register::<AudioProcess>(ClipType::Audio, PlayMode::Preview);
}

/// Plays an [`AudioClip`]
#[derive(Default)]
pub struct AudioProcess {
    params: Option<AudioClip>,
    start_time: f32,
    bridge: Option<Arc<dyn AudioBridge>>,
    sound: Option<SoundId>,
}

impl Process for AudioProcess {
    fn initialize(&mut self, clip: &Clip, _ctx: &mut ExecutionContext) {
        if let ClipKind::Audio(params) = &clip.kind {
            self.params = Some(params.clone());
        }
        self.start_time = clip.start_time;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn on_enable(&mut self, ctx: &mut ExecutionContext) {
        self.bridge = ctx.service::<dyn AudioBridge>();
        if self.bridge.is_some() {
            ctx.register_system_cleanup(CLEANUP_KEY, |ctx| {
                if let Some(bridge) = ctx.service::<dyn AudioBridge>() {
                    bridge.stop_all();
                }
            });
        }
    }

    fn on_enter(&mut self, ctx: &mut ExecutionContext) {
        let Some(params) = &self.params else {
            return;
        };
        let Some(bridge) = self.bridge.clone() else {
            return;
        };

        let position = params
            .attach
            .as_ref()
            .map(|attach| resolve_attach(ctx, attach).position);
        let args = SoundArgs {
            volume: params.volume,
            pitch: params.pitch * ctx.speed(),
            looping: params.looping,
            position,
        };

        self.sound = bridge.play_sound(&params.sound, &args);
        if self.sound.is_none() {
            tracing::warn!("Failed to play sound {}", params.sound);
        }
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext, current_time: f32, _delta_time: f32) {
        let (Some(params), Some(bridge), Some(id)) = (&self.params, &self.bridge, self.sound) else {
            return;
        };
        bridge.update_sound(
            id,
            params.volume,
            params.pitch * ctx.speed(),
            current_time - self.start_time,
        );
    }

    fn on_exit(&mut self, _ctx: &mut ExecutionContext) {
        let Some(id) = self.sound.take() else {
            return;
        };
        let stop = self.params.as_ref().map_or(true, |p| p.stop_on_exit);
        if let (true, Some(bridge)) = (stop, &self.bridge) {
            bridge.stop_sound(id);
        }
    }

    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {
        self.bridge = None;
    }
}
