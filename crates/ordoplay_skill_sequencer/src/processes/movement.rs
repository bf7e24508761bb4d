// SPDX-License-Identifier: MIT OR Apache-2.0
//! Owner movement process.
//!
//! The clip's displacement is spread over its duration. Each update moves the
//! owner by the progress made since the last one, and exit settles the
//! remainder so a session always applies whole or no displacement regardless
//! of tick size.

use crate::clip::{Clip, ClipKind, ClipType, MovementClip};
use crate::context::ExecutionContext;
use crate::process::{PlayMode, Process};
use crate::registry::ProcessRegistry;
use crate::services::ActorBridge;
use std::sync::Arc;

/// Register for both modes
pub fn register(registry: &mut ProcessRegistry) {
    registry.register::<MovementProcess>(ClipType::Movement, PlayMode::Runtime);
    registry.register::<MovementProcess>(ClipType::Movement, PlayMode::Preview);
}

/// Moves the owner by a [`MovementClip`]
#[derive(Default)]
pub struct MovementProcess {
    params: Option<MovementClip>,
    start_time: f32,
    duration: f32,
    actor: Option<Arc<dyn ActorBridge>>,
    applied: f32,
}

impl MovementProcess {
    fn progress(&self, time: f32) -> f32 {
        if self.duration <= 0.0 {
            return if time >= self.start_time { 1.0 } else { 0.0 };
        }
        ((time - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    fn advance_to(&mut self, progress: f32) {
        let (Some(params), Some(actor)) = (&self.params, &self.actor) else {
            return;
        };
        let step = progress - self.applied;
        if step == 0.0 {
            return;
        }
        let delta = params.displacement.map(|axis| axis * step);
        actor.translate(delta, params.local_space);
        self.applied = progress;
    }
}

impl Process for MovementProcess {
    fn initialize(&mut self, clip: &Clip, _ctx: &mut ExecutionContext) {
        if let ClipKind::Movement(params) = &clip.kind {
            self.params = Some(*params);
        }
        self.start_time = clip.start_time;
        self.duration = clip.duration;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn on_enable(&mut self, ctx: &mut ExecutionContext) {
        self.actor = ctx.service::<dyn ActorBridge>();
    }

    fn on_enter(&mut self, _ctx: &mut ExecutionContext) {
        self.applied = 0.0;
    }

    fn on_update(&mut self, _ctx: &mut ExecutionContext, current_time: f32, _delta_time: f32) {
        let progress = self.progress(current_time);
        self.advance_to(progress);
    }

    fn on_exit(&mut self, ctx: &mut ExecutionContext) {
        let progress = self.progress(ctx.time());
        self.advance_to(progress);
        self.applied = 0.0;
    }

    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {
        self.actor = None;
    }
}
