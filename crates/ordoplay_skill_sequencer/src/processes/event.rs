// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generic event process.

use crate::clip::{Clip, ClipKind, ClipType, EventClip};
use crate::context::ExecutionContext;
use crate::process::{PlayMode, Process};
use crate::registry::ProcessRegistry;
use crate::services::EventBridge;
use std::sync::Arc;

/// Register for runtime only
pub fn register(registry: &mut ProcessRegistry) {
    registry.register::<EventProcess>(ClipType::Event, PlayMode::Runtime);
}

/// Fires an [`EventClip`] once per activation
#[derive(Default)]
pub struct EventProcess {
    params: Option<EventClip>,
    bridge: Option<Arc<dyn EventBridge>>,
}

impl Process for EventProcess {
    fn initialize(&mut self, clip: &Clip, _ctx: &mut ExecutionContext) {
        if let ClipKind::Event(params) = &clip.kind {
            self.params = Some(params.clone());
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn on_enable(&mut self, ctx: &mut ExecutionContext) {
        self.bridge = ctx.service::<dyn EventBridge>();
    }

    fn on_enter(&mut self, _ctx: &mut ExecutionContext) {
        if let (Some(params), Some(bridge)) = (&self.params, &self.bridge) {
            tracing::trace!("Skill event {}", params.event_name);
            bridge.on_skill_event(&params.event_name, &params.parameters);
        }
    }

    fn on_exit(&mut self, _ctx: &mut ExecutionContext) {}

    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {
        self.bridge = None;
    }
}
