// SPDX-License-Identifier: MIT OR Apache-2.0
//! Damage detection process.
//!
//! Each tick the hit volume is placed at its attach point and queried through
//! the host's [`HitQuery`]. A target is reported at most once per activation.
//! Seek resamples (`delta_time == 0`) never detect.

use crate::clip::{Clip, ClipKind, ClipType, DamageDetectClip};
use crate::context::ExecutionContext;
use crate::process::{PlayMode, Process};
use crate::processes::resolve_attach;
use crate::registry::ProcessRegistry;
use crate::services::{DamageBridge, DamageData, HitQuery, TargetId};
use std::collections::HashSet;
use std::sync::Arc;

/// Register for runtime only
pub fn register(registry: &mut ProcessRegistry) {
    registry.register::<DamageDetectProcess>(ClipType::DamageDetect, PlayMode::Runtime);
}

/// Reports targets inside a [`DamageDetectClip`] volume
#[derive(Default)]
pub struct DamageDetectProcess {
    params: Option<DamageDetectClip>,
    damage: Option<Arc<dyn DamageBridge>>,
    query: Option<Arc<dyn HitQuery>>,
    hit: HashSet<TargetId>,
}

impl DamageDetectProcess {
    fn detect(&mut self, ctx: &mut ExecutionContext) {
        let (Some(params), Some(damage), Some(query)) = (&self.params, &self.damage, &self.query)
        else {
            return;
        };

        let placement = resolve_attach(ctx, &params.attach);
        let budget = params
            .max_targets
            .map_or(usize::MAX, |max| (max as usize).saturating_sub(self.hit.len()));

        let mut targets = Vec::new();
        for target in query.overlap(&params.shape, placement.position, placement.rotation) {
            if targets.len() >= budget {
                break;
            }
            if self.hit.insert(target) {
                targets.push(target);
            }
        }
        if targets.is_empty() {
            return;
        }

        damage.on_damage_detect(&DamageData {
            source: ctx.owner(),
            targets,
            event_tag: params.event_tag.clone(),
            tags: params.tags.clone(),
        });
    }
}

impl Process for DamageDetectProcess {
    fn initialize(&mut self, clip: &Clip, _ctx: &mut ExecutionContext) {
        if let ClipKind::DamageDetect(params) = &clip.kind {
            self.params = Some(params.clone());
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn on_enable(&mut self, ctx: &mut ExecutionContext) {
        self.damage = ctx.service::<dyn DamageBridge>();
        self.query = ctx.service::<dyn HitQuery>();
    }

    fn on_enter(&mut self, ctx: &mut ExecutionContext) {
        self.hit.clear();
        if self.params.as_ref().is_some_and(|p| p.detect_on_enter) {
            self.detect(ctx);
        }
    }

    fn on_update(&mut self, ctx: &mut ExecutionContext, _current_time: f32, delta_time: f32) {
        if delta_time > 0.0 {
            self.detect(ctx);
        }
    }

    fn on_exit(&mut self, _ctx: &mut ExecutionContext) {
        self.hit.clear();
    }

    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {
        self.damage = None;
        self.query = None;
    }
}
