// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process lifecycle contract.
//!
//! A process is the runtime handler bound to one clip for one session. The
//! [`Runner`](crate::runner::Runner) drives it through:
//!
//! ```text
//! initialize -> on_enable -> (on_enter -> on_update* -> on_exit)* -> on_disable
//! ```
//!
//! and the pool calls `reset` before handing a recycled instance out again.
//! `on_enter`/`on_exit` are always balanced, and `on_update` is only called
//! between them.

use crate::clip::Clip;
use crate::context::ExecutionContext;
use serde::{Deserialize, Serialize};

/// Execution mode a process is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum PlayMode {
    /// Author-time preview in the editor
    Preview,
    /// Live gameplay
    #[default]
    Runtime,
}

impl PlayMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Preview => "Preview",
            Self::Runtime => "Runtime",
        }
    }
}

/// Runtime handler for one clip.
///
/// Implementations must not panic out of any callback; failures are logged
/// and the callback becomes a no-op.
pub trait Process: Send {
    /// Bind clip data. Called once per acquisition from the pool.
    fn initialize(&mut self, clip: &Clip, ctx: &mut ExecutionContext);

    /// Clear all instance state before reuse.
    fn reset(&mut self);

    /// Session start: cache services and register system cleanup.
    fn on_enable(&mut self, _ctx: &mut ExecutionContext) {}

    /// The clock crossed into the clip interval.
    fn on_enter(&mut self, ctx: &mut ExecutionContext);

    /// Called every tick while active, and with `delta_time == 0.0` after a
    /// seek lands inside the interval.
    fn on_update(&mut self, _ctx: &mut ExecutionContext, _current_time: f32, _delta_time: f32) {}

    /// The clock crossed out of the clip interval, or the session ended.
    /// Must tolerate being called without a matching `on_enter`.
    fn on_exit(&mut self, ctx: &mut ExecutionContext);

    /// Session end, after every `on_exit`.
    fn on_disable(&mut self, _ctx: &mut ExecutionContext) {}
}
