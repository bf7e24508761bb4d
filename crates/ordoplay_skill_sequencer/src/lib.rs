// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skill timeline sequencer for OrdoPlay.
//!
//! This crate schedules the clips of an ability timeline:
//! - Timeline data model (groups, tracks, typed clips) with RON persistence
//! - Process lifecycle contract for clip handlers
//! - Process registry and pool
//! - Execution context with service locator, layer masks and cleanup tiers
//! - Runner: tick, seek, loop, pause/resume, stop and interrupt
//!
//! ## Architecture
//!
//! The runner owns the process instances and the execution context. Each
//! process gets `&mut ExecutionContext` on every callback and reaches the host
//! engine only through the capability traits in [`services`]. Built-in
//! processes for every clip kind live in [`processes`].

pub mod binding;
pub mod clip;
pub mod config;
pub mod context;
pub mod process;
pub mod processes;
pub mod registry;
pub mod runner;
pub mod services;
pub mod timeline;
pub mod track;

#[cfg(test)]
mod testing;

pub use binding::{ActorId, AssetRef, AttachBinding, BindPoint, TransformRef};
pub use clip::{
    AnimationClip, AudioClip, CameraClip, CameraEffect, Clip, ClipId, ClipKind, ClipType,
    DamageDetectClip, EventClip, HitShape, MovementClip, SpawnClip,
};
pub use config::{ConfigError, RunnerConfig};
pub use context::{CleanupAction, ExecutionContext, ServiceLocator};
pub use process::{PlayMode, Process};
pub use registry::{
    PoolStats, PooledProcess, ProcessBinding, ProcessFactory, ProcessPool, ProcessRegistry,
};
pub use runner::{Runner, RunnerEvent, RunnerState};
pub use timeline::{Group, Timeline, TimelineError, TimelineId, TIMELINE_FORMAT_VERSION};
pub use track::{Track, TrackId};
