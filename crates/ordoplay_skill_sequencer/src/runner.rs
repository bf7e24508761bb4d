// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip-activation scheduler.
//!
//! A [`Runner`] plays one timeline at a time. Each session acquires a process
//! per enabled clip, then walks a clock and calls `on_enter`/`on_update`/`on_exit`
//! as the clock crosses clip boundaries. The session ends with three cleanup
//! tiers: `on_exit` for active processes, `on_disable` for all of them, then
//! the context's keyed system cleanups.
//!
//! Every clip is active exactly when the clock is inside `[start, end)`,
//! whether the clock got there by ticking or by seeking.

use crate::clip::ClipId;
use crate::config::RunnerConfig;
use crate::context::ExecutionContext;
use crate::registry::{PooledProcess, ProcessFactory};
use crate::timeline::{Timeline, TimelineId};
use std::sync::Arc;

/// Runner state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunnerState {
    /// No session
    #[default]
    Idle,
    /// Session running, ticks advance the clock
    Playing,
    /// Session frozen, ticks are ignored
    Paused,
}

/// Session notification, drained with [`Runner::take_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerEvent {
    /// A session started
    Started(TimelineId),
    /// A session was cut short by a new `play` or by `interrupt`
    Interrupted(TimelineId),
    /// A looping timeline wrapped around
    Looped {
        /// Timeline that looped
        timeline: TimelineId,
        /// Loops completed so far
        count: u32,
    },
    /// A non-looping timeline reached its end
    Finished(TimelineId),
    /// A session was stopped by the host
    Stopped(TimelineId),
    /// A clip's process received `on_enter`
    ClipEntered(ClipId),
    /// A clip's process received `on_exit`
    ClipExited(ClipId),
}

impl RunnerEvent {
    /// Whether this is a clip transition rather than a session notification
    pub fn is_clip_transition(&self) -> bool {
        matches!(self, Self::ClipEntered(_) | Self::ClipExited(_))
    }
}

/// One clip's process for the current session
struct Slot {
    clip_id: ClipId,
    start: f32,
    end: f32,
    active: bool,
    process: PooledProcess,
}

impl Slot {
    fn contains(&self, time: f32) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether a step from `prev` to `time` jumped over the whole clip
    fn passed_over(&self, prev: f32, time: f32) -> bool {
        (prev < self.start && time >= self.end) || (prev >= self.end && time < self.start)
    }
}

#[derive(Debug, Clone, Copy)]
enum Scan {
    /// Clock advanced by a tick; entering clips update in the same pass
    Tick { delta: f32 },
    /// Clock jumped; every active clip resamples with a zero delta afterwards
    Seek,
}

/// Plays timelines by driving their clips' processes
pub struct Runner {
    factory: ProcessFactory,
    config: RunnerConfig,
    ctx: ExecutionContext,
    timeline: Option<Arc<Timeline>>,
    slots: Vec<Slot>,
    state: RunnerState,
    time: f32,
    loop_count: u32,
    pending_events: Vec<RunnerEvent>,
}

impl Runner {
    /// Create an idle runner
    pub fn new(factory: ProcessFactory, config: RunnerConfig) -> Self {
        let mut ctx = ExecutionContext::new(config.mode);
        ctx.set_speed(config.speed);
        Self {
            factory,
            config,
            ctx,
            timeline: None,
            slots: Vec::new(),
            state: RunnerState::Idle,
            time: 0.0,
            loop_count: 0,
            pending_events: Vec::new(),
        }
    }

    /// Create a runner over the built-in processes
    pub fn builtin(config: RunnerConfig) -> Self {
        Self::new(ProcessFactory::builtin(), config)
    }

    // --- Session control ---

    /// Start a session at time zero.
    ///
    /// A running or paused session is interrupted first, and its cleanup
    /// completes before any new process is enabled.
    pub fn play(&mut self, timeline: impl Into<Arc<Timeline>>) {
        self.interrupt();

        let timeline = timeline.into();
        let mode = self.ctx.mode();

        for track in timeline.all_tracks().filter(|t| t.enabled) {
            for clip in track.clips().iter().filter(|c| c.enabled) {
                let Some(mut process) = self.factory.create(clip, mode) else {
                    tracing::debug!(
                        "No {} process for {} clip '{}', skipping",
                        mode.name(),
                        clip.clip_type().name(),
                        clip.name
                    );
                    continue;
                };
                process.initialize(clip, &mut self.ctx);
                self.slots.push(Slot {
                    clip_id: clip.id,
                    start: clip.start_time,
                    end: clip.end_time(),
                    active: false,
                    process,
                });
            }
        }

        for slot in &mut self.slots {
            slot.process.on_enable(&mut self.ctx);
        }

        tracing::info!(
            "Playing skill '{}' ({} processes, {} mode)",
            timeline.name,
            self.slots.len(),
            mode.name()
        );
        self.pending_events.push(RunnerEvent::Started(timeline.id));
        self.timeline = Some(timeline);
        self.state = RunnerState::Playing;
        self.time = 0.0;
        self.loop_count = 0;

        self.scan(0.0, 0.0, Scan::Seek);
    }

    /// Cut the current session short. Returns `false` if idle.
    pub fn interrupt(&mut self) -> bool {
        if self.state == RunnerState::Idle {
            return false;
        }
        if let Some(timeline) = &self.timeline {
            tracing::info!("Interrupting skill '{}' at {:.3}s", timeline.name, self.time);
            self.pending_events.push(RunnerEvent::Interrupted(timeline.id));
        }
        self.end_session();
        true
    }

    /// End the current session. Returns `false` if idle.
    pub fn stop(&mut self) -> bool {
        if self.state == RunnerState::Idle {
            return false;
        }
        if let Some(timeline) = &self.timeline {
            tracing::info!("Stopping skill '{}' at {:.3}s", timeline.name, self.time);
            self.pending_events.push(RunnerEvent::Stopped(timeline.id));
        }
        self.end_session();
        true
    }

    /// Freeze the clock. Returns `false` unless playing.
    pub fn pause(&mut self) -> bool {
        if self.state != RunnerState::Playing {
            return false;
        }
        self.state = RunnerState::Paused;
        true
    }

    /// Continue from the frozen time. Returns `false` unless paused.
    pub fn resume(&mut self) -> bool {
        if self.state != RunnerState::Paused {
            return false;
        }
        self.state = RunnerState::Playing;
        true
    }

    // --- Clock ---

    /// Advance the clock by `delta_time` scaled by the context speed.
    ///
    /// Does nothing unless playing. At the end of the timeline a looping
    /// session wraps to zero; otherwise it finishes.
    pub fn tick(&mut self, delta_time: f32) {
        if self.state != RunnerState::Playing {
            return;
        }
        let Some(timeline) = self.timeline.clone() else {
            return;
        };

        let delta = (delta_time * self.ctx.speed()).max(0.0);
        let prev = self.time;
        let target = prev + delta;
        if target < timeline.duration {
            self.time = target;
            self.scan(prev, target, Scan::Tick { delta });
            return;
        }

        let end = timeline.duration;
        self.time = end;
        self.scan(prev, end, Scan::Tick { delta: (end - prev).max(0.0) });

        if timeline.is_loop {
            self.exit_active();
            self.time = 0.0;
            self.loop_count += 1;
            tracing::debug!("Skill '{}' looped ({})", timeline.name, self.loop_count);
            self.pending_events.push(RunnerEvent::Looped {
                timeline: timeline.id,
                count: self.loop_count,
            });
            self.scan(0.0, 0.0, Scan::Tick { delta: 0.0 });
            return;
        }

        tracing::info!("Skill '{}' finished", timeline.name);
        self.pending_events.push(RunnerEvent::Finished(timeline.id));
        if self.config.auto_stop {
            self.end_session();
        } else {
            self.state = RunnerState::Paused;
        }
    }

    /// Jump the clock to `time`.
    ///
    /// Clips crossed on the way are entered and exited as if the clock had
    /// flowed there, then every active clip resamples at `time` with a zero
    /// delta. Works while playing or paused. Returns `false` if idle.
    pub fn seek(&mut self, time: f32) -> bool {
        if self.state == RunnerState::Idle {
            return false;
        }
        let Some(duration) = self.timeline.as_ref().map(|t| t.duration) else {
            return false;
        };

        let target = if self.config.clamp_seek {
            time.clamp(0.0, duration.max(0.0))
        } else {
            time
        };
        let prev = self.time;
        self.time = target;
        self.scan(prev, target, Scan::Seek);
        true
    }

    /// Set the global speed multiplier
    pub fn set_speed(&mut self, speed: f32) {
        self.ctx.set_speed(speed);
    }

    fn scan(&mut self, prev: f32, time: f32, scan: Scan) {
        self.ctx.set_time(time);

        for slot in &mut self.slots {
            let inside = slot.contains(time);
            match (slot.active, inside) {
                (false, true) => {
                    slot.process.on_enter(&mut self.ctx);
                    slot.active = true;
                    self.pending_events.push(RunnerEvent::ClipEntered(slot.clip_id));
                    if let Scan::Tick { delta } = scan {
                        slot.process.on_update(&mut self.ctx, time, delta);
                    }
                }
                (true, true) => {
                    if let Scan::Tick { delta } = scan {
                        slot.process.on_update(&mut self.ctx, time, delta);
                    }
                }
                (true, false) => {
                    slot.process.on_exit(&mut self.ctx);
                    slot.active = false;
                    self.pending_events.push(RunnerEvent::ClipExited(slot.clip_id));
                }
                (false, false) => {
                    if slot.passed_over(prev, time) {
                        slot.process.on_enter(&mut self.ctx);
                        self.pending_events.push(RunnerEvent::ClipEntered(slot.clip_id));
                        slot.process.on_exit(&mut self.ctx);
                        self.pending_events.push(RunnerEvent::ClipExited(slot.clip_id));
                    }
                }
            }
        }

        if let Scan::Seek = scan {
            for slot in self.slots.iter_mut().filter(|s| s.active) {
                slot.process.on_update(&mut self.ctx, time, 0.0);
            }
        }
    }

    fn exit_active(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.process.on_exit(&mut self.ctx);
            slot.active = false;
            self.pending_events.push(RunnerEvent::ClipExited(slot.clip_id));
        }
    }

    fn end_session(&mut self) {
        self.ctx.set_time(self.time);

        self.exit_active();
        for slot in &mut self.slots {
            slot.process.on_disable(&mut self.ctx);
        }
        self.ctx.run_system_cleanups();

        for slot in self.slots.drain(..) {
            self.factory.release(slot.process);
        }
        self.ctx.clear();

        self.timeline = None;
        self.state = RunnerState::Idle;
        self.time = 0.0;
    }

    // --- Introspection ---

    /// Current state
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Is a session running (not paused)
    pub fn is_playing(&self) -> bool {
        self.state == RunnerState::Playing
    }

    /// Session clock
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Loops completed in this session
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Timeline of the current session
    pub fn timeline(&self) -> Option<&Arc<Timeline>> {
        self.timeline.as_ref()
    }

    /// Whether a clip's process is between enter and exit
    pub fn is_clip_active(&self, clip_id: ClipId) -> bool {
        self.slots.iter().any(|s| s.clip_id == clip_id && s.active)
    }

    /// Active clips in process order
    pub fn active_clips(&self) -> Vec<ClipId> {
        self.slots.iter().filter(|s| s.active).map(|s| s.clip_id).collect()
    }

    /// Processes in the current session
    pub fn process_count(&self) -> usize {
        self.slots.len()
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<RunnerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Runner configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Process factory
    pub fn factory(&self) -> &ProcessFactory {
        &self.factory
    }

    /// Session context
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Session context, for registering services
    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.ctx
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::builtin(RunnerConfig::default())
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        if self.state != RunnerState::Idle {
            tracing::debug!("Runner dropped mid-session, cleaning up");
            self.end_session();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{
        AnimationClip, AudioClip, CameraClip, CameraEffect, Clip, ClipKind, ClipType, EventClip,
    };
    use crate::process::PlayMode;
    use crate::registry::ProcessRegistry;
    use crate::services::{AnimationBridge, AudioBridge};
    use crate::testing::{
        probe_registry, Call, CallLog, ProbeProcess, RecordingAnimation, RecordingAudio,
    };
    use crate::timeline::Group;
    use crate::track::Track;

    fn probe_runner_with(config: RunnerConfig) -> (Runner, Arc<CallLog>) {
        let factory = ProcessFactory::new(probe_registry(&[PlayMode::Runtime, PlayMode::Preview]));
        let mut runner = Runner::new(factory, config);
        let log = Arc::new(CallLog::default());
        runner.context_mut().add_service(log.clone());
        (runner, log)
    }

    fn probe_runner() -> (Runner, Arc<CallLog>) {
        probe_runner_with(RunnerConfig::default())
    }

    fn session_events(runner: &mut Runner) -> Vec<RunnerEvent> {
        runner
            .take_events()
            .into_iter()
            .filter(|e| !e.is_clip_transition())
            .collect()
    }

    fn event(name: &str, start: f32, duration: f32) -> Clip {
        Clip::new(name, start, duration, ClipKind::Event(EventClip::new(name)))
    }

    fn timeline(duration: f32, clips: Vec<Clip>) -> Timeline {
        let mut track = Track::new("Events", ClipType::Event).with_overlap(true);
        for clip in clips {
            track.add_clip(clip);
        }
        Timeline::new("Test", duration).with_group(Group::new("Main").with_track(track))
    }

    /// Enter/exit alternate, updates only while entered, nothing left open
    fn assert_balanced(log: &CallLog, name: &str) {
        let mut active = false;
        for call in log.calls_for(name) {
            match call {
                Call::Enter => {
                    assert!(!active, "{} entered twice", name);
                    active = true;
                }
                Call::Exit => {
                    assert!(active, "{} exited while inactive", name);
                    active = false;
                }
                Call::Update { .. } => assert!(active, "{} updated while inactive", name),
                _ => {}
            }
        }
        assert!(!active, "{} left active", name);
    }

    #[test]
    fn test_tick_enters_once_and_exits_without_update() {
        let (mut runner, log) = probe_runner();
        runner.play(timeline(1.0, vec![event("a", 0.2, 0.4)]));

        for _ in 0..3 {
            runner.tick(0.1);
        }
        assert_eq!(log.count("a", Call::Enter), 1);

        log.clear();
        runner.tick(0.4);
        assert_eq!(log.calls_for("a"), vec![Call::Exit]);
    }

    #[test]
    fn test_seek_over_clip_enters_and_exits() {
        let (mut runner, log) = probe_runner();
        runner.play(timeline(1.0, vec![event("a", 0.2, 0.4), event("b", 0.8, 0.2)]));
        log.clear();

        assert!(runner.seek(0.9));
        assert_eq!(log.calls_for("a"), vec![Call::Enter, Call::Exit]);
        assert_eq!(
            log.calls_for("b"),
            vec![Call::Enter, Call::Update { time: 0.9, delta: 0.0 }]
        );
    }

    #[test]
    fn test_tick_over_clip_enters_and_exits_without_update() {
        let (mut runner, log) = probe_runner();
        runner.play(timeline(1.0, vec![event("short", 0.5, 0.05)]));
        runner.seek(0.45);
        log.clear();

        runner.tick(0.1);
        assert_eq!(log.calls_for("short"), vec![Call::Enter, Call::Exit]);
        assert!(runner.active_clips().is_empty());
    }

    #[test]
    fn test_clip_transitions_queued_in_order() {
        let (mut runner, _) = probe_runner();
        let tl = timeline(
            1.0,
            vec![event("a", 0.0, 0.3), event("b", 0.35, 0.05), event("c", 0.2, 0.6)],
        );
        let id = |name: &str| tl.all_clips().find(|c| c.name == name).map(|c| c.id).unwrap();
        let (a, b, c) = (id("a"), id("b"), id("c"));
        let tl_id = tl.id;

        runner.play(tl);
        runner.tick(0.5);
        runner.stop();

        assert_eq!(
            runner.take_events(),
            vec![
                RunnerEvent::Started(tl_id),
                RunnerEvent::ClipEntered(a),
                RunnerEvent::ClipExited(a),
                RunnerEvent::ClipEntered(c),
                RunnerEvent::ClipEntered(b),
                RunnerEvent::ClipExited(b),
                RunnerEvent::Stopped(tl_id),
                RunnerEvent::ClipExited(c),
            ]
        );
    }

    #[test]
    fn test_tick_after_unclamped_seek_never_runs_backward() {
        let (mut runner, log) = probe_runner_with(RunnerConfig {
            clamp_seek: false,
            auto_stop: false,
            ..Default::default()
        });
        runner.play(timeline(1.0, vec![event("a", 0.0, 10.0)]));
        runner.seek(5.0);
        log.clear();

        runner.tick(0.1);
        assert_eq!(runner.current_time(), 1.0);
        assert_eq!(log.calls_for("a"), vec![Call::Update { time: 1.0, delta: 0.0 }]);
    }

    #[test]
    fn test_activation_coverage_under_ticking() {
        let clips = vec![
            event("a", 0.0, 0.3),
            event("b", 0.25, 0.25),
            event("c", 0.5, 0.05),
            event("d", 1.0, 0.9),
            event("e", 1.95, 0.05),
        ];
        let names = ["a", "b", "c", "d", "e"];

        for step in [0.01, 0.03, 0.07, 0.1, 0.25, 0.33, 0.5, 1.5] {
            let (mut runner, log) = probe_runner();
            let timeline = timeline(2.0, clips.clone());
            let all: Vec<Clip> = timeline.all_clips().cloned().collect();
            runner.play(timeline);

            while runner.state() == RunnerState::Playing {
                runner.tick(step);
                if runner.state() != RunnerState::Playing {
                    break;
                }
                let t = runner.current_time();
                for clip in &all {
                    assert_eq!(
                        runner.is_clip_active(clip.id),
                        clip.contains(t),
                        "step {} clip {} at {}",
                        step,
                        clip.name,
                        t
                    );
                }
            }

            assert_eq!(runner.state(), RunnerState::Idle);
            for name in names {
                assert_balanced(&log, name);
                assert_eq!(log.count(name, Call::Enter), 1, "step {} clip {}", step, name);
                assert_eq!(log.count(name, Call::Disable), 1);
            }
        }
    }

    #[test]
    fn test_seek_matches_tick() {
        let clips = vec![
            event("a", 0.0, 0.3),
            event("b", 0.25, 0.25),
            event("c", 0.5, 0.05),
            event("d", 1.0, 0.9),
        ];

        for target in [0.0, 0.1, 0.26, 0.5, 0.52, 0.99, 1.0, 1.5, 1.97] {
            let (mut ticked, _) = probe_runner();
            ticked.play(timeline(2.0, clips.clone()));
            ticked.tick(target);

            let (mut seeked, seek_log) = probe_runner();
            let timeline = timeline(2.0, clips.clone());
            let all: Vec<Clip> = timeline.all_clips().cloned().collect();
            seeked.play(timeline);
            seeked.seek(1.9);
            seeked.seek(0.3);
            seeked.seek(target);

            let expected: Vec<ClipId> = all.iter().filter(|c| c.contains(target)).map(|c| c.id).collect();
            assert_eq!(seeked.active_clips(), expected, "seek to {}", target);
            assert_eq!(ticked.active_clips().len(), expected.len(), "tick to {}", target);

            for clip in &all {
                assert_eq!(ticked.is_clip_active(clip.id), seeked.is_clip_active(clip.id));
            }

            seeked.stop();
            for clip in &all {
                assert_balanced(&seek_log, &clip.name);
            }
        }
    }

    #[test]
    fn test_backward_seek_crosses_intervals() {
        let (mut runner, log) = probe_runner();
        runner.play(timeline(1.0, vec![event("a", 0.2, 0.2), event("b", 0.6, 0.2)]));
        runner.seek(0.7);
        log.clear();

        runner.seek(0.1);
        assert_eq!(log.calls_for("a"), vec![Call::Enter, Call::Exit]);
        assert_eq!(log.calls_for("b"), vec![Call::Exit]);
        assert!(runner.active_clips().is_empty());
    }

    #[test]
    fn test_seek_clamping() {
        let (mut runner, _) = probe_runner();
        runner.play(timeline(1.0, vec![event("a", 0.2, 0.2)]));
        runner.seek(5.0);
        assert_eq!(runner.current_time(), 1.0);
        runner.seek(-1.0);
        assert_eq!(runner.current_time(), 0.0);

        let (mut runner, _) = probe_runner_with(RunnerConfig {
            clamp_seek: false,
            ..Default::default()
        });
        runner.play(timeline(1.0, vec![event("a", 0.2, 0.2)]));
        runner.seek(5.0);
        assert_eq!(runner.current_time(), 5.0);
    }

    #[test]
    fn test_cleanup_key_runs_once() {
        let (mut runner, log) = probe_runner();
        runner.play(timeline(
            1.0,
            vec![event("a", 0.0, 0.2), event("b", 0.2, 0.2), event("c", 0.4, 0.2)],
        ));
        assert!(runner.stop());
        assert_eq!(log.count("system", Call::Cleanup), 1);
        assert!(!runner.context().has_system_cleanup("probe"));
    }

    #[test]
    fn test_stop_runs_tiers_in_order() {
        let (mut runner, log) = probe_runner();
        let tl = timeline(1.0, vec![event("a", 0.0, 0.5), event("b", 0.5, 0.5)]);
        let id = tl.id;
        runner.play(tl);
        runner.tick(0.1);
        log.clear();

        assert!(runner.stop());
        assert_eq!(
            log.entries(),
            vec![
                ("a".to_string(), Call::Exit),
                ("a".to_string(), Call::Disable),
                ("b".to_string(), Call::Disable),
                ("system".to_string(), Call::Cleanup),
            ]
        );
        assert_eq!(runner.state(), RunnerState::Idle);
        assert_eq!(runner.process_count(), 0);
        assert_eq!(session_events(&mut runner), vec![RunnerEvent::Started(id), RunnerEvent::Stopped(id)]);
    }

    #[test]
    fn test_play_interrupts_previous_session() {
        let (mut runner, log) = probe_runner();
        let first = timeline(1.0, vec![event("old", 0.0, 1.0)]);
        let second = timeline(1.0, vec![event("new", 0.0, 1.0)]);
        let (first_id, second_id) = (first.id, second.id);

        runner.play(first);
        runner.tick(0.2);
        log.clear();

        runner.play(second);
        assert_eq!(
            log.entries(),
            vec![
                ("old".to_string(), Call::Exit),
                ("old".to_string(), Call::Disable),
                ("system".to_string(), Call::Cleanup),
                ("new".to_string(), Call::Enable),
                ("new".to_string(), Call::Enter),
                ("new".to_string(), Call::Update { time: 0.0, delta: 0.0 }),
            ]
        );
        assert_eq!(
            session_events(&mut runner),
            vec![
                RunnerEvent::Started(first_id),
                RunnerEvent::Interrupted(first_id),
                RunnerEvent::Started(second_id),
            ]
        );
        assert_eq!(runner.current_time(), 0.0);
    }

    #[test]
    fn test_loop_wraps_without_disable() {
        let (mut runner, log) = probe_runner();
        let tl = timeline(1.0, vec![event("head", 0.0, 0.3), event("tail", 0.8, 0.2)]).with_loop(true);
        let id = tl.id;
        runner.play(tl);

        runner.tick(0.5);
        runner.tick(0.5);

        assert_eq!(runner.state(), RunnerState::Playing);
        assert_eq!(runner.current_time(), 0.0);
        assert_eq!(runner.loop_count(), 1);
        assert_eq!(log.count("head", Call::Enter), 2);
        assert_eq!(log.calls_for("tail"), vec![Call::Enable, Call::Enter, Call::Exit]);
        assert_eq!(log.count("head", Call::Disable), 0);
        assert!(runner
            .take_events()
            .contains(&RunnerEvent::Looped { timeline: id, count: 1 }));

        runner.stop();
        assert_balanced(&log, "head");
        assert_balanced(&log, "tail");
    }

    #[test]
    fn test_finish_ends_session() {
        let (mut runner, log) = probe_runner();
        let tl = timeline(1.0, vec![event("a", 0.5, 0.5)]);
        let id = tl.id;
        runner.play(tl);
        runner.tick(0.7);
        runner.tick(0.7);

        assert_eq!(runner.state(), RunnerState::Idle);
        assert_eq!(log.calls_for("a").last(), Some(&Call::Disable));
        assert_balanced(&log, "a");
        assert_eq!(session_events(&mut runner), vec![RunnerEvent::Started(id), RunnerEvent::Finished(id)]);
    }

    #[test]
    fn test_finish_holds_without_auto_stop() {
        let (mut runner, log) = probe_runner_with(RunnerConfig {
            auto_stop: false,
            ..Default::default()
        });
        runner.play(timeline(1.0, vec![event("a", 0.5, 0.5)]));
        runner.tick(2.0);

        assert_eq!(runner.state(), RunnerState::Paused);
        assert_eq!(runner.current_time(), 1.0);
        assert_eq!(log.count("a", Call::Disable), 0);

        // scrubbing back still works while held at the end
        assert!(runner.seek(0.6));
        assert_eq!(log.count("a", Call::Enter), 2);

        runner.stop();
        assert_eq!(log.count("a", Call::Disable), 1);
        assert_balanced(&log, "a");
    }

    #[test]
    fn test_pause_freezes_clock() {
        let (mut runner, log) = probe_runner();
        runner.play(timeline(2.0, vec![event("a", 0.0, 1.0)]));
        runner.tick(0.1);

        assert!(runner.pause());
        assert!(!runner.pause());
        log.clear();
        runner.tick(0.5);
        assert!(log.entries().is_empty());
        assert_eq!(runner.current_time(), 0.1);
        assert!(runner.is_clip_active(runner.active_clips()[0]));

        assert!(runner.resume());
        assert!(!runner.resume());
        runner.tick(0.1);
        assert_eq!(log.calls_for("a"), vec![Call::Update { time: 0.2, delta: 0.1 }]);
    }

    #[test]
    fn test_idle_misuse_is_noop() {
        let (mut runner, log) = probe_runner();
        runner.tick(1.0);
        assert!(!runner.seek(0.5));
        assert!(!runner.pause());
        assert!(!runner.resume());
        assert!(!runner.stop());
        assert!(!runner.interrupt());
        assert_eq!(runner.state(), RunnerState::Idle);
        assert_eq!(runner.current_time(), 0.0);
        assert!(log.entries().is_empty());
        assert!(runner.take_events().is_empty());
    }

    #[test]
    fn test_unbound_clip_types_skipped() {
        let mut registry = ProcessRegistry::new();
        registry.register::<ProbeProcess>(ClipType::Event, PlayMode::Runtime);
        let mut runner = Runner::new(ProcessFactory::new(registry), RunnerConfig::default());

        let anim = Track::new("Anim", ClipType::Animation).with_clip(Clip::new(
            "swing",
            0.0,
            0.5,
            ClipKind::Animation(AnimationClip::new("anim/swing", 0)),
        ));
        let events = Track::new("Events", ClipType::Event).with_clip(event("hit", 0.2, 0.1));
        let tl = Timeline::new("Mixed", 1.0)
            .with_group(Group::new("Main").with_track(anim).with_track(events));

        runner.play(tl);
        assert_eq!(runner.process_count(), 1);
        runner.tick(0.25);
        assert_eq!(runner.active_clips().len(), 1);
    }

    #[test]
    fn test_preview_uses_preview_bindings() {
        let mut runner = Runner::builtin(RunnerConfig::preview());
        let camera = Track::new("Camera", ClipType::Camera).with_clip(Clip::new(
            "shake",
            0.0,
            0.5,
            ClipKind::Camera(CameraClip {
                effect: CameraEffect::FieldOfView { fov: 50.0 },
                blend_duration: 0.1,
            }),
        ));
        let events = Track::new("Events", ClipType::Event).with_clip(event("hit", 0.2, 0.1));
        runner.play(
            Timeline::new("Preview", 1.0)
                .with_group(Group::new("Main").with_track(camera).with_track(events)),
        );
        assert_eq!(runner.process_count(), 1);
    }

    #[test]
    fn test_disabled_clips_and_tracks_skipped() {
        let (mut runner, _) = probe_runner();
        let mut off = Track::new("Off", ClipType::Event).with_clip(event("x", 0.0, 0.5));
        off.enabled = false;
        let on = Track::new("On", ClipType::Event)
            .with_clip(event("y", 0.0, 0.5))
            .with_clip(event("z", 0.5, 0.5).with_enabled(false));

        let group = Group::new("Main").with_track(off).with_track(on);
        runner.play(Timeline::new("T", 1.0).with_group(group));
        assert_eq!(runner.process_count(), 1);
    }

    #[test]
    fn test_speed_scales_delta() {
        let (mut runner, log) = probe_runner_with(RunnerConfig::default().with_speed(2.0));
        runner.play(timeline(10.0, vec![event("a", 0.0, 10.0)]));
        log.clear();

        runner.tick(0.25);
        assert_eq!(runner.current_time(), 0.5);
        assert_eq!(log.calls_for("a"), vec![Call::Update { time: 0.5, delta: 0.5 }]);

        runner.set_speed(-3.0);
        runner.tick(0.25);
        assert_eq!(runner.current_time(), 0.5);
    }

    #[test]
    fn test_pool_reused_across_sessions() {
        let (mut runner, _) = probe_runner();
        let tl = Arc::new(timeline(
            1.0,
            vec![event("a", 0.0, 0.2), event("b", 0.2, 0.2), event("c", 0.4, 0.2)],
        ));
        runner.play(tl.clone());
        runner.stop();
        runner.play(tl);

        let stats = runner.factory().pool().lock().stats();
        assert_eq!(stats.created, 3);
        assert_eq!(stats.reused, 3);
        assert_eq!(stats.idle, 0);
    }

    #[test]
    fn test_drop_mid_session_cleans_up() {
        let (mut runner, log) = probe_runner();
        runner.play(timeline(1.0, vec![event("a", 0.0, 1.0)]));
        drop(runner);
        assert_eq!(log.count("a", Call::Disable), 1);
        assert_eq!(log.count("system", Call::Cleanup), 1);
        assert_balanced(&log, "a");
    }

    #[test]
    fn test_builtin_session_restores_host_state() {
        let anim = Arc::new(RecordingAnimation::default());
        anim.set_initial_mask(1, Some("mask/full"));
        let audio = Arc::new(RecordingAudio::default());

        let mut runner = Runner::default();
        runner.context_mut().add_service::<dyn AnimationBridge>(anim.clone());
        runner.context_mut().add_service::<dyn AudioBridge>(audio.clone());

        let swing = Track::new("Anim", ClipType::Animation).with_clip(Clip::new(
            "swing",
            0.0,
            0.5,
            ClipKind::Animation(AnimationClip::new("anim/swing", 1).with_mask("mask/upper")),
        ));
        let mut looped = AudioClip::new("sfx/hum");
        looped.looping = true;
        looped.stop_on_exit = false;
        let hum = Track::new("Audio", ClipType::Audio)
            .with_clip(Clip::new("hum", 0.1, 0.2, ClipKind::Audio(looped)));

        let group = Group::new("Main").with_track(swing).with_track(hum);
        runner.play(Timeline::new("Swing", 1.0).with_group(group));
        assert_eq!(anim.current_mask(1).as_deref(), Some("mask/upper"));
        runner.tick(0.2);
        runner.stop();

        assert_eq!(anim.current_mask(1).as_deref(), Some("mask/full"));
        assert_eq!(anim.calls.count_prefix("initialize"), 1);
        assert_eq!(anim.calls.count_prefix("clear_graph"), 1);
        assert_eq!(audio.calls.count_prefix("play_sound sfx/hum"), 1);
        assert_eq!(audio.calls.count_prefix("stop_sound"), 0);
        assert_eq!(audio.calls.count_prefix("stop_all"), 1);
        assert_eq!(runner.context().layer_mask_depth(1), 0);
    }
}
