// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed-step session driver producing an activation trace.

use crate::host::SimHost;
use crate::settings::SimSettings;
use ordoplay_skill_sequencer::{ClipId, Runner, RunnerEvent, RunnerState, Timeline};
use serde::Serialize;
use std::sync::Arc;

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEntry {
    /// Runner notification
    Session {
        /// Event name
        event: &'static str,
        /// Loop count, for loop events
        #[serde(skip_serializing_if = "Option::is_none")]
        loops: Option<u32>,
    },
    /// A clip became active
    Enter {
        /// Clip name
        clip: String,
    },
    /// A clip became inactive
    Exit {
        /// Clip name
        clip: String,
    },
    /// Seek issued by the script
    Seek {
        /// Seek target
        target: f32,
    },
    /// A bridge call made by a process
    Call {
        /// Call description
        call: String,
    },
}

impl TraceEntry {
    fn session(event: &'static str, loops: Option<u32>) -> Self {
        Self::Session { event, loops }
    }
}

/// One line of the trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceLine {
    /// Simulation clock
    pub clock: f32,
    /// Session time after the step
    pub time: f32,
    /// Entry
    #[serde(flatten)]
    pub entry: TraceEntry,
}

/// Runs one timeline headlessly
pub struct Simulation {
    settings: SimSettings,
    host: Arc<SimHost>,
    runner: Runner,
}

impl Simulation {
    /// Create a simulation with a logging host installed
    pub fn new(settings: SimSettings) -> Self {
        let host = Arc::new(SimHost::new(settings.targets.iter().copied()));
        let mut runner = Runner::builtin(settings.runner.clone());
        host.install(runner.context_mut());
        Self {
            settings,
            host,
            runner,
        }
    }

    /// The logging host
    pub fn host(&self) -> &Arc<SimHost> {
        &self.host
    }

    /// Play `timeline` to completion, or until the time or loop cap is hit
    pub fn run(&mut self, timeline: Timeline) -> Vec<TraceLine> {
        let timeline = Arc::new(timeline);
        let step = self.settings.step.max(f32::EPSILON);
        let mut trace = Vec::new();
        let mut clock = 0.0;
        let mut script = self.settings.seeks.clone();
        script.sort_by(|a, b| a.at.total_cmp(&b.at));
        let mut seeks = script.iter().peekable();

        self.runner.play(timeline.clone());
        self.flush(&timeline, clock, 0.0, &mut trace);

        while self.runner.state() == RunnerState::Playing && clock < self.settings.max_time {
            while let Some(seek) = seeks.next_if(|s| s.at <= clock) {
                self.runner.seek(seek.target);
                let time = self.runner.current_time();
                trace.push(TraceLine {
                    clock,
                    time,
                    entry: TraceEntry::Seek {
                        target: seek.target,
                    },
                });
                self.flush(&timeline, clock, time, &mut trace);
            }

            self.runner.tick(step);
            clock += step;
            // a finished session has already reset its clock
            let time = if self.runner.state() == RunnerState::Idle {
                timeline.duration
            } else {
                self.runner.current_time()
            };
            self.flush(&timeline, clock, time, &mut trace);

            if self.runner.loop_count() >= self.settings.max_loops && timeline.is_loop {
                break;
            }
        }

        let time = self.runner.current_time();
        if self.runner.stop() {
            self.flush(&timeline, clock, time, &mut trace);
        }
        tracing::info!(
            "Simulated '{}' for {:.3}s, {} trace lines",
            timeline.name,
            clock,
            trace.len()
        );
        tracing::debug!("Owner displaced to {:?}", self.host().position());
        trace
    }

    /// Record runner events, then host calls, made since the last flush
    fn flush(&mut self, timeline: &Timeline, clock: f32, time: f32, trace: &mut Vec<TraceLine>) {
        let clip_name = |id: ClipId| {
            timeline
                .clip(id)
                .map_or_else(|| id.to_string(), |c| c.name.clone())
        };
        let mut push = |entry| trace.push(TraceLine { clock, time, entry });

        for event in self.runner.take_events() {
            let entry = match event {
                RunnerEvent::ClipEntered(id) => TraceEntry::Enter { clip: clip_name(id) },
                RunnerEvent::ClipExited(id) => TraceEntry::Exit { clip: clip_name(id) },
                RunnerEvent::Started(_) => TraceEntry::session("started", None),
                RunnerEvent::Interrupted(_) => TraceEntry::session("interrupted", None),
                RunnerEvent::Looped { count, .. } => TraceEntry::session("looped", Some(count)),
                RunnerEvent::Finished(_) => TraceEntry::session("finished", None),
                RunnerEvent::Stopped(_) => TraceEntry::session("stopped", None),
            };
            push(entry);
        }

        for call in self.host.drain_calls() {
            push(TraceEntry::Call { call });
        }
    }
}
