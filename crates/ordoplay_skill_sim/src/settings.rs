// SPDX-License-Identifier: MIT OR Apache-2.0
//! Simulation settings, persisted as RON.

use ordoplay_skill_sequencer::{ConfigError, RunnerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Seek issued when the simulation clock reaches `at`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeekCommand {
    /// Simulation clock time at which to seek
    pub at: f32,
    /// Session time to seek to
    pub target: f32,
}

/// How to drive a simulated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Runner configuration
    pub runner: RunnerConfig,
    /// Fixed tick size in seconds
    pub step: f32,
    /// Hard cap on simulated time
    pub max_time: f32,
    /// Stop a looping timeline after this many loops
    pub max_loops: u32,
    /// Scripted seeks, applied in clock order
    pub seeks: Vec<SeekCommand>,
    /// Target ids every damage query reports as in range
    pub targets: Vec<u64>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            runner: RunnerConfig::default(),
            step: 1.0 / 30.0,
            max_time: 30.0,
            max_loops: 1,
            seeks: Vec::new(),
            targets: vec![1, 2],
        }
    }
}

impl SimSettings {
    /// Deserialize from RON; missing fields take their defaults
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&contents)?;
        tracing::debug!("Loaded simulation settings from {}", path.display());
        Ok(settings)
    }
}
