// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runner configuration, persisted as RON.

use crate::process::PlayMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or saving a [`RunnerConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// How a [`Runner`](crate::runner::Runner) plays timelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Process set to instantiate
    pub mode: PlayMode,
    /// Initial global speed multiplier
    pub speed: f32,
    /// Clamp seek targets into `[0, duration]`
    pub clamp_seek: bool,
    /// End the session when a non-looping timeline reaches its end.
    /// When off, the runner pauses at `duration` instead.
    pub auto_stop: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: PlayMode::Runtime,
            speed: 1.0,
            clamp_seek: true,
            auto_stop: true,
        }
    }
}

impl RunnerConfig {
    /// Config for editor preview
    pub fn preview() -> Self {
        Self {
            mode: PlayMode::Preview,
            ..Default::default()
        }
    }

    /// Set the play mode
    pub fn with_mode(mut self, mode: PlayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the initial speed
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON; missing fields take their defaults
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&contents)?;
        tracing::debug!("Loaded runner config from {}", path.display());
        Ok(config)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
