// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline containing groups of tracks.

use crate::binding::AssetRef;
use crate::clip::{Clip, ClipId};
use crate::track::{Track, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use uuid::Uuid;

/// Current timeline file format version
pub const TIMELINE_FORMAT_VERSION: u32 = 1;

/// Unique identifier for a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from loading, saving or validating a timeline
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Timeline could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Clip starts before zero
    #[error("Clip {clip} starts at negative time {start}")]
    NegativeStart {
        /// Offending clip
        clip: ClipId,
        /// Its start time
        start: f32,
    },

    /// Clip has zero or negative length
    #[error("Clip {clip} has non-positive duration {duration}")]
    NonPositiveDuration {
        /// Offending clip
        clip: ClipId,
        /// Its duration
        duration: f32,
    },

    /// Clip ends after the timeline duration
    #[error("Clip {clip} ends at {end} past timeline duration {duration}")]
    ClipPastEnd {
        /// Offending clip
        clip: ClipId,
        /// Clip end time
        end: f32,
        /// Timeline duration
        duration: f32,
    },

    /// Two clips overlap on a track that forbids it
    #[error("Clips {first} and {second} overlap on track '{track}'")]
    Overlap {
        /// Track name
        track: String,
        /// Earlier clip
        first: ClipId,
        /// Later clip
        second: ClipId,
    },

    /// Clip type does not match its track
    #[error("Clip {clip} of type {clip_type} placed on {track_type} track '{track}'")]
    IncompatibleClip {
        /// Track name
        track: String,
        /// Offending clip
        clip: ClipId,
        /// Clip type name
        clip_type: &'static str,
        /// Track type name
        track_type: &'static str,
    },
}

/// Organizational group of tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group name
    pub name: String,
    /// Collapsed in the editor
    pub collapsed: bool,
    /// Locked in the editor
    pub locked: bool,
    /// Tracks in this group
    tracks: IndexMap<TrackId, Track>,
}

impl Group {
    /// Create a new group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collapsed: false,
            locked: false,
            tracks: IndexMap::new(),
        }
    }

    /// Add a track
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    /// Builder form of [`Group::add_track`]
    pub fn with_track(mut self, track: Track) -> Self {
        self.add_track(track);
        self
    }

    /// Remove a track, keeping the order of the rest
    pub fn remove_track(&mut self, track_id: TrackId) -> Option<Track> {
        self.tracks.shift_remove(&track_id)
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    /// Get all tracks
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// A skill timeline: groups of tracks of clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Timeline name
    pub name: String,
    /// Groups in this timeline
    groups: Vec<Group>,
    /// Timeline duration (can be longer than clips)
    pub duration: f32,
    /// Frame rate used for frame/time conversion
    pub frame_rate: f32,
    /// Whether playback loops at the end
    pub is_loop: bool,
    /// Format version
    pub version: u32,
}

impl Timeline {
    /// Create a new timeline
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            id: TimelineId::new(),
            name: name.into(),
            groups: Vec::new(),
            duration,
            frame_rate: 30.0,
            is_loop: false,
            version: TIMELINE_FORMAT_VERSION,
        }
    }

    /// Set the loop flag
    pub fn with_loop(mut self, is_loop: bool) -> Self {
        self.is_loop = is_loop;
        self
    }

    /// Add a group; returns its index
    pub fn add_group(&mut self, group: Group) -> usize {
        self.groups.push(group);
        self.groups.len() - 1
    }

    /// Builder form of [`Timeline::add_group`]
    pub fn with_group(mut self, group: Group) -> Self {
        self.add_group(group);
        self
    }

    /// Get all groups
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Get a mutable group by index
    pub fn group_mut(&mut self, index: usize) -> Option<&mut Group> {
        self.groups.get_mut(index)
    }

    /// All tracks, depth-first over groups
    pub fn all_tracks(&self) -> impl Iterator<Item = &Track> {
        self.groups.iter().flat_map(Group::tracks)
    }

    /// All clips, in track order
    pub fn all_clips(&self) -> impl Iterator<Item = &Clip> {
        self.all_tracks().flat_map(|t| t.clips().iter())
    }

    /// Find a clip anywhere in the timeline
    pub fn clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.all_clips().find(|c| c.id == clip_id)
    }

    /// Find a track anywhere in the timeline
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.groups.iter().find_map(|g| g.track(track_id))
    }

    /// End time of the last clip
    pub fn content_duration(&self) -> f32 {
        self.all_tracks().map(Track::duration).fold(0.0, f32::max)
    }

    /// Grow `duration` to cover all clips
    pub fn fit_duration(&mut self) {
        self.duration = self.duration.max(self.content_duration());
    }

    /// Convert time to frame number
    pub fn time_to_frame(&self, time: f32) -> u32 {
        (time * self.frame_rate) as u32
    }

    /// Convert frame number to time
    pub fn frame_to_time(&self, frame: u32) -> f32 {
        frame as f32 / self.frame_rate
    }

    /// Every distinct asset referenced by the timeline, sorted
    pub fn asset_refs(&self) -> Vec<&AssetRef> {
        let refs: BTreeSet<&AssetRef> = self
            .all_clips()
            .flat_map(|c| c.kind.asset_refs())
            .collect();
        refs.into_iter().collect()
    }

    /// Check the authoring invariants.
    ///
    /// Playback does not call this; a timeline that fails validation still
    /// plays with whatever intervals it has.
    pub fn validate(&self) -> Result<(), TimelineError> {
        for track in self.all_tracks() {
            for clip in track.clips() {
                if !track.accepts(clip) {
                    return Err(TimelineError::IncompatibleClip {
                        track: track.name.clone(),
                        clip: clip.id,
                        clip_type: clip.clip_type().name(),
                        track_type: track.track_type.name(),
                    });
                }
                if clip.start_time < 0.0 {
                    return Err(TimelineError::NegativeStart {
                        clip: clip.id,
                        start: clip.start_time,
                    });
                }
                if clip.duration <= 0.0 {
                    return Err(TimelineError::NonPositiveDuration {
                        clip: clip.id,
                        duration: clip.duration,
                    });
                }
                if clip.end_time() > self.duration {
                    return Err(TimelineError::ClipPastEnd {
                        clip: clip.id,
                        end: clip.end_time(),
                        duration: self.duration,
                    });
                }
            }

            if !track.can_overlap {
                if let Some((first, second)) = track.overlapping_pairs().first() {
                    return Err(TimelineError::Overlap {
                        track: track.name.clone(),
                        first: first.id,
                        second: second.id,
                    });
                }
            }
        }
        Ok(())
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Save timeline to file
    pub fn save(&self, path: &Path) -> Result<(), TimelineError> {
        let ron_str = self.to_ron()?;
        std::fs::write(path, ron_str)?;
        Ok(())
    }

    /// Load timeline from file
    pub fn load(path: &Path) -> Result<Self, TimelineError> {
        let contents = std::fs::read_to_string(path)?;
        let timeline = Self::from_ron(&contents)?;
        tracing::debug!(
            "Loaded timeline '{}' ({} tracks) from {:?}",
            timeline.name,
            timeline.all_tracks().count(),
            path
        );
        Ok(timeline)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new("Untitled Skill", 1.0)
    }
}
