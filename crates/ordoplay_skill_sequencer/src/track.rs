// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for the sequencer.

use crate::clip::{Clip, ClipId, ClipType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// A track of clips of one compatible type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Clip type accepted by this track
    pub track_type: ClipType,
    /// Clips in this track, sorted by start time
    clips: Vec<Clip>,
    /// Disabled tracks are never scheduled
    pub enabled: bool,
    /// Whether the track is muted (editor only)
    pub muted: bool,
    /// Whether the track is locked (editor only)
    pub locked: bool,
    /// Whether the track is hidden (editor only)
    pub hidden: bool,
    /// Whether clips on this track may overlap in time
    pub can_overlap: bool,
    /// Track color override
    pub color: Option<[u8; 3]>,
}

impl Track {
    /// Create a new track
    pub fn new(name: impl Into<String>, track_type: ClipType) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            track_type,
            clips: Vec::new(),
            enabled: true,
            muted: false,
            locked: false,
            hidden: false,
            can_overlap: false,
            color: None,
        }
    }

    /// Allow or forbid overlapping clips
    pub fn with_overlap(mut self, can_overlap: bool) -> Self {
        self.can_overlap = can_overlap;
        self
    }

    /// Add a clip; returns its ID
    pub fn add_clip(&mut self, clip: Clip) -> ClipId {
        let id = clip.id;
        self.clips.push(clip);
        self.sort_clips();
        id
    }

    /// Builder form of [`Track::add_clip`]
    pub fn with_clip(mut self, clip: Clip) -> Self {
        self.add_clip(clip);
        self
    }

    /// Remove a clip
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Option<Clip> {
        let idx = self.clips.iter().position(|c| c.id == clip_id)?;
        Some(self.clips.remove(idx))
    }

    /// Sort clips by start time
    fn sort_clips(&mut self) {
        self.clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }

    /// Whether a clip's type matches this track
    pub fn accepts(&self, clip: &Clip) -> bool {
        clip.clip_type() == self.track_type
    }

    /// Get clip by ID
    pub fn clip(&self, clip_id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    /// Get mutable clip by ID
    pub fn clip_mut(&mut self, clip_id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }

    /// Get all clips
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Get clip count
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Get clips active at a specific time
    pub fn clips_at(&self, time: f32) -> Vec<&Clip> {
        self.clips.iter().filter(|c| c.contains(time)).collect()
    }

    /// End time of the last clip
    pub fn duration(&self) -> f32 {
        self.clips.iter().map(Clip::end_time).fold(0.0, f32::max)
    }

    /// Pairs of overlapping clips, in start order
    pub fn overlapping_pairs(&self) -> Vec<(&Clip, &Clip)> {
        let mut pairs = Vec::new();
        for (i, a) in self.clips.iter().enumerate() {
            for b in &self.clips[i + 1..] {
                // sorted by start, so nothing further can overlap `a`
                if b.start_time >= a.end_time() {
                    break;
                }
                if a.overlaps(b) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    /// Move clip to a new start time
    pub fn move_clip(&mut self, clip_id: ClipId, new_start: f32) {
        if let Some(clip) = self.clip_mut(clip_id) {
            clip.start_time = new_start.max(0.0);
        }
        self.sort_clips();
    }

    /// Offset all clips by a time delta
    pub fn offset_time(&mut self, delta: f32) {
        for clip in &mut self.clips {
            clip.start_time = (clip.start_time + delta).max(0.0);
        }
        self.sort_clips();
    }

    /// Get the effective color for this track
    pub fn effective_color(&self) -> [u8; 3] {
        self.color.unwrap_or_else(|| self.track_type.color())
    }
}
