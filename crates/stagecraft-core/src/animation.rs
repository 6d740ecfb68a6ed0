//! # Animation Module
//!
//! Frame-based sprite-sheet animation.
//!
//! ## Key Types
//! - `AnimationFrame`: A contiguous run of sprite-sheet indices.
//! - `AnimationClip`: Named, rate-timed sequence of one or more frame runs.
//! - `AnimationTrack`: Per-node clip registry with a single active clip and a
//!   playback state machine (`Idle`, `Playing`, `Paused`, `Finished`).
//!
//! Clips advance in whole frames: the accumulated time is drained one frame
//! period at a time, so a long `update` lands on the same frame as several
//! short ones covering the same span.

use crate::errors::AnimationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Frame rate used when a clip declares none.
pub const DEFAULT_FRAME_RATE: f32 = 12.0;

/// Above this many elapsed frame periods, `update` skips ahead in one step.
const MAX_STEPPED_FRAMES: f32 = 1024.0;

/// A contiguous run of frames in a sprite sheet's linear index space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub start_frame: u32,
    pub frame_count: u32,
}

impl AnimationFrame {
    pub fn new(start_frame: u32, frame_count: u32) -> Self {
        Self {
            start_frame,
            frame_count,
        }
    }
}

impl Default for AnimationFrame {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub frames: Vec<AnimationFrame>,
    /// Frames per second.
    pub frame_rate: f32,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl AnimationClip {
    /// Number of displayable frames across all runs.
    pub fn total_frames(&self) -> u32 {
        self.checked_total_frames().unwrap_or(u32::MAX)
    }

    fn checked_total_frames(&self) -> Option<u32> {
        self.frames
            .iter()
            .try_fold(0u32, |total, f| total.checked_add(f.frame_count))
    }

    /// Duration of one frame in seconds.
    pub fn frame_period(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Maps a logical frame number to the run that contains it and the
    /// offset within that run.
    fn locate(&self, logical: u32) -> Option<(&AnimationFrame, u32)> {
        let mut remaining = logical;
        for group in &self.frames {
            if remaining < group.frame_count {
                return Some((group, remaining));
            }
            remaining -= group.frame_count;
        }
        None
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Finished,
}

/// Named clips plus the playback state of the active one.
#[derive(Clone, Debug, Default)]
pub struct AnimationTrack {
    clips: BTreeMap<String, AnimationClip>,
    active: Option<String>,
    current_frame: u32,
    frame_timer: f32,
    state: PlaybackState,
}

impl AnimationTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip, replacing any clip of the same name.
    ///
    /// Fails if the frame rate is not a positive finite number, or the frame
    /// runs add up to zero frames or to more than `u32::MAX`.
    pub fn add_clip(
        &mut self,
        name: &str,
        frames: Vec<AnimationFrame>,
        frame_rate: f32,
        looping: bool,
    ) -> Result<(), AnimationError> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(AnimationError::InvalidFrameRate {
                clip: name.to_string(),
                rate: frame_rate,
            });
        }
        let clip = AnimationClip {
            name: name.to_string(),
            frames,
            frame_rate,
            looping,
        };
        match clip.checked_total_frames() {
            None => return Err(AnimationError::TooManyFrames(name.to_string())),
            Some(0) => return Err(AnimationError::EmptyClip(name.to_string())),
            Some(_) => {}
        }

        debug!(clip = name, frames = clip.total_frames(), frame_rate, looping, "clip added");
        if self.active.as_deref() == Some(name) {
            self.current_frame = 0;
            self.frame_timer = 0.0;
        }
        self.clips.insert(name.to_string(), clip);
        Ok(())
    }

    /// Removes a clip. Removing the active clip stops playback.
    pub fn remove_clip(&mut self, name: &str) -> Option<AnimationClip> {
        let removed = self.clips.remove(name)?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
            self.stop();
        }
        Some(removed)
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    pub fn clips(&self) -> impl Iterator<Item = &AnimationClip> {
        self.clips.values()
    }

    /// Starts a clip from its first frame.
    ///
    /// An unknown name leaves the track untouched.
    pub fn play(&mut self, name: &str) -> Result<(), AnimationError> {
        if !self.clips.contains_key(name) {
            warn!(clip = name, "cannot play unknown clip");
            return Err(AnimationError::ClipNotFound(name.to_string()));
        }
        self.active = Some(name.to_string());
        self.current_frame = 0;
        self.frame_timer = 0.0;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Returns to frame 0 and goes idle. The active clip is kept so that
    /// `resume` can restart it.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Idle;
        self.current_frame = 0;
        self.frame_timer = 0.0;
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn resume(&mut self) {
        match self.state {
            PlaybackState::Paused => self.state = PlaybackState::Playing,
            PlaybackState::Idle if self.active.is_some() => self.state = PlaybackState::Playing,
            _ => {}
        }
    }

    /// Rewinds the active clip without changing the playback state.
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.frame_timer = 0.0;
    }

    /// Drops every clip and returns to idle.
    pub fn clear(&mut self) {
        self.clips.clear();
        self.active = None;
        self.stop();
    }

    /// Advances playback by `dt` seconds. Negative or non-finite deltas are
    /// treated as zero.
    pub fn update(&mut self, dt: f32) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let dt = if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            if dt != 0.0 {
                trace!(dt, "ignoring invalid time step");
            }
            0.0
        };
        let Some(clip) = self.active_clip() else {
            return;
        };
        let period = clip.frame_period();
        let total = clip.total_frames();
        let looping = clip.looping;

        self.frame_timer += dt;
        let pending = self.frame_timer / period;
        if pending >= MAX_STEPPED_FRAMES {
            // Too many periods to drain one by one; jump straight there.
            self.frame_timer = (self.frame_timer % period).max(0.0);
            self.advance(pending as u64, total, looping);
            if self.state != PlaybackState::Playing {
                return;
            }
        }
        // Fewer than MAX_STEPPED_FRAMES periods remain here, so each
        // subtraction makes progress.
        while self.frame_timer >= period {
            self.frame_timer -= period;
            if !self.advance(1, total, looping) {
                break;
            }
        }
    }

    /// Moves `frames` logical frames ahead, wrapping or finishing at the
    /// end of the clip. Returns false once a non-looping clip finishes.
    fn advance(&mut self, frames: u64, total: u32, looping: bool) -> bool {
        let next = u64::from(self.current_frame).saturating_add(frames);
        if next < u64::from(total) {
            self.current_frame = next as u32;
            return true;
        }
        if looping {
            self.current_frame = (next % u64::from(total)) as u32;
            return true;
        }
        self.current_frame = total - 1;
        self.frame_timer = 0.0;
        self.state = PlaybackState::Finished;
        debug!(clip = self.active.as_deref().unwrap_or_default(), "clip finished");
        false
    }

    /// The sprite-sheet index for the current logical frame.
    ///
    /// Resolves through the clip's runs in order; falls back to the first
    /// run's start, or 0 when nothing is active.
    pub fn current_frame_index(&self) -> u32 {
        let Some(clip) = self.active_clip() else {
            return 0;
        };
        match clip.locate(self.current_frame) {
            Some((group, offset)) => group.start_frame.saturating_add(offset),
            None => clip.frames.first().map_or(0, |g| g.start_frame),
        }
    }

    /// The frame run containing the current logical frame.
    pub fn current_frame_group(&self) -> Option<AnimationFrame> {
        let clip = self.active_clip()?;
        clip.locate(self.current_frame)
            .map(|(group, _)| *group)
            .or_else(|| clip.frames.first().copied())
    }

    pub fn active_clip(&self) -> Option<&AnimationClip> {
        self.active.as_ref().and_then(|n| self.clips.get(n))
    }

    pub fn active_clip_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Logical frame within the active clip, before run resolution.
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn frame_timer(&self) -> f32 {
        self.frame_timer
    }
}
