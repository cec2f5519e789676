//! Fully assembled animation: clips of drawable frames plus playback state
//!
//! A `Scene` only exists once every frame of every clip has decoded, so the
//! "no-op until ready" rule is a property of the type: there is nothing to
//! tick before assembly finishes.
//!
//! **Used by**: Assembler (construction), Orchestrator (playback, staging),
//! renderer collaborator (`drawables()` + `stage`)

use glam::Vec3;

use super::cursor::{FrameSwap, PlaybackCursor};
use super::frame::{DecodedFrame, LineSegments};

/// One named sub-animation: ordered frames, at least one
#[derive(Debug, Clone)]
pub struct Clip {
    frames: Vec<LineSegments>,
}

impl Clip {
    pub fn frames(&self) -> &[LineSegments] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Scene transform on the display surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub position: Vec3,
    pub rotation_y: f32,
    pub scale: f32,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_y: 0.0,
            scale: 1.0,
        }
    }
}

/// Playable animation
#[derive(Debug, Clone)]
pub struct Scene {
    clips: Vec<Clip>,
    cursor: PlaybackCursor,
    pub stage: Stage,
}

impl Scene {
    /// Build from decoded clips. Frame 0 of each clip starts visible.
    pub fn new(clips: Vec<Vec<DecodedFrame>>) -> Self {
        let clips: Vec<Clip> = clips
            .into_iter()
            .map(|frames| Clip {
                frames: frames
                    .into_iter()
                    .enumerate()
                    .map(|(i, geometry)| LineSegments::new(geometry, i == 0))
                    .collect(),
            })
            .collect();
        let lengths: Vec<usize> = clips.iter().map(Clip::len).collect();

        Self {
            cursor: PlaybackCursor::new(&lengths),
            clips,
            stage: Stage::default(),
        }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn frame_indices(&self) -> &[usize] {
        self.cursor.frame_indices()
    }

    pub fn frame_limits(&self) -> &[usize] {
        self.cursor.frame_limits()
    }

    pub fn frame_count(&self) -> usize {
        self.clips.iter().map(Clip::len).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.clips
            .iter()
            .flat_map(|c| c.frames.iter())
            .map(|f| f.geometry().vertex_count())
            .sum()
    }

    /// Advance every clip by `n` frames (negative steps backward).
    pub fn tick(&mut self, n: i64) {
        let swaps = self.cursor.tick(n);
        self.apply(&swaps);
    }

    /// Jump every clip to the frame at `percent` of its length.
    pub fn set_frame(&mut self, percent: f64) {
        let swaps = self.cursor.set_frame(percent);
        self.apply(&swaps);
    }

    fn apply(&mut self, swaps: &[FrameSwap]) {
        // from != to implies the clip has at least two frames
        for swap in swaps.iter().filter(|s| s.from != s.to) {
            let frames = &mut self.clips[swap.clip].frames;
            frames[swap.from].set_visible(false);
            frames[swap.to].set_visible(true);
        }
    }

    /// Current frame of each clip
    pub fn current_frames(&self) -> impl Iterator<Item = &LineSegments> + '_ {
        self.clips
            .iter()
            .zip(self.cursor.frame_indices())
            .map(|(clip, &i)| &clip.frames[i])
    }

    /// Every frame with its (clip, frame) slot, visible or not
    pub fn drawables(&self) -> impl Iterator<Item = (usize, usize, &LineSegments)> + '_ {
        self.clips.iter().enumerate().flat_map(|(c, clip)| {
            clip.frames.iter().enumerate().map(move |(f, seg)| (c, f, seg))
        })
    }
}
