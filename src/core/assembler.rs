//! Scene assembler: out-of-order decode results -> ordered clips
//!
//! Pre-allocates one slot per (clip, frame) from the document shape and
//! fills slots as results arrive, in whatever order workers finish. Because
//! every result lands in its own slot, the assembled order is the document
//! order no matter how completions interleave.
//!
//! Readiness is `completed == total`. A frame never counts twice: duplicate
//! and out-of-range writes are rejected without touching the counters.

use log::{debug, warn};

use super::jobs::InstanceId;
use crate::entities::{DecodedFrame, LoadError, Scene};

/// Assembly progress after accepting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending { completed: usize, total: usize },
    Complete,
}

/// Slot write rejections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    OutOfRange { clip: usize, frame: usize },
    AlreadyFilled { clip: usize, frame: usize },
}

impl std::fmt::Display for SlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotError::OutOfRange { clip, frame } => {
                write!(f, "slot {}:{} out of range", clip, frame)
            }
            SlotError::AlreadyFilled { clip, frame } => {
                write!(f, "slot {}:{} already filled", clip, frame)
            }
        }
    }
}

impl std::error::Error for SlotError {}

/// Collects decoded frames for one animation instance
#[derive(Debug)]
pub struct SceneAssembler {
    instance: InstanceId,
    scene_index: usize,
    clips: Vec<Vec<Option<DecodedFrame>>>,
    total: usize,
    completed: usize,
}

impl SceneAssembler {
    /// Allocate slots for `shape[clip]` frames per clip.
    pub fn new(instance: InstanceId, scene_index: usize, shape: &[usize]) -> Self {
        let clips: Vec<Vec<Option<DecodedFrame>>> =
            shape.iter().map(|&n| vec![None; n]).collect();
        let total = shape.iter().sum();

        debug!(
            "Assembler {} for scene {}: {} clips, {} frames",
            instance,
            scene_index,
            clips.len(),
            total
        );

        Self {
            instance,
            scene_index,
            clips,
            total,
            completed: 0,
        }
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// Write one decoded frame into its slot.
    pub fn accept(
        &mut self,
        clip: usize,
        frame: usize,
        decoded: DecodedFrame,
    ) -> Result<Progress, SlotError> {
        let slot = self
            .clips
            .get_mut(clip)
            .and_then(|c| c.get_mut(frame))
            .ok_or(SlotError::OutOfRange { clip, frame })?;

        if slot.is_some() {
            warn!("Assembler {}: duplicate result for {}:{}", self.instance, clip, frame);
            return Err(SlotError::AlreadyFilled { clip, frame });
        }

        *slot = Some(decoded);
        self.completed += 1;

        if self.is_complete() {
            Ok(Progress::Complete)
        } else {
            Ok(Progress::Pending {
                completed: self.completed,
                total: self.total,
            })
        }
    }

    /// Consume a complete assembler into a playable scene.
    ///
    /// Fails if any slot is still empty; a partial scene is never produced.
    pub fn finish(self) -> Result<Scene, LoadError> {
        let mut clips = Vec::with_capacity(self.clips.len());
        for (c, slots) in self.clips.into_iter().enumerate() {
            let mut frames = Vec::with_capacity(slots.len());
            for (f, slot) in slots.into_iter().enumerate() {
                match slot {
                    Some(decoded) => frames.push(decoded),
                    None => {
                        return Err(LoadError::DecodeFailed {
                            clip: c,
                            frame: f,
                            reason: "frame never decoded".to_string(),
                        })
                    }
                }
            }
            clips.push(frames);
        }

        debug!("Assembler {}: scene {} ready", self.instance, self.scene_index);
        Ok(Scene::new(clips))
    }
}
