//! Raw and decoded line-art frames
//!
//! **Why**: Animation documents carry frames as nested point lists, which is
//! convenient on the wire but useless to a renderer. Decoding flattens each
//! frame into one position buffer plus a segment index buffer.
//!
//! **Used by**: Decoder (worker side), Assembler (slot storage), Scene (drawables)
//!
//! # Capacity
//!
//! Indices are `u16`, so a decoded frame holds at most [`MAX_FRAME_VERTICES`]
//! vertices. The decoder rejects anything larger.

use serde::{Deserialize, Serialize};

/// Largest vertex count addressable by a u16 index buffer
pub const MAX_FRAME_VERTICES: usize = u16::MAX as usize + 1;

/// One point of a polyline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered polyline points. Empty groups are allowed and decode to nothing.
pub type VertexGroup = Vec<Point3>;

/// One undecoded pose snapshot: a list of independent polylines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFrame {
    pub groups: Vec<VertexGroup>,
}

impl RawFrame {
    pub fn new(groups: Vec<VertexGroup>) -> Self {
        Self { groups }
    }

    /// Total number of points across all groups
    pub fn vertex_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }
}

/// Flat geometry ready for a line-segment draw call
///
/// `positions` holds xyz triples, `indices` holds pairs referencing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFrame {
    pub positions: Vec<f32>,
    pub indices: Vec<u16>,
}

impl DecodedFrame {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn segment_count(&self) -> usize {
        self.indices.len() / 2
    }

    /// Approximate heap size in bytes
    pub fn mem(&self) -> usize {
        self.positions.len() * std::mem::size_of::<f32>()
            + self.indices.len() * std::mem::size_of::<u16>()
    }
}

/// Drawable handed to the rendering collaborator
///
/// The renderer draws only visible segment sets; the cursor guarantees
/// exactly one visible set per clip.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegments {
    geometry: DecodedFrame,
    visible: bool,
}

impl LineSegments {
    pub fn new(geometry: DecodedFrame, visible: bool) -> Self {
        Self { geometry, visible }
    }

    pub fn geometry(&self) -> &DecodedFrame {
        &self.geometry
    }

    pub fn positions(&self) -> &[f32] {
        &self.geometry.positions
    }

    pub fn indices(&self) -> &[u16] {
        &self.geometry.indices
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
