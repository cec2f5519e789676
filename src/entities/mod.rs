//! Data entities: frames, decoder, cursor, scenes, wire formats
//!
//! Nothing in here spawns threads or touches I/O; `core` drives these types.

pub mod cursor;
pub mod decoder;
pub mod document;
pub mod error;
pub mod frame;
pub mod scene;
pub mod traits;

pub use cursor::{FrameSwap, PlaybackCursor};
pub use decoder::{decode_frame, DecodeError};
pub use document::{AnimationDocument, AnimationSet, SceneEntry};
pub use error::LoadError;
pub use frame::{DecodedFrame, LineSegments, Point3, RawFrame, VertexGroup, MAX_FRAME_VERTICES};
pub use scene::{Clip, Scene, Stage};
pub use traits::{Fetch, Job, WorkerPool};
