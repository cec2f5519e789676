//! Core engine modules - workers, loading, assembly, orchestration
//!
//! These modules form the decode and playback engine, independent of any
//! rendering surface.

pub mod assembler;
pub mod events;
pub mod fetch;
pub mod jobs;
pub mod loader;
pub mod orchestrator;
pub mod router;
pub mod tween;
pub mod workers;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use assembler::{Progress, SceneAssembler, SlotError};
pub use events::{EventBus, PlayerEvent};
pub use fetch::FileFetcher;
pub use jobs::{DecodeJob, DecodeResult, InstanceId, WorkerMessage};
pub use loader::{LoaderEvent, LoaderStats, SceneLoader, SceneState};
pub use orchestrator::Orchestrator;
pub use router::{ResultRouter, RouteOutcome};
pub use tween::{Easing, TweenEvent, TweenId, TweenRequest, Tweener, Tweens};
pub use workers::{default_pool_size, Dispatcher, Workers};
