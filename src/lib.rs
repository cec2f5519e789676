//! LINEPLAY - worker-parallel line-art animation decode and playback
//!
//! Re-exports all modules for use by binary targets.

// Core engine (workers, loading, orchestration)
pub mod core;

// Data model and wire formats
pub mod entities;

// App modules
pub mod cli;
pub mod config;
pub mod runner;

// Re-export commonly used types from core
pub use core::events::{EventBus, PlayerEvent};
pub use core::fetch::FileFetcher;
pub use core::loader::{SceneLoader, SceneState};
pub use core::orchestrator::Orchestrator;
pub use core::workers::Workers;

// Re-export entities
pub use entities::{AnimationSet, LoadError, Scene, SceneEntry};
