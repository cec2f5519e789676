//! Result router: the one place every decode result passes through
//!
//! Replaces a global "instance id -> object" map with an explicit registry.
//! Assemblers are added when a document arrives and removed when their scene
//! completes, fails, or is disposed. Removed instances are remembered as
//! retired so late results are dropped on purpose rather than by accident.

use indexmap::IndexSet;
use log::{error, trace, warn};
use std::collections::HashMap;

use super::assembler::{Progress, SceneAssembler};
use super::jobs::{DecodeResult, InstanceId};
use crate::entities::{LoadError, Scene};

/// What happened to a routed result
#[derive(Debug)]
pub enum RouteOutcome {
    /// Slot filled, scene still incomplete
    Pending,
    /// Last slot filled; assembler removed and consumed
    Ready { scene_index: usize, scene: Scene },
    /// Scene construction failed; assembler removed
    Failed { scene_index: usize, error: LoadError },
    /// No live assembler for this instance (retired or unknown)
    Discarded,
}

/// Retired ids remembered for quiet discards; older ones fall back to "unknown"
pub const MAX_RETIRED: usize = 1024;

/// Registry of live assemblers keyed by instance
#[derive(Debug, Default)]
pub struct ResultRouter {
    live: HashMap<InstanceId, SceneAssembler>,
    retired: IndexSet<InstanceId>,
}

impl ResultRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start routing results for `assembler.instance()`.
    pub fn register(&mut self, assembler: SceneAssembler) {
        let instance = assembler.instance();
        trace!("Router: register {} (scene {})", instance, assembler.scene_index());
        self.live.insert(instance, assembler);
    }

    /// Stop routing results for `instance`. Later results are discarded.
    pub fn retire(&mut self, instance: InstanceId) -> Option<SceneAssembler> {
        self.retired.insert(instance);
        if self.retired.len() > MAX_RETIRED {
            self.retired.shift_remove_index(0);
        }
        self.live.remove(&instance)
    }

    /// Retire every live instance
    pub fn retire_all(&mut self) {
        let ids: Vec<InstanceId> = self.live.keys().copied().collect();
        for id in ids {
            self.retire(id);
        }
    }

    pub fn is_live(&self, instance: InstanceId) -> bool {
        self.live.contains_key(&instance)
    }

    pub fn is_retired(&self, instance: InstanceId) -> bool {
        self.retired.contains(&instance)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Deliver one result to its assembler slot.
    pub fn route(&mut self, result: DecodeResult) -> RouteOutcome {
        let DecodeResult { instance, clip, frame, result } = result;

        let Some(assembler) = self.live.get_mut(&instance) else {
            if self.retired.contains(&instance) {
                trace!("Router: dropping {}:{} for retired {}", clip, frame, instance);
            } else {
                warn!("Router: result {}:{} for unknown instance {}", clip, frame, instance);
            }
            return RouteOutcome::Discarded;
        };
        let scene_index = assembler.scene_index();

        let progress = match result {
            Ok(decoded) => assembler.accept(clip, frame, decoded),
            Err(error) => {
                error!("Scene {} ({}) failed: {}", scene_index, instance, error);
                self.retire(instance);
                return RouteOutcome::Failed { scene_index, error };
            }
        };

        match progress {
            Ok(Progress::Pending { .. }) => RouteOutcome::Pending,
            Ok(Progress::Complete) => {
                let Some(assembler) = self.retire(instance) else {
                    return RouteOutcome::Discarded;
                };
                match assembler.finish() {
                    Ok(scene) => RouteOutcome::Ready { scene_index, scene },
                    Err(error) => RouteOutcome::Failed { scene_index, error },
                }
            }
            // Duplicate or stray slot: the scene itself is still fine
            Err(e) => {
                warn!("Router: ignoring result for {}: {}", instance, e);
                RouteOutcome::Pending
            }
        }
    }
}
