//! Memoizing scene loader
//!
//! **Why**: Several callers ask for the same scene at nearly the same time
//! (prefetch-ahead, prefetch-behind, explicit navigation). Each scene must be
//! fetched once and decoded once, no matter how many requests arrive.
//!
//! **Used by**: Orchestrator (navigation + prefetch), runner (`--check`)
//!
//! # State cache
//!
//! One [`SceneState`] per scene slot:
//!
//! ```text
//! NotStarted --request--> Loading(instance) --all frames--> Ready(scene)
//!                                  \--------any error------> Failed(error)
//! ```
//!
//! `request()` is the only transition out of `NotStarted`; it takes
//! `&mut self`, so re-entry is ruled out by the borrow checker. `Ready` and
//! `Failed` are terminal.
//!
//! # Result flow
//!
//! Workers send [`WorkerMessage`]s into one channel. `pump()` drains it on the
//! orchestration thread and feeds decode results through the
//! [`ResultRouter`].

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, trace};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::assembler::SceneAssembler;
use super::jobs::{submit_decode, submit_fetch, DecodeJob, InstanceId, WorkerMessage};
use super::router::{ResultRouter, RouteOutcome};
use crate::entities::{AnimationDocument, Fetch, LoadError, Scene, SceneEntry, WorkerPool};

/// Load state of one scene slot
#[derive(Debug)]
pub enum SceneState {
    NotStarted,
    Loading(InstanceId),
    Ready(Box<Scene>),
    Failed(LoadError),
}

impl SceneState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SceneState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SceneState::Failed(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SceneState::Loading(_))
    }
}

/// Slot transitions reported by `pump()`
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEvent {
    Ready(usize),
    Failed(usize, LoadError),
}

/// Loader counters for monitoring and tests
#[derive(Debug, Default)]
pub struct LoaderStats {
    requests: AtomicU64,
    memo_hits: AtomicU64,
    fetches: AtomicU64,
    jobs_submitted: AtomicU64,
    results_routed: AtomicU64,
    results_discarded: AtomicU64,
}

impl LoaderStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn memo_hits(&self) -> u64 {
        self.memo_hits.load(Ordering::Relaxed)
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn jobs_submitted(&self) -> u64 {
        self.jobs_submitted.load(Ordering::Relaxed)
    }

    pub fn results_routed(&self) -> u64 {
        self.results_routed.load(Ordering::Relaxed)
    }

    pub fn results_discarded(&self) -> u64 {
        self.results_discarded.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.requests();
        if total == 0 { 0.0 } else { self.memo_hits() as f64 / total as f64 }
    }
}

/// Fetch + decode + assemble, once per scene slot
pub struct SceneLoader {
    entries: Vec<SceneEntry>,
    slots: Vec<SceneState>,
    router: ResultRouter,
    pool: Arc<dyn WorkerPool>,
    fetcher: Arc<dyn Fetch>,
    sink: Sender<WorkerMessage>,
    results: Receiver<WorkerMessage>,
    pending_events: Vec<LoaderEvent>,
    stats: LoaderStats,
}

impl SceneLoader {
    pub fn new(entries: Vec<SceneEntry>, pool: Arc<dyn WorkerPool>, fetcher: Arc<dyn Fetch>) -> Self {
        let (sink, results) = unbounded();
        let slots = entries.iter().map(|_| SceneState::NotStarted).collect();

        debug!("SceneLoader: {} scenes, {} workers", entries.len(), pool.size());

        Self {
            entries,
            slots,
            router: ResultRouter::new(),
            pool,
            fetcher,
            sink,
            results,
            pending_events: Vec::new(),
            stats: LoaderStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&SceneEntry> {
        self.entries.get(index)
    }

    pub fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    pub fn state(&self, index: usize) -> Option<&SceneState> {
        self.slots.get(index)
    }

    pub fn is_ready(&self, index: usize) -> bool {
        self.state(index).is_some_and(SceneState::is_ready)
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        match self.slots.get(index)? {
            SceneState::Ready(scene) => Some(scene.as_ref()),
            _ => None,
        }
    }

    pub fn scene_mut(&mut self, index: usize) -> Option<&mut Scene> {
        match self.slots.get_mut(index)? {
            SceneState::Ready(scene) => Some(scene.as_mut()),
            _ => None,
        }
    }

    /// Ask for a scene. Starts the load on first call, memoized afterwards.
    ///
    /// Returns None for an out-of-range index.
    pub fn request(&mut self, index: usize) -> Option<&SceneState> {
        let locator = self.entries.get(index)?.url.clone();
        LoaderStats::bump(&self.stats.requests);

        if matches!(self.slots[index], SceneState::NotStarted) {
            let instance = InstanceId::new();
            self.slots[index] = SceneState::Loading(instance);
            LoaderStats::bump(&self.stats.fetches);
            info!("Loading scene {} ({}) from {}", index, instance, locator);

            submit_fetch(
                &*self.pool,
                Arc::clone(&self.fetcher),
                instance,
                index,
                locator,
                self.sink.clone(),
            );
        } else {
            LoaderStats::bump(&self.stats.memo_hits);
            trace!("Scene {} already requested", index);
        }

        self.slots.get(index)
    }

    /// Drain worker messages; return slot transitions since the last call.
    pub fn pump(&mut self) -> Vec<LoaderEvent> {
        while let Ok(msg) = self.results.try_recv() {
            self.handle(msg);
        }
        std::mem::take(&mut self.pending_events)
    }

    /// Block until scene `index` is ready or failed, or `timeout` passes.
    ///
    /// Events observed while waiting are kept for the next `pump()`.
    pub fn wait_for(&mut self, index: usize, timeout: Duration) -> Result<&Scene, LoadError> {
        if self.request(index).is_none() {
            return Err(LoadError::FetchFailed(format!("no scene at index {}", index)));
        }
        let deadline = Instant::now() + timeout;

        loop {
            match &self.slots[index] {
                SceneState::Ready(_) | SceneState::Failed(_) => break,
                _ => {}
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(msg) => self.handle(msg),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(LoadError::FetchFailed(format!(
                        "timed out after {:?} waiting for scene {}",
                        timeout, index
                    )))
                }
                // Unreachable while self holds a sender
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(LoadError::FetchFailed("result channel closed".to_string()))
                }
            }
        }

        match &self.slots[index] {
            SceneState::Ready(scene) => Ok(scene.as_ref()),
            SceneState::Failed(e) => Err(e.clone()),
            _ => Err(LoadError::FetchFailed(format!("scene {} not loaded", index))),
        }
    }

    /// Stop routing for every in-flight instance and release loaded scenes.
    ///
    /// Workers still running finish their jobs; their results are dropped.
    pub fn dispose(&mut self) {
        self.router.retire_all();
        for slot in &mut self.slots {
            *slot = SceneState::NotStarted;
        }
        self.pending_events.clear();
        info!("SceneLoader disposed");
    }

    fn handle(&mut self, msg: WorkerMessage) {
        match msg {
            WorkerMessage::Fetched { instance, scene, result } => {
                if !self.is_loading_instance(scene, instance) {
                    LoaderStats::bump(&self.stats.results_discarded);
                    trace!("Dropping fetch result for stale instance {}", instance);
                    return;
                }
                match result {
                    Ok(doc) => self.start_decode(instance, scene, doc),
                    Err(e) => self.fail(scene, e),
                }
            }
            WorkerMessage::Decoded(result) => {
                let instance = result.instance;
                LoaderStats::bump(&self.stats.results_routed);

                match self.router.route(result) {
                    RouteOutcome::Pending => {}
                    RouteOutcome::Ready { scene_index, mut scene } => {
                        if !self.is_loading_instance(scene_index, instance) {
                            LoaderStats::bump(&self.stats.results_discarded);
                            return;
                        }
                        scene.stage.scale = self.entries[scene_index].scale;
                        info!(
                            "Scene {} ready: {} clips, {} frames",
                            scene_index,
                            scene.clips().len(),
                            scene.frame_count()
                        );
                        self.slots[scene_index] = SceneState::Ready(Box::new(scene));
                        self.pending_events.push(LoaderEvent::Ready(scene_index));
                    }
                    RouteOutcome::Failed { scene_index, error } => {
                        if self.is_loading_instance(scene_index, instance) {
                            self.fail(scene_index, error);
                        }
                    }
                    RouteOutcome::Discarded => {
                        LoaderStats::bump(&self.stats.results_discarded);
                    }
                }
            }
        }
    }

    fn is_loading_instance(&self, index: usize, instance: InstanceId) -> bool {
        matches!(self.slots.get(index), Some(SceneState::Loading(id)) if *id == instance)
    }

    fn start_decode(&mut self, instance: InstanceId, scene: usize, doc: AnimationDocument) {
        self.router.register(SceneAssembler::new(instance, scene, &doc.shape()));

        let total = doc.frame_count();
        for (clip, frames) in doc.clips.into_iter().enumerate() {
            for (frame, raw) in frames.into_iter().enumerate() {
                submit_decode(
                    &*self.pool,
                    DecodeJob { instance, clip, frame, raw },
                    self.sink.clone(),
                );
                LoaderStats::bump(&self.stats.jobs_submitted);
            }
        }
        debug!("Scene {} ({}): submitted {} decode jobs", scene, instance, total);
    }

    fn fail(&mut self, index: usize, e: LoadError) {
        error!("Scene {} failed to load: {}", index, e);
        if let SceneState::Loading(instance) = self.slots[index] {
            self.router.retire(instance);
        }
        self.slots[index] = SceneState::Failed(e.clone());
        self.pending_events.push(LoaderEvent::Failed(index, e));
    }
}
