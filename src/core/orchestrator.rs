//! Scene orchestration: focus, transitions, prefetch and playback cadence
//!
//! **Why**: Only one scene is onstage at a time. Moving to the next or
//! previous scene waits for that scene to load, swaps stage positions with
//! tweens, and warms up the neighbours so the following move is instant.
//!
//! **Used by**: runner (headless loop), any host driving `update()`
//!
//! # State machine
//!
//! ```text
//! idle --advance--> transitioning(target) --target ready--> idle
//!   ^                    |   \--target failed--> idle (focus unchanged)
//!   |                    \--advance while here: dropped
//! ```
//!
//! # Update loop
//!
//! `update(dt)` is called by the host at display rate. Each call:
//! 1. Drains loader results (scene ready/failed)
//! 2. Completes a pending transition if its target settled
//! 3. Advances stage tweens; completions trigger neighbour prefetch
//! 4. Ticks the focused scene once per `1/fps` while playing, plus the scene
//!    still leaving the stage
//! 5. Applies auto-rotate and the auto-advance timer

use log::{debug, error, info, trace, warn};
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use super::events::{EventBus, PlayerEvent};
use super::loader::{LoaderEvent, SceneLoader, SceneState};
use super::tween::{Easing, TweenEvent, TweenId, TweenRequest, Tweener, Tweens};
use crate::config::PlayerConfig;
use crate::entities::{Fetch, Scene, SceneEntry, WorkerPool};

/// Rotation snap duration after a scrub is released
const SNAP_TIME: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dest {
    On,
    Off,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    target: usize,
    direction: i8,
}

/// Bookkeeping for one running stage tween
#[derive(Debug, Clone, Copy)]
struct Move {
    dest: Dest,
    moved_unfocused: bool,
}

pub struct Orchestrator {
    config: PlayerConfig,
    loader: SceneLoader,
    tweener: Box<dyn Tweener>,
    events: EventBus,
    focused: Option<usize>,
    transition: Option<Transition>,
    moves: HashMap<usize, Move>,
    needs_tick: Option<usize>,
    playing: bool,
    immersive: bool,
    scrubbing: bool,
    scrub_acc: f32,
    frame_clock: Duration,
    timer_clock: Duration,
    disposed: bool,
}

impl Orchestrator {
    pub fn new(
        entries: Vec<SceneEntry>,
        pool: Arc<dyn WorkerPool>,
        fetcher: Arc<dyn Fetch>,
        config: PlayerConfig,
    ) -> Self {
        Self::with_tweener(entries, pool, fetcher, config, Box::new(Tweens::new()))
    }

    pub fn with_tweener(
        entries: Vec<SceneEntry>,
        pool: Arc<dyn WorkerPool>,
        fetcher: Arc<dyn Fetch>,
        config: PlayerConfig,
        tweener: Box<dyn Tweener>,
    ) -> Self {
        info!("Orchestrator: {} scenes at {} fps", entries.len(), config.fps);
        Self {
            playing: config.auto_play,
            config,
            loader: SceneLoader::new(entries, pool, fetcher),
            tweener,
            events: EventBus::new(),
            focused: None,
            transition: None,
            moves: HashMap::new(),
            needs_tick: None,
            immersive: false,
            scrubbing: false,
            scrub_acc: 0.0,
            frame_clock: Duration::ZERO,
            timer_clock: Duration::ZERO,
            disposed: false,
        }
    }

    // ========== Accessors ==========

    pub fn len(&self) -> usize {
        self.loader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loader.is_empty()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn focused_scene(&self) -> Option<&Scene> {
        self.loader.scene(self.focused?)
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.loader.scene(index)
    }

    pub fn state(&self, index: usize) -> Option<&SceneState> {
        self.loader.state(index)
    }

    pub fn loader(&self) -> &SceneLoader {
        &self.loader
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Scene ticked alongside the focused one while its move runs
    pub fn needs_tick(&self) -> Option<usize> {
        self.needs_tick
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_immersive(&self) -> bool {
        self.immersive
    }

    // ========== Navigation ==========

    /// Show the first scene (no-op once anything has focus).
    pub fn start(&mut self) -> bool {
        if self.focused.is_some() || self.transition.is_some() {
            return false;
        }
        self.advance(1)
    }

    pub fn show_next(&mut self) -> bool {
        self.advance(1)
    }

    pub fn show_prev(&mut self) -> bool {
        self.advance(-1)
    }

    /// Start a transition to the next (`direction > 0`) or previous scene.
    ///
    /// Returns false if dropped: disposed, empty, or already transitioning.
    pub fn advance(&mut self, direction: i8) -> bool {
        if self.disposed || self.is_empty() {
            return false;
        }
        if let Some(t) = self.transition {
            debug!("advance({}) dropped: transition to {} in progress", direction, t.target);
            self.events.emit(PlayerEvent::AdvanceDropped { direction });
            return false;
        }

        let target = match (self.focused, direction > 0) {
            (None, true) => 0,
            (None, false) => self.len() - 1,
            (Some(f), true) => self.next_index(f),
            (Some(f), false) => self.prev_index(f),
        };
        debug!("Transition {:?} -> {}", self.focused, target);

        self.loader.request(target);
        self.transition = Some(Transition { target, direction });
        self.try_finish_transition();
        true
    }

    fn next_index(&self, n: usize) -> usize {
        if n + 1 >= self.len() { 0 } else { n + 1 }
    }

    fn prev_index(&self, n: usize) -> usize {
        if n == 0 { self.len() - 1 } else { n - 1 }
    }

    fn try_finish_transition(&mut self) {
        let Some(t) = self.transition else {
            return;
        };

        match self.loader.state(t.target) {
            Some(SceneState::Ready(_)) => self.finish_transition(t),
            Some(SceneState::Failed(e)) => {
                error!("Cannot show scene {}: {}", t.target, e);
                self.transition = None;
                self.events.emit(PlayerEvent::TransitionAborted { target: t.target });
            }
            _ => trace!("Waiting for scene {}", t.target),
        }
    }

    fn finish_transition(&mut self, t: Transition) {
        if t.direction < 0 {
            let offstage = self.config.offstage();
            if let Some(scene) = self.loader.scene_mut(t.target) {
                scene.stage.position = offstage;
            }
        }

        // Focus moves first so the outgoing scene counts as unfocused
        let from = self.focused.replace(t.target);
        if let Some(old) = from {
            self.move_scene(old, Dest::Off);
        }
        self.move_scene(t.target, Dest::On);

        self.transition = None;
        info!("Focus {:?} -> {}", from, t.target);
        self.events.emit(PlayerEvent::FocusChanged { from, to: t.target });
    }

    fn move_scene(&mut self, n: usize, dest: Dest) {
        let (to, easing) = match dest {
            Dest::On => (self.config.onstage(self.immersive), Easing::QuadraticOut),
            Dest::Off => (self.config.offstage(), Easing::QuadraticIn),
        };
        let Some(scene) = self.loader.scene(n) else {
            return;
        };
        let from = scene.stage.position;

        let moved_unfocused = self.focused != Some(n);
        if moved_unfocused {
            self.needs_tick = Some(n);
        }

        self.tweener.start(TweenRequest {
            id: TweenId::Stage(n),
            from,
            to,
            duration: self.config.entrance_time(),
            easing,
        });
        self.moves.insert(n, Move { dest, moved_unfocused });
    }

    fn on_move_complete(&mut self, n: usize) {
        let Some(mv) = self.moves.remove(&n) else {
            return;
        };

        if mv.dest == Dest::Off {
            self.tweener.cancel(TweenId::Snap(n));
            if let Some(scene) = self.loader.scene_mut(n) {
                scene.stage.rotation_y = 0.0;
            }
        }

        let next = self.next_index(n);
        self.loader.request(next);
        self.loader.request(self.prev_index(n));
        if n == 0 {
            self.loader.request(self.next_index(next));
        }

        if mv.moved_unfocused && self.needs_tick == Some(n) {
            self.needs_tick = None;
        }
    }

    // ========== Update loop ==========

    /// Advance everything by `dt`. Call at display rate.
    pub fn update(&mut self, dt: Duration) {
        if self.disposed {
            return;
        }

        self.pump_loader();
        self.try_finish_transition();
        self.advance_tweens(dt);

        let Some(focused) = self.focused else {
            return;
        };

        if self.playing && !(self.config.spin_scrub && self.scrubbing) {
            self.frame_clock += dt;
            if self.frame_clock >= self.config.frame_interval() {
                self.frame_clock = Duration::ZERO;
                self.tick_playing(focused);
            }
        }

        if self.config.auto_rotate && !self.scrubbing {
            let speed = self.config.auto_rotate_speed;
            if let Some(scene) = self.loader.scene_mut(focused) {
                scene.stage.rotation_y += speed;
            }
        }

        // Holding the pointer pauses auto-advance only in immersive mode
        let held = self.immersive && self.scrubbing;
        if (self.config.timer_mode || self.immersive) && !held {
            self.timer_clock += dt;
            if self.timer_clock >= self.config.timer_interval() {
                self.timer_clock = Duration::ZERO;
                trace!("Timer: auto-advance");
                self.show_next();
            }
        }
    }

    fn pump_loader(&mut self) {
        let offstage = self.config.offstage();
        for event in self.loader.pump() {
            match event {
                LoaderEvent::Ready(index) => {
                    if let Some(scene) = self.loader.scene_mut(index) {
                        scene.stage.position = offstage;
                    }
                    self.events.emit(PlayerEvent::SceneReady { index });
                }
                LoaderEvent::Failed(index, error) => {
                    self.events.emit(PlayerEvent::SceneFailed { index, error });
                }
            }
        }
    }

    fn advance_tweens(&mut self, dt: Duration) {
        for event in self.tweener.advance(dt) {
            let value = event.value();
            match event.id() {
                TweenId::Stage(n) => {
                    if let Some(scene) = self.loader.scene_mut(n) {
                        scene.stage.position = value;
                    }
                    if let TweenEvent::Complete { .. } = event {
                        self.on_move_complete(n);
                    }
                }
                TweenId::Snap(n) => {
                    if let Some(scene) = self.loader.scene_mut(n) {
                        scene.stage.rotation_y = value.x;
                    }
                }
            }
        }
    }

    /// One playback tick: focused scene plus the `needs_tick` scene, once each
    fn tick_playing(&mut self, focused: usize) {
        if let Some(scene) = self.loader.scene_mut(focused) {
            scene.tick(1);
        }
        if let Some(extra) = self.needs_tick.filter(|&n| n != focused) {
            if let Some(scene) = self.loader.scene_mut(extra) {
                scene.tick(1);
            }
        }
    }

    // ========== Playback controls ==========

    pub fn play(&mut self) {
        self.set_playing(true);
    }

    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    pub fn toggle_play(&mut self) {
        self.set_playing(!self.playing);
    }

    fn set_playing(&mut self, playing: bool) {
        if self.playing != playing {
            self.playing = playing;
            self.frame_clock = Duration::ZERO;
            debug!("Playback {}", if playing { "started" } else { "paused" });
            self.events.emit(PlayerEvent::PlaybackToggled { playing });
        }
    }

    /// Change the playback rate; non-positive values are ignored.
    pub fn set_fps(&mut self, fps: f32) {
        if fps.is_finite() && fps > 0.0 {
            self.config.fps = fps;
        } else {
            warn!("Ignoring invalid fps {}", fps);
        }
    }

    /// Step the focused scene by `n` frames (negative steps back).
    pub fn step(&mut self, n: i64) {
        if let Some(scene) = self.focused.and_then(|f| self.loader.scene_mut(f)) {
            scene.tick(n);
        }
    }

    /// Jump the focused scene to `percent` of each clip.
    pub fn seek(&mut self, percent: f64) {
        if let Some(scene) = self.focused.and_then(|f| self.loader.scene_mut(f)) {
            scene.set_frame(percent);
        }
    }

    // ========== Scrub / rotation ==========

    /// Press or release a scrub gesture.
    ///
    /// Release resets the accumulator and snaps rotation to a whole turn.
    pub fn set_scrubbing(&mut self, scrubbing: bool) {
        if self.scrubbing == scrubbing {
            return;
        }
        self.scrubbing = scrubbing;

        let Some(focused) = self.focused else {
            self.scrub_acc = 0.0;
            return;
        };
        if scrubbing {
            self.tweener.cancel(TweenId::Snap(focused));
            return;
        }

        self.scrub_acc = 0.0;
        let Some(y) = self.loader.scene(focused).map(|s| s.stage.rotation_y) else {
            return;
        };
        let sign = if y <= 0.0 { -1.0 } else { 1.0 };
        let target = (y.abs() / TAU).floor() * TAU * sign;
        self.tweener.start(TweenRequest {
            id: TweenId::Snap(focused),
            from: glam::Vec3::new(y, 0.0, 0.0),
            to: glam::Vec3::new(target, 0.0, 0.0),
            duration: SNAP_TIME,
            easing: Easing::ElasticOut,
        });
    }

    /// Horizontal drag of `delta` units on a surface `width` units wide.
    ///
    /// Rotates the focused scene; with spin-scrub, every accumulated
    /// `scrub_threshold` steps one frame in the drag direction.
    pub fn scrub(&mut self, delta: f32, width: f32) {
        let Some(focused) = self.focused else {
            return;
        };
        let threshold = self.config.scrub_threshold;
        let spin_scrub = self.config.spin_scrub;
        let Some(scene) = self.loader.scene_mut(focused) else {
            return;
        };

        if width > 0.0 {
            scene.stage.rotation_y += delta / width * -TAU;
        }

        self.scrub_acc += delta;
        if spin_scrub && self.scrub_acc.abs() > threshold {
            scene.tick(if self.scrub_acc > 0.0 { 1 } else { -1 });
            self.scrub_acc = 0.0;
        }
    }

    // ========== Immersive / timer ==========

    /// Enter or leave immersive (VR) viewing.
    ///
    /// The focused scene jumps to the matching onstage distance; the
    /// auto-advance timer runs while immersive.
    pub fn set_immersive(&mut self, immersive: bool) {
        if self.immersive == immersive {
            return;
        }
        self.immersive = immersive;
        self.timer_clock = Duration::ZERO;

        let onstage = self.config.onstage(immersive);
        if let Some(scene) = self.focused.and_then(|f| self.loader.scene_mut(f)) {
            scene.stage.position.z = onstage.z;
        }
        info!("Immersive mode {}", if immersive { "on" } else { "off" });
    }

    pub fn set_timer_mode(&mut self, enabled: bool) {
        self.config.timer_mode = enabled;
        self.timer_clock = Duration::ZERO;
    }

    // ========== Teardown ==========

    /// Stop routing results, cancel tweens and drop every scene.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for n in self.moves.drain().map(|(n, _)| n) {
            self.tweener.cancel(TweenId::Stage(n));
        }
        for n in 0..self.len() {
            self.tweener.cancel(TweenId::Snap(n));
        }
        self.loader.dispose();
        self.focused = None;
        self.transition = None;
        self.needs_tick = None;
        self.disposed = true;
        info!("Orchestrator disposed");
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{doc_json, ManualPool, MemoryFetcher};

    const ENTRANCE: Duration = Duration::from_millis(1200);

    fn setup(scenes: usize, missing: &[usize], config: PlayerConfig) -> (Orchestrator, Arc<ManualPool>) {
        let docs: Vec<(String, String)> = (0..scenes)
            .filter(|i| !missing.contains(i))
            .map(|i| (format!("s{}.json", i), doc_json(&[3, 2], 2)))
            .collect();
        let docs: Vec<(&str, String)> = docs.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();

        let pool = Arc::new(ManualPool::new());
        let fetcher = Arc::new(MemoryFetcher::new(&docs));
        let entries = (0..scenes).map(|i| SceneEntry::new(format!("s{}.json", i))).collect();
        (Orchestrator::new(entries, pool.clone(), fetcher, config), pool)
    }

    fn quiet() -> PlayerConfig {
        PlayerConfig {
            auto_play: false,
            auto_rotate: false,
            ..Default::default()
        }
    }

    /// Run queued work until the pool is idle
    fn settle(orch: &mut Orchestrator, pool: &ManualPool) {
        loop {
            orch.update(Duration::ZERO);
            if pool.run_all() == 0 {
                break;
            }
        }
        orch.update(Duration::ZERO);
    }

    /// Test: First transition
    /// Validates: focus none -> 0 after load, onstage tween, neighbour prefetch
    #[test]
    fn test_start_focuses_first_scene_and_prefetches() {
        let (mut orch, pool) = setup(4, &[], quiet());
        assert!(orch.start());
        assert!(orch.is_transitioning());
        assert_eq!(orch.focused(), None);

        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(0));
        assert!(!orch.is_transitioning());
        assert_eq!(orch.needs_tick(), None);
        assert!(orch.events().poll().contains(&PlayerEvent::FocusChanged { from: None, to: 0 }));

        // Not yet requested: neighbours wait for the move to finish
        assert!(matches!(orch.state(1), Some(SceneState::NotStarted)));

        orch.update(ENTRANCE);
        assert_eq!(orch.scene(0).unwrap().stage.position, orch.config().onstage(false));
        assert_eq!(orch.needs_tick(), None);
        for n in [1, 2, 3] {
            assert!(orch.state(n).unwrap().is_loading(), "scene {} not prefetched", n);
        }

        assert!(!orch.start());
    }

    /// Test: Transition lock
    /// Validates: advance while transitioning is dropped, not queued
    #[test]
    fn test_advance_dropped_while_transitioning() {
        let (mut orch, pool) = setup(3, &[], quiet());
        orch.start();
        settle(&mut orch, &pool);
        orch.events().poll();

        assert!(orch.show_next());
        assert!(orch.is_transitioning());
        assert!(!orch.show_next());
        assert!(!orch.show_prev());

        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(1));
        let events = orch.events().poll();
        assert_eq!(
            events.iter().filter(|e| matches!(e, PlayerEvent::AdvanceDropped { .. })).count(),
            2
        );
        assert_eq!(
            events.iter().filter(|e| matches!(e, PlayerEvent::FocusChanged { .. })).count(),
            1
        );
    }

    /// Test: Failed target
    /// Validates: logged + event, unlocked, focus kept, no retry
    #[test]
    fn test_failed_target_keeps_focus() {
        let (mut orch, pool) = setup(3, &[1], quiet());
        orch.start();
        settle(&mut orch, &pool);

        orch.show_next();
        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(0));
        assert!(!orch.is_transitioning());

        let events = orch.events().poll();
        assert!(events.iter().any(|e| matches!(e, PlayerEvent::SceneFailed { index: 1, .. })));
        assert!(events.contains(&PlayerEvent::TransitionAborted { target: 1 }));

        // Unlocked: previous still works
        assert!(orch.show_prev());
        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(2));
        assert_eq!(orch.loader().stats().fetches(), 3);
    }

    #[test]
    fn test_prev_from_none_wraps_to_last() {
        let (mut orch, pool) = setup(3, &[], quiet());
        orch.show_prev();
        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(2));
    }

    /// Test: Reverse snap
    /// Validates: previous scene is placed offstage before it tweens back in
    #[test]
    fn test_reverse_snaps_target_offstage() {
        let (mut orch, pool) = setup(3, &[], quiet());
        orch.start();
        settle(&mut orch, &pool);
        orch.update(ENTRANCE);
        settle(&mut orch, &pool);

        orch.show_next();
        orch.update(ENTRANCE / 2);
        let midway = orch.scene(0).unwrap().stage.position;
        assert_ne!(midway, orch.config().offstage());

        orch.show_prev();
        assert_eq!(orch.focused(), Some(0));
        assert_eq!(orch.scene(0).unwrap().stage.position, orch.config().offstage());

        orch.update(ENTRANCE);
        assert_eq!(orch.scene(0).unwrap().stage.position, orch.config().onstage(false));
        assert_eq!(orch.scene(1).unwrap().stage.position, orch.config().offstage());
    }

    /// Test: Playback cadence
    /// Validates: one tick per 1/fps, needs_tick scene never ticked twice
    #[test]
    fn test_playback_ticks_at_fps() {
        let config = PlayerConfig { fps: 10.0, ..quiet() };
        let (mut orch, pool) = setup(2, &[], config);
        orch.start();
        settle(&mut orch, &pool);
        orch.play();
        assert_eq!(orch.needs_tick(), None);

        orch.update(Duration::from_millis(50));
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[0, 0]);
        orch.update(Duration::from_millis(50));
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[1, 1]);
        orch.update(Duration::from_millis(100));
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[2, 0]);

        orch.pause();
        orch.update(Duration::from_secs(1));
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[2, 0]);
    }

    /// Test: Outgoing scene keeps playing
    /// Validates: scene leaving the stage is ticked with the focused one,
    /// once per tick, until its exit move completes
    #[test]
    fn test_outgoing_scene_ticks_during_exit() {
        let config = PlayerConfig { fps: 10.0, ..quiet() };
        let (mut orch, pool) = setup(3, &[], config);
        orch.start();
        settle(&mut orch, &pool);
        orch.update(ENTRANCE);
        settle(&mut orch, &pool);
        assert!(orch.state(1).unwrap().is_ready());

        orch.play();
        assert!(orch.show_next());
        assert_eq!(orch.focused(), Some(1));
        assert_eq!(orch.needs_tick(), Some(0));

        orch.update(Duration::from_millis(100));
        assert_eq!(orch.scene(0).unwrap().frame_indices(), &[1, 1]);
        assert_eq!(orch.scene(1).unwrap().frame_indices(), &[1, 1]);

        orch.update(Duration::from_millis(100));
        assert_eq!(orch.scene(0).unwrap().frame_indices(), &[2, 0]);
        assert_eq!(orch.scene(1).unwrap().frame_indices(), &[2, 0]);

        // Exit move completes before this tick: only the focused scene moves
        orch.update(ENTRANCE);
        assert_eq!(orch.needs_tick(), None);
        assert_eq!(orch.scene(0).unwrap().frame_indices(), &[2, 0]);
        assert_eq!(orch.scene(1).unwrap().frame_indices(), &[0, 1]);

        orch.update(Duration::from_millis(100));
        assert_eq!(orch.scene(0).unwrap().frame_indices(), &[2, 0]);
    }

    #[test]
    fn test_step_and_seek() {
        let (mut orch, pool) = setup(1, &[], quiet());
        orch.step(1); // nothing focused: no-op
        orch.start();
        settle(&mut orch, &pool);

        orch.step(-1);
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[2, 1]);
        orch.seek(0.5);
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[1, 0]);
        orch.seek(7.0);
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[2, 1]);
    }

    #[test]
    fn test_timer_mode_auto_advances() {
        let config = PlayerConfig {
            timer_mode: true,
            timer_interval_ms: 1000,
            ..quiet()
        };
        let (mut orch, pool) = setup(3, &[], config);
        orch.start();
        settle(&mut orch, &pool);
        orch.update(ENTRANCE);
        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(1));

        orch.set_timer_mode(false);
        orch.update(Duration::from_secs(5));
        assert_eq!(orch.focused(), Some(1));
    }

    /// Test: Timer vs scrubbing
    /// Validates: a held scrub pauses auto-advance only when immersive
    #[test]
    fn test_timer_runs_while_scrubbing_unless_immersive() {
        let config = PlayerConfig {
            timer_mode: true,
            timer_interval_ms: 1000,
            ..quiet()
        };
        let (mut orch, pool) = setup(3, &[], config);
        orch.start();
        settle(&mut orch, &pool);
        orch.update(ENTRANCE / 2);
        settle(&mut orch, &pool);

        orch.set_scrubbing(true);
        orch.update(ENTRANCE / 2);
        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(1));

        orch.set_immersive(true);
        orch.update(Duration::from_secs(5));
        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(1));

        orch.set_scrubbing(false);
        orch.update(Duration::from_millis(1000));
        settle(&mut orch, &pool);
        assert_eq!(orch.focused(), Some(2));
    }

    /// Test: Spin scrub
    /// Validates: threshold crossing steps one frame, release snaps rotation
    #[test]
    fn test_scrub_steps_and_snaps() {
        let config = PlayerConfig { auto_play: true, ..quiet() };
        let (mut orch, pool) = setup(1, &[], config);
        orch.start();
        settle(&mut orch, &pool);

        orch.set_scrubbing(true);
        orch.scrub(10.0, 1000.0);
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[0, 0]);
        assert!(orch.focused_scene().unwrap().stage.rotation_y < 0.0);
        orch.scrub(20.0, 1000.0);
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[1, 1]);
        orch.scrub(-30.0, 1000.0);
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[0, 0]);
        orch.scrub(-5.0, 1000.0);
        assert!(orch.focused_scene().unwrap().stage.rotation_y > 0.0);

        // Spin scrub holds playback
        orch.update(Duration::from_secs(1));
        assert_eq!(orch.focused_scene().unwrap().frame_indices(), &[0, 0]);

        orch.set_scrubbing(false);
        orch.update(SNAP_TIME);
        assert_eq!(orch.focused_scene().unwrap().stage.rotation_y, 0.0);
    }

    /// Test: Snap follows its scene
    /// Validates: a snap started on one scene never rotates the next focused one
    #[test]
    fn test_snap_stays_on_scrubbed_scene() {
        let (mut orch, pool) = setup(3, &[], quiet());
        orch.start();
        settle(&mut orch, &pool);
        orch.update(ENTRANCE);
        settle(&mut orch, &pool);

        orch.set_scrubbing(true);
        orch.scrub(-700.0, 1000.0);
        orch.set_scrubbing(false);
        orch.update(Duration::from_millis(100));
        assert!(orch.scene(0).unwrap().stage.rotation_y != 0.0);

        assert!(orch.show_next());
        orch.update(Duration::from_millis(100));
        assert_eq!(orch.scene(1).unwrap().stage.rotation_y, 0.0);
        assert!(orch.scene(0).unwrap().stage.rotation_y != 0.0);

        // Offstage arrival stops the snap and resets rotation
        orch.update(ENTRANCE);
        orch.update(Duration::from_millis(100));
        assert_eq!(orch.scene(0).unwrap().stage.rotation_y, 0.0);
        assert_eq!(orch.scene(1).unwrap().stage.rotation_y, 0.0);
    }

    #[test]
    fn test_immersive_moves_focused_scene() {
        let (mut orch, pool) = setup(1, &[], quiet());
        orch.start();
        settle(&mut orch, &pool);
        orch.update(ENTRANCE);

        orch.set_immersive(true);
        let z = orch.focused_scene().unwrap().stage.position.z;
        assert!((z - orch.config().onstage(true).z).abs() < 1e-6);

        orch.set_immersive(false);
        let z = orch.focused_scene().unwrap().stage.position.z;
        assert!((z - orch.config().onstage(false).z).abs() < 1e-6);
    }

    #[test]
    fn test_play_pause_events() {
        let (orch_parts, _pool) = setup(1, &[], quiet());
        let mut orch = orch_parts;
        orch.toggle_play();
        orch.play();
        orch.pause();
        let events = orch.events().poll();
        assert_eq!(
            events,
            vec![
                PlayerEvent::PlaybackToggled { playing: true },
                PlayerEvent::PlaybackToggled { playing: false },
            ]
        );

        orch.set_fps(-1.0);
        assert_eq!(orch.config().fps, 30.0);
        orch.set_fps(12.0);
        assert_eq!(orch.config().fps, 12.0);
    }

    /// Test: Dispose
    /// Validates: late worker results are no-ops, navigation stops
    #[test]
    fn test_dispose_ignores_late_results() {
        let (mut orch, pool) = setup(2, &[], quiet());
        orch.start();
        orch.update(Duration::ZERO);
        pool.run_all(); // fetch
        orch.update(Duration::ZERO);

        orch.dispose();
        pool.run_all(); // decode results for a retired instance
        orch.update(Duration::ZERO);

        assert_eq!(orch.focused(), None);
        assert!(!orch.show_next());
        assert!(matches!(orch.state(0), Some(SceneState::NotStarted)));
    }
}
