//! Transition collaborator: interpolates stage vectors over time
//!
//! The orchestrator only asks for "move X from A to B over d with easing e"
//! and reacts to completion events. `Tweens` is the default implementation;
//! anything driving a real animation system can stand in via [`Tweener`].

use glam::Vec3;
use indexmap::IndexMap;
use log::trace;
use std::time::Duration;

/// Progress curves, `apply(t)` maps [0,1] -> [0,1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadraticIn,
    QuadraticOut,
    /// Overshooting spring, used to snap rotation back after a scrub
    ElasticOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadraticIn => t * t,
            Self::QuadraticOut => t * (2.0 - t),
            Self::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f32.powf(-10.0 * t) * ((t - 0.1) * 5.0 * std::f32::consts::PI).sin() + 1.0
                }
            }
        }
    }
}

/// What a tween moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenId {
    /// Stage position of scene `n`
    Stage(usize),
    /// Rotation snap of scene `n` (value in `x`)
    Snap(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenRequest {
    pub id: TweenId,
    pub from: Vec3,
    pub to: Vec3,
    pub duration: Duration,
    pub easing: Easing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenEvent {
    Update { id: TweenId, value: Vec3 },
    /// Final value, emitted exactly once per started tween
    Complete { id: TweenId, value: Vec3 },
}

impl TweenEvent {
    pub fn id(&self) -> TweenId {
        match self {
            TweenEvent::Update { id, .. } | TweenEvent::Complete { id, .. } => *id,
        }
    }

    pub fn value(&self) -> Vec3 {
        match self {
            TweenEvent::Update { value, .. } | TweenEvent::Complete { value, .. } => *value,
        }
    }
}

/// Tween engine seam
pub trait Tweener: Send {
    /// Start a tween; one already running with the same id is replaced silently.
    fn start(&mut self, request: TweenRequest);
    /// Stop without a completion event. Returns false if nothing was running.
    fn cancel(&mut self, id: TweenId) -> bool;
    fn is_active(&self, id: TweenId) -> bool;
    /// Move every running tween forward by `dt`.
    fn advance(&mut self, dt: Duration) -> Vec<TweenEvent>;
}

#[derive(Debug)]
struct Running {
    request: TweenRequest,
    elapsed: Duration,
}

/// Default in-process tween engine
#[derive(Debug, Default)]
pub struct Tweens {
    running: IndexMap<TweenId, Running>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

impl Tweener for Tweens {
    fn start(&mut self, request: TweenRequest) {
        trace!("Tween {:?}: {} -> {} over {:?}", request.id, request.from, request.to, request.duration);
        self.running.shift_remove(&request.id);
        self.running.insert(
            request.id,
            Running {
                request,
                elapsed: Duration::ZERO,
            },
        );
    }

    fn cancel(&mut self, id: TweenId) -> bool {
        self.running.shift_remove(&id).is_some()
    }

    fn is_active(&self, id: TweenId) -> bool {
        self.running.contains_key(&id)
    }

    fn advance(&mut self, dt: Duration) -> Vec<TweenEvent> {
        let mut events = Vec::with_capacity(self.running.len());

        self.running.retain(|id, tween| {
            tween.elapsed += dt;
            let req = &tween.request;
            let t = if req.duration.is_zero() {
                1.0
            } else {
                tween.elapsed.as_secs_f32() / req.duration.as_secs_f32()
            };

            if t >= 1.0 {
                events.push(TweenEvent::Complete { id: *id, value: req.to });
                false
            } else {
                let value = req.from.lerp(req.to, req.easing.apply(t));
                events.push(TweenEvent::Update { id: *id, value });
                true
            }
        });

        events
    }
}
