//! Player events: subscribe for immediate callbacks, poll for deferred handling
//!
//! `emit()` invokes subscribers synchronously and also queues the event, so a
//! host loop can drain everything that happened during `update()` with
//! `poll()`. The queue is bounded; the oldest half is evicted when full.

use log::warn;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

use crate::entities::LoadError;

/// Maximum events in queue before oldest are evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// Everything the orchestrator reports to its host
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Scene finished loading (prefetch or navigation)
    SceneReady { index: usize },
    /// Scene load failed; the slot stays failed
    SceneFailed { index: usize, error: LoadError },
    /// Focus moved; `from` is None for the first transition
    FocusChanged { from: Option<usize>, to: usize },
    /// advance() dropped because a transition was running
    AdvanceDropped { direction: i8 },
    /// Transition target failed to load; focus unchanged
    TransitionAborted { target: usize },
    PlaybackToggled { playing: bool },
}

type Callback = Arc<dyn Fn(&PlayerEvent) + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Callback>>>,
    queue: Arc<Mutex<VecDeque<PlayerEvent>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.read().map(|s| s.len()).unwrap_or(0))
            .field("queue_len", &self.queue_len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked on every `emit()`.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&PlayerEvent) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(callback));
    }

    pub fn emit(&self, event: PlayerEvent) {
        for cb in self.subscribers.read().unwrap_or_else(|e| e.into_inner()).iter() {
            cb(&event);
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict_count = queue.len() / 2;
            warn!("EventBus queue full ({} events), evicting oldest {}", queue.len(), evict_count);
            queue.drain(0..evict_count);
        }
        queue.push_back(event);
    }

    /// Take every event emitted since the last poll.
    pub fn poll(&self) -> Vec<PlayerEvent> {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Drop all subscribers and queued events
    pub fn clear(&self) {
        self.subscribers.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscribe_and_poll() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&seen);
        bus.subscribe(move |e| {
            if let PlayerEvent::SceneReady { index } = e {
                s.fetch_add(*index, Ordering::SeqCst);
            }
        });

        bus.emit(PlayerEvent::SceneReady { index: 3 });
        bus.emit(PlayerEvent::PlaybackToggled { playing: false });
        // Callback ran immediately
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        let events = bus.poll();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], PlayerEvent::SceneReady { index: 3 });
        assert!(bus.poll().is_empty());
    }

    #[test]
    fn test_queue_eviction() {
        let bus = EventBus::new();
        for i in 0..MAX_QUEUE_SIZE + 1 {
            bus.emit(PlayerEvent::SceneReady { index: i });
        }
        let events = bus.poll();
        assert_eq!(events.len(), MAX_QUEUE_SIZE / 2 + 1);
        assert_eq!(events.last(), Some(&PlayerEvent::SceneReady { index: MAX_QUEUE_SIZE }));
    }

    #[test]
    fn test_clones_share_queue() {
        let bus = EventBus::new();
        let handle = bus.clone();
        handle.emit(PlayerEvent::FocusChanged { from: None, to: 0 });
        assert_eq!(bus.queue_len(), 1);
        bus.clear();
        assert_eq!(handle.queue_len(), 0);
    }
}
