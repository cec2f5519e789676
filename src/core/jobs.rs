//! Worker job and result messages
//!
//! Jobs carry the (instance, clip, frame) key of the slot that issued them;
//! results carry it back. The single result sink is a crossbeam channel
//! drained by the loader on the orchestration thread.

use crossbeam::channel::Sender;
use log::{trace, warn};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{
    decode_frame, AnimationDocument, DecodedFrame, Fetch, LoadError, RawFrame, WorkerPool,
};

/// Identity of one load attempt of one scene slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable
        let s = self.0.simple().to_string();
        write!(f, "{}", &s[..8])
    }
}

/// One unit of decode work for exactly one raw frame
#[derive(Debug)]
pub struct DecodeJob {
    pub instance: InstanceId,
    pub clip: usize,
    pub frame: usize,
    pub raw: RawFrame,
}

/// Decode outcome routed back to the issuing assembler slot
#[derive(Debug)]
pub struct DecodeResult {
    pub instance: InstanceId,
    pub clip: usize,
    pub frame: usize,
    pub result: Result<DecodedFrame, LoadError>,
}

/// Everything a worker can send back to the orchestration thread
#[derive(Debug)]
pub enum WorkerMessage {
    /// Fetch + parse finished for a scene slot
    Fetched {
        instance: InstanceId,
        scene: usize,
        result: Result<AnimationDocument, LoadError>,
    },
    /// One frame decoded (or failed)
    Decoded(DecodeResult),
}

impl DecodeJob {
    /// Decode on the current thread.
    pub fn run(self) -> DecodeResult {
        let DecodeJob { instance, clip, frame, raw } = self;
        let result = decode_frame(&raw).map_err(|e| LoadError::DecodeFailed {
            clip,
            frame,
            reason: e.to_string(),
        });
        DecodeResult { instance, clip, frame, result }
    }
}

/// Queue a decode job; its result goes to `sink`.
pub fn submit_decode(pool: &dyn WorkerPool, job: DecodeJob, sink: Sender<WorkerMessage>) {
    pool.execute(Box::new(move || {
        let result = job.run();
        trace!(
            "Decoded {}:{}:{} ({})",
            result.instance,
            result.clip,
            result.frame,
            if result.result.is_ok() { "ok" } else { "error" }
        );
        if sink.send(WorkerMessage::Decoded(result)).is_err() {
            // Receiver gone: the loader was dropped, nothing to route to
            trace!("Result sink closed, dropping decode result");
        }
    }));
}

/// Queue fetch + parse of one scene document.
///
/// Fetch and parse errors become a rejection message; decode is skipped.
pub fn submit_fetch(
    pool: &dyn WorkerPool,
    fetcher: Arc<dyn Fetch>,
    instance: InstanceId,
    scene: usize,
    locator: String,
    sink: Sender<WorkerMessage>,
) {
    pool.execute(Box::new(move || {
        trace!("Fetching scene {} ({}) from {}", scene, instance, locator);
        let result = fetcher
            .fetch(&locator)
            .and_then(|body| AnimationDocument::parse(&body));
        if let Err(e) = &result {
            warn!("Scene {} load from {} failed: {}", scene, locator, e);
        }
        if sink.send(WorkerMessage::Fetched { instance, scene, result }).is_err() {
            trace!("Result sink closed, dropping fetch result");
        }
    }));
}
