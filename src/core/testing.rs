//! Test doubles: a hand-cranked pool and an in-memory fetcher

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::entities::{Fetch, Job, LoadError, WorkerPool};

/// Pool that queues jobs until the test runs them, in any order
#[derive(Default)]
pub struct ManualPool {
    jobs: Mutex<VecDeque<Job>>,
}

impl ManualPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    fn pop_front(&self) -> Option<Job> {
        self.jobs.lock().unwrap().pop_front()
    }

    fn pop_back(&self) -> Option<Job> {
        self.jobs.lock().unwrap().pop_back()
    }

    /// Run up to `n` queued jobs in submission order
    pub fn run_next(&self, n: usize) -> usize {
        let mut ran = 0;
        while ran < n {
            let Some(job) = self.pop_front() else { break };
            job();
            ran += 1;
        }
        ran
    }

    /// Run everything queued so far, oldest first
    pub fn run_all(&self) -> usize {
        let n = self.pending();
        self.run_next(n)
    }

    /// Run everything queued so far, newest first
    pub fn run_all_reversed(&self) -> usize {
        let n = self.pending();
        let mut ran = 0;
        while ran < n {
            let Some(job) = self.pop_back() else { break };
            job();
            ran += 1;
        }
        ran
    }
}

impl WorkerPool for ManualPool {
    fn execute(&self, job: Job) {
        self.jobs.lock().unwrap().push_back(job);
    }

    fn size(&self) -> usize {
        1
    }
}

/// Serves documents from a map and counts fetches
#[derive(Default)]
pub struct MemoryFetcher {
    docs: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new(docs: &[(&str, String)]) -> Self {
        Self {
            docs: docs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetch for MemoryFetcher {
    fn fetch(&self, locator: &str) -> Result<String, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.docs
            .get(locator)
            .cloned()
            .ok_or_else(|| LoadError::FetchFailed(format!("404: {}", locator)))
    }
}

/// Document with `shape[c]` frames per clip, each frame one chain of `points` vertices.
///
/// Vertex x encodes (clip, frame) so tests can check ordering.
pub fn doc_json(shape: &[usize], points: usize) -> String {
    let clips: Vec<String> = shape
        .iter()
        .enumerate()
        .map(|(c, &frames)| {
            let frames: Vec<String> = (0..frames)
                .map(|f| {
                    let pts: Vec<String> = (0..points)
                        .map(|p| format!("{{\"x\":{},\"y\":{},\"z\":0}}", c * 100 + f, p))
                        .collect();
                    format!("[[{}]]", pts.join(","))
                })
                .collect();
            format!("[{}]", frames.join(","))
        })
        .collect();
    format!("{{\"compData\":[{}]}}", clips.join(","))
}
