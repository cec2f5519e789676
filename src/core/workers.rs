//! Fixed-size decode thread pool with round-robin dispatch
//!
//! Each executor owns its own crossbeam channel. Submissions go to executor
//! `counter % N`, where the counter lives in an explicit [`Dispatcher`] rather
//! than in shared mutable state scattered across callers.
//!
//! Jobs are independent closures; executors share nothing, so no locking
//! happens inside the pool.

use crossbeam::channel::{unbounded, Sender};
use log::{debug, error, trace};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::entities::{Job, WorkerPool};

/// Round-robin executor selection.
///
/// `next_executor_index()` returns 0, 1, .., size-1, 0, 1, .. in call order.
#[derive(Debug)]
pub struct Dispatcher {
    size: usize,
    counter: AtomicUsize,
}

impl Dispatcher {
    /// Create dispatcher over `size` executors (minimum 1)
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Index of the executor that receives the next submission
    pub fn next_executor_index(&self) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed) % self.size
    }

    /// Total submissions dispatched so far
    pub fn dispatched(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

/// Default pool size: available hardware parallelism minus one, at least one.
///
/// One core stays free for the orchestration thread.
pub fn default_pool_size() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Decode worker pool.
///
/// # Example
/// ```no_run
/// use lineplay::core::Workers;
/// use lineplay::entities::WorkerPool;
///
/// let workers = Workers::new(3).unwrap();
/// workers.execute(Box::new(|| {
///     // runs on lineplay-worker-N
/// }));
/// ```
pub struct Workers {
    senders: Vec<Sender<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    dispatcher: Dispatcher,
}

impl Workers {
    /// Spawn `num_threads` executors (minimum 1).
    pub fn new(num_threads: usize) -> io::Result<Self> {
        let num_threads = num_threads.max(1);
        let mut senders = Vec::with_capacity(num_threads);
        let mut handles = Vec::with_capacity(num_threads);

        for worker_id in 0..num_threads {
            let (tx, rx) = unbounded::<Job>();

            let handle = thread::Builder::new()
                .name(format!("lineplay-worker-{}", worker_id))
                .spawn(move || {
                    trace!("Worker {} started", worker_id);

                    // Execute jobs until the sender side is dropped
                    while let Ok(job) = rx.recv() {
                        job();
                    }

                    trace!("Worker {} stopped", worker_id);
                })?;

            senders.push(tx);
            handles.push(handle);
        }

        debug!("Workers initialized: {} threads (round-robin)", num_threads);

        Ok(Self {
            senders,
            handles,
            dispatcher: Dispatcher::new(num_threads),
        })
    }

    /// Pool sized by [`default_pool_size`]
    pub fn with_default_size() -> io::Result<Self> {
        Self::new(default_pool_size())
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl WorkerPool for Workers {
    fn execute(&self, job: Job) {
        let index = self.dispatcher.next_executor_index();
        if let Err(e) = self.senders[index].send(job) {
            // Only possible if the executor thread panicked
            error!("Failed to enqueue job on worker {}: {}", index, e);
        }
    }

    fn size(&self) -> usize {
        self.senders.len()
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);

        // Closing the channels lets executors drain their queue and exit
        self.senders.clear();

        let deadline = Instant::now() + Duration::from_millis(500);
        for handle in std::mem::take(&mut self.handles) {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, detaching remaining workers");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {} workers stopped", num_threads);
    }
}
