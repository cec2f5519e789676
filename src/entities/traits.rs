//! Abstract traits for dependency inversion.
//!
//! These traits define interfaces the loader needs from infrastructure,
//! so `core` can hand in real threads and real I/O while tests hand in
//! deterministic fakes.
//!
//! Implementations live in `core/` module.

use std::sync::Arc;

use super::error::LoadError;

/// Unit of background work
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Abstract worker pool interface.
///
/// Every executed job runs exactly once on exactly one executor.
/// No ordering guarantee between jobs.
pub trait WorkerPool: Send + Sync {
    /// Queue a job on the next executor.
    fn execute(&self, job: Job);

    /// Number of executors
    fn size(&self) -> usize;
}

/// Abstract raw-data source.
///
/// Called from worker threads. Network and I/O failures map to
/// `LoadError::FetchFailed`; timeouts are the implementation's business.
pub trait Fetch: Send + Sync {
    /// Retrieve the document body behind `locator`.
    fn fetch(&self, locator: &str) -> Result<String, LoadError>;
}

/// Blanket impl: Arc<T> implements traits if T does
impl<T: WorkerPool + ?Sized> WorkerPool for Arc<T> {
    fn execute(&self, job: Job) {
        (**self).execute(job)
    }

    fn size(&self) -> usize {
        (**self).size()
    }
}

impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    fn fetch(&self, locator: &str) -> Result<String, LoadError> {
        (**self).fetch(locator)
    }
}
