//! Worker pool and affinity thread
//!
//! Jobs are boxed closures pulled from a shared crossbeam channel by a fixed
//! set of named threads. Each job reports back over its own one-shot
//! channel, so a caller blocks only on the jobs it spawned. A panicking job
//! is caught on the worker and surfaces as [`JobError::Panicked`] to its
//! joiner; the worker keeps running.
//!
//! The [`AffinityThread`] is a pool of exactly one thread, for work that
//! must always run on the same thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Failure to run a job to completion
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The job panicked
    #[error("Job panicked: {0}")]
    Panicked(String),

    /// The pool shut down before the job produced a result
    #[error("Worker pool disconnected")]
    Disconnected,

    /// A worker thread could not be started
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Handle to a spawned job's result
pub struct JobHandle<R> {
    result: Receiver<thread::Result<R>>,
}

impl<R> JobHandle<R> {
    /// Block until the job finishes
    pub fn join(self) -> Result<R, JobError> {
        match self.result.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(JobError::Panicked(panic_message(payload.as_ref()))),
            Err(_) => Err(JobError::Disconnected),
        }
    }
}

/// Fixed-size pool of named worker threads
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` workers named `hostprint-worker-{id}` (at least one)
    pub fn new(size: usize) -> Result<Self, JobError> {
        let names = (0..size.max(1)).map(|id| format!("hostprint-worker-{}", id));
        Self::with_names(names)
    }

    fn with_names(names: impl IntoIterator<Item = String>) -> Result<Self, JobError> {
        let (sender, receiver) = channel::unbounded::<Job>();
        let mut workers = Vec::new();
        for name in names {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(name)
                .spawn(move || Self::run_loop(receiver))?;
            workers.push(handle);
        }
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Worker main loop: runs until every sender is dropped
    fn run_loop(receiver: Receiver<Job>) {
        while let Ok(job) = receiver.recv() {
            job();
        }
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job
    pub fn spawn<F, R>(&self, f: F) -> JobHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(f));
            let _ = tx.send(outcome);
        });
        if let Some(sender) = &self.sender {
            if sender.send(job).is_err() {
                tracing::error!("worker pool is shut down, dropping job");
            }
        }
        JobHandle { result: rx }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("worker thread panicked outside a job");
            }
        }
    }
}

/// A single dedicated thread for work with thread affinity
pub struct AffinityThread {
    pool: WorkerPool,
}

impl AffinityThread {
    /// Start the thread, named `hostprint-affinity`
    pub fn new() -> Result<Self, JobError> {
        Ok(Self {
            pool: WorkerPool::with_names(["hostprint-affinity".to_string()])?,
        })
    }

    /// Run `f` on the affinity thread and wait for its result
    pub fn run_blocking<F, R>(&self, f: F) -> Result<R, JobError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.pool.spawn(f).join()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_jobs_return_results() {
        let pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.size(), 4);
        let handles: Vec<_> = (0..16).map(|i| pool.spawn(move || i * 2)).collect();
        let results: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, (0..16).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_panic_reported_and_worker_survives() {
        let pool = WorkerPool::new(1).unwrap();
        let failed = pool.spawn(|| -> i32 { panic!("job exploded") });
        match failed.join() {
            Err(JobError::Panicked(msg)) => assert_eq!(msg, "job exploded"),
            other => panic!("Expected Panicked, got {:?}", other.map(|_| ())),
        }
        assert_eq!(pool.spawn(|| 5).join().unwrap(), 5);
    }

    #[test]
    fn test_drop_runs_queued_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(2).unwrap();
            for _ in 0..8 {
                let counter = counter.clone();
                pool.spawn(move || counter.fetch_add(1, Ordering::SeqCst));
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_affinity_thread_is_stable() {
        let affinity = AffinityThread::new().unwrap();
        let first = affinity.run_blocking(|| thread::current().id()).unwrap();
        let second = affinity.run_blocking(|| thread::current().id()).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, thread::current().id());
        let name = affinity
            .run_blocking(|| thread::current().name().map(str::to_string))
            .unwrap();
        assert_eq!(name.as_deref(), Some("hostprint-affinity"));
    }
}
