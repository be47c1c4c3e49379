use crossbeam::channel::Sender;
use log::{debug, info};

use crate::{PoolError, Result};

mod builder;
mod worker;

pub use self::builder::Builder;
use self::worker::Worker;

/// A unit of work: called exactly once, on whichever worker dequeues it.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size pool of worker threads fed by one shared job queue.
///
/// Jobs are dequeued in submission order by whichever worker is idle,
/// and each job runs on exactly one worker. A job that panics is logged
/// and the worker goes on to the next job, so the pool never loses
/// capacity.
///
/// Dropping the pool (or calling [`ThreadPool::shutdown`]) closes the
/// queue and waits for every worker to drain it and exit.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
}

impl ThreadPool {
    /// Creates a pool with `size` worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or if a worker thread cannot be spawned.
    /// Use [`ThreadPool::build`] to handle these cases as errors.
    pub fn new(size: usize) -> ThreadPool {
        match ThreadPool::build(size) {
            Ok(pool) => pool,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a pool with `size` worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroThreads`] if `size` is zero, or
    /// [`PoolError::Spawn`] if the OS refuses to start a thread.
    pub fn build(size: usize) -> Result<ThreadPool> {
        Builder::new().num_threads(size).build()
    }

    /// Returns a [`Builder`] for configuring thread count, names and stack size.
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn with_sender(sender: Sender<Job>, capacity: usize) -> ThreadPool {
        ThreadPool {
            workers: Vec::with_capacity(capacity),
            sender: Some(sender),
        }
    }

    pub(crate) fn push_worker(&mut self, worker: Worker) {
        self.workers.push(worker);
    }

    /// Queues `job` for execution and returns without waiting for it.
    ///
    /// # Panics
    ///
    /// Panics if the pool has been shut down. Jobs are never silently dropped.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.try_execute(job) {
            panic!("{}", e);
        }
    }

    /// Queues `job` for execution, reporting failure instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] after [`ThreadPool::shutdown`].
    pub fn try_execute<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolError::ShutDown)?;
        // Workers hold their receivers until the sender is dropped
        sender
            .send(Box::new(job))
            .map_err(|_| PoolError::ShutDown)
    }

    /// Number of worker threads the pool was created with.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Number of jobs waiting in the queue that no worker has picked up yet.
    pub fn queued_jobs(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    /// Returns `true` once shutdown has started.
    pub fn is_shut_down(&self) -> bool {
        self.sender.is_none()
    }

    /// Closes the queue and joins every worker, in creation order.
    ///
    /// Jobs already queued are still executed. Blocks until each worker has
    /// finished its current job and returned. Calling this again is a no-op.
    pub fn shutdown(&mut self) {
        // The sender must go first: joining while it is alive would block
        // forever on workers waiting in `recv`.
        let Some(sender) = self.sender.take() else {
            return;
        };
        drop(sender);
        debug!("Shutting down {} workers", self.workers.len());

        for worker in &mut self.workers {
            debug!("Joining worker {}", worker.id());
            worker.join();
        }
        info!("Thread pool shut down");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn creates_requested_number_of_workers() {
        for size in [1, 2, 8] {
            let pool = ThreadPool::new(size);
            assert_eq!(pool.size(), size);
            let ids: Vec<usize> = pool.workers.iter().map(Worker::id).collect();
            assert_eq!(ids, (0..size).collect::<Vec<_>>());
        }
    }

    #[test]
    fn shutdown_joins_every_worker() {
        let mut pool = ThreadPool::new(4);
        pool.shutdown();
        assert!(pool.is_shut_down());
        assert!(pool.workers.iter().all(Worker::is_joined));
    }

    #[test]
    fn shutdown_is_idempotent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut pool = ThreadPool::new(2);
        let c = Arc::clone(&counter);
        pool.execute(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        pool.shutdown();
        pool.shutdown();
        drop(pool);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn try_execute_after_shutdown_is_rejected() {
        let mut pool = ThreadPool::new(1);
        pool.shutdown();
        assert!(matches!(
            pool.try_execute(|| {}),
            Err(PoolError::ShutDown)
        ));
        assert_eq!(pool.queued_jobs(), 0);
    }
}
