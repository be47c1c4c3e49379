use std::io;
use std::thread;

use crossbeam::channel::{self, Receiver};
use log::info;

use super::worker::Worker;
use super::{Job, ThreadPool};
use crate::{PoolError, Result};

const DEFAULT_THREAD_NAME: &str = "pool-worker";

/// Configuration for a [`ThreadPool`].
///
/// ```
/// use jobpool::ThreadPool;
///
/// let pool = ThreadPool::builder()
///     .num_threads(4)
///     .thread_name("handler")
///     .build()
///     .unwrap();
/// assert_eq!(pool.size(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    num_threads: Option<usize>,
    thread_name: String,
    stack_size: Option<usize>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    /// Creates a builder with one thread per CPU and default thread names.
    pub fn new() -> Self {
        Builder {
            num_threads: None,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            stack_size: None,
        }
    }

    /// Sets the number of worker threads. Must be at least one.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Sets the name prefix; worker `n` is named `"{prefix}-{n}"`.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Sets the stack size, in bytes, of each worker thread.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Spawns the workers and returns the running pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroThreads`] for a thread count of zero, or
    /// [`PoolError::Spawn`] if a thread cannot be started. Workers spawned
    /// before the failure are shut down and joined first.
    pub fn build(self) -> Result<ThreadPool> {
        self.build_with(Worker::spawn)
    }

    /// Builds the pool using `spawn` to start each worker.
    fn build_with<F>(self, mut spawn: F) -> Result<ThreadPool>
    where
        F: FnMut(usize, Receiver<Job>, thread::Builder) -> io::Result<Worker>,
    {
        let num_threads = self.num_threads.unwrap_or_else(num_cpus::get);
        if num_threads == 0 {
            return Err(PoolError::ZeroThreads);
        }

        let (tx, rx) = channel::unbounded::<Job>();
        let mut pool = ThreadPool::with_sender(tx, num_threads);

        for id in 0..num_threads {
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", self.thread_name, id));
            if let Some(size) = self.stack_size {
                builder = builder.stack_size(size);
            }
            // On error `pool` is dropped here, which joins the workers already running
            let worker =
                spawn(id, rx.clone(), builder).map_err(|source| PoolError::Spawn { id, source })?;
            pool.push_worker(worker);
        }

        info!(
            "Thread pool started with {} workers ({})",
            num_threads, self.thread_name
        );
        Ok(pool)
    }
}
