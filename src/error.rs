use std::io;
use thiserror::Error;

/// Error type for thread pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// A pool was configured with zero worker threads.
    #[error("thread pool must have at least one worker thread")]
    ZeroThreads,

    /// A job was submitted after the pool started shutting down.
    #[error("thread pool is shut down and no longer accepts jobs")]
    ShutDown,

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker {id}: {source}")]
    Spawn {
        /// Identifier of the worker that could not be started.
        id: usize,
        /// Underlying spawn error.
        source: io::Error,
    },

    /// IO error from socket or file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
