#![deny(missing_docs)]

//! A fixed-size worker thread pool with graceful shutdown.
//!
//! Jobs submitted with [`ThreadPool::execute`] go through one shared FIFO
//! queue and are run by whichever worker thread is free. Dropping the pool
//! closes the queue, lets the workers drain it and joins every thread.
//!
//! The crate also ships [`HttpServer`], a small HTTP file server that hands
//! each accepted connection to the pool.

mod error;
mod server;
/// The worker thread pool.
pub mod thread_pool;

pub use error::{PoolError, Result};
pub use server::HttpServer;
pub use thread_pool::{Builder, Job, ThreadPool};
