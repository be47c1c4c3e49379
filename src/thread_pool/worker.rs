use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;
use log::{debug, error, trace};

use super::Job;

/// One pool thread, bound to an identifier.
///
/// The thread handle is held in an `Option` so it can be joined at most once.
pub(crate) struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns a thread that pulls jobs from `rx` until the queue is closed.
    pub(crate) fn spawn(
        id: usize,
        rx: Receiver<Job>,
        builder: thread::Builder,
    ) -> io::Result<Self> {
        let thread = builder.spawn(move || run(id, rx))?;
        Ok(Worker {
            id,
            thread: Some(thread),
        })
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Returns `true` once the thread has been joined.
    pub(crate) fn is_joined(&self) -> bool {
        self.thread.is_none()
    }

    /// Blocks until the worker thread returns. Later calls do nothing.
    pub(crate) fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Worker {} terminated abnormally", self.id);
            }
        }
    }
}

/// The worker loop: Idle on `recv`, Running while a job executes,
/// Terminated once the channel reports that every sender is gone.
fn run(id: usize, rx: Receiver<Job>) {
    debug!("Worker {id} started");
    loop {
        match rx.recv() {
            Ok(job) => {
                trace!("Worker {id} executing job");
                // A panicking job must not take the worker down with it
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    error!(
                        "Worker {id} job panicked: {}, continuing",
                        panic_message(payload.as_ref())
                    );
                }
            }
            Err(_) => {
                debug!("Worker {id}: channel closed, shutting down");
                return;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
