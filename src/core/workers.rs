//! Background thread pool for transport calls and other blocking work.
//!
//! Uses crossbeam for an MPMC queue with closure-based task execution. The
//! UI thread enqueues and returns immediately; results travel back over
//! channels or the event bus.

use crossbeam_channel::{Sender, unbounded};
use log::{debug, error};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed pool of worker threads executing arbitrary closures.
///
/// # Example
/// ```ignore
/// let workers = Workers::new(4);
/// workers.execute(move || {
///     let _ = tx.send(service.process(&request));
/// });
/// ```
pub struct Workers {
    sender: Sender<Job>,
    _handles: Vec<thread::JoinHandle<()>>, // Keep handles to prevent premature drop
}

impl Workers {
    /// Create a pool with `num_threads` threads.
    pub fn new(num_threads: usize) -> Self {
        let (tx, rx): (Sender<Job>, _) = unbounded();
        let mut handles = Vec::new();

        for worker_id in 0..num_threads {
            let rx = rx.clone();

            let handle = thread::Builder::new()
                .name(format!("repix-worker-{}", worker_id))
                .spawn(move || {
                    debug!("Worker {} started", worker_id);

                    // Worker loop: execute closures until channel closes
                    while let Ok(job) = rx.recv() {
                        job();
                    }

                    debug!("Worker {} stopped", worker_id);
                })
                .expect("Failed to spawn worker thread");

            handles.push(handle);
        }

        debug!("Workers initialized: {} threads", num_threads);

        Self {
            sender: tx,
            _handles: handles,
        }
    }

    /// Pool size for transport work. IO-bound, so a handful is plenty:
    /// results beyond the newest in-flight request are discarded anyway.
    pub fn default_threads() -> usize {
        num_cpus::get().clamp(1, 4)
    }

    /// Execute a closure on a worker thread. Runs asynchronously, no return
    /// value; use a channel or the event bus to report back.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.sender.send(Box::new(f)) {
            error!("Failed to enqueue job: {}", e);
        }
    }
}

// Drop implementation: channels close automatically, threads exit gracefully
impl Drop for Workers {
    fn drop(&mut self) {
        debug!("Workers shutting down ({} threads)...", self._handles.len());
        // Sender drops -> channel closes -> workers exit recv() loop
    }
}
