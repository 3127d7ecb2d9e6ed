/// Worker pool
///
/// A bounded pool of named worker threads, one per track, that runs blocking
/// playback units. Shutdown is fire-and-forget: the job feed closes, idle
/// workers drain out and exit, and in-flight units learn about the shutdown
/// through their cancellation signal rather than being joined.
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, warn};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    job_tx: Sender<Job>,
    // Never sends; dropping it trips every outstanding CancelSignal
    cancel_tx: Sender<()>,
    cancel_rx: Receiver<()>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        let (job_tx, job_rx) = unbounded::<Job>();
        let (cancel_tx, cancel_rx) = bounded::<()>(0);

        for n in 0..workers {
            let rx = job_rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("sound-worker-{}", n))
                .spawn(move || {
                    debug!("Pool worker started");
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                    debug!("Pool worker stopped");
                });
            if let Err(e) = spawned {
                warn!("Failed to spawn pool worker: {}", e);
            }
        }

        debug!("Worker pool up with {} worker(s)", workers);
        Self {
            job_tx,
            cancel_tx,
            cancel_rx,
            workers,
        }
    }

    /// Hand a unit of work to the pool. If the pool has shut down underneath
    /// the caller the unit is dropped with a warning.
    pub fn execute(&self, job: Job) {
        if self.job_tx.send(job).is_err() {
            warn!("Worker pool is gone; dropping submitted unit");
        }
    }

    /// A signal that in-flight units can wait on; it fires when this pool
    /// shuts down.
    pub fn cancel_signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.cancel_rx.clone(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Shut down without joining: closes the job feed and fires every
    /// cancellation signal. In-flight units finish on their own schedule.
    pub fn shutdown(self) {
        debug!("Worker pool shutting down; abandoning in-flight units");
        drop(self.job_tx);
        drop(self.cancel_tx);
    }
}

/// Timed wait handed to blocking units, cut short when the issuing pool
/// shuts down
pub struct CancelSignal {
    rx: Receiver<()>,
}

impl CancelSignal {
    /// Wait up to `timeout`. Returns true if the wait ended early due to
    /// cancellation, false if the full timeout elapsed.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}
