/// Delayed triggers
///
/// One-shot timers that run an action after a delay. Each trigger parks a
/// named thread on a timed channel receive: the timeout is the deadline and
/// a dropped sender is cancellation. Firing and cancel_all race for the
/// registry entry; whoever removes it wins, so a cancelled trigger never
/// runs its action.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, warn};

pub struct TriggerRegistry {
    next_id: AtomicU64,
    active: Arc<Mutex<HashMap<u64, Sender<()>>>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of triggers currently armed
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    /// Arm a one-shot trigger: `on_fire` runs on the trigger's own thread
    /// (receiving the trigger's id) once `delay` elapses, unless the trigger
    /// is cancelled first. Returns the trigger id.
    pub fn schedule<F>(&self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        self.active.lock().insert(id, cancel_tx);

        let active = Arc::clone(&self.active);
        let spawned = thread::Builder::new()
            .name(format!("sound-trigger-{}", id))
            .spawn(move || match cancel_rx.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => {
                    if active.lock().remove(&id).is_some() {
                        debug!("Trigger #{} firing", id);
                        on_fire(id);
                    } else {
                        debug!("Trigger #{} was cancelled right at its deadline", id);
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("Trigger #{} cancelled", id);
                }
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn trigger thread: {}", e);
            self.active.lock().remove(&id);
        }
        id
    }

    /// Cancel every armed trigger, returning how many were dropped. Dropping
    /// the senders wakes the parked trigger threads into their cancelled
    /// path.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(u64, Sender<()>)> = self.active.lock().drain().collect();
        let count = drained.len();
        if count > 0 {
            debug!("Cancelled {} armed trigger(s)", count);
        }
        count
    }
}
