/// Playback events and the bus that broadcasts them
///
/// Events represent things that have happened (past tense). Hosts subscribe
/// to observe queueing, starts, stops and trigger activity without polling.
/// There is deliberately no clip-finished event: the player capability has no
/// completion contract, so completion is observed via `is_playing`.
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;

use crate::playback::Track;

/// Playback events
#[derive(Debug, Clone)]
pub enum SoundEvent {
    /// A request joined a track's queue
    Queued { track: Track, path: String },

    /// A clip was handed to the audio backend and started
    Started { track: Track, path: String },

    /// A track's live clip was stopped and released
    Stopped { track: Track },

    /// A track's queue was emptied
    QueueCleared { track: Track, discarded: usize },

    /// A delayed trigger was registered
    TriggerScheduled { id: u64, track: Track, delay_ms: u64 },

    /// A delayed trigger reached its deadline and forwarded its request
    TriggerFired { id: u64, track: Track },

    /// All pending delayed triggers were cancelled
    TriggersCancelled { count: usize },

    /// A track's volume level changed
    VolumeChanged { track: Track, volume: f32 },

    /// The engine released its pooled resources and reset volumes
    Disposed,
}

impl SoundEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SoundEvent::Queued { track, path } => {
                format!("Queued {} on {}", path, track)
            }
            SoundEvent::Started { track, path } => {
                format!("Started {} on {}", path, track)
            }
            SoundEvent::Stopped { track } => {
                format!("Stopped {}", track)
            }
            SoundEvent::QueueCleared { track, discarded } => {
                format!("Cleared {} queued request(s) on {}", discarded, track)
            }
            SoundEvent::TriggerScheduled { id, track, delay_ms } => {
                format!("Trigger #{} scheduled on {} in {}ms", id, track, delay_ms)
            }
            SoundEvent::TriggerFired { id, track } => {
                format!("Trigger #{} fired on {}", id, track)
            }
            SoundEvent::TriggersCancelled { count } => {
                format!("Cancelled {} delayed trigger(s)", count)
            }
            SoundEvent::VolumeChanged { track, volume } => {
                format!("Volume on {} set to {:.2}", track, volume)
            }
            SoundEvent::Disposed => "Engine disposed".to_string(),
        }
    }
}

/// Handle identifying one subscription, for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

/// Broadcasts [`SoundEvent`]s to every live subscriber.
///
/// The engine owns exactly one bus; it never leaves `EngineShared`, so the
/// bus itself needs no sharing machinery beyond interior mutability.
/// Delivery is best effort: a subscriber that dropped its receiver is
/// skipped, and a slow one just accumulates events on its unbounded channel.
pub struct EventBus {
    subscribers: RwLock<Vec<(SubscriberId, Sender<SoundEvent>)>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    /// Open a subscription; events published from here on arrive on the
    /// returned receiver
    pub fn subscribe(&self) -> (Receiver<SoundEvent>, SubscriberId) {
        let (tx, rx) = unbounded();
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, tx));
        (rx, id)
    }

    /// Close a subscription; a stale or already-removed id is ignored
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|(sub_id, _)| *sub_id != id);
    }

    /// Fan an event out to every subscriber without blocking the publisher
    pub fn publish(&self, event: SoundEvent) {
        for (_, sender) in self.subscribers.read().iter() {
            // A closed receiver means the subscriber went away; skip it
            let _ = sender.try_send(event.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}
