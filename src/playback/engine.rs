/// Sound engine facade
///
/// One engine instance coordinates the four tracks: it owns the queues, the
/// live-clip slots, volumes, delayed triggers, the worker pool and the
/// arbitration loop. Queueing calls return immediately; actual playback
/// starts on the arbitration thread. The four queue-appending operations
/// require the engine's `SubmissionToken`, the single-context capability the
/// rest of the API does not need.
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::events::{EventBus, SoundEvent, SubscriberId};

use super::arbiter;
use super::backend::{AudioBackend, GuardedControl};
use super::pool::WorkerPool;
use super::queue::TrackQueues;
use super::request::{PlaybackRequest, TriggerMode};
use super::slot::TrackSlots;
use super::timer::TriggerRegistry;
use super::track::Track;
use super::volume::{VolumeRegistry, DEFAULT_VOLUME};

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Capability held by the one context allowed to submit playback requests.
///
/// Minted at most once per engine and deliberately neither `Send` nor
/// `Sync`: requests are expected to funnel through a single submission
/// context, and handing the token around threads would defeat the point.
/// Internal paths (trigger fires, the arbitration loop) do not need it,
/// since their requests were submitted with the token present.
pub struct SubmissionToken {
    engine_id: u64,
    _not_send: PhantomData<*const ()>,
}

pub(crate) struct ArbiterState {
    pub(crate) running: bool,
    pub(crate) thread: Option<thread::JoinHandle<()>>,
}

/// Shared engine state; everything background threads need lives here
pub(crate) struct EngineShared {
    pub(crate) id: u64,
    pub(crate) config: EngineConfig,
    pub(crate) backend: Arc<dyn AudioBackend>,
    pub(crate) queues: TrackQueues,
    pub(crate) slots: TrackSlots,
    pub(crate) volumes: VolumeRegistry,
    pub(crate) triggers: TriggerRegistry,
    pub(crate) bus: EventBus,
    pub(crate) arbiter: Mutex<ArbiterState>,
    pub(crate) pool: Mutex<Option<WorkerPool>>,
    token_claimed: AtomicBool,
}

impl EngineShared {
    /// Busy probe with the configured settling delay
    pub(crate) fn busy(&self, track: Track) -> bool {
        self.slots.is_busy(track, self.config.busy_settle())
    }

    /// Open and start a clip on a track at its registered volume. Failures
    /// are contained here: logged, and the track is simply left idle.
    pub(crate) fn start_clip(&self, path: &str, track: Track) {
        let volume = self.volumes.get(track);
        match self.slots.start(track, self.backend.as_ref(), path, volume) {
            Ok(()) => {
                self.bus.publish(SoundEvent::Started {
                    track,
                    path: path.to_string(),
                });
            }
            Err(e) => {
                error!("Could not start {} on {}: {}", path, track, e);
            }
        }
    }

    /// Clear a track's queue and release its live clip (the stop semantics)
    pub(crate) fn halt_track(&self, track: Track) {
        let discarded = self.queues.clear(track);
        if discarded > 0 {
            self.bus.publish(SoundEvent::QueueCleared { track, discarded });
        }
        if self.slots.stop(track) {
            self.bus.publish(SoundEvent::Stopped { track });
        }
    }

    /// Enqueue a request and make sure the arbitration loop is running
    pub(crate) fn submit(self: &Arc<Self>, request: PlaybackRequest) {
        let track = request.track;
        let path = request.path.clone();
        self.queues.push(request);
        self.bus.publish(SoundEvent::Queued { track, path });
        self.ensure_arbiter();
    }

    /// The preemption path: stop the track outright, then enqueue
    pub(crate) fn preempt_and_submit(self: &Arc<Self>, request: PlaybackRequest) {
        self.halt_track(request.track);
        self.submit(request);
    }

    /// Spawn the arbitration loop if it is not already running. The running
    /// flag and the loop's exit check share one lock, so an enqueue racing a
    /// loop exit either gets picked up by the old run or starts a new one.
    fn ensure_arbiter(self: &Arc<Self>) {
        let mut state = self.arbiter.lock();
        if state.running {
            return;
        }
        state.running = true;

        let shared = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("sound-arbiter".to_string())
            .spawn(move || arbiter::run(shared));
        match spawned {
            Ok(handle) => {
                // A handle from a previous run is long finished; drop it
                state.thread = Some(handle);
            }
            Err(e) => {
                state.running = false;
                error!("Failed to start arbitration loop: {}", e);
            }
        }
    }

    /// Run a guarded request as a blocking unit on the worker pool,
    /// (re)creating the pool if it was disposed
    pub(crate) fn submit_blocking(self: &Arc<Self>, request: PlaybackRequest) {
        let mut pool = self.pool.lock();
        let pool = pool.get_or_insert_with(|| {
            debug!("Creating worker pool for blocking playback");
            WorkerPool::new(Track::COUNT)
        });

        let cancel = pool.cancel_signal();
        let shared = Arc::clone(self);
        pool.execute(Box::new(move || {
            arbiter::run_blocking_unit(shared, request, cancel)
        }));
    }
}

/// The multi-track playback coordinator
pub struct SoundEngine {
    shared: Arc<EngineShared>,
}

impl Clone for SoundEngine {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl SoundEngine {
    /// Create an engine with default timing parameters
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self::with_config(backend, EngineConfig::default())
    }

    /// Create an engine with explicit timing parameters (clamped into their
    /// supported ranges)
    pub fn with_config(backend: Arc<dyn AudioBackend>, config: EngineConfig) -> Self {
        let config = config.validated();
        let id = NEXT_ENGINE_ID.fetch_add(1, Ordering::SeqCst);
        info!("Sound engine #{} created", id);

        Self {
            shared: Arc::new(EngineShared {
                id,
                config,
                backend,
                queues: TrackQueues::new(),
                slots: TrackSlots::new(),
                volumes: VolumeRegistry::new(),
                triggers: TriggerRegistry::new(),
                bus: EventBus::new(),
                arbiter: Mutex::new(ArbiterState {
                    running: false,
                    thread: None,
                }),
                pool: Mutex::new(None),
                token_claimed: AtomicBool::new(false),
            }),
        }
    }

    /// Identifier of this engine (shared by its clones)
    pub fn engine_id(&self) -> u64 {
        self.shared.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Mint the engine's submission token.
    ///
    /// # Panics
    ///
    /// Panics when called a second time on the same engine (or a clone of
    /// it): there is exactly one submission context, and two claimants is a
    /// wiring bug worth failing fast on.
    pub fn submission_token(&self) -> SubmissionToken {
        if self.shared.token_claimed.swap(true, Ordering::SeqCst) {
            panic!(
                "submission token for engine #{} already claimed; \
                 all queueing calls must come from a single submission context",
                self.shared.id
            );
        }
        debug!("Submission token for engine #{} claimed", self.shared.id);
        SubmissionToken {
            engine_id: self.shared.id,
            _not_send: PhantomData,
        }
    }

    fn check_token(&self, token: &SubmissionToken) {
        if token.engine_id != self.shared.id {
            panic!(
                "submission token belongs to engine #{}, not engine #{}",
                token.engine_id, self.shared.id
            );
        }
    }

    /// Play a clip on a track right away: whatever is queued there is
    /// discarded, the live clip is stopped, and this request goes in as the
    /// only one. Returns once the request is queued; the start itself
    /// happens on the arbitration thread.
    ///
    /// # Panics
    ///
    /// Panics if `token` was minted by a different engine.
    pub fn play_sound(
        &self,
        token: &SubmissionToken,
        path: &str,
        track: Track,
        guards: Vec<Arc<dyn GuardedControl>>,
    ) {
        self.check_token(token);
        info!("Play {} on {} (preempting)", path, track);
        self.shared
            .preempt_and_submit(PlaybackRequest::new(path, track, guards));
    }

    /// Schedule `play_sound` semantics to run after `delay_ms`. The queue
    /// clear and stop happen at fire time, not now.
    ///
    /// # Panics
    ///
    /// Panics if `token` was minted by a different engine.
    pub fn play_sound_with_delay(
        &self,
        token: &SubmissionToken,
        path: &str,
        track: Track,
        delay_ms: u64,
        guards: Vec<Arc<dyn GuardedControl>>,
    ) {
        self.check_token(token);
        self.schedule_trigger(
            PlaybackRequest::new(path, track, guards),
            delay_ms,
            TriggerMode::Preempt,
        );
    }

    /// Append a clip behind whatever a track already has queued or playing.
    ///
    /// # Panics
    ///
    /// Panics if `token` was minted by a different engine.
    pub fn push_sound_to_track_queue(
        &self,
        token: &SubmissionToken,
        path: &str,
        track: Track,
        guards: Vec<Arc<dyn GuardedControl>>,
    ) {
        self.check_token(token);
        self.shared
            .submit(PlaybackRequest::new(path, track, guards));
    }

    /// Schedule a plain queue append to run after `delay_ms`.
    ///
    /// # Panics
    ///
    /// Panics if `token` was minted by a different engine.
    pub fn push_sound_to_track_queue_with_delay(
        &self,
        token: &SubmissionToken,
        path: &str,
        track: Track,
        delay_ms: u64,
        guards: Vec<Arc<dyn GuardedControl>>,
    ) {
        self.check_token(token);
        self.schedule_trigger(
            PlaybackRequest::new(path, track, guards),
            delay_ms,
            TriggerMode::Enqueue,
        );
    }

    fn schedule_trigger(&self, request: PlaybackRequest, delay_ms: u64, mode: TriggerMode) {
        let track = request.track;
        let shared = Arc::clone(&self.shared);
        let id = self
            .shared
            .triggers
            .schedule(Duration::from_millis(delay_ms), move |id| {
                shared.bus.publish(SoundEvent::TriggerFired { id, track });
                match mode {
                    TriggerMode::Preempt => shared.preempt_and_submit(request),
                    TriggerMode::Enqueue => shared.submit(request),
                }
            });
        debug!("Trigger #{} armed on {} in {}ms ({:?})", id, track, delay_ms, mode);
        self.shared
            .bus
            .publish(SoundEvent::TriggerScheduled { id, track, delay_ms });
    }

    /// Discard everything queued for a track (the live clip keeps playing)
    pub fn empty_track_queue(&self, track: Track) {
        let discarded = self.shared.queues.clear(track);
        if discarded > 0 {
            self.shared
                .bus
                .publish(SoundEvent::QueueCleared { track, discarded });
        }
    }

    /// Check whether a track has queued requests waiting
    pub fn is_any_on_queue(&self, track: Track) -> bool {
        self.shared.queues.has_pending(track)
    }

    /// Stop one track: clear its queue, then stop and release its live
    /// clip. Safe to call repeatedly.
    pub fn stop(&self, track: Track) {
        debug!("Stop requested for {}", track);
        self.shared.halt_track(track);
    }

    /// Stop everything: cancel armed triggers, then clear and stop every
    /// track. Blocking units already in flight are not interrupted; their
    /// next busy probe observes the stopped track and they wind down on
    /// their own.
    pub fn stop_all_sounds(&self) {
        info!("Stopping all tracks");
        let cancelled = self.shared.triggers.cancel_all();
        if cancelled > 0 {
            self.shared
                .bus
                .publish(SoundEvent::TriggersCancelled { count: cancelled });
        }
        for track in Track::ALL {
            self.shared.halt_track(track);
        }
    }

    /// Full teardown: stop everything, reset volumes, release the worker
    /// pool (in-flight blocking units are abandoned and told to cancel) and
    /// wait for the arbitration loop to drain out. The engine stays usable;
    /// the pool and loop come back lazily on the next request.
    pub fn dispose_all_sounds(&self) {
        info!("Disposing engine #{}", self.shared.id);
        self.stop_all_sounds();
        self.reset_volume();

        if let Some(pool) = self.shared.pool.lock().take() {
            pool.shutdown();
        }

        let handle = self.shared.arbiter.lock().thread.take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("Arbitration thread panicked before dispose");
            }
        }

        self.shared.bus.publish(SoundEvent::Disposed);
    }

    /// Check whether a track is audible or about to be: true when its queue
    /// is non-empty or its live clip reports playing. Includes the settling
    /// delay of the busy probe.
    pub fn is_playing(&self, track: Track) -> bool {
        self.shared.queues.has_pending(track) || self.shared.busy(track)
    }

    /// Set a track's volume (clamped to 0.0..=1.0); applies to the live
    /// clip immediately and to every later start
    pub fn set_volume(&self, track: Track, volume: f32) {
        let stored = self.shared.volumes.set(track, volume);
        self.shared.slots.set_live_volume(track, stored);
        debug!("Volume on {} set to {:.2}", track, stored);
        self.shared.bus.publish(SoundEvent::VolumeChanged {
            track,
            volume: stored,
        });
    }

    pub fn get_volume(&self, track: Track) -> f32 {
        self.shared.volumes.get(track)
    }

    /// Restore every track to full volume
    pub fn reset_volume(&self) {
        self.shared.volumes.reset_all();
        for track in Track::ALL {
            self.shared.slots.set_live_volume(track, DEFAULT_VOLUME);
            self.shared.bus.publish(SoundEvent::VolumeChanged {
                track,
                volume: DEFAULT_VOLUME,
            });
        }
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> (Receiver<SoundEvent>, SubscriberId) {
        self.shared.bus.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.shared.bus.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackError;
    use crate::playback::backend::ClipHandle;

    struct NullBackend;

    impl AudioBackend for NullBackend {
        fn open(&self, path: &str) -> Result<Box<dyn ClipHandle>, PlaybackError> {
            Err(PlaybackError::ClipOpenFailed {
                path: path.to_string(),
                source: "null backend".into(),
            })
        }
    }

    #[test]
    fn test_engine_ids_are_distinct() {
        let a = SoundEngine::new(Arc::new(NullBackend));
        let b = SoundEngine::new(Arc::new(NullBackend));
        assert_ne!(a.engine_id(), b.engine_id());
        assert_eq!(a.clone().engine_id(), a.engine_id());
    }

    #[test]
    fn test_config_is_validated_on_construction() {
        let config = EngineConfig {
            poll_interval_ms: 0,
            guard_refresh_ms: 500,
            busy_settle_ms: 50,
        };
        let engine = SoundEngine::with_config(Arc::new(NullBackend), config);
        assert_eq!(engine.config().poll_interval_ms, 1);
    }

    #[test]
    #[should_panic(expected = "already claimed")]
    fn test_second_token_claim_panics() {
        let engine = SoundEngine::new(Arc::new(NullBackend));
        let _token = engine.submission_token();
        let _second = engine.submission_token();
    }

    #[test]
    #[should_panic(expected = "belongs to engine")]
    fn test_foreign_token_is_rejected() {
        let a = SoundEngine::new(Arc::new(NullBackend));
        let b = SoundEngine::new(Arc::new(NullBackend));
        let token_b = b.submission_token();
        a.play_sound(&token_b, "x.mp3", Track::Voice, Vec::new());
    }
}
