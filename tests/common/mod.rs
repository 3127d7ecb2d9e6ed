// Shared test doubles for the integration tests: a deterministic fake audio
// backend that records every clip's lifecycle, a fake guarded control with
// call counters, and small wait helpers. No audio device is involved; clip
// "playback" is just elapsed wall time against a configured duration.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use soundboard::{
    AudioBackend, ClipHandle, EngineConfig, GuardedControl, PlaybackError, SoundEngine, SoundEvent,
};

/// Everything the fake backend saw happen to one opened clip
#[derive(Debug, Clone)]
pub struct ClipRecord {
    pub path: String,
    pub duration: Duration,
    pub volume: f32,
    pub played_at: Option<Instant>,
    pub stopped_at: Option<Instant>,
    pub stopped: bool,
    pub disposed: bool,
}

impl ClipRecord {
    fn end_at(&self) -> Option<Instant> {
        let started = self.played_at?;
        let natural = started + self.duration;
        Some(match self.stopped_at {
            Some(stopped) => stopped.min(natural),
            None => natural,
        })
    }

    fn live_now(&self) -> bool {
        match (self.played_at, self.end_at()) {
            (Some(_), Some(end)) => Instant::now() < end,
            _ => false,
        }
    }

    fn overlaps(&self, other: &ClipRecord) -> bool {
        match (self.played_at, self.end_at(), other.played_at, other.end_at()) {
            (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) => {
                a_start < b_end && b_start < a_end
            }
            _ => false,
        }
    }
}

#[derive(Default)]
pub struct PlaybackLog {
    records: Mutex<Vec<ClipRecord>>,
    play_seq: Mutex<Vec<String>>,
}

impl PlaybackLog {
    pub fn opened(&self, path: &str) -> usize {
        self.records.lock().iter().filter(|r| r.path == path).count()
    }

    /// Paths in the order their clips were started
    pub fn play_sequence(&self) -> Vec<String> {
        self.play_seq.lock().clone()
    }

    pub fn ever_played(&self, path: &str) -> bool {
        self.play_seq.lock().iter().any(|p| p == path)
    }

    /// Whether some clip for `path` is audible right now
    pub fn is_live(&self, path: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.path == path && r.live_now())
    }

    pub fn stop_count(&self, path: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.path == path && r.stopped)
            .count()
    }

    pub fn dispose_count(&self, path: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.path == path && r.disposed)
            .count()
    }

    pub fn last_volume(&self, path: &str) -> Option<f32> {
        self.records
            .lock()
            .iter()
            .rev()
            .find(|r| r.path == path)
            .map(|r| r.volume)
    }

    /// Whether any clip of `a` was audible at the same time as any clip of
    /// `b`
    pub fn overlapped(&self, a: &str, b: &str) -> bool {
        let records = self.records.lock();
        records
            .iter()
            .filter(|r| r.path == a)
            .any(|ra| records.iter().filter(|r| r.path == b).any(|rb| ra.overlaps(rb)))
    }
}

/// Deterministic in-memory audio backend
pub struct FakeBackend {
    default_duration: Duration,
    durations: Mutex<HashMap<String, Duration>>,
    failing: Mutex<HashSet<String>>,
    log: Arc<PlaybackLog>,
}

impl FakeBackend {
    pub fn new(default_duration: Duration) -> Arc<Self> {
        Arc::new(Self {
            default_duration,
            durations: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            log: Arc::new(PlaybackLog::default()),
        })
    }

    /// Give one path its own clip length
    pub fn set_duration(&self, path: &str, duration: Duration) {
        self.durations.lock().insert(path.to_string(), duration);
    }

    /// Make opening this path fail
    pub fn fail_on(&self, path: &str) {
        self.failing.lock().insert(path.to_string());
    }

    pub fn log(&self) -> Arc<PlaybackLog> {
        Arc::clone(&self.log)
    }
}

impl AudioBackend for FakeBackend {
    fn open(&self, path: &str) -> Result<Box<dyn ClipHandle>, PlaybackError> {
        if self.failing.lock().contains(path) {
            return Err(PlaybackError::ClipOpenFailed {
                path: path.to_string(),
                source: "configured to fail".into(),
            });
        }

        let duration = self
            .durations
            .lock()
            .get(path)
            .copied()
            .unwrap_or(self.default_duration);

        let idx = {
            let mut records = self.log.records.lock();
            records.push(ClipRecord {
                path: path.to_string(),
                duration,
                volume: 1.0,
                played_at: None,
                stopped_at: None,
                stopped: false,
                disposed: false,
            });
            records.len() - 1
        };

        Ok(Box::new(FakeClip {
            log: Arc::clone(&self.log),
            idx,
        }))
    }
}

struct FakeClip {
    log: Arc<PlaybackLog>,
    idx: usize,
}

impl FakeClip {
    fn record<R>(&self, f: impl FnOnce(&mut ClipRecord) -> R) -> R {
        f(&mut self.log.records.lock()[self.idx])
    }
}

impl ClipHandle for FakeClip {
    fn play(&mut self) {
        let path = self.record(|r| {
            r.played_at = Some(Instant::now());
            r.path.clone()
        });
        self.log.play_seq.lock().push(path);
    }

    fn stop(&mut self) {
        self.record(|r| {
            r.stopped = true;
            if r.stopped_at.is_none() {
                r.stopped_at = Some(Instant::now());
            }
        });
    }

    fn dispose(&mut self) {
        self.record(|r| {
            r.disposed = true;
            if r.stopped_at.is_none() {
                r.stopped_at = Some(Instant::now());
            }
        });
    }

    fn is_playing(&self) -> bool {
        self.record(|r| r.live_now())
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(|r| r.volume = volume);
    }
}

/// Host control that remembers how it was toggled
#[derive(Default)]
pub struct FakeControl {
    disabled: AtomicBool,
    disable_calls: AtomicUsize,
    enable_calls: AtomicUsize,
}

impl FakeControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    pub fn disable_calls(&self) -> usize {
        self.disable_calls.load(Ordering::SeqCst)
    }

    pub fn enable_calls(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }
}

impl GuardedControl for FakeControl {
    fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
        if disabled {
            self.disable_calls.fetch_add(1, Ordering::SeqCst);
        } else {
            self.enable_calls.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Timing parameters shrunk so scenarios finish in tens of milliseconds
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        poll_interval_ms: 10,
        guard_refresh_ms: 25,
        busy_settle_ms: 2,
    }
}

pub fn test_engine(backend: Arc<FakeBackend>) -> SoundEngine {
    SoundEngine::with_config(backend, fast_config())
}

/// Poll `predicate` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, predicate: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    predicate()
}

pub fn drain(rx: &Receiver<SoundEvent>) -> Vec<SoundEvent> {
    rx.try_iter().collect()
}

pub fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
