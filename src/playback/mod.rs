pub mod backend;
pub mod engine;
pub mod global;
/// Playback subsystem
///
/// Coordinates clip playback across four independent tracks:
///
/// ```text
/// SoundEngine
///   ├── TrackQueues       one request FIFO per track
///   ├── TrackSlots        at most one live clip per track
///   ├── VolumeRegistry    requested level per track
///   ├── TriggerRegistry   armed delayed plays
///   ├── WorkerPool        blocking playback units (one slot per track)
///   └── arbitration loop  drains queues into slots, runs on demand
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use soundboard::{RodioBackend, SoundEngine, Track};
///
/// let engine = SoundEngine::new(Arc::new(RodioBackend::try_default()?));
/// let token = engine.submission_token();
///
/// // Preempt whatever the background track is doing
/// engine.play_sound(&token, "intro.mp3", Track::Background, Vec::new());
///
/// // Voice lines play one after another
/// engine.push_sound_to_track_queue(&token, "welcome.mp3", Track::Voice, Vec::new());
/// engine.push_sound_to_track_queue(&token, "menu.mp3", Track::Voice, Vec::new());
///
/// engine.set_volume(Track::Background, 0.4);
/// engine.stop_all_sounds();
/// ```
pub mod rodio_backend;
pub mod track;

mod arbiter;
mod pool;
mod queue;
mod request;
mod slot;
mod timer;
mod volume;

// Re-export commonly used types
pub use backend::{AudioBackend, ClipHandle, GuardedControl};
pub use engine::{SoundEngine, SubmissionToken};
pub use rodio_backend::RodioBackend;
pub use track::Track;
