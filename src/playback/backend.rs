/// Boundary capabilities
///
/// The engine reaches the outside world only through these traits: a backend
/// that opens clips, the handles it returns, and host controls that stay
/// disabled while a blocking clip plays. Production uses the rodio backend;
/// tests substitute fakes without touching engine code.
use crate::error::PlaybackError;

/// A live clip on some output device.
///
/// Handles are one-shot: `play` begins playback, `stop`/`dispose` end it.
/// There is no completion callback; owners poll `is_playing`.
pub trait ClipHandle: Send {
    /// Begin playback; returns immediately
    fn play(&mut self);

    /// Halt playback; safe to call repeatedly
    fn stop(&mut self);

    /// Halt playback and release decoder/device resources
    fn dispose(&mut self);

    /// Check whether the clip is still audibly playing.
    ///
    /// The answer may lag reality by tens of milliseconds right after
    /// `play`; callers that need a dependable reading wait out a settling
    /// delay first.
    fn is_playing(&self) -> bool;

    /// Set playback volume (0.0 = mute, 1.0 = full)
    fn set_volume(&mut self, volume: f32);
}

/// Factory for clip handles
pub trait AudioBackend: Send + Sync {
    /// Open a clip from a file path, ready to play
    fn open(&self, path: &str) -> Result<Box<dyn ClipHandle>, PlaybackError>;
}

/// A host-side control that can be disabled for the duration of a blocking
/// playback unit
pub trait GuardedControl: Send + Sync {
    /// Disable or re-enable the control
    fn set_disabled(&self, disabled: bool);
}
