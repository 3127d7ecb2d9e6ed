/// Playback requests
///
/// The immutable unit of work the queues and arbitration loop carry around:
/// what to play, where, and which controls stay disabled while it plays.
use std::fmt;
use std::sync::Arc;

use super::backend::GuardedControl;
use super::track::Track;

/// One queued request: a clip path, its destination track and the controls
/// to keep disabled for the duration of playback.
pub struct PlaybackRequest {
    pub path: String,
    pub track: Track,
    guards: Vec<Arc<dyn GuardedControl>>,
}

impl PlaybackRequest {
    pub fn new(path: impl Into<String>, track: Track, guards: Vec<Arc<dyn GuardedControl>>) -> Self {
        Self {
            path: path.into(),
            track,
            guards,
        }
    }

    /// Check if this request runs as a blocking unit that disables controls
    pub fn has_guards(&self) -> bool {
        !self.guards.is_empty()
    }

    pub fn guards(&self) -> &[Arc<dyn GuardedControl>] {
        &self.guards
    }
}

impl fmt::Debug for PlaybackRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackRequest")
            .field("path", &self.path)
            .field("track", &self.track)
            .field("guards", &self.guards.len())
            .finish()
    }
}

/// What a delayed trigger does with its request when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Clear the track's queue, stop its clip, then enqueue (play semantics)
    Preempt,

    /// Append behind whatever is already queued (push semantics)
    Enqueue,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullControl;

    impl GuardedControl for NullControl {
        fn set_disabled(&self, _disabled: bool) {}
    }

    #[test]
    fn test_request_without_guards() {
        let request = PlaybackRequest::new("beep.mp3", Track::Functional, Vec::new());
        assert!(!request.has_guards());
        assert_eq!(request.path, "beep.mp3");
        assert_eq!(request.track, Track::Functional);
    }

    #[test]
    fn test_request_with_guards() {
        let guards: Vec<Arc<dyn GuardedControl>> = vec![Arc::new(NullControl), Arc::new(NullControl)];
        let request = PlaybackRequest::new("line.mp3", Track::Voice, guards);
        assert!(request.has_guards());
        assert_eq!(request.guards().len(), 2);
    }
}
