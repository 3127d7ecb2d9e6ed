/// Track queues
///
/// One FIFO of pending requests per track, each behind its own lock so
/// tracks never contend with each other. Duplicate paths are allowed; order
/// of arrival is the only ordering there is.
use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use super::request::PlaybackRequest;
use super::track::Track;

pub struct TrackQueues {
    queues: [Mutex<VecDeque<PlaybackRequest>>; Track::COUNT],
}

impl TrackQueues {
    pub fn new() -> Self {
        Self {
            queues: std::array::from_fn(|_| Mutex::new(VecDeque::new())),
        }
    }

    fn queue(&self, track: Track) -> &Mutex<VecDeque<PlaybackRequest>> {
        &self.queues[track.index()]
    }

    /// Append a request behind everything already queued for its track
    pub fn push(&self, request: PlaybackRequest) {
        debug!("Queued {} on {}", request.path, request.track);
        self.queue(request.track).lock().push_back(request);
    }

    /// Take the next request for a track, oldest first
    pub fn pop_next(&self, track: Track) -> Option<PlaybackRequest> {
        self.queue(track).lock().pop_front()
    }

    /// Discard everything queued for a track, returning how many requests
    /// were dropped
    pub fn clear(&self, track: Track) -> usize {
        let mut queue = self.queue(track).lock();
        let discarded = queue.len();
        queue.clear();
        if discarded > 0 {
            debug!("Cleared {} request(s) from {}", discarded, track);
        }
        discarded
    }

    pub fn has_pending(&self, track: Track) -> bool {
        !self.queue(track).lock().is_empty()
    }

    pub fn len(&self, track: Track) -> usize {
        self.queue(track).lock().len()
    }

    pub fn all_empty(&self) -> bool {
        Track::ALL.iter().all(|track| !self.has_pending(*track))
    }
}
