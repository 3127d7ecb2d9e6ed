/// Track slots
///
/// Each track owns at most one live clip handle, held in a slot behind its
/// own lock. Starting a clip releases the previous handle before the new one
/// is opened, so two handles for one track are never live at the same
/// instant. Release follows the track's class: the media-player-backed track
/// disposes its handle, the others just stop it.
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::PlaybackError;

use super::backend::{AudioBackend, ClipHandle};
use super::track::Track;

pub struct TrackSlots {
    slots: [Mutex<Option<Box<dyn ClipHandle>>>; Track::COUNT],
}

impl TrackSlots {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Mutex::new(None)),
        }
    }

    fn slot(&self, track: Track) -> &Mutex<Option<Box<dyn ClipHandle>>> {
        &self.slots[track.index()]
    }

    /// Open `path` on `track` and start it at `volume`, replacing (and
    /// releasing) whatever was live before. On open failure the slot is left
    /// empty and the error is returned for the caller to log.
    pub fn start(
        &self,
        track: Track,
        backend: &dyn AudioBackend,
        path: &str,
        volume: f32,
    ) -> Result<(), PlaybackError> {
        let mut slot = self.slot(track).lock();
        if let Some(mut old) = slot.take() {
            debug!("Replacing live clip on {}", track);
            release(&mut old, track);
        }

        let mut handle = backend.open(path)?;
        handle.set_volume(volume);
        handle.play();
        *slot = Some(handle);
        Ok(())
    }

    /// Stop and release a track's clip. Returns whether there was one;
    /// stopping an empty slot is a no-op.
    pub fn stop(&self, track: Track) -> bool {
        let mut slot = self.slot(track).lock();
        match slot.take() {
            Some(mut handle) => {
                release(&mut handle, track);
                debug!("Released live clip on {}", track);
                true
            }
            None => false,
        }
    }

    /// Check whether a track's clip is (still) audible.
    ///
    /// Sleeps the settling delay first: a clip started within the last few
    /// tens of milliseconds may not report as playing yet, so an immediate
    /// probe can read stale. The delay narrows that window; it does not
    /// close it. Callers treat a false reading around a start as transient.
    pub fn is_busy(&self, track: Track, settle: Duration) -> bool {
        if !settle.is_zero() {
            thread::sleep(settle);
        }
        self.slot(track)
            .lock()
            .as_ref()
            .map(|handle| handle.is_playing())
            .unwrap_or(false)
    }

    /// Apply a volume change to the live clip, if any
    pub fn set_live_volume(&self, track: Track, volume: f32) {
        if let Some(handle) = self.slot(track).lock().as_mut() {
            handle.set_volume(volume);
        }
    }
}

fn release(handle: &mut Box<dyn ClipHandle>, track: Track) {
    if track.disposes_player() {
        handle.dispose();
    } else {
        handle.stop();
    }
}
