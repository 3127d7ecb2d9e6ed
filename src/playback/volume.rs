/// Volume registry
///
/// Requested level per track, clamped to [0.0, 1.0] at write time. Levels
/// survive stops and queue clears; only a dispose resets them back to full.
use parking_lot::RwLock;
use tracing::debug;

use super::track::Track;

pub const DEFAULT_VOLUME: f32 = 1.0;

pub struct VolumeRegistry {
    levels: RwLock<[f32; Track::COUNT]>,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self {
            levels: RwLock::new([DEFAULT_VOLUME; Track::COUNT]),
        }
    }

    /// Store a track's volume, clamped to [0.0, 1.0]. Returns the value
    /// actually stored.
    pub fn set(&self, track: Track, volume: f32) -> f32 {
        let clamped = volume.clamp(0.0, 1.0);
        self.levels.write()[track.index()] = clamped;
        clamped
    }

    pub fn get(&self, track: Track) -> f32 {
        self.levels.read()[track.index()]
    }

    /// Restore every track to full volume
    pub fn reset_all(&self) {
        *self.levels.write() = [DEFAULT_VOLUME; Track::COUNT];
        debug!("All track volumes reset to {}", DEFAULT_VOLUME);
    }
}
