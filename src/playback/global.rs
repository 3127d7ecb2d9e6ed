/// Process-wide engine accessor
///
/// The supported style is an explicit `SoundEngine` owned by the host; this
/// accessor exists for hosts that want drop-in shared-engine ergonomics.
/// The instance is built lazily on first access (which requires an audio
/// device), can be replaced with `install`, and dropped with `reset` so the
/// next access builds a fresh one.
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::PlaybackError;

use super::engine::SoundEngine;
use super::rodio_backend::RodioBackend;

static INSTANCE: RwLock<Option<SoundEngine>> = RwLock::new(None);

/// Get the shared engine, creating a default rodio-backed one on first
/// access. Fails only when a new engine is needed and no audio device is
/// available.
pub fn instance() -> Result<SoundEngine, PlaybackError> {
    if let Some(engine) = INSTANCE.read().as_ref() {
        return Ok(engine.clone());
    }

    let mut slot = INSTANCE.write();
    // Double-checked: another thread may have built it while we waited
    if let Some(engine) = slot.as_ref() {
        return Ok(engine.clone());
    }

    let backend = RodioBackend::try_default()?;
    let engine = SoundEngine::new(Arc::new(backend));
    info!("Process-wide sound engine #{} created", engine.engine_id());
    *slot = Some(engine.clone());
    Ok(engine)
}

/// Make `engine` the shared instance, replacing any current one
pub fn install(engine: SoundEngine) {
    *INSTANCE.write() = Some(engine);
}

/// Drop the shared instance; the next `instance()` call builds a fresh one
pub fn reset() {
    *INSTANCE.write() = None;
}
