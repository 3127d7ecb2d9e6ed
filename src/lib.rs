//! Multi-track sound playback for desktop hosts.
//!
//! A [`playback::SoundEngine`] routes audio clips onto four independent
//! tracks, each with its own FIFO queue, live clip and volume. Requests are
//! queued from one submission context and started by a background
//! arbitration loop; clips whose requests carry guarded controls disable
//! those controls for as long as they play. See [`playback`] for the
//! moving parts.

pub mod config;
pub mod error;
pub mod events;
pub mod playback;

// Re-export the surface most hosts need
pub use config::EngineConfig;
pub use error::{ConfigError, PlaybackError};
pub use events::{SoundEvent, SubscriberId};
pub use playback::global;
pub use playback::{
    AudioBackend, ClipHandle, GuardedControl, RodioBackend, SoundEngine, SubmissionToken, Track,
};
