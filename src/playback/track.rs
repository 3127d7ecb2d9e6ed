/// Track identities
///
/// Defines the fixed set of tracks (channels) clips can be routed to. Each
/// track owns at most one live clip at a time; different tracks play
/// independently of each other.
use std::fmt;

/// Track categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    /// Long-form background music
    Background,

    /// Spoken phrases and announcements
    Voice,

    /// Short functional cues (clicks, alerts)
    Functional,

    /// Secondary background layer for simple loops
    BackgroundSimple,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Background => write!(f, "Background"),
            Track::Voice => write!(f, "Voice"),
            Track::Functional => write!(f, "Functional"),
            Track::BackgroundSimple => write!(f, "Background Simple"),
        }
    }
}

impl Track {
    /// Number of tracks
    pub const COUNT: usize = 4;

    /// All tracks in arbitration scan order
    pub const ALL: [Track; Track::COUNT] = [
        Track::Background,
        Track::Voice,
        Track::Functional,
        Track::BackgroundSimple,
    ];

    /// Check if stopping this track must fully release its player handle
    /// instead of merely halting it
    pub fn disposes_player(&self) -> bool {
        match self {
            Track::Background => true, // media-player-backed, holds decoder state
            Track::Voice => false,
            Track::Functional => false,
            Track::BackgroundSimple => false,
        }
    }

    /// Stable index into per-track storage
    pub(crate) fn index(&self) -> usize {
        match self {
            Track::Background => 0,
            Track::Voice => 1,
            Track::Functional => 2,
            Track::BackgroundSimple => 3,
        }
    }
}
