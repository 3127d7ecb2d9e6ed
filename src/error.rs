use thiserror::Error;

/// Library-level errors using thiserror for structured error handling.
///
/// Only real process boundaries are fallible here: audio backend bring-up,
/// per-clip opens and configuration I/O. Contract violations (submitting from
/// outside the designated context, minting a second submission token) are
/// panics, not error values: they are caller bugs and must fail fast.

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to open clip: {path}")]
    ClipOpenFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Audio backend is no longer available")]
    BackendClosed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = PlaybackError::ClipOpenFailed {
            path: "chime.mp3".to_string(),
            source: Box::new(std::io::Error::new(std::io::ErrorKind::NotFound, "missing")),
        };
        assert_eq!(err.to_string(), "Failed to open clip: chime.mp3");

        let err = PlaybackError::BackendClosed;
        assert_eq!(err.to_string(), "Audio backend is no longer available");
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/config.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "Failed to load configuration from /test/config.json"
        );
    }
}
