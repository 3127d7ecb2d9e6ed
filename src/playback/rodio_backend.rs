/// Production audio backend on rodio
///
/// `OutputStream` cannot leave the thread it was created on, so a dedicated
/// keeper thread owns it for the backend's whole lifetime and only the
/// cloneable `OutputStreamHandle` crosses threads. Each opened clip is its
/// own `Sink` feeding that shared stream.
use std::fs::File;
use std::io::BufReader;
use std::thread;

use crossbeam_channel::{bounded, Sender};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, info};

use crate::error::PlaybackError;

use super::backend::{AudioBackend, ClipHandle};

/// Audio backend backed by the system's default output device
pub struct RodioBackend {
    stream_handle: OutputStreamHandle,
    // Dropping this wakes the keeper thread and releases the output stream
    _shutdown_tx: Sender<()>,
}

impl RodioBackend {
    /// Open the default output device.
    ///
    /// Fails on machines without a usable audio device; callers that can run
    /// headless should treat that as a soft failure.
    pub fn try_default() -> Result<Self, PlaybackError> {
        let (init_tx, init_rx) = bounded(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        thread::Builder::new()
            .name("sound-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = init_tx.send(Ok(handle));
                    // The stream must stay alive (and on this thread) for as
                    // long as any sink may feed it
                    let _stream = stream;
                    let _ = shutdown_rx.recv();
                    debug!("Audio output stream released");
                }
                Err(e) => {
                    let _ = init_tx.send(Err(e));
                }
            })
            .map_err(|e| PlaybackError::StreamInitFailed(Box::new(e)))?;

        let stream_handle = init_rx
            .recv()
            .map_err(|_| PlaybackError::BackendClosed)?
            .map_err(|e| PlaybackError::StreamInitFailed(Box::new(e)))?;

        info!("Audio output stream ready");
        Ok(Self {
            stream_handle,
            _shutdown_tx: shutdown_tx,
        })
    }
}

impl AudioBackend for RodioBackend {
    fn open(&self, path: &str) -> Result<Box<dyn ClipHandle>, PlaybackError> {
        let file = File::open(path).map_err(|e| PlaybackError::ClipOpenFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| {
            PlaybackError::ClipOpenFailed {
                path: path.to_string(),
                source: Box::new(e),
            }
        })?;

        let sink = Sink::try_new(&self.stream_handle).map_err(|e| {
            PlaybackError::ClipOpenFailed {
                path: path.to_string(),
                source: Box::new(e),
            }
        })?;
        // Prime the sink paused so volume can be applied before any sound
        sink.pause();
        sink.append(decoder);

        debug!("Opened clip: {}", path);
        Ok(Box::new(RodioClip {
            path: path.to_string(),
            sink,
        }))
    }
}

/// One clip on the shared output stream
struct RodioClip {
    path: String,
    sink: Sink,
}

impl ClipHandle for RodioClip {
    fn play(&mut self) {
        info!("Playing clip: {}", self.path);
        self.sink.play();
    }

    fn stop(&mut self) {
        debug!("Stopping clip: {}", self.path);
        self.sink.stop();
    }

    fn dispose(&mut self) {
        debug!("Disposing clip: {}", self.path);
        // Dropping the sink afterwards releases the queued decoder as well
        self.sink.stop();
    }

    fn is_playing(&self) -> bool {
        !self.sink.empty()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }
}
