use crate::{AudioError, CoreResult, audio::AudioPlayback};

use std::{
    fs::File,
    io::BufReader,
    panic::Location,
    path::{Path, PathBuf},
    sync::mpsc,
    time::Duration,
};

use error_location::ErrorLocation;
use rodio::{Decoder, OutputStream, Sink};
use tracing::{debug, error, info, instrument, warn};

/// How long `new` waits for the output device to open.
const OUTPUT_READY_TIMEOUT: Duration = Duration::from_secs(3);

/// Clip playback backed by rodio.
///
/// Rodio's `OutputStream` is not `Send`, so a dedicated thread owns it and
/// receives clip paths over a channel. Starting a clip stops the one that is
/// currently playing.
pub struct RodioPlayback {
    clip_tx: mpsc::Sender<PathBuf>,
}

impl RodioPlayback {
    /// Open the default output device on a new playback thread.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let (clip_tx, clip_rx) = mpsc::channel::<PathBuf>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        std::thread::Builder::new()
            .name("soundboard-playback".to_string())
            .spawn(move || run_player(clip_rx, ready_tx))
            .map_err(|e| AudioError::NoOutputDevice {
                reason: format!("Failed to spawn playback thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match ready_rx.recv_timeout(OUTPUT_READY_TIMEOUT) {
            Ok(Ok(())) => {
                info!("Playback initialized");
                Ok(Self { clip_tx })
            }
            Ok(Err(reason)) => Err(AudioError::NoOutputDevice {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(_) => Err(AudioError::NoOutputDevice {
                reason: "Output device did not open in time".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl AudioPlayback for RodioPlayback {
    #[track_caller]
    fn play(&self, path: &Path) -> CoreResult<()> {
        std::fs::metadata(path).map_err(|source| AudioError::FileOpenFailed {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.clip_tx
            .send(path.to_path_buf())
            .map_err(|_| AudioError::PlaybackClosed {
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(path = ?path, "Clip queued for playback");

        Ok(())
    }
}

/// Stand-in used when no output device could be opened.
///
/// Every `play` fails with [`AudioError::NoOutputDevice`], so the board keeps
/// working (recording, key management) and reports each silent press.
#[derive(Debug, Clone)]
pub struct UnavailablePlayback {
    reason: String,
}

impl UnavailablePlayback {
    /// Playback that always fails with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioPlayback for UnavailablePlayback {
    #[track_caller]
    fn play(&self, path: &Path) -> CoreResult<()> {
        debug!(path = ?path, "No output device, clip not played");
        Err(AudioError::NoOutputDevice {
            reason: self.reason.clone(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

fn run_player(clip_rx: mpsc::Receiver<PathBuf>, ready_tx: mpsc::Sender<Result<(), String>>) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => {
            let _ = ready_tx.send(Ok(()));
            pair
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e.to_string()));
            return;
        }
    };

    let mut current: Option<Sink> = None;

    // Ends once every RodioPlayback handle has been dropped.
    while let Ok(path) = clip_rx.recv() {
        if let Some(previous) = current.take() {
            previous.stop();
        }

        match start_clip(&stream_handle, &path) {
            Ok(sink) => current = Some(sink),
            Err(e) => warn!(error = %e, "Clip playback failed"),
        }
    }

    debug!("Playback thread exiting");
}

fn start_clip(handle: &rodio::OutputStreamHandle, path: &Path) -> CoreResult<Sink> {
    let file = File::open(path).map_err(|source| AudioError::FileOpenFailed {
        path: path.to_path_buf(),
        source,
        location: ErrorLocation::from(Location::caller()),
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::PlaybackFailed {
        path: path.to_path_buf(),
        reason: format!("Failed to decode: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let sink = Sink::try_new(handle).map_err(|e| {
        error!(error = %e, "Failed to create sink");
        AudioError::PlaybackFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to create sink: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    sink.append(source);
    info!(path = ?path, "Playing clip");

    Ok(sink)
}
