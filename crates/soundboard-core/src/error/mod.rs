use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Audio capture, playback and file errors with source location tracking.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio output device available for playback.
    #[error("No audio output available: {reason} {location}")]
    NoOutputDevice {
        /// Description of the output failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio data captured or provided.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture was stopped before the requested duration elapsed.
    #[error("Capture stopped early {location}")]
    CaptureStopped {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio file does not exist or cannot be opened.
    #[error("Audio file not readable: {path:?}: {source} {location}")]
    FileOpenFailed {
        /// Path of the file that failed to open.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio file could not be decoded or played.
    #[error("Playback failed for {path:?}: {reason} {location}")]
    PlaybackFailed {
        /// Path of the clip that failed.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback thread is gone; no further clips can be played.
    #[error("Playback worker stopped {location}")]
    PlaybackClosed {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing a WAV file failed.
    #[error("Failed to write WAV {path:?}: {reason} {location}")]
    WavWriteFailed {
        /// Destination path.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`AudioError`].
pub type Result<T> = std::result::Result<T, AudioError>;
